//! Environment step.
use crate::{record::Record, Observation};

/// Additional information returned with observations.
///
/// Adapters return an empty mapping unless the native backend reports something.
pub type Info = Record;

/// Represents the outcome of one environment step, `(o_t+1, r_t, done, info)`.
#[derive(Clone, Debug)]
pub struct Step {
    /// Observation.
    pub obs: Observation,

    /// Reward.
    pub reward: f32,

    /// Flag denoting if the episode is terminated by the environment.
    pub is_terminated: bool,

    /// Flag denoting if the episode is truncated, e.g. by a step limit.
    pub is_truncated: bool,

    /// Information defined by the backend.
    pub info: Info,
}

impl Step {
    /// Constructs a [`Step`] object.
    pub fn new(obs: Observation, reward: f32, is_terminated: bool, info: Info) -> Self {
        Step {
            obs,
            reward,
            is_terminated,
            is_truncated: false,
            info,
        }
    }

    #[inline]
    /// Terminated or truncated.
    pub fn is_done(&self) -> bool {
        self.is_terminated || self.is_truncated
    }

    /// Converts into the `(observation, reward, done, info)` tuple.
    pub fn into_tuple(self) -> (Observation, f32, bool, Info) {
        let done = self.is_done();
        (self.obs, self.reward, done, self.info)
    }
}
