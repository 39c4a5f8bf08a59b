//! Policy.
use super::Action;
use crate::Observation;
use anyhow::Result;

/// A policy on an environment.
///
/// Policy is a mapping from an observation to an action.
pub trait Policy {
    /// Takes an action given an observation.
    fn act(&mut self, obs: &Observation) -> Result<Action>;
}
