//! Step limit.
use super::{Stage, StageKind};
use anyhow::Result;
use log::trace;
use surreal_core::{Info, Observation, Step, SurrealError};

/// Forces the end of an episode once `max_steps` steps have been taken since the last
/// reset, whatever the environment below reports.
///
/// The forced end is reported as a truncation.
#[derive(Clone, Debug)]
pub struct MaxStep {
    max_steps: usize,
    current_step: usize,
}

impl MaxStep {
    /// Constructs the stage. `max_steps` must be positive.
    pub fn new(max_steps: usize) -> Result<Self> {
        if max_steps == 0 {
            return Err(SurrealError::Config("MaxStep received max_steps = 0".to_string()).into());
        }
        Ok(Self {
            max_steps,
            current_step: 0,
        })
    }

    /// Number of steps since the last reset.
    pub fn current_step(&self) -> usize {
        self.current_step
    }
}

impl Stage for MaxStep {
    fn kind(&self) -> StageKind {
        StageKind::MaxStep
    }

    fn reset(&mut self, obs: Observation, info: Info) -> Result<(Observation, Info)> {
        self.current_step = 0;
        Ok((obs, info))
    }

    fn step(&mut self, mut step: Step) -> Result<Step> {
        self.current_step += 1;
        if self.current_step >= self.max_steps {
            trace!("Truncate episode at step {}", self.current_step);
            step.is_truncated = true;
        }
        Ok(step)
    }
}
