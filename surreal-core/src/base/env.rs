//! Environment.
use super::{Info, Step};
use crate::{
    render::{RenderContext, RenderOptions},
    ActionSpec, Observation, ObservationSpec, SpecFormat,
};
use anyhow::Result;
use ndarray::{Array3, ArrayD};
use std::fmt;

/// Continuous action.
pub type Action = ArrayD<f32>;

/// Kind of a stage.
///
/// An environment made of stages holds at most one stage of each kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageKind {
    /// Forces the end of an episode after a number of steps.
    MaxStep,

    /// Splits named arrays into visual and flat components.
    ObservationConcatenation,

    /// Averages the channels of the visual component.
    Grayscale,

    /// Stacks the visual components of the last frames.
    FrameStack,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MaxStep => "MaxStep",
            Self::ObservationConcatenation => "ObservationConcatenation",
            Self::Grayscale => "Grayscale",
            Self::FrameStack => "FrameStack",
        };
        f.write_str(name)
    }
}

/// Represents an environment with the common stepping contract.
///
/// Adapters implement this trait over native backends, and a pipeline implements it
/// over an adapter and a sequence of transform stages.
pub trait Env {
    /// Resets the environment and returns the initial observation.
    fn reset(&mut self) -> Result<(Observation, Info)>;

    /// Performs an environment step.
    fn step(&mut self, a: &Action) -> Result<Step>;

    /// Renders the current state into the surface of `ctx`.
    ///
    /// Returns the rendered `(h, w, 3)` frame, or `None` if the environment
    /// cannot render.
    fn render(
        &mut self,
        _ctx: &mut RenderContext,
        _opts: &RenderOptions,
    ) -> Result<Option<Array3<u8>>> {
        Ok(None)
    }

    /// Releases resources held by the environment.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    /// Spec of observations.
    fn observation_spec(&self) -> Result<ObservationSpec>;

    /// Spec of actions.
    fn action_spec(&self) -> Result<ActionSpec>;

    /// Format of the specs returned by this environment.
    fn spec_format(&self) -> SpecFormat;

    /// Name of the environment, e.g. `DmControlAdapter`.
    fn name(&self) -> String;

    /// Kinds of all transform stages in this environment, from the innermost one.
    fn stage_kinds(&self) -> Vec<StageKind> {
        vec![]
    }
}
