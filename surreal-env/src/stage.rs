//! Transform stages of a [`Pipeline`](crate::Pipeline).
//!
//! A stage post-processes what the environment below it returns: the initial
//! observation on reset, the [`Step`] on every step, and the specs. Stages are applied
//! in the order they were added to the pipeline.
mod concat;
mod frame_stack;
mod grayscale;
mod max_step;
use anyhow::Result;
pub use concat::{concatenate, ObservationConcatenation};
pub use frame_stack::FrameStack;
pub use grayscale::{grayscale, Grayscale};
pub use max_step::MaxStep;
use surreal_core::{
    ActionSpec, ArraySpec, Dim, EnvSpec, Info, Observation, ObservationSpec, SpecFormat,
    SplitObs, Step, SurrealError,
};
pub use surreal_core::StageKind;

/// A transform applied on top of an environment.
pub trait Stage {
    /// Kind of the stage.
    fn kind(&self) -> StageKind;

    /// Transforms the output of a reset.
    fn reset(&mut self, obs: Observation, info: Info) -> Result<(Observation, Info)> {
        Ok((obs, info))
    }

    /// Transforms the output of a step.
    fn step(&mut self, step: Step) -> Result<Step> {
        Ok(step)
    }

    /// Spec of observations after this stage, given the spec before it.
    fn observation_spec(&self, spec: ObservationSpec) -> Result<ObservationSpec> {
        Ok(spec)
    }

    /// Spec of actions after this stage, given the spec before it.
    fn action_spec(&self, spec: ActionSpec) -> Result<ActionSpec> {
        Ok(spec)
    }

    /// Spec format after this stage.
    fn spec_format(&self, inner: SpecFormat) -> SpecFormat {
        inner
    }
}

/// Extracts visual and flat components, failing for observations not yet concatenated.
pub(crate) fn expect_split(obs: Observation, kind: StageKind) -> Result<SplitObs> {
    match obs {
        Observation::Split(s) => Ok(s),
        other => Err(SurrealError::ShapeInvariant(format!(
            "{} expects concatenated observations, got {}",
            kind,
            other.kind()
        ))
        .into()),
    }
}

/// Extracts the visual and flat parts of a concatenated observation spec.
pub(crate) fn expect_split_spec(
    spec: ObservationSpec,
    kind: StageKind,
) -> Result<(Option<ArraySpec>, Option<usize>)> {
    match spec {
        ObservationSpec::Classic(EnvSpec {
            dim: Dim::Split(visual, flat),
            ..
        }) => Ok((visual, flat)),
        other => Err(SurrealError::ShapeInvariant(format!(
            "{} expects a concatenated observation spec, got {:?}",
            kind, other
        ))
        .into()),
    }
}

/// Checks that a visual spec is `(c, h, w)`.
pub(crate) fn visual_dims(spec: &ArraySpec, kind: StageKind) -> Result<(usize, usize, usize)> {
    match spec.shape[..] {
        [c, h, w] => Ok((c, h, w)),
        _ => Err(SurrealError::ShapeInvariant(format!(
            "{} expects a visual spec of rank 3, got {:?}",
            kind, spec.shape
        ))
        .into()),
    }
}
