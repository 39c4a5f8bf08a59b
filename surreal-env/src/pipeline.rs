//! Ordered composition of transform stages around an adapter.
use crate::stage::{Stage, StageKind};
use anyhow::Result;
use log::{debug, trace};
use ndarray::Array3;
use std::{collections::HashSet, fmt};
use surreal_core::{
    render::{RenderContext, RenderOptions},
    Action, ActionSpec, Env, Info, Observation, ObservationSpec, SpecFormat, Step,
    SurrealError,
};

/// An environment made of a base environment and an ordered list of stages.
///
/// Outputs of the base environment go through the stages in the order they were added.
/// A pipeline holds at most one stage of each [`StageKind`], counting the stages of a
/// pipeline used as its base. Adding a second one fails at assembly time.
///
/// ```ignore
/// let env = Pipeline::new(Box::new(DmControlAdapter::new(backend)))
///     .with(ObservationConcatenation)?
///     .with(Grayscale)?
///     .with(FrameStack::new(4)?)?;
/// ```
pub struct Pipeline {
    base: Box<dyn Env>,
    stages: Vec<Box<dyn Stage>>,
    kinds: HashSet<StageKind>,
}

impl Pipeline {
    /// Constructs a pipeline without stages of its own.
    pub fn new(base: Box<dyn Env>) -> Self {
        let kinds = base.stage_kinds().into_iter().collect();
        Self {
            base,
            stages: vec![],
            kinds,
        }
    }

    /// Adds a stage on top of the current ones.
    pub fn with(mut self, stage: impl Stage + 'static) -> Result<Self> {
        let kind = stage.kind();
        if !self.kinds.insert(kind) {
            return Err(SurrealError::DoubleWrap(kind.to_string()).into());
        }
        debug!("Add stage {} on top of {}", kind, self.name());
        self.stages.push(Box::new(stage));
        Ok(self)
    }

    /// Kinds of the stages added to this pipeline, from the innermost one.
    pub fn stages(&self) -> Vec<StageKind> {
        self.stages.iter().map(|s| s.kind()).collect()
    }

    /// The base environment without any stage.
    pub fn unwrapped(&self) -> &dyn Env {
        self.base.as_ref()
    }

    /// The base environment without any stage.
    pub fn unwrapped_mut(&mut self) -> &mut dyn Env {
        self.base.as_mut()
    }
}

impl Env for Pipeline {
    fn reset(&mut self) -> Result<(Observation, Info)> {
        trace!("Pipeline::reset()");
        let mut out = self.base.reset()?;
        for stage in self.stages.iter_mut() {
            out = stage.reset(out.0, out.1)?;
        }
        Ok(out)
    }

    fn step(&mut self, a: &Action) -> Result<Step> {
        let mut step = self.base.step(a)?;
        for stage in self.stages.iter_mut() {
            step = stage.step(step)?;
        }
        Ok(step)
    }

    fn render(&mut self, ctx: &mut RenderContext, opts: &RenderOptions) -> Result<Option<Array3<u8>>> {
        self.base.render(ctx, opts)
    }

    fn close(&mut self) -> Result<()> {
        self.base.close()
    }

    fn observation_spec(&self) -> Result<ObservationSpec> {
        self.stages
            .iter()
            .try_fold(self.base.observation_spec()?, |spec, stage| {
                stage.observation_spec(spec)
            })
    }

    fn action_spec(&self) -> Result<ActionSpec> {
        self.stages
            .iter()
            .try_fold(self.base.action_spec()?, |spec, stage| stage.action_spec(spec))
    }

    fn spec_format(&self) -> SpecFormat {
        self.stages
            .iter()
            .fold(self.base.spec_format(), |f, stage| stage.spec_format(f))
    }

    fn name(&self) -> String {
        self.stages
            .iter()
            .fold(self.base.name(), |inner, stage| format!("{}<{}>", stage.kind(), inner))
    }

    fn stage_kinds(&self) -> Vec<StageKind> {
        let mut kinds = self.base.stage_kinds();
        kinds.extend(self.stages());
        kinds
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.name())
    }
}
