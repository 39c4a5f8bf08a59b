//! Adapter of physics backends rendering pixels.
use anyhow::Result;
use log::{trace, warn};
use ndarray::{Array3, ArrayD};
use surreal_core::{
    render::{RenderContext, RenderOptions},
    Action, ActionSpec, Array, ArraySpec, BoundedArraySpec, DType, Env, Info, Observation,
    ObservationSpec, SpecFormat, Step, SurrealError,
};

/// Key of the pixel observation.
pub const PIXELS_KEY: &str = "pixels";

/// Height and width of pixel observations.
pub const PIXEL_SIZE: usize = 84;

/// Type of a [`TimeStep`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepType {
    /// First step of an episode.
    First,
    /// Any step which is neither first nor last.
    Mid,
    /// Last step of an episode.
    Last,
}

/// Output of a physics backend.
#[derive(Clone, Debug)]
pub struct TimeStep {
    /// Type of the step.
    pub step_type: StepType,

    /// Reward, undefined on the first step.
    pub reward: Option<f64>,

    /// Discount, undefined on the first step.
    pub discount: Option<f64>,

    /// Named observation arrays. Pixels are `(h, w, c)`.
    pub observation: Vec<(String, Array)>,
}

/// Native API of physics environments.
pub trait DmControlBackend {
    /// Starts a new episode.
    fn reset(&mut self) -> Result<TimeStep>;

    /// Performs a step.
    fn step(&mut self, a: &ArrayD<f64>) -> Result<TimeStep>;

    /// Native spec of observations.
    fn observation_spec(&self) -> Vec<(String, ArraySpec)>;

    /// Native spec of actions.
    fn action_spec(&self) -> BoundedArraySpec;

    /// Renders the scene from a camera into a `(height, width, 3)` image.
    fn render_pixels(&mut self, width: usize, height: usize, camera_id: i32) -> Result<Array3<u8>>;

    /// Releases resources.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    /// Name of the environment, e.g. `cheetah-run`.
    fn name(&self) -> String;
}

/// Adapts a [`DmControlBackend`] to [`Env`].
///
/// Observations are the named arrays of the backend. The declared observation spec is a
/// single `uint8` pixel channel of shape `(3, 84, 84)`, the layout agents receive after
/// concatenation.
pub struct DmControlAdapter<B: DmControlBackend> {
    backend: B,
}

impl<B: DmControlBackend> DmControlAdapter<B> {
    /// Constructs an adapter.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// The native backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: DmControlBackend> Env for DmControlAdapter<B> {
    fn reset(&mut self) -> Result<(Observation, Info)> {
        trace!("DmControlAdapter::reset()");
        let ts = self.backend.reset()?;
        Ok((Observation::Dict(ts.observation), Info::empty()))
    }

    fn step(&mut self, a: &Action) -> Result<Step> {
        let ts = self.backend.step(&a.mapv(f64::from))?;
        let reward = match ts.reward {
            Some(r) => r as f32,
            None => {
                warn!("{} returned no reward, using 0", self.backend.name());
                0.0
            }
        };
        let done = ts.step_type == StepType::Last;
        Ok(Step::new(
            Observation::Dict(ts.observation),
            reward,
            done,
            Info::empty(),
        ))
    }

    fn render(&mut self, ctx: &mut RenderContext, opts: &RenderOptions) -> Result<Option<Array3<u8>>> {
        let frame = self
            .backend
            .render_pixels(opts.width, opts.height, opts.camera_id)?;
        ctx.surface(opts.width, opts.height)?.present(&frame)?;
        Ok(Some(frame))
    }

    fn close(&mut self) -> Result<()> {
        self.backend.close()
    }

    fn observation_spec(&self) -> Result<ObservationSpec> {
        Ok(ObservationSpec::DmControl(vec![(
            PIXELS_KEY.to_string(),
            ArraySpec::pixels(3, PIXEL_SIZE, PIXEL_SIZE),
        )]))
    }

    fn action_spec(&self) -> Result<ActionSpec> {
        Ok(ActionSpec::DmControl(self.backend.action_spec()))
    }

    fn spec_format(&self) -> SpecFormat {
        SpecFormat::DmControl
    }

    fn name(&self) -> String {
        format!("DmControlAdapter<{}>", self.backend.name())
    }
}

/// A backend providing the specs of a pixel physics environment without a simulator.
///
/// Learners use it to build models from specs. Resetting, stepping and rendering fail.
#[derive(Clone, Debug)]
pub struct DmControlSpecOnly {
    action_dim: usize,
}

impl DmControlSpecOnly {
    /// Specs of an environment with a 6-dimensional action in `[-1, 1]`.
    pub fn new() -> Self {
        Self { action_dim: 6 }
    }

    fn unavailable(&self, what: &str) -> anyhow::Error {
        SurrealError::Backend(format!("{} is not available in a spec-only environment", what))
            .into()
    }
}

impl Default for DmControlSpecOnly {
    fn default() -> Self {
        Self::new()
    }
}

impl DmControlBackend for DmControlSpecOnly {
    fn reset(&mut self) -> Result<TimeStep> {
        Err(self.unavailable("reset"))
    }

    fn step(&mut self, _a: &ArrayD<f64>) -> Result<TimeStep> {
        Err(self.unavailable("step"))
    }

    fn observation_spec(&self) -> Vec<(String, ArraySpec)> {
        vec![(
            PIXELS_KEY.to_string(),
            ArraySpec::new(vec![PIXEL_SIZE, PIXEL_SIZE, 3], DType::U8, Some(PIXELS_KEY)),
        )]
    }

    fn action_spec(&self) -> BoundedArraySpec {
        BoundedArraySpec {
            spec: ArraySpec::new(vec![self.action_dim], DType::F64, None),
            minimum: vec![-1.0; self.action_dim],
            maximum: vec![1.0; self.action_dim],
        }
    }

    fn render_pixels(&mut self, _width: usize, _height: usize, _camera_id: i32) -> Result<Array3<u8>> {
        Err(self.unavailable("rendering"))
    }

    fn name(&self) -> String {
        "spec-only".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;

    struct Scripted {
        t: usize,
    }

    impl Scripted {
        fn time_step(&self, step_type: StepType, reward: Option<f64>) -> TimeStep {
            let pixels = ArrayD::from_elem(IxDyn(&[PIXEL_SIZE, PIXEL_SIZE, 3]), self.t as u8);
            TimeStep {
                step_type,
                reward,
                discount: reward.map(|_| 1.0),
                observation: vec![(PIXELS_KEY.to_string(), Array::U8Array(pixels))],
            }
        }
    }

    impl DmControlBackend for Scripted {
        fn reset(&mut self) -> Result<TimeStep> {
            self.t = 0;
            Ok(self.time_step(StepType::First, None))
        }

        fn step(&mut self, _a: &ArrayD<f64>) -> Result<TimeStep> {
            self.t += 1;
            match self.t {
                1 => Ok(self.time_step(StepType::Mid, None)),
                2 => Ok(self.time_step(StepType::Mid, Some(0.5))),
                _ => Ok(self.time_step(StepType::Last, Some(1.0))),
            }
        }

        fn observation_spec(&self) -> Vec<(String, ArraySpec)> {
            DmControlSpecOnly::new().observation_spec()
        }

        fn action_spec(&self) -> BoundedArraySpec {
            DmControlSpecOnly::new().action_spec()
        }

        fn render_pixels(&mut self, width: usize, height: usize, _camera_id: i32) -> Result<Array3<u8>> {
            Ok(Array3::from_elem((height, width, 3), 9))
        }

        fn name(&self) -> String {
            "scripted".to_string()
        }
    }

    #[test]
    fn test_step_contract() -> Result<()> {
        let mut env = DmControlAdapter::new(Scripted { t: 0 });
        let (obs, info) = env.reset()?;
        assert!(info.is_empty());
        assert!(obs.get(PIXELS_KEY).is_some());

        let a = ArrayD::zeros(IxDyn(&[6]));
        // Undefined reward is replaced with zero
        let step = env.step(&a)?;
        assert_eq!(step.reward, 0.0);
        assert!(!step.is_done());

        let step = env.step(&a)?;
        assert_eq!(step.reward, 0.5);
        assert!(!step.is_done());

        let step = env.step(&a)?;
        assert!(step.is_terminated);
        assert!(step.info.is_empty());
        Ok(())
    }

    #[test]
    fn test_specs() -> Result<()> {
        let env = DmControlAdapter::new(DmControlSpecOnly::new());
        assert_eq!(
            env.observation_spec()?,
            ObservationSpec::DmControl(vec![("pixels".to_string(), ArraySpec::pixels(3, 84, 84))])
        );
        assert_eq!(env.action_spec()?.shape(), Some(&[6][..]));
        assert_eq!(env.spec_format(), SpecFormat::DmControl);
        Ok(())
    }

    #[test]
    fn test_spec_only_cannot_step() {
        let mut env = DmControlAdapter::new(DmControlSpecOnly::new());
        assert!(env.reset().is_err());
        assert!(env.step(&ArrayD::zeros(IxDyn(&[6]))).is_err());
    }

    #[test]
    fn test_render_reuses_surface() -> Result<()> {
        let mut env = DmControlAdapter::new(Scripted { t: 0 });
        let mut ctx = RenderContext::headless();
        let opts = RenderOptions::default();

        let frame = env.render(&mut ctx, &opts)?.unwrap();
        assert_eq!(frame.shape(), &[480, 480, 3]);
        env.render(&mut ctx, &opts)?;
        assert_eq!(ctx.n_surfaces_created(), 1);

        let small = RenderOptions {
            width: 64,
            height: 48,
            camera_id: 0,
        };
        let frame = env.render(&mut ctx, &small)?.unwrap();
        assert_eq!(frame.shape(), &[48, 64, 3]);
        assert_eq!(ctx.n_surfaces_created(), 2);
        assert_eq!(ctx.last_frame(), Some(&frame));
        Ok(())
    }
}
