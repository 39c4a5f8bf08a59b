use anyhow::Result;
use ndarray::{ArrayD, IxDyn};
use surreal_core::{
    Array, ArraySpec, BoundedArraySpec, Env, EnvSpec, Observation, ObservationSpec, SpecFormat,
    SurrealError,
};
use surreal_env::{
    adapter::{
        DmControlAdapter, DmControlBackend, DmControlSpecOnly, GymAdapter, StepType, TimeStep,
        PIXELS_KEY,
    },
    classic::Pendulum,
    FrameStack, Grayscale, MaxStep, ObservationConcatenation, Pipeline, StageKind,
};

/// Pixels filled with the step count, plus a 2-dimensional velocity.
struct Camera {
    t: u8,
}

impl Camera {
    fn time_step(&self, step_type: StepType) -> TimeStep {
        let pixels = ArrayD::from_elem(IxDyn(&[84, 84, 3]), self.t);
        let velocity = ArrayD::from_elem(IxDyn(&[2]), self.t as f64);
        TimeStep {
            step_type,
            reward: Some(1.0),
            discount: Some(1.0),
            observation: vec![
                (PIXELS_KEY.to_string(), Array::U8Array(pixels)),
                ("velocity".to_string(), Array::F64Array(velocity)),
            ],
        }
    }
}

impl DmControlBackend for Camera {
    fn reset(&mut self) -> Result<TimeStep> {
        self.t = 0;
        Ok(self.time_step(StepType::First))
    }

    fn step(&mut self, _a: &ArrayD<f64>) -> Result<TimeStep> {
        self.t += 1;
        Ok(self.time_step(StepType::Mid))
    }

    fn observation_spec(&self) -> Vec<(String, ArraySpec)> {
        DmControlSpecOnly::new().observation_spec()
    }

    fn action_spec(&self) -> BoundedArraySpec {
        DmControlSpecOnly::new().action_spec()
    }

    fn render_pixels(
        &mut self,
        width: usize,
        height: usize,
        _camera_id: i32,
    ) -> Result<ndarray::Array3<u8>> {
        Ok(ndarray::Array3::zeros((height, width, 3)))
    }

    fn name(&self) -> String {
        "camera".to_string()
    }
}

fn camera() -> Box<dyn Env> {
    Box::new(DmControlAdapter::new(Camera { t: 0 }))
}

fn action() -> ArrayD<f32> {
    ArrayD::zeros(IxDyn(&[6]))
}

#[test]
fn test_double_wrap_is_rejected() -> Result<()> {
    let env = Pipeline::new(camera())
        .with(ObservationConcatenation)?
        .with(Grayscale)?;
    let err = env.with(Grayscale).err().unwrap();
    assert!(matches!(
        err.downcast_ref::<SurrealError>(),
        Some(SurrealError::DoubleWrap(_))
    ));

    let env = Pipeline::new(camera()).with(MaxStep::new(3)?)?;
    assert!(env.with(MaxStep::new(5)?).is_err());
    Ok(())
}

#[test]
fn test_double_wrap_through_nested_pipeline() -> Result<()> {
    let inner = Pipeline::new(camera())
        .with(ObservationConcatenation)?
        .with(Grayscale)?;
    let outer = Pipeline::new(Box::new(inner));
    assert_eq!(
        outer.stage_kinds(),
        vec![StageKind::ObservationConcatenation, StageKind::Grayscale]
    );
    assert!(outer.stages().is_empty());

    let err = outer.with(Grayscale).err().unwrap();
    assert!(matches!(
        err.downcast_ref::<SurrealError>(),
        Some(SurrealError::DoubleWrap(_))
    ));

    // Kinds missing from the inner chain can still be added
    let inner = Pipeline::new(camera()).with(ObservationConcatenation)?;
    let outer = Pipeline::new(Box::new(inner)).with(FrameStack::new(2)?)?;
    assert_eq!(
        outer.stage_kinds(),
        vec![StageKind::ObservationConcatenation, StageKind::FrameStack]
    );
    Ok(())
}

#[test]
fn test_spec_propagation() -> Result<()> {
    let env = Pipeline::new(camera());
    assert_eq!(env.spec_format(), SpecFormat::DmControl);

    let env = env.with(ObservationConcatenation)?;
    assert_eq!(
        env.observation_spec()?,
        ObservationSpec::Classic(EnvSpec::split(Some(ArraySpec::pixels(3, 84, 84)), None))
    );
    assert_eq!(env.spec_format(), SpecFormat::SurrealClassic);
    assert_eq!(
        env.action_spec()?,
        surreal_core::ActionSpec::Classic(EnvSpec::continuous(vec![6]))
    );

    let env = env.with(Grayscale)?;
    assert_eq!(
        env.observation_spec()?,
        ObservationSpec::Classic(EnvSpec::split(Some(ArraySpec::pixels(1, 84, 84)), None))
    );

    let env = env.with(FrameStack::new(4)?)?;
    assert_eq!(
        env.observation_spec()?,
        ObservationSpec::Classic(EnvSpec::split(Some(ArraySpec::pixels(4, 84, 84)), None))
    );
    Ok(())
}

#[test]
fn test_pixel_chain_runtime() -> Result<()> {
    let mut env = Pipeline::new(camera())
        .with(ObservationConcatenation)?
        .with(Grayscale)?
        .with(FrameStack::new(4)?)?;

    let (obs, _) = env.reset()?;
    let obs = obs.as_split().unwrap();
    let visual = obs.visual.as_ref().unwrap();
    assert_eq!(visual.shape(), &[4, 84, 84]);
    assert!(visual.iter().all(|&v| v == 0));
    assert_eq!(obs.flat.as_ref().unwrap().to_vec(), vec![0.0, 0.0]);

    let step = env.step(&action())?;
    let obs = step.obs.as_split().unwrap();
    let visual = obs.visual.as_ref().unwrap();
    for (i, expected) in [0, 0, 0, 1].iter().enumerate() {
        assert!(visual.index_axis(ndarray::Axis(0), i).iter().all(|v| v == expected));
    }
    // Only the latest flat component is kept
    assert_eq!(obs.flat.as_ref().unwrap().to_vec(), vec![1.0, 1.0]);
    Ok(())
}

#[test]
fn test_max_step_truncates_native_pendulum() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let base = Box::new(GymAdapter::new(Pendulum::new(Some(7))));
    let mut env = Pipeline::new(base).with(MaxStep::new(3)?)?;
    let a = ArrayD::zeros(IxDyn(&[1]));

    for _ in 0..2 {
        env.reset()?;
        assert!(!env.step(&a)?.is_done());
        assert!(!env.step(&a)?.is_done());
        let step = env.step(&a)?;
        assert!(step.is_truncated);
        assert!(!step.is_terminated);
        match step.obs {
            Observation::Array(obs) => assert_eq!(obs.shape(), vec![3]),
            other => panic!("unexpected observation {}", other.kind()),
        }
    }
    Ok(())
}

#[test]
fn test_stages_need_concatenated_observations() -> Result<()> {
    let mut env = Pipeline::new(camera()).with(Grayscale)?;
    assert!(env.reset().is_err());
    assert!(env.observation_spec().is_err());
    Ok(())
}

#[test]
fn test_display() -> Result<()> {
    let env = Pipeline::new(camera())
        .with(ObservationConcatenation)?
        .with(MaxStep::new(10)?)?;
    assert_eq!(
        env.to_string(),
        "<MaxStep<ObservationConcatenation<DmControlAdapter<camera>>>>"
    );
    assert_eq!(
        env.stages(),
        vec![StageKind::ObservationConcatenation, StageKind::MaxStep]
    );
    assert_eq!(env.unwrapped().name(), "DmControlAdapter<camera>");
    Ok(())
}
