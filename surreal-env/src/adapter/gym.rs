//! Adapter of classic-control backends.
use anyhow::Result;
use log::trace;
use ndarray::ArrayD;
use surreal_core::{
    Action, ActionSpec, Array, Env, EnvSpec, Info, Observation, ObservationSpec, SpecFormat,
    Step, SurrealError,
};

/// A space of a classic-control backend.
#[derive(Clone, Debug, PartialEq)]
pub enum Space {
    /// A box of continuous values.
    Box {
        /// Shape.
        shape: Vec<usize>,
        /// Lower bounds.
        low: Vec<f32>,
        /// Upper bounds.
        high: Vec<f32>,
    },

    /// `n` discrete values.
    Discrete(usize),
}

/// Native API of classic-control environments.
pub trait GymBackend {
    /// Resets the environment and returns the initial observation.
    fn reset(&mut self) -> Result<ArrayD<f32>>;

    /// Performs a step, returning `(observation, reward, done, info)`.
    fn step(&mut self, a: &ArrayD<f32>) -> Result<(ArrayD<f32>, f32, bool, Info)>;

    /// Space of observations.
    fn observation_space(&self) -> Space;

    /// Space of actions.
    fn action_space(&self) -> Space;

    /// Releases resources.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    /// Name of the environment, e.g. `Pendulum-v1`.
    fn name(&self) -> String;
}

/// Adapts a [`GymBackend`] to [`Env`].
///
/// Observations pass through unchanged and specs are `{type: continuous, dim: shape}`.
/// Only box spaces are supported.
pub struct GymAdapter<B: GymBackend> {
    backend: B,
}

impl<B: GymBackend> GymAdapter<B> {
    /// Constructs an adapter.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// The native backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn box_spec(space: Space, what: &str) -> Result<EnvSpec> {
        match space {
            Space::Box { shape, .. } => Ok(EnvSpec::continuous(shape)),
            Space::Discrete(n) => Err(SurrealError::UnsupportedSpace(format!(
                "discrete {} space with {} values",
                what, n
            ))
            .into()),
        }
    }
}

impl<B: GymBackend> Env for GymAdapter<B> {
    fn reset(&mut self) -> Result<(Observation, Info)> {
        trace!("GymAdapter::reset()");
        let obs = self.backend.reset()?;
        Ok((Observation::Array(Array::F32Array(obs)), Info::empty()))
    }

    fn step(&mut self, a: &Action) -> Result<Step> {
        let (obs, reward, done, info) = self.backend.step(a)?;
        Ok(Step::new(
            Observation::Array(Array::F32Array(obs)),
            reward,
            done,
            info,
        ))
    }

    fn close(&mut self) -> Result<()> {
        self.backend.close()
    }

    fn observation_spec(&self) -> Result<ObservationSpec> {
        let spec = Self::box_spec(self.backend.observation_space(), "observation")?;
        Ok(ObservationSpec::Classic(spec))
    }

    fn action_spec(&self) -> Result<ActionSpec> {
        let spec = Self::box_spec(self.backend.action_space(), "action")?;
        Ok(ActionSpec::Classic(spec))
    }

    fn spec_format(&self) -> SpecFormat {
        SpecFormat::SurrealClassic
    }

    fn name(&self) -> String {
        format!("GymAdapter<{}>", self.backend.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;

    struct Counter {
        t: usize,
        action_space: Space,
    }

    impl GymBackend for Counter {
        fn reset(&mut self) -> Result<ArrayD<f32>> {
            self.t = 0;
            Ok(ArrayD::zeros(IxDyn(&[2])))
        }

        fn step(&mut self, _a: &ArrayD<f32>) -> Result<(ArrayD<f32>, f32, bool, Info)> {
            self.t += 1;
            let obs = ArrayD::from_elem(IxDyn(&[2]), self.t as f32);
            Ok((obs, 1.0, self.t == 2, Info::from_scalar("t", self.t as f32)))
        }

        fn observation_space(&self) -> Space {
            Space::Box {
                shape: vec![2],
                low: vec![0.0; 2],
                high: vec![10.0; 2],
            }
        }

        fn action_space(&self) -> Space {
            self.action_space.clone()
        }

        fn name(&self) -> String {
            "Counter".to_string()
        }
    }

    fn counter(action_space: Space) -> GymAdapter<Counter> {
        GymAdapter::new(Counter { t: 0, action_space })
    }

    #[test]
    fn test_passthrough() -> Result<()> {
        let mut env = counter(Space::Box {
            shape: vec![1],
            low: vec![-1.0],
            high: vec![1.0],
        });
        let (obs, info) = env.reset()?;
        assert!(info.is_empty());
        assert_eq!(obs.kind(), "array");

        let a = ArrayD::zeros(IxDyn(&[1]));
        let step = env.step(&a)?;
        assert!(!step.is_done());
        assert_eq!(step.info.get_scalar("t")?, 1.0);
        assert!(env.step(&a)?.is_done());

        assert_eq!(
            env.observation_spec()?,
            ObservationSpec::Classic(EnvSpec::continuous(vec![2]))
        );
        assert_eq!(
            env.action_spec()?,
            ActionSpec::Classic(EnvSpec::continuous(vec![1]))
        );
        assert_eq!(env.name(), "GymAdapter<Counter>");
        Ok(())
    }

    #[test]
    fn test_discrete_space_is_unsupported() {
        let env = counter(Space::Discrete(2));
        let err = env.action_spec().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SurrealError>(),
            Some(SurrealError::UnsupportedSpace(_))
        ));
    }
}
