//! Classic-control environments of the `gym` package.
use super::to_arrayd_f32;
use crate::adapter::{GymBackend, Space};
use anyhow::Result;
use log::{info, trace};
use ndarray::ArrayD;
use numpy::PyArrayDyn;
use pyo3::{
    types::{PyModule, PyTuple},
    IntoPy, PyAny, PyObject, PyResult, Python,
};
use surreal_core::Info;

/// An environment of the `gym` package with the `(obs, reward, done, info)` step API.
pub struct PyGymBackend {
    env: PyObject,
    name: String,
    observation_space: Space,
    action_space: Space,
}

fn space(space: &PyAny) -> PyResult<Space> {
    if let Ok(n) = space.getattr("n") {
        return Ok(Space::Discrete(n.extract()?));
    }
    Ok(Space::Box {
        shape: space.getattr("shape")?.extract()?,
        low: to_arrayd_f32(space.getattr("low")?)?.into_raw_vec(),
        high: to_arrayd_f32(space.getattr("high")?)?.into_raw_vec(),
    })
}

impl PyGymBackend {
    /// Makes environment `name`, e.g. `Pendulum-v1`.
    pub fn new(name: &str, seed: Option<u64>) -> Result<Self> {
        Python::with_gil(|py| {
            let gym: &PyModule = py.import("gym")?;
            let env = gym.getattr("make")?.call1((name,))?;
            if let Some(seed) = seed {
                env.call_method1("seed", (seed,))?;
            }
            let observation_space = space(env.getattr("observation_space")?)?;
            let action_space = space(env.getattr("action_space")?)?;
            info!("Make gym environment {}", name);
            info!("Observation space = {:?}", observation_space);
            info!("Action space = {:?}", action_space);

            Ok(Self {
                env: env.into_py(py),
                name: name.to_string(),
                observation_space,
                action_space,
            })
        })
    }
}

impl GymBackend for PyGymBackend {
    fn reset(&mut self) -> Result<ArrayD<f32>> {
        trace!("PyGymBackend::reset()");
        Python::with_gil(|py| {
            let obs = self.env.call_method0(py, "reset")?;
            Ok(to_arrayd_f32(obs.as_ref(py))?)
        })
    }

    fn step(&mut self, a: &ArrayD<f32>) -> Result<(ArrayD<f32>, f32, bool, Info)> {
        trace!("PyGymBackend::step()");
        Python::with_gil(|py| {
            let a_py = PyArrayDyn::<f32>::from_array(py, a);
            let ret = self.env.call_method1(py, "step", (a_py,))?;
            let step: &PyTuple = ret.extract(py)?;
            let obs = to_arrayd_f32(step.get_item(0))?;
            let reward: f32 = step.get_item(1).extract()?;
            let done: bool = step.get_item(2).extract()?;
            Ok((obs, reward, done, Info::empty()))
        })
    }

    fn observation_space(&self) -> Space {
        self.observation_space.clone()
    }

    fn action_space(&self) -> Space {
        self.action_space.clone()
    }

    fn close(&mut self) -> Result<()> {
        Python::with_gil(|py| {
            self.env.call_method0(py, "close")?;
            Ok(())
        })
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}
