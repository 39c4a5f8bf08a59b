//! Tasks of `dm_control.suite` observed through pixels.
use super::to_array;
use crate::adapter::{DmControlBackend, StepType, TimeStep, PIXEL_SIZE};
use anyhow::Result;
use log::{info, trace};
use ndarray::{Array3, ArrayD};
use numpy::{PyArray3, PyArrayDyn};
use pyo3::{
    types::{IntoPyDict, PyDict, PyModule},
    IntoPy, PyAny, PyObject, PyResult, Python,
};
use surreal_core::{ArraySpec, BoundedArraySpec, DType, SurrealError};

/// A task of `dm_control.suite` wrapped so that observations are pixels rendered by
/// camera 0.
pub struct PyDmControlBackend {
    env: PyObject,
    name: String,
    observation_spec: Vec<(String, ArraySpec)>,
    action_spec: BoundedArraySpec,
}

fn dtype(spec: &PyAny) -> Result<DType> {
    let name: String = spec.getattr("dtype")?.str()?.extract()?;
    match name.as_str() {
        "uint8" => Ok(DType::U8),
        "float32" => Ok(DType::F32),
        "float64" => Ok(DType::F64),
        _ => Err(SurrealError::UnsupportedSpace(format!("dtype {}", name)).into()),
    }
}

fn array_spec(name: &str, spec: &PyAny) -> Result<ArraySpec> {
    let shape: Vec<usize> = spec.getattr("shape")?.extract()?;
    Ok(ArraySpec::new(shape, dtype(spec)?, Some(name)))
}

fn bounds(spec: &PyAny, attr: &str, len: usize) -> PyResult<Vec<f64>> {
    let v = spec.getattr(attr)?;
    let v: Vec<f64> = match v.extract::<&PyArrayDyn<f64>>() {
        Ok(a) => a.to_owned_array().into_raw_vec(),
        Err(_) => vec![v.extract::<f64>()?],
    };
    // Scalar bounds apply to every element
    match v[..] {
        [b] => Ok(vec![b; len]),
        _ => Ok(v),
    }
}

fn time_step(ts: &PyAny) -> Result<TimeStep> {
    let step_type = if ts.call_method0("first")?.extract()? {
        StepType::First
    } else if ts.call_method0("last")?.extract()? {
        StepType::Last
    } else {
        StepType::Mid
    };
    let obs: &PyDict = ts.getattr("observation")?.extract()?;
    let observation = obs
        .iter()
        .map(|(k, v)| Ok((k.extract::<String>()?, to_array(v)?)))
        .collect::<PyResult<Vec<_>>>()?;

    Ok(TimeStep {
        step_type,
        reward: ts.getattr("reward")?.extract()?,
        discount: ts.getattr("discount")?.extract()?,
        observation,
    })
}

impl PyDmControlBackend {
    /// Loads `task` of `domain`, e.g. `cheetah` and `run`.
    pub fn new(domain: &str, task: &str, seed: Option<u64>) -> Result<Self> {
        Python::with_gil(|py| {
            let suite: &PyModule = py.import("dm_control.suite")?;
            let pixels: &PyModule = py.import("dm_control.suite.wrappers.pixels")?;

            let task_kwargs = match seed {
                Some(seed) => vec![("random", seed)].into_py_dict(py),
                None => PyDict::new(py),
            };
            let kwargs = vec![("task_kwargs", task_kwargs)].into_py_dict(py);
            let env = suite.getattr("load")?.call((domain, task), Some(kwargs))?;

            let render_kwargs = vec![
                ("height", PIXEL_SIZE as i64),
                ("width", PIXEL_SIZE as i64),
                ("camera_id", 0),
            ]
            .into_py_dict(py);
            let kwargs = vec![("render_kwargs", render_kwargs)].into_py_dict(py);
            let env = pixels.getattr("Wrapper")?.call((env,), Some(kwargs))?;

            let specs: &PyDict = env.call_method0("observation_spec")?.extract()?;
            let observation_spec = specs
                .iter()
                .map(|(k, v)| {
                    let k: String = k.extract()?;
                    let spec = array_spec(&k, v)?;
                    Ok((k, spec))
                })
                .collect::<Result<Vec<_>>>()?;

            let spec = env.call_method0("action_spec")?;
            let shape: Vec<usize> = spec.getattr("shape")?.extract()?;
            let len = shape.iter().product();
            let action_spec = BoundedArraySpec {
                spec: ArraySpec::new(shape, dtype(spec)?, None),
                minimum: bounds(spec, "minimum", len)?,
                maximum: bounds(spec, "maximum", len)?,
            };

            let name = format!("{}-{}", domain, task);
            info!("Load dm_control task {}", name);
            info!("Observation spec = {:?}", observation_spec);
            info!("Action spec = {:?}", action_spec);

            Ok(Self {
                env: env.into_py(py),
                name,
                observation_spec,
                action_spec,
            })
        })
    }
}

impl DmControlBackend for PyDmControlBackend {
    fn reset(&mut self) -> Result<TimeStep> {
        trace!("PyDmControlBackend::reset()");
        Python::with_gil(|py| time_step(self.env.call_method0(py, "reset")?.as_ref(py)))
    }

    fn step(&mut self, a: &ArrayD<f64>) -> Result<TimeStep> {
        trace!("PyDmControlBackend::step()");
        Python::with_gil(|py| {
            let a_py = PyArrayDyn::<f64>::from_array(py, a);
            time_step(self.env.call_method1(py, "step", (a_py,))?.as_ref(py))
        })
    }

    fn observation_spec(&self) -> Vec<(String, ArraySpec)> {
        self.observation_spec.clone()
    }

    fn action_spec(&self) -> BoundedArraySpec {
        self.action_spec.clone()
    }

    fn render_pixels(&mut self, width: usize, height: usize, camera_id: i32) -> Result<Array3<u8>> {
        Python::with_gil(|py| {
            let physics = self.env.getattr(py, "physics")?;
            let kwargs = vec![
                ("height", height as i64),
                ("width", width as i64),
                ("camera_id", camera_id as i64),
            ]
            .into_py_dict(py);
            let frame = physics.call_method(py, "render", (), Some(kwargs))?;
            let frame: &PyArray3<u8> = frame.extract(py)?;
            Ok(frame.to_owned_array())
        })
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
