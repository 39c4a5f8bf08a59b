//! Backends running Python simulators through [`pyo3`].
//!
//! [`PyGymBackend`] wraps an environment of the `gym` package and [`PyDmControlBackend`]
//! a task of `dm_control.suite` rendering `84x84` pixel observations.
mod dm_control;
mod gym;
pub use dm_control::PyDmControlBackend;
pub use gym::PyGymBackend;

use ndarray::ArrayD;
use numpy::PyArrayDyn;
use pyo3::{PyAny, PyResult};
use surreal_core::Array;

/// Converts a numpy array of floats to [`ArrayD<f32>`].
pub(crate) fn to_arrayd_f32(obj: &PyAny) -> PyResult<ArrayD<f32>> {
    if let Ok(a) = obj.extract::<&PyArrayDyn<f32>>() {
        Ok(a.to_owned_array())
    } else {
        let a: &PyArrayDyn<f64> = obj.extract()?;
        Ok(a.to_owned_array().mapv(|v| v as f32))
    }
}

/// Converts a numpy array, or a float, to [`Array`].
pub(crate) fn to_array(obj: &PyAny) -> PyResult<Array> {
    if let Ok(a) = obj.extract::<&PyArrayDyn<u8>>() {
        Ok(Array::U8Array(a.to_owned_array()))
    } else if let Ok(a) = obj.extract::<&PyArrayDyn<f32>>() {
        Ok(Array::F32Array(a.to_owned_array()))
    } else if let Ok(a) = obj.extract::<&PyArrayDyn<f64>>() {
        Ok(Array::F64Array(a.to_owned_array()))
    } else {
        let v: f64 = obj.extract()?;
        Ok(Array::F64Array(ArrayD::from_elem(ndarray::IxDyn(&[1]), v)))
    }
}
