//! Arrays emitted by native backends.
use crate::DType;
use ndarray::ArrayD;
use num_traits::cast::AsPrimitive;

/// An n-dimensional array tagged with its element type.
///
/// Native backends report pixels as `u8` and proprioceptive features as `f32` or `f64`;
/// the element type is kept so that specs can state the dtype an agent receives.
#[derive(Clone, Debug, PartialEq)]
pub enum Array {
    /// Array of `u8`, typically pixels.
    U8Array(ArrayD<u8>),

    /// Array of `f32`.
    F32Array(ArrayD<f32>),

    /// Array of `f64`.
    F64Array(ArrayD<f64>),
}

impl Array {
    /// Shape of the array.
    pub fn shape(&self) -> &[usize] {
        match self {
            Self::U8Array(a) => a.shape(),
            Self::F32Array(a) => a.shape(),
            Self::F64Array(a) => a.shape(),
        }
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.shape().iter().product()
    }

    /// Returns `true` if the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element type.
    pub fn dtype(&self) -> DType {
        match self {
            Self::U8Array(_) => DType::U8,
            Self::F32Array(_) => DType::F32,
            Self::F64Array(_) => DType::F64,
        }
    }

    /// Elements in logical (row-major) order, cast to `T`.
    pub fn to_flat_vec<T>(&self) -> Vec<T>
    where
        T: Copy + 'static,
        u8: AsPrimitive<T>,
        f32: AsPrimitive<T>,
        f64: AsPrimitive<T>,
    {
        match self {
            Self::U8Array(a) => a.iter().map(|e| e.as_()).collect(),
            Self::F32Array(a) => a.iter().map(|e| e.as_()).collect(),
            Self::F64Array(a) => a.iter().map(|e| e.as_()).collect(),
        }
    }
}

impl From<ArrayD<u8>> for Array {
    fn from(a: ArrayD<u8>) -> Self {
        Self::U8Array(a)
    }
}

impl From<ArrayD<f32>> for Array {
    fn from(a: ArrayD<f32>) -> Self {
        Self::F32Array(a)
    }
}

impl From<ArrayD<f64>> for Array {
    fn from(a: ArrayD<f64>) -> Self {
        Self::F64Array(a)
    }
}
