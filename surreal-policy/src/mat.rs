use anyhow::Result;
use serde::{Deserialize, Serialize};
use surreal_core::SurrealError;

fn size_error(op: &str, a: &[i32], b: &[i32]) -> anyhow::Error {
    SurrealError::ShapeInvariant(format!("{} of matrices of sizes {:?} and {:?}", op, a, b)).into()
}

/// A row-major matrix.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Mat {
    pub data: Vec<f32>,
    pub shape: Vec<i32>,
}

impl Mat {
    /// A `(rows, cols)` matrix filled with zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0.0; rows * cols],
            shape: vec![rows as _, cols as _],
        }
    }

    /// Checks that the matrix is 2-dimensional and `data` fits its shape.
    pub fn check(&self) -> Result<()> {
        let len = match self.shape[..] {
            [rows, cols] if rows >= 0 && cols >= 0 => (rows as usize).checked_mul(cols as usize),
            _ => None,
        };
        if len != Some(self.data.len()) {
            return Err(SurrealError::ShapeInvariant(format!(
                "matrix of shape {:?} with {} elements",
                self.shape,
                self.data.len()
            ))
            .into());
        }
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.shape[0] as _
    }

    pub fn cols(&self) -> usize {
        self.shape[1] as _
    }

    pub fn matmul(&self, x: &Mat) -> Result<Self> {
        if self.cols() != x.rows() {
            return Err(size_error("Product", &self.shape, &x.shape));
        }
        let (m, l, n) = (self.rows(), self.cols(), x.cols());
        let mut data = vec![0.0f32; m * n];
        for i in 0..m {
            for j in 0..n {
                let kk = i * n + j;
                for k in 0..l {
                    data[kk] += self.data[i * l + k] * x.data[k * n + j];
                }
            }
        }

        Ok(Self {
            shape: vec![m as _, n as _],
            data,
        })
    }

    pub fn add(&self, x: &Mat) -> Result<Self> {
        if self.shape != x.shape {
            return Err(size_error("Sum", &self.shape, &x.shape));
        }

        let data = self
            .data
            .iter()
            .zip(x.data.iter())
            .map(|(a, b)| *a + *b)
            .collect();

        Ok(Mat {
            data,
            shape: self.shape.clone(),
        })
    }

    pub fn relu(&self) -> Self {
        self.map(|a| a.max(0.0))
    }

    pub fn tanh(&self) -> Self {
        self.map(f32::tanh)
    }

    pub fn scale(&self, s: f32) -> Self {
        self.map(|a| a * s)
    }

    fn map(&self, f: impl Fn(f32) -> f32) -> Self {
        Self {
            data: self.data.iter().map(|a| f(*a)).collect(),
            shape: self.shape.clone(),
        }
    }
}

/// A column vector.
impl From<Vec<f32>> for Mat {
    fn from(x: Vec<f32>) -> Self {
        let shape = vec![x.len() as i32, 1];
        Self { shape, data: x }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matmul() -> Result<()> {
        let x = Mat {
            data: vec![1.0, 2., 3., 4., 5., 6.],
            shape: vec![2, 3],
        };
        let y: Mat = vec![7.0, 8., 9.].into();
        let z = x.matmul(&y)?;
        assert_eq!(z, vec![50.0, 122.].into());
        assert!(y.matmul(&x).is_err());
        Ok(())
    }

    #[test]
    fn test_check() {
        assert!(Mat::zeros(2, 3).check().is_ok());
        for shape in [vec![2, 2], vec![4], vec![1, 2, 2], vec![-2, -2]] {
            let x = Mat {
                data: vec![0.0; 4],
                shape,
            };
            assert!(x.check().is_err(), "{:?}", x.shape);
        }
    }

    #[test]
    fn test_elementwise() -> Result<()> {
        let x: Mat = vec![-1.0, 0.5].into();
        assert_eq!(x.relu(), vec![0.0, 0.5].into());
        assert_eq!(x.add(&x)?.scale(0.5), x);
        assert!(x.add(&Mat::zeros(3, 1)).is_err());
        assert_eq!(Mat::zeros(2, 1).tanh(), Mat::zeros(2, 1));
        Ok(())
    }
}
