use crate::Mat;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use surreal_core::SurrealError;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(try_from = "MlpParams")]
/// Multilayer perceptron with ReLU activation function and tanh output.
///
/// Deserialized parameters go through the same checks as [`Mlp::new`].
pub struct Mlp {
    /// Weights of layers.
    ws: Vec<Mat>,

    /// Biases of layers.
    bs: Vec<Mat>,
}

/// Parameters of an [`Mlp`] before their shapes are checked.
#[derive(Deserialize)]
struct MlpParams {
    ws: Vec<Mat>,
    bs: Vec<Mat>,
}

impl TryFrom<MlpParams> for Mlp {
    type Error = anyhow::Error;

    fn try_from(p: MlpParams) -> Result<Self> {
        Self::new(p.ws, p.bs)
    }
}

impl Mlp {
    /// Constructs an MLP from weights of shape `(out, in)` and biases of shape `(out, 1)`.
    pub fn new(ws: Vec<Mat>, bs: Vec<Mat>) -> Result<Self> {
        if ws.is_empty() || ws.len() != bs.len() {
            return Err(SurrealError::ShapeInvariant(format!(
                "{} weights and {} biases",
                ws.len(),
                bs.len()
            ))
            .into());
        }
        for (i, (w, b)) in ws.iter().zip(bs.iter()).enumerate() {
            w.check()?;
            b.check()?;
            let fits_prev = i == 0 || ws[i - 1].rows() == w.cols();
            if !fits_prev || b.shape != [w.rows() as i32, 1] {
                return Err(SurrealError::ShapeInvariant(format!(
                    "layer {} has weight {:?} and bias {:?}",
                    i, w.shape, b.shape
                ))
                .into());
            }
        }
        Ok(Self { ws, bs })
    }

    /// An MLP with layer sizes `dims`, including input and output, and uniform random
    /// weights in `[-1/sqrt(in), 1/sqrt(in)]`.
    pub fn random(dims: &[usize], seed: u64) -> Result<Self> {
        let rng = fastrand::Rng::with_seed(seed);
        let uniform = |rows: usize, cols: usize, fan_in: usize| {
            let bound = 1.0 / (fan_in as f32).sqrt();
            let data = (0..rows * cols)
                .map(|_| (rng.f32() * 2.0 - 1.0) * bound)
                .collect();
            Mat {
                data,
                shape: vec![rows as _, cols as _],
            }
        };
        let (ws, bs) = dims
            .windows(2)
            .map(|d| (uniform(d[1], d[0], d[0]), uniform(d[1], 1, d[0])))
            .unzip();
        Self::new(ws, bs)
    }

    /// Dimension of inputs.
    pub fn in_dim(&self) -> usize {
        self.ws[0].cols()
    }

    /// Dimension of outputs.
    pub fn out_dim(&self) -> usize {
        self.ws[self.ws.len() - 1].rows()
    }

    pub fn forward(&self, x: &Mat) -> Result<Mat> {
        let n_layers = self.ws.len();
        let mut x = x.clone();
        for i in 0..n_layers {
            x = self.ws[i].matmul(&x)?.add(&self.bs[i])?;
            if i != n_layers - 1 {
                x = x.relu();
            }
        }
        Ok(x.tanh())
    }
}
