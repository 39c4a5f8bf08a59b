//! An agent acting with an [`Mlp`].
use crate::{Mat, Mlp};
use anyhow::Result;
use log::trace;
use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};
use surreal_core::{Action, Observation, Policy, SurrealError};

/// Configuration of [`MlpAgent`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct AgentConfig {
    /// Scale applied to the outputs of the model, which are in `[-1, 1]`.
    #[serde(default = "default_action_scale")]
    pub action_scale: f32,
}

fn default_action_scale() -> f32 {
    1.0
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            action_scale: default_action_scale(),
        }
    }
}

impl AgentConfig {
    /// Sets the scale of actions.
    pub fn action_scale(mut self, v: f32) -> Self {
        self.action_scale = v;
        self
    }
}

/// A deterministic agent.
///
/// The input of the model is the visual component scaled to `[0, 1]`, if any, followed by
/// the flat component. Observations which are a single array are fed as they are.
pub struct MlpAgent {
    model: Mlp,
    config: AgentConfig,
}

impl MlpAgent {
    /// Constructs an agent.
    pub fn new(model: Mlp, config: AgentConfig) -> Self {
        Self { model, config }
    }

    /// The model.
    pub fn model(&self) -> &Mlp {
        &self.model
    }

    fn features(obs: &Observation) -> Result<Vec<f32>> {
        match obs {
            Observation::Array(a) => Ok(a.to_flat_vec()),
            Observation::Split(s) => {
                let mut x: Vec<f32> = match &s.visual {
                    Some(v) => v.iter().map(|p| *p as f32 / 255.0).collect(),
                    None => vec![],
                };
                if let Some(flat) = &s.flat {
                    x.extend(flat.iter().map(|v| *v as f32));
                }
                Ok(x)
            }
            Observation::Dict(_) => Err(SurrealError::ShapeInvariant(
                "MlpAgent expects concatenated observations, got dict".to_string(),
            )
            .into()),
        }
    }
}

impl Policy for MlpAgent {
    fn act(&mut self, obs: &Observation) -> Result<Action> {
        trace!("MlpAgent::act()");
        let x = Self::features(obs)?;
        if x.len() != self.model.in_dim() {
            return Err(SurrealError::ShapeInvariant(format!(
                "model takes {} features, observation has {}",
                self.model.in_dim(),
                x.len()
            ))
            .into());
        }
        let y: Mat = self.model.forward(&x.into())?.scale(self.config.action_scale);
        Ok(ArrayD::from_shape_vec(IxDyn(&[y.data.len()]), y.data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array3};
    use surreal_core::{Array, SplitObs};

    #[test]
    fn test_act_on_split_observation() -> Result<()> {
        let model = Mlp::random(&[2 * 2 + 3, 4, 2], 1)?;
        let mut agent = MlpAgent::new(model.clone(), AgentConfig::default().action_scale(2.0));

        let visual = Array3::from_elem((1, 2, 2), 255u8);
        let flat = Array1::from(vec![0.1, 0.2, 0.3]);
        let obs: Observation = SplitObs::new(Some(visual), Some(flat)).into();
        let a = agent.act(&obs)?;
        assert_eq!(a.shape(), &[2]);

        let x: Mat = vec![1.0, 1.0, 1.0, 1.0, 0.1, 0.2, 0.3].into();
        let expected = model.forward(&x)?.scale(2.0);
        for (a, e) in a.iter().zip(expected.data.iter()) {
            assert!((a - e).abs() < 1e-6);
        }
        Ok(())
    }

    #[test]
    fn test_act_on_array_observation() -> Result<()> {
        let mut agent = MlpAgent::new(Mlp::random(&[3, 1], 0)?, AgentConfig::default());
        let obs = Observation::Array(Array::F32Array(ArrayD::zeros(IxDyn(&[3]))));
        assert_eq!(agent.act(&obs)?.shape(), &[1]);

        let obs = Observation::Array(Array::F32Array(ArrayD::zeros(IxDyn(&[4]))));
        assert!(agent.act(&obs).is_err());
        assert!(agent.act(&Observation::Dict(vec![])).is_err());
        Ok(())
    }
}
