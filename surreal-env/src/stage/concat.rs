//! Concatenation of named arrays into visual and flat components.
//!
//! This is a one-way transform: names and the boundaries between the flat arrays
//! are not kept, so the original mapping cannot be reconstructed from the output.
use super::{Stage, StageKind};
use anyhow::Result;
use ndarray::{Array1, Ix3};
use surreal_core::{
    ActionSpec, Array, ArraySpec, DType, EnvSpec, Info, Observation, ObservationSpec,
    SpecFormat, SplitObs, Step, SurrealError,
};

/// Splits named arrays into a visual and a flat component.
///
/// Rank-1 arrays are concatenated, in order, into the flat component. A single rank-3
/// `uint8` array, given as `(h, w, c)`, becomes the visual component in `(c, h, w)`
/// layout.
pub fn concatenate(items: Vec<(String, Array)>) -> Result<SplitObs> {
    let mut visual = None;
    let mut flat: Vec<f64> = vec![];

    for (key, arr) in items {
        match arr.ndim() {
            1 => flat.extend(arr.to_flat_vec::<f64>()),
            3 => {
                if visual.is_some() {
                    return Err(SurrealError::ShapeInvariant(format!(
                        "more than one visual observation, second one is {}",
                        key
                    ))
                    .into());
                }
                let pixels = match arr {
                    Array::U8Array(a) => a.into_dimensionality::<Ix3>()?,
                    other => {
                        return Err(SurrealError::ShapeInvariant(format!(
                            "visual observation {} must be uint8, got {:?}",
                            key,
                            other.dtype()
                        ))
                        .into())
                    }
                };
                visual = Some(pixels.permuted_axes([2, 0, 1]).as_standard_layout().into_owned());
            }
            n => {
                return Err(SurrealError::ShapeInvariant(format!(
                    "unrecognized rank {} of observation {}",
                    n, key
                ))
                .into())
            }
        }
    }

    Ok(SplitObs::new(visual, Some(Array1::from(flat))))
}

/// Concatenates named arrays of observations.
///
/// See [`concatenate`].
#[derive(Clone, Debug, Default)]
pub struct ObservationConcatenation;

impl ObservationConcatenation {
    fn apply(obs: Observation) -> Result<Observation> {
        match obs {
            Observation::Dict(items) => Ok(concatenate(items)?.into()),
            other => Err(SurrealError::ShapeInvariant(format!(
                "{} expects named arrays, got {}",
                StageKind::ObservationConcatenation,
                other.kind()
            ))
            .into()),
        }
    }
}

impl Stage for ObservationConcatenation {
    fn kind(&self) -> StageKind {
        StageKind::ObservationConcatenation
    }

    fn reset(&mut self, obs: Observation, info: Info) -> Result<(Observation, Info)> {
        Ok((Self::apply(obs)?, info))
    }

    fn step(&mut self, mut step: Step) -> Result<Step> {
        step.obs = Self::apply(step.obs)?;
        Ok(step)
    }

    /// Visual specs are declared channel first by the adapters and are kept as they are.
    fn observation_spec(&self, spec: ObservationSpec) -> Result<ObservationSpec> {
        let items = match spec {
            ObservationSpec::DmControl(items) => items,
            other => {
                return Err(SurrealError::ShapeInvariant(format!(
                    "{} expects a named array spec, got {:?}",
                    self.kind(),
                    other
                ))
                .into())
            }
        };

        let mut visual: Option<ArraySpec> = None;
        let mut flat = 0;
        for (key, s) in items {
            match s.shape.len() {
                1 => flat += s.shape[0],
                3 => {
                    if visual.is_some() {
                        return Err(SurrealError::ShapeInvariant(format!(
                            "more than one visual spec, second one is {}",
                            key
                        ))
                        .into());
                    }
                    if s.dtype != DType::U8 {
                        return Err(SurrealError::ShapeInvariant(format!(
                            "visual spec {} must be uint8",
                            key
                        ))
                        .into());
                    }
                    visual = Some(ArraySpec::new(s.shape, s.dtype, Some("pixels")));
                }
                n => {
                    return Err(SurrealError::ShapeInvariant(format!(
                        "unrecognized rank {} of spec {}",
                        n, key
                    ))
                    .into())
                }
            }
        }
        let flat = if flat == 0 { None } else { Some(flat) };

        Ok(ObservationSpec::Classic(EnvSpec::split(visual, flat)))
    }

    fn action_spec(&self, spec: ActionSpec) -> Result<ActionSpec> {
        let spec = spec.to_classic().ok_or_else(|| {
            SurrealError::ShapeInvariant("action spec without a shape".to_string())
        })?;
        Ok(ActionSpec::Classic(spec))
    }

    fn spec_format(&self, _inner: SpecFormat) -> SpecFormat {
        SpecFormat::SurrealClassic
    }
}
