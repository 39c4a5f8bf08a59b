//! Grayscale conversion of the visual component.
use super::{expect_split, expect_split_spec, visual_dims, Stage, StageKind};
use anyhow::Result;
use ndarray::{Array3, Axis};
use surreal_core::{
    ArraySpec, EnvSpec, Info, Observation, ObservationSpec, SpecFormat, Step, SurrealError,
};

/// Averages a `(c, h, w)` image over its channels into a `(1, h, w)` image.
///
/// The mean is the integer (floor) mean of the channel values.
pub fn grayscale(visual: &Array3<u8>) -> Result<Array3<u8>> {
    let c = visual.shape()[0] as u32;
    if c == 0 {
        return Err(SurrealError::ShapeInvariant(
            "visual observation without channels".to_string(),
        )
        .into());
    }
    let sum = visual.mapv(u32::from).sum_axis(Axis(0));
    Ok(sum.mapv(|s| (s / c) as u8).insert_axis(Axis(0)))
}

/// Converts the visual component to a single channel.
///
/// Observations without a visual component pass through unchanged.
#[derive(Clone, Debug, Default)]
pub struct Grayscale;

impl Grayscale {
    fn apply(obs: Observation) -> Result<Observation> {
        let mut obs = expect_split(obs, StageKind::Grayscale)?;
        if let Some(visual) = &obs.visual {
            obs.visual = Some(grayscale(visual)?);
        }
        Ok(obs.into())
    }
}

impl Stage for Grayscale {
    fn kind(&self) -> StageKind {
        StageKind::Grayscale
    }

    fn reset(&mut self, obs: Observation, info: Info) -> Result<(Observation, Info)> {
        Ok((Self::apply(obs)?, info))
    }

    fn step(&mut self, mut step: Step) -> Result<Step> {
        step.obs = Self::apply(step.obs)?;
        Ok(step)
    }

    fn observation_spec(&self, spec: ObservationSpec) -> Result<ObservationSpec> {
        let (visual, flat) = expect_split_spec(spec, self.kind())?;
        let visual = match visual {
            None => None,
            Some(v) => {
                let (_, h, w) = visual_dims(&v, self.kind())?;
                Some(ArraySpec::pixels(1, h, w))
            }
        };
        Ok(ObservationSpec::Classic(EnvSpec::split(visual, flat)))
    }

    fn spec_format(&self, _inner: SpecFormat) -> SpecFormat {
        SpecFormat::SurrealClassic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;
    use surreal_core::{Dim, SplitObs};

    #[test]
    fn test_channel_mean() -> Result<()> {
        let visual = Array3::from_shape_fn((3, 84, 84), |(c, h, w)| {
            ((c * 97 + h * 31 + w * 7) % 256) as u8
        });
        let gray = grayscale(&visual)?;
        assert_eq!(gray.shape(), &[1, 84, 84]);

        for h in 0..84 {
            for w in 0..84 {
                let sum: u32 = (0..3).map(|c| visual[[c, h, w]] as u32).sum();
                assert_eq!(gray[[0, h, w]] as u32, sum / 3);
            }
        }
        Ok(())
    }

    #[test]
    fn test_no_overflow_on_bright_pixels() -> Result<()> {
        let visual = Array3::from_elem((3, 2, 2), 255u8);
        assert_eq!(grayscale(&visual)?, Array3::from_elem((1, 2, 2), 255u8));
        Ok(())
    }

    #[test]
    fn test_flat_only_passes_through() -> Result<()> {
        let obs = SplitObs::new(None, Some(Array1::from(vec![1.0, 2.0])));
        let mut stage = Grayscale;
        let (out, _) = stage.reset(obs.clone().into(), Info::empty())?;
        assert_eq!(out, Observation::Split(obs));
        Ok(())
    }

    #[test]
    fn test_spec() -> Result<()> {
        let spec = ObservationSpec::Classic(EnvSpec::split(Some(ArraySpec::pixels(3, 84, 84)), Some(8)));
        match Grayscale.observation_spec(spec)? {
            ObservationSpec::Classic(EnvSpec {
                dim: Dim::Split(visual, flat),
                ..
            }) => {
                assert_eq!(visual.unwrap().shape, vec![1, 84, 84]);
                assert_eq!(flat, Some(8));
            }
            other => panic!("unexpected spec: {:?}", other),
        }

        let dict = ObservationSpec::DmControl(vec![]);
        assert!(Grayscale.observation_spec(dict).is_err());
        Ok(())
    }
}
