//! Stacking of the last frames.
use super::{expect_split, expect_split_spec, visual_dims, Stage, StageKind};
use anyhow::Result;
use log::trace;
use ndarray::{concatenate, Axis};
use std::collections::VecDeque;
use surreal_core::{
    ArraySpec, EnvSpec, Info, Observation, ObservationSpec, SpecFormat, SplitObs, Step,
    SurrealError,
};

/// Stacks the visual components of the last `n` observations along the channel axis.
///
/// The flat component is taken from the most recent observation only. On reset the
/// history is filled with `n` copies of the initial observation; every step pushes
/// one observation and evicts the oldest one.
#[derive(Clone, Debug)]
pub struct FrameStack {
    n: usize,

    // `None` until the first reset.
    history: Option<VecDeque<SplitObs>>,
}

impl FrameStack {
    /// Constructs a stage stacking `n` frames.
    pub fn new(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(SurrealError::Config("FrameStack needs at least one frame".to_string()).into());
        }
        Ok(Self { n, history: None })
    }

    /// Number of stacked frames.
    pub fn n_stack(&self) -> usize {
        self.n
    }

    /// Returns `true` after the first reset.
    pub fn is_primed(&self) -> bool {
        self.history.is_some()
    }

    fn stacked(history: &VecDeque<SplitObs>) -> Result<SplitObs> {
        let (first, last) = match (history.front(), history.back()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(SurrealError::ShapeInvariant("empty frame history".to_string()).into()),
        };

        let visual = match first.visual {
            None => None,
            Some(_) => {
                let views = history
                    .iter()
                    .map(|o| {
                        o.visual.as_ref().map(|v| v.view()).ok_or_else(|| {
                            SurrealError::ShapeInvariant(
                                "visual component missing in some frames".to_string(),
                            )
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Some(concatenate(Axis(0), &views)?)
            }
        };

        Ok(SplitObs {
            visual,
            flat: last.flat.clone(),
        })
    }
}

impl Stage for FrameStack {
    fn kind(&self) -> StageKind {
        StageKind::FrameStack
    }

    fn reset(&mut self, obs: Observation, info: Info) -> Result<(Observation, Info)> {
        trace!("FrameStack::reset()");
        let obs = expect_split(obs, self.kind())?;
        let history = (0..self.n).map(|_| obs.clone()).collect::<VecDeque<_>>();
        let stacked = Self::stacked(&history)?;
        self.history = Some(history);
        Ok((stacked.into(), info))
    }

    fn step(&mut self, mut step: Step) -> Result<Step> {
        let obs = expect_split(step.obs, StageKind::FrameStack)?;
        let history = self
            .history
            .as_mut()
            .ok_or_else(|| SurrealError::NotReset(StageKind::FrameStack.to_string()))?;
        history.push_back(obs);
        while history.len() > self.n {
            history.pop_front();
        }
        step.obs = Self::stacked(history)?.into();
        Ok(step)
    }

    fn observation_spec(&self, spec: ObservationSpec) -> Result<ObservationSpec> {
        let (visual, flat) = expect_split_spec(spec, self.kind())?;
        let visual = match visual {
            None => None,
            Some(v) => {
                let (c, h, w) = visual_dims(&v, self.kind())?;
                Some(ArraySpec::pixels(c * self.n, h, w))
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
    use ndarray::{s, Array1, Array3};

    fn frame(v: u8, f: f64) -> Observation {
        SplitObs::new(
            Some(Array3::from_elem((1, 84, 84), v)),
            Some(Array1::from(vec![f, f])),
        )
        .into()
    }

    fn step_of(obs: Observation) -> Step {
        Step::new(obs, 0.0, false, Info::empty())
    }

    #[test]
    fn test_reset_fills_history() -> Result<()> {
        let mut stage = FrameStack::new(4)?;
        assert!(!stage.is_primed());

        let (obs, _) = stage.reset(frame(7, 1.0), Info::empty())?;
        assert!(stage.is_primed());

        let obs = obs.as_split().unwrap().clone();
        let visual = obs.visual.unwrap();
        assert_eq!(visual.shape(), &[4, 84, 84]);
        assert!(visual.iter().all(|&v| v == 7));
        assert_eq!(obs.flat.unwrap().to_vec(), vec![1.0, 1.0]);
        Ok(())
    }

    #[test]
    fn test_step_evicts_oldest() -> Result<()> {
        let mut stage = FrameStack::new(4)?;
        stage.reset(frame(0, 0.0), Info::empty())?;

        let step = stage.step(step_of(frame(1, 1.0)))?;
        let obs = step.obs.as_split().unwrap();
        let visual = obs.visual.as_ref().unwrap();
        assert!(visual.slice(s![0..3, .., ..]).iter().all(|&v| v == 0));
        assert!(visual.slice(s![3, .., ..]).iter().all(|&v| v == 1));
        // Flat component is not accumulated
        assert_eq!(obs.flat.as_ref().unwrap().to_vec(), vec![1.0, 1.0]);

        for i in 2..6 {
            stage.step(step_of(frame(i, i as f64)))?;
        }
        let step = stage.step(step_of(frame(6, 6.0)))?;
        let visual = step.obs.as_split().unwrap().visual.clone().unwrap();
        let firsts: Vec<u8> = (0..4).map(|c| visual[[c, 0, 0]]).collect();
        assert_eq!(firsts, vec![3, 4, 5, 6]);
        Ok(())
    }

    #[test]
    fn test_step_before_reset() -> Result<()> {
        let mut stage = FrameStack::new(2)?;
        let err = stage.step(step_of(frame(0, 0.0))).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SurrealError>(),
            Some(SurrealError::NotReset(_))
        ));
        Ok(())
    }

    #[test]
    fn test_flat_only() -> Result<()> {
        let mut stage = FrameStack::new(3)?;
        let obs = SplitObs::new(None, Some(Array1::from(vec![1.0])));
        let (out, _) = stage.reset(obs.clone().into(), Info::empty())?;
        assert_eq!(out, Observation::Split(obs));
        Ok(())
    }

    #[test]
    fn test_spec() -> Result<()> {
        let stage = FrameStack::new(4)?;
        let spec = ObservationSpec::Classic(EnvSpec::split(Some(ArraySpec::pixels(1, 84, 84)), Some(8)));
        assert_eq!(
            stage.observation_spec(spec)?,
            ObservationSpec::Classic(EnvSpec::split(Some(ArraySpec::pixels(4, 84, 84)), Some(8)))
        );
        assert!(FrameStack::new(0).is_err());
        Ok(())
    }
}
