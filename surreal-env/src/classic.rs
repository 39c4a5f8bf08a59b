//! Native classic-control backends.
use crate::adapter::{GymBackend, Space};
use anyhow::Result;
use ndarray::{Array1, ArrayD};
use std::f32::consts::PI;
use surreal_core::{Info, SurrealError};

const MAX_SPEED: f32 = 8.0;
const MAX_TORQUE: f32 = 2.0;
const DT: f32 = 0.05;
const G: f32 = 10.0;
const M: f32 = 1.0;
const L: f32 = 1.0;

fn angle_normalize(x: f32) -> f32 {
    (x + PI).rem_euclid(2.0 * PI) - PI
}

/// The inverted pendulum swing-up problem, `Pendulum-v1`.
///
/// Observation is `[cos(theta), sin(theta), theta_dot]` and action is the torque in
/// `[-2, 2]`. Episodes never terminate by themselves; use a step limit.
pub struct Pendulum {
    th: f32,
    thdot: f32,
    rng: fastrand::Rng,
}

impl Pendulum {
    /// Name of the environment.
    pub const NAME: &'static str = "Pendulum-v1";

    /// Constructs the environment. The initial state of episodes is drawn from `seed`
    /// if given.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self {
            th: 0.0,
            thdot: 0.0,
            rng,
        }
    }

    /// Current angle and angular velocity.
    pub fn state(&self) -> (f32, f32) {
        (self.th, self.thdot)
    }

    fn obs(&self) -> ArrayD<f32> {
        Array1::from(vec![self.th.cos(), self.th.sin(), self.thdot]).into_dyn()
    }
}

impl GymBackend for Pendulum {
    fn reset(&mut self) -> Result<ArrayD<f32>> {
        self.th = self.rng.f32() * 2.0 * PI - PI;
        self.thdot = self.rng.f32() * 2.0 - 1.0;
        Ok(self.obs())
    }

    fn step(&mut self, a: &ArrayD<f32>) -> Result<(ArrayD<f32>, f32, bool, Info)> {
        let u = a
            .iter()
            .next()
            .copied()
            .ok_or_else(|| SurrealError::ShapeInvariant("empty action".to_string()))?
            .clamp(-MAX_TORQUE, MAX_TORQUE);
        let (th, thdot) = (self.th, self.thdot);

        let cost = angle_normalize(th).powi(2) + 0.1 * thdot.powi(2) + 0.001 * u.powi(2);

        let newthdot = thdot + (3.0 * G / (2.0 * L) * th.sin() + 3.0 / (M * L * L) * u) * DT;
        let newthdot = newthdot.clamp(-MAX_SPEED, MAX_SPEED);
        self.th = th + newthdot * DT;
        self.thdot = newthdot;

        Ok((self.obs(), -cost, false, Info::empty()))
    }

    fn observation_space(&self) -> Space {
        Space::Box {
            shape: vec![3],
            low: vec![-1.0, -1.0, -MAX_SPEED],
            high: vec![1.0, 1.0, MAX_SPEED],
        }
    }

    fn action_space(&self) -> Space {
        Space::Box {
            shape: vec![1],
            low: vec![-MAX_TORQUE],
            high: vec![MAX_TORQUE],
        }
    }

    fn name(&self) -> String {
        Self::NAME.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;

    #[test]
    fn test_seeded_reset_is_reproducible() -> Result<()> {
        let mut p1 = Pendulum::new(Some(42));
        let mut p2 = Pendulum::new(Some(42));
        assert_eq!(p1.reset()?, p2.reset()?);

        let (th, thdot) = p1.state();
        assert!((-PI..PI).contains(&th));
        assert!((-1.0..1.0).contains(&thdot));
        Ok(())
    }

    #[test]
    fn test_upright_at_rest_costs_nothing() -> Result<()> {
        let mut p = Pendulum::new(Some(0));
        p.th = 0.0;
        p.thdot = 0.0;
        let (obs, reward, done, _) = p.step(&ArrayD::zeros(IxDyn(&[1])))?;
        assert_eq!(reward, 0.0);
        assert!(!done);
        assert_eq!(obs.as_slice().unwrap(), &[1.0, 0.0, 0.0]);
        Ok(())
    }

    #[test]
    fn test_torque_is_clipped() -> Result<()> {
        let mut p = Pendulum::new(Some(0));
        p.th = 0.0;
        p.thdot = 0.0;
        let (_, reward, _, _) = p.step(&ArrayD::from_elem(IxDyn(&[1]), 100.0))?;
        assert!((reward + 0.001 * 4.0).abs() < 1e-6);
        let (_, thdot) = p.state();
        assert!((thdot - 3.0 * MAX_TORQUE * DT).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_angle_normalize() {
        assert!((angle_normalize(2.0 * PI)).abs() < 1e-5);
        assert!((angle_normalize(PI / 2.0) - PI / 2.0).abs() < 1e-6);
    }
}
