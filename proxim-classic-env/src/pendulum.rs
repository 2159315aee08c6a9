//! Pendulum environment.
use crate::{ClassicObs, ContinuousAct};
use anyhow::Result;
use log::debug;
use ndarray::arr1;
use proxim_core::{record::Record, ActionSpace, Env, Step};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

const MAX_SPEED: f32 = 8.0;
const MAX_TORQUE: f32 = 2.0;
const DT: f32 = 0.05;
const G: f32 = 10.0;
const M: f32 = 1.0;
const L: f32 = 1.0;

/// Configuration of [`PendulumEnv`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct PendulumEnvConfig {
    /// The episode is truncated after this many steps.
    pub max_steps: usize,

    /// Whether to log the state of every step at debug level.
    pub render: bool,
}

impl Default for PendulumEnvConfig {
    fn default() -> Self {
        Self {
            max_steps: 200,
            render: false,
        }
    }
}

impl PendulumEnvConfig {
    /// Sets the number of steps after which the episode is truncated.
    pub fn max_steps(mut self, v: usize) -> Self {
        self.max_steps = v;
        self
    }

    /// Sets whether to log the state of every step.
    pub fn render(mut self, v: bool) -> Self {
        self.render = v;
        self
    }
}

/// The inverted-pendulum swing-up problem with a single continuous torque
/// action.
///
/// The observation is `[cos(θ), sin(θ), θ_dot]`, which avoids the
/// discontinuity of the wrapped angle. Episodes never terminate; they are
/// truncated after `max_steps` steps.
pub struct PendulumEnv {
    theta: f32,
    theta_dot: f32,
    steps: usize,
    max_steps: usize,
    render: bool,
    rng: fastrand::Rng,
}

impl PendulumEnv {
    fn obs(&self) -> ClassicObs {
        ClassicObs(arr1(&[self.theta.cos(), self.theta.sin(), self.theta_dot]))
    }

    fn uniform(&mut self, low: f32, high: f32) -> f32 {
        low + (high - low) * self.rng.f32()
    }

    fn angle_normalize(x: f32) -> f32 {
        (x + PI).rem_euclid(2.0 * PI) - PI
    }
}

impl Env for PendulumEnv {
    type Config = PendulumEnvConfig;
    type Obs = ClassicObs;
    type Act = ContinuousAct;
    type Info = ();

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        Ok(Self {
            theta: 0.0,
            theta_dot: 0.0,
            steps: 0,
            max_steps: config.max_steps,
            render: config.render,
            rng: fastrand::Rng::with_seed(seed as u64),
        })
    }

    fn step(&mut self, act: &Self::Act) -> (Step<Self>, Record) {
        let torque = act.0[0].clamp(-MAX_TORQUE, MAX_TORQUE);

        let theta_acc =
            (3.0 * G / (2.0 * L)) * self.theta.sin() + (3.0 / (M * L * L)) * torque;
        self.theta_dot = (self.theta_dot + theta_acc * DT).clamp(-MAX_SPEED, MAX_SPEED);
        self.theta = Self::angle_normalize(self.theta + self.theta_dot * DT);
        self.steps += 1;

        let reward = -(self.theta.powi(2)
            + 0.1 * self.theta_dot.powi(2)
            + 0.001 * torque.powi(2));

        if self.render {
            debug!(
                "theta = {}, theta_dot = {}, torque = {}, reward = {}",
                self.theta, self.theta_dot, torque, reward
            );
        }

        let is_truncated = (self.steps >= self.max_steps) as i8;
        let step = Step::new(
            self.obs(),
            act.clone(),
            vec![reward],
            vec![0],
            vec![is_truncated],
            (),
        );

        (step, Record::empty())
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        self.theta = self.uniform(-PI, PI);
        self.theta_dot = self.uniform(-1.0, 1.0);
        self.steps = 0;
        Ok(self.obs())
    }

    fn action_space(&self) -> ActionSpace {
        ActionSpace::Continuous {
            dim: 1,
            low: -MAX_TORQUE,
            high: MAX_TORQUE,
        }
    }

    fn observation_shape(&self) -> Vec<i64> {
        vec![3]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn episodes_never_terminate_and_truncate_at_max_steps() -> Result<()> {
        let mut env = PendulumEnv::build(&PendulumEnvConfig::default().max_steps(10), 0)?;
        let _ = env.reset()?;

        let act = ContinuousAct(arr1(&[0.5]));
        for i in 0..10 {
            let (step, _) = env.step(&act);
            assert_eq!(step.is_terminated[0], 0);
            assert_eq!(step.is_truncated[0], (i == 9) as i8);
        }
        Ok(())
    }

    #[test]
    fn torque_is_clamped_to_the_action_space() -> Result<()> {
        let mut env = PendulumEnv::build(&PendulumEnvConfig::default(), 7)?;
        let _ = env.reset()?;

        // A torque far outside the bounds must behave like the bound
        // itself.
        let mut env2 = PendulumEnv::build(&PendulumEnvConfig::default(), 7)?;
        let _ = env2.reset()?;

        let (step1, _) = env.step(&ContinuousAct(arr1(&[100.0])));
        let (step2, _) = env2.step(&ContinuousAct(arr1(&[MAX_TORQUE])));
        assert_eq!(step1.obs.0, step2.obs.0);
        Ok(())
    }

    #[test]
    fn the_angle_stays_wrapped() -> Result<()> {
        let mut env = PendulumEnv::build(&PendulumEnvConfig::default(), 1)?;
        let _ = env.reset()?;

        let act = ContinuousAct(arr1(&[MAX_TORQUE]));
        for _ in 0..100 {
            let _ = env.step(&act);
            assert!(env.theta >= -PI && env.theta <= PI);
        }
        Ok(())
    }

    #[test]
    fn spaces_describe_the_problem() -> Result<()> {
        let env = PendulumEnv::build(&PendulumEnvConfig::default(), 0)?;
        assert_eq!(
            env.action_space(),
            ActionSpace::Continuous {
                dim: 1,
                low: -2.0,
                high: 2.0
            }
        );
        assert_eq!(env.observation_shape(), vec![3]);
        Ok(())
    }
}
