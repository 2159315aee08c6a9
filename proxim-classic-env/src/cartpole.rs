//! Cart-pole environment.
use crate::{ClassicObs, DiscreteAct};
use anyhow::Result;
use log::debug;
use ndarray::arr1;
use proxim_core::{record::Record, ActionSpace, Env, Step};
use serde::{Deserialize, Serialize};

const GRAVITY: f32 = 9.8;
const MASS_CART: f32 = 1.0;
const MASS_POLE: f32 = 0.1;
const TOTAL_MASS: f32 = MASS_CART + MASS_POLE;
// Half of the pole's length.
const LENGTH: f32 = 0.5;
const POLE_MASS_LENGTH: f32 = MASS_POLE * LENGTH;
const FORCE_MAG: f32 = 10.0;
const TAU: f32 = 0.02;
const THETA_THRESHOLD: f32 = 12.0 * 2.0 * std::f32::consts::PI / 360.0;
const X_THRESHOLD: f32 = 2.4;

/// Configuration of [`CartPoleEnv`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct CartPoleEnvConfig {
    /// The episode is truncated after this many steps.
    pub max_steps: usize,

    /// Whether to log the state of every step at debug level.
    pub render: bool,
}

impl Default for CartPoleEnvConfig {
    fn default() -> Self {
        Self {
            max_steps: 500,
            render: false,
        }
    }
}

impl CartPoleEnvConfig {
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

/// The cart-pole balancing problem with two discrete actions.
///
/// A pole is attached to a cart moving along a frictionless track; the
/// agent pushes the cart left or right and receives a reward of 1.0 for
/// every step until the pole falls over or the cart leaves the track.
pub struct CartPoleEnv {
    x: f32,
    x_dot: f32,
    theta: f32,
    theta_dot: f32,
    steps: usize,
    max_steps: usize,
    render: bool,
    rng: fastrand::Rng,
}

impl CartPoleEnv {
    fn obs(&self) -> ClassicObs {
        ClassicObs(arr1(&[self.x, self.x_dot, self.theta, self.theta_dot]))
    }

    fn uniform(&mut self, low: f32, high: f32) -> f32 {
        low + (high - low) * self.rng.f32()
    }
}

impl Env for CartPoleEnv {
    type Config = CartPoleEnvConfig;
    type Obs = ClassicObs;
    type Act = DiscreteAct;
    type Info = ();

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        Ok(Self {
            x: 0.0,
            x_dot: 0.0,
            theta: 0.0,
            theta_dot: 0.0,
            steps: 0,
            max_steps: config.max_steps,
            render: config.render,
            rng: fastrand::Rng::with_seed(seed as u64),
        })
    }

    fn step(&mut self, act: &Self::Act) -> (Step<Self>, Record) {
        let force = if act.0 == 1 { FORCE_MAG } else { -FORCE_MAG };
        let cos_theta = self.theta.cos();
        let sin_theta = self.theta.sin();

        let temp =
            (force + POLE_MASS_LENGTH * self.theta_dot.powi(2) * sin_theta) / TOTAL_MASS;
        let theta_acc = (GRAVITY * sin_theta - cos_theta * temp)
            / (LENGTH * (4.0 / 3.0 - MASS_POLE * cos_theta.powi(2) / TOTAL_MASS));
        let x_acc = temp - POLE_MASS_LENGTH * theta_acc * cos_theta / TOTAL_MASS;

        self.x += TAU * self.x_dot;
        self.x_dot += TAU * x_acc;
        self.theta += TAU * self.theta_dot;
        self.theta_dot += TAU * theta_acc;
        self.steps += 1;

        if self.render {
            debug!(
                "x = {}, x_dot = {}, theta = {}, theta_dot = {}",
                self.x, self.x_dot, self.theta, self.theta_dot
            );
        }

        let is_terminated =
            (self.x.abs() > X_THRESHOLD || self.theta.abs() > THETA_THRESHOLD) as i8;
        let is_truncated = (is_terminated == 0 && self.steps >= self.max_steps) as i8;
        let step = Step::new(
            self.obs(),
            act.clone(),
            vec![1.0],
            vec![is_terminated],
            vec![is_truncated],
            (),
        );

        (step, Record::empty())
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        self.x = self.uniform(-0.05, 0.05);
        self.x_dot = self.uniform(-0.05, 0.05);
        self.theta = self.uniform(-0.05, 0.05);
        self.theta_dot = self.uniform(-0.05, 0.05);
        self.steps = 0;
        Ok(self.obs())
    }

    fn action_space(&self) -> ActionSpace {
        ActionSpace::Discrete { n: 2 }
    }

    fn observation_shape(&self) -> Vec<i64> {
        vec![4]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pushing_one_way_terminates_the_episode() -> Result<()> {
        let mut env = CartPoleEnv::build(&CartPoleEnvConfig::default(), 0)?;
        let _ = env.reset()?;

        let act = DiscreteAct(1);
        for _ in 0..500 {
            let (step, _) = env.step(&act);
            assert_eq!(step.reward[0], 1.0);
            if step.is_terminated[0] == 1 {
                return Ok(());
            }
        }
        panic!("the pole never fell");
    }

    #[test]
    fn episodes_are_truncated_at_max_steps() -> Result<()> {
        let mut env = CartPoleEnv::build(&CartPoleEnvConfig::default().max_steps(5), 0)?;
        let _ = env.reset()?;

        // Alternating pushes keep the pole up for a few steps.
        for i in 0..5 {
            let (step, _) = env.step(&DiscreteAct(i % 2));
            if step.is_terminated[0] == 1 {
                return Ok(());
            }
            if i == 4 {
                assert_eq!(step.is_truncated[0], 1);
            } else {
                assert_eq!(step.is_truncated[0], 0);
            }
        }
        Ok(())
    }

    #[test]
    fn resets_are_reproducible_per_seed() -> Result<()> {
        let config = CartPoleEnvConfig::default();
        let mut env1 = CartPoleEnv::build(&config, 42)?;
        let mut env2 = CartPoleEnv::build(&config, 42)?;
        assert_eq!(env1.reset()?.0, env2.reset()?.0);
        Ok(())
    }

    #[test]
    fn spaces_describe_the_problem() -> Result<()> {
        let env = CartPoleEnv::build(&CartPoleEnvConfig::default(), 0)?;
        assert_eq!(env.action_space(), ActionSpace::Discrete { n: 2 });
        assert_eq!(env.observation_shape(), vec![4]);
        Ok(())
    }
}
