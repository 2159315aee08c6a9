//! Native classic-control environments.
//!
//! Pure-Rust implementations of the cart-pole (discrete actions) and
//! pendulum (continuous actions) control problems, implementing
//! [`proxim_core::Env`]. With the `tch` feature enabled, observations and
//! actions convert into the tensor types of `proxim-tch-agent`.
mod act;
mod cartpole;
mod obs;
mod pendulum;

pub use act::{ContinuousAct, DiscreteAct};
pub use cartpole::{CartPoleEnv, CartPoleEnvConfig};
pub use obs::ClassicObs;
pub use pendulum::{PendulumEnv, PendulumEnvConfig};
