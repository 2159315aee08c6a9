//! A PPO agent implemented with [tch](https://crates.io/crates/tch).
pub mod cnn;
pub mod dist;
pub mod mlp;
pub mod model;
pub mod opt;
pub mod ppo;
mod tensor_batch;
pub mod util;
use serde::{Deserialize, Serialize};
use tch::Tensor;
pub use tensor_batch::TensorBatch;

/// Device for using tch.
///
/// This enum is added because [`tch::Device`] does not support serialization.
#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq)]
pub enum Device {
    /// The main CPU device.
    Cpu,

    /// The main GPU device.
    Cuda(usize),
}

impl From<tch::Device> for Device {
    fn from(device: tch::Device) -> Self {
        match device {
            tch::Device::Cpu => Self::Cpu,
            tch::Device::Cuda(n) => Self::Cuda(n),
            _ => unimplemented!(),
        }
    }
}

impl From<Device> for tch::Device {
    fn from(device: Device) -> Self {
        match device {
            Device::Cpu => tch::Device::Cpu,
            Device::Cuda(n) => tch::Device::Cuda(n),
        }
    }
}

/// Activation functions.
#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq)]
pub enum Activation {
    /// No activation.
    None,

    /// ReLU activation.
    ReLU,

    /// Tanh activation.
    Tanh,
}

impl Activation {
    /// Applies the activation function.
    pub fn forward(&self, xs: &Tensor) -> Tensor {
        match self {
            Activation::None => xs.shallow_clone(),
            Activation::ReLU => xs.relu(),
            Activation::Tanh => xs.tanh(),
        }
    }
}
