use super::CnnConfig;
use crate::model::SubModel;
use tch::{nn, nn::Module, Device, Tensor};

/// Convolutional neural network for image observations, with the
/// architecture of the DQN paper.
///
/// Expects inputs of shape `[batch, n_stack, 84, 84]` with byte-valued
/// pixels; the network scales them to `[0, 1]` itself.
pub struct Cnn {
    device: Device,
    seq: nn::Sequential,
}

impl Cnn {
    fn stride(s: i64) -> nn::ConvConfig {
        nn::ConvConfig {
            stride: s,
            ..Default::default()
        }
    }

    fn create_net(var_store: &nn::VarStore, config: &CnnConfig) -> nn::Sequential {
        let p = &var_store.root();
        nn::seq()
            .add_fn(|xs| xs.internal_cast_float(true) / 255)
            .add(nn::conv2d(p / "c1", config.n_stack, 32, 8, Self::stride(4)))
            .add_fn(|xs| xs.relu())
            .add(nn::conv2d(p / "c2", 32, 64, 4, Self::stride(2)))
            .add_fn(|xs| xs.relu())
            .add(nn::conv2d(p / "c3", 64, 64, 3, Self::stride(1)))
            .add_fn(|xs| xs.relu().flat_view())
            .add(nn::linear(p / "l1", 3136, 512, Default::default()))
            .add_fn(|xs| xs.relu())
            .add(nn::linear(p / "l2", 512, config.out_dim, Default::default()))
    }
}

impl SubModel for Cnn {
    type Config = CnnConfig;
    type Input = Tensor;
    type Output = Tensor;

    fn forward(&self, x: &Self::Input) -> Tensor {
        self.seq.forward(&x.to(self.device))
    }

    fn build(var_store: &nn::VarStore, config: Self::Config) -> Self {
        let device = var_store.device();
        let seq = Self::create_net(var_store, &config);

        Self { device, seq }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_maps_frames_to_the_output_width() {
        let var_store = nn::VarStore::new(Device::Cpu);
        let cnn = Cnn::build(&var_store, CnnConfig::new(4, 6));

        let x = Tensor::zeros(&[2, 4, 84, 84], (tch::Kind::Uint8, Device::Cpu));
        let y = cnn.forward(&x);
        assert_eq!(y.size(), vec![2, 6]);
    }
}
