use super::MlpConfig;
use crate::model::SubModel;
use tch::{nn, nn::Module, Device, Tensor};

/// Multilayer perceptron.
pub struct Mlp {
    device: Device,
    seq: nn::Sequential,
}

impl Mlp {
    fn create_net(var_store: &nn::VarStore, config: &MlpConfig) -> nn::Sequential {
        let p = &(var_store.root() / "mlp");
        let mut seq = nn::seq();
        let mut in_dim = config.in_dim;
        let activation = config.activation;

        for (i, &out_dim) in config.units.iter().enumerate() {
            seq = seq.add(nn::linear(
                p / format!("ln{}", i),
                in_dim,
                out_dim,
                Default::default(),
            ));
            seq = seq.add_fn(move |x| activation.forward(x));
            in_dim = out_dim;
        }

        seq.add(nn::linear(
            p / format!("ln{}", config.units.len()),
            in_dim,
            config.out_dim,
            Default::default(),
        ))
    }
}

impl SubModel for Mlp {
    type Config = MlpConfig;
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
    use crate::Activation;

    #[test]
    fn forward_maps_batches_to_the_output_width() {
        let var_store = nn::VarStore::new(Device::Cpu);
        let config = MlpConfig::new(4, vec![100, 100, 100], 2, Activation::Tanh);
        let mlp = Mlp::build(&var_store, config);

        let x = Tensor::zeros(&[8, 4], tch::kind::FLOAT_CPU);
        let y = mlp.forward(&x);
        assert_eq!(y.size(), vec![8, 2]);
    }
}
