// src/nn/mlp.rs

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::GradKitError;
use crate::nn::layers::Linear;
use crate::nn::module::Module;
use crate::nn::parameter::Parameter;
use crate::ops::activation::relu_op;
use crate::tensor::Tensor;

/// A feed-forward network: a strictly sequential stack of `Linear` layers
/// with ReLU between them and none after the last, so the final output is
/// unnormalized logits.
#[derive(Debug)]
pub struct Mlp {
    layers: Vec<Linear>,
}

impl Mlp {
    /// Builds the network `input_size -> hidden_sizes... -> output_size`.
    /// Parameter initialization is deterministic given `seed`.
    pub fn new(
        input_size: usize,
        hidden_sizes: &[usize],
        output_size: usize,
        seed: u64,
    ) -> Result<Self, GradKitError> {
        let mut dims = Vec::with_capacity(hidden_sizes.len() + 2);
        dims.push(input_size);
        dims.extend_from_slice(hidden_sizes);
        dims.push(output_size);

        let mut rng = StdRng::seed_from_u64(seed);
        let mut layers = Vec::with_capacity(dims.len() - 1);
        for pair in dims.windows(2) {
            layers.push(Linear::new(pair[0], pair[1], &mut rng)?);
        }
        Ok(Mlp { layers })
    }

    pub fn layers(&self) -> &[Linear] {
        &self.layers
    }
}

impl Module for Mlp {
    fn forward(&self, input: &Tensor) -> Result<Tensor, GradKitError> {
        let mut current = input.clone();
        let last = self.layers.len() - 1;
        for (i, layer) in self.layers.iter().enumerate() {
            current = layer.forward(&current)?;
            if i < last {
                current = relu_op(&current)?;
            }
        }
        Ok(current)
    }

    fn parameters(&self) -> Vec<Parameter> {
        let mut params = Vec::with_capacity(self.layers.len() * 2);
        for layer in &self.layers {
            params.extend(layer.parameters());
        }
        params
    }
}
