// src/nn/layers/linear.rs

use rand::Rng;

use crate::error::GradKitError;
use crate::nn::init::scaled_uniform;
use crate::nn::module::Module;
use crate::nn::parameter::Parameter;
use crate::ops::arithmetic::add_op;
use crate::ops::linalg::matmul_op;
use crate::tensor::Tensor;

/// Applies an affine transformation to the incoming data: y = x @ W + b.
///
/// `W` has shape `[in_features, out_features]` and `b` has shape
/// `[out_features]`. Activation is not part of the layer; the network
/// composing layers decides where to apply it.
#[derive(Debug)]
pub struct Linear {
    weight: Parameter,
    bias: Parameter,
    in_features: usize,
    out_features: usize,
}

impl Linear {
    /// Creates a new Linear layer with fan-in scaled uniform initialization
    /// drawn from `rng`.
    ///
    /// # Arguments
    /// * `in_features` - Size of each input sample.
    /// * `out_features` - Size of each output sample.
    /// * `rng` - Seeded generator; construction is deterministic given it.
    pub fn new<R: Rng>(
        in_features: usize,
        out_features: usize,
        rng: &mut R,
    ) -> Result<Self, GradKitError> {
        if in_features == 0 || out_features == 0 {
            return Err(GradKitError::InvalidConfig {
                field: "Linear features".to_string(),
                message: format!(
                    "in_features ({in_features}) and out_features ({out_features}) must be positive"
                ),
            });
        }

        let weight_data = scaled_uniform(in_features * out_features, in_features, rng);
        let weight = Parameter::new(Tensor::new(weight_data, vec![in_features, out_features])?);

        let bias_data = scaled_uniform(out_features, in_features, rng);
        let bias = Parameter::new(Tensor::new(bias_data, vec![out_features])?);

        Ok(Linear {
            weight,
            bias,
            in_features,
            out_features,
        })
    }

    pub fn weight(&self) -> &Parameter {
        &self.weight
    }

    pub fn bias(&self) -> &Parameter {
        &self.bias
    }

    pub fn in_features(&self) -> usize {
        self.in_features
    }

    pub fn out_features(&self) -> usize {
        self.out_features
    }
}

impl Module for Linear {
    fn forward(&self, input: &Tensor) -> Result<Tensor, GradKitError> {
        let input_shape = input.shape();
        if input_shape.len() != 2 || input_shape[1] != self.in_features {
            return Err(GradKitError::ShapeMismatch {
                expected: vec![input_shape.first().copied().unwrap_or(0), self.in_features],
                actual: input_shape,
                operation: "Linear forward".to_string(),
            });
        }

        let affine = matmul_op(input, self.weight.tensor())?;
        add_op(&affine, self.bias.tensor())
    }

    fn parameters(&self) -> Vec<Parameter> {
        vec![self.weight.clone(), self.bias.clone()]
    }
}

#[cfg(test)]
#[path = "linear_test.rs"]
mod tests;
