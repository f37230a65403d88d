// src/nn/module.rs

use crate::error::GradKitError;
use crate::nn::Parameter;
use crate::tensor::Tensor;

/// The base trait for all neural network modules (layers, containers).
pub trait Module: std::fmt::Debug + Send + Sync {
    /// Performs a forward pass of the module.
    ///
    /// # Arguments
    /// * `input`: A reference to the input `Tensor` for the module.
    ///
    /// # Returns
    /// A `Result` containing the output `Tensor` of the module, or a
    /// `GradKitError` if an error occurs during the forward pass.
    fn forward(&self, input: &Tensor) -> Result<Tensor, GradKitError>;

    /// Returns every learnable parameter of the module, in a stable order.
    ///
    /// The returned handles alias the module's own parameters, so an
    /// optimizer holding them updates the module in place.
    fn parameters(&self) -> Vec<Parameter>;
}
