// src/tensor/create.rs

use rand::Rng;
use rand_distr::StandardNormal;

use crate::error::GradKitError;
use crate::tensor::Tensor;

/// Creates a new tensor filled with zeros with the specified shape.
pub fn zeros(shape: &[usize]) -> Result<Tensor, GradKitError> {
    let numel = shape.iter().product();
    Tensor::new(vec![0.0; numel], shape.to_vec())
}

/// Creates a new tensor filled with ones with the specified shape.
pub fn ones(shape: &[usize]) -> Result<Tensor, GradKitError> {
    let numel = shape.iter().product();
    Tensor::new(vec![1.0; numel], shape.to_vec())
}

/// Creates a new tensor filled with a specific value with the specified shape.
pub fn full(shape: &[usize], value: f32) -> Result<Tensor, GradKitError> {
    let numel = shape.iter().product();
    Tensor::new(vec![value; numel], shape.to_vec())
}

/// Creates a new tensor from a `Vec<f32>` and a shape.
pub fn from_vec(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Tensor, GradKitError> {
    Tensor::new(data_vec, shape)
}

/// Creates a new zero tensor with the same shape as the input tensor.
pub fn zeros_like(tensor: &Tensor) -> Result<Tensor, GradKitError> {
    zeros(&tensor.shape())
}

/// Creates a new all-ones tensor with the same shape as the input tensor.
pub fn ones_like(tensor: &Tensor) -> Result<Tensor, GradKitError> {
    ones(&tensor.shape())
}

/// Creates a tensor with elements drawn from the standard normal
/// distribution, using the caller's generator. Deterministic for a seeded
/// generator, which is what the reproducibility guarantees rest on.
pub fn randn<R: Rng>(shape: &[usize], rng: &mut R) -> Result<Tensor, GradKitError> {
    let numel: usize = shape.iter().product();
    let data_vec: Vec<f32> = (0..numel).map(|_| rng.sample(StandardNormal)).collect();
    Tensor::new(data_vec, shape.to_vec())
}
