// src/tensor_data.rs

use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::GradKitError;
use crate::tensor::Tensor;

/// Internal storage and metadata for a Tensor.
///
/// Holds the value buffer, the shape, and the autograd bookkeeping
/// (gradient accumulator and producing operation). It is wrapped in
/// `Arc<RwLock<TensorData>>` by the `Tensor` struct to allow shared
/// ownership and interior mutability.
#[derive(Debug)]
pub struct TensorData {
    /// Row-major, contiguous element buffer. Immutable after creation;
    /// the only sanctioned in-place mutation is the optimizer's update.
    pub(crate) data: Vec<f32>,
    /// The shape (dimensions) of the tensor. `[]` denotes a scalar.
    pub(crate) shape: Vec<usize>,

    // --- Autograd metadata ---
    /// Flag indicating if the tensor takes part in gradient computation.
    pub(crate) requires_grad: bool,
    /// The gradient accumulator. `None` is equivalent to all-zeros; backward
    /// traversal adds contributions from every consumer into it.
    pub(crate) grad: Option<Tensor>,
    /// The backward node of the operation that produced this tensor.
    /// Leaf tensors (parameters, inputs) have `grad_fn = None`.
    pub(crate) grad_fn: Option<Arc<dyn BackwardOp>>,
}

impl TensorData {
    /// Creates a new `TensorData` from a flat buffer and a shape.
    ///
    /// # Errors
    /// Returns `GradKitError::TensorCreationError` if the buffer length does
    /// not match the number of elements implied by `shape`.
    pub fn new(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Self, GradKitError> {
        let numel: usize = shape.iter().product();
        let data_len = data_vec.len();
        if data_len != numel {
            return Err(GradKitError::TensorCreationError { data_len, shape });
        }

        Ok(TensorData {
            data: data_vec,
            shape,
            requires_grad: false,
            grad: None,
            grad_fn: None,
        })
    }

    /// Returns the number of elements in the tensor.
    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }
}
