// src/tensor/mod.rs

use std::fmt;
use std::sync::{Arc, RwLock};

use crate::error::GradKitError;
use crate::tensor_data::TensorData;

mod autograd_methods;
pub mod create;

// Re-export creation functions to make them public
pub use create::{from_vec, full, ones, ones_like, randn, zeros, zeros_like};

/// A multi-dimensional f32 array together with its autograd provenance.
///
/// `Tensor` uses `Arc<RwLock<TensorData>>` internally to allow for:
/// 1.  **Shared ownership:** multiple `Tensor` handles can point to the same
///     underlying data without copying it (cheap clones). A parameter held
///     by a layer and by an optimizer is one storage, two handles.
/// 2.  **Interior mutability:** the autograd metadata (`grad`, `grad_fn`)
///     is updated through immutable handles during the backward pass.
pub struct Tensor {
    /// Arc for shared ownership, RwLock for interior mutability.
    pub(crate) data: Arc<RwLock<TensorData>>,
}

impl Tensor {
    /// Creates a new tensor from a flat row-major buffer and a shape.
    pub fn new(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Self, GradKitError> {
        let tensor_data = TensorData::new(data_vec, shape)?;
        Ok(Tensor {
            data: Arc::new(RwLock::new(tensor_data)),
        })
    }

    /// Returns a clone of the tensor's shape.
    pub fn shape(&self) -> Vec<usize> {
        self.read_data().shape.clone()
    }

    /// Returns the number of elements in the tensor.
    pub fn numel(&self) -> usize {
        self.read_data().numel()
    }

    /// Returns a copy of the element buffer in row-major order.
    pub fn data(&self) -> Vec<f32> {
        self.read_data().data.clone()
    }

    /// Extracts the value of a single-element tensor.
    pub fn item(&self) -> Result<f32, GradKitError> {
        let guard = self.read_data();
        if guard.data.len() != 1 {
            return Err(GradKitError::ShapeMismatch {
                expected: vec![1],
                actual: guard.shape.clone(),
                operation: "item".to_string(),
            });
        }
        Ok(guard.data[0])
    }

    /// Acquires a read lock on the tensor's data.
    ///
    /// The lock is released when the guard goes out of scope.
    /// Panics if the RwLock is poisoned.
    pub fn read_data(&self) -> std::sync::RwLockReadGuard<'_, TensorData> {
        self.data.read().expect("RwLock poisoned")
    }

    /// Acquires a write lock on the tensor's data.
    ///
    /// The lock is released when the guard goes out of scope.
    /// Panics if the RwLock is poisoned.
    pub fn write_data(&self) -> std::sync::RwLockWriteGuard<'_, TensorData> {
        self.data.write().expect("RwLock poisoned")
    }

    /// Returns a clone of the shared storage node. Backward ops hold these
    /// to keep their forward inputs alive for the traversal.
    pub(crate) fn node(&self) -> Arc<RwLock<TensorData>> {
        Arc::clone(&self.data)
    }

    /// Clears the gradient accumulator associated with this tensor.
    pub fn clear_grad(&self) {
        let mut guard = self.write_data();
        guard.grad = None;
    }
}

impl Clone for Tensor {
    /// Cloning a `Tensor` clones the handle, not the storage.
    fn clone(&self) -> Self {
        Tensor {
            data: Arc::clone(&self.data),
        }
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.read_data();
        f.debug_struct("Tensor")
            .field("shape", &guard.shape)
            .field("requires_grad", &guard.requires_grad)
            .field("data", &guard.data)
            .finish()
    }
}
