// src/nn/parameter.rs

use std::fmt;
use std::ops::Deref;

use crate::tensor::Tensor;

/// A wrapper around a Tensor indicating it is a learnable parameter of a
/// Module. Parameters always have `requires_grad` set to `true`.
///
/// Clones alias the same storage, so a layer and an optimizer holding the
/// "same" parameter see every in-place update and accumulated gradient.
pub struct Parameter(Tensor);

impl Parameter {
    /// Creates a new Parameter from a Tensor, enabling gradient tracking.
    pub fn new(tensor: Tensor) -> Self {
        tensor.set_requires_grad(true);
        Parameter(tensor)
    }

    /// Returns a reference to the underlying Tensor.
    pub fn tensor(&self) -> &Tensor {
        &self.0
    }

    /// Consumes the Parameter and returns the underlying Tensor.
    pub fn into_inner(self) -> Tensor {
        self.0
    }

    /// Resets the gradient accumulator to zero (drops it; an absent
    /// accumulator and an all-zero one are equivalent).
    pub fn zero_grad(&self) {
        self.0.clear_grad();
    }
}

impl Deref for Parameter {
    type Target = Tensor;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Clone for Parameter {
    /// Cloning a Parameter clones the handle, sharing the storage.
    fn clone(&self) -> Self {
        Parameter(self.0.clone())
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parameter({:?})", self.0)
    }
}
