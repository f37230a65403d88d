// src/autograd/backward_op.rs

use std::fmt::Debug;

use crate::autograd::graph::NodeId;
use crate::error::GradKitError;
use crate::tensor::Tensor;

/// Defines the interface for the backward pass of a differentiable operation.
///
/// Any operation that creates a non-leaf `Tensor` stores one of these in the
/// output tensor's `grad_fn` field. During `backward()`, the traversal calls
/// it with dL/dOutput and receives dL/dInput_i for every forward input,
/// applying the chain rule one local rule at a time.
///
/// Implementations hold strong `Arc` references to their input storage: the
/// graph is a DAG rebuilt on every forward pass, children own parents, and
/// the whole structure is reclaimed when the loss tensor is dropped.
pub trait BackwardOp: Debug + Send + Sync {
    /// Computes the gradients of the operation's inputs, given the gradient
    /// flowing into the operation's output.
    ///
    /// The returned gradients **must** be in the same order as the node ids
    /// returned by `inputs()`, and each must have the shape of the
    /// corresponding forward input.
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, GradKitError>;

    /// Identities of the forward inputs, used to link the graph during the
    /// backward traversal. Pointer identity is stable because the underlying
    /// `Arc`s are kept alive by this very struct.
    fn inputs(&self) -> Vec<NodeId>;
}
