// src/optim/optimizer_trait.rs

use crate::error::GradKitError;

/// Trait defining the common interface for optimizers.
///
/// Optimizers consume accumulated gradients and update the parameters they
/// manage in place.
pub trait Optimizer {
    /// Performs a single optimization step.
    ///
    /// Requires gradients to be populated by a prior `backward` call.
    /// A failed step leaves every parameter at its pre-step value.
    fn step(&mut self) -> Result<(), GradKitError>;

    /// Clears the gradients of all parameters managed by the optimizer.
    ///
    /// Called before the backward pass of each training iteration; without
    /// it, gradients accumulate additively across iterations.
    fn zero_grad(&mut self);
}
