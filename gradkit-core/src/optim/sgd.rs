// src/optim/sgd.rs

use crate::error::GradKitError;
use crate::nn::parameter::Parameter;
use crate::optim::optimizer_trait::Optimizer;

/// Stochastic gradient descent: `param -= lr * grad`, in place.
///
/// No momentum or weight decay; the update rule is exactly the one above.
/// Parameters whose accumulator is empty are skipped.
#[derive(Debug)]
pub struct Sgd {
    params: Vec<Parameter>,
    lr: f32,
}

impl Sgd {
    /// Creates a new `Sgd` over the given parameter handles.
    ///
    /// The handles alias the model's parameters, so updates apply to the
    /// model directly. A learning rate of zero is accepted and makes every
    /// step an identity.
    pub fn new(params: Vec<Parameter>, lr: f32) -> Self {
        Sgd { params, lr }
    }

    pub fn learning_rate(&self) -> f32 {
        self.lr
    }
}

impl Optimizer for Sgd {
    fn step(&mut self) -> Result<(), GradKitError> {
        // Validate every gradient before touching any parameter, so a step
        // either applies completely or leaves the model untouched.
        for param in &self.params {
            let Some(grad) = param.grad() else { continue };
            let grad_guard = grad.read_data();
            let param_shape = param.shape();
            if grad_guard.shape != param_shape {
                return Err(GradKitError::ShapeMismatch {
                    expected: param_shape,
                    actual: grad_guard.shape.clone(),
                    operation: "Sgd step".to_string(),
                });
            }
            if grad_guard.data.iter().any(|v| !v.is_finite()) {
                return Err(GradKitError::NonFiniteValue {
                    operation: "Sgd step (gradient)".to_string(),
                });
            }
        }

        for param in &self.params {
            let Some(grad) = param.grad() else { continue };
            let grad_data = grad.data();
            let mut guard = param.write_data();
            for (w, g) in guard.data.iter_mut().zip(grad_data.iter()) {
                *w -= self.lr * g;
            }
        }
        Ok(())
    }

    fn zero_grad(&mut self) {
        for param in &self.params {
            param.zero_grad();
        }
    }
}

#[cfg(test)]
#[path = "sgd_test.rs"]
mod tests;
