// src/tensor/autograd_methods.rs

use std::sync::{Arc, RwLock};

use crate::autograd::graph::{topological_sort, NodeId};
use crate::autograd::BackwardOp;
use crate::error::GradKitError;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;

impl Tensor {
    /// Checks if this tensor takes part in gradient computation.
    pub fn requires_grad(&self) -> bool {
        self.read_data().requires_grad
    }

    /// Sets the `requires_grad` flag for this tensor.
    pub fn set_requires_grad(&self, requires_grad: bool) {
        self.write_data().requires_grad = requires_grad;
    }

    /// Returns a handle to the gradient accumulator, if populated.
    pub fn grad(&self) -> Option<Tensor> {
        self.read_data().grad.clone()
    }

    /// Returns the backward node of the producing operation, if any.
    pub fn grad_fn(&self) -> Option<Arc<dyn BackwardOp>> {
        self.read_data().grad_fn.clone()
    }

    /// Marks this tensor as the output of `grad_fn` and enables gradient
    /// tracking for it, in a single lock acquisition. Called by the forward
    /// functions in `ops` when at least one input requires grad.
    pub(crate) fn set_autograd(&self, grad_fn: Arc<dyn BackwardOp>) {
        let mut guard = self.write_data();
        guard.requires_grad = true;
        guard.grad_fn = Some(grad_fn);
    }

    /// Stable identity of this tensor's storage inside the graph.
    pub(crate) fn node_id(&self) -> NodeId {
        Arc::as_ptr(&self.data)
    }

    /// Performs the backward pass starting from this tensor.
    ///
    /// Computes d(self)/d(leaf) for every tensor reachable through the
    /// `grad_fn` chain that requires gradients, summing contributions into
    /// each one's accumulator. Gradients from several consumers of the same
    /// tensor add up, which is what makes shared parameters correct.
    ///
    /// # Arguments
    /// * `gradient`: the initial gradient for this tensor. With `None`, the
    ///   tensor must hold exactly one element and the seed is `1.0`;
    ///   otherwise the call fails with `BackwardNonScalar`.
    ///
    /// Calling `backward` on a tensor with no gradient path anywhere is a
    /// warned no-op, never an error: accumulators simply stay as they were.
    pub fn backward(&self, gradient: Option<Tensor>) -> Result<(), GradKitError> {
        if !self.requires_grad() {
            log::warn!("backward() called on a tensor with no gradient path; nothing to do");
            return Ok(());
        }

        let grad_init = match gradient {
            Some(g) => {
                if g.shape() != self.shape() {
                    return Err(GradKitError::ShapeMismatch {
                        expected: self.shape(),
                        actual: g.shape(),
                        operation: "backward (explicit gradient)".to_string(),
                    });
                }
                g
            }
            None => {
                if self.numel() != 1 {
                    return Err(GradKitError::BackwardNonScalar);
                }
                crate::tensor::create::ones(&self.shape())?
            }
        };

        // Seed the root accumulator, then drain accumulators in reverse
        // topological order so every node is finalized before it is visited.
        Self::accumulate_grad(&self.data, grad_init)?;

        let sorted = topological_sort(self.node_id());
        for node_id in sorted.iter().rev() {
            // SAFETY: each id was produced by `Arc::as_ptr` on a storage Arc
            // that is still alive: the root is `self`, and every other node
            // is held by the `BackwardOp` of the consumer through which the
            // traversal reached it.
            let node_lock: &RwLock<TensorData> = unsafe { &**node_id };
            let (node_grad, grad_fn) = {
                let guard = node_lock.read().expect("RwLock poisoned");
                (guard.grad.clone(), guard.grad_fn.clone())
            };
            let (Some(node_grad), Some(grad_fn)) = (node_grad, grad_fn) else {
                continue;
            };

            let input_grads = grad_fn.backward(&node_grad)?;
            let input_ids = grad_fn.inputs();
            if input_grads.len() != input_ids.len() {
                return Err(GradKitError::InternalError(format!(
                    "backward op returned {} gradients for {} inputs ({:?})",
                    input_grads.len(),
                    input_ids.len(),
                    grad_fn
                )));
            }

            for (input_id, grad_to_add) in input_ids.into_iter().zip(input_grads) {
                // SAFETY: input ids are held alive by `grad_fn` itself.
                let input_lock: &RwLock<TensorData> = unsafe { &*input_id };
                let wants_grad = input_lock
                    .read()
                    .expect("RwLock poisoned")
                    .requires_grad;
                if wants_grad {
                    Self::accumulate_grad(input_lock, grad_to_add)?;
                }
            }
        }

        Ok(())
    }

    /// Adds `grad_to_add` into the accumulator behind `tensor_data_lock`.
    /// Operates on the raw lock so the traversal can accumulate through
    /// node ids without reconstructing `Tensor` handles.
    pub(crate) fn accumulate_grad(
        tensor_data_lock: &RwLock<TensorData>,
        grad_to_add: Tensor,
    ) -> Result<(), GradKitError> {
        let mut guard = tensor_data_lock
            .write()
            .map_err(|_| GradKitError::InternalError("RwLock poisoned in accumulate_grad".to_string()))?;

        if grad_to_add.shape() != guard.shape {
            return Err(GradKitError::ShapeMismatch {
                expected: guard.shape.clone(),
                actual: grad_to_add.shape(),
                operation: "gradient accumulation".to_string(),
            });
        }

        match guard.grad.take() {
            Some(existing) => {
                let summed: Vec<f32> = {
                    let existing_guard = existing.read_data();
                    let incoming_guard = grad_to_add.read_data();
                    existing_guard
                        .data
                        .iter()
                        .zip(incoming_guard.data.iter())
                        .map(|(a, b)| a + b)
                        .collect()
                };
                guard.grad = Some(Tensor::new(summed, guard.shape.clone())?);
            }
            None => {
                guard.grad = Some(grad_to_add);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::GradKitError;
    use crate::ops::arithmetic::{add_op, mul_op};
    use crate::ops::reduction::sum_op;
    use crate::tensor::Tensor;

    fn leaf(data: Vec<f32>, shape: Vec<usize>) -> Tensor {
        let t = Tensor::new(data, shape).unwrap();
        t.set_requires_grad(true);
        t
    }

    #[test]
    fn test_backward_non_scalar_without_gradient() {
        let a = leaf(vec![1.0, 2.0], vec![2]);
        let b = leaf(vec![3.0, 4.0], vec![2]);
        let out = add_op(&a, &b).unwrap();
        assert_eq!(out.backward(None), Err(GradKitError::BackwardNonScalar));
    }

    #[test]
    fn test_backward_no_grad_path_is_noop() {
        let a = Tensor::new(vec![1.0], vec![]).unwrap();
        assert!(a.backward(None).is_ok());
        assert!(a.grad().is_none());
    }

    #[test]
    fn test_gradients_sum_across_consumers() {
        // y = x * x + x, so dy/dx = 2x + 1. x feeds three ops in total.
        let x = leaf(vec![3.0], vec![]);
        let squared = mul_op(&x, &x).unwrap();
        let y = add_op(&squared, &x).unwrap();
        y.backward(None).unwrap();

        assert_eq!(x.grad().unwrap().data(), vec![7.0]);
    }

    #[test]
    fn test_clear_grad_gives_fresh_accumulation() {
        let x = leaf(vec![1.0, 2.0, 3.0], vec![3]);

        let loss = sum_op(&x).unwrap();
        loss.backward(None).unwrap();
        assert_eq!(x.grad().unwrap().data(), vec![1.0, 1.0, 1.0]);

        // Without clearing, a second backward pass accumulates on top.
        let loss2 = sum_op(&x).unwrap();
        loss2.backward(None).unwrap();
        assert_eq!(x.grad().unwrap().data(), vec![2.0, 2.0, 2.0]);

        // Clearing restores the single-accumulation result.
        x.clear_grad();
        let loss3 = sum_op(&x).unwrap();
        loss3.backward(None).unwrap();
        assert_eq!(x.grad().unwrap().data(), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_explicit_gradient_shape_checked() {
        let x = leaf(vec![1.0, 2.0], vec![2]);
        let y = add_op(&x, &x).unwrap();
        let bad = Tensor::new(vec![1.0], vec![1]).unwrap();
        assert!(matches!(
            y.backward(Some(bad)),
            Err(GradKitError::ShapeMismatch { .. })
        ));
    }
}
