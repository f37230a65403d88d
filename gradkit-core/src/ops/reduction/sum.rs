// src/ops/reduction/sum.rs

use std::sync::{Arc, RwLock};

use crate::autograd::graph::NodeId;
use crate::autograd::BackwardOp;
use crate::error::GradKitError;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;

/// Sums all elements of a tensor into a scalar (shape `[]`).
pub fn sum_op(input: &Tensor) -> Result<Tensor, GradKitError> {
    let total: f32 = input.read_data().data.iter().sum();
    let result = Tensor::new(vec![total], vec![])?;

    if input.requires_grad() {
        let grad_fn = SumBackward {
            input: input.node(),
        };
        result.set_autograd(Arc::new(grad_fn));
    }
    Ok(result)
}

/// Backward operation for the global sum: the scalar upstream gradient is
/// broadcast to the input shape.
#[derive(Debug)]
struct SumBackward {
    input: Arc<RwLock<TensorData>>,
}

impl BackwardOp for SumBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, GradKitError> {
        let g = grad_output.item()?;
        let (numel, shape) = {
            let guard = self.input.read().expect("RwLock poisoned");
            (guard.numel(), guard.shape.clone())
        };
        Ok(vec![Tensor::new(vec![g; numel], shape)?])
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![Arc::as_ptr(&self.input)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::grad_check::check_grad;
    use crate::tensor::create::ones;

    #[test]
    fn test_sum_forward() {
        let t = Tensor::new(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]).unwrap();
        let result = sum_op(&t).unwrap();
        assert_eq!(result.shape(), Vec::<usize>::new());
        assert_eq!(result.item().unwrap(), 10.0);
    }

    #[test]
    fn test_sum_backward_broadcasts() {
        let t = Tensor::new(vec![1.0, 2.0, 3.0], vec![3]).unwrap();
        t.set_requires_grad(true);
        let loss = sum_op(&t).unwrap();
        loss.backward(None).unwrap();
        assert_eq!(t.grad().unwrap().data(), vec![1.0, 1.0, 1.0]);
        assert_eq!(t.grad().unwrap().shape(), vec![3]);
    }

    #[test]
    fn test_sum_grad_check() {
        let t = Tensor::new(vec![0.1, -0.9, 2.3, 1.4], vec![4]).unwrap();
        t.set_requires_grad(true);
        let func = |inputs: &[Tensor]| sum_op(&inputs[0]);

        let output_grad = ones(&[]).unwrap();
        let result = check_grad(func, &[t], &output_grad, 1e-3, 1e-2);
        assert!(result.is_ok(), "sum grad check failed: {:?}", result.err());
    }
}
