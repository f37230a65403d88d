// src/ops/arithmetic/add.rs

use std::sync::{Arc, RwLock};

use crate::autograd::graph::NodeId;
use crate::autograd::BackwardOp;
use crate::error::GradKitError;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;

/// Performs element-wise addition of two tensors.
///
/// Shapes must either match exactly, or one operand may be a row vector
/// `[n]` added to every row of a matrix `[rows, n]` (the bias case). The
/// gradient of a broadcast operand is summed back over the broadcast axis.
pub fn add_op(a: &Tensor, b: &Tensor) -> Result<Tensor, GradKitError> {
    let a_shape = a.shape();
    let b_shape = b.shape();

    let out_data: Vec<f32> = {
        let a_guard = a.read_data();
        let b_guard = b.read_data();

        if a_shape == b_shape {
            a_guard
                .data
                .iter()
                .zip(b_guard.data.iter())
                .map(|(x, y)| x + y)
                .collect()
        } else if let Some(rows) = row_broadcast(&a_shape, &b_shape) {
            let n = b_shape[0];
            let mut out = Vec::with_capacity(rows * n);
            for r in 0..rows {
                for c in 0..n {
                    out.push(a_guard.data[r * n + c] + b_guard.data[c]);
                }
            }
            out
        } else if let Some(rows) = row_broadcast(&b_shape, &a_shape) {
            let n = a_shape[0];
            let mut out = Vec::with_capacity(rows * n);
            for r in 0..rows {
                for c in 0..n {
                    out.push(a_guard.data[c] + b_guard.data[r * n + c]);
                }
            }
            out
        } else {
            return Err(GradKitError::IncompatibleShapes {
                shape1: a_shape,
                shape2: b_shape,
                operation: "add_op".to_string(),
            });
        }
    };

    let out_shape = if a_shape.len() >= b_shape.len() {
        a_shape.clone()
    } else {
        b_shape.clone()
    };
    let result = Tensor::new(out_data, out_shape)?;

    if a.requires_grad() || b.requires_grad() {
        let grad_fn = AddBackward {
            a: a.node(),
            b: b.node(),
            a_shape,
            b_shape,
        };
        result.set_autograd(Arc::new(grad_fn));
    }
    Ok(result)
}

/// `Some(rows)` when `small` is a row vector broadcastable over `big`.
fn row_broadcast(big: &[usize], small: &[usize]) -> Option<usize> {
    if big.len() == 2 && small.len() == 1 && big[1] == small[0] {
        Some(big[0])
    } else {
        None
    }
}

/// Backward operation for addition: the local derivative is the identity,
/// reduced back to each operand's shape where broadcasting widened it.
#[derive(Debug)]
struct AddBackward {
    a: Arc<RwLock<TensorData>>,
    b: Arc<RwLock<TensorData>>,
    a_shape: Vec<usize>,
    b_shape: Vec<usize>,
}

impl BackwardOp for AddBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, GradKitError> {
        let grad_a = reduce_to_shape(grad_output, &self.a_shape)?;
        let grad_b = reduce_to_shape(grad_output, &self.b_shape)?;
        Ok(vec![grad_a, grad_b])
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![Arc::as_ptr(&self.a), Arc::as_ptr(&self.b)]
    }
}

/// Sums `grad` down to `target_shape`. Identity when shapes already match;
/// otherwise collapses the leading (broadcast) axis.
fn reduce_to_shape(grad: &Tensor, target_shape: &[usize]) -> Result<Tensor, GradKitError> {
    let grad_shape = grad.shape();
    if grad_shape == target_shape {
        return Tensor::new(grad.data(), grad_shape);
    }

    if let Some(rows) = row_broadcast(&grad_shape, target_shape) {
        let n = target_shape[0];
        let grad_data = grad.data();
        let mut reduced = vec![0.0f32; n];
        for r in 0..rows {
            for c in 0..n {
                reduced[c] += grad_data[r * n + c];
            }
        }
        return Tensor::new(reduced, target_shape.to_vec());
    }

    Err(GradKitError::ShapeMismatch {
        expected: target_shape.to_vec(),
        actual: grad_shape,
        operation: "add_op backward (gradient reduction)".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::grad_check::check_grad;
    use crate::ops::reduction::sum_op;
    use crate::tensor::create::ones;

    fn tensor(data: Vec<f32>, shape: Vec<usize>) -> Tensor {
        Tensor::new(data, shape).unwrap()
    }

    fn tensor_with_grad(data: Vec<f32>, shape: Vec<usize>) -> Tensor {
        let t = Tensor::new(data, shape).unwrap();
        t.set_requires_grad(true);
        t
    }

    #[test]
    fn test_add_forward() {
        let a = tensor(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
        let b = tensor(vec![5.0, 6.0, 7.0, 8.0], vec![2, 2]);
        let result = add_op(&a, &b).unwrap();
        assert_eq!(result.data(), vec![6.0, 8.0, 10.0, 12.0]);
        assert_eq!(result.shape(), vec![2, 2]);
        assert!(!result.requires_grad());
    }

    #[test]
    fn test_add_row_broadcast() {
        let a = tensor(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]);
        let bias = tensor(vec![10.0, 20.0, 30.0], vec![3]);
        let result = add_op(&a, &bias).unwrap();
        assert_eq!(result.shape(), vec![2, 3]);
        assert_eq!(result.data(), vec![11.0, 22.0, 33.0, 14.0, 25.0, 36.0]);
    }

    #[test]
    fn test_add_incompatible_shapes() {
        let a = tensor(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
        let b = tensor(vec![1.0; 6], vec![2, 3]);
        match add_op(&a, &b).err().unwrap() {
            GradKitError::IncompatibleShapes { shape1, shape2, .. } => {
                assert_eq!(shape1, vec![2, 2]);
                assert_eq!(shape2, vec![2, 3]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_add_propagate_requires_grad() {
        let a = tensor(vec![1.0], vec![1]);
        let b = tensor_with_grad(vec![2.0], vec![1]);
        assert!(add_op(&a, &b).unwrap().requires_grad());
        assert!(!add_op(&a, &a).unwrap().requires_grad());
    }

    #[test]
    fn test_add_backward() {
        let a = tensor_with_grad(vec![1.0, 2.0, 3.0], vec![3]);
        let b = tensor_with_grad(vec![4.0, 5.0, 6.0], vec![3]);
        let result = add_op(&a, &b).unwrap();

        let upstream = ones(&[3]).unwrap();
        result.backward(Some(upstream)).unwrap();

        assert_eq!(a.grad().unwrap().data(), vec![1.0, 1.0, 1.0]);
        assert_eq!(b.grad().unwrap().data(), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_add_backward_reduces_broadcast_bias() {
        let a = tensor_with_grad(vec![0.0; 6], vec![2, 3]);
        let bias = tensor_with_grad(vec![0.0; 3], vec![3]);
        let out = add_op(&a, &bias).unwrap();
        let loss = sum_op(&out).unwrap();
        loss.backward(None).unwrap();

        // Bias gradient sums the contributions of both rows.
        assert_eq!(bias.grad().unwrap().shape(), vec![3]);
        assert_eq!(bias.grad().unwrap().data(), vec![2.0, 2.0, 2.0]);
        assert_eq!(a.grad().unwrap().data(), vec![1.0; 6]);
    }

    #[test]
    fn test_add_grad_check() {
        let a = tensor_with_grad(vec![0.4, -1.2, 0.9, 2.0, -0.3, 0.1], vec![2, 3]);
        let bias = tensor_with_grad(vec![0.5, -0.5, 1.5], vec![3]);
        let func = |inputs: &[Tensor]| sum_op(&add_op(&inputs[0], &inputs[1])?);

        let output_grad = ones(&[]).unwrap();
        let result = check_grad(func, &[a, bias], &output_grad, 1e-3, 1e-2);
        assert!(result.is_ok(), "add grad check failed: {:?}", result.err());
    }
}
