// src/ops/loss/cross_entropy.rs

use std::sync::{Arc, RwLock};

use crate::autograd::graph::NodeId;
use crate::autograd::BackwardOp;
use crate::error::GradKitError;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;

/// Computes softmax cross-entropy between `logits` and integer class
/// labels, averaged over the batch, as a single fused operation.
///
/// `logits` has shape `[batch, classes]`; `labels` holds one class index
/// per row. The forward pass uses the log-sum-exp stabilization (the row
/// maximum is subtracted before exponentiating), and the backward pass uses
/// the fused rule `(softmax(logits) - onehot(labels)) / batch` instead of
/// differentiating softmax and log separately, which would be numerically
/// fragile.
pub fn cross_entropy_op(logits: &Tensor, labels: &[usize]) -> Result<Tensor, GradKitError> {
    let shape = logits.shape();
    if shape.len() != 2 || shape[0] != labels.len() {
        return Err(GradKitError::IncompatibleShapes {
            shape1: shape,
            shape2: vec![labels.len()],
            operation: "cross_entropy_op".to_string(),
        });
    }
    let batch = shape[0];
    let classes = shape[1];
    if batch == 0 {
        return Err(GradKitError::IncompatibleShapes {
            shape1: shape,
            shape2: vec![0],
            operation: "cross_entropy_op (empty batch)".to_string(),
        });
    }
    for &label in labels {
        if label >= classes {
            return Err(GradKitError::LabelOutOfBounds { label, classes });
        }
    }

    let loss_value = {
        let guard = logits.read_data();
        let mut total = 0.0f32;
        for (row, &label) in labels.iter().enumerate() {
            let row_data = &guard.data[row * classes..(row + 1) * classes];
            total += row_log_sum_exp(row_data) - row_data[label];
        }
        total / batch as f32
    };

    if !loss_value.is_finite() {
        return Err(GradKitError::NonFiniteValue {
            operation: "cross_entropy_op".to_string(),
        });
    }

    let result = Tensor::new(vec![loss_value], vec![])?;
    if logits.requires_grad() {
        let grad_fn = CrossEntropyBackward {
            logits: logits.node(),
            labels: labels.to_vec(),
        };
        result.set_autograd(Arc::new(grad_fn));
    }
    Ok(result)
}

/// log(sum(exp(row))) with the row maximum factored out.
fn row_log_sum_exp(row: &[f32]) -> f32 {
    let max = row.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let sum: f32 = row.iter().map(|&x| (x - max).exp()).sum();
    max + sum.ln()
}

/// Fused backward rule: d(loss)/d(logits) = (softmax - onehot) / batch,
/// scaled by the scalar upstream gradient.
#[derive(Debug)]
struct CrossEntropyBackward {
    logits: Arc<RwLock<TensorData>>,
    labels: Vec<usize>,
}

impl BackwardOp for CrossEntropyBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, GradKitError> {
        let g = grad_output.item()?;
        let (logits_data, shape) = {
            let guard = self.logits.read().expect("RwLock poisoned");
            (guard.data.clone(), guard.shape.clone())
        };
        let batch = shape[0];
        let classes = shape[1];
        let scale = g / batch as f32;

        let mut grad = vec![0.0f32; batch * classes];
        for (row, &label) in self.labels.iter().enumerate() {
            let row_data = &logits_data[row * classes..(row + 1) * classes];
            let max = row_data.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
            let exp_row: Vec<f32> = row_data.iter().map(|&x| (x - max).exp()).collect();
            let denom: f32 = exp_row.iter().sum();
            for c in 0..classes {
                let softmax = exp_row[c] / denom;
                let onehot = if c == label { 1.0 } else { 0.0 };
                grad[row * classes + c] = (softmax - onehot) * scale;
            }
        }

        Ok(vec![Tensor::new(grad, shape)?])
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![Arc::as_ptr(&self.logits)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::grad_check::check_grad;
    use crate::tensor::create::ones;
    use approx::assert_relative_eq;

    fn logits_with_grad(data: Vec<f32>, shape: Vec<usize>) -> Tensor {
        let t = Tensor::new(data, shape).unwrap();
        t.set_requires_grad(true);
        t
    }

    #[test]
    fn test_uniform_logits_give_ln_classes() {
        // With identical logits in every class, loss is exactly ln(C).
        let logits = Tensor::new(vec![0.5; 8], vec![2, 4]).unwrap();
        let loss = cross_entropy_op(&logits, &[0, 3]).unwrap();
        assert_relative_eq!(loss.item().unwrap(), (4.0f32).ln(), epsilon = 1e-6);
    }

    #[test]
    fn test_confident_correct_logits_give_near_zero_loss() {
        let logits = Tensor::new(vec![20.0, 0.0, 0.0, 0.0, 0.0, 20.0], vec![2, 3]).unwrap();
        let loss = cross_entropy_op(&logits, &[0, 2]).unwrap();
        assert!(loss.item().unwrap() < 1e-6);
    }

    #[test]
    fn test_label_out_of_range() {
        let logits = Tensor::new(vec![0.0; 6], vec![2, 3]).unwrap();
        assert_eq!(
            cross_entropy_op(&logits, &[0, 3]).err().unwrap(),
            GradKitError::LabelOutOfBounds {
                label: 3,
                classes: 3
            }
        );
    }

    #[test]
    fn test_shape_validation() {
        let logits_1d = Tensor::new(vec![0.0; 3], vec![3]).unwrap();
        assert!(matches!(
            cross_entropy_op(&logits_1d, &[0]),
            Err(GradKitError::IncompatibleShapes { .. })
        ));

        let logits = Tensor::new(vec![0.0; 6], vec![2, 3]).unwrap();
        assert!(matches!(
            cross_entropy_op(&logits, &[0]),
            Err(GradKitError::IncompatibleShapes { .. })
        ));
    }

    #[test]
    fn test_large_logits_stay_finite() {
        // Naive softmax-then-log would overflow exp(500).
        let logits = Tensor::new(vec![500.0, 0.0, -500.0], vec![1, 3]).unwrap();
        let loss = cross_entropy_op(&logits, &[0]).unwrap();
        assert!(loss.item().unwrap().is_finite());
        assert!(loss.item().unwrap() < 1e-6);
    }

    #[test]
    fn test_fused_gradient_is_softmax_minus_onehot() {
        let logits = logits_with_grad(vec![1.0, 2.0, 3.0], vec![1, 3]);
        let loss = cross_entropy_op(&logits, &[1]).unwrap();
        loss.backward(None).unwrap();

        let max = 3.0f32;
        let exps: Vec<f32> = [1.0f32, 2.0, 3.0].iter().map(|x| (x - max).exp()).collect();
        let denom: f32 = exps.iter().sum();
        let grad = logits.grad().unwrap().data();
        assert_relative_eq!(grad[0], exps[0] / denom, epsilon = 1e-6);
        assert_relative_eq!(grad[1], exps[1] / denom - 1.0, epsilon = 1e-6);
        assert_relative_eq!(grad[2], exps[2] / denom, epsilon = 1e-6);
    }

    #[test]
    fn test_cross_entropy_grad_check() {
        let logits = logits_with_grad(vec![0.2, -0.7, 1.1, 0.9, 0.0, -1.3], vec![2, 3]);
        let labels = vec![2usize, 0];
        let func = move |inputs: &[Tensor]| cross_entropy_op(&inputs[0], &labels);

        let output_grad = ones(&[]).unwrap();
        let result = check_grad(func, &[logits], &output_grad, 1e-3, 1e-2);
        assert!(
            result.is_ok(),
            "cross entropy grad check failed: {:?}",
            result.err()
        );
    }
}
