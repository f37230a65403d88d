// src/ops/linalg/matmul.rs

use std::sync::{Arc, RwLock};

use crate::autograd::graph::NodeId;
use crate::autograd::BackwardOp;
use crate::error::GradKitError;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;

/// Performs matrix multiplication C = A @ B for 2-D tensors.
/// A: [m, k], B: [k, n] -> C: [m, n].
pub fn matmul_op(a: &Tensor, b: &Tensor) -> Result<Tensor, GradKitError> {
    let a_shape = a.shape();
    let b_shape = b.shape();

    if a_shape.len() != 2 || b_shape.len() != 2 || a_shape[1] != b_shape[0] {
        return Err(GradKitError::IncompatibleShapes {
            shape1: a_shape,
            shape2: b_shape,
            operation: "matmul_op".to_string(),
        });
    }

    let m = a_shape[0];
    let k = a_shape[1];
    let n = b_shape[1];

    let out_data = {
        let a_guard = a.read_data();
        let b_guard = b.read_data();
        matmul_data(&a_guard.data, m, k, &b_guard.data, n)
    };
    let result = Tensor::new(out_data, vec![m, n])?;

    if a.requires_grad() || b.requires_grad() {
        let grad_fn = MatmulBackward {
            a: a.node(),
            b: b.node(),
        };
        result.set_autograd(Arc::new(grad_fn));
    }
    Ok(result)
}

/// Backward operation for matrix multiplication, via the transpose rules
/// dA = dC @ Bᵀ and dB = Aᵀ @ dC. Works on raw buffers so the backward
/// pass creates no further graph nodes.
#[derive(Debug)]
struct MatmulBackward {
    a: Arc<RwLock<TensorData>>,
    b: Arc<RwLock<TensorData>>,
}

impl BackwardOp for MatmulBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, GradKitError> {
        let (a_data, a_shape) = {
            let guard = self.a.read().expect("RwLock poisoned");
            (guard.data.clone(), guard.shape.clone())
        };
        let (b_data, b_shape) = {
            let guard = self.b.read().expect("RwLock poisoned");
            (guard.data.clone(), guard.shape.clone())
        };
        let grad_data = grad_output.data();

        let m = a_shape[0];
        let k = a_shape[1];
        let n = b_shape[1];

        // dA [m, k] = dC [m, n] @ Bᵀ [n, k]
        let b_t = transpose_data(&b_data, k, n);
        let grad_a = matmul_data(&grad_data, m, n, &b_t, k);

        // dB [k, n] = Aᵀ [k, m] @ dC [m, n]
        let a_t = transpose_data(&a_data, m, k);
        let grad_b = matmul_data(&a_t, k, m, &grad_data, n);

        Ok(vec![
            Tensor::new(grad_a, vec![m, k])?,
            Tensor::new(grad_b, vec![k, n])?,
        ])
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![Arc::as_ptr(&self.a), Arc::as_ptr(&self.b)]
    }
}

/// Row-major [m, k] @ [k, n] on raw buffers.
pub(crate) fn matmul_data(a: &[f32], m: usize, k: usize, b: &[f32], n: usize) -> Vec<f32> {
    let mut out = vec![0.0f32; m * n];
    for i in 0..m {
        for l in 0..k {
            let a_il = a[i * k + l];
            for j in 0..n {
                out[i * n + j] += a_il * b[l * n + j];
            }
        }
    }
    out
}

/// Row-major transpose of an [rows, cols] buffer.
pub(crate) fn transpose_data(x: &[f32], rows: usize, cols: usize) -> Vec<f32> {
    let mut out = vec![0.0f32; rows * cols];
    for r in 0..rows {
        for c in 0..cols {
            out[c * rows + r] = x[r * cols + c];
        }
    }
    out
}
