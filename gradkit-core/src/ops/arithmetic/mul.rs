// src/ops/arithmetic/mul.rs

use std::sync::{Arc, RwLock};

use crate::autograd::graph::NodeId;
use crate::autograd::BackwardOp;
use crate::error::GradKitError;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;

/// Performs element-wise multiplication of two same-shape tensors.
pub fn mul_op(a: &Tensor, b: &Tensor) -> Result<Tensor, GradKitError> {
    let a_shape = a.shape();
    let b_shape = b.shape();
    if a_shape != b_shape {
        return Err(GradKitError::IncompatibleShapes {
            shape1: a_shape,
            shape2: b_shape,
            operation: "mul_op".to_string(),
        });
    }

    let out_data: Vec<f32> = {
        let a_guard = a.read_data();
        let b_guard = b.read_data();
        a_guard
            .data
            .iter()
            .zip(b_guard.data.iter())
            .map(|(x, y)| x * y)
            .collect()
    };
    let result = Tensor::new(out_data, a_shape)?;

    if a.requires_grad() || b.requires_grad() {
        let grad_fn = MulBackward {
            a: a.node(),
            b: b.node(),
        };
        result.set_autograd(Arc::new(grad_fn));
    }
    Ok(result)
}

/// Backward operation for element-wise multiplication: each operand's
/// gradient is the upstream gradient times the other operand.
#[derive(Debug)]
struct MulBackward {
    a: Arc<RwLock<TensorData>>,
    b: Arc<RwLock<TensorData>>,
}

impl BackwardOp for MulBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, GradKitError> {
        let grad_data = grad_output.data();
        let (a_data, a_shape) = {
            let guard = self.a.read().expect("RwLock poisoned");
            (guard.data.clone(), guard.shape.clone())
        };
        let (b_data, b_shape) = {
            let guard = self.b.read().expect("RwLock poisoned");
            (guard.data.clone(), guard.shape.clone())
        };

        let grad_a: Vec<f32> = grad_data
            .iter()
            .zip(b_data.iter())
            .map(|(g, y)| g * y)
            .collect();
        let grad_b: Vec<f32> = grad_data
            .iter()
            .zip(a_data.iter())
            .map(|(g, x)| g * x)
            .collect();

        Ok(vec![
            Tensor::new(grad_a, a_shape)?,
            Tensor::new(grad_b, b_shape)?,
        ])
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![Arc::as_ptr(&self.a), Arc::as_ptr(&self.b)]
    }
}
