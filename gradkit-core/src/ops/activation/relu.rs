// src/ops/activation/relu.rs

use std::sync::{Arc, RwLock};

use crate::autograd::graph::NodeId;
use crate::autograd::BackwardOp;
use crate::error::GradKitError;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;

/// Applies the Rectified Linear Unit element-wise: ReLU(x) = max(0, x).
pub fn relu_op(input: &Tensor) -> Result<Tensor, GradKitError> {
    let (out_data, shape): (Vec<f32>, Vec<usize>) = {
        let guard = input.read_data();
        (
            guard.data.iter().map(|&x| x.max(0.0)).collect(),
            guard.shape.clone(),
        )
    };
    let result = Tensor::new(out_data, shape)?;

    if input.requires_grad() {
        let grad_fn = ReluBackward {
            input: input.node(),
        };
        result.set_autograd(Arc::new(grad_fn));
    }
    Ok(result)
}

/// Backward operation for ReLU: pass the gradient where the forward input
/// was positive, zero elsewhere.
#[derive(Debug)]
struct ReluBackward {
    input: Arc<RwLock<TensorData>>,
}

impl BackwardOp for ReluBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, GradKitError> {
        let (input_data, shape) = {
            let guard = self.input.read().expect("RwLock poisoned");
            (guard.data.clone(), guard.shape.clone())
        };
        let grad_data = grad_output.data();

        let masked: Vec<f32> = input_data
            .iter()
            .zip(grad_data.iter())
            .map(|(&x, &g)| if x > 0.0 { g } else { 0.0 })
            .collect();

        Ok(vec![Tensor::new(masked, shape)?])
    }

    fn inputs(&self) -> Vec<NodeId> {
        vec![Arc::as_ptr(&self.input)]
    }
}
