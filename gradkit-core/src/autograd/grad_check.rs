// src/autograd/grad_check.rs

use approx::relative_eq;
use thiserror::Error;

use crate::error::GradKitError;
use crate::tensor::Tensor;

/// Error type specifically for gradient checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error("Gradient check failed for input {input_index}, element {element_index}: analytical {analytical_grad} != numerical {numerical_grad} (difference {difference})")]
    GradientMismatch {
        input_index: usize,
        element_index: usize,
        analytical_grad: f64,
        numerical_grad: f64,
        difference: f64,
    },

    #[error("Forward function execution failed during gradient check: {0}")]
    ForwardPassError(GradKitError),

    #[error("Backward pass execution failed during gradient check: {0}")]
    BackwardPassError(GradKitError),

    #[error("Input {input_index} requires grad but has no gradient after the backward pass.")]
    MissingAnalyticalGrad { input_index: usize },

    #[error("Numerical gradient is not finite for input {input_index}, element {element_index} (loss+: {loss_plus}, loss-: {loss_minus})")]
    NumericalGradNonFinite {
        input_index: usize,
        element_index: usize,
        loss_plus: f64,
        loss_minus: f64,
    },

    #[error("Analytical gradient is not finite for input {input_index}, element {element_index}: {value}")]
    AnalyticalGradNonFinite {
        input_index: usize,
        element_index: usize,
        value: f64,
    },

    #[error("Function did not propagate requires_grad to its output.")]
    RequiresGradPropagation,

    #[error("Tensor error during gradient check: {0}")]
    TensorError(GradKitError),
}

impl From<GradKitError> for GradCheckError {
    fn from(err: GradKitError) -> Self {
        GradCheckError::TensorError(err)
    }
}

/// Checks analytical gradients against central finite differences.
///
/// `func` is evaluated once to obtain analytical gradients through
/// `backward(output_grad)`, then twice per input element with that element
/// nudged by `±epsilon`. The scalar objective is
/// `sum(output * output_grad)`, so a non-scalar op can be checked by
/// supplying the upstream gradient it would receive.
pub fn check_grad<F>(
    func: F,
    inputs: &[Tensor],
    output_grad: &Tensor,
    epsilon: f64,
    tolerance: f64,
) -> Result<(), GradCheckError>
where
    F: Fn(&[Tensor]) -> Result<Tensor, GradKitError>,
{
    // --- Analytical pass ---
    for input in inputs {
        if input.requires_grad() {
            input.clear_grad();
        }
    }

    let output = func(inputs).map_err(GradCheckError::ForwardPassError)?;

    let any_requires_grad = inputs.iter().any(|t| t.requires_grad());
    if any_requires_grad && !output.requires_grad() {
        return Err(GradCheckError::RequiresGradPropagation);
    }

    if output.requires_grad() {
        output
            .backward(Some(output_grad.clone()))
            .map_err(GradCheckError::BackwardPassError)?;
    }

    let analytical_grads: Vec<Option<Tensor>> = inputs.iter().map(|t| t.grad()).collect();

    // --- Numerical pass, one element at a time ---
    for (i, original_input) in inputs.iter().enumerate() {
        if !original_input.requires_grad() {
            continue;
        }

        let analytical_grad = analytical_grads[i]
            .as_ref()
            .ok_or(GradCheckError::MissingAnalyticalGrad { input_index: i })?;
        let analytical_data: Vec<f64> =
            analytical_grad.data().iter().map(|&x| x as f64).collect();

        let original_data: Vec<f64> = original_input.data().iter().map(|&x| x as f64).collect();
        let shape = original_input.shape();

        for elem_idx in 0..original_data.len() {
            let loss_plus = perturbed_loss(
                &func, inputs, output_grad, i, &original_data, &shape, elem_idx, epsilon,
            )?;
            let loss_minus = perturbed_loss(
                &func, inputs, output_grad, i, &original_data, &shape, elem_idx, -epsilon,
            )?;

            let numerical = (loss_plus - loss_minus) / (2.0 * epsilon);
            let analytical = analytical_data[elem_idx];

            if !numerical.is_finite() {
                return Err(GradCheckError::NumericalGradNonFinite {
                    input_index: i,
                    element_index: elem_idx,
                    loss_plus,
                    loss_minus,
                });
            }
            if !analytical.is_finite() {
                return Err(GradCheckError::AnalyticalGradNonFinite {
                    input_index: i,
                    element_index: elem_idx,
                    value: analytical,
                });
            }

            let difference = (analytical - numerical).abs();
            let close = difference <= tolerance
                || relative_eq!(analytical, numerical, max_relative = tolerance);
            if !close {
                return Err(GradCheckError::GradientMismatch {
                    input_index: i,
                    element_index: elem_idx,
                    analytical_grad: analytical,
                    numerical_grad: numerical,
                    difference,
                });
            }
        }
    }

    Ok(())
}

/// Evaluates `sum(func(inputs') * output_grad)` with one element of input
/// `input_index` shifted by `delta`. The perturbed tensor is a fresh leaf.
#[allow(clippy::too_many_arguments)]
fn perturbed_loss<F>(
    func: &F,
    inputs: &[Tensor],
    output_grad: &Tensor,
    input_index: usize,
    original_data: &[f64],
    shape: &[usize],
    elem_idx: usize,
    delta: f64,
) -> Result<f64, GradCheckError>
where
    F: Fn(&[Tensor]) -> Result<Tensor, GradKitError>,
{
    let mut data: Vec<f64> = original_data.to_vec();
    data[elem_idx] += delta;
    let data_f32: Vec<f32> = data.iter().map(|&x| x as f32).collect();

    let perturbed = Tensor::new(data_f32, shape.to_vec())?;
    let mut call_inputs: Vec<Tensor> = inputs.to_vec();
    call_inputs[input_index] = perturbed;

    let output = func(&call_inputs).map_err(GradCheckError::ForwardPassError)?;

    let out_data = output.data();
    let grad_data = output_grad.data();
    if out_data.len() != grad_data.len() {
        return Err(GradCheckError::TensorError(GradKitError::ShapeMismatch {
            expected: output_grad.shape(),
            actual: output.shape(),
            operation: "grad_check loss".to_string(),
        }));
    }

    Ok(out_data
        .iter()
        .zip(grad_data.iter())
        .map(|(&o, &g)| o as f64 * g as f64)
        .sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::arithmetic::{add_op, mul_op};
    use crate::ops::reduction::sum_op;
    use crate::tensor::create::ones;

    #[test]
    fn test_check_grad_composite_function() {
        // f(a, b) = sum(a * b + a)
        let a = Tensor::new(vec![0.5, -1.0, 2.0], vec![3]).unwrap();
        a.set_requires_grad(true);
        let b = Tensor::new(vec![1.5, 0.25, -0.75], vec![3]).unwrap();
        b.set_requires_grad(true);

        let func = |inputs: &[Tensor]| {
            let prod = mul_op(&inputs[0], &inputs[1])?;
            let shifted = add_op(&prod, &inputs[0])?;
            sum_op(&shifted)
        };

        let output_grad = ones(&[]).unwrap();
        let result = check_grad(func, &[a, b], &output_grad, 1e-3, 1e-2);
        assert!(result.is_ok(), "grad check failed: {:?}", result.err());
    }

    #[test]
    fn test_check_grad_ignores_constant_inputs() {
        let a = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap();
        a.set_requires_grad(true);
        let constant = Tensor::new(vec![3.0, 4.0], vec![2]).unwrap();

        let func = |inputs: &[Tensor]| sum_op(&mul_op(&inputs[0], &inputs[1])?);

        let output_grad = ones(&[]).unwrap();
        let result = check_grad(func, &[a, constant], &output_grad, 1e-3, 1e-2);
        assert!(result.is_ok(), "grad check failed: {:?}", result.err());
    }
}
