// src/train/metrics.rs

use crate::error::GradKitError;
use crate::tensor::Tensor;

/// Fraction of rows whose argmax logit matches the label.
///
/// `logits` has shape `[batch, classes]`; ties resolve to the lowest class
/// index.
pub fn accuracy(logits: &Tensor, labels: &[usize]) -> Result<f32, GradKitError> {
    let shape = logits.shape();
    if shape.len() != 2 || shape[0] != labels.len() {
        return Err(GradKitError::IncompatibleShapes {
            shape1: shape,
            shape2: vec![labels.len()],
            operation: "accuracy".to_string(),
        });
    }
    let batch = shape[0];
    let classes = shape[1];
    if batch == 0 {
        return Ok(0.0);
    }

    let data = logits.data();
    let mut correct = 0usize;
    for (row, &label) in labels.iter().enumerate() {
        let row_data = &data[row * classes..(row + 1) * classes];
        let mut best = 0usize;
        for (c, &value) in row_data.iter().enumerate() {
            if value > row_data[best] {
                best = c;
            }
        }
        if best == label {
            correct += 1;
        }
    }
    Ok(correct as f32 / batch as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_counts_argmax_matches() {
        let logits = Tensor::new(
            vec![2.0, 1.0, 0.0, 0.0, 3.0, 1.0, 1.0, 0.0, 5.0],
            vec![3, 3],
        )
        .unwrap();
        assert_eq!(accuracy(&logits, &[0, 1, 2]).unwrap(), 1.0);
        assert_eq!(accuracy(&logits, &[1, 1, 2]).unwrap(), 2.0 / 3.0);
        assert_eq!(accuracy(&logits, &[1, 0, 0]).unwrap(), 0.0);
    }

    #[test]
    fn test_accuracy_shape_validation() {
        let logits = Tensor::new(vec![1.0, 0.0], vec![1, 2]).unwrap();
        assert!(matches!(
            accuracy(&logits, &[0, 1]),
            Err(GradKitError::IncompatibleShapes { .. })
        ));
    }
}
