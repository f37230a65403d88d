// src/train/config.rs

use crate::error::GradKitError;

/// Recognized configuration surface of the training kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
    /// Feature dimension of the input batches.
    pub input_size: usize,
    /// Widths of the hidden layers, in order. May be empty.
    pub hidden_sizes: Vec<usize>,
    /// Number of classes; logits dimension of the final layer.
    pub output_size: usize,
    /// SGD learning rate.
    pub learning_rate: f32,
    /// Number of full passes over the data source.
    pub epochs: usize,
    /// Expected batch size of the data source.
    pub batch_size: usize,
    /// Reporting interval, in steps.
    pub print_every: usize,
    /// Seed for deterministic parameter initialization.
    pub seed: u64,
}

impl TrainConfig {
    /// Validates every field against its documented range.
    pub fn validate(&self) -> Result<(), GradKitError> {
        fn positive(field: &str, value: usize) -> Result<(), GradKitError> {
            if value == 0 {
                return Err(GradKitError::InvalidConfig {
                    field: field.to_string(),
                    message: "must be at least 1".to_string(),
                });
            }
            Ok(())
        }

        positive("input_size", self.input_size)?;
        for (i, &width) in self.hidden_sizes.iter().enumerate() {
            positive(&format!("hidden_sizes[{i}]"), width)?;
        }
        positive("output_size", self.output_size)?;
        positive("epochs", self.epochs)?;
        positive("batch_size", self.batch_size)?;
        positive("print_every", self.print_every)?;

        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(GradKitError::InvalidConfig {
                field: "learning_rate".to_string(),
                message: format!("must be positive and finite, got {}", self.learning_rate),
            });
        }
        Ok(())
    }
}
