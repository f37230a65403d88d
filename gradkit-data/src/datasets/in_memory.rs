// src/datasets/in_memory.rs

use gradkit_core::GradKitError;

use super::traits::Dataset;

/// A classification dataset held in memory: a flat row-major feature
/// buffer plus one integer label per row.
#[derive(Debug, Clone)]
pub struct InMemoryDataset {
    features: Vec<f32>,
    feature_dim: usize,
    labels: Vec<usize>,
}

impl InMemoryDataset {
    /// Creates a dataset from a flat feature buffer and labels.
    ///
    /// # Errors
    /// Returns an error if `feature_dim` is zero or the buffer length does
    /// not equal `labels.len() * feature_dim`.
    pub fn new(
        features: Vec<f32>,
        feature_dim: usize,
        labels: Vec<usize>,
    ) -> Result<Self, GradKitError> {
        if feature_dim == 0 {
            return Err(GradKitError::InvalidConfig {
                field: "feature_dim".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if features.len() != labels.len() * feature_dim {
            return Err(GradKitError::TensorCreationError {
                data_len: features.len(),
                shape: vec![labels.len(), feature_dim],
            });
        }
        Ok(InMemoryDataset {
            features,
            feature_dim,
            labels,
        })
    }

    pub fn feature_dim(&self) -> usize {
        self.feature_dim
    }
}

impl Dataset for InMemoryDataset {
    type Item = (Vec<f32>, usize);

    fn get(&self, index: usize) -> Result<Self::Item, GradKitError> {
        if index >= self.labels.len() {
            return Err(GradKitError::IndexOutOfBounds {
                index,
                len: self.labels.len(),
            });
        }
        let start = index * self.feature_dim;
        let row = self.features[start..start + self.feature_dim].to_vec();
        Ok((row, self.labels[index]))
    }

    fn len(&self) -> usize {
        self.labels.len()
    }
}
