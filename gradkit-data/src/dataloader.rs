// src/dataloader.rs

//! Batching and collation on top of a [`Dataset`] and a [`Sampler`].
//!
//! `DataLoader` pulls sample indices from the sampler, fetches the samples,
//! and collates them into `Batch`es ready for the training loop. It
//! implements the core's `BatchSource`, so it can be handed to
//! `Trainer::fit` directly; `reset(epoch)` re-derives the index order for
//! the new epoch.

use gradkit_core::train::{Batch, BatchSource};
use gradkit_core::{GradKitError, Tensor};

use crate::datasets::Dataset;
use crate::samplers::Sampler;

/// Assembles `(features, label)` samples into collated mini-batches.
pub struct DataLoader<D, S>
where
    D: Dataset<Item = (Vec<f32>, usize)>,
    S: Sampler,
{
    dataset: D,
    batch_size: usize,
    sampler: S,
    /// If true, a trailing batch smaller than `batch_size` is discarded.
    drop_last: bool,
    indices: Box<dyn Iterator<Item = usize> + Send + Sync>,
}

impl<D, S> DataLoader<D, S>
where
    D: Dataset<Item = (Vec<f32>, usize)>,
    S: Sampler,
{
    /// Creates a new DataLoader positioned at the start of epoch 0.
    pub fn new(
        dataset: D,
        batch_size: usize,
        sampler: S,
        drop_last: bool,
    ) -> Result<Self, GradKitError> {
        if batch_size == 0 {
            return Err(GradKitError::InvalidConfig {
                field: "batch_size".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        let indices = sampler.iter(dataset.len(), 0);
        Ok(Self {
            dataset,
            batch_size,
            sampler,
            drop_last,
            indices,
        })
    }

    /// Stacks samples row-wise into one feature tensor plus a label vector.
    fn collate(samples: Vec<(Vec<f32>, usize)>) -> Result<Batch, GradKitError> {
        let rows = samples.len();
        let feature_dim = samples[0].0.len();

        let mut features = Vec::with_capacity(rows * feature_dim);
        let mut labels = Vec::with_capacity(rows);
        for (row, label) in samples {
            if row.len() != feature_dim {
                return Err(GradKitError::IncompatibleShapes {
                    shape1: vec![feature_dim],
                    shape2: vec![row.len()],
                    operation: "DataLoader collate".to_string(),
                });
            }
            features.extend_from_slice(&row);
            labels.push(label);
        }

        Ok(Batch {
            features: Tensor::new(features, vec![rows, feature_dim])?,
            labels,
        })
    }
}

impl<D, S> Iterator for DataLoader<D, S>
where
    D: Dataset<Item = (Vec<f32>, usize)>,
    S: Sampler,
{
    type Item = Result<Batch, GradKitError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut samples = Vec::with_capacity(self.batch_size);
        for _ in 0..self.batch_size {
            let Some(idx) = self.indices.next() else { break };
            match self.dataset.get(idx) {
                Ok(item) => samples.push(item),
                Err(e) => return Some(Err(e)),
            }
        }
        if samples.is_empty() || (self.drop_last && samples.len() < self.batch_size) {
            return None;
        }
        Some(Self::collate(samples))
    }
}

impl<D, S> BatchSource for DataLoader<D, S>
where
    D: Dataset<Item = (Vec<f32>, usize)>,
    S: Sampler,
{
    fn reset(&mut self, epoch: u64) {
        self.indices = self.sampler.iter(self.dataset.len(), epoch);
    }

    fn next_batch(&mut self) -> Option<Result<Batch, GradKitError>> {
        self.next()
    }
}
