// src/samplers/traits.rs

use std::fmt::Debug;

/// Defines how a `DataLoader` iterates over the indices of a dataset.
pub trait Sampler: Debug + Send + Sync {
    /// Returns an iterator over dataset indices for one epoch.
    ///
    /// The epoch number lets shuffling samplers vary the order across
    /// epochs while staying reproducible for a fixed seed.
    fn iter(&self, dataset_len: usize, epoch: u64) -> Box<dyn Iterator<Item = usize> + Send + Sync>;

    /// Number of indices the iterator will yield for one epoch.
    fn len(&self, dataset_len: usize) -> usize {
        dataset_len
    }
}
