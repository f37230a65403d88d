// src/datasets/traits.rs

use gradkit_core::GradKitError;

/// Trait representing an indexed dataset.
///
/// A dataset provides access to individual samples by index. `Item` is the
/// type of a single sample, often a pair of input features and a target.
pub trait Dataset {
    /// The type of a single item returned by the dataset.
    type Item;

    /// Returns the data sample at the given index.
    ///
    /// # Errors
    /// Returns `GradKitError::IndexOutOfBounds` if the index is past the end.
    fn get(&self, index: usize) -> Result<Self::Item, GradKitError>;

    /// Returns the total number of samples in the dataset.
    fn len(&self) -> usize;

    /// Returns true if the dataset contains no samples.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
