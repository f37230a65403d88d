//! GradKit data: datasets, samplers and batch loading.
//!
//! This crate is the data-side collaborator of `gradkit-core`: it turns an
//! indexed [`datasets::Dataset`] and a [`samplers::Sampler`] into collated
//! mini-batches via [`dataloader::DataLoader`], which plugs into the
//! training loop through the core's `BatchSource` trait.

pub mod dataloader;
pub mod datasets;
pub mod samplers;

// Re-export main components
pub use dataloader::DataLoader;
pub use datasets::{Dataset, InMemoryDataset};
pub use samplers::{Sampler, SequentialSampler, ShuffleSampler};
