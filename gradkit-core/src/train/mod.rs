// src/train/mod.rs

//! The training loop and its collaborator interfaces.
//!
//! The loop itself is deliberately small: zero gradients, forward, loss,
//! backward, optimizer step, repeated over mini-batches and epochs. Batches
//! come from a [`BatchSource`] (the data side lives in `gradkit-data`), and
//! progress goes to a [`ReportSink`].

pub mod config;
pub mod metrics;
pub mod trainer;

pub use config::TrainConfig;
pub use metrics::accuracy;
pub use trainer::{LogSink, LossSnapshot, ReportSink, TrainReport, Trainer};

use crate::error::GradKitError;
use crate::tensor::Tensor;

/// One mini-batch: features `[batch, feature_dim]` plus one integer class
/// label per row. Consumed once per training step.
#[derive(Debug, Clone)]
pub struct Batch {
    pub features: Tensor,
    pub labels: Vec<usize>,
}

/// A finite, restartable source of mini-batches.
///
/// The trainer calls `reset` before each epoch and then drains the source.
/// Ordering across epochs (shuffling included) is entirely the source's
/// business; the loop only guarantees each produced batch is visited once.
pub trait BatchSource {
    /// Restarts the source for the given epoch.
    fn reset(&mut self, epoch: u64);

    /// Produces the next batch of the current epoch, or `None` when the
    /// epoch is exhausted.
    fn next_batch(&mut self) -> Option<Result<Batch, GradKitError>>;
}
