// src/train/trainer.rs

use crate::error::GradKitError;
use crate::nn::module::Module;
use crate::ops::loss::cross_entropy_op;
use crate::optim::{Optimizer, Sgd};
use crate::train::config::TrainConfig;
use crate::train::BatchSource;

/// Periodic progress observation emitted by the trainer: the running
/// average loss over the last reporting window. Purely observational; it
/// has no effect on the loop.
#[derive(Debug, Clone, PartialEq)]
pub struct LossSnapshot {
    pub epoch: usize,
    pub step: usize,
    pub avg_loss: f32,
}

/// Receives loss snapshots. How they are displayed or stored is not the
/// trainer's concern.
pub trait ReportSink {
    fn report(&mut self, snapshot: &LossSnapshot);
}

/// Default sink: forwards snapshots to the `log` facade.
#[derive(Debug, Default)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn report(&mut self, snapshot: &LossSnapshot) {
        log::info!(
            "epoch {} step {} avg_loss {:.6}",
            snapshot.epoch,
            snapshot.step,
            snapshot.avg_loss
        );
    }
}

/// Summary returned by a completed `fit`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainReport {
    /// Total optimization steps performed.
    pub steps: usize,
    /// Average loss over the final (possibly partial) reporting window.
    pub final_avg_loss: f32,
}

/// Runs mini-batch gradient descent over a model and a batch source.
///
/// Each step is strictly sequential: zero gradients, forward pass, loss,
/// backward pass, optimizer step. Any error aborts the run before the
/// step's parameter update, so parameters always reflect the last fully
/// completed step.
#[derive(Debug)]
pub struct Trainer {
    config: TrainConfig,
}

impl Trainer {
    /// Creates a trainer after validating the configuration.
    pub fn new(config: TrainConfig) -> Result<Self, GradKitError> {
        config.validate()?;
        Ok(Trainer { config })
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Trains `model` for the configured number of epochs.
    ///
    /// The source is `reset` at each epoch boundary and drained exactly
    /// once per epoch. Snapshots of the running average loss go to `sink`
    /// every `print_every` steps.
    pub fn fit<M, B, R>(
        &self,
        model: &M,
        source: &mut B,
        sink: &mut R,
    ) -> Result<TrainReport, GradKitError>
    where
        M: Module,
        B: BatchSource + ?Sized,
        R: ReportSink + ?Sized,
    {
        let mut optimizer = Sgd::new(model.parameters(), self.config.learning_rate);

        let mut global_step = 0usize;
        let mut window_sum = 0.0f32;
        let mut window_count = 0usize;
        let mut last_avg = 0.0f32;

        for epoch in 0..self.config.epochs {
            source.reset(epoch as u64);
            while let Some(batch) = source.next_batch() {
                let batch = batch?;

                optimizer.zero_grad();
                let logits = model.forward(&batch.features)?;
                let loss = cross_entropy_op(&logits, &batch.labels)?;
                loss.backward(None)?;
                optimizer.step()?;

                global_step += 1;
                window_sum += loss.item()?;
                window_count += 1;
                if global_step % self.config.print_every == 0 {
                    let avg = window_sum / window_count as f32;
                    sink.report(&LossSnapshot {
                        epoch,
                        step: global_step,
                        avg_loss: avg,
                    });
                    last_avg = avg;
                    window_sum = 0.0;
                    window_count = 0;
                }
            }
        }

        let final_avg_loss = if window_count > 0 {
            window_sum / window_count as f32
        } else {
            last_avg
        };
        Ok(TrainReport {
            steps: global_step,
            final_avg_loss,
        })
    }
}
