//! End-to-end training demo: a small MLP classifier on a synthetic,
//! linearly separable 2-class dataset.
//!
//! Run with: `cargo run --example train_mlp`

use gradkit_core::nn::{Mlp, Module};
use gradkit_core::tensor::Tensor;
use gradkit_core::train::{accuracy, LossSnapshot, ReportSink, TrainConfig, Trainer};
use gradkit_core::GradKitError;
use gradkit_data::{DataLoader, InMemoryDataset, ShuffleSampler};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Prints every snapshot the trainer emits.
struct PrintSink;

impl ReportSink for PrintSink {
    fn report(&mut self, snapshot: &LossSnapshot) {
        println!(
            "epoch {:>3}  step {:>4}  avg loss {:.4}",
            snapshot.epoch, snapshot.step, snapshot.avg_loss
        );
    }
}

/// Two Gaussian clusters in `dim` dimensions, centered at +1 and -1 along
/// every axis.
fn synthetic_clusters(
    samples_per_class: usize,
    dim: usize,
    rng: &mut StdRng,
) -> (Vec<f32>, Vec<usize>) {
    let mut features = Vec::with_capacity(2 * samples_per_class * dim);
    let mut labels = Vec::with_capacity(2 * samples_per_class);
    for class in 0..2usize {
        let center = if class == 0 { 1.0f32 } else { -1.0 };
        for _ in 0..samples_per_class {
            for _ in 0..dim {
                let noise: f32 = rng.gen_range(-0.3..0.3);
                features.push(center + noise);
            }
            labels.push(class);
        }
    }
    (features, labels)
}

fn main() -> Result<(), GradKitError> {
    let config = TrainConfig {
        input_size: 4,
        hidden_sizes: vec![16],
        output_size: 2,
        learning_rate: 0.1,
        epochs: 20,
        batch_size: 16,
        print_every: 10,
        seed: 7,
    };

    let mut rng = StdRng::seed_from_u64(config.seed);
    let (features, labels) = synthetic_clusters(64, config.input_size, &mut rng);

    let dataset = InMemoryDataset::new(features.clone(), config.input_size, labels.clone())?;
    let sampler = ShuffleSampler::new(config.seed);
    let mut loader = DataLoader::new(dataset, config.batch_size, sampler, false)?;

    let model = Mlp::new(
        config.input_size,
        &config.hidden_sizes,
        config.output_size,
        config.seed,
    )?;
    let trainer = Trainer::new(config.clone())?;

    let report = trainer.fit(&model, &mut loader, &mut PrintSink)?;
    println!(
        "finished after {} steps, final avg loss {:.4}",
        report.steps, report.final_avg_loss
    );

    let all_features = Tensor::new(features, vec![labels.len(), config.input_size])?;
    let logits = model.forward(&all_features)?;
    println!(
        "training accuracy: {:.1}%",
        100.0 * accuracy(&logits, &labels)?
    );

    Ok(())
}
