// src/samplers/shuffle.rs

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::traits::Sampler;

/// Visits every index exactly once per epoch, in an order derived from a
/// seed and the epoch number. The same (seed, epoch) pair always produces
/// the same permutation; different epochs produce different ones.
#[derive(Debug, Clone, Copy)]
pub struct ShuffleSampler {
    seed: u64,
}

impl ShuffleSampler {
    pub fn new(seed: u64) -> Self {
        ShuffleSampler { seed }
    }
}

impl Sampler for ShuffleSampler {
    fn iter(&self, dataset_len: usize, epoch: u64) -> Box<dyn Iterator<Item = usize> + Send + Sync> {
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(epoch));
        let mut indices: Vec<usize> = (0..dataset_len).collect();
        indices.shuffle(&mut rng);
        Box::new(indices.into_iter())
    }
}
