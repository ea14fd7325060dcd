use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::SimConfig;

/// Synthetic metric generator: linear drift per round, a bounded uniform
/// noise draw on top, then the floor/ceiling clamp. Holds its own RNG so a
/// seeded run replays the exact same sequence.
#[derive(Debug)]
pub struct TrendModel {
    loss_start: f64,
    loss_decay: f64,
    loss_noise: f64,
    loss_floor: f64,
    accuracy_start: f64,
    accuracy_gain: f64,
    accuracy_noise: f64,
    accuracy_ceiling: f64,
    seed: Option<u64>,
    rng: StdRng,
}

impl TrendModel {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            loss_start: config.loss_start,
            loss_decay: config.loss_decay,
            loss_noise: config.loss_noise,
            loss_floor: config.loss_floor,
            accuracy_start: config.accuracy_start,
            accuracy_gain: config.accuracy_gain,
            accuracy_noise: config.accuracy_noise,
            accuracy_ceiling: config.accuracy_ceiling,
            seed: config.seed,
            rng: Self::rng_for(config.seed),
        }
    }

    /// Rewinds the generator to the start of its sequence. With a seed this
    /// makes reset-then-run indistinguishable from a fresh run.
    pub fn reset(&mut self) {
        self.rng = Self::rng_for(self.seed);
    }

    pub fn loss_at(&mut self, round: u32) -> f64 {
        let drift = self.loss_start - round as f64 * self.loss_decay;
        (drift + self.noise(self.loss_noise)).max(self.loss_floor)
    }

    pub fn accuracy_at(&mut self, round: u32) -> f64 {
        let drift = self.accuracy_start + round as f64 * self.accuracy_gain;
        (drift + self.noise(self.accuracy_noise)).min(self.accuracy_ceiling)
    }

    fn noise(&mut self, amplitude: f64) -> f64 {
        // gen_range panics on an empty range, so zero amplitude short-circuits
        if amplitude > 0.0 {
            self.rng.gen_range(0.0..amplitude)
        } else {
            0.0
        }
    }

    fn rng_for(seed: Option<u64>) -> StdRng {
        match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
