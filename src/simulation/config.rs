use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Everything tunable about a simulated run. The defaults are the reference
/// demo's constants; tests shrink the interval and pin the seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub name: String,
    /// Wall-clock gap between rounds.
    pub tick_interval: Duration,
    /// Hard cap on rounds per run.
    pub max_rounds: u32,
    pub loss_start: f64,
    /// Linear loss decrease per round, applied before the noise draw.
    pub loss_decay: f64,
    /// Uniform noise amplitude added to the loss, [0, loss_noise).
    pub loss_noise: f64,
    pub loss_floor: f64,
    pub accuracy_start: f64,
    pub accuracy_gain: f64,
    pub accuracy_noise: f64,
    pub accuracy_ceiling: f64,
    /// Fixed RNG seed; None draws from entropy.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            name: "qvnn".to_string(),
            tick_interval: Duration::from_millis(800),
            max_rounds: 50,
            loss_start: 0.85,
            loss_decay: 0.016,
            loss_noise: 0.03,
            loss_floor: 0.05,
            accuracy_start: 0.55,
            accuracy_gain: 0.009,
            accuracy_noise: 0.01,
            accuracy_ceiling: 0.99,
            seed: None,
        }
    }
}

impl SimConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_max_rounds(mut self, rounds: u32) -> Self {
        self.max_rounds = rounds;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Strips both noise terms so the trend becomes exactly linear.
    pub fn without_noise(mut self) -> Self {
        self.loss_noise = 0.0;
        self.accuracy_noise = 0.0;
        self
    }
}
