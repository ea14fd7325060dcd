pub mod logger;
pub mod report;

use serde::{Deserialize, Serialize};

/// One synthetic measurement, produced once per completed round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    /// 1-based round number, consecutive within a run.
    pub round: u32,
    pub loss: f64,
    pub accuracy: f64,
    /// Seconds since the run was first started (wall clock, pauses included).
    pub timestamp: f64,
}
