use super::MetricSample;
use serde::{Deserialize, Serialize};

/// Aggregates of one finished (or interrupted) run, for the summary table
/// and the JSON export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_name: String,
    pub rounds_completed: u32,
    pub final_loss: f64,
    pub final_accuracy: f64,
    pub min_loss: f64,
    pub min_loss_round: u32,
    pub best_accuracy: f64,
    pub best_accuracy_round: u32,
    pub avg_loss: f64,
    pub avg_accuracy: f64,
    pub duration_secs: f64,
}

pub fn analyze(samples: &[MetricSample], run_name: &str) -> RunReport {
    let Some(last) = samples.last() else {
        return RunReport {
            run_name: run_name.to_string(),
            rounds_completed: 0,
            final_loss: 0.0,
            final_accuracy: 0.0,
            min_loss: 0.0,
            min_loss_round: 0,
            best_accuracy: 0.0,
            best_accuracy_round: 0,
            avg_loss: 0.0,
            avg_accuracy: 0.0,
            duration_secs: 0.0,
        };
    };

    let mut min_loss = f64::INFINITY;
    let mut min_loss_round = 0;
    let mut best_accuracy = f64::NEG_INFINITY;
    let mut best_accuracy_round = 0;
    let mut loss_sum = 0.0;
    let mut accuracy_sum = 0.0;
    for sample in samples {
        if sample.loss < min_loss {
            min_loss = sample.loss;
            min_loss_round = sample.round;
        }
        if sample.accuracy > best_accuracy {
            best_accuracy = sample.accuracy;
            best_accuracy_round = sample.round;
        }
        loss_sum += sample.loss;
        accuracy_sum += sample.accuracy;
    }
    let n = samples.len() as f64;

    RunReport {
        run_name: run_name.to_string(),
        rounds_completed: last.round,
        final_loss: last.loss,
        final_accuracy: last.accuracy,
        min_loss,
        min_loss_round,
        best_accuracy,
        best_accuracy_round,
        avg_loss: loss_sum / n,
        avg_accuracy: accuracy_sum / n,
        duration_secs: last.timestamp,
    }
}
