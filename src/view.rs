use crate::clients::ClientRoster;
use crate::metrics::report::RunReport;
use crate::simulation::{TrainingEvent, TrainingStatus};
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Write as _;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

/// Live progress display for a run: one bar tick per round, metric stat
/// line in the message slot.
pub struct MetricsView {
    bar: ProgressBar,
    clients: usize,
}

impl MetricsView {
    pub fn new(max_rounds: u32, clients: usize) -> Result<Self> {
        let bar = ProgressBar::new(max_rounds as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} rounds {msg}")?
                .progress_chars("█▓░"),
        );
        Ok(Self { bar, clients })
    }

    /// Renders events until the run completes or every sender is gone.
    pub async fn follow(&self, events: &mut broadcast::Receiver<TrainingEvent>) {
        loop {
            match events.recv().await {
                Ok(TrainingEvent::RoundCompleted(sample)) => {
                    self.bar.set_position(sample.round as u64);
                    self.bar.set_message(format!(
                        "loss {:.4} | acc {:.1}% | clients {}",
                        sample.loss,
                        sample.accuracy * 100.0,
                        self.clients
                    ));
                }
                Ok(TrainingEvent::StatusChanged(status)) if status.is_finished() => {
                    self.bar.finish_with_message("Training complete");
                    return;
                }
                Ok(TrainingEvent::StatusChanged(_)) => {}
                Err(RecvError::Lagged(missed)) => {
                    warn!("Display fell behind, skipped {} events", missed);
                }
                Err(RecvError::Closed) => return,
            }
        }
    }
}

pub fn client_table(roster: &ClientRoster, status: TrainingStatus, rounds_done: u32) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "╔══════════════════════════════╗");
    let _ = writeln!(out, "║{:^30}║", "FEDERATED CLIENTS");
    let _ = writeln!(out, "╠══════════════════╦═══════════╣");
    let _ = writeln!(out, "║ Client           ║ Status    ║");
    let _ = writeln!(out, "╠══════════════════╬═══════════╣");
    for (name, activity) in roster.labeled(status, rounds_done) {
        let _ = writeln!(out, "║ {:<16} ║ {:<9} ║", name, activity.to_string());
    }
    let _ = writeln!(out, "╚══════════════════╩═══════════╝");
    out
}

pub fn summary_table(report: &RunReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "╔═════════════════════════════════════════╗");
    let _ = writeln!(out, "║{:^41}║", "TRAINING SUMMARY");
    let _ = writeln!(out, "╠══════════════════════════╦══════════════╣");
    let _ = writeln!(out, "║ Run                      ║ {:>12} ║", report.run_name);
    let _ = writeln!(
        out,
        "║ Rounds completed         ║ {:>12} ║",
        report.rounds_completed
    );
    let _ = writeln!(
        out,
        "║ Final loss               ║ {:>12.4} ║",
        report.final_loss
    );
    let _ = writeln!(
        out,
        "║ Final accuracy           ║ {:>11.2}% ║",
        report.final_accuracy * 100.0
    );
    let _ = writeln!(out, "║ Min loss                 ║ {:>12.4} ║", report.min_loss);
    let _ = writeln!(
        out,
        "║ Min loss round           ║ {:>12} ║",
        report.min_loss_round
    );
    let _ = writeln!(
        out,
        "║ Best accuracy            ║ {:>11.2}% ║",
        report.best_accuracy * 100.0
    );
    let _ = writeln!(
        out,
        "║ Best accuracy round      ║ {:>12} ║",
        report.best_accuracy_round
    );
    let _ = writeln!(out, "║ Avg loss                 ║ {:>12.4} ║", report.avg_loss);
    let _ = writeln!(
        out,
        "║ Avg accuracy             ║ {:>11.2}% ║",
        report.avg_accuracy * 100.0
    );
    let _ = writeln!(
        out,
        "║ Duration                 ║ {:>11.1}s ║",
        report.duration_secs
    );
    let _ = writeln!(out, "╚══════════════════════════╩══════════════╝");
    out
}
