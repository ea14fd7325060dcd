// ,------.,------.,------.   ,---.  ,--.,--.   ,--.
// |  .---'|  .---'|  .--.  \'   .-' |  ||   `.'   |
// |  `--, |  `--, |  |  \  :`.  `-. |  ||  |'.'|  |
// |  |    |  `---.|  '--'  /.-'    ||  ||  |   |  |
// `--'    `------'`-------' `-----' `--'`--'   `--'

// A terminal demo of a federated training run. The "federation" is five
// hardcoded hospitals and every metric comes out of two trend functions,
// so don't cite these numbers anywhere serious.

// Copyright 2025 Servus Altissimi (Pseudonym)

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use fedsim::metrics::logger::{self, MetricsLogger};
use fedsim::metrics::report;
use fedsim::prelude::*;
use fedsim::view::{self, MetricsView};

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn, Level};

use tracing_subscriber;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full training session to completion
    Run {
        #[arg(short, long, default_value_t = 50)]
        rounds: u32,
        #[arg(short, long, default_value_t = 800, value_parser = clap::value_parser!(u64).range(1..))]
        interval_ms: u64,
        #[arg(short, long)]
        seed: Option<u64>,
        #[arg(short, long, default_value = "qvnn")]
        name: String,
        #[arg(long, default_value = "results")]
        out_dir: String,
        #[arg(long)]
        no_export: bool,
    },

    /// Drive a session by hand: start, pause, reset, status, quit
    Interactive {
        #[arg(short, long, default_value_t = 50)]
        rounds: u32,
        #[arg(short, long, default_value_t = 800, value_parser = clap::value_parser!(u64).range(1..))]
        interval_ms: u64,
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Summarize an exported run (a CSV file, or the newest one in a directory)
    Report {
        #[arg(default_value = "results")]
        input: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let program_start = Instant::now(); // Global timer for end time.

    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Run {
            rounds,
            interval_ms,
            seed,
            name,
            out_dir,
            no_export,
        } => {
            run_training(rounds, interval_ms, seed, name, out_dir, !no_export).await?;
        }

        Commands::Interactive {
            rounds,
            interval_ms,
            seed,
        } => {
            interactive_session(rounds, interval_ms, seed).await?;
        }

        Commands::Report { input } => {
            report_from(&input)?;
        }
    }

    let total_time = program_start.elapsed();
    info!("Total runtime: {:.2}s", total_time.as_secs_f64());

    Ok(())
}

async fn run_training(
    rounds: u32,
    interval_ms: u64,
    seed: Option<u64>,
    name: String,
    out_dir: String,
    export: bool,
) -> Result<()> {
    let config = SimConfig::default()
        .with_name(name)
        .with_max_rounds(rounds)
        .with_tick_interval(Duration::from_millis(interval_ms))
        .with_seed(seed);

    info!("Starting run: {}", config.name);
    info!(
        "Rounds: {}, interval: {:?}, seed: {:?}",
        config.max_rounds, config.tick_interval, config.seed
    );

    let roster = ClientRoster::default();
    info!("Clients: {}", roster.names().join(", "));

    let controller = TrainingController::new(config);
    let mut events = controller.subscribe();
    let progress = MetricsView::new(controller.config().max_rounds, roster.len())?;

    controller.start();
    progress.follow(&mut events).await;

    let snapshot = controller.snapshot();
    println!("{}", view::client_table(&roster, snapshot.status, snapshot.round));

    let summary = report::analyze(&snapshot.samples, &controller.config().name);
    println!("{}", view::summary_table(&summary));

    if export {
        save_results(&snapshot, &summary, controller.config(), &out_dir)?;
    }

    Ok(())
}

async fn interactive_session(rounds: u32, interval_ms: u64, seed: Option<u64>) -> Result<()> {
    let config = SimConfig::default()
        .with_max_rounds(rounds)
        .with_tick_interval(Duration::from_millis(interval_ms))
        .with_seed(seed);
    let roster = ClientRoster::default();
    let controller = TrainingController::new(config);
    let mut events = controller.subscribe();

    println!("Commands: start | pause | reset | status | quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Ok(TrainingEvent::RoundCompleted(sample)) => {
                        println!(
                            "round {:>3}  loss {:.4}  acc {:.1}%",
                            sample.round,
                            sample.loss,
                            sample.accuracy * 100.0
                        );
                    }
                    Ok(TrainingEvent::StatusChanged(status)) => {
                        println!("status: {}", status);
                    }
                    Err(RecvError::Lagged(missed)) => {
                        warn!("Skipped {} events", missed);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    "start" | "s" => controller.start(),
                    "pause" | "p" => controller.pause(),
                    "reset" | "r" => controller.reset(),
                    "status" => {
                        let snap = controller.snapshot();
                        print!("{}", view::client_table(&roster, snap.status, snap.round));
                        println!(
                            "status: {} | round {}/{}",
                            snap.status,
                            snap.round,
                            controller.config().max_rounds
                        );
                        if snap.status.is_active() {
                            let remaining =
                                controller.config().max_rounds.saturating_sub(snap.round);
                            println!("{} rounds to go", remaining);
                        }
                    }
                    "quit" | "q" => break,
                    "" => {}
                    other => println!("Unknown command: {}", other),
                }
            }
        }
    }

    Ok(())
}

fn report_from(input: &str) -> Result<()> {
    let path = resolve_run_file(input)?;
    info!("Reading run from: {}", path.display());

    let samples = logger::load_samples(&path)?;
    if samples.is_empty() {
        anyhow::bail!("No samples in {}", path.display());
    }

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "run".to_string());
    let summary = report::analyze(&samples, &name);
    println!("{}", view::summary_table(&summary));

    Ok(())
}

/// A CSV path as given, or the newest exported CSV under a directory.
/// Export names embed a sortable timestamp, so lexical order is age order.
fn resolve_run_file(input: &str) -> Result<PathBuf> {
    let path = Path::new(input);
    if path.is_file() {
        return Ok(path.to_path_buf());
    }
    if path.is_dir() {
        let mut runs = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            let entry_path = entry.path();
            if entry_path.extension().and_then(|s| s.to_str()) == Some("csv") {
                runs.push(entry_path);
            }
        }
        runs.sort();
        if let Some(newest) = runs.pop() {
            return Ok(newest);
        }
        anyhow::bail!("No exported runs in {}", input);
    }
    anyhow::bail!("No such file or directory: {}", input)
}

/// Shape of the exported `_summary.json`: the aggregates plus the exact
/// configuration and final status that produced them.
#[derive(Serialize)]
struct RunSummary<'a> {
    config: &'a SimConfig,
    status: TrainingStatus,
    summary: &'a RunReport,
}

fn save_results(
    snapshot: &TrainingSnapshot,
    summary: &RunReport,
    config: &SimConfig,
    out_dir: &str,
) -> Result<()> {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");

    std::fs::create_dir_all(out_dir)?;

    let csv_path = format!("{}/{}_{}.csv", out_dir, config.name, timestamp);
    let mut logger = MetricsLogger::new(&csv_path)?;
    logger.log_batch(&snapshot.samples)?;
    info!("Samples saved to: {}", csv_path);

    let json_path = format!("{}/{}_{}_summary.json", out_dir, config.name, timestamp);
    let payload = RunSummary {
        config,
        status: snapshot.status,
        summary,
    };
    std::fs::write(&json_path, serde_json::to_string_pretty(&payload)?)?;
    info!("Summary saved to: {}", json_path);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_writes_samples_and_a_config_bearing_summary() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let out_dir = dir.path().to_str().unwrap();

        let config = SimConfig::default()
            .with_name("export_check")
            .with_seed(Some(42));
        let samples: Vec<MetricSample> = (1..=4)
            .map(|round| MetricSample {
                round,
                loss: 1.0 / round as f64,
                accuracy: 0.5 + 0.1 * round as f64,
                timestamp: round as f64,
            })
            .collect();
        let snapshot = TrainingSnapshot {
            status: TrainingStatus::Completed,
            round: 4,
            samples: samples.clone(),
        };
        let summary = report::analyze(&snapshot.samples, &config.name);

        save_results(&snapshot, &summary, &config, out_dir)?;

        let mut csvs = Vec::new();
        let mut jsons = Vec::new();
        for entry in std::fs::read_dir(dir.path())? {
            let path = entry?.path();
            match path.extension().and_then(|s| s.to_str()) {
                Some("csv") => csvs.push(path),
                Some("json") => jsons.push(path),
                _ => {}
            }
        }
        assert_eq!(csvs.len(), 1);
        assert_eq!(jsons.len(), 1);

        let reloaded = logger::load_samples(&csvs[0])?;
        assert_eq!(reloaded, samples);

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&jsons[0])?)?;
        assert_eq!(value["config"]["name"], "export_check");
        assert_eq!(value["config"]["seed"], 42);
        assert_eq!(value["config"]["max_rounds"], 50);
        assert_eq!(value["status"], "Completed");
        assert_eq!(value["summary"]["rounds_completed"], 4);
        Ok(())
    }

    #[test]
    fn newest_export_wins_when_reporting_on_a_directory() -> Result<()> {
        let dir = tempfile::tempdir()?;
        for name in [
            "run_20250101_000000.csv",
            "run_20250601_000000.csv",
            "notes.txt",
        ] {
            std::fs::write(dir.path().join(name), "round,loss,accuracy,timestamp\n")?;
        }

        let picked = resolve_run_file(dir.path().to_str().unwrap())?;
        assert!(picked.ends_with("run_20250601_000000.csv"));
        Ok(())
    }
}
