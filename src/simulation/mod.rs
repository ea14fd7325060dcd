pub mod config;
pub mod trend;

pub use config::SimConfig;

use crate::metrics::MetricSample;
use trend::TrendModel;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Where a run currently is in its lifecycle. `Completed` is terminal and
/// only `reset` leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainingStatus {
    Idle,
    Running,
    Paused,
    Completed,
}

impl TrainingStatus {
    /// A run that has been started and not yet finished or cleared.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for TrainingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Paused => write!(f, "paused"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// Read-only copy of the controller state. Views render these; nothing
/// outside the controller ever writes back.
#[derive(Debug, Clone)]
pub struct TrainingSnapshot {
    pub status: TrainingStatus,
    /// Rounds completed so far; always equals `samples.len()`.
    pub round: u32,
    pub samples: Vec<MetricSample>,
}

impl TrainingSnapshot {
    pub fn latest(&self) -> Option<&MetricSample> {
        self.samples.last()
    }
}

/// Pushed to every subscriber when the run advances or changes state.
/// Round events arrive in strictly increasing round order.
#[derive(Debug, Clone)]
pub enum TrainingEvent {
    RoundCompleted(MetricSample),
    StatusChanged(TrainingStatus),
}

struct ControllerInner {
    status: TrainingStatus,
    round: u32,
    samples: Vec<MetricSample>,
    trend: TrendModel,
    /// Bumped on every arm/disarm; a tick carrying a stale generation is dead.
    generation: u64,
    ticker: Option<CancellationToken>,
    started_at: Option<Instant>,
}

impl ControllerInner {
    /// Stops the armed ticker, if any, and invalidates ticks already in
    /// flight. Must be called with the state lock held.
    fn disarm(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(token) = self.ticker.take() {
            token.cancel();
        }
    }
}

/// Drives one simulated federated training run: one metric sample per round,
/// rounds on a fixed cadence, start/pause/reset controls.
///
/// Cloning yields another handle to the same run, in the manner of a shared
/// collector; all handles see the same state and events.
#[derive(Clone)]
pub struct TrainingController {
    inner: Arc<Mutex<ControllerInner>>,
    events: broadcast::Sender<TrainingEvent>,
    config: Arc<SimConfig>,
}

impl TrainingController {
    pub fn new(config: SimConfig) -> Self {
        let (events, _) = broadcast::channel(256);
        let trend = TrendModel::new(&config);
        Self {
            inner: Arc::new(Mutex::new(ControllerInner {
                status: TrainingStatus::Idle,
                round: 0,
                samples: Vec::new(),
                trend,
                generation: 0,
                ticker: None,
                started_at: None,
            })),
            events,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// New event stream. Subscribe before `start` to observe the whole run.
    pub fn subscribe(&self) -> broadcast::Receiver<TrainingEvent> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> TrainingSnapshot {
        let inner = self.inner.lock();
        TrainingSnapshot {
            status: inner.status,
            round: inner.round,
            samples: inner.samples.clone(),
        }
    }

    pub fn status(&self) -> TrainingStatus {
        self.inner.lock().status
    }

    pub fn round(&self) -> u32 {
        self.inner.lock().round
    }

    /// Begins or resumes ticking. No-op unless idle or paused; a completed
    /// run stays completed until `reset`. Must be called inside a tokio
    /// runtime, since it spawns the ticker task.
    pub fn start(&self) {
        let mut inner = self.inner.lock();
        match inner.status {
            TrainingStatus::Idle | TrainingStatus::Paused => {}
            other => {
                debug!("start ignored while {}", other);
                return;
            }
        }

        inner.disarm();
        inner.status = TrainingStatus::Running;
        if inner.started_at.is_none() {
            inner.started_at = Some(Instant::now());
        }
        let token = CancellationToken::new();
        inner.ticker = Some(token.clone());
        let generation = inner.generation;
        let from_round = inner.round;
        let _ = self
            .events
            .send(TrainingEvent::StatusChanged(TrainingStatus::Running));
        drop(inner);

        info!(
            "Training running from round {} ({} max, every {:?})",
            from_round, self.config.max_rounds, self.config.tick_interval
        );

        let controller = self.clone();
        tokio::spawn(async move {
            controller.run_ticker(token, generation).await;
        });
    }

    /// Freezes the run where it is. History and round survive; a later
    /// `start` continues the numbering. No-op unless running.
    pub fn pause(&self) {
        let mut inner = self.inner.lock();
        if inner.status != TrainingStatus::Running {
            debug!("pause ignored while {}", inner.status);
            return;
        }

        inner.disarm();
        inner.status = TrainingStatus::Paused;
        let round = inner.round;
        let _ = self
            .events
            .send(TrainingEvent::StatusChanged(TrainingStatus::Paused));
        drop(inner);

        info!("Training paused at round {}", round);
    }

    /// Back to the initial state: ticking stopped, history cleared, round 0.
    /// Valid from any state, idempotent. A pending tick that fires after
    /// this returns cannot touch the cleared state.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        let was_pristine = inner.status == TrainingStatus::Idle && inner.round == 0;

        inner.disarm();
        inner.status = TrainingStatus::Idle;
        inner.round = 0;
        inner.samples.clear();
        inner.started_at = None;
        inner.trend.reset();
        if !was_pristine {
            let _ = self
                .events
                .send(TrainingEvent::StatusChanged(TrainingStatus::Idle));
        }
        drop(inner);

        info!("Training reset");
    }

    async fn run_ticker(self, token: CancellationToken, generation: u64) {
        let period = self.config.tick_interval;
        let mut ticks = time::interval_at(Instant::now() + period, period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticks.tick() => {
                    if !self.advance_round(generation) {
                        break;
                    }
                }
            }
        }
    }

    /// One scheduler tick: append the next round's sample, or finish the
    /// run. Returns false once this ticker has nothing left to do. The
    /// generation check makes a tick that lost the race against `pause` or
    /// `reset` a no-op.
    fn advance_round(&self, generation: u64) -> bool {
        let mut inner = self.inner.lock();
        if inner.generation != generation || inner.status != TrainingStatus::Running {
            return false;
        }

        if inner.round >= self.config.max_rounds {
            // Exhausted: drop the increment, no sample past max_rounds.
            self.complete(&mut inner);
            return false;
        }

        inner.round += 1;
        let round = inner.round;
        let timestamp = inner
            .started_at
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or_default();
        let loss = inner.trend.loss_at(round);
        let accuracy = inner.trend.accuracy_at(round);
        let sample = MetricSample {
            round,
            loss,
            accuracy,
            timestamp,
        };
        inner.samples.push(sample.clone());
        let _ = self.events.send(TrainingEvent::RoundCompleted(sample));
        debug!(
            "Round {} done: loss {:.4}, accuracy {:.4}",
            round, loss, accuracy
        );

        if round == self.config.max_rounds {
            self.complete(&mut inner);
            return false;
        }
        true
    }

    fn complete(&self, inner: &mut ControllerInner) {
        inner.disarm();
        inner.status = TrainingStatus::Completed;
        let _ = self
            .events
            .send(TrainingEvent::StatusChanged(TrainingStatus::Completed));
        info!("Training completed after {} rounds", inner.round);
    }
}
