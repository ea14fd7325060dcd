use crate::simulation::TrainingStatus;
use std::fmt;

/// What a client's status chip shows. Every client mirrors the run as a
/// whole; the demo has no per-client progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientActivity {
    /// No run yet.
    Ready,
    /// Rounds are ticking.
    Training,
    /// Run paused or finished with history on screen.
    Idle,
}

impl ClientActivity {
    pub fn from_state(status: TrainingStatus, rounds_done: u32) -> Self {
        if status == TrainingStatus::Running {
            Self::Training
        } else if rounds_done > 0 {
            Self::Idle
        } else {
            Self::Ready
        }
    }
}

impl fmt::Display for ClientActivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready => write!(f, "Ready"),
            Self::Training => write!(f, "Training"),
            Self::Idle => write!(f, "Idle"),
        }
    }
}

/// The fixed set of participating sites. Fictitious, like the rest of the
/// demo; the data never leaves the trend functions.
#[derive(Debug, Clone)]
pub struct ClientRoster {
    names: Vec<String>,
}

impl Default for ClientRoster {
    fn default() -> Self {
        Self {
            names: ["A", "B", "C", "D", "E"]
                .iter()
                .map(|suffix| format!("Hospital {}", suffix))
                .collect(),
        }
    }
}

impl ClientRoster {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Pairs every client with the activity implied by the run state.
    pub fn labeled(
        &self,
        status: TrainingStatus,
        rounds_done: u32,
    ) -> Vec<(&str, ClientActivity)> {
        let activity = ClientActivity::from_state(status, rounds_done);
        self.names
            .iter()
            .map(|name| (name.as_str(), activity))
            .collect()
    }
}
