use crate::plan::Phase;
use serde::{Deserialize, Serialize};

/// Coarse lifecycle of a session, derived from the sequencer's run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
    Complete,
}

impl TimerStatus {
    pub fn label(self) -> &'static str {
        match self {
            TimerStatus::Idle => "Ready",
            TimerStatus::Running => "Running",
            TimerStatus::Paused => "Paused",
            TimerStatus::Complete => "Complete",
        }
    }
}

/// Position of a plan row relative to the active phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    Done,
    Current,
    Upcoming,
}

/// Read-only view of the sequencer, published after every tick and command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub phase_index: usize,
    pub phase_count: usize,
    pub phase: Phase,
    pub time_remaining: u32,
    pub is_running: bool,
    pub total_elapsed: u64,
    pub phase_progress_percent: f64,
    pub overall_progress_percent: f64,
    pub is_rest_phase: bool,
    pub status: TimerStatus,
    pub muted: bool,
}

/// Outcome of one session, finished or stopped early.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub plan_name: String,
    #[serde(default)]
    pub finished_at_utc: String,
    pub phases_completed: usize,
    pub phase_count: usize,
    pub total_elapsed_secs: u64,
    pub nominal_duration_secs: u64,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TimerEvent {
    State(TimerSnapshot),
    PhaseStarted {
        index: usize,
        phase: Phase,
    },
    PhaseCompleted {
        index: usize,
        phase: Phase,
    },
    WorkoutCompleted {
        summary: SessionSummary,
    },
    /// Closing record for a session that stopped before its last phase.
    SessionEnded {
        summary: SessionSummary,
    },
    Info(InfoEvent),
}

/// Structured info events emitted by the controller and consumed by UI/CLI layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InfoEvent {
    Message(String),
    MuteChanged(bool),
    PlanLoaded { name: String, source: String },
}

impl InfoEvent {
    /// Render a human-readable message for UI/CLI layers.
    pub fn to_message(&self) -> String {
        match self {
            InfoEvent::Message(msg) => msg.clone(),
            InfoEvent::MuteChanged(true) => "Sound off".to_string(),
            InfoEvent::MuteChanged(false) => "Sound on".to_string(),
            InfoEvent::PlanLoaded { name, source } => {
                format!("Loaded plan \"{}\" ({})", name, source)
            }
        }
    }
}

/// Format seconds as `MM:SS`. Minutes are not folded into hours.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
