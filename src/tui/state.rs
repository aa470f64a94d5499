use crate::model::{
    format_clock, PhaseStatus, SessionSummary, TimerEvent, TimerSnapshot, TimerStatus,
};
use crate::plan::PhasePlan;
use ratatui::style::Color;
use std::sync::Arc;

pub const TAB_TIMER: usize = 0;
pub const TAB_HELP: usize = 1;
pub const TAB_COUNT: usize = 2;

/// Everything the UI thread renders. Owned by the UI thread only.
pub struct UiState {
    pub tab: usize,
    pub plan: Arc<PhasePlan>,
    pub snapshot: Option<TimerSnapshot>,
    pub info: String,
    pub last_summary: Option<SessionSummary>,
}

impl UiState {
    pub fn new(plan: Arc<PhasePlan>, info: String) -> Self {
        Self {
            tab: TAB_TIMER,
            plan,
            snapshot: None,
            info,
            last_summary: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.snapshot.as_ref().is_some_and(|s| s.is_running)
    }

    pub fn is_rest_phase(&self) -> bool {
        self.snapshot.as_ref().is_some_and(|s| s.is_rest_phase)
    }

    /// Plan row status as seen from the latest snapshot.
    pub fn row_status(&self, index: usize) -> PhaseStatus {
        let Some(s) = self.snapshot.as_ref() else {
            return if index == 0 {
                PhaseStatus::Current
            } else {
                PhaseStatus::Upcoming
            };
        };
        if s.status == TimerStatus::Complete || index < s.phase_index {
            PhaseStatus::Done
        } else if index == s.phase_index {
            PhaseStatus::Current
        } else {
            PhaseStatus::Upcoming
        }
    }

    /// Accent colour: rest phases stand out from active ones.
    pub fn accent(&self) -> Color {
        if self.is_rest_phase() {
            Color::Cyan
        } else {
            Color::Green
        }
    }
}

pub fn apply_event(state: &mut UiState, ev: TimerEvent) {
    match ev {
        TimerEvent::State(s) => {
            if s.status == TimerStatus::Idle {
                state.last_summary = None;
            }
            state.snapshot = Some(s);
        }
        TimerEvent::PhaseStarted { index, phase } => {
            state.info = format!(
                "Phase {}: {} ({})",
                index + 1,
                phase.name,
                format_clock(u64::from(phase.duration_secs))
            );
        }
        TimerEvent::PhaseCompleted { phase, .. } => {
            state.info = format!("Finished {}", phase.name);
        }
        TimerEvent::WorkoutCompleted { summary } => {
            state.info = format!(
                "Workout complete in {}. Press r to go again.",
                format_clock(summary.total_elapsed_secs)
            );
            state.last_summary = Some(summary);
        }
        TimerEvent::SessionEnded { .. } => {}
        TimerEvent::Info(info) => state.info = info.to_message(),
    }
}
