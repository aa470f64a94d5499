//! Post-run processing utilities.
//!
//! Turns the final sequencer state into a session summary for presentation layers.

use crate::engine::Sequencer;
use crate::model::{PhaseStatus, SessionSummary};

/// Summarize a session from the sequencer's current state.
///
/// Works for finished and abandoned sessions alike; `completed` tells them apart.
pub(crate) fn summarize(seq: &Sequencer) -> SessionSummary {
    let plan = seq.plan();
    let phases_completed = (0..plan.len())
        .filter(|&i| seq.phase_status(i) == PhaseStatus::Done)
        .count();

    SessionSummary {
        plan_name: plan.name().to_string(),
        finished_at_utc: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "now".into()),
        phases_completed,
        phase_count: plan.len(),
        total_elapsed_secs: seq.total_elapsed(),
        nominal_duration_secs: plan.total_duration(),
        completed: seq.is_complete(),
    }
}
