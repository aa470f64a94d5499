//! Text output builders for CLI modes.
//!
//! Formats plan listings, live progress lines, and end-of-session summaries.

use crate::model::{format_clock, SessionSummary, TimerSnapshot};
use crate::plan::PhasePlan;

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

/// One row per phase plus the total, as printed by `--list`.
pub(crate) fn build_plan_listing(plan: &PhasePlan) -> TextSummary {
    let mut lines = vec![format!("{} ({} phases)", plan.name(), plan.len())];
    let width = plan
        .phases()
        .iter()
        .map(|p| p.name.chars().count())
        .max()
        .unwrap_or(0);
    for (i, p) in plan.phases().iter().enumerate() {
        lines.push(format!(
            "{:>3}. {:<width$}  {:<9}  {}",
            i + 1,
            p.name,
            p.kind.label(),
            format_clock(u64::from(p.duration_secs)),
        ));
    }
    lines.push(format!("Total: {}", format_clock(plan.total_duration())));
    TextSummary { lines }
}

/// Single progress line for `--text` mode.
pub(crate) fn progress_line(s: &TimerSnapshot) -> String {
    format!(
        "[{}/{}] {} {}  phase {:.0}%  overall {:.0}%{}",
        s.phase_index + 1,
        s.phase_count,
        s.phase.name,
        format_clock(u64::from(s.time_remaining)),
        s.phase_progress_percent,
        s.overall_progress_percent,
        if s.is_rest_phase { "  (rest)" } else { "" },
    )
}

/// End-of-session summary.
pub(crate) fn build_session_summary(summary: &SessionSummary) -> TextSummary {
    let mut lines = Vec::new();
    let status = if summary.completed {
        "complete"
    } else {
        "stopped early"
    };
    lines.push(format!("Workout: {} ({status})", summary.plan_name));
    lines.push(format!(
        "Phases: {} of {}",
        summary.phases_completed, summary.phase_count
    ));
    lines.push(format!(
        "Time spent: {} (plan {})",
        format_clock(summary.total_elapsed_secs),
        format_clock(summary.nominal_duration_secs)
    ));
    if !summary.finished_at_utc.is_empty() {
        lines.push(format!("Finished: {}", summary.finished_at_utc));
    }
    TextSummary { lines }
}
