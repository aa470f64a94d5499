//! Phase sequencer.
//!
//! Owns the run state of a session and advances it one tick at a time. The
//! sequencer knows nothing about clocks, audio, or rendering: callers drive
//! [`Sequencer::tick`] from whatever periodic trigger they have and act on the
//! returned [`Transition`].

pub mod cue;

use crate::model::{PhaseStatus, TimerSnapshot, TimerStatus};
use crate::plan::{Phase, PhasePlan};
use cue::CueKind;
use std::sync::Arc;

/// A phase boundary crossed during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Phase `from` finished and phase `to` was loaded.
    Advanced { from: usize, to: usize },
    /// The last phase finished; the session is over.
    Completed { last: usize },
}

impl Transition {
    /// Cues to play for this transition, in order.
    pub fn cues(self) -> &'static [CueKind] {
        match self {
            Transition::Advanced { .. } => &[CueKind::PhaseComplete],
            Transition::Completed { .. } => &[CueKind::PhaseComplete, CueKind::WorkoutComplete],
        }
    }

    /// Index of the phase that just finished.
    pub fn finished_index(self) -> usize {
        match self {
            Transition::Advanced { from, .. } => from,
            Transition::Completed { last } => last,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sequencer {
    plan: Arc<PhasePlan>,
    current: usize,
    time_remaining: u32,
    running: bool,
    /// Set by the first `start` since construction or the last `reset`.
    started: bool,
    total_elapsed: u64,
    complete: bool,
}

impl Sequencer {
    pub fn new(plan: Arc<PhasePlan>) -> Self {
        let time_remaining = plan.phases()[0].duration_secs;
        Self {
            plan,
            current: 0,
            time_remaining,
            running: false,
            started: false,
            total_elapsed: 0,
            complete: false,
        }
    }

    /// Begin or resume counting down. Does nothing once the plan is complete.
    pub fn start(&mut self) {
        if self.complete {
            return;
        }
        self.running = true;
        self.started = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Back to the first phase with a full countdown and no elapsed time.
    pub fn reset(&mut self) {
        self.current = 0;
        self.time_remaining = self.plan.phases()[0].duration_secs;
        self.running = false;
        self.started = false;
        self.total_elapsed = 0;
        self.complete = false;
    }

    /// Advance the run state by one second.
    ///
    /// A tick spends one second of the current phase. When that empties the
    /// phase, the transition happens in the same tick: the next phase is loaded
    /// at its full duration and its countdown begins with the following tick.
    /// Finishing the last phase stops the sequencer for good (until `reset`).
    pub fn tick(&mut self) -> Option<Transition> {
        if !self.running {
            return None;
        }

        if self.time_remaining > 0 {
            self.time_remaining -= 1;
            self.total_elapsed += 1;
        }
        if self.time_remaining > 0 {
            return None;
        }

        let from = self.current;
        if from + 1 >= self.plan.len() {
            self.running = false;
            self.complete = true;
            return Some(Transition::Completed { last: from });
        }

        self.current = from + 1;
        self.time_remaining = self.current_phase().duration_secs;
        Some(Transition::Advanced {
            from,
            to: self.current,
        })
    }

    pub fn plan(&self) -> &Arc<PhasePlan> {
        &self.plan
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_phase(&self) -> &Phase {
        &self.plan.phases()[self.current]
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn total_elapsed(&self) -> u64 {
        self.total_elapsed
    }

    pub fn is_rest_phase(&self) -> bool {
        self.current_phase().is_rest()
    }

    pub fn status(&self) -> TimerStatus {
        if self.complete {
            TimerStatus::Complete
        } else if self.running {
            TimerStatus::Running
        } else if !self.started {
            TimerStatus::Idle
        } else {
            TimerStatus::Paused
        }
    }

    /// Share of the current phase already spent, 0..=100.
    pub fn phase_progress_percent(&self) -> f64 {
        let duration = f64::from(self.current_phase().duration_secs);
        (duration - f64::from(self.time_remaining)) / duration * 100.0
    }

    /// Share of the whole plan already spent, 0..=100.
    ///
    /// Remaining time is the unspent part of the current phase plus every later
    /// phase, so this only reaches 100 once the last phase has run out.
    pub fn overall_progress_percent(&self) -> f64 {
        let total = self.plan.total_duration() as f64;
        let remaining =
            self.plan.remaining_from(self.current) + u64::from(self.time_remaining);
        (total - remaining as f64) / total * 100.0
    }

    pub fn phase_status(&self, index: usize) -> PhaseStatus {
        if self.complete || index < self.current {
            PhaseStatus::Done
        } else if index == self.current {
            PhaseStatus::Current
        } else {
            PhaseStatus::Upcoming
        }
    }

    pub fn snapshot(&self, muted: bool) -> TimerSnapshot {
        TimerSnapshot {
            phase_index: self.current,
            phase_count: self.plan.len(),
            phase: self.current_phase().clone(),
            time_remaining: self.time_remaining,
            is_running: self.running,
            total_elapsed: self.total_elapsed,
            phase_progress_percent: self.phase_progress_percent(),
            overall_progress_percent: self.overall_progress_percent(),
            is_rest_phase: self.is_rest_phase(),
            status: self.status(),
            muted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_plan() -> Arc<PhasePlan> {
        Arc::new(
            PhasePlan::new(
                "sample",
                vec![Phase::new("Warm-up", 5), Phase::new("Ex1", 3), Phase::new("Rest", 2)],
            )
            .unwrap(),
        )
    }

    fn ticks(seq: &mut Sequencer, n: usize) -> Vec<Transition> {
        (0..n).filter_map(|_| seq.tick()).collect()
    }

    #[test]
    fn fresh_sequencer_is_idle_on_first_phase() {
        let seq = Sequencer::new(sample_plan());
        assert_eq!(seq.status(), TimerStatus::Idle);
        assert_eq!(seq.current_index(), 0);
        assert_eq!(seq.time_remaining(), 5);
        assert_eq!(seq.total_elapsed(), 0);
        assert!(!seq.is_running());
        assert_eq!(seq.overall_progress_percent(), 0.0);
        assert_eq!(seq.phase_progress_percent(), 0.0);
    }

    #[test]
    fn tick_before_start_does_nothing() {
        let mut seq = Sequencer::new(sample_plan());
        assert_eq!(ticks(&mut seq, 3), vec![]);
        assert_eq!(seq.time_remaining(), 5);
        assert_eq!(seq.total_elapsed(), 0);
    }

    #[test]
    fn transition_lands_on_full_next_phase() {
        let mut seq = Sequencer::new(sample_plan());
        seq.reset();
        seq.start();
        let transitions = ticks(&mut seq, 5);

        assert_eq!(transitions, vec![Transition::Advanced { from: 0, to: 1 }]);
        assert_eq!(seq.current_index(), 1);
        assert_eq!(seq.current_phase().name, "Ex1");
        assert_eq!(seq.time_remaining(), 3);
        assert_eq!(seq.total_elapsed(), 5);

        seq.tick();
        assert_eq!(seq.time_remaining(), 2);
    }

    #[test]
    fn full_plan_completes_after_nominal_duration() {
        let mut seq = Sequencer::new(sample_plan());
        seq.reset();
        seq.start();
        let transitions = ticks(&mut seq, 10);

        assert_eq!(
            transitions,
            vec![
                Transition::Advanced { from: 0, to: 1 },
                Transition::Advanced { from: 1, to: 2 },
                Transition::Completed { last: 2 },
            ]
        );
        assert_eq!(seq.status(), TimerStatus::Complete);
        assert!(!seq.is_running());
        assert_eq!(seq.total_elapsed(), 10);
        assert_eq!(seq.overall_progress_percent(), 100.0);
        assert_eq!(seq.phase_progress_percent(), 100.0);
    }

    #[test]
    fn ticks_after_completion_are_ignored() {
        let mut seq = Sequencer::new(sample_plan());
        seq.start();
        ticks(&mut seq, 10);
        assert_eq!(ticks(&mut seq, 4), vec![]);
        assert_eq!(seq.total_elapsed(), 10);
        assert_eq!(seq.current_index(), 2);
    }

    #[test]
    fn pause_freezes_state() {
        let mut seq = Sequencer::new(sample_plan());
        seq.start();
        ticks(&mut seq, 2);
        let before = seq.snapshot(false);

        seq.pause();
        assert_eq!(ticks(&mut seq, 5), vec![]);
        let mut after = seq.snapshot(false);
        assert_eq!(after.status, TimerStatus::Paused);
        after.is_running = true;
        after.status = TimerStatus::Running;
        assert_eq!(after, before);

        seq.start();
        seq.tick();
        assert_eq!(seq.time_remaining(), 2);
        assert_eq!(seq.total_elapsed(), 3);
        assert_eq!(seq.current_index(), 0);
    }

    #[test]
    fn pause_before_first_tick_is_paused() {
        let mut seq = Sequencer::new(sample_plan());
        seq.start();
        seq.pause();
        assert_eq!(seq.status(), TimerStatus::Paused);
        assert_eq!(seq.time_remaining(), 5);
        assert_eq!(seq.total_elapsed(), 0);

        seq.reset();
        assert_eq!(seq.status(), TimerStatus::Idle);
    }

    #[test]
    fn reset_after_progress_restores_initial_state() {
        let mut seq = Sequencer::new(sample_plan());
        seq.start();
        ticks(&mut seq, 7);
        assert_eq!(seq.current_index(), 1);

        seq.reset();
        assert_eq!(seq.current_index(), 0);
        assert_eq!(seq.time_remaining(), 5);
        assert_eq!(seq.total_elapsed(), 0);
        assert!(!seq.is_running());
        assert_eq!(seq.status(), TimerStatus::Idle);
    }

    #[test]
    fn start_and_pause_are_idempotent() {
        let mut once = Sequencer::new(sample_plan());
        let mut twice = Sequencer::new(sample_plan());
        once.start();
        twice.start();
        twice.start();
        assert_eq!(once.snapshot(false), twice.snapshot(false));

        ticks(&mut once, 3);
        ticks(&mut twice, 3);
        once.pause();
        twice.pause();
        twice.pause();
        assert_eq!(once.snapshot(false), twice.snapshot(false));
    }

    #[test]
    fn start_after_completion_needs_reset() {
        let mut seq = Sequencer::new(sample_plan());
        seq.start();
        ticks(&mut seq, 10);

        seq.start();
        assert!(!seq.is_running());
        assert_eq!(seq.status(), TimerStatus::Complete);

        seq.reset();
        seq.start();
        assert!(seq.is_running());
        seq.tick();
        assert_eq!(seq.time_remaining(), 4);
    }

    #[test]
    fn rest_detection_follows_current_phase() {
        let mut seq = Sequencer::new(sample_plan());
        seq.start();
        assert!(!seq.is_rest_phase());
        ticks(&mut seq, 8);
        assert_eq!(seq.current_index(), 2);
        assert!(seq.is_rest_phase());
    }

    #[test]
    fn progress_is_partial_mid_run() {
        let mut seq = Sequencer::new(sample_plan());
        seq.start();
        ticks(&mut seq, 6);
        // One second into the 3s exercise, six of ten seconds overall.
        assert!((seq.phase_progress_percent() - 100.0 / 3.0).abs() < 1e-9);
        assert!((seq.overall_progress_percent() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn phase_statuses_track_position() {
        let mut seq = Sequencer::new(sample_plan());
        seq.start();
        ticks(&mut seq, 5);
        assert_eq!(seq.phase_status(0), PhaseStatus::Done);
        assert_eq!(seq.phase_status(1), PhaseStatus::Current);
        assert_eq!(seq.phase_status(2), PhaseStatus::Upcoming);

        ticks(&mut seq, 5);
        assert!((0..3).all(|i| seq.phase_status(i) == PhaseStatus::Done));
    }

    #[test]
    fn single_phase_plan() {
        let plan = Arc::new(PhasePlan::new("one", vec![Phase::new("Plank", 1)]).unwrap());
        let mut seq = Sequencer::new(plan);
        seq.start();
        assert_eq!(seq.tick(), Some(Transition::Completed { last: 0 }));
        assert_eq!(seq.total_elapsed(), 1);
        assert_eq!(seq.overall_progress_percent(), 100.0);
    }

    #[test]
    fn transition_cues() {
        assert_eq!(
            Transition::Advanced { from: 0, to: 1 }.cues(),
            &[CueKind::PhaseComplete]
        );
        assert_eq!(
            Transition::Completed { last: 2 }.cues(),
            &[CueKind::PhaseComplete, CueKind::WorkoutComplete]
        );
        assert_eq!(Transition::Completed { last: 2 }.finished_index(), 2);
    }

    #[test]
    fn snapshot_mute_flag_does_not_touch_timing() {
        let mut seq = Sequencer::new(sample_plan());
        seq.start();
        ticks(&mut seq, 4);
        let loud = seq.snapshot(false);
        let quiet = seq.snapshot(true);
        assert!(quiet.muted);
        assert_eq!(loud.time_remaining, quiet.time_remaining);
        assert_eq!(loud.total_elapsed, quiet.total_elapsed);
        assert_eq!(loud.phase_index, quiet.phase_index);
        assert_eq!(loud.overall_progress_percent, quiet.overall_progress_percent);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Start,
        Pause,
        Reset,
        Tick,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            1 => Just(Op::Start),
            1 => Just(Op::Pause),
            1 => Just(Op::Reset),
            8 => Just(Op::Tick),
        ]
    }

    proptest! {
        #[test]
        fn invariants_hold_for_any_command_sequence(
            durations in prop::collection::vec(1u32..6, 1..6),
            ops in prop::collection::vec(op(), 0..200),
        ) {
            let phases = durations
                .iter()
                .enumerate()
                .map(|(i, d)| Phase::new(format!("P{i}"), *d))
                .collect();
            let plan = Arc::new(PhasePlan::new("prop", phases).unwrap());
            let mut seq = Sequencer::new(plan.clone());
            let mut running_ticks = 0u64;

            for op in ops {
                let prev_index = seq.current_index();
                match op {
                    Op::Start => seq.start(),
                    Op::Pause => seq.pause(),
                    Op::Reset => {
                        seq.reset();
                        running_ticks = 0;
                    }
                    Op::Tick => {
                        let was_running = seq.is_running();
                        let was_remaining = seq.time_remaining();
                        let t = seq.tick();
                        if was_running {
                            running_ticks += 1;
                            prop_assert_eq!(seq.total_elapsed(), running_ticks);
                            if was_remaining > 1 {
                                prop_assert_eq!(seq.time_remaining(), was_remaining - 1);
                                prop_assert!(t.is_none());
                            }
                        } else {
                            prop_assert!(t.is_none());
                        }
                        prop_assert!(seq.current_index() >= prev_index);
                        prop_assert!(seq.current_index() <= prev_index + 1);
                    }
                }

                let duration = plan.phase_at(seq.current_index()).unwrap().duration_secs;
                prop_assert!(seq.time_remaining() <= duration);
                prop_assert_eq!(seq.total_elapsed(), running_ticks);
                prop_assert_eq!(seq.time_remaining() == 0, seq.is_complete());
                let overall = seq.overall_progress_percent();
                prop_assert!((0.0..=100.0).contains(&overall));
                prop_assert_eq!(overall == 100.0, seq.is_complete());
            }
        }

        #[test]
        fn uninterrupted_run_completes_after_sum_of_durations(
            durations in prop::collection::vec(1u32..20, 1..8),
        ) {
            let phases = durations.iter().map(|d| Phase::new("P", *d)).collect();
            let plan = Arc::new(PhasePlan::new("prop", phases).unwrap());
            let total = plan.total_duration();
            let mut seq = Sequencer::new(plan);
            seq.reset();
            seq.start();
            for _ in 0..total - 1 {
                seq.tick();
                prop_assert!(!seq.is_complete());
            }
            prop_assert_eq!(seq.tick(), Some(Transition::Completed { last: durations.len() - 1 }));
            prop_assert!(!seq.is_running());
            prop_assert_eq!(seq.total_elapsed(), total);
            prop_assert_eq!(seq.overall_progress_percent(), 100.0);
        }
    }
}
