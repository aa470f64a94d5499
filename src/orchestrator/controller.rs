//! Session lifecycle controller.
//!
//! Owns the sequencer, drives it from the tick source, plays cues, and emits
//! events for presentation layers. Commands and ticks are handled by the same
//! loop, so they never interleave.

use super::post_process::summarize;
use super::ticker::TickSource;
use crate::engine::cue::{CueEmitter, MutableCues};
use crate::engine::{Sequencer, Transition};
use crate::model::{InfoEvent, SessionSummary, TimerEvent, TimerStatus};
use crate::plan::PhasePlan;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::time::Duration;

/// Commands emitted by UI layers to control the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UiCommand {
    Start,
    Pause,
    /// Start when stopped, pause when running.
    Toggle,
    Reset,
    ToggleMute,
    Quit,
}

#[derive(Debug, Clone)]
pub(crate) struct ControllerOptions {
    pub tick_period: Duration,
    pub start_immediately: bool,
    /// Return as soon as the last phase finishes instead of waiting for `Quit`.
    pub exit_on_complete: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_secs(1),
            start_immediately: false,
            exit_on_complete: false,
        }
    }
}

struct Session<E> {
    seq: Sequencer,
    cues: MutableCues<E>,
    event_tx: UnboundedSender<TimerEvent>,
}

impl<E: CueEmitter> Session<E> {
    fn publish_state(&self) {
        let _ = self
            .event_tx
            .send(TimerEvent::State(self.seq.snapshot(self.cues.is_muted())));
    }

    fn info(&self, info: InfoEvent) {
        let _ = self.event_tx.send(TimerEvent::Info(info));
    }

    fn apply(&mut self, cmd: UiCommand) {
        tracing::debug!(?cmd, status = ?self.seq.status(), "command");
        match cmd {
            UiCommand::Start => self.start(),
            UiCommand::Pause => self.seq.pause(),
            UiCommand::Toggle => {
                if self.seq.is_running() {
                    self.seq.pause();
                } else {
                    self.start();
                }
            }
            UiCommand::Reset => {
                self.seq.reset();
                self.info(InfoEvent::Message("Reset".into()));
            }
            UiCommand::ToggleMute => {
                let muted = self.cues.toggle_mute();
                self.info(InfoEvent::MuteChanged(muted));
            }
            UiCommand::Quit => {}
        }
    }

    fn start(&mut self) {
        match self.seq.status() {
            TimerStatus::Complete => {
                self.info(InfoEvent::Message(
                    "Workout complete. Reset to go again.".into(),
                ));
            }
            TimerStatus::Idle => {
                self.seq.start();
                let phase = self.seq.current_phase().clone();
                tracing::info!(phase = %phase.name, "workout started");
                let _ = self.event_tx.send(TimerEvent::PhaseStarted { index: 0, phase });
            }
            TimerStatus::Running | TimerStatus::Paused => self.seq.start(),
        }
    }

    fn tick(&mut self) -> Option<SessionSummary> {
        let transition = self.seq.tick()?;
        for cue in transition.cues() {
            self.cues.emit(*cue);
        }

        let plan = self.seq.plan().clone();
        let finished = transition.finished_index();
        if let Some(phase) = plan.phase_at(finished) {
            let _ = self.event_tx.send(TimerEvent::PhaseCompleted {
                index: finished,
                phase: phase.clone(),
            });
        }

        match transition {
            Transition::Advanced { from, to } => {
                let phase = self.seq.current_phase().clone();
                tracing::info!(
                    from,
                    to,
                    phase = %phase.name,
                    secs = phase.duration_secs,
                    "phase started"
                );
                let _ = self
                    .event_tx
                    .send(TimerEvent::PhaseStarted { index: to, phase });
                None
            }
            Transition::Completed { .. } => {
                let summary = summarize(&self.seq);
                tracing::info!(elapsed = summary.total_elapsed_secs, "workout complete");
                let _ = self.event_tx.send(TimerEvent::WorkoutCompleted {
                    summary: summary.clone(),
                });
                Some(summary)
            }
        }
    }
}

/// Run a session until `Quit` (or, with `exit_on_complete`, until it finishes).
///
/// Publishes a `State` snapshot after every command and every tick. Returns the
/// summary of the session as it stood when the loop ended.
pub(crate) async fn run_controller<E: CueEmitter>(
    plan: Arc<PhasePlan>,
    cues: MutableCues<E>,
    opts: ControllerOptions,
    event_tx: UnboundedSender<TimerEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> SessionSummary {
    let mut session = Session {
        seq: Sequencer::new(plan),
        cues,
        event_tx,
    };
    let mut ticker = TickSource::new(opts.tick_period);

    if opts.start_immediately {
        session.apply(UiCommand::Start);
    }
    ticker.sync(session.seq.is_running());
    session.publish_state();

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UiCommand::Quit) | None => break,
                    Some(cmd) => session.apply(cmd),
                }
            }
            _ = ticker.next() => {
                let done = session.tick();
                tracing::trace!(
                    remaining = session.seq.time_remaining(),
                    elapsed = session.seq.total_elapsed(),
                    "tick"
                );
                if done.is_some() && opts.exit_on_complete {
                    session.publish_state();
                    break;
                }
            }
        }

        // Disarm before the next select so a pause or completion can never be
        // followed by another tick.
        ticker.sync(session.seq.is_running());
        tracing::trace!(armed = ticker.is_armed(), "tick source synced");
        session.publish_state();
    }

    summarize(&session.seq)
}
