//! Audible cues for phase transitions.
//!
//! Emitters are fire-and-forget: nothing here may block the caller or report
//! a failure back to it.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::mpsc as std_mpsc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CueKind {
    PhaseComplete,
    WorkoutComplete,
}

pub trait CueEmitter: Send {
    fn emit(&self, cue: CueKind);
}

/// Rings the terminal bell from a dedicated thread.
///
/// The controller only pushes onto a channel; the thread owns stderr writes
/// and the spacing between repeated bells.
pub struct TerminalBell {
    tx: std_mpsc::Sender<CueKind>,
}

impl TerminalBell {
    pub fn spawn() -> Self {
        let (tx, rx) = std_mpsc::channel::<CueKind>();
        let spawned = std::thread::Builder::new()
            .name("cue-bell".into())
            .spawn(move || {
                while let Ok(cue) = rx.recv() {
                    let rings = match cue {
                        CueKind::PhaseComplete => 1,
                        CueKind::WorkoutComplete => 3,
                    };
                    for i in 0..rings {
                        if i > 0 {
                            std::thread::sleep(Duration::from_millis(250));
                        }
                        let mut err = std::io::stderr();
                        let _ = err.write_all(b"\x07");
                        let _ = err.flush();
                    }
                }
            });
        if let Err(e) = spawned {
            // The sender stays valid; cues just go nowhere.
            tracing::warn!(error = %e, "audio cues unavailable");
        }
        Self { tx }
    }
}

impl CueEmitter for TerminalBell {
    fn emit(&self, cue: CueKind) {
        if self.tx.send(cue).is_err() {
            tracing::debug!(?cue, "cue dropped, bell thread gone");
        }
    }
}

/// Wraps an emitter with a mute switch. Muting only suppresses the sound.
pub struct MutableCues<E> {
    inner: E,
    muted: bool,
}

impl<E: CueEmitter> MutableCues<E> {
    pub fn new(inner: E, muted: bool) -> Self {
        Self { inner, muted }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Flip the mute switch and return the new value.
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }
}

impl<E: CueEmitter> CueEmitter for MutableCues<E> {
    fn emit(&self, cue: CueKind) {
        if self.muted {
            tracing::trace!(?cue, "cue muted");
            return;
        }
        self.inner.emit(cue);
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingCues;
    use super::*;

    #[test]
    fn unmuted_cues_pass_through() {
        let rec = RecordingCues::default();
        let cues = MutableCues::new(rec.clone(), false);
        cues.emit(CueKind::PhaseComplete);
        cues.emit(CueKind::WorkoutComplete);
        assert_eq!(
            rec.taken(),
            vec![CueKind::PhaseComplete, CueKind::WorkoutComplete]
        );
    }

    #[test]
    fn muted_cues_are_dropped() {
        let rec = RecordingCues::default();
        let mut cues = MutableCues::new(rec.clone(), false);
        assert!(cues.toggle_mute());
        cues.emit(CueKind::PhaseComplete);
        assert!(rec.taken().is_empty());

        assert!(!cues.toggle_mute());
        cues.emit(CueKind::PhaseComplete);
        assert_eq!(rec.taken(), vec![CueKind::PhaseComplete]);
    }

    #[test]
    fn starts_muted_when_asked() {
        let rec = RecordingCues::default();
        let cues = MutableCues::new(rec.clone(), true);
        assert!(cues.is_muted());
        cues.emit(CueKind::WorkoutComplete);
        assert!(rec.taken().is_empty());
    }

    #[test]
    fn bell_emit_never_blocks_or_panics() {
        let bell = TerminalBell::spawn();
        for _ in 0..3 {
            bell.emit(CueKind::PhaseComplete);
        }
    }
}
