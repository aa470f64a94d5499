//! Application-level orchestration utilities.
//!
//! This module owns the session lifecycle (start/pause/reset/mute), the tick
//! source that drives the sequencer, and post-run summaries. UI/CLI layers
//! call into this module and only ever see events and snapshots.

mod controller;
mod post_process;
mod ticker;

pub(crate) use controller::{run_controller, ControllerOptions, UiCommand};
