use crate::engine::cue::{MutableCues, TerminalBell};
use crate::logging::{self, LogTarget};
use crate::model::{InfoEvent, SessionSummary, TimerEvent, TimerSnapshot};
use crate::orchestrator::{run_controller, ControllerOptions, UiCommand};
use crate::plan::PhasePlan;
use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "workout-timer",
    version,
    about = "Guided interval workout timer with optional TUI"
)]
pub struct Cli {
    /// Workout plan file (JSON); defaults to <config dir>/workout-timer/plan.json if present
    #[arg(long)]
    pub plan: Option<PathBuf>,

    /// Print progress lines and a summary, then exit (no TUI)
    #[arg(long, conflicts_with = "json")]
    pub text: bool,

    /// Stream events as newline-delimited JSON, then exit (no TUI)
    #[arg(long)]
    pub json: bool,

    /// Print the workout plan and exit
    #[arg(long)]
    pub list: bool,

    /// Start with sound cues muted
    #[arg(long)]
    pub mute: bool,

    /// Start the timer as soon as the TUI opens
    #[arg(long, default_value_t = false, action = clap::ArgAction::Set)]
    pub start_on_launch: bool,

    /// Length of one timer tick
    #[arg(long, default_value = "1s", hide = true)]
    pub tick: humantime::Duration,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Write logs to this file instead of stderr (the TUI discards them otherwise)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn is_interactive(&self) -> bool {
        !self.text && !self.json && !self.list && cfg!(feature = "tui")
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from(self.tick)
    }
}

pub async fn run(args: Cli) -> Result<()> {
    let log_target = match args.log_file.as_deref() {
        Some(path) => LogTarget::File(path),
        None if args.is_interactive() => LogTarget::Quiet,
        None => LogTarget::Stderr,
    };
    logging::init_logging(args.verbose, log_target)?;

    if args.tick_period().is_zero() {
        return Err(anyhow::anyhow!("--tick must be greater than zero"));
    }

    let (plan, source) =
        PhasePlan::resolve(args.plan.as_deref()).context("failed to load workout plan")?;
    tracing::info!(plan = plan.name(), %source, phases = plan.len(), "plan loaded");
    let loaded = InfoEvent::PlanLoaded {
        name: plan.name().to_string(),
        source: source.to_string(),
    };
    let plan = Arc::new(plan);

    if args.list {
        for line in crate::text_summary::build_plan_listing(&plan).lines {
            println!("{line}");
        }
        return Ok(());
    }

    if args.is_interactive() {
        #[cfg(feature = "tui")]
        {
            return crate::tui::run(args, plan, loaded).await;
        }
    }

    run_headless(args, plan, loaded).await
}

/// Run a whole session without a UI, streaming text or JSON.
async fn run_headless(args: Cli, plan: Arc<PhasePlan>, loaded: InfoEvent) -> Result<()> {
    let (out_tx, out_handle) = spawn_output_writer();
    let (evt_tx, mut evt_rx) = mpsc::unbounded_channel::<TimerEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    let opts = ControllerOptions {
        tick_period: args.tick_period(),
        start_immediately: true,
        exit_on_complete: true,
    };
    let cues = MutableCues::new(TerminalBell::spawn(), args.mute);
    let controller = tokio::spawn(run_controller(plan, cues, opts, evt_tx, cmd_rx));

    // Ctrl-C stops the session early; the summary still gets printed.
    let signal_handle = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = cmd_tx.send(UiCommand::Quit);
        }
    });

    if args.json {
        send_json(&out_tx, &TimerEvent::Info(loaded))?;
    } else {
        let _ = out_tx.send(OutputLine::Stderr(loaded.to_message()));
    }

    let mut last_printed: Option<TimerSnapshot> = None;
    while let Some(ev) = evt_rx.recv().await {
        if args.json {
            send_json(&out_tx, &ev)?;
            continue;
        }
        match ev {
            TimerEvent::State(s) => {
                let unchanged = last_printed.as_ref().is_some_and(|p| {
                    p.phase_index == s.phase_index
                        && p.time_remaining == s.time_remaining
                        && p.status == s.status
                });
                if !unchanged {
                    let _ = out_tx.send(OutputLine::Stderr(crate::text_summary::progress_line(&s)));
                    last_printed = Some(s);
                }
            }
            TimerEvent::PhaseStarted { index, phase } => {
                let _ = out_tx.send(OutputLine::Stderr(format!(
                    "== {}. {} ({}) ==",
                    index + 1,
                    phase.name,
                    crate::model::format_clock(u64::from(phase.duration_secs))
                )));
            }
            TimerEvent::PhaseCompleted { .. }
            | TimerEvent::WorkoutCompleted { .. }
            | TimerEvent::SessionEnded { .. } => {}
            TimerEvent::Info(info) => {
                let _ = out_tx.send(OutputLine::Stderr(info.to_message()));
            }
        }
    }

    let summary: SessionSummary = controller.await.context("timer task failed")?;
    signal_handle.abort();

    if args.json {
        if let Some(ev) = closing_event(&summary) {
            send_json(&out_tx, &ev)?;
        }
    } else {
        for line in crate::text_summary::build_session_summary(&summary).lines {
            let _ = out_tx.send(OutputLine::Stdout(line));
        }
    }

    drop(out_tx);
    let _ = out_handle.await;
    Ok(())
}

/// Last JSON record of a run. A finished session already produced
/// `WorkoutCompleted`; an interrupted one still needs its summary.
fn closing_event(summary: &SessionSummary) -> Option<TimerEvent> {
    (!summary.completed).then(|| TimerEvent::SessionEnded {
        summary: summary.clone(),
    })
}

fn send_json<T: serde::Serialize>(
    out_tx: &mpsc::UnboundedSender<OutputLine>,
    value: &T,
) -> Result<()> {
    let line = serde_json::to_string(value).context("serialize event")?;
    let _ = out_tx.send(OutputLine::Stdout(line));
    Ok(())
}
