mod help;
mod state;

use crate::cli::Cli;
use crate::engine::cue::{MutableCues, TerminalBell};
use crate::model::{format_clock, InfoEvent, PhaseStatus, TimerEvent, TimerStatus};
use crate::orchestrator::{self, ControllerOptions, UiCommand};
use crate::plan::PhasePlan;
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Tabs},
    Terminal,
};
use state::{apply_event, UiState, TAB_COUNT, TAB_HELP, TAB_TIMER};
use std::sync::Arc;
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub async fn run(args: Cli, plan: Arc<PhasePlan>, loaded: InfoEvent) -> Result<()> {
    // Unbounded channels keep the controller from ever waiting on the UI.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<TimerEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    let ui_plan = plan.clone();
    let ui_handle =
        std::thread::spawn(move || run_threaded(ui_plan, loaded.to_message(), event_rx, cmd_tx));

    let opts = ControllerOptions {
        tick_period: args.tick_period(),
        start_immediately: args.start_on_launch,
        exit_on_complete: false,
    };
    let cues = MutableCues::new(TerminalBell::spawn(), args.mute);
    let summary = orchestrator::run_controller(plan, cues, opts, event_tx, cmd_rx).await;
    tracing::info!(
        completed = summary.completed,
        elapsed = summary.total_elapsed_secs,
        "session closed"
    );

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    Ok(())
}

/// Run the TUI loop on a dedicated thread.
fn run_threaded(
    plan: Arc<PhasePlan>,
    info: String,
    mut event_rx: UnboundedReceiver<TimerEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    // UiState is owned by the UI thread only; no cross-thread mutation.
    let mut state = UiState::new(plan, info);

    let frame_rate = Duration::from_millis(100);
    let mut last_frame = Instant::now() - frame_rate;

    let res = loop {
        // Drain events without blocking to keep the UI responsive.
        while let Ok(ev) = event_rx.try_recv() {
            apply_event(&mut state, ev);
        }

        if last_frame.elapsed() >= frame_rate {
            terminal.draw(|f| draw(f.area(), f, &state)).ok();
            last_frame = Instant::now();
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                match (k.modifiers, k.code) {
                    (_, KeyCode::Char('q')) | (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
                        let _ = cmd_tx.send(UiCommand::Quit);
                        break Ok(());
                    }
                    (_, KeyCode::Char(' ')) => {
                        let _ = cmd_tx.send(UiCommand::Toggle);
                    }
                    (_, KeyCode::Char('s')) => {
                        let _ = cmd_tx.send(UiCommand::Start);
                    }
                    (_, KeyCode::Char('p')) => {
                        let _ = cmd_tx.send(UiCommand::Pause);
                    }
                    (_, KeyCode::Char('r')) => {
                        let _ = cmd_tx.send(UiCommand::Reset);
                    }
                    (_, KeyCode::Char('m')) => {
                        let _ = cmd_tx.send(UiCommand::ToggleMute);
                    }
                    (_, KeyCode::Tab) => {
                        state.tab = (state.tab + 1) % TAB_COUNT;
                    }
                    (_, KeyCode::Char('?')) => {
                        state.tab = TAB_HELP;
                    }
                    (_, KeyCode::Esc) => {
                        state.tab = TAB_TIMER;
                    }
                    _ => {}
                }
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(area);

    let tabs = Tabs::new(vec![Line::from("Timer"), Line::from("Help")])
        .select(state.tab)
        .block(Block::default().borders(Borders::ALL).title("workout-timer"))
        .highlight_style(Style::default().fg(Color::Yellow));
    f.render_widget(tabs, chunks[0]);

    match state.tab {
        TAB_TIMER => draw_dashboard(chunks[1], f, state),
        _ => help::draw_help(chunks[1], f),
    }
}

fn draw_dashboard(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    // Narrow terminal: timer only. Wide terminal: timer plus the plan list.
    let (timer_area, plan_area) = if area.width < 72 {
        (area, None)
    } else {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)].as_ref())
            .split(area);
        (cols[0], Some(cols[1]))
    };

    draw_timer(timer_area, f, state);
    if let Some(plan_area) = plan_area {
        draw_plan(plan_area, f, state);
    }
}

fn draw_timer(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(5), // Phase name + clock
                Constraint::Length(3), // Phase progress
                Constraint::Length(3), // Overall progress
                Constraint::Min(0),    // Session details
                Constraint::Length(4), // Status row
            ]
            .as_ref(),
        )
        .split(area);

    let accent = state.accent();
    let plan = &state.plan;
    let (name, remaining, phase_pct, overall_pct) = match state.snapshot.as_ref() {
        Some(s) => (
            s.phase.name.clone(),
            u64::from(s.time_remaining),
            s.phase_progress_percent,
            s.overall_progress_percent,
        ),
        None => {
            let first = &plan.phases()[0];
            (first.name.clone(), u64::from(first.duration_secs), 0.0, 0.0)
        }
    };

    let clock = Paragraph::new(vec![
        Line::from(Span::styled(
            name,
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format_clock(remaining),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        )),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).title("Current phase"));
    f.render_widget(clock, rows[0]);

    f.render_widget(progress_gauge("Phase", phase_pct, accent), rows[1]);
    f.render_widget(progress_gauge("Workout", overall_pct, Color::Green), rows[2]);

    let (index, count, status, muted, elapsed) = match state.snapshot.as_ref() {
        Some(s) => (s.phase_index, s.phase_count, s.status, s.muted, s.total_elapsed),
        None => (0, plan.len(), TimerStatus::Idle, false, 0),
    };
    let status_color = match status {
        TimerStatus::Running => Color::Green,
        TimerStatus::Paused => Color::Yellow,
        TimerStatus::Complete => Color::Magenta,
        TimerStatus::Idle => Color::Gray,
    };
    let mut details = vec![
        Line::from(vec![
            Span::styled("Phase: ", Style::default().fg(Color::Gray)),
            Span::raw(format!("{} of {}", index + 1, count)),
        ]),
        Line::from(vec![
            Span::styled("Status: ", Style::default().fg(Color::Gray)),
            Span::styled(status.label(), Style::default().fg(status_color)),
        ]),
        Line::from(vec![
            Span::styled("Sound: ", Style::default().fg(Color::Gray)),
            Span::raw(if muted { "off" } else { "on" }),
        ]),
        Line::from(vec![
            Span::styled("Time spent: ", Style::default().fg(Color::Gray)),
            Span::raw(format_clock(elapsed)),
            Span::styled(
                format!(" / {}", format_clock(plan.total_duration())),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
    ];
    if let Some(summary) = state.last_summary.as_ref() {
        details.push(Line::from(""));
        details.push(Line::from(Span::styled(
            format!(
                "Done: {} phases in {}",
                summary.phases_completed,
                format_clock(summary.total_elapsed_secs)
            ),
            Style::default().fg(Color::Magenta),
        )));
    }
    let details = Paragraph::new(details).block(
        Block::default()
            .borders(Borders::ALL)
            .title(plan.name().to_string()),
    );
    f.render_widget(details, rows[3]);

    let toggle_hint = if state.is_running() { "pause" } else { "start" };
    let status_row = Paragraph::new(vec![
        Line::from(state.info.clone()),
        Line::from(vec![
            Span::styled("space", Style::default().fg(Color::Magenta)),
            Span::raw(format!(" {toggle_hint}  ")),
            Span::styled("r", Style::default().fg(Color::Magenta)),
            Span::raw(" reset  "),
            Span::styled("m", Style::default().fg(Color::Magenta)),
            Span::raw(" mute  "),
            Span::styled("?", Style::default().fg(Color::Magenta)),
            Span::raw(" help  "),
            Span::styled("q", Style::default().fg(Color::Magenta)),
            Span::raw(" quit"),
        ]),
    ])
    .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(status_row, rows[4]);
}

fn progress_gauge(title: &'static str, percent: f64, color: Color) -> Gauge<'static> {
    Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .gauge_style(Style::default().fg(color).bg(Color::Black))
        .ratio((percent / 100.0).clamp(0.0, 1.0))
        .label(format!("{percent:.0}%"))
}

fn draw_plan(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let accent = state.accent();
    let items: Vec<ListItem> = state
        .plan
        .phases()
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let row = state.row_status(i);
            let marker = match row {
                PhaseStatus::Done => " ✓".to_string(),
                _ => format!("{:>2}", i + 1),
            };
            let style = match row {
                PhaseStatus::Done => Style::default().fg(Color::DarkGray),
                PhaseStatus::Current => Style::default().fg(accent).add_modifier(Modifier::BOLD),
                PhaseStatus::Upcoming => Style::default(),
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{marker}  "), style),
                Span::styled(p.name.clone(), style),
                Span::styled(
                    format!("  {}", format_clock(u64::from(p.duration_secs))),
                    Style::default().fg(Color::Gray),
                ),
            ]))
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Plan"));
    f.render_widget(list, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Sequencer;
    use crate::plan::Phase;
    use ratatui::backend::TestBackend;

    fn render(state: &UiState, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw(f.area(), f, state)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn plan() -> Arc<PhasePlan> {
        Arc::new(
            PhasePlan::new(
                "Quick set",
                vec![Phase::new("Warm-up", 60), Phase::new("Lunges", 45), Phase::new("Rest", 15)],
            )
            .unwrap(),
        )
    }

    #[test]
    fn dashboard_before_first_snapshot() {
        let state = UiState::new(plan(), "Loaded".into());
        let screen = render(&state, 100, 30);
        assert!(screen.contains("Warm-up"));
        assert!(screen.contains("01:00"));
        assert!(screen.contains("Ready"));
        assert!(screen.contains("Lunges"));
    }

    #[test]
    fn dashboard_shows_live_snapshot() {
        let plan = plan();
        let mut seq = Sequencer::new(plan.clone());
        seq.start();
        for _ in 0..61 {
            seq.tick();
        }
        let mut state = UiState::new(plan, String::new());
        apply_event(&mut state, TimerEvent::State(seq.snapshot(true)));

        let screen = render(&state, 100, 30);
        assert!(screen.contains("00:44"));
        assert!(screen.contains("2 of 3"));
        assert!(screen.contains("Running"));
        assert!(screen.contains("Sound: off"));
        assert!(screen.contains("✓"));
    }

    #[test]
    fn narrow_terminal_hides_plan_list() {
        let state = UiState::new(plan(), String::new());
        let screen = render(&state, 60, 30);
        assert!(!screen.contains("Lunges"));
    }

    #[test]
    fn help_tab_renders() {
        let mut state = UiState::new(plan(), String::new());
        state.tab = TAB_HELP;
        let screen = render(&state, 100, 30);
        assert!(screen.contains("Keybinds"));
        assert!(screen.contains("Mute/unmute"));
        assert!(screen.contains("Esc"));
        assert!(screen.contains("Back to the timer"));
    }
}
