use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn key_line(key: &'static str, pad: usize, what: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key, Style::default().fg(Color::Magenta)),
        Span::raw(" ".repeat(pad)),
        Span::raw(what),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("q", Style::default().fg(Color::Magenta)),
            Span::raw(" / "),
            Span::styled("Ctrl-C", Style::default().fg(Color::Magenta)),
            Span::raw("  Quit"),
        ]),
        key_line("space", 7, "Start/Pause"),
        key_line("s", 11, "Start or resume"),
        key_line("p", 11, "Pause"),
        key_line("r", 11, "Reset to the first phase"),
        key_line("m", 11, "Mute/unmute sound cues"),
        key_line("tab", 9, "Switch tabs"),
        key_line("?", 11, "Show this help"),
        key_line("Esc", 9, "Back to the timer"),
        Line::from(""),
        Line::from("Tips:"),
        Line::from("  Keep water close by."),
        Line::from("  Listen to your body and don't overdo it."),
        Line::from("  Breathe deeply and recover during rest phases."),
        Line::from("  The bell marks every phase change, so you can look away."),
        Line::from(""),
        Line::from("Custom plans:"),
        Line::from(vec![
            Span::raw("  "),
            Span::styled("--plan <FILE>", Style::default().fg(Color::Cyan)),
            Span::raw(" or <config dir>/workout-timer/plan.json"),
        ]),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(p, area);
}
