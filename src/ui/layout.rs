//! Layout utilities and common components

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::theme::Theme;

/// Key bindings and commands shown on the help screen
const HELP: &[(&str, &str)] = &[
    ("j/k, arrows", "move / scroll"),
    ("h/l, left/right", "previous / next lesson"),
    ("Enter", "open lesson, mark notification read"),
    ("Tab", "switch panel"),
    ("[ / ]", "toggle curriculum / notifications"),
    ("m", "Complete & Next"),
    (":watch <s>[/<len>]", "report video playback"),
    (":scroll <percent>", "report reading progress"),
    (":view <s>", "add file viewing time"),
    (":quiz 2 1 4 | 8/10", "answer the quiz or report a score"),
    (":complete", "Complete & Next"),
    (":next :prev :goto 2.3", "navigate"),
    (":read", "mark all notifications read"),
    (":q", "quit"),
];

/// Draw a bordered, centered message screen
pub fn draw_message(frame: &mut Frame, title: &str, lines: Vec<Line>, theme: &Theme) {
    let area = frame.area();

    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focused))
        .style(Style::default().bg(theme.bg_primary));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let top = inner.height.saturating_sub(lines.len() as u16) / 2;
    let body = Rect { y: inner.y + top, height: inner.height - top, ..inner };
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), body);
}

/// Draw the help screen
pub fn draw_help(frame: &mut Frame, theme: &Theme) {
    let width = HELP.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    let mut lines: Vec<Line> = HELP
        .iter()
        .map(|(keys, what)| {
            Line::from(vec![
                Span::styled(format!("{:>width$}  ", keys, width = width), Style::default().fg(theme.accent_primary)),
                Span::styled(format!("{:<36}", what), Style::default().fg(theme.fg_secondary)),
            ])
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Esc or ? to return",
        Style::default().fg(theme.fg_muted).add_modifier(Modifier::ITALIC),
    )));

    draw_message(frame, "Help", lines, theme);
}
