//! Notifications panel component

use chrono::{DateTime, Utc};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use textwrap::{Options, wrap};

use crate::app::state::AppState;
use crate::notifications::Notification;
use crate::theme::Theme;

/// Draw the notifications panel
pub fn draw(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme, focused: bool) {
    let border_color = if focused { theme.border_focused } else { theme.border };

    let feed = &state.notifications;
    let title = if feed.unread > 0 {
        format!(" Notifications ({}) ", feed.unread)
    } else {
        " Notifications ".to_string()
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(theme.bg_primary));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if feed.items.is_empty() {
        let msg = Paragraph::new("No notifications")
            .style(Style::default().fg(theme.fg_muted))
            .wrap(Wrap { trim: true });
        frame.render_widget(msg, inner);
        return;
    }

    let width = inner.width as usize;
    let now = Utc::now();
    let mut lines: Vec<Line> = Vec::new();
    let mut selected_top = 0;

    for (index, notification) in feed.items.iter().enumerate() {
        let is_selected = focused && index == state.notification_panel.selected_index;
        if is_selected {
            selected_top = lines.len();
        }
        add_notification_lines(&mut lines, notification, is_selected, theme, width, now);
    }

    // Keep the selected entry on screen
    let visible_height = inner.height as usize;
    let start = selected_top.saturating_sub(visible_height / 2).min(lines.len());
    let visible_lines: Vec<Line> = lines.into_iter().skip(start).take(visible_height).collect();

    frame.render_widget(Paragraph::new(visible_lines), inner);
}

/// Add lines for a single notification
fn add_notification_lines(
    lines: &mut Vec<Line>,
    notification: &Notification,
    is_selected: bool,
    theme: &Theme,
    width: usize,
    now: DateTime<Utc>,
) {
    let base_style = if is_selected {
        Style::default().fg(theme.bg_primary).bg(theme.accent_primary)
    } else if notification.read {
        Style::default().fg(theme.fg_secondary)
    } else {
        Style::default().fg(theme.fg_primary).add_modifier(Modifier::BOLD)
    };

    let muted_style = if is_selected {
        Style::default().fg(theme.bg_primary).bg(theme.accent_primary)
    } else {
        Style::default().fg(theme.fg_muted)
    };

    let marker_style = if is_selected { base_style } else { Style::default().fg(theme.unread) };
    let marker = if notification.read { " " } else { "•" };
    lines.push(Line::from(vec![
        Span::styled(format!("{} ", marker), marker_style),
        Span::styled(truncate_str(&notification.title, width.saturating_sub(2)), base_style),
    ]));

    if !notification.message.is_empty() && width > 4 {
        for text in wrap(&notification.message, Options::new(width - 2)) {
            lines.push(Line::from(Span::styled(format!("  {}", text), muted_style)));
        }
    }

    if let Some(created_at) = notification.created_at {
        lines.push(Line::from(Span::styled(
            format!("  {}", format_age(created_at, now)),
            muted_style,
        )));
    }

    lines.push(Line::from(""));
}

/// Truncate a string to a maximum number of characters with ellipsis
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        "...".to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

/// Relative age, falling back to the date after a week
fn format_age(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - created_at).num_seconds().max(0);

    if secs < 60 {
        "just now".to_string()
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else if secs < 86400 {
        format!("{}h ago", secs / 3600)
    } else if secs < 604800 {
        format!("{}d ago", secs / 86400)
    } else {
        created_at.format("%Y-%m-%d").to_string()
    }
}
