//! Lesson panel: content of the active lesson and its completion state

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use textwrap::{Options, wrap};

use super::lesson_footer::{self, FOOTER_HEIGHT};
use crate::app::state::AppState;
use crate::config::CompletionThresholds;
use crate::course::{Lesson, LessonType};
use crate::theme::Theme;
use crate::tracker::{ContentCompletionState, SequentialTracker};

/// Draw the lesson panel
pub fn draw(
    frame: &mut Frame,
    area: Rect,
    state: &mut AppState,
    tracker: &SequentialTracker,
    theme: &Theme,
    focused: bool,
) {
    let border_color = if focused { theme.border_focused } else { theme.border };

    let lesson = tracker.current_lesson();
    let title = lesson.map(|l| format!(" {} ", l.title)).unwrap_or_else(|| " Lesson ".to_string());

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(theme.bg_primary));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(lesson) = lesson else {
        let msg = Paragraph::new("Nothing to study in this course yet")
            .style(Style::default().fg(theme.fg_muted));
        frame.render_widget(msg, inner);
        return;
    };

    // Body above, footer below
    let footer_height = FOOTER_HEIGHT.min(inner.height);
    let body_height = inner.height - footer_height;
    let body = Rect { height: body_height, ..inner };
    let footer = Rect { y: inner.y + body_height, height: footer_height, ..inner };

    // Reserve 1 column for scrollbar
    let content_width = inner.width.saturating_sub(2) as usize;
    let content_area = Rect { width: body.width.saturating_sub(1), ..body };
    let scrollbar_x = body.x + body.width.saturating_sub(1);

    let lines = lesson_lines(
        lesson,
        tracker.completion_state(),
        tracker.thresholds(),
        theme,
        content_width,
    );
    let total_lines = lines.len();
    let visible_height = body.height as usize;

    // Update state with content metrics for scroll clamping
    state.content.total_lines = total_lines;
    state.content.visible_height = visible_height;

    state.content.clamp_scroll();
    let scroll_offset = state.content.scroll_offset;
    let end = (scroll_offset + visible_height).min(total_lines);
    let visible_lines: Vec<Line> =
        lines.into_iter().skip(scroll_offset).take(end - scroll_offset).collect();

    frame.render_widget(Paragraph::new(visible_lines), content_area);
    draw_scrollbar(frame, scrollbar_x, body.y, body.height, scroll_offset, total_lines, theme);

    lesson_footer::draw(frame, footer, tracker, theme);
}

/// Render the lesson body for the given width
pub fn lesson_lines(
    lesson: &Lesson,
    completion: &ContentCompletionState,
    thresholds: &CompletionThresholds,
    theme: &Theme,
    width: usize,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let kind = lesson.effective_kind();
    let muted = Style::default().fg(theme.fg_muted);
    let label = Style::default().fg(theme.accent_primary).add_modifier(Modifier::BOLD);

    let mut header = vec![Span::styled(
        kind.map(|k| k.label()).unwrap_or("Lesson").to_string(),
        label,
    )];
    if lesson.duration_seconds > 0 {
        header.push(Span::styled(format!("  {}", format_duration(lesson.duration_seconds)), muted));
    }
    if lesson.points > 0 {
        header.push(Span::styled(format!("  {} pts", lesson.points), muted));
    }
    lines.push(Line::from(header));
    lines.push(Line::from(""));

    let content = &lesson.content;
    match kind {
        Some(LessonType::Video) => {
            let url = content.video_url.clone().unwrap_or_default();
            lines.push(Line::from(vec![Span::styled("Video: ", muted), Span::raw(url)]));
            lines.push(Line::from(""));
            lines.push(progress_line(
                "Watched",
                completion.video_progress,
                thresholds.video_watch_ratio * 100.0,
                width,
                theme,
            ));
        }
        Some(LessonType::File) => {
            let url = content.file_url.clone().unwrap_or_default();
            lines.push(Line::from(vec![Span::styled("File: ", muted), Span::raw(url)]));
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!(
                    "Viewed for {}s of {}s",
                    completion.file_view_seconds.min(thresholds.file_view_seconds),
                    thresholds.file_view_seconds
                ),
                muted,
            )));
        }
        Some(LessonType::Quiz) => {
            if let Some(quiz) = &content.quiz {
                for (i, question) in quiz.questions.iter().enumerate() {
                    for text in wrap_text(&format!("{}. {}", i + 1, question.prompt), width) {
                        lines.push(Line::from(Span::styled(
                            text,
                            Style::default().fg(theme.fg_primary).add_modifier(Modifier::BOLD),
                        )));
                    }
                    for (j, option) in question.options.iter().enumerate() {
                        for text in wrap_text(&format!("   {}) {}", j + 1, option), width) {
                            lines.push(Line::from(Span::styled(text, Style::default().fg(theme.fg_secondary))));
                        }
                    }
                    lines.push(Line::from(""));
                }
                let passing = quiz.passing_score.map(f64::from).unwrap_or(thresholds.default_quiz_passing_score);
                lines.push(Line::from(Span::styled(
                    format!(
                        "Pass mark {:.0}%, attempt {} of {}",
                        passing,
                        completion.quiz_attempts,
                        thresholds.max_quiz_attempts
                    ),
                    muted,
                )));
                if let Some(score) = completion.quiz_score {
                    let style = if completion.quiz_passed {
                        Style::default().fg(theme.success)
                    } else {
                        Style::default().fg(theme.error)
                    };
                    lines.push(Line::from(Span::styled(format!("Last score {:.0}%", score), style)));
                }
            }
        }
        Some(LessonType::Text) => {
            let text = content.text.clone().unwrap_or_default();
            for paragraph in text.lines() {
                if paragraph.trim().is_empty() {
                    lines.push(Line::from(""));
                    continue;
                }
                for line in wrap_text(paragraph, width) {
                    lines.push(Line::from(Span::styled(line, Style::default().fg(theme.fg_primary))));
                }
            }
        }
        None => {
            lines.push(Line::from(Span::styled("This lesson has no content", muted)));
        }
    }

    lines
}

fn progress_line(
    label: &str,
    percent: f64,
    target: f64,
    width: usize,
    theme: &Theme,
) -> Line<'static> {
    let bar_width = width.saturating_sub(label.len() + 8).clamp(4, 40);
    let filled = ((percent / 100.0) * bar_width as f64).round() as usize;
    let style = if percent >= target {
        Style::default().fg(theme.success)
    } else {
        Style::default().fg(theme.warning)
    };

    Line::from(vec![
        Span::styled(format!("{} ", label), Style::default().fg(theme.fg_muted)),
        Span::styled("█".repeat(filled.min(bar_width)), style),
        Span::styled("░".repeat(bar_width - filled.min(bar_width)), Style::default().fg(theme.bg_tertiary)),
        Span::styled(format!(" {:.0}%", percent), style),
    ])
}

fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width < 2 {
        return vec![text.to_string()];
    }
    wrap(text, Options::new(width)).into_iter().map(|s| s.into_owned()).collect()
}

/// `m:ss` or `h:mm:ss`
fn format_duration(seconds: u32) -> String {
    let (h, m, s) = (seconds / 3600, (seconds % 3600) / 60, seconds % 60);
    if h > 0 { format!("{}:{:02}:{:02}", h, m, s) } else { format!("{}:{:02}", m, s) }
}

/// Draw a scrollbar indicator
fn draw_scrollbar(
    frame: &mut Frame,
    x: u16,
    y: u16,
    height: u16,
    scroll_offset: usize,
    total_lines: usize,
    theme: &Theme,
) {
    let height = height as usize;
    if total_lines <= height || height == 0 {
        return;
    }

    // Calculate thumb size and position
    let thumb_height = ((height * height) as f64 / total_lines as f64).ceil().max(1.0) as usize;
    let max_scroll = total_lines.saturating_sub(height / 2).max(1);
    let scroll_ratio = (scroll_offset as f64 / max_scroll as f64).min(1.0);
    let thumb_top = ((height - thumb_height) as f64 * scroll_ratio).round() as usize;

    for i in 0..height {
        let on_thumb = i >= thumb_top && i < thumb_top + thumb_height;
        let (ch, style) = if on_thumb {
            ("█", Style::default().fg(theme.accent_secondary))
        } else {
            ("░", Style::default().fg(theme.bg_tertiary))
        };

        frame.render_widget(
            Paragraph::new(ch).style(style),
            Rect { x, y: y.saturating_add(i as u16), width: 1, height: 1 },
        );
    }
}
