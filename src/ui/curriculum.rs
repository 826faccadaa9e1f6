//! Curriculum tree browser component

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::state::{AppState, CurriculumRow, curriculum_rows};
use crate::theme::Theme;
use crate::tracker::{LessonStatus, SequentialTracker};

/// Status indicators for lessons
const STATUS_LOCKED: &str = "🔒";
const STATUS_AVAILABLE: &str = "○";
const STATUS_CURRENT: &str = "●";
const STATUS_COMPLETED: &str = "✓";

/// Draw the curriculum tree browser
pub fn draw(
    frame: &mut Frame,
    area: Rect,
    state: &mut AppState,
    tracker: &SequentialTracker,
    theme: &Theme,
    focused: bool,
) {
    let border_color = if focused { theme.border_focused } else { theme.border };

    let title = format!(" Curriculum {:.0}% ", tracker.progress_percentage());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(theme.bg_primary));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Update visible height for scroll calculations
    state.curriculum.visible_height = inner.height as usize;

    let course = tracker.course();
    if course.lesson_count() == 0 {
        let msg = Paragraph::new("This course has no lessons yet")
            .style(Style::default().fg(theme.fg_muted))
            .wrap(Wrap { trim: true });
        frame.render_widget(msg, inner);
        return;
    }

    let current = tracker.current_position();
    let mut lines: Vec<Line> = Vec::new();

    for (index, row) in curriculum_rows(course).into_iter().enumerate() {
        let selected = focused && index == state.curriculum.selected_index;

        let (text, style) = match row {
            CurriculumRow::Module(m) => {
                let module = &course.modules[m];
                let marker = module_marker(tracker, &module.id);
                let style = if tracker.is_module_accessible(&module.id) {
                    Style::default().fg(theme.fg_primary).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme.locked)
                };
                (format!("{} {}. {}", marker, m + 1, module.title), style)
            }
            CurriculumRow::Lesson(m, l) => {
                let lesson = &course.modules[m].lessons[l];
                let status = tracker.lesson_status(&lesson.id);
                let is_current = current == Some((m, l));
                let marker = lesson_marker(status, is_current);
                let kind = lesson.effective_kind().map(|k| k.label()).unwrap_or("");

                let style = match status {
                    _ if is_current => Style::default().fg(theme.accent_secondary),
                    LessonStatus::Completed => Style::default().fg(theme.success),
                    LessonStatus::Available => Style::default().fg(theme.fg_secondary),
                    LessonStatus::Locked => Style::default().fg(theme.locked),
                };
                (format!("   {} {}.{} {} {}", marker, m + 1, l + 1, lesson.title, kind), style)
            }
        };

        let style = if selected {
            Style::default().fg(theme.bg_primary).bg(theme.accent_primary).add_modifier(Modifier::BOLD)
        } else {
            style
        };
        lines.push(Line::from(Span::styled(text, style)));
    }

    // Handle scroll offset
    let visible_height = inner.height as usize;
    let start = state.curriculum.scroll_offset.min(lines.len());
    let end = (start + visible_height).min(lines.len());
    let visible_lines: Vec<Line> = lines.into_iter().skip(start).take(end - start).collect();

    frame.render_widget(Paragraph::new(visible_lines), inner);
}

fn module_marker(tracker: &SequentialTracker, module_id: &str) -> &'static str {
    if tracker.is_module_completed(module_id) {
        STATUS_COMPLETED
    } else if tracker.is_module_accessible(module_id) {
        "▼"
    } else {
        STATUS_LOCKED
    }
}

/// Marker for a lesson row
fn lesson_marker(status: LessonStatus, is_current: bool) -> &'static str {
    match status {
        LessonStatus::Completed => STATUS_COMPLETED,
        LessonStatus::Locked => STATUS_LOCKED,
        LessonStatus::Available if is_current => STATUS_CURRENT,
        LessonStatus::Available => STATUS_AVAILABLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_beats_current() {
        assert_eq!(lesson_marker(LessonStatus::Completed, true), STATUS_COMPLETED);
    }

    #[test]
    fn current_available_lesson_is_highlighted() {
        assert_eq!(lesson_marker(LessonStatus::Available, true), STATUS_CURRENT);
        assert_eq!(lesson_marker(LessonStatus::Available, false), STATUS_AVAILABLE);
        assert_eq!(lesson_marker(LessonStatus::Locked, false), STATUS_LOCKED);
    }
}
