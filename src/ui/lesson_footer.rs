//! Lesson footer with the Complete & Next button

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::course::LessonType;
use crate::theme::Theme;
use crate::tracker::SequentialTracker;

/// Height of the lesson footer in lines
pub const FOOTER_HEIGHT: u16 = 3;

const BUTTON_LABEL: &str = " Complete & Next \u{2192} ";

/// Whether the Complete & Next button accepts presses
pub fn button_enabled(tracker: &SequentialTracker) -> bool {
    let Some(lesson) = tracker.current_lesson() else {
        return false;
    };
    tracker.is_lesson_completed(&lesson.id) || tracker.is_current_content_completed()
}

/// Draw the lesson footer
pub fn draw(frame: &mut Frame, area: Rect, tracker: &SequentialTracker, theme: &Theme) {
    if area.height < FOOTER_HEIGHT || area.width < 30 {
        return;
    }

    // Draw separator line above the button
    let separator = Line::from(vec![Span::styled(
        "\u{2500}".repeat(area.width as usize), // ─ horizontal line
        Style::default().fg(theme.border),
    )]);
    frame.render_widget(Paragraph::new(separator), Rect::new(area.x, area.y, area.width, 1));

    let enabled = button_enabled(tracker);
    let button = create_button(BUTTON_LABEL, enabled, theme);
    let button_width = BUTTON_LABEL.chars().count() as u16;
    let start_x = area.x + area.width.saturating_sub(button_width) / 2;
    frame.render_widget(
        Paragraph::new(button),
        Rect::new(start_x, area.y + 1, button_width.min(area.width), 1),
    );

    let status = status_text(tracker);
    let hint = if enabled {
        Line::from(vec![
            Span::styled("[m]", Style::default().fg(theme.fg_muted)),
            Span::styled(format!(" continue  {}", status), Style::default().fg(theme.success)),
        ])
    } else {
        Line::from(Span::styled(status, Style::default().fg(theme.fg_secondary)))
    };
    frame.render_widget(Paragraph::new(hint), Rect::new(area.x, area.y + 2, area.width, 1));
}

/// Create a styled button
fn create_button<'a>(text: &'a str, enabled: bool, theme: &Theme) -> Line<'a> {
    let style = if enabled {
        Style::default().fg(theme.bg_primary).bg(theme.accent_primary).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.fg_muted).bg(theme.bg_tertiary)
    };

    Line::from(vec![Span::styled(text, style)])
}

/// Short description of what the current lesson still needs
fn status_text(tracker: &SequentialTracker) -> String {
    let Some(lesson) = tracker.current_lesson() else {
        return String::new();
    };
    if tracker.is_lesson_completed(&lesson.id) {
        return "Lesson completed".to_string();
    }

    let state = tracker.completion_state();
    let t = tracker.thresholds();
    match tracker.current_kind() {
        Some(LessonType::Video) => format!(
            "Watched {:.0}% of {:.0}% needed",
            state.video_progress,
            t.video_watch_ratio * 100.0
        ),
        Some(LessonType::Text) => {
            format!("Read {:.0}% of {:.0}% needed", state.scroll_progress, t.text_scroll_percent)
        }
        Some(LessonType::File) => format!(
            "Viewed {}s of {}s needed",
            state.file_view_seconds.min(t.file_view_seconds),
            t.file_view_seconds
        ),
        Some(LessonType::Quiz) if state.quiz_passed => "Quiz passed".to_string(),
        Some(LessonType::Quiz) if state.quiz_completed => {
            "No quiz attempts left, lesson stays locked".to_string()
        }
        Some(LessonType::Quiz) => {
            format!("Quiz attempts {}/{}", state.quiz_attempts, t.max_quiz_attempts)
        }
        None => "Ready".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::api::models::{
        CourseCompletion, CourseProgress, LessonCompletion, ModuleCompletion,
    };
    use crate::api::progress::ProgressApi;
    use crate::config::CompletionThresholds;
    use crate::course::{Course, Lesson, Module};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Offline;

    #[async_trait]
    impl ProgressApi for Offline {
        async fn get_course_progress(&self, _: &str) -> Result<CourseProgress, ApiError> {
            Ok(CourseProgress::default())
        }
        async fn record_lesson_completion(&self, _: &LessonCompletion) -> Result<(), ApiError> {
            Ok(())
        }
        async fn record_module_completion(&self, _: &ModuleCompletion) -> Result<(), ApiError> {
            Ok(())
        }
        async fn record_course_completion(&self, _: &CourseCompletion) -> Result<(), ApiError> {
            Ok(())
        }
    }

    fn tracker() -> SequentialTracker {
        let mut course = Course::new("c", "C");
        course.modules.push(
            Module::new("m", "M", 1).with_lesson(Lesson::new("v", "Video", 1).with_kind(LessonType::Video)),
        );
        SequentialTracker::new(course, Arc::new(Offline), CompletionThresholds::default())
    }

    #[test]
    fn button_waits_for_content() {
        let mut tracker = tracker();
        assert!(!button_enabled(&tracker));
        assert_eq!(status_text(&tracker), "Watched 0% of 95% needed");

        tracker.update_video_progress(100.0, 100.0);
        assert!(button_enabled(&tracker));
    }
}
