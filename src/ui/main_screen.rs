//! Study screen with three-panel layout

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
};

use super::{command_line, curriculum, lesson, notifications_panel};
use crate::app::state::{AppState, Panel};
use crate::theme::Theme;
use crate::tracker::SequentialTracker;

/// Minimum width for the curriculum panel
const CURRICULUM_MIN_WIDTH: u16 = 24;

/// Draw the study screen
pub fn draw(frame: &mut Frame, state: &mut AppState, tracker: &SequentialTracker, theme: &Theme) {
    let area = frame.area();

    // Split vertically: main area and command line
    let vertical_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let main_area = vertical_chunks[0];
    let command_area = vertical_chunks[1];

    // Calculate panel layout for main area
    let chunks = create_layout(main_area, state);

    // Draw each visible panel
    let mut panel_index = 0;

    if state.panel_visibility.curriculum {
        let focused = state.focused_panel == Panel::Curriculum;
        curriculum::draw(frame, chunks[panel_index], state, tracker, theme, focused);
        panel_index += 1;
    }

    let focused = state.focused_panel == Panel::Lesson;
    lesson::draw(frame, chunks[panel_index], state, tracker, theme, focused);
    panel_index += 1;

    if state.panel_visibility.notifications {
        let focused = state.focused_panel == Panel::Notifications;
        notifications_panel::draw(frame, chunks[panel_index], state, theme, focused);
    }

    // Draw command line at bottom
    command_line::draw(frame, command_area, &state.command_line, theme);
}

/// Create the layout constraints based on visible panels
fn create_layout(area: Rect, state: &AppState) -> Vec<Rect> {
    let mut constraints = Vec::new();

    // Curriculum panel (left): 25% width, min 24 cols
    if state.panel_visibility.curriculum {
        let curriculum_width = (area.width / 4).max(CURRICULUM_MIN_WIDTH);
        constraints.push(Constraint::Length(curriculum_width));
    }

    // Lesson panel (center): flexible
    constraints.push(Constraint::Min(30));

    // Notifications panel (right): 25% width
    if state.panel_visibility.notifications {
        let width = area.width / 4;
        constraints.push(Constraint::Length(width));
    }

    Layout::default().direction(Direction::Horizontal).constraints(constraints).split(area).to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::PanelVisibility;

    #[test]
    fn layout_with_all_panels() {
        let area = Rect::new(0, 0, 120, 40);
        let state = AppState {
            panel_visibility: PanelVisibility { curriculum: true, notifications: true },
            ..Default::default()
        };

        let chunks = create_layout(area, &state);
        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn layout_with_curriculum_only() {
        let area = Rect::new(0, 0, 100, 40);
        let state = AppState {
            panel_visibility: PanelVisibility { curriculum: true, notifications: false },
            ..Default::default()
        };

        let chunks = create_layout(area, &state);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].width, 25);
    }

    #[test]
    fn layout_with_lesson_only() {
        let area = Rect::new(0, 0, 80, 40);
        let state = AppState {
            panel_visibility: PanelVisibility { curriculum: false, notifications: false },
            ..Default::default()
        };

        let chunks = create_layout(area, &state);
        assert_eq!(chunks.len(), 1);
    }
}
