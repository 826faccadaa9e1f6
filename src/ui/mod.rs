//! UI rendering components

pub mod command_line;
pub mod curriculum;
pub mod layout;
pub mod lesson;
pub mod lesson_footer;
pub mod main_screen;
pub mod notifications_panel;

use ratatui::Frame;

use crate::app::state::{AppState, Screen};
use crate::theme::Theme;
use crate::tracker::SequentialTracker;

/// Main draw function
pub fn draw(frame: &mut Frame, state: &mut AppState, tracker: &SequentialTracker, theme: &Theme) {
    match state.screen {
        Screen::Study => main_screen::draw(frame, state, tracker, theme),
        Screen::Help => layout::draw_help(frame, theme),
    }
}
