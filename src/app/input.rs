//! Event handling utilities

use crossterm::event::{KeyCode, KeyModifiers};

/// Vim-style key mapping (basic, without modifiers)
pub fn vim_key_to_action(key: KeyCode) -> Option<Action> {
    match key {
        KeyCode::Char('j') => Some(Action::Down),
        KeyCode::Char('k') => Some(Action::Up),
        KeyCode::Char('h') => Some(Action::PrevLesson),
        KeyCode::Char('l') => Some(Action::NextLesson),
        KeyCode::Char('g') => Some(Action::Top),
        KeyCode::Char('G') => Some(Action::Bottom),
        KeyCode::Char('d') => Some(Action::PageDown),
        KeyCode::Char('u') => Some(Action::PageUp),
        _ => plain_key_to_action(key),
    }
}

/// Mapping shared by both modes
pub fn plain_key_to_action(key: KeyCode) -> Option<Action> {
    match key {
        KeyCode::Down => Some(Action::Down),
        KeyCode::Up => Some(Action::Up),
        KeyCode::Left => Some(Action::PrevLesson),
        KeyCode::Right => Some(Action::NextLesson),
        KeyCode::Home => Some(Action::Top),
        KeyCode::End => Some(Action::Bottom),
        KeyCode::PageDown => Some(Action::PageDown),
        KeyCode::PageUp => Some(Action::PageUp),
        KeyCode::Enter => Some(Action::Select),
        KeyCode::Esc => Some(Action::Back),
        KeyCode::Tab => Some(Action::FocusNext),
        KeyCode::Char('?') => Some(Action::Help),
        // Note: 'q' intentionally not mapped - use :q command to quit
        // Panel toggles
        KeyCode::Char('[') | KeyCode::Char('1') => Some(Action::ToggleCurriculum),
        KeyCode::Char(']') | KeyCode::Char('3') => Some(Action::ToggleNotifications),
        // Complete & Next
        KeyCode::Char('m') => Some(Action::CompleteAndNext),
        _ => None,
    }
}

/// Key mapping with modifiers (for Ctrl combinations)
pub fn key_with_modifier_to_action(
    key: KeyCode,
    modifiers: KeyModifiers,
    vim_mode: bool,
) -> Option<Action> {
    if modifiers.contains(KeyModifiers::CONTROL) {
        match key {
            KeyCode::Char('d') => Some(Action::HalfPageDown),
            KeyCode::Char('u') => Some(Action::HalfPageUp),
            KeyCode::Char('f') => Some(Action::PageDown),
            KeyCode::Char('b') => Some(Action::PageUp),
            _ => None,
        }
    } else if vim_mode {
        vim_key_to_action(key)
    } else {
        plain_key_to_action(key)
    }
}

/// Actions that can be taken in the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // Navigation
    Up,
    Down,
    Top,
    Bottom,
    PageUp,
    PageDown,
    HalfPageUp,
    HalfPageDown,
    PrevLesson,
    NextLesson,

    // Selection
    Select,
    Back,
    FocusNext,

    // Panel management
    ToggleCurriculum,
    ToggleNotifications,

    // Progress
    CompleteAndNext,

    Help,
}
