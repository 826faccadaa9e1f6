//! Color themes for the study screen

mod tokyo_night;

pub use tokyo_night::{TOKYO_NIGHT, TOKYO_NIGHT_DAY};

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// A color theme for the application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,

    // Background colors
    pub bg_primary: Color,
    pub bg_tertiary: Color,

    // Foreground colors
    pub fg_primary: Color,
    pub fg_secondary: Color,
    pub fg_muted: Color,

    // Accent colors
    pub accent_primary: Color,
    pub accent_secondary: Color,

    // Semantic colors
    pub success: Color,
    pub warning: Color,
    pub error: Color,

    // Progress
    pub locked: Color,
    pub unread: Color,

    // UI elements
    pub border: Color,
    pub border_focused: Color,
}

impl Theme {
    /// Look up a built-in theme by name, case-insensitively
    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "tokyo night" | "tokyo-night" => Some(Self::tokyo_night()),
            "tokyo night day" | "tokyo-night-day" => Some(Self::tokyo_night_day()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::tokyo_night()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_theme_is_tokyo_night() {
        let theme = Theme::default();
        assert_eq!(theme.name, "Tokyo Night");
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(Theme::by_name("tokyo night day").map(|t| t.name), Some("Tokyo Night Day".into()));
        assert!(Theme::by_name("Solarized").is_none());
    }
}
