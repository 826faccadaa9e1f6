//! Tokyo Night palettes

use ratatui::style::Color;

use super::Theme;

/// Tokyo Night (dark)
pub const TOKYO_NIGHT: Theme = Theme {
    name: String::new(),

    bg_primary: Color::Rgb(26, 27, 38),   // #1a1b26
    bg_tertiary: Color::Rgb(65, 72, 104), // #414868

    fg_primary: Color::Rgb(169, 177, 214),   // #a9b1d6
    fg_secondary: Color::Rgb(192, 202, 245), // #c0caf5
    fg_muted: Color::Rgb(86, 95, 137),       // #565f89

    accent_primary: Color::Rgb(122, 162, 247),   // #7aa2f7
    accent_secondary: Color::Rgb(187, 154, 247), // #bb9af7

    success: Color::Rgb(158, 206, 106), // #9ece6a
    warning: Color::Rgb(224, 175, 104), // #e0af68
    error: Color::Rgb(247, 118, 142),   // #f7768e

    locked: Color::Rgb(68, 75, 106),    // #444b6a
    unread: Color::Rgb(255, 158, 100),  // #ff9e64

    border: Color::Rgb(65, 72, 104),           // #414868
    border_focused: Color::Rgb(122, 162, 247), // #7aa2f7
};

/// Tokyo Night Day (light)
pub const TOKYO_NIGHT_DAY: Theme = Theme {
    name: String::new(),

    bg_primary: Color::Rgb(225, 226, 231),  // #e1e2e7
    bg_tertiary: Color::Rgb(196, 200, 218), // #c4c8da

    fg_primary: Color::Rgb(55, 96, 191),     // #3760bf
    fg_secondary: Color::Rgb(97, 114, 176),  // #6172b0
    fg_muted: Color::Rgb(132, 140, 181),     // #848cb5

    accent_primary: Color::Rgb(46, 125, 233),  // #2e7de9
    accent_secondary: Color::Rgb(152, 84, 241), // #9854f1

    success: Color::Rgb(88, 117, 57),  // #587539
    warning: Color::Rgb(140, 108, 62), // #8c6c3e
    error: Color::Rgb(245, 42, 101),   // #f52a65

    locked: Color::Rgb(168, 174, 203), // #a8aecb
    unread: Color::Rgb(177, 92, 0),    // #b15c00

    border: Color::Rgb(168, 174, 203),         // #a8aecb
    border_focused: Color::Rgb(46, 125, 233),  // #2e7de9
};

// Names are set here since a const String must be empty
impl Theme {
    pub fn tokyo_night() -> Self {
        Theme { name: "Tokyo Night".to_string(), ..TOKYO_NIGHT }
    }

    pub fn tokyo_night_day() -> Self {
        Theme { name: "Tokyo Night Day".to_string(), ..TOKYO_NIGHT_DAY }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palettes_are_named() {
        assert_eq!(Theme::tokyo_night().name, "Tokyo Night");
        assert_eq!(Theme::tokyo_night_day().name, "Tokyo Night Day");
    }

    #[test]
    fn locked_is_dimmer_than_text() {
        let theme = Theme::tokyo_night();
        assert_ne!(theme.locked, theme.fg_primary);
        assert!(matches!(theme.unread, Color::Rgb(_, _, _)));
    }
}
