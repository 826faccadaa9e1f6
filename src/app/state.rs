//! Application state definitions

use crate::course::Course;
use crate::notifications::FeedSnapshot;

/// Which screen is currently displayed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Screen {
    #[default]
    Study,
    Help,
}

/// Which panel is currently focused
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Panel {
    Curriculum,
    #[default]
    Lesson,
    Notifications,
}

impl Panel {
    /// Next visible panel in left-to-right order
    pub fn next(self, visibility: &PanelVisibility) -> Self {
        let order = [Panel::Curriculum, Panel::Lesson, Panel::Notifications];
        let start = order.iter().position(|p| *p == self).unwrap_or(1);
        (1..=order.len())
            .map(|step| order[(start + step) % order.len()])
            .find(|p| visibility.shows(*p))
            .unwrap_or(Panel::Lesson)
    }
}

/// Panel visibility settings
#[derive(Debug, Clone)]
pub struct PanelVisibility {
    /// Show the curriculum (left) panel
    pub curriculum: bool,
    /// Show the notifications (right) panel
    pub notifications: bool,
}

impl Default for PanelVisibility {
    fn default() -> Self {
        Self { curriculum: true, notifications: false }
    }
}

impl PanelVisibility {
    pub fn shows(&self, panel: Panel) -> bool {
        match panel {
            Panel::Curriculum => self.curriculum,
            Panel::Lesson => true,
            Panel::Notifications => self.notifications,
        }
    }
}

/// One row of the curriculum tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurriculumRow {
    Module(usize),
    Lesson(usize, usize),
}

/// Flatten a course into display rows, every module expanded
pub fn curriculum_rows(course: &Course) -> Vec<CurriculumRow> {
    let mut rows = Vec::with_capacity(course.modules.len() + course.lesson_count());
    for (m, module) in course.modules.iter().enumerate() {
        rows.push(CurriculumRow::Module(m));
        rows.extend((0..module.lessons.len()).map(|l| CurriculumRow::Lesson(m, l)));
    }
    rows
}

/// State for the curriculum tree browser
#[derive(Debug, Clone, Default)]
pub struct CurriculumState {
    /// Currently selected row index (flat index in tree)
    pub selected_index: usize,
    /// Scroll offset for long curricula
    pub scroll_offset: usize,
    /// Visible height in items (updated on render)
    pub visible_height: usize,
}

impl CurriculumState {
    /// Ensure the selected item is visible by adjusting scroll offset
    pub fn ensure_selection_visible(&mut self) {
        // Don't scroll past the selection (top)
        if self.selected_index < self.scroll_offset {
            self.scroll_offset = self.selected_index;
        }
        // Don't let selection go below visible area (bottom)
        let visible = self.visible_height.saturating_sub(2);
        if visible > 0 && self.selected_index >= self.scroll_offset + visible {
            self.scroll_offset = self.selected_index.saturating_sub(visible) + 1;
        }
    }
}

/// State for content rendering
#[derive(Debug, Clone, Default)]
pub struct ContentState {
    /// Current scroll position (lines from top)
    pub scroll_offset: usize,
    /// Total rendered lines (updated on render)
    pub total_lines: usize,
    /// Visible height in lines (updated on render)
    pub visible_height: usize,
}

impl ContentState {
    /// Get the maximum allowed scroll offset
    pub fn max_scroll(&self) -> usize {
        self.total_lines.saturating_sub(self.visible_height / 2)
    }

    /// Clamp scroll offset to valid range
    pub fn clamp_scroll(&mut self) {
        let max = self.max_scroll();
        if self.scroll_offset > max {
            self.scroll_offset = max;
        }
    }

    /// Share of the lesson text that has been on screen, 0-100
    pub fn read_percent(&self) -> f64 {
        // Not measured yet
        if self.total_lines == 0 {
            return 0.0;
        }
        if self.total_lines <= self.visible_height {
            return 100.0;
        }
        let seen = (self.scroll_offset + self.visible_height).min(self.total_lines);
        seen as f64 * 100.0 / self.total_lines as f64
    }

    /// Back to the top for a new lesson
    pub fn reset(&mut self) {
        self.scroll_offset = 0;
        self.total_lines = 0;
    }
}

/// Selection in the notifications panel
#[derive(Debug, Clone, Default)]
pub struct NotificationPanelState {
    pub selected_index: usize,
}

/// Command line mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommandMode {
    /// Normal mode - command line hidden or showing status
    #[default]
    Normal,
    /// Command mode - accepting : commands
    Command,
}

/// State for the command line input
#[derive(Debug, Clone, Default)]
pub struct CommandLineState {
    /// Current mode
    pub mode: CommandMode,
    /// Input buffer
    pub input: String,
    /// Cursor position in input
    pub cursor: usize,
    /// Status/error message to display (when not in input mode)
    pub message: Option<String>,
    /// Whether message is an error
    pub is_error: bool,
    /// Command history
    pub history: Vec<String>,
    /// Current history index when navigating
    pub history_index: Option<usize>,
}

impl CommandLineState {
    /// Start command mode
    pub fn enter_command_mode(&mut self) {
        self.mode = CommandMode::Command;
        self.input.clear();
        self.cursor = 0;
        self.message = None;
        self.history_index = None;
    }

    /// Exit input mode
    pub fn exit_input_mode(&mut self) {
        self.mode = CommandMode::Normal;
        self.input.clear();
        self.cursor = 0;
    }

    /// Set a status message
    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.is_error = false;
    }

    /// Set an error message
    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.is_error = true;
    }

    /// Clear the message
    pub fn clear_message(&mut self) {
        self.message = None;
    }

    /// Convert character index to byte index
    fn char_to_byte_index(&self, char_idx: usize) -> usize {
        self.input.char_indices().nth(char_idx).map(|(i, _)| i).unwrap_or(self.input.len())
    }

    /// Get the number of characters in input
    fn char_count(&self) -> usize {
        self.input.chars().count()
    }

    /// Insert a character at cursor (cursor is character index)
    pub fn insert_char(&mut self, c: char) {
        let byte_idx = self.char_to_byte_index(self.cursor);
        self.input.insert(byte_idx, c);
        self.cursor += 1;
    }

    /// Delete character before cursor
    pub fn delete_char(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_idx = self.char_to_byte_index(self.cursor);
            self.input.remove(byte_idx);
        }
    }

    /// Delete character at cursor
    pub fn delete_char_forward(&mut self) {
        if self.cursor < self.char_count() {
            let byte_idx = self.char_to_byte_index(self.cursor);
            self.input.remove(byte_idx);
        }
    }

    /// Move cursor left
    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    /// Move cursor right
    pub fn move_right(&mut self) {
        if self.cursor < self.char_count() {
            self.cursor += 1;
        }
    }

    /// Move cursor to start
    pub fn move_start(&mut self) {
        self.cursor = 0;
    }

    /// Move cursor to end
    pub fn move_end(&mut self) {
        self.cursor = self.char_count();
    }

    /// Get the current input with prefix
    pub fn display_text(&self) -> String {
        match self.mode {
            CommandMode::Normal => self.message.clone().unwrap_or_default(),
            CommandMode::Command => format!(":{}", self.input),
        }
    }

    /// Check if we're in input mode
    pub fn is_input_mode(&self) -> bool {
        self.mode == CommandMode::Command
    }

    /// Maximum number of history entries to keep
    const MAX_HISTORY: usize = 1000;

    /// Add to history
    pub fn add_to_history(&mut self, cmd: String) {
        if !cmd.is_empty() && self.history.last() != Some(&cmd) {
            if self.history.len() >= Self::MAX_HISTORY {
                self.history.remove(0);
            }
            self.history.push(cmd);
        }
    }

    /// Navigate history up
    pub fn history_up(&mut self) {
        if self.history.is_empty() {
            return;
        }
        match self.history_index {
            None => {
                self.history_index = Some(self.history.len() - 1);
            }
            Some(i) if i > 0 => {
                self.history_index = Some(i - 1);
            }
            _ => {}
        }
        if let Some(i) = self.history_index {
            self.input = self.history[i].clone();
            self.cursor = self.input.chars().count();
        }
    }

    /// Navigate history down
    pub fn history_down(&mut self) {
        if let Some(i) = self.history_index {
            if i + 1 < self.history.len() {
                self.history_index = Some(i + 1);
                self.input = self.history[i + 1].clone();
                self.cursor = self.input.chars().count();
            } else {
                self.history_index = None;
                self.input.clear();
                self.cursor = 0;
            }
        }
    }
}

/// Full application state
#[derive(Debug, Default)]
pub struct AppState {
    /// Current screen
    pub screen: Screen,

    /// Panel visibility settings
    pub panel_visibility: PanelVisibility,

    /// Currently focused panel
    pub focused_panel: Panel,

    /// Curriculum browser state
    pub curriculum: CurriculumState,

    /// Lesson text rendering state
    pub content: ContentState,

    /// Notifications panel selection
    pub notification_panel: NotificationPanelState,

    /// Latest notification feed
    pub notifications: FeedSnapshot,

    /// Command line state
    pub command_line: CommandLineState,
}
