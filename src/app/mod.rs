//! Application state and event handling

pub mod command;
pub mod input;
pub mod state;

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::watch;

use crate::config::Config;
use crate::config::session::{AuthEvent, SessionHandle};
use crate::course::{Course, LessonType};
use crate::notifications::{FeedSnapshot, NotificationCenter};
use crate::theme::Theme;
use crate::tracker::{CompletionReport, QuizOutcome, SequentialTracker, TrackerError};
use crate::ui;
use command::{Command, ParseResult};
use input::Action;
use state::{AppState, CurriculumRow, Panel, Screen, curriculum_rows};

/// Why the study session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReason {
    Quit,
    /// The server rejected the token; the user must sign in again
    SessionExpired { route: String },
}

/// The study application
pub struct App {
    /// Application configuration
    config: Config,

    theme: Theme,

    /// Current application state
    state: AppState,

    tracker: SequentialTracker,

    notifications: NotificationCenter,

    feed: watch::Receiver<FeedSnapshot>,

    auth_events: watch::Receiver<AuthEvent>,

    /// Start of the file viewing time not yet reported
    file_clock: Instant,

    /// Terminal backend
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl App {
    /// Create a new application instance
    pub fn new(
        config: Config,
        tracker: SequentialTracker,
        notifications: NotificationCenter,
        session: &SessionHandle,
    ) -> Result<Self> {
        let terminal = Self::setup_terminal()?;
        let theme = config.active_theme();
        let feed = notifications.subscribe();
        let auth_events = session.subscribe();

        let mut app = Self {
            config,
            theme,
            state: AppState::default(),
            tracker,
            notifications,
            feed,
            auth_events,
            file_clock: Instant::now(),
            terminal,
        };
        app.on_lesson_changed();
        Ok(app)
    }

    /// Set up the terminal for TUI rendering
    fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(terminal)
    }

    /// Restore the terminal to its original state
    fn restore_terminal(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    /// Run the application main loop
    pub async fn run(&mut self) -> Result<ExitReason> {
        // Set up panic hook to restore terminal
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
            original_hook(panic_info);
        }));

        let poller = self
            .notifications
            .start_polling(self.config.polling.notifications_interval());

        let reason = loop {
            self.terminal.draw(|frame| {
                ui::draw(frame, &mut self.state, &self.tracker, &self.theme);
            })?;

            if let Some(reason) = self.check_session() {
                break reason;
            }
            self.sync_notifications();
            self.report_reading();

            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        match self.handle_key(key).await {
                            Ok(true) => break ExitReason::Quit,
                            Ok(false) => {}
                            Err(e) => {
                                tracing::error!("Error handling key: {}", e);
                                self.state.command_line.set_error(e.to_string());
                            }
                        }
                    }
                }
            }
        };

        poller.shutdown().await;
        self.restore_terminal()?;
        Ok(reason)
    }

    /// React to auth events published by the session
    fn check_session(&mut self) -> Option<ExitReason> {
        if !self.auth_events.has_changed().unwrap_or(false) {
            return None;
        }
        let event = self.auth_events.borrow_and_update().clone();
        match event {
            AuthEvent::RedirectToLogin { route } => Some(ExitReason::SessionExpired { route }),
            AuthEvent::SignedOut => {
                self.state.command_line.set_error("Session expired, redirecting to login...");
                None
            }
            AuthEvent::Anonymous | AuthEvent::SignedIn { .. } => None,
        }
    }

    fn sync_notifications(&mut self) {
        if !self.feed.has_changed().unwrap_or(false) {
            return;
        }
        self.state.notifications = self.feed.borrow_and_update().clone();
        let last = self.state.notifications.items.len().saturating_sub(1);
        let panel = &mut self.state.notification_panel;
        panel.selected_index = panel.selected_index.min(last);
    }

    /// Feed passive reading signals (scroll position, file time) to the tracker
    fn report_reading(&mut self) {
        match self.tracker.current_kind() {
            Some(LessonType::Text) => {
                self.tracker.update_content_scroll(self.state.content.read_percent());
            }
            Some(LessonType::File) => {
                let secs = self.file_clock.elapsed().as_secs();
                if secs > 0 {
                    self.tracker.update_file_view(secs);
                    self.file_clock += Duration::from_secs(secs);
                }
            }
            _ => {}
        }
    }

    /// Handle a key press, returns true if should exit
    async fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        if self.state.command_line.is_input_mode() {
            return self.handle_command_input(key).await;
        }

        if key.code == KeyCode::Char(':') {
            self.state.command_line.enter_command_mode();
            return Ok(false);
        }

        if let Some(action) =
            input::key_with_modifier_to_action(key.code, key.modifiers, self.config.vim_mode)
        {
            self.handle_action(action).await?;
        }
        Ok(false)
    }

    async fn handle_command_input(&mut self, key: KeyEvent) -> Result<bool> {
        let line = &mut self.state.command_line;
        match key.code {
            KeyCode::Esc => line.exit_input_mode(),
            KeyCode::Enter => {
                let input = line.input.clone();
                line.add_to_history(input.clone());
                line.exit_input_mode();
                return self.execute(&input).await;
            }
            KeyCode::Backspace => line.delete_char(),
            KeyCode::Delete => line.delete_char_forward(),
            KeyCode::Left => line.move_left(),
            KeyCode::Right => line.move_right(),
            KeyCode::Home => line.move_start(),
            KeyCode::End => line.move_end(),
            KeyCode::Up => line.history_up(),
            KeyCode::Down => line.history_down(),
            KeyCode::Char(c) => line.insert_char(c),
            _ => {}
        }
        Ok(false)
    }

    /// Parse and run a command line entry, returns true if should exit
    async fn execute(&mut self, input: &str) -> Result<bool> {
        let line = &mut self.state.command_line;
        match command::parse_command(input) {
            ParseResult::Ok(cmd) => return self.run_command(cmd).await,
            ParseResult::UnknownCommand(cmd) => line.set_error(format!("Unknown command: {}", cmd)),
            ParseResult::MissingArgument(cmd) => {
                line.set_error(format!(":{} needs an argument", cmd))
            }
            ParseResult::InvalidArgument(cmd, arg) => {
                line.set_error(format!("Invalid argument for :{}: {}", cmd, arg))
            }
        }
        Ok(false)
    }

    async fn run_command(&mut self, cmd: Command) -> Result<bool> {
        match cmd {
            Command::Watch { seconds, duration } => {
                let duration = duration.or_else(|| {
                    self.tracker
                        .current_lesson()
                        .map(|l| l.duration_seconds as f64)
                        .filter(|d| *d > 0.0)
                });
                let Some(duration) = duration else {
                    self.state.command_line.set_error("Video length unknown, use :watch <seconds>/<length>");
                    return Ok(false);
                };
                let watched = self.tracker.update_video_progress(seconds, duration);
                let progress = self.tracker.completion_state().video_progress;
                let suffix = if watched { ", video complete" } else { "" };
                self.state.command_line.set_message(format!("Watched {:.0}%{}", progress, suffix));
            }
            Command::Scroll(percent) => {
                let read = self.tracker.update_content_scroll(percent);
                let progress = self.tracker.completion_state().scroll_progress;
                let suffix = if read { ", text complete" } else { "" };
                self.state.command_line.set_message(format!("Read {:.0}%{}", progress, suffix));
            }
            Command::View(seconds) => {
                let viewed = self.tracker.update_file_view(seconds);
                let total = self.tracker.completion_state().file_view_seconds;
                let suffix = if viewed { ", file complete" } else { "" };
                self.state.command_line.set_message(format!("Viewed for {}s{}", total, suffix));
            }
            Command::QuizAnswers(answers) => {
                let outcome = self.tracker.submit_quiz_answers(&answers);
                self.report_quiz(outcome);
            }
            Command::QuizScore { score, total } => {
                let passing = self
                    .tracker
                    .current_lesson()
                    .and_then(|l| l.content.quiz.as_ref())
                    .and_then(|q| q.passing_score)
                    .map(f64::from)
                    .unwrap_or(self.tracker.thresholds().default_quiz_passing_score);
                let outcome = self.tracker.submit_quiz(score, total, passing);
                self.report_quiz(outcome);
            }
            Command::Complete => self.complete_and_next().await,
            Command::Next => self.go_next(),
            Command::Prev => self.go_prev(),
            Command::Goto { module, lesson } => self.open_lesson(module, lesson),
            Command::ReadAll => match self.notifications.mark_all_read().await {
                Ok(()) => self.state.command_line.set_message("All notifications marked read"),
                Err(e) => self.state.command_line.set_error(e.to_string()),
            },
            Command::Quit => return Ok(true),
            Command::Help => self.state.screen = Screen::Help,
            Command::Nop => self.state.command_line.clear_message(),
        }
        Ok(false)
    }

    fn report_quiz(&mut self, outcome: Result<QuizOutcome, TrackerError>) {
        let line = &mut self.state.command_line;
        match outcome {
            Ok(QuizOutcome::Passed { percent }) => {
                line.set_message(format!("Quiz passed with {:.0}%", percent))
            }
            Ok(QuizOutcome::Failed { percent, attempts_left }) => line.set_error(format!(
                "Scored {:.0}%, {} attempt{} left",
                percent,
                attempts_left,
                if attempts_left == 1 { "" } else { "s" }
            )),
            Ok(QuizOutcome::Exhausted { percent }) => {
                line.set_error(format!("Scored {:.0}%, no attempts left", percent))
            }
            Err(e) => line.set_error(e.to_string()),
        }
    }

    async fn handle_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Up => self.move_selection(-1),
            Action::Down => self.move_selection(1),
            Action::PageUp => self.move_selection(-(self.page_size() as isize)),
            Action::PageDown => self.move_selection(self.page_size() as isize),
            Action::HalfPageUp => self.move_selection(-(self.page_size() as isize / 2)),
            Action::HalfPageDown => self.move_selection(self.page_size() as isize / 2),
            Action::Top => self.move_selection(isize::MIN / 2),
            Action::Bottom => self.move_selection(isize::MAX / 2),
            Action::PrevLesson => self.go_prev(),
            Action::NextLesson => self.go_next(),
            Action::Select => self.select().await,
            Action::Back => {
                if self.state.screen == Screen::Help {
                    self.state.screen = Screen::Study;
                } else {
                    self.state.command_line.clear_message();
                }
            }
            Action::FocusNext => {
                self.state.focused_panel = self.state.focused_panel.next(&self.state.panel_visibility);
            }
            Action::ToggleCurriculum => {
                self.state.panel_visibility.curriculum = !self.state.panel_visibility.curriculum;
                self.refocus();
            }
            Action::ToggleNotifications => {
                let visibility = &mut self.state.panel_visibility;
                visibility.notifications = !visibility.notifications;
                if visibility.notifications {
                    self.state.focused_panel = Panel::Notifications;
                }
                self.refocus();
            }
            Action::CompleteAndNext => self.complete_and_next().await,
            Action::Help => {
                self.state.screen = match self.state.screen {
                    Screen::Help => Screen::Study,
                    Screen::Study => Screen::Help,
                };
            }
        }
        Ok(())
    }

    /// Keep focus on a visible panel
    fn refocus(&mut self) {
        if !self.state.panel_visibility.shows(self.state.focused_panel) {
            self.state.focused_panel = Panel::Lesson;
        }
    }

    fn page_size(&self) -> usize {
        self.state.content.visible_height.max(2)
    }

    /// Move within the focused panel
    fn move_selection(&mut self, delta: isize) {
        let shift = |current: usize, len: usize| -> usize {
            let target = current as isize + delta;
            target.clamp(0, len.saturating_sub(1) as isize) as usize
        };

        match self.state.focused_panel {
            Panel::Curriculum => {
                let rows = curriculum_rows(self.tracker.course()).len();
                let curriculum = &mut self.state.curriculum;
                curriculum.selected_index = shift(curriculum.selected_index, rows);
                curriculum.ensure_selection_visible();
            }
            Panel::Lesson => {
                let content = &mut self.state.content;
                content.scroll_offset = shift(content.scroll_offset, content.max_scroll() + 1);
            }
            Panel::Notifications => {
                let count = self.state.notifications.items.len();
                let panel = &mut self.state.notification_panel;
                panel.selected_index = shift(panel.selected_index, count);
            }
        }
    }

    async fn select(&mut self) {
        match self.state.focused_panel {
            Panel::Curriculum => {
                let rows = curriculum_rows(self.tracker.course());
                if let Some(CurriculumRow::Lesson(m, l)) =
                    rows.get(self.state.curriculum.selected_index).copied()
                {
                    self.open_lesson(m, l);
                }
            }
            Panel::Notifications => {
                let index = self.state.notification_panel.selected_index;
                let Some(id) = self.state.notifications.items.get(index).map(|n| n.id.clone())
                else {
                    return;
                };
                if let Err(e) = self.notifications.mark_read(&id).await {
                    self.state.command_line.set_error(e.to_string());
                }
            }
            Panel::Lesson => {}
        }
    }

    fn open_lesson(&mut self, module_idx: usize, lesson_idx: usize) {
        match self.tracker.navigate_to_lesson(module_idx, lesson_idx) {
            Ok(_) => self.on_lesson_changed(),
            Err(e) => self.state.command_line.set_error(e.to_string()),
        }
    }

    /// Step forward, refusing lessons that are still locked
    fn go_next(&mut self) {
        let next = self
            .tracker
            .current_position()
            .and_then(|(m, l)| self.tracker.course().next_position(m, l));
        match next {
            Some((m, l)) => self.open_lesson(m, l),
            None => self.state.command_line.set_error(TrackerError::AtBoundary("last").to_string()),
        }
    }

    fn go_prev(&mut self) {
        match self.tracker.navigate_to_previous() {
            Ok(_) => self.on_lesson_changed(),
            Err(e) => self.state.command_line.set_error(e.to_string()),
        }
    }

    /// The footer button: record the lesson and open the next one
    async fn complete_and_next(&mut self) {
        let Some(lesson) = self.tracker.current_lesson() else {
            return;
        };
        let lesson_id = lesson.id.clone();

        let already_completed = self.tracker.is_lesson_completed(&lesson_id);
        if !already_completed && !self.tracker.is_current_content_completed() {
            let hint = pending_hint(self.tracker.current_kind());
            self.state.command_line.set_error(hint);
            return;
        }

        // Also retries module or course saves that failed earlier
        let spent = self.tracker.seconds_on_current();
        match self.tracker.mark_lesson_completed(&lesson_id, spent).await {
            Ok(report) if already_completed && report.is_empty() && report.warnings.is_empty() => {}
            Ok(report) => {
                let message = describe_report(&report, self.tracker.course());
                self.state.command_line.set_message(message);
            }
            Err(e) => {
                tracing::warn!("Failed to complete lesson {}: {}", lesson_id, e);
                self.state.command_line.set_error(e.to_string());
                return;
            }
        }

        if self.tracker.navigate_to_next().is_ok() {
            self.on_lesson_changed();
        }
    }

    fn on_lesson_changed(&mut self) {
        self.state.content.reset();
        self.file_clock = Instant::now();

        if let Some((m, l)) = self.tracker.current_position() {
            let rows = curriculum_rows(self.tracker.course());
            if let Some(index) = rows.iter().position(|r| *r == CurriculumRow::Lesson(m, l)) {
                self.state.curriculum.selected_index = index;
                self.state.curriculum.ensure_selection_visible();
            }
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = self.restore_terminal();
    }
}

/// What the learner still has to do before the lesson counts
fn pending_hint(kind: Option<LessonType>) -> &'static str {
    match kind {
        Some(LessonType::Video) => "Watch the video to the end first (:watch)",
        Some(LessonType::Quiz) => "Pass the quiz first (:quiz)",
        Some(LessonType::Text) => "Read to the end of the lesson first",
        Some(LessonType::File) => "Keep the file open a little longer (:view)",
        None => "Finish the lesson content first",
    }
}

/// One-line summary of a completion
fn describe_report(report: &CompletionReport, course: &Course) -> String {
    let mut message = if report.course_completed {
        match &report.certificate {
            Some(cert) => format!(
                "Course completed! Certificate {} issued",
                cert.certificate_number.as_deref().unwrap_or(&cert.id)
            ),
            None => "Course completed!".to_string(),
        }
    } else if let Some(module_id) = report.modules.last() {
        let title = course
            .locate_module(module_id)
            .map(|m| course.modules[m].title.as_str())
            .unwrap_or(module_id.as_str());
        format!("Module \"{}\" completed", title)
    } else if report.lessons.is_empty() {
        "Lesson already completed".to_string()
    } else if report.unlocked.is_empty() {
        "Lesson completed".to_string()
    } else {
        "Lesson completed, next lesson unlocked".to_string()
    };

    if !report.warnings.is_empty() {
        message.push_str(&format!(" ({})", report.warnings.join("; ")));
    }
    message
}
