//! Per-lesson content completion counters
//!
//! These are ephemeral: the tracker resets them whenever the active lesson
//! changes, and nothing here is persisted. Only the eventual "lesson
//! completed" call reaches the server.

use crate::config::CompletionThresholds;
use crate::course::LessonType;

/// Result of a quiz submission
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuizOutcome {
    /// Score met the passing threshold
    Passed { percent: f64 },
    /// Below threshold, more attempts remain
    Failed { percent: f64, attempts_left: u32 },
    /// Below threshold and no attempts remain
    Exhausted { percent: f64 },
}

/// Progress signals for the active lesson
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentCompletionState {
    pub video_watched: bool,
    /// Highest watched percentage seen so far
    pub video_progress: f64,
    pub quiz_completed: bool,
    pub quiz_passed: bool,
    pub quiz_attempts: u32,
    /// Percentage of the latest submission
    pub quiz_score: Option<f64>,
    pub text_scrolled: bool,
    /// Highest scroll percentage seen so far
    pub scroll_progress: f64,
    pub file_viewed: bool,
    pub file_view_seconds: u64,
}

impl ContentCompletionState {
    /// Record video playback position. Returns whether the video now counts as watched.
    ///
    /// A non-positive duration carries no information and is ignored.
    pub fn update_video_progress(
        &mut self,
        watch_time: f64,
        duration: f64,
        thresholds: &CompletionThresholds,
    ) -> bool {
        if duration <= 0.0 || !watch_time.is_finite() {
            return self.video_watched;
        }

        let ratio = (watch_time / duration).clamp(0.0, 1.0);
        self.video_progress = self.video_progress.max(ratio * 100.0);
        if ratio >= thresholds.video_watch_ratio {
            self.video_watched = true;
        }
        self.video_watched
    }

    /// Record how far a text lesson has been scrolled (0-100)
    pub fn update_content_scroll(
        &mut self,
        percent: f64,
        thresholds: &CompletionThresholds,
    ) -> bool {
        let percent = percent.clamp(0.0, 100.0);
        self.scroll_progress = self.scroll_progress.max(percent);
        if percent >= thresholds.text_scroll_percent {
            self.text_scrolled = true;
        }
        self.text_scrolled
    }

    /// Add time spent viewing a file
    pub fn update_file_view(&mut self, seconds: u64, thresholds: &CompletionThresholds) -> bool {
        self.file_view_seconds = self.file_view_seconds.saturating_add(seconds);
        if self.file_view_seconds >= thresholds.file_view_seconds {
            self.file_viewed = true;
        }
        self.file_viewed
    }

    /// Whether further quiz submissions are accepted
    pub fn quiz_open(&self) -> bool {
        !self.quiz_completed
    }

    /// Record a quiz submission.
    ///
    /// Returns `None` once the quiz is completed (passed, or attempts
    /// exhausted); the state is not touched in that case.
    pub fn submit_quiz(
        &mut self,
        score: f64,
        total: f64,
        passing: f64,
        thresholds: &CompletionThresholds,
    ) -> Option<QuizOutcome> {
        if !self.quiz_open() {
            return None;
        }

        let percent = if total > 0.0 { score * 100.0 / total } else { 0.0 };
        self.quiz_attempts += 1;
        self.quiz_score = Some(percent);

        if percent >= passing {
            self.quiz_passed = true;
            self.quiz_completed = true;
            return Some(QuizOutcome::Passed { percent });
        }

        if self.quiz_attempts >= thresholds.max_quiz_attempts {
            self.quiz_completed = true;
            return Some(QuizOutcome::Exhausted { percent });
        }

        Some(QuizOutcome::Failed {
            percent,
            attempts_left: thresholds.max_quiz_attempts - self.quiz_attempts,
        })
    }

    /// Whether the content of a lesson of `kind` counts as consumed.
    ///
    /// A lesson with no recognizable content has nothing to consume.
    pub fn is_complete_for(
        &self,
        kind: Option<LessonType>,
        thresholds: &CompletionThresholds,
    ) -> bool {
        match kind {
            Some(LessonType::Video) => self.video_watched,
            Some(LessonType::Text) => self.text_scrolled,
            Some(LessonType::File) => self.file_viewed,
            Some(LessonType::Quiz) => {
                self.quiz_completed
                    && (self.quiz_passed || thresholds.allow_progress_after_exhausted_attempts)
            }
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> CompletionThresholds {
        CompletionThresholds::default()
    }

    #[test]
    fn video_threshold_is_ninety_five_percent() {
        let mut state = ContentCompletionState::default();
        assert!(!state.update_video_progress(94.0, 100.0, &thresholds()));
        assert!(state.update_video_progress(95.0, 100.0, &thresholds()));
    }

    #[test]
    fn video_watched_is_sticky_after_seeking_back() {
        let mut state = ContentCompletionState::default();
        state.update_video_progress(96.0, 100.0, &thresholds());
        assert!(state.update_video_progress(10.0, 100.0, &thresholds()));
        assert_eq!(state.video_progress, 96.0);
    }

    #[test]
    fn zero_duration_is_ignored() {
        let mut state = ContentCompletionState::default();
        assert!(!state.update_video_progress(10.0, 0.0, &thresholds()));
        assert_eq!(state, ContentCompletionState::default());
    }

    #[test]
    fn text_threshold_is_ninety_percent() {
        let mut state = ContentCompletionState::default();
        assert!(!state.update_content_scroll(89.9, &thresholds()));
        assert!(state.update_content_scroll(90.0, &thresholds()));
    }

    #[test]
    fn file_view_time_accumulates() {
        let mut state = ContentCompletionState::default();
        assert!(!state.update_file_view(4, &thresholds()));
        assert!(!state.update_file_view(5, &thresholds()));
        assert!(state.update_file_view(1, &thresholds()));
    }

    #[test]
    fn passing_quiz_completes() {
        let mut state = ContentCompletionState::default();
        let outcome = state.submit_quiz(8.0, 10.0, 70.0, &thresholds());
        assert_eq!(outcome, Some(QuizOutcome::Passed { percent: 80.0 }));
        assert!(state.quiz_passed && state.quiz_completed);
        assert!(state.is_complete_for(Some(LessonType::Quiz), &thresholds()));
    }

    #[test]
    fn two_failures_exhaust_quiz_without_passing() {
        let mut state = ContentCompletionState::default();
        assert_eq!(
            state.submit_quiz(60.0, 100.0, 70.0, &thresholds()),
            Some(QuizOutcome::Failed { percent: 60.0, attempts_left: 1 })
        );
        assert_eq!(
            state.submit_quiz(60.0, 100.0, 70.0, &thresholds()),
            Some(QuizOutcome::Exhausted { percent: 60.0 })
        );

        assert_eq!(state.quiz_attempts, 2);
        assert!(state.quiz_completed);
        assert!(!state.quiz_passed);
        assert!(!state.is_complete_for(Some(LessonType::Quiz), &thresholds()));
    }

    #[test]
    fn exhausted_quiz_can_count_when_configured() {
        let lenient =
            CompletionThresholds { allow_progress_after_exhausted_attempts: true, ..thresholds() };
        let mut state = ContentCompletionState::default();
        state.submit_quiz(0.0, 10.0, 70.0, &lenient);
        state.submit_quiz(0.0, 10.0, 70.0, &lenient);
        assert!(state.is_complete_for(Some(LessonType::Quiz), &lenient));
    }

    #[test]
    fn completed_quiz_rejects_submissions() {
        let mut state = ContentCompletionState::default();
        state.submit_quiz(10.0, 10.0, 70.0, &thresholds());
        let before = state.clone();
        assert_eq!(state.submit_quiz(0.0, 10.0, 70.0, &thresholds()), None);
        assert_eq!(state, before);
    }

    #[test]
    fn empty_quiz_total_scores_zero() {
        let mut state = ContentCompletionState::default();
        assert_eq!(
            state.submit_quiz(5.0, 0.0, 70.0, &thresholds()),
            Some(QuizOutcome::Failed { percent: 0.0, attempts_left: 1 })
        );
    }

    #[test]
    fn lesson_without_content_is_complete() {
        assert!(ContentCompletionState::default().is_complete_for(None, &thresholds()));
    }
}
