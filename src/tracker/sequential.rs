//! Sequential progress tracker
//!
//! Holds a course tree plus the completed/accessible sets for one learner,
//! tracks completion signals for the active lesson, and records completion
//! events with the remote progress service. Local sets change only after the
//! server accepted the corresponding event.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use super::access::{AccessSets, compute_access};
use super::completion::{ContentCompletionState, QuizOutcome};
use crate::api::ApiError;
use crate::api::models::{Certificate, CourseCompletion, LessonCompletion, ModuleCompletion};
use crate::api::progress::{CertificateApi, ProgressApi};
use crate::config::CompletionThresholds;
use crate::course::{Course, Lesson, LessonType};

/// Errors surfaced to the learner as transient notices
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("This lesson is locked. Complete the previous lesson first")]
    Locked { lesson_id: String },

    #[error("No lesson at module {module}, lesson {lesson}")]
    OutOfRange { module: usize, lesson: usize },

    #[error("Already at the {0} lesson")]
    AtBoundary(&'static str),

    #[error("Lesson {0} is not the active lesson")]
    NotActiveLesson(String),

    #[error("Unknown module {0}")]
    UnknownModule(String),

    #[error("This course has no lessons")]
    EmptyCourse,

    #[error("This lesson has no quiz")]
    NoQuiz,

    #[error("No quiz attempts left for this lesson")]
    QuizClosed,

    #[error(transparent)]
    Remote(#[from] ApiError),
}

/// Display status of a lesson
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonStatus {
    Locked,
    Available,
    Completed,
}

/// What a completion call changed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionReport {
    /// Lessons newly recorded as completed
    pub lessons: Vec<String>,
    /// Modules newly recorded as completed
    pub modules: Vec<String>,
    pub course_completed: bool,
    /// Lessons newly added to the accessible set
    pub unlocked: Vec<String>,
    pub certificate: Option<Certificate>,
    /// Follow-up steps that failed without undoing the main completion
    pub warnings: Vec<String>,
}

impl CompletionReport {
    /// True when nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty() && self.modules.is_empty() && !self.course_completed
    }
}

/// Client-side state machine gating access to a course's lessons
pub struct SequentialTracker {
    course: Course,
    progress_api: Arc<dyn ProgressApi>,
    certificate_api: Option<Arc<dyn CertificateApi>>,
    thresholds: CompletionThresholds,

    completed_lessons: HashSet<String>,
    completed_modules: HashSet<String>,
    accessible_lessons: HashSet<String>,
    accessible_modules: HashSet<String>,
    course_completed: bool,

    /// Active (module, lesson) indices; `None` only for an empty course
    current: Option<(usize, usize)>,
    completion: ContentCompletionState,
    lesson_started: Instant,

    /// Seconds recorded per module this session
    module_time: HashMap<String, u64>,
}

impl SequentialTracker {
    /// Start tracking a freshly fetched course with nothing completed
    pub fn new(
        course: Course,
        progress_api: Arc<dyn ProgressApi>,
        thresholds: CompletionThresholds,
    ) -> Self {
        let current = course.first_lesson();
        let mut tracker = Self {
            course,
            progress_api,
            certificate_api: None,
            thresholds,
            completed_lessons: HashSet::new(),
            completed_modules: HashSet::new(),
            accessible_lessons: HashSet::new(),
            accessible_modules: HashSet::new(),
            course_completed: false,
            current,
            completion: ContentCompletionState::default(),
            lesson_started: Instant::now(),
            module_time: HashMap::new(),
        };
        tracker.recompute_access();
        tracker
    }

    /// Request a certificate when the course is completed
    pub fn with_certificates(mut self, api: Arc<dyn CertificateApi>) -> Self {
        self.certificate_api = Some(api);
        self
    }

    /// Rehydrate completed sets from the remote progress log and move to the
    /// first lesson that still needs work
    pub async fn load_progress(&mut self) -> Result<CompletionReport, TrackerError> {
        let progress = self.progress_api.get_course_progress(&self.course.id).await?;

        let known_lessons: HashSet<&str> =
            self.course.flattened().map(|(_, _, l)| l.id.as_str()).collect();
        let known_modules: HashSet<&str> = self.course.modules.iter().map(|m| m.id.as_str()).collect();

        self.completed_lessons = progress
            .detailed_progress
            .iter()
            .filter_map(|e| e.completed_lesson())
            .filter(|id| known_lessons.contains(id))
            .map(str::to_string)
            .collect();
        self.completed_modules = progress
            .detailed_progress
            .iter()
            .filter_map(|e| e.completed_module())
            .filter(|id| known_modules.contains(id))
            .map(str::to_string)
            .collect();
        self.course_completed =
            !self.course.modules.is_empty() && self.all_modules_completed();

        self.recompute_access();

        // Modules whose lessons are all done but whose completion never reached the server
        let mut report = CompletionReport::default();
        self.settle_pending(&mut report).await;

        if let Some(position) = self.resume_position() {
            self.set_current(position);
        }

        tracing::info!(
            "Loaded progress for {}: {}/{} lessons completed",
            self.course.id,
            self.completed_lessons.len(),
            self.course.lesson_count()
        );
        Ok(report)
    }

    fn recompute_access(&mut self) {
        let AccessSets { lessons, modules } =
            compute_access(&self.course, &self.completed_lessons, &self.completed_modules);
        self.accessible_lessons = lessons;
        self.accessible_modules = modules;
    }

    /// First accessible lesson not yet completed, else the last accessible one
    pub fn resume_position(&self) -> Option<(usize, usize)> {
        let mut last_accessible = None;
        for (m, l, lesson) in self.course.flattened() {
            if !self.accessible_lessons.contains(&lesson.id) {
                continue;
            }
            if !self.completed_lessons.contains(&lesson.id) {
                return Some((m, l));
            }
            last_accessible = Some((m, l));
        }
        last_accessible
    }

    // Lookups

    pub fn is_lesson_accessible(&self, lesson_id: &str) -> bool {
        self.accessible_lessons.contains(lesson_id)
    }

    pub fn is_lesson_completed(&self, lesson_id: &str) -> bool {
        self.completed_lessons.contains(lesson_id)
    }

    pub fn is_module_accessible(&self, module_id: &str) -> bool {
        self.accessible_modules.contains(module_id)
    }

    pub fn is_module_completed(&self, module_id: &str) -> bool {
        self.completed_modules.contains(module_id)
    }

    pub fn is_course_completed(&self) -> bool {
        self.course_completed
    }

    pub fn lesson_status(&self, lesson_id: &str) -> LessonStatus {
        if self.is_lesson_completed(lesson_id) {
            LessonStatus::Completed
        } else if self.is_lesson_accessible(lesson_id) {
            LessonStatus::Available
        } else {
            LessonStatus::Locked
        }
    }

    pub fn course(&self) -> &Course {
        &self.course
    }

    pub fn thresholds(&self) -> &CompletionThresholds {
        &self.thresholds
    }

    pub fn completed_lessons(&self) -> &HashSet<String> {
        &self.completed_lessons
    }

    pub fn accessible_lessons(&self) -> &HashSet<String> {
        &self.accessible_lessons
    }

    pub fn completed_modules(&self) -> &HashSet<String> {
        &self.completed_modules
    }

    pub fn accessible_modules(&self) -> &HashSet<String> {
        &self.accessible_modules
    }

    pub fn current_position(&self) -> Option<(usize, usize)> {
        self.current
    }

    pub fn current_lesson(&self) -> Option<&Lesson> {
        self.current.and_then(|(m, l)| self.course.get_lesson(m, l))
    }

    pub fn completion_state(&self) -> &ContentCompletionState {
        &self.completion
    }

    /// Seconds since the active lesson was opened
    pub fn seconds_on_current(&self) -> u64 {
        self.lesson_started.elapsed().as_secs()
    }

    /// Completed lessons as a percentage of all lessons
    pub fn progress_percentage(&self) -> f64 {
        let total = self.course.lesson_count();
        if total == 0 {
            return 0.0;
        }
        self.completed_lessons.len() as f64 * 100.0 / total as f64
    }

    // Navigation

    fn set_current(&mut self, position: (usize, usize)) {
        if self.current != Some(position) {
            self.current = Some(position);
            self.completion = ContentCompletionState::default();
            self.lesson_started = Instant::now();
        }
    }

    /// Open a lesson if it is unlocked
    pub fn navigate_to_lesson(
        &mut self,
        module_idx: usize,
        lesson_idx: usize,
    ) -> Result<&Lesson, TrackerError> {
        let lesson = self
            .course
            .get_lesson(module_idx, lesson_idx)
            .ok_or(TrackerError::OutOfRange { module: module_idx, lesson: lesson_idx })?;

        if !self.accessible_lessons.contains(&lesson.id) {
            return Err(TrackerError::Locked { lesson_id: lesson.id.clone() });
        }

        self.set_current((module_idx, lesson_idx));
        self.current_lesson().ok_or(TrackerError::EmptyCourse)
    }

    /// Move one lesson forward in flattened order.
    ///
    /// Only the end of the course blocks this; completion gating is left to
    /// the caller.
    pub fn navigate_to_next(&mut self) -> Result<(usize, usize), TrackerError> {
        let (m, l) = self.current.ok_or(TrackerError::EmptyCourse)?;
        let next = self.course.next_position(m, l).ok_or(TrackerError::AtBoundary("last"))?;
        self.set_current(next);
        Ok(next)
    }

    /// Move one lesson back in flattened order
    pub fn navigate_to_previous(&mut self) -> Result<(usize, usize), TrackerError> {
        let (m, l) = self.current.ok_or(TrackerError::EmptyCourse)?;
        let prev = self.course.previous_position(m, l).ok_or(TrackerError::AtBoundary("first"))?;
        self.set_current(prev);
        Ok(prev)
    }

    // Content signals for the active lesson

    pub fn update_video_progress(&mut self, watch_time: f64, duration: f64) -> bool {
        self.completion.update_video_progress(watch_time, duration, &self.thresholds)
    }

    pub fn update_content_scroll(&mut self, percent: f64) -> bool {
        self.completion.update_content_scroll(percent, &self.thresholds)
    }

    pub fn update_file_view(&mut self, seconds: u64) -> bool {
        self.completion.update_file_view(seconds, &self.thresholds)
    }

    /// Record a quiz result given as raw score out of total
    pub fn submit_quiz(
        &mut self,
        score: f64,
        total: f64,
        passing: f64,
    ) -> Result<QuizOutcome, TrackerError> {
        self.completion
            .submit_quiz(score, total, passing, &self.thresholds)
            .ok_or(TrackerError::QuizClosed)
    }

    /// Grade answers against the active lesson's quiz and record the result
    pub fn submit_quiz_answers(&mut self, answers: &[usize]) -> Result<QuizOutcome, TrackerError> {
        let quiz = self
            .current_lesson()
            .and_then(|l| l.content.quiz.as_ref())
            .filter(|q| !q.questions.is_empty())
            .ok_or(TrackerError::NoQuiz)?;

        let (correct, total) = quiz.grade(answers);
        let passing = quiz
            .passing_score
            .map(f64::from)
            .unwrap_or(self.thresholds.default_quiz_passing_score);

        self.submit_quiz(correct as f64, total as f64, passing)
    }

    /// Whether the active lesson's content has been consumed
    pub fn is_current_content_completed(&self) -> bool {
        let Some(lesson) = self.current_lesson() else {
            return false;
        };
        self.completion.is_complete_for(lesson.effective_kind(), &self.thresholds)
    }

    /// Declared or inferred type of the active lesson
    pub fn current_kind(&self) -> Option<LessonType> {
        self.current_lesson().and_then(Lesson::effective_kind)
    }

    // Completion

    /// Record the active lesson as completed.
    ///
    /// Unlocks the next lesson and, when this finishes the module, records
    /// the module (and possibly the course) too.
    pub async fn mark_lesson_completed(
        &mut self,
        lesson_id: &str,
        time_spent_seconds: u64,
    ) -> Result<CompletionReport, TrackerError> {
        let (module_idx, lesson_idx) = self.current.ok_or(TrackerError::EmptyCourse)?;
        let lesson = self
            .course
            .get_lesson(module_idx, lesson_idx)
            .filter(|l| l.id == lesson_id)
            .ok_or_else(|| TrackerError::NotActiveLesson(lesson_id.to_string()))?;

        let mut report = CompletionReport::default();
        if self.completed_lessons.contains(lesson_id) {
            self.settle_pending(&mut report).await;
            return Ok(report);
        }

        let module = &self.course.modules[module_idx];
        let completion = LessonCompletion {
            course_id: self.course.id.clone(),
            module_id: module.id.clone(),
            lesson_id: lesson.id.clone(),
            lesson_title: lesson.title.clone(),
            time_spent_seconds,
        };
        self.progress_api.record_lesson_completion(&completion).await?;

        tracing::info!("Lesson {} completed", lesson_id);
        self.completed_lessons.insert(lesson_id.to_string());
        *self.module_time.entry(completion.module_id.clone()).or_default() += time_spent_seconds;
        report.lessons.push(lesson_id.to_string());

        if let Some(next) = self.course.next_lesson_after(lesson_id) {
            if self.accessible_lessons.insert(next.id.clone()) {
                report.unlocked.push(next.id.clone());
            }
        }

        self.settle_pending(&mut report).await;
        Ok(report)
    }

    /// Record a module as completed
    pub async fn mark_module_completed(
        &mut self,
        module_id: &str,
    ) -> Result<CompletionReport, TrackerError> {
        let module_idx = self
            .course
            .locate_module(module_id)
            .ok_or_else(|| TrackerError::UnknownModule(module_id.to_string()))?;

        let mut report = CompletionReport::default();
        if self.completed_modules.contains(module_id) {
            return Ok(report);
        }
        self.complete_module(module_idx, &mut report).await?;
        self.settle_pending(&mut report).await;
        Ok(report)
    }

    /// Record, in order, every module whose lessons are all completed but whose
    /// completion is not saved yet, then the course once all modules are.
    /// Empty modules count as done. Stops at the first failure, which becomes a
    /// warning; the next completion or reload tries again.
    async fn settle_pending(&mut self, report: &mut CompletionReport) {
        for idx in 0..self.course.modules.len() {
            let module = &self.course.modules[idx];
            if self.completed_modules.contains(&module.id) {
                continue;
            }
            if !module.lessons.iter().all(|l| self.completed_lessons.contains(&l.id)) {
                return;
            }
            let module_id = module.id.clone();
            if let Err(e) = self.complete_module(idx, report).await {
                tracing::warn!("Failed to record module {} completion: {}", module_id, e);
                report.warnings.push(format!("Module completion not saved: {}", e));
                return;
            }
        }

        if !self.course.modules.is_empty() && !self.course_completed {
            if let Err(e) = self.complete_course(report).await {
                tracing::warn!("Failed to record course completion: {}", e);
                report.warnings.push(format!("Course completion not saved: {}", e));
            }
        }
    }

    async fn complete_module(
        &mut self,
        module_idx: usize,
        report: &mut CompletionReport,
    ) -> Result<(), TrackerError> {
        let module = &self.course.modules[module_idx];
        let completion = ModuleCompletion {
            course_id: self.course.id.clone(),
            module_id: module.id.clone(),
            module_title: module.title.clone(),
            time_spent_seconds: self.module_time.get(&module.id).copied().unwrap_or(0),
        };
        self.progress_api.record_module_completion(&completion).await?;

        tracing::info!("Module {} completed", completion.module_id);
        self.completed_modules.insert(completion.module_id.clone());
        report.modules.push(completion.module_id);

        if let Some(next_module) = self.course.modules.get(module_idx + 1) {
            self.accessible_modules.insert(next_module.id.clone());
            if let Some(first) = next_module.lessons.first() {
                if self.accessible_lessons.insert(first.id.clone()) {
                    report.unlocked.push(first.id.clone());
                }
            }
        }

        Ok(())
    }

    fn all_modules_completed(&self) -> bool {
        self.course.modules.iter().all(|m| self.completed_modules.contains(&m.id))
    }

    /// Record the course as completed and request a certificate
    pub async fn mark_course_completed(&mut self) -> Result<CompletionReport, TrackerError> {
        let mut report = CompletionReport::default();
        if self.course_completed {
            return Ok(report);
        }
        self.complete_course(&mut report).await?;
        Ok(report)
    }

    async fn complete_course(&mut self, report: &mut CompletionReport) -> Result<(), TrackerError> {
        let completion = CourseCompletion {
            course_id: self.course.id.clone(),
            course_title: self.course.title.clone(),
            completion_percentage: self.progress_percentage(),
            time_spent_seconds: self.module_time.values().sum(),
        };
        self.progress_api.record_course_completion(&completion).await?;

        tracing::info!("Course {} completed", self.course.id);
        self.course_completed = true;
        report.course_completed = true;

        // Best effort: a failed certificate never rolls back completion
        if let Some(api) = &self.certificate_api {
            match api.auto_generate_certificate(&self.course.id).await {
                Ok(certificate) => {
                    tracing::info!("Certificate {} issued", certificate.id);
                    report.certificate = Some(certificate);
                }
                Err(e) => {
                    tracing::warn!("Certificate generation failed: {}", e);
                    report.warnings.push(format!("Certificate not generated: {}", e));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{CourseProgress, ProgressEntry};
    use crate::course::{LessonContent, Module, Quiz, QuizQuestion};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeProgress {
        log: Vec<(String, String, Option<String>, Option<String>)>,
        fail_lessons: bool,
        fail_modules: bool,
        fail_courses: bool,
        calls: Mutex<Vec<String>>,
    }

    impl FakeProgress {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn with_log(entries: &[(&str, &str)]) -> Self {
            let log = entries
                .iter()
                .map(|(kind, id)| {
                    let (lesson, module) = if *kind == ProgressEntry::LESSON_COMPLETED {
                        (Some(id.to_string()), None)
                    } else {
                        (None, Some(id.to_string()))
                    };
                    (kind.to_string(), "completed".to_string(), lesson, module)
                })
                .collect();
            Self { log, ..Default::default() }
        }
    }

    fn failure() -> ApiError {
        ApiError::Status { status: 503, message: "unavailable".into() }
    }

    #[async_trait]
    impl ProgressApi for FakeProgress {
        async fn get_course_progress(&self, _course_id: &str) -> Result<CourseProgress, ApiError> {
            let detailed_progress = self
                .log
                .iter()
                .map(|(kind, status, lesson_id, module_id)| ProgressEntry {
                    kind: kind.clone(),
                    status: status.clone(),
                    lesson_id: lesson_id.clone(),
                    module_id: module_id.clone(),
                })
                .collect();
            Ok(CourseProgress { detailed_progress })
        }

        async fn record_lesson_completion(&self, c: &LessonCompletion) -> Result<(), ApiError> {
            if self.fail_lessons {
                return Err(failure());
            }
            self.calls.lock().unwrap().push(format!("lesson:{}", c.lesson_id));
            Ok(())
        }

        async fn record_module_completion(&self, c: &ModuleCompletion) -> Result<(), ApiError> {
            if self.fail_modules {
                return Err(failure());
            }
            self.calls.lock().unwrap().push(format!("module:{}", c.module_id));
            Ok(())
        }

        async fn record_course_completion(&self, c: &CourseCompletion) -> Result<(), ApiError> {
            if self.fail_courses {
                return Err(failure());
            }
            self.calls
                .lock()
                .unwrap()
                .push(format!("course:{}:{}", c.course_id, c.completion_percentage));
            Ok(())
        }
    }

    struct FakeCertificates {
        fail: bool,
    }

    #[async_trait]
    impl CertificateApi for FakeCertificates {
        async fn auto_generate_certificate(&self, course_id: &str) -> Result<Certificate, ApiError> {
            if self.fail {
                return Err(failure());
            }
            Ok(Certificate {
                id: format!("cert-{}", course_id),
                certificate_number: None,
                issued_at: None,
                url: None,
            })
        }
    }

    fn video(id: &str, pos: i32) -> Lesson {
        Lesson::new(id, format!("Video {}", id), pos).with_kind(LessonType::Video)
    }

    fn quiz(id: &str, pos: i32) -> Lesson {
        Lesson::new(id, format!("Quiz {}", id), pos).with_kind(LessonType::Quiz).with_content(
            LessonContent {
                quiz: Some(Quiz {
                    questions: vec![QuizQuestion {
                        prompt: "2+2?".into(),
                        options: vec!["3".into(), "4".into()],
                        answer_index: 1,
                    }],
                    passing_score: Some(100.0),
                }),
                ..Default::default()
            },
        )
    }

    /// One module with a video and a quiz
    fn small_course() -> Course {
        let mut course = Course::new("c1", "Intro");
        course.modules.push(
            Module::new("m1", "Basics", 1).with_lesson(video("l1", 1)).with_lesson(quiz("l2", 2)),
        );
        course
    }

    /// Two modules, two and one lessons
    fn two_module_course() -> Course {
        let mut course = Course::new("c2", "Two");
        course.modules.push(
            Module::new("m1", "First", 1).with_lesson(video("a", 1)).with_lesson(video("b", 2)),
        );
        course.modules.push(Module::new("m2", "Second", 2).with_lesson(video("c", 1)));
        course
    }

    fn tracker(course: Course, api: Arc<FakeProgress>) -> SequentialTracker {
        SequentialTracker::new(course, api, CompletionThresholds::default())
    }

    fn ids(set: &HashSet<String>) -> Vec<String> {
        let mut v: Vec<String> = set.iter().cloned().collect();
        v.sort();
        v
    }

    #[test]
    fn first_lesson_accessible_at_start() {
        let t = tracker(small_course(), Arc::new(FakeProgress::default()));
        assert_eq!(ids(t.accessible_lessons()), vec!["l1"]);
        assert_eq!(t.current_position(), Some((0, 0)));
        assert!(t.is_module_accessible("m1"));
    }

    #[tokio::test]
    async fn video_then_quiz_scenario() {
        let api = Arc::new(FakeProgress::default());
        let mut t = tracker(small_course(), api.clone());

        assert!(t.update_video_progress(96.0, 100.0));
        assert!(t.is_current_content_completed());
        let report = t.mark_lesson_completed("l1", 120).await.unwrap();

        assert_eq!(ids(t.completed_lessons()), vec!["l1"]);
        assert_eq!(ids(t.accessible_lessons()), vec!["l1", "l2"]);
        assert_eq!(report.unlocked, vec!["l2".to_string()]);
        assert!(!t.is_module_completed("m1"));

        t.navigate_to_next().unwrap();
        assert!(!t.is_current_content_completed());
        assert_eq!(t.submit_quiz_answers(&[1]).unwrap(), QuizOutcome::Passed { percent: 100.0 });
        let report = t.mark_lesson_completed("l2", 60).await.unwrap();

        assert!(t.is_module_completed("m1"));
        assert!(t.is_course_completed());
        assert_eq!(report.modules, vec!["m1".to_string()]);
        assert!(report.course_completed);
        assert_eq!(api.calls(), vec!["lesson:l1", "lesson:l2", "module:m1", "course:c1:100"]);
    }

    #[test]
    fn failed_quiz_twice_stays_incomplete() {
        let mut t = tracker(small_course(), Arc::new(FakeProgress::default()));
        t.completed_lessons.insert("l1".into());
        t.recompute_access();
        t.navigate_to_lesson(0, 1).unwrap();

        t.submit_quiz(60.0, 100.0, 70.0).unwrap();
        t.submit_quiz(60.0, 100.0, 70.0).unwrap();

        let state = t.completion_state();
        assert_eq!(state.quiz_attempts, 2);
        assert!(state.quiz_completed);
        assert!(!state.quiz_passed);
        assert!(!t.is_current_content_completed());
        assert!(matches!(t.submit_quiz(90.0, 100.0, 70.0), Err(TrackerError::QuizClosed)));
    }

    #[tokio::test]
    async fn last_lesson_of_module_unlocks_next_module() {
        let api = Arc::new(FakeProgress::default());
        let mut t = tracker(two_module_course(), api.clone());

        t.mark_lesson_completed("a", 10).await.unwrap();
        t.navigate_to_lesson(0, 1).unwrap();
        let report = t.mark_lesson_completed("b", 10).await.unwrap();

        assert!(t.is_module_completed("m1"));
        assert!(t.is_module_accessible("m2"));
        assert!(t.is_lesson_accessible("c"));
        assert_eq!(report.unlocked, vec!["c".to_string()]);
        assert!(!t.is_course_completed());
    }

    #[test]
    fn locked_lesson_cannot_be_opened() {
        let mut t = tracker(two_module_course(), Arc::new(FakeProgress::default()));
        let err = t.navigate_to_lesson(1, 0).unwrap_err();

        assert!(matches!(err, TrackerError::Locked { ref lesson_id } if lesson_id == "c"));
        assert_eq!(t.current_position(), Some((0, 0)));
        assert!(matches!(
            t.navigate_to_lesson(5, 0),
            Err(TrackerError::OutOfRange { module: 5, lesson: 0 })
        ));
    }

    #[test]
    fn next_is_only_blocked_by_boundaries() {
        let mut t = tracker(two_module_course(), Arc::new(FakeProgress::default()));
        assert_eq!(t.navigate_to_next().unwrap(), (0, 1));
        assert_eq!(t.navigate_to_next().unwrap(), (1, 0));
        assert!(matches!(t.navigate_to_next(), Err(TrackerError::AtBoundary("last"))));
        assert_eq!(t.navigate_to_previous().unwrap(), (0, 1));
    }

    #[test]
    fn changing_lesson_resets_completion_state() {
        let mut t = tracker(two_module_course(), Arc::new(FakeProgress::default()));
        t.update_video_progress(99.0, 100.0);
        t.navigate_to_lesson(0, 0).unwrap();
        assert!(t.completion_state().video_watched);

        t.navigate_to_next().unwrap();
        assert_eq!(*t.completion_state(), ContentCompletionState::default());
    }

    #[tokio::test]
    async fn completing_inactive_lesson_is_rejected() {
        let api = Arc::new(FakeProgress::default());
        let mut t = tracker(two_module_course(), api.clone());

        let err = t.mark_lesson_completed("b", 5).await.unwrap_err();
        assert!(matches!(err, TrackerError::NotActiveLesson(ref id) if id == "b"));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn remote_failure_leaves_sets_unchanged() {
        let api = Arc::new(FakeProgress { fail_lessons: true, ..Default::default() });
        let mut t = tracker(two_module_course(), api);

        let err = t.mark_lesson_completed("a", 5).await.unwrap_err();
        assert!(matches!(err, TrackerError::Remote(_)));
        assert!(t.completed_lessons().is_empty());
        assert_eq!(ids(t.accessible_lessons()), vec!["a"]);
    }

    #[tokio::test]
    async fn module_failure_keeps_lesson_completion() {
        let api = Arc::new(FakeProgress { fail_modules: true, ..Default::default() });
        let mut course = Course::new("c", "C");
        course.modules.push(Module::new("m1", "Only", 1).with_lesson(video("a", 1)));
        let mut t = tracker(course, api);

        let report = t.mark_lesson_completed("a", 5).await.unwrap();
        assert!(t.is_lesson_completed("a"));
        assert!(!t.is_module_completed("m1"));
        assert_eq!(report.warnings.len(), 1);
    }

    #[tokio::test]
    async fn failed_module_completion_is_retried() {
        let mut t = tracker(
            two_module_course(),
            Arc::new(FakeProgress { fail_modules: true, ..Default::default() }),
        );
        t.mark_lesson_completed("a", 5).await.unwrap();
        t.navigate_to_lesson(0, 1).unwrap();
        let report = t.mark_lesson_completed("b", 5).await.unwrap();
        assert_eq!(report.warnings.len(), 1);
        assert!(!t.is_module_accessible("m2"));

        let healthy = Arc::new(FakeProgress::default());
        let swapped: Arc<dyn ProgressApi> = healthy.clone();
        t.progress_api = swapped;
        let report = t.mark_lesson_completed("b", 5).await.unwrap();

        assert_eq!(report.modules, vec!["m1".to_string()]);
        assert!(t.is_module_completed("m1"));
        assert!(t.is_module_accessible("m2"));
        assert_eq!(healthy.calls(), vec!["module:m1"]);
    }

    #[tokio::test]
    async fn failed_course_completion_is_retried() {
        let mut course = Course::new("c", "C");
        course.modules.push(Module::new("m1", "Only", 1).with_lesson(video("a", 1)));
        let mut t = tracker(
            course,
            Arc::new(FakeProgress { fail_courses: true, ..Default::default() }),
        );

        let report = t.mark_lesson_completed("a", 5).await.unwrap();
        assert!(t.is_module_completed("m1"));
        assert!(!t.is_course_completed());
        assert_eq!(report.warnings.len(), 1);

        let healthy = Arc::new(FakeProgress::default());
        let swapped: Arc<dyn ProgressApi> = healthy.clone();
        t.progress_api = swapped;
        let report = t.mark_lesson_completed("a", 5).await.unwrap();
        assert!(report.course_completed);
        assert_eq!(healthy.calls(), vec!["course:c:100"]);
    }

    #[tokio::test]
    async fn empty_module_does_not_block_course_completion() {
        let api = Arc::new(FakeProgress::default());
        let mut course = Course::new("c", "C");
        course.modules.push(Module::new("m1", "Work", 1).with_lesson(video("a", 1)));
        course.modules.push(Module::new("m2", "Placeholder", 2));
        let mut t = tracker(course, api.clone());

        let report = t.mark_lesson_completed("a", 5).await.unwrap();
        assert_eq!(report.modules, vec!["m1".to_string(), "m2".to_string()]);
        assert!(t.is_course_completed());
        assert_eq!(api.calls(), vec!["lesson:a", "module:m1", "module:m2", "course:c:100"]);
    }

    #[tokio::test]
    async fn load_progress_saves_modules_missing_from_log() {
        let api = Arc::new(FakeProgress::with_log(&[
            (ProgressEntry::LESSON_COMPLETED, "a"),
            (ProgressEntry::LESSON_COMPLETED, "b"),
            (ProgressEntry::LESSON_COMPLETED, "c"),
        ]));
        let mut t = tracker(two_module_course(), api.clone());

        let report = t.load_progress().await.unwrap();
        assert_eq!(report.modules, vec!["m1".to_string(), "m2".to_string()]);
        assert!(t.is_module_completed("m1"));
        assert!(t.is_module_completed("m2"));
        assert!(t.is_course_completed());
        assert_eq!(api.calls(), vec!["module:m1", "module:m2", "course:c2:100"]);
    }

    #[tokio::test]
    async fn load_progress_keeps_going_when_module_save_fails() {
        let mut api = FakeProgress::with_log(&[
            (ProgressEntry::LESSON_COMPLETED, "a"),
            (ProgressEntry::LESSON_COMPLETED, "b"),
        ]);
        api.fail_modules = true;
        let mut t = tracker(two_module_course(), Arc::new(api));

        let report = t.load_progress().await.unwrap();
        assert_eq!(report.warnings.len(), 1);
        assert!(!t.is_module_completed("m1"));
        assert_eq!(ids(t.completed_lessons()), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn completing_twice_makes_one_call() {
        let api = Arc::new(FakeProgress::default());
        let mut t = tracker(two_module_course(), api.clone());

        t.mark_lesson_completed("a", 5).await.unwrap();
        let report = t.mark_lesson_completed("a", 5).await.unwrap();
        assert!(report.is_empty());
        assert_eq!(api.calls(), vec!["lesson:a"]);
    }

    #[tokio::test]
    async fn certificate_failure_keeps_course_completion() {
        let api = Arc::new(FakeProgress::default());
        let mut course = Course::new("c", "C");
        course.modules.push(Module::new("m1", "Only", 1).with_lesson(video("a", 1)));
        let mut t = tracker(course, api).with_certificates(Arc::new(FakeCertificates { fail: true }));

        let report = t.mark_lesson_completed("a", 5).await.unwrap();
        assert!(t.is_course_completed());
        assert!(report.course_completed);
        assert!(report.certificate.is_none());
        assert_eq!(report.warnings.len(), 1);
    }

    #[tokio::test]
    async fn course_completion_issues_certificate() {
        let api = Arc::new(FakeProgress::default());
        let mut t = tracker(small_course(), api)
            .with_certificates(Arc::new(FakeCertificates { fail: false }));

        let report = t.mark_course_completed().await.unwrap();
        assert_eq!(report.certificate.map(|c| c.id), Some("cert-c1".to_string()));
        assert!(t.mark_course_completed().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn load_progress_rehydrates_and_resumes() {
        let api = Arc::new(FakeProgress::with_log(&[
            (ProgressEntry::LESSON_COMPLETED, "a"),
            (ProgressEntry::LESSON_COMPLETED, "b"),
            (ProgressEntry::MODULE_COMPLETED, "m1"),
            (ProgressEntry::LESSON_COMPLETED, "unknown"),
        ]));
        let mut t = tracker(two_module_course(), api);

        t.load_progress().await.unwrap();
        assert_eq!(ids(t.completed_lessons()), vec!["a", "b"]);
        assert_eq!(ids(t.accessible_lessons()), vec!["a", "b", "c"]);
        assert!(t.is_module_accessible("m2"));
        assert_eq!(t.current_position(), Some((1, 0)));
        assert!(!t.is_course_completed());
    }

    #[tokio::test]
    async fn mark_module_completed_by_id() {
        let api = Arc::new(FakeProgress::default());
        let mut t = tracker(two_module_course(), api.clone());

        let report = t.mark_module_completed("m1").await.unwrap();
        assert_eq!(report.modules, vec!["m1".to_string()]);
        assert!(t.is_lesson_accessible("c"));
        assert!(matches!(
            t.mark_module_completed("nope").await,
            Err(TrackerError::UnknownModule(_))
        ));
    }

    #[test]
    fn empty_course_has_no_position() {
        let mut t = tracker(Course::new("e", "Empty"), Arc::new(FakeProgress::default()));
        assert_eq!(t.current_position(), None);
        assert!(!t.is_current_content_completed());
        assert!(matches!(t.navigate_to_next(), Err(TrackerError::EmptyCourse)));
        assert_eq!(t.progress_percentage(), 0.0);
    }
}
