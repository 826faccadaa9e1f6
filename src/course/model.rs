//! Content model for courses
//!
//! A course is an ordered list of modules, each an ordered list of lessons.
//! Lessons carry a declared content type plus whichever content fields the
//! server populated. Order is by `position`, and the "flattened" order used
//! for sequential unlocking is module order, then lesson order within a module.

use serde::{Deserialize, Serialize};

/// Declared type of a lesson's content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonType {
    Video,
    Quiz,
    Text,
    File,
}

impl LessonType {
    /// Parse a lesson type as sent by the server
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "video" => Some(Self::Video),
            "quiz" => Some(Self::Quiz),
            "text" | "article" | "reading" => Some(Self::Text),
            "file" | "document" | "pdf" => Some(Self::File),
            _ => None,
        }
    }

    /// Short label for display
    pub fn label(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Quiz => "quiz",
            Self::Text => "text",
            Self::File => "file",
        }
    }
}

impl std::fmt::Display for LessonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A complete course tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub instructor: Option<String>,
    /// Modules in order
    pub modules: Vec<Module>,
}

impl Course {
    /// Create an empty course
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self { id: id.into(), title: title.into(), ..Default::default() }
    }

    /// Sort modules and their lessons by position (stable, so ties keep server order)
    pub fn sort_by_position(&mut self) {
        self.modules.sort_by_key(|m| m.position);
        for module in &mut self.modules {
            module.lessons.sort_by_key(|l| l.position);
        }
    }

    /// Total lesson count across all modules
    pub fn lesson_count(&self) -> usize {
        self.modules.iter().map(|m| m.lessons.len()).sum()
    }

    /// Get a module by index
    pub fn get_module(&self, module_idx: usize) -> Option<&Module> {
        self.modules.get(module_idx)
    }

    /// Get a lesson by module and lesson index
    pub fn get_lesson(&self, module_idx: usize, lesson_idx: usize) -> Option<&Lesson> {
        self.modules.get(module_idx).and_then(|m| m.lessons.get(lesson_idx))
    }

    /// Locate a lesson by id, returning its (module, lesson) indices
    pub fn locate_lesson(&self, lesson_id: &str) -> Option<(usize, usize)> {
        self.flattened().find(|(_, _, l)| l.id == lesson_id).map(|(m, l, _)| (m, l))
    }

    /// Locate a module by id
    pub fn locate_module(&self, module_id: &str) -> Option<usize> {
        self.modules.iter().position(|m| m.id == module_id)
    }

    /// Iterate over all lessons in flattened (module, then lesson) order
    pub fn flattened(&self) -> impl Iterator<Item = (usize, usize, &Lesson)> {
        self.modules.iter().enumerate().flat_map(|(module_idx, module)| {
            module.lessons.iter().enumerate().map(move |(lesson_idx, l)| (module_idx, lesson_idx, l))
        })
    }

    /// The first lesson of the first non-empty module
    pub fn first_lesson(&self) -> Option<(usize, usize)> {
        self.flattened().next().map(|(m, l, _)| (m, l))
    }

    /// Position of the lesson after (module_idx, lesson_idx) in flattened order
    pub fn next_position(&self, module_idx: usize, lesson_idx: usize) -> Option<(usize, usize)> {
        let module = self.modules.get(module_idx)?;
        if lesson_idx + 1 < module.lessons.len() {
            return Some((module_idx, lesson_idx + 1));
        }
        self.modules
            .iter()
            .enumerate()
            .skip(module_idx + 1)
            .find(|(_, m)| !m.lessons.is_empty())
            .map(|(idx, _)| (idx, 0))
    }

    /// Position of the lesson before (module_idx, lesson_idx) in flattened order
    pub fn previous_position(
        &self,
        module_idx: usize,
        lesson_idx: usize,
    ) -> Option<(usize, usize)> {
        if lesson_idx > 0 {
            return Some((module_idx, lesson_idx - 1));
        }
        self.modules
            .iter()
            .enumerate()
            .take(module_idx)
            .rev()
            .find(|(_, m)| !m.lessons.is_empty())
            .map(|(idx, m)| (idx, m.lessons.len() - 1))
    }

    /// The lesson following `lesson_id` in flattened order
    pub fn next_lesson_after(&self, lesson_id: &str) -> Option<&Lesson> {
        let (m, l) = self.locate_lesson(lesson_id)?;
        let (nm, nl) = self.next_position(m, l)?;
        self.get_lesson(nm, nl)
    }

    /// Total declared duration of all lessons, in seconds
    pub fn total_duration_seconds(&self) -> u64 {
        self.flattened().map(|(_, _, l)| l.duration_seconds as u64).sum()
    }
}

/// An ordered group of lessons
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub id: String,
    pub title: String,
    pub position: i32,
    pub lessons: Vec<Lesson>,
}

impl Module {
    pub fn new(id: impl Into<String>, title: impl Into<String>, position: i32) -> Self {
        Self { id: id.into(), title: title.into(), position, lessons: Vec::new() }
    }

    /// Builder-style lesson append
    pub fn with_lesson(mut self, lesson: Lesson) -> Self {
        self.lessons.push(lesson);
        self
    }
}

/// An atomic unit of course content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    /// Declared type; `None` when the server sent nothing recognizable
    pub kind: Option<LessonType>,
    pub duration_seconds: u32,
    pub points: u32,
    pub position: i32,
    pub content: LessonContent,
}

impl Lesson {
    /// Create a lesson with no content
    pub fn new(id: impl Into<String>, title: impl Into<String>, position: i32) -> Self {
        Self { id: id.into(), title: title.into(), position, ..Default::default() }
    }

    /// Set the declared type
    pub fn with_kind(mut self, kind: LessonType) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Set the content fields
    pub fn with_content(mut self, content: LessonContent) -> Self {
        self.content = content;
        self
    }

    /// The declared type, or one inferred from populated content fields.
    ///
    /// Inference order is video, quiz, file, then text.
    pub fn effective_kind(&self) -> Option<LessonType> {
        self.kind.or_else(|| self.content.inferred_kind())
    }
}

/// Content payload of a lesson
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LessonContent {
    pub video_url: Option<String>,
    pub text: Option<String>,
    pub file_url: Option<String>,
    pub quiz: Option<Quiz>,
}

impl LessonContent {
    fn inferred_kind(&self) -> Option<LessonType> {
        if self.video_url.as_deref().is_some_and(|s| !s.is_empty()) {
            Some(LessonType::Video)
        } else if self.quiz.as_ref().is_some_and(|q| !q.questions.is_empty()) {
            Some(LessonType::Quiz)
        } else if self.file_url.as_deref().is_some_and(|s| !s.is_empty()) {
            Some(LessonType::File)
        } else if self.text.as_deref().is_some_and(|s| !s.trim().is_empty()) {
            Some(LessonType::Text)
        } else {
            None
        }
    }
}

/// Quiz attached to a lesson
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub questions: Vec<QuizQuestion>,
    /// Passing percentage (0-100); falls back to the configured default
    pub passing_score: Option<f32>,
}

impl Quiz {
    /// Grade a set of answers (one option index per question)
    ///
    /// Returns (correct, total). Missing answers count as wrong.
    pub fn grade(&self, answers: &[usize]) -> (u32, u32) {
        let correct = self
            .questions
            .iter()
            .enumerate()
            .filter(|(i, q)| answers.get(*i) == Some(&q.answer_index))
            .count();
        (correct as u32, self.questions.len() as u32)
    }
}

/// A single multiple-choice question
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub prompt: String,
    pub options: Vec<String>,
    pub answer_index: usize,
}
