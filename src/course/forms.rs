//! Course, module and lesson drafts used by the teacher-side CRUD forms
//!
//! Drafts are validated locally before anything is sent to the server.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::model::{LessonType, Module, Quiz};

/// Maximum title length accepted by the forms
pub const MAX_TITLE_LEN: usize = 200;

/// Validation failures for course forms
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("Title is required")]
    MissingTitle,

    #[error("Title must be at most {} characters", MAX_TITLE_LEN)]
    TitleTooLong,

    #[error("A {0} lesson needs its content")]
    MissingContent(LessonType),

    #[error("Question {0} needs at least two options")]
    TooFewOptions(usize),

    #[error("Question {0} has an answer outside its options")]
    AnswerOutOfRange(usize),

    #[error("Passing score must be between 0 and 100")]
    PassingScoreOutOfRange,
}

fn validate_title(title: &str) -> Result<String, FormError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(FormError::MissingTitle);
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(FormError::TitleTooLong);
    }
    Ok(title.to_string())
}

/// Course create/update form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub published: bool,
}

impl CourseDraft {
    /// Return a normalized copy, or the first validation error
    pub fn validate(&self) -> Result<Self, FormError> {
        Ok(Self {
            title: validate_title(&self.title)?,
            description: normalize_optional(&self.description),
            category: normalize_optional(&self.category),
            published: self.published,
        })
    }
}

/// Module create/update form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDraft {
    pub title: String,
    pub position: i32,
}

impl ModuleDraft {
    /// Draft for a module appended after the existing ones
    pub fn appended(title: impl Into<String>, existing: &[Module]) -> Self {
        Self { title: title.into(), position: next_position(existing.iter().map(|m| m.position)) }
    }

    pub fn validate(&self) -> Result<Self, FormError> {
        Ok(Self { title: validate_title(&self.title)?, position: self.position })
    }
}

/// Lesson create/update form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonDraft {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: Option<LessonType>,
    pub position: i32,
    pub duration: u32,
    pub points: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz: Option<Quiz>,
}

impl LessonDraft {
    /// Validate title and type-specific content
    pub fn validate(&self) -> Result<Self, FormError> {
        let mut draft = self.clone();
        draft.title = validate_title(&self.title)?;
        draft.video_url = normalize_optional(&self.video_url);
        draft.content = normalize_optional(&self.content);
        draft.file_url = normalize_optional(&self.file_url);

        match draft.kind {
            Some(LessonType::Video) if draft.video_url.is_none() => {
                return Err(FormError::MissingContent(LessonType::Video));
            }
            Some(LessonType::File) if draft.file_url.is_none() => {
                return Err(FormError::MissingContent(LessonType::File));
            }
            Some(LessonType::Text) if draft.content.is_none() => {
                return Err(FormError::MissingContent(LessonType::Text));
            }
            Some(LessonType::Quiz) => validate_quiz(draft.quiz.as_ref())?,
            _ => {}
        }

        Ok(draft)
    }
}

fn validate_quiz(quiz: Option<&Quiz>) -> Result<(), FormError> {
    let Some(quiz) = quiz.filter(|q| !q.questions.is_empty()) else {
        return Err(FormError::MissingContent(LessonType::Quiz));
    };

    for (idx, question) in quiz.questions.iter().enumerate() {
        let number = idx + 1;
        if question.options.len() < 2 {
            return Err(FormError::TooFewOptions(number));
        }
        if question.answer_index >= question.options.len() {
            return Err(FormError::AnswerOutOfRange(number));
        }
    }

    if let Some(score) = quiz.passing_score {
        if !(0.0..=100.0).contains(&score) {
            return Err(FormError::PassingScoreOutOfRange);
        }
    }

    Ok(())
}

/// Next free position: one past the largest existing one
pub fn next_position(existing: impl Iterator<Item = i32>) -> i32 {
    existing.max().map_or(1, |p| p + 1)
}

fn normalize_optional(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::model::QuizQuestion;

    #[test]
    fn course_title_is_trimmed() {
        let draft = CourseDraft { title: "  Rust  ".into(), ..Default::default() };
        assert_eq!(draft.validate().unwrap().title, "Rust");
    }

    #[test]
    fn blank_title_is_rejected() {
        let draft = CourseDraft { title: "   ".into(), ..Default::default() };
        assert_eq!(draft.validate().unwrap_err(), FormError::MissingTitle);
    }

    #[test]
    fn overlong_title_is_rejected() {
        let draft = ModuleDraft { title: "x".repeat(MAX_TITLE_LEN + 1), position: 1 };
        assert_eq!(draft.validate().unwrap_err(), FormError::TitleTooLong);
    }

    #[test]
    fn appended_module_takes_next_position() {
        let modules = vec![Module::new("a", "A", 1), Module::new("b", "B", 4)];
        assert_eq!(ModuleDraft::appended("C", &modules).position, 5);
        assert_eq!(ModuleDraft::appended("First", &[]).position, 1);
    }

    #[test]
    fn video_lesson_needs_url() {
        let draft = LessonDraft {
            title: "Intro".into(),
            kind: Some(LessonType::Video),
            video_url: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(draft.validate().unwrap_err(), FormError::MissingContent(LessonType::Video));
    }

    #[test]
    fn quiz_lesson_checks_questions() {
        let mut draft = LessonDraft {
            title: "Check".into(),
            kind: Some(LessonType::Quiz),
            quiz: Some(Quiz {
                questions: vec![QuizQuestion {
                    prompt: "?".into(),
                    options: vec!["a".into(), "b".into()],
                    answer_index: 2,
                }],
                passing_score: Some(70.0),
            }),
            ..Default::default()
        };
        assert_eq!(draft.validate().unwrap_err(), FormError::AnswerOutOfRange(1));

        if let Some(quiz) = draft.quiz.as_mut() {
            quiz.questions[0].answer_index = 1;
            quiz.passing_score = Some(120.0);
        }
        assert_eq!(draft.validate().unwrap_err(), FormError::PassingScoreOutOfRange);
    }

    #[test]
    fn untyped_lesson_passes_without_content() {
        let draft = LessonDraft { title: "Misc".into(), ..Default::default() };
        assert!(draft.validate().is_ok());
    }
}
