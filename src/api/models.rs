//! Wire models for LMS API requests and responses
//!
//! Server ids arrive either as strings or numbers (and sometimes as `_id`);
//! they are normalized to `String` on the way in.

use serde::{Deserialize, Deserializer, Serialize};

use crate::config::session::{Role, User};
use crate::course::{Course, Lesson, LessonContent, LessonType, Module, Quiz, QuizQuestion};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Int(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Int(n) => n.to_string(),
        }
    }
}

/// Deserialize an id that may be a string or a number
pub fn flexible_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    RawId::deserialize(deserializer).map(String::from)
}

/// Optional variant of [`flexible_id`]
pub fn flexible_id_opt<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Option::<RawId>::deserialize(deserializer).map(|raw| raw.map(String::from))
}

/// Responses may be wrapped as `{"data": ...}`
#[derive(Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

/// Login request body
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Login response body
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "accessToken")]
    pub token: String,
    pub user: UserDto,
}

/// User as returned by the auth endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct UserDto {
    #[serde(alias = "_id", deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default, alias = "fullName")]
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<UserDto> for User {
    fn from(dto: UserDto) -> Self {
        let name = if dto.name.trim().is_empty() { dto.email.clone() } else { dto.name };
        User { id: dto.id, name, email: dto.email, role: dto.role }
    }
}

/// Course row in list responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    #[serde(alias = "_id", deserialize_with = "flexible_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub instructor_name: Option<String>,
    #[serde(default)]
    pub published: bool,
    /// Student progress percentage when the server includes it
    #[serde(default)]
    pub progress: Option<f64>,
}

/// Full course with its module/lesson tree
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDto {
    #[serde(alias = "_id", deserialize_with = "flexible_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub instructor_name: Option<String>,
    #[serde(default)]
    pub modules: Vec<ModuleDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModuleDto {
    #[serde(alias = "_id", deserialize_with = "flexible_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub lessons: Vec<LessonDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonDto {
    #[serde(alias = "_id", deserialize_with = "flexible_id")]
    pub id: String,
    pub title: String,
    #[serde(default, rename = "type", alias = "contentType")]
    pub kind: Option<String>,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub points: Option<u32>,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub quiz: Option<QuizDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizDto {
    #[serde(default)]
    pub questions: Vec<QuizQuestionDto>,
    #[serde(default)]
    pub passing_score: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestionDto {
    #[serde(alias = "prompt")]
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default, alias = "answerIndex")]
    pub correct_answer: usize,
}

impl From<CourseDto> for Course {
    fn from(dto: CourseDto) -> Self {
        let mut course = Course {
            id: dto.id,
            title: dto.title,
            description: dto.description,
            instructor: dto.instructor_name,
            modules: dto.modules.into_iter().map(Module::from).collect(),
        };
        course.sort_by_position();
        course
    }
}

impl From<ModuleDto> for Module {
    fn from(dto: ModuleDto) -> Self {
        Module {
            id: dto.id,
            title: dto.title,
            position: dto.position,
            lessons: dto.lessons.into_iter().map(Lesson::from).collect(),
        }
    }
}

impl From<LessonDto> for Lesson {
    fn from(dto: LessonDto) -> Self {
        Lesson {
            id: dto.id,
            title: dto.title,
            kind: dto.kind.as_deref().and_then(LessonType::parse),
            duration_seconds: dto.duration.unwrap_or(0),
            points: dto.points.unwrap_or(0),
            position: dto.position,
            content: LessonContent {
                video_url: dto.video_url,
                text: dto.content,
                file_url: dto.file_url,
                quiz: dto.quiz.map(Quiz::from),
            },
        }
    }
}

impl From<QuizDto> for Quiz {
    fn from(dto: QuizDto) -> Self {
        Quiz {
            questions: dto
                .questions
                .into_iter()
                .map(|q| QuizQuestion {
                    prompt: q.question,
                    options: q.options,
                    answer_index: q.correct_answer,
                })
                .collect(),
            passing_score: dto.passing_score,
        }
    }
}

/// One row of the remote progress log
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressEntry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, alias = "lessonId", deserialize_with = "flexible_id_opt")]
    pub lesson_id: Option<String>,
    #[serde(default, alias = "moduleId", deserialize_with = "flexible_id_opt")]
    pub module_id: Option<String>,
}

impl ProgressEntry {
    pub const LESSON_COMPLETED: &'static str = "lesson_completed";
    pub const MODULE_COMPLETED: &'static str = "module_completed";

    fn is_completed(&self) -> bool {
        self.status.eq_ignore_ascii_case("completed")
    }

    /// Lesson id if this row records a completed lesson
    pub fn completed_lesson(&self) -> Option<&str> {
        (self.kind == Self::LESSON_COMPLETED && self.is_completed())
            .then_some(self.lesson_id.as_deref())
            .flatten()
    }

    /// Module id if this row records a completed module
    pub fn completed_module(&self) -> Option<&str> {
        (self.kind == Self::MODULE_COMPLETED && self.is_completed())
            .then_some(self.module_id.as_deref())
            .flatten()
    }
}

/// Response of the course progress query
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgress {
    #[serde(default)]
    pub detailed_progress: Vec<ProgressEntry>,
}

/// Body of the lesson completion call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonCompletion {
    pub course_id: String,
    pub module_id: String,
    pub lesson_id: String,
    pub lesson_title: String,
    pub time_spent_seconds: u64,
}

/// Body of the module completion call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleCompletion {
    pub course_id: String,
    pub module_id: String,
    pub module_title: String,
    pub time_spent_seconds: u64,
}

/// Body of the course completion call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseCompletion {
    pub course_id: String,
    pub course_title: String,
    pub completion_percentage: f64,
    pub time_spent_seconds: u64,
}

/// Certificate issued for a completed course
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    #[serde(alias = "_id", deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default)]
    pub certificate_number: Option<String>,
    #[serde(default)]
    pub issued_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, alias = "downloadUrl")]
    pub url: Option<String>,
}
