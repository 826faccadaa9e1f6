//! Course content model and editing forms

pub mod forms;
pub mod model;

pub use forms::{CourseDraft, FormError, LessonDraft, ModuleDraft};
pub use model::{Course, Lesson, LessonContent, LessonType, Module, Quiz, QuizQuestion};
