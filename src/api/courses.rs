//! Course, module and lesson endpoints

use async_trait::async_trait;
use serde::de::IgnoredAny;

use super::client::ApiClient;
use super::error::ApiError;
use super::models::{CourseDto, CourseSummary};
use crate::course::{Course, CourseDraft, LessonDraft, ModuleDraft};

/// Course list and tree access, plus the writes the catalog performs
#[async_trait]
pub trait CourseApi: Send + Sync {
    async fn list_courses(&self) -> Result<Vec<CourseSummary>, ApiError>;

    /// Fetch a course with its full module/lesson tree, sorted by position
    async fn get_course(&self, course_id: &str) -> Result<Course, ApiError>;

    async fn update_course(&self, course_id: &str, draft: &CourseDraft) -> Result<(), ApiError>;

    async fn delete_course(&self, course_id: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl CourseApi for ApiClient {
    async fn list_courses(&self) -> Result<Vec<CourseSummary>, ApiError> {
        self.get("courses").await
    }

    async fn get_course(&self, course_id: &str) -> Result<Course, ApiError> {
        let dto: CourseDto = self.get(&format!("courses/{}", course_id)).await?;
        Ok(dto.into())
    }

    async fn update_course(&self, course_id: &str, draft: &CourseDraft) -> Result<(), ApiError> {
        self.put::<_, IgnoredAny>(&format!("courses/{}", course_id), draft).await?;
        Ok(())
    }

    async fn delete_course(&self, course_id: &str) -> Result<(), ApiError> {
        self.delete(&format!("courses/{}", course_id)).await
    }
}

impl ApiClient {
    /// Create a course from a validated draft
    pub async fn create_course(&self, draft: &CourseDraft) -> Result<CourseSummary, ApiError> {
        self.post("courses", draft).await
    }

    /// Append a module to a course
    pub async fn create_module(
        &self,
        course_id: &str,
        draft: &ModuleDraft,
    ) -> Result<IgnoredAny, ApiError> {
        self.post(&format!("courses/{}/modules", course_id), draft).await
    }

    pub async fn update_module(&self, module_id: &str, draft: &ModuleDraft) -> Result<(), ApiError> {
        self.put::<_, IgnoredAny>(&format!("modules/{}", module_id), draft).await?;
        Ok(())
    }

    pub async fn delete_module(&self, module_id: &str) -> Result<(), ApiError> {
        self.delete(&format!("modules/{}", module_id)).await
    }

    /// Append a lesson to a module
    pub async fn create_lesson(
        &self,
        module_id: &str,
        draft: &LessonDraft,
    ) -> Result<IgnoredAny, ApiError> {
        self.post(&format!("modules/{}/lessons", module_id), draft).await
    }

    pub async fn update_lesson(&self, lesson_id: &str, draft: &LessonDraft) -> Result<(), ApiError> {
        self.put::<_, IgnoredAny>(&format!("lessons/{}", lesson_id), draft).await?;
        Ok(())
    }

    pub async fn delete_lesson(&self, lesson_id: &str) -> Result<(), ApiError> {
        self.delete(&format!("lessons/{}", lesson_id)).await
    }
}
