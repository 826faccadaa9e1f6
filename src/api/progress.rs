//! Progress and certificate endpoints used by the sequential tracker

use async_trait::async_trait;
use serde::de::IgnoredAny;

use super::client::ApiClient;
use super::error::ApiError;
use super::models::{Certificate, CourseCompletion, CourseProgress, LessonCompletion, ModuleCompletion};

/// Remote progress service
#[async_trait]
pub trait ProgressApi: Send + Sync {
    /// Fetch the completion log for a course
    async fn get_course_progress(&self, course_id: &str) -> Result<CourseProgress, ApiError>;

    async fn record_lesson_completion(&self, completion: &LessonCompletion) -> Result<(), ApiError>;

    async fn record_module_completion(&self, completion: &ModuleCompletion) -> Result<(), ApiError>;

    async fn record_course_completion(&self, completion: &CourseCompletion) -> Result<(), ApiError>;
}

/// Remote certificate service
#[async_trait]
pub trait CertificateApi: Send + Sync {
    /// Ask the server to issue a certificate for a completed course
    async fn auto_generate_certificate(&self, course_id: &str) -> Result<Certificate, ApiError>;
}

#[async_trait]
impl ProgressApi for ApiClient {
    async fn get_course_progress(&self, course_id: &str) -> Result<CourseProgress, ApiError> {
        self.get(&format!("progress/course/{}", course_id)).await
    }

    async fn record_lesson_completion(&self, completion: &LessonCompletion) -> Result<(), ApiError> {
        self.post::<_, IgnoredAny>("progress/lesson", completion).await?;
        Ok(())
    }

    async fn record_module_completion(&self, completion: &ModuleCompletion) -> Result<(), ApiError> {
        self.post::<_, IgnoredAny>("progress/module", completion).await?;
        Ok(())
    }

    async fn record_course_completion(&self, completion: &CourseCompletion) -> Result<(), ApiError> {
        self.post::<_, IgnoredAny>("progress/course", completion).await?;
        Ok(())
    }
}

#[async_trait]
impl CertificateApi for ApiClient {
    async fn auto_generate_certificate(&self, course_id: &str) -> Result<Certificate, ApiError> {
        self.post(&format!("certificates/auto-generate/{}", course_id), &serde_json::json!({}))
            .await
    }
}
