//! Assignment, submission and grading endpoints

use serde::de::IgnoredAny;

use super::client::ApiClient;
use super::error::ApiError;
use crate::grading::{Assignment, AssignmentDraft, GradeInput, Submission};

impl ApiClient {
    pub async fn list_assignments(&self, course_id: &str) -> Result<Vec<Assignment>, ApiError> {
        self.get(&format!("courses/{}/assignments", course_id)).await
    }

    pub async fn get_assignment(&self, assignment_id: &str) -> Result<Assignment, ApiError> {
        self.get(&format!("assignments/{}", assignment_id)).await
    }

    pub async fn create_assignment(
        &self,
        course_id: &str,
        draft: &AssignmentDraft,
    ) -> Result<Assignment, ApiError> {
        self.post(&format!("courses/{}/assignments", course_id), draft).await
    }

    pub async fn update_assignment(
        &self,
        assignment_id: &str,
        draft: &AssignmentDraft,
    ) -> Result<(), ApiError> {
        self.put::<_, IgnoredAny>(&format!("assignments/{}", assignment_id), draft).await?;
        Ok(())
    }

    pub async fn delete_assignment(&self, assignment_id: &str) -> Result<(), ApiError> {
        self.delete(&format!("assignments/{}", assignment_id)).await
    }

    pub async fn list_submissions(&self, assignment_id: &str) -> Result<Vec<Submission>, ApiError> {
        self.get(&format!("assignments/{}/submissions", assignment_id)).await
    }

    /// Record a grade; the input should already be validated
    pub async fn grade_submission(
        &self,
        submission_id: &str,
        grade: &GradeInput,
    ) -> Result<(), ApiError> {
        self.put::<_, IgnoredAny>(&format!("submissions/{}/grade", submission_id), grade).await?;
        Ok(())
    }
}
