//! Assignments, submissions and client-side grading statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::models::flexible_id;

/// Longest feedback accepted by the grading form
pub const MAX_FEEDBACK_LEN: usize = 5000;

/// An assignment attached to a course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    #[serde(alias = "_id", deserialize_with = "flexible_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default = "default_max_points")]
    pub max_points: f64,
}

fn default_max_points() -> f64 {
    100.0
}

/// Assignment create/update form
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub max_points: f64,
}

/// Lifecycle of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Draft,
    Submitted,
    Graded,
    #[serde(alias = "returned")]
    Resubmit,
}

/// A student's submission for an assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(alias = "_id", deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default)]
    pub student_name: Option<String>,
    pub status: SubmissionStatus,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub feedback: Option<String>,
}

impl Submission {
    /// Whether the student has handed in work (graded work was handed in too)
    pub fn is_submitted(&self) -> bool {
        matches!(self.status, SubmissionStatus::Submitted | SubmissionStatus::Graded)
    }

    /// Graded score, if any
    pub fn graded_score(&self) -> Option<f64> {
        (self.status == SubmissionStatus::Graded).then_some(self.score).flatten()
    }

    /// Submitted after the due date
    pub fn is_late(&self, due: Option<DateTime<Utc>>) -> bool {
        match (self.submitted_at, due) {
            (Some(at), Some(due)) => at > due,
            _ => false,
        }
    }
}

/// Aggregate numbers shown above the submissions table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionStats {
    pub total: usize,
    pub submitted: usize,
    pub graded: usize,
    pub pending: usize,
    pub late: usize,
    pub average_score: Option<f64>,
    pub highest_score: Option<f64>,
    pub lowest_score: Option<f64>,
    /// Average of graded scores as a percentage of max points
    pub average_percent: Option<f64>,
    /// Graded submissions at or above the pass threshold
    pub passed: usize,
}

impl SubmissionStats {
    /// Compute statistics for an assignment's submissions
    pub fn from_submissions(
        assignment: &Assignment,
        submissions: &[Submission],
        pass_percent: f64,
    ) -> Self {
        let scores: Vec<f64> = submissions.iter().filter_map(Submission::graded_score).collect();
        let submitted = submissions.iter().filter(|s| s.is_submitted()).count();

        let average_score =
            (!scores.is_empty()).then(|| scores.iter().sum::<f64>() / scores.len() as f64);
        let percent = |score: f64| {
            if assignment.max_points > 0.0 { score * 100.0 / assignment.max_points } else { 0.0 }
        };

        Self {
            total: submissions.len(),
            submitted,
            graded: scores.len(),
            pending: submitted - scores.len(),
            late: submissions.iter().filter(|s| s.is_late(assignment.due_date)).count(),
            average_score,
            highest_score: scores.iter().copied().reduce(f64::max),
            lowest_score: scores.iter().copied().reduce(f64::min),
            average_percent: average_score.map(percent),
            passed: scores.iter().filter(|s| percent(**s) >= pass_percent).count(),
        }
    }
}

/// Validation failures for the grading form
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GradeError {
    #[error("Score must be between 0 and {0}")]
    ScoreOutOfRange(f64),

    #[error("Feedback must be at most {} characters", MAX_FEEDBACK_LEN)]
    FeedbackTooLong,
}

/// Grade entered by a teacher
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeInput {
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl GradeInput {
    /// Validate against the assignment's maximum points
    pub fn validate(&self, max_points: f64) -> Result<Self, GradeError> {
        if !self.score.is_finite() || self.score < 0.0 || self.score > max_points {
            return Err(GradeError::ScoreOutOfRange(max_points));
        }

        let feedback = self.feedback.as_deref().map(str::trim).filter(|f| !f.is_empty());
        if feedback.is_some_and(|f| f.chars().count() > MAX_FEEDBACK_LEN) {
            return Err(GradeError::FeedbackTooLong);
        }

        Ok(Self { score: self.score, feedback: feedback.map(str::to_string) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn assignment() -> Assignment {
        Assignment {
            id: "a1".into(),
            title: "Ownership essay".into(),
            description: None,
            due_date: Some(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()),
            max_points: 50.0,
        }
    }

    fn submission(id: &str, status: SubmissionStatus, score: Option<f64>, day: u32) -> Submission {
        Submission {
            id: id.into(),
            student_name: None,
            status,
            submitted_at: Some(Utc.with_ymd_and_hms(2026, 3, day, 9, 0, 0).unwrap()),
            score,
            feedback: None,
        }
    }

    #[test]
    fn stats_aggregate_graded_scores() {
        let submissions = vec![
            submission("s1", SubmissionStatus::Graded, Some(40.0), 1),
            submission("s2", SubmissionStatus::Graded, Some(20.0), 2),
            submission("s3", SubmissionStatus::Submitted, None, 1),
            submission("s4", SubmissionStatus::Draft, None, 1),
        ];

        let stats = SubmissionStats::from_submissions(&assignment(), &submissions, 60.0);
        assert_eq!(
            stats,
            SubmissionStats {
                total: 4,
                submitted: 3,
                graded: 2,
                pending: 1,
                late: 1,
                average_score: Some(30.0),
                highest_score: Some(40.0),
                lowest_score: Some(20.0),
                average_percent: Some(60.0),
                passed: 1,
            }
        );
    }

    #[test]
    fn stats_for_no_submissions() {
        let stats = SubmissionStats::from_submissions(&assignment(), &[], 60.0);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.average_score, None);
        assert_eq!(stats.highest_score, None);
    }

    #[test]
    fn score_on_ungraded_submission_is_ignored() {
        let s = submission("s", SubmissionStatus::Submitted, Some(10.0), 1);
        assert_eq!(s.graded_score(), None);
    }

    #[test]
    fn grade_validation_bounds_score() {
        let grade = GradeInput { score: 51.0, feedback: None };
        assert_eq!(grade.validate(50.0).unwrap_err(), GradeError::ScoreOutOfRange(50.0));

        let grade = GradeInput { score: 45.0, feedback: Some("  good work ".into()) };
        assert_eq!(grade.validate(50.0).unwrap().feedback.as_deref(), Some("good work"));
    }

    #[test]
    fn grade_validation_limits_feedback() {
        let grade = GradeInput { score: 1.0, feedback: Some("x".repeat(MAX_FEEDBACK_LEN + 1)) };
        assert_eq!(grade.validate(10.0).unwrap_err(), GradeError::FeedbackTooLong);
    }
}
