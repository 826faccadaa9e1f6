//! Sequential progress tracking
//!
//! Lessons unlock strictly in order; completion of each lesson depends on
//! the kind of content it carries.

pub mod access;
pub mod completion;
pub mod sequential;

pub use access::{AccessSets, compute_access};
pub use completion::{ContentCompletionState, QuizOutcome};
pub use sequential::{CompletionReport, LessonStatus, SequentialTracker, TrackerError};
