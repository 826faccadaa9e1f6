//! LMS REST API client

pub mod assignments;
pub mod auth;
pub mod certificates;
pub mod client;
pub mod courses;
pub mod error;
pub mod models;
pub mod notifications;
pub mod progress;

pub use client::ApiClient;
pub use courses::CourseApi;
pub use error::ApiError;
pub use notifications::NotificationApi;
pub use progress::{CertificateApi, ProgressApi};
