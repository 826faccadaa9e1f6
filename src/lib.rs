//! Coursepath - a terminal client for studying courses on a remote learning platform
//!
//! Lessons unlock one after another: a lesson opens once the previous one is
//! completed, and a module opens once the previous module is. Completion is
//! recorded with the server before it shows up locally.

pub mod api;
pub mod app;
pub mod catalog;
pub mod certificate;
pub mod config;
pub mod course;
pub mod grading;
pub mod notifications;
pub mod poll;
pub mod theme;
pub mod tracker;
pub mod ui;

pub use app::App;
pub use config::Config;
pub use theme::Theme;
pub use tracker::SequentialTracker;
