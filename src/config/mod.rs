//! Configuration management for coursepath

pub mod session;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::theme::Theme;

/// Remote API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL all endpoint paths are joined onto
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { base_url: "http://localhost:5000/api".to_string(), timeout_secs: 30 }
    }
}

/// Behaviour when the server rejects the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Route announced in the redirect event after a 401
    pub login_route: String,

    /// Delay before the redirect event is published
    pub redirect_delay_ms: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { login_route: "/login".to_string(), redirect_delay_ms: 1500 }
    }
}

/// Per-content-type completion thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionThresholds {
    /// Fraction of a video that must be watched (0.0-1.0)
    pub video_watch_ratio: f64,

    /// Scroll percentage that marks a text lesson as read
    pub text_scroll_percent: f64,

    /// Seconds a file must be open to count as viewed
    pub file_view_seconds: u64,

    /// Quiz submissions allowed per lesson visit
    pub max_quiz_attempts: u32,

    /// Passing percentage for quizzes that do not declare one
    pub default_quiz_passing_score: f64,

    /// Treat a quiz with exhausted attempts as completed even when failed
    pub allow_progress_after_exhausted_attempts: bool,
}

impl Default for CompletionThresholds {
    fn default() -> Self {
        Self {
            video_watch_ratio: 0.95,
            text_scroll_percent: 90.0,
            file_view_seconds: 10,
            max_quiz_attempts: 2,
            default_quiz_passing_score: 70.0,
            allow_progress_after_exhausted_attempts: false,
        }
    }
}

/// Background refresh intervals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub notifications_secs: u64,
    pub courses_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { notifications_secs: 30, courses_secs: 60 }
    }
}

impl PollingConfig {
    /// Notification refresh period, at least one second
    pub fn notifications_interval(&self) -> Duration {
        Duration::from_secs(self.notifications_secs.max(1))
    }

    /// Course list refresh period, at least one second
    pub fn courses_interval(&self) -> Duration {
        Duration::from_secs(self.courses_secs.max(1))
    }
}

/// Certificate behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateSettings {
    /// Request a certificate when a course is completed
    pub auto_generate: bool,
}

impl Default for CertificateSettings {
    fn default() -> Self {
        Self { auto_generate: true }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,

    pub auth: AuthConfig,

    pub thresholds: CompletionThresholds,

    pub polling: PollingConfig,

    pub certificates: CertificateSettings,

    /// Selected theme name
    pub theme: String,

    /// Custom theme overrides (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_theme: Option<Theme>,

    /// Vim mode enabled
    pub vim_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            auth: AuthConfig::default(),
            thresholds: CompletionThresholds::default(),
            polling: PollingConfig::default(),
            certificates: CertificateSettings::default(),
            theme: "Tokyo Night".to_string(),
            custom_theme: None,
            vim_mode: true,
        }
    }
}

impl Config {
    /// Load configuration from disk, or create default if not exists
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific file, writing defaults if it is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {:?}", path))?;
            serde_json::from_str(&contents).with_context(|| "Failed to parse config.json")
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let contents =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("", "", "coursepath")
            .context("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.json"))
    }

    /// Get the data directory path
    pub fn data_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("", "", "coursepath")
            .context("Failed to determine data directory")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    /// Get the log file path used while the TUI owns the terminal
    pub fn log_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("coursepath.log"))
    }

    /// Get the active theme
    pub fn active_theme(&self) -> Theme {
        self.custom_theme
            .clone()
            .or_else(|| Theme::by_name(&self.theme))
            .unwrap_or_else(Theme::tokyo_night)
    }
}
