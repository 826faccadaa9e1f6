//! Certificate template configuration
//!
//! A certificate is a background image with text overlays ("tags") placed at
//! percentage coordinates. The whole configuration is stored server-side as a
//! single JSON blob.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// `#RRGGBB` colors (compiled once)
static COLOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap());

/// `{{tag_name}}` placeholders inside overlay text (compiled once)
static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([a-z_]+)\s*\}\}").unwrap());

/// Smallest and largest font size an overlay may use
pub const FONT_SIZE_RANGE: std::ops::RangeInclusive<f32> = 6.0..=144.0;

/// Values a tag overlay can display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateTag {
    StudentName,
    CourseTitle,
    CompletionDate,
    InstructorName,
    CertificateId,
    Grade,
}

impl CertificateTag {
    /// Placeholder key used in overlay text
    pub fn key(&self) -> &'static str {
        match self {
            Self::StudentName => "student_name",
            Self::CourseTitle => "course_title",
            Self::CompletionDate => "completion_date",
            Self::InstructorName => "instructor_name",
            Self::CertificateId => "certificate_id",
            Self::Grade => "grade",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::all().iter().copied().find(|t| t.key() == key)
    }

    pub fn all() -> &'static [CertificateTag] {
        &[
            Self::StudentName,
            Self::CourseTitle,
            Self::CompletionDate,
            Self::InstructorName,
            Self::CertificateId,
            Self::Grade,
        ]
    }
}

/// Horizontal text anchoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// One text overlay on the template image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagOverlay {
    pub tag: CertificateTag,
    /// Horizontal position, percent of image width
    pub x: f32,
    /// Vertical position, percent of image height
    pub y: f32,
    pub font_size: f32,
    pub color: String,
    #[serde(default)]
    pub align: TextAlign,
    #[serde(default)]
    pub bold: bool,
    /// Optional text around the value, e.g. "Awarded to {{student_name}}"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl TagOverlay {
    /// Overlay with default styling at the given position
    pub fn new(tag: CertificateTag, x: f32, y: f32) -> Self {
        Self {
            tag,
            x,
            y,
            font_size: 24.0,
            color: "#000000".to_string(),
            align: TextAlign::Center,
            bold: false,
            text: None,
        }
    }
}

/// Full certificate configuration for a course
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateConfig {
    #[serde(default)]
    pub template_url: Option<String>,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub tags: Vec<TagOverlay>,
}

/// Validation failures for a certificate configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CertificateConfigError {
    #[error("A template image is required")]
    MissingTemplate,

    #[error("The student name tag is required")]
    MissingStudentName,

    #[error("Tag {0:?} is placed more than once")]
    DuplicateTag(CertificateTag),

    #[error("Tag {0:?} is positioned outside the image")]
    OutOfBounds(CertificateTag),

    #[error("Tag {0:?} has font size outside 6-144")]
    FontSize(CertificateTag),

    #[error("Tag {0:?} has invalid color {1:?}")]
    InvalidColor(CertificateTag, String),

    #[error("Tag {0:?} uses unknown placeholder {1:?}")]
    UnknownPlaceholder(CertificateTag, String),
}

/// A tag with its final text, ready to draw
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTag {
    pub tag: CertificateTag,
    pub text: String,
    pub x: f32,
    pub y: f32,
}

impl CertificateConfig {
    /// Parse from the stored JSON blob
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to the stored JSON blob
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Add or move a tag overlay
    pub fn place(&mut self, overlay: TagOverlay) {
        match self.tags.iter_mut().find(|t| t.tag == overlay.tag) {
            Some(existing) => *existing = overlay,
            None => self.tags.push(overlay),
        }
    }

    /// Remove a tag overlay; returns whether it was present
    pub fn remove(&mut self, tag: CertificateTag) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t.tag != tag);
        self.tags.len() != before
    }

    /// Check the configuration can be saved
    pub fn validate(&self) -> Result<(), CertificateConfigError> {
        if self.template_url.as_deref().is_none_or(|u| u.trim().is_empty()) {
            return Err(CertificateConfigError::MissingTemplate);
        }

        let mut seen = HashSet::new();
        for overlay in &self.tags {
            let tag = overlay.tag;
            if !seen.insert(tag) {
                return Err(CertificateConfigError::DuplicateTag(tag));
            }
            if !(0.0..=100.0).contains(&overlay.x) || !(0.0..=100.0).contains(&overlay.y) {
                return Err(CertificateConfigError::OutOfBounds(tag));
            }
            if !FONT_SIZE_RANGE.contains(&overlay.font_size) {
                return Err(CertificateConfigError::FontSize(tag));
            }
            if !COLOR_RE.is_match(&overlay.color) {
                return Err(CertificateConfigError::InvalidColor(tag, overlay.color.clone()));
            }
            if let Some(text) = &overlay.text {
                for cap in PLACEHOLDER_RE.captures_iter(text) {
                    if CertificateTag::from_key(&cap[1]).is_none() {
                        return Err(CertificateConfigError::UnknownPlaceholder(
                            tag,
                            cap[1].to_string(),
                        ));
                    }
                }
            }
        }

        if !seen.contains(&CertificateTag::StudentName) {
            return Err(CertificateConfigError::MissingStudentName);
        }

        Ok(())
    }

    /// Substitute values into every overlay. Missing values render as the tag key.
    pub fn render_preview(&self, values: &HashMap<CertificateTag, String>) -> Vec<RenderedTag> {
        self.tags
            .iter()
            .map(|overlay| {
                let template =
                    overlay.text.clone().unwrap_or_else(|| format!("{{{{{}}}}}", overlay.tag.key()));
                let text = PLACEHOLDER_RE.replace_all(&template, |cap: &regex::Captures| {
                    CertificateTag::from_key(&cap[1])
                        .and_then(|t| values.get(&t).cloned())
                        .unwrap_or_else(|| cap[1].to_string())
                });
                RenderedTag { tag: overlay.tag, text: text.into_owned(), x: overlay.x, y: overlay.y }
            })
            .collect()
    }
}
