//! Course catalog with optimistic edits
//!
//! Renames and removals show up immediately and are reverted if the server
//! rejects them. Every change bumps a version counter; a rollback only
//! applies while the catalog is still at the version its own edit produced,
//! so it never clobbers a refresh that landed in the meantime.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;

use crate::api::ApiError;
use crate::api::courses::CourseApi;
use crate::api::models::CourseSummary;
use crate::course::{CourseDraft, FormError};
use crate::poll::Poller;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Unknown course {0}")]
    UnknownCourse(String),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Remote(#[from] ApiError),
}

/// Published catalog state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogSnapshot {
    pub courses: Vec<CourseSummary>,
    pub version: u64,
}

impl CatalogSnapshot {
    pub fn get(&self, course_id: &str) -> Option<&CourseSummary> {
        self.courses.iter().find(|c| c.id == course_id)
    }
}

#[derive(Clone)]
pub struct CourseCatalog {
    api: Arc<dyn CourseApi>,
    state: Arc<watch::Sender<CatalogSnapshot>>,
}

impl CourseCatalog {
    pub fn new(api: Arc<dyn CourseApi>) -> Self {
        let (tx, _) = watch::channel(CatalogSnapshot::default());
        Self { api, state: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> watch::Receiver<CatalogSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> CatalogSnapshot {
        self.state.borrow().clone()
    }

    /// Replace the list with the server's
    pub async fn refresh(&self) -> Result<usize, ApiError> {
        let courses = self.api.list_courses().await?;
        let count = courses.len();
        self.state.send_modify(|s| {
            s.courses = courses;
            s.version += 1;
        });
        Ok(count)
    }

    /// Rename a course, showing the new title before the server confirms
    pub async fn rename(&self, course_id: &str, title: &str) -> Result<(), CatalogError> {
        let current = self
            .snapshot()
            .get(course_id)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownCourse(course_id.to_string()))?;

        let draft = CourseDraft {
            title: title.to_string(),
            description: current.description.clone(),
            category: None,
            published: current.published,
        }
        .validate()?;

        let (previous, tentative) = self.apply(|courses| {
            if let Some(course) = courses.iter_mut().find(|c| c.id == course_id) {
                course.title = draft.title.clone();
            }
        });

        if let Err(e) = self.api.update_course(course_id, &draft).await {
            tracing::warn!("Rename of course {} failed, reverting: {}", course_id, e);
            self.rollback(previous, tentative);
            return Err(e.into());
        }
        Ok(())
    }

    /// Remove a course, hiding it before the server confirms
    pub async fn remove(&self, course_id: &str) -> Result<(), CatalogError> {
        if self.snapshot().get(course_id).is_none() {
            return Err(CatalogError::UnknownCourse(course_id.to_string()));
        }

        let (previous, tentative) = self.apply(|courses| courses.retain(|c| c.id != course_id));

        if let Err(e) = self.api.delete_course(course_id).await {
            tracing::warn!("Removal of course {} failed, reverting: {}", course_id, e);
            self.rollback(previous, tentative);
            return Err(e.into());
        }
        Ok(())
    }

    /// Apply a tentative edit; returns the prior courses and the new version
    fn apply(&self, edit: impl FnOnce(&mut Vec<CourseSummary>)) -> (Vec<CourseSummary>, u64) {
        let mut previous = Vec::new();
        let mut version = 0;
        self.state.send_modify(|s| {
            previous = s.courses.clone();
            edit(&mut s.courses);
            s.version += 1;
            version = s.version;
        });
        (previous, version)
    }

    fn rollback(&self, previous: Vec<CourseSummary>, tentative: u64) {
        let reverted = self.state.send_if_modified(|s| {
            if s.version != tentative {
                return false;
            }
            s.courses = previous;
            s.version += 1;
            true
        });
        if !reverted {
            tracing::debug!("Catalog changed since version {}, skipping rollback", tentative);
        }
    }

    /// Refresh now and then every `interval` until the poller is dropped
    pub fn start_polling(&self, interval: Duration) -> Poller {
        let catalog = self.clone();
        Poller::spawn("courses", interval, move || {
            let catalog = catalog.clone();
            async move {
                catalog.refresh().await?;
                Ok::<(), anyhow::Error>(())
            }
        })
    }
}
