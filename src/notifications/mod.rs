//! Notification feed
//!
//! The feed is refreshed by polling the server and observed through a
//! `watch` channel, so the front end never reaches into shared global state.

pub mod feed;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};

use crate::api::ApiError;
use crate::api::notifications::NotificationApi;
use crate::poll::Poller;

pub use feed::{FeedSnapshot, Notification, NotificationFeed};

/// Notification feed bound to the remote service
#[derive(Clone)]
pub struct NotificationCenter {
    api: Arc<dyn NotificationApi>,
    feed: Arc<Mutex<NotificationFeed>>,
    snapshots: watch::Receiver<FeedSnapshot>,
}

impl NotificationCenter {
    pub fn new(api: Arc<dyn NotificationApi>) -> Self {
        let feed = NotificationFeed::new();
        let snapshots = feed.subscribe();
        Self { api, feed: Arc::new(Mutex::new(feed)), snapshots }
    }

    /// Observe the feed
    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.snapshots.clone()
    }

    /// Latest snapshot
    pub fn snapshot(&self) -> FeedSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Fetch and merge; returns how many new notifications arrived
    pub async fn refresh(&self) -> Result<usize, ApiError> {
        let fetched = self.api.list_notifications().await?;
        let added = self.feed.lock().await.merge(fetched);
        if added > 0 {
            tracing::debug!("{} new notifications", added);
        }
        Ok(added)
    }

    /// Mark one notification read, remotely first
    pub async fn mark_read(&self, id: &str) -> Result<(), ApiError> {
        self.api.mark_notification_read(id).await?;
        self.feed.lock().await.mark_read(id);
        Ok(())
    }

    /// Mark everything read, remotely first
    pub async fn mark_all_read(&self) -> Result<(), ApiError> {
        self.api.mark_all_notifications_read().await?;
        self.feed.lock().await.mark_all_read();
        Ok(())
    }

    /// Refresh now and then every `interval` until the poller is dropped
    pub fn start_polling(&self, interval: Duration) -> Poller {
        let center = self.clone();
        Poller::spawn("notifications", interval, move || {
            let center = center.clone();
            async move {
                center.refresh().await?;
                Ok::<(), anyhow::Error>(())
            }
        })
    }
}
