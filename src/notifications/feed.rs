//! Deduplicating, observable notification list

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::api::models::flexible_id;

/// Maximum number of notifications kept in memory
pub const MAX_NOTIFICATIONS: usize = 200;

/// A notification as delivered by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(alias = "_id", deserialize_with = "flexible_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default, alias = "isRead")]
    pub read: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub link: Option<String>,
}

/// Snapshot published to observers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedSnapshot {
    /// Newest first
    pub items: Vec<Notification>,
    pub unread: usize,
}

/// Notification list merged from repeated fetches
pub struct NotificationFeed {
    items: Vec<Notification>,
    tx: watch::Sender<FeedSnapshot>,
}

impl Default for NotificationFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationFeed {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(FeedSnapshot::default());
        Self { items: Vec::new(), tx }
    }

    /// Observe the feed
    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.tx.subscribe()
    }

    /// Current items, newest first
    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.read).count()
    }

    /// Merge a fetched page. Items are deduplicated by id (the fetched copy
    /// wins), sorted newest first and capped at [`MAX_NOTIFICATIONS`].
    ///
    /// Returns the number of ids not seen before.
    pub fn merge(&mut self, fetched: Vec<Notification>) -> usize {
        let mut by_id: HashMap<String, Notification> =
            self.items.drain(..).map(|n| (n.id.clone(), n)).collect();

        let mut added = 0;
        for notification in fetched {
            if by_id.insert(notification.id.clone(), notification).is_none() {
                added += 1;
            }
        }

        let mut items: Vec<Notification> = by_id.into_values().collect();
        // Undated items sort last; ids break ties so the order is stable across merges
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        items.truncate(MAX_NOTIFICATIONS);
        self.items = items;

        self.publish();
        added
    }

    /// Mark one notification as read locally
    pub fn mark_read(&mut self, id: &str) -> bool {
        let Some(item) = self.items.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        item.read = true;
        self.publish();
        true
    }

    /// Mark everything as read locally
    pub fn mark_all_read(&mut self) {
        for item in &mut self.items {
            item.read = true;
        }
        self.publish();
    }

    fn publish(&self) {
        self.tx.send_replace(FeedSnapshot { items: self.items.clone(), unread: self.unread_count() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn notification(id: &str, minute: u32, read: bool) -> Notification {
        Notification {
            id: id.into(),
            title: format!("Notice {}", id),
            message: String::new(),
            kind: None,
            read,
            created_at: Some(Utc.with_ymd_and_hms(2026, 5, 1, 10, minute, 0).unwrap()),
            link: None,
        }
    }

    #[test]
    fn merge_deduplicates_by_id() {
        let mut feed = NotificationFeed::new();
        assert_eq!(feed.merge(vec![notification("1", 0, false), notification("2", 1, false)]), 2);
        assert_eq!(feed.merge(vec![notification("2", 1, true), notification("3", 2, false)]), 1);

        let ids: Vec<&str> = feed.items().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2", "1"]);
        assert_eq!(feed.unread_count(), 2);
    }

    #[test]
    fn merge_caps_length() {
        let mut feed = NotificationFeed::new();
        let page: Vec<Notification> =
            (0..(MAX_NOTIFICATIONS + 5)).map(|i| notification(&i.to_string(), 0, false)).collect();
        feed.merge(page);
        assert_eq!(feed.items().len(), MAX_NOTIFICATIONS);
    }

    #[test]
    fn subscribers_see_updates() {
        let mut feed = NotificationFeed::new();
        let rx = feed.subscribe();

        feed.merge(vec![notification("1", 0, false)]);
        assert_eq!(rx.borrow().unread, 1);

        assert!(feed.mark_read("1"));
        assert_eq!(rx.borrow().unread, 0);
        assert!(!feed.mark_read("missing"));
    }

    #[test]
    fn mark_all_read_clears_unread() {
        let mut feed = NotificationFeed::new();
        feed.merge(vec![notification("1", 0, false), notification("2", 1, false)]);
        feed.mark_all_read();
        assert_eq!(feed.unread_count(), 0);
    }

    #[test]
    fn deserializes_is_read_alias() {
        let n: Notification =
            serde_json::from_str(r#"{"_id": 5, "title": "Graded", "isRead": true}"#).unwrap();
        assert_eq!(n.id, "5");
        assert!(n.read);
    }
}
