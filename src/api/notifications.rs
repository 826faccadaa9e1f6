//! Notification endpoints

use async_trait::async_trait;
use serde::de::IgnoredAny;

use super::client::ApiClient;
use super::error::ApiError;
use crate::notifications::Notification;

/// Remote notification service
#[async_trait]
pub trait NotificationApi: Send + Sync {
    async fn list_notifications(&self) -> Result<Vec<Notification>, ApiError>;

    async fn mark_notification_read(&self, id: &str) -> Result<(), ApiError>;

    async fn mark_all_notifications_read(&self) -> Result<(), ApiError>;
}

#[async_trait]
impl NotificationApi for ApiClient {
    async fn list_notifications(&self) -> Result<Vec<Notification>, ApiError> {
        self.get("notifications").await
    }

    async fn mark_notification_read(&self, id: &str) -> Result<(), ApiError> {
        self.put::<_, IgnoredAny>(&format!("notifications/{}/read", id), &serde_json::json!({}))
            .await?;
        Ok(())
    }

    async fn mark_all_notifications_read(&self) -> Result<(), ApiError> {
        self.put::<_, IgnoredAny>("notifications/read-all", &serde_json::json!({})).await?;
        Ok(())
    }
}
