use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

/// User-facing notification handed to the external push gateway. Delivery is
/// fire-and-forget: senders may fail, callers only log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub recipient_id: String,
    pub kind: NotificationKind,
    pub message: String,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationKind {
    PrizeAwarded,
    GameAutoApproved,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Dispatch error: {0}")]
    Dispatch(String),
}

#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, notification: Notification) -> Result<(), NotifyError>;
}

/// Default runtime sender: logs the notification instead of calling a real
/// push gateway.
#[derive(Debug, Default)]
pub struct LoggingNotificationSender;

impl LoggingNotificationSender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationSender for LoggingNotificationSender {
    async fn send(&self, notification: Notification) -> Result<(), NotifyError> {
        info!(
            recipient_id = %notification.recipient_id,
            kind = %notification.kind,
            message = %notification.message,
            "notification dispatched"
        );
        Ok(())
    }
}

/// Captures everything sent; used by tests to assert on dispatches.
#[derive(Debug, Default)]
pub struct RecordingNotificationSender {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<Notification> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl NotificationSender for RecordingNotificationSender {
    async fn send(&self, notification: Notification) -> Result<(), NotifyError> {
        self.sent.lock().await.push(notification);
        Ok(())
    }
}
