//! Push notification display
//!
//! The worker builds notifications; a [`NotificationSurface`] shows them and
//! opens windows when they are clicked.

use super::config::PushSettings;
use crate::error::SwResult;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// Action id that only dismisses the notification
pub const ACTION_CLOSE: &str = "close";
/// Action id that opens the site
pub const ACTION_EXPLORE: &str = "explore";

/// A button shown on a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    pub icon: String,
}

/// Arbitrary data attached to a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    /// Milliseconds since the epoch
    pub date_of_arrival: i64,
    pub primary_key: u32,
}

/// A notification ready to be displayed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Identifies the notification in click events
    pub tag: String,
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub data: NotificationData,
    pub actions: Vec<NotificationAction>,
}

impl Notification {
    /// Build the notification for a push payload
    pub fn from_push(settings: &PushSettings, payload: Option<&str>) -> Self {
        let body = payload.unwrap_or(settings.default_body.as_str()).to_string();
        Self {
            tag: uuid::Uuid::new_v4().to_string(),
            title: settings.title.clone(),
            body,
            icon: settings.icon.clone(),
            badge: settings.badge.clone(),
            vibrate: settings.vibrate.clone(),
            data: NotificationData {
                date_of_arrival: Utc::now().timestamp_millis(),
                primary_key: 1,
            },
            actions: vec![
                NotificationAction {
                    action: ACTION_EXPLORE.to_string(),
                    title: "Ver más".to_string(),
                    icon: settings.badge.clone(),
                },
                NotificationAction {
                    action: ACTION_CLOSE.to_string(),
                    title: "Cerrar".to_string(),
                    icon: settings.badge.clone(),
                },
            ],
        }
    }
}

/// Where notifications are displayed and windows are opened
#[async_trait]
pub trait NotificationSurface: Send + Sync {
    /// Display a notification
    async fn show(&self, notification: &Notification) -> SwResult<()>;

    /// Close the notification with this tag
    async fn close(&self, tag: &str) -> SwResult<()>;

    /// Open (or focus) a window on a URL
    async fn open_window(&self, url: &str) -> SwResult<()>;
}

/// Something a [`RecordingSurface`] was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    Show(Notification),
    Close(String),
    OpenWindow(String),
}

/// Surface that records every call, for embedding and tests
#[derive(Debug, Default)]
pub struct RecordingSurface {
    calls: Mutex<Vec<SurfaceCall>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl NotificationSurface for RecordingSurface {
    async fn show(&self, notification: &Notification) -> SwResult<()> {
        self.calls
            .lock()
            .await
            .push(SurfaceCall::Show(notification.clone()));
        Ok(())
    }

    async fn close(&self, tag: &str) -> SwResult<()> {
        self.calls
            .lock()
            .await
            .push(SurfaceCall::Close(tag.to_string()));
        Ok(())
    }

    async fn open_window(&self, url: &str) -> SwResult<()> {
        self.calls
            .lock()
            .await
            .push(SurfaceCall::OpenWindow(url.to_string()));
        Ok(())
    }
}
