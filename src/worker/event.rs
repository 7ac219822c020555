//! Inbound events and what handling them produced

use super::notification::Notification;
use crate::http::{Request, Response};

/// Every kind of event a worker handles
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Install,
    Activate,
    Fetch(Request),
    /// Control message posted by a page
    Message(serde_json::Value),
    /// Push with an optional text payload
    Push(Option<String>),
    NotificationClick {
        tag: String,
        action: Option<String>,
    },
}

impl WorkerEvent {
    /// Event type name as a page would see it
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Activate => "activate",
            Self::Fetch(_) => "fetch",
            Self::Message(_) => "message",
            Self::Push(_) => "push",
            Self::NotificationClick { .. } => "notificationclick",
        }
    }
}

/// Result of an install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub cache_name: String,
    /// Absolute URLs that were pre-cached
    pub cached: Vec<String>,
}

/// Result of an activation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationReport {
    pub cache_name: String,
    /// Stores that were deleted
    pub purged: Vec<String>,
    /// Stores whose deletion failed, with the reason
    pub failed: Vec<(String, String)>,
}

/// Where a fetch response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    Cache,
    /// From the network; `stored` when a background cache write was started
    Network { stored: bool },
    /// Network failed on a navigation and the offline page was served
    OfflineFallback,
    /// Network failed and nothing could be served
    Miss,
}

impl std::fmt::Display for FetchSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cache => write!(f, "cache"),
            Self::Network { stored: true } => write!(f, "network (cached)"),
            Self::Network { stored: false } => write!(f, "network"),
            Self::OfflineFallback => write!(f, "offline fallback"),
            Self::Miss => write!(f, "miss"),
        }
    }
}

/// Response handed back to the page, if any
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub response: Option<Response>,
    pub source: FetchSource,
}

impl FetchResult {
    pub fn miss() -> Self {
        Self {
            response: None,
            source: FetchSource::Miss,
        }
    }
}

/// Result of a control message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOutcome {
    SkipWaiting,
    Ignored,
}

/// Result of a notification click
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Notification closed and a window opened on this URL
    Opened(String),
    /// Notification closed only
    Dismissed,
}

/// What dispatching an event produced
#[derive(Debug, Clone)]
pub enum EventOutcome {
    Installed(InstallReport),
    Activated(ActivationReport),
    Fetched(FetchResult),
    Message(MessageOutcome),
    Pushed(Notification),
    Clicked(ClickOutcome),
}
