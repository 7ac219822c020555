//! Lifecycle journal
//!
//! One JSON object per line in `<state_dir>/journal.log`:
//!
//! ```text
//! {"timestamp":"2026-03-01T10:00:00Z","event":"install","data":{"cache_name":"portafolio-v1.0.0",...}}
//! ```
//!
//! Events written by the CLI are `install`, `install_failed`, `activate`,
//! `cache_write_failed`, `push` and `clear`. Disabled with
//! `general.journal = false`.

use crate::config::Config;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::warn;

const JOURNAL_FILE: &str = "journal.log";

#[derive(Serialize)]
struct Entry<'a> {
    timestamp: DateTime<Utc>,
    event: &'a str,
    data: &'a serde_json::Value,
}

/// Append-only record of what happened to the caches
pub struct Journal {
    enabled: bool,
    path: PathBuf,
}

impl Journal {
    pub fn new(config: &Config) -> Self {
        Self {
            enabled: config.general.journal,
            path: config.state_dir().join(JOURNAL_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event
    ///
    /// Never fails the caller: a journal that cannot be written is logged
    /// and the event is lost.
    pub async fn record(&self, event: &str, data: &serde_json::Value) {
        if !self.enabled {
            return;
        }

        let entry = Entry {
            timestamp: Utc::now(),
            event,
            data,
        };
        let line = match serde_json::to_vec(&entry) {
            Ok(mut bytes) => {
                bytes.push(b'\n');
                bytes
            }
            Err(e) => {
                warn!("Journal entry for {} not serializable: {}", event, e);
                return;
            }
        };

        if let Err(e) = self.append(&line).await {
            warn!("Could not append to {}: {}", self.path.display(), e);
        }
    }

    async fn append(&self, line: &[u8]) -> std::io::Result<()> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line).await?;
        file.flush().await
    }
}
