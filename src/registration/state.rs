//! Registration state persistence

use crate::error::{SwError, SwResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// One installed worker version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    /// Unique id of this install
    pub id: Uuid,

    /// Cache store owned by this version
    pub cache_name: String,

    /// Semantic version tag
    pub version: String,

    /// When install completed
    pub installed_at: DateTime<Utc>,

    /// When the version became active
    pub activated_at: Option<DateTime<Utc>>,
}

impl VersionRecord {
    pub fn new(cache_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            cache_name: cache_name.into(),
            version: version.into(),
            installed_at: Utc::now(),
            activated_at: None,
        }
    }
}

/// Which versions control the scope and which one is waiting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    /// Origin the worker controls
    pub scope: String,

    /// Version currently serving requests
    pub active: Option<VersionRecord>,

    /// Installed version waiting to take over
    pub waiting: Option<VersionRecord>,

    /// When the registration last changed
    pub updated_at: DateTime<Utc>,
}

impl Registration {
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            active: None,
            waiting: None,
            updated_at: Utc::now(),
        }
    }

    /// Load from file, `None` if nothing was ever registered
    pub async fn load(path: &Path) -> SwResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path)
            .await
            .map_err(|e| SwError::io(format!("reading registration {}", path.display()), e))?;

        let registration: Registration = serde_json::from_str(&content)?;
        Ok(Some(registration))
    }

    /// Save to file
    pub async fn save(&self, path: &Path) -> SwResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| SwError::io("creating state directory", e))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .await
            .map_err(|e| SwError::io(format!("writing registration {}", path.display()), e))?;

        Ok(())
    }

    /// Delete the registration file
    pub async fn delete(path: &Path) -> SwResult<()> {
        if path.exists() {
            fs::remove_file(path)
                .await
                .map_err(|e| SwError::io(format!("deleting registration {}", path.display()), e))?;
        }
        Ok(())
    }

    /// Version that owns `cache_name`, active first
    pub fn find(&self, cache_name: &str) -> Option<&VersionRecord> {
        self.active
            .iter()
            .chain(self.waiting.iter())
            .find(|r| r.cache_name == cache_name)
    }
}

/// Default file name under the state directory
pub fn registration_path(state_dir: &Path) -> PathBuf {
    state_dir.join("registration.json")
}
