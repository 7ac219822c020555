//! Configuration schema for swcache
//!
//! Configuration is stored at `~/.config/swcache/config.toml`

use crate::worker::config::{
    DEFAULT_CACHE_PREFIX, DEFAULT_OFFLINE_FALLBACK, DEFAULT_ORIGIN, DEFAULT_PRECACHE,
    DEFAULT_SKIP_WAITING_MESSAGE, DEFAULT_VERSION,
};
use crate::worker::PushSettings;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Worker version and caching behavior
    pub worker: WorkerSection,

    /// Where requests go
    pub origin: OriginConfig,

    /// Where caches and state live
    pub storage: StorageConfig,

    /// Push notification display
    pub push: PushConfig,
}

impl Config {
    /// Directory holding caches, the registration and the journal
    pub fn state_dir(&self) -> PathBuf {
        self.storage
            .dir
            .clone()
            .unwrap_or_else(crate::config::ConfigManager::default_state_dir)
    }

    /// Directory holding the cache stores
    pub fn caches_dir(&self) -> PathBuf {
        self.state_dir().join("caches")
    }
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,

    /// Record lifecycle events in the journal
    pub journal: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
            journal: true,
        }
    }
}

/// Worker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerSection {
    /// Cache name prefix; the store is `<prefix>-v<version>`
    pub cache_prefix: String,

    /// Semantic version of the deployed site
    pub version: String,

    /// Paths pre-cached at install; every one must succeed
    pub precache: Vec<String>,

    /// Page served when a navigation fails offline
    pub offline_fallback: String,

    /// `type` of the control message that forces activation
    pub skip_waiting_message: String,
}

impl Default for WorkerSection {
    fn default() -> Self {
        Self {
            cache_prefix: DEFAULT_CACHE_PREFIX.to_string(),
            version: DEFAULT_VERSION.to_string(),
            precache: DEFAULT_PRECACHE.iter().map(|p| p.to_string()).collect(),
            offline_fallback: DEFAULT_OFFLINE_FALLBACK.to_string(),
            skip_waiting_message: DEFAULT_SKIP_WAITING_MESSAGE.to_string(),
        }
    }
}

/// Origin configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OriginConfig {
    /// Origin the worker controls
    pub url: String,

    /// Serve this directory instead of going over HTTP (e.g. "dist")
    pub root: Option<PathBuf>,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ORIGIN.to_string(),
            root: None,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// State directory (default: platform state dir)
    pub dir: Option<PathBuf>,
}

/// Push notification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    pub title: String,

    /// Body used when a push carries no payload
    pub default_body: String,

    pub icon: String,

    pub badge: String,

    /// Vibration pattern in milliseconds
    pub vibrate: Vec<u32>,

    /// Page opened when a notification is clicked
    pub open_url: String,
}

impl Default for PushConfig {
    fn default() -> Self {
        let push = PushSettings::default();
        Self {
            title: push.title,
            default_body: push.default_body,
            icon: push.icon,
            badge: push.badge,
            vibrate: push.vibrate,
            open_url: push.open_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[worker]"));
        assert!(toml.contains("portafolio"));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.worker.version, "1.0.0");
        assert_eq!(config.worker.precache.len(), 6);
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [worker]
            version = "1.1.0"

            [origin]
            root = "dist"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.worker.version, "1.1.0");
        assert_eq!(config.worker.cache_prefix, "portafolio"); // default preserved
        assert_eq!(config.origin.root, Some(PathBuf::from("dist")));
        assert_eq!(config.origin.url, "http://localhost:4173");
    }

    #[test]
    fn state_dir_override() {
        let mut config = Config::default();
        config.storage.dir = Some(PathBuf::from("/srv/swcache"));
        assert_eq!(config.caches_dir(), PathBuf::from("/srv/swcache/caches"));
    }
}
