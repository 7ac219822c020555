//! Values the worker is constructed with
//!
//! Nothing here is global: two workers for two versions can live side by
//! side, which is exactly what happens while a new version is waiting.

use crate::cache::CacheName;
use crate::config::Config;
use crate::error::SwResult;
use crate::http::Origin;

pub const DEFAULT_CACHE_PREFIX: &str = "portafolio";
pub const DEFAULT_VERSION: &str = "1.0.0";
pub const DEFAULT_OFFLINE_FALLBACK: &str = "/offline.html";
pub const DEFAULT_SKIP_WAITING_MESSAGE: &str = "SKIP_WAITING";
pub const DEFAULT_ORIGIN: &str = "http://localhost:4173";

/// Paths that must be cached before a version may install
pub const DEFAULT_PRECACHE: [&str; 6] = [
    "/",
    "/index.html",
    "/manifest.json",
    "/favicon.ico",
    "/icon-192x192.png",
    "/icon-512x512.png",
];

/// Notification settings for push events
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushSettings {
    pub title: String,
    pub default_body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    /// Page opened when a notification is clicked
    pub open_url: String,
}

impl Default for PushSettings {
    fn default() -> Self {
        Self {
            title: "Portafolio".to_string(),
            default_body: "Nueva notificación del portafolio".to_string(),
            icon: "/icon-192x192.png".to_string(),
            badge: "/icon-72x72.png".to_string(),
            vibrate: vec![100, 50, 100],
            open_url: "/".to_string(),
        }
    }
}

/// Everything one worker version needs to know about itself
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Name of this version's cache store
    pub cache_name: CacheName,
    /// Origin the worker controls; root-relative paths resolve against it
    pub origin: Origin,
    pub precache: Vec<String>,
    pub offline_fallback: String,
    /// `type` value of the control message that forces activation
    pub skip_waiting_message: String,
    pub push: PushSettings,
}

impl WorkerConfig {
    /// Defaults for everything but the cache name and origin
    pub fn new(cache_name: CacheName, origin: Origin) -> Self {
        Self {
            cache_name,
            origin,
            precache: DEFAULT_PRECACHE.iter().map(|p| p.to_string()).collect(),
            offline_fallback: DEFAULT_OFFLINE_FALLBACK.to_string(),
            skip_waiting_message: DEFAULT_SKIP_WAITING_MESSAGE.to_string(),
            push: PushSettings::default(),
        }
    }

    /// Build from the loaded configuration file
    pub fn from_config(config: &Config) -> SwResult<Self> {
        let cache_name = CacheName::new(&config.worker.cache_prefix, &config.worker.version)?;
        let origin = Origin::parse(&config.origin.url)?;
        Ok(Self {
            cache_name,
            origin,
            precache: config.worker.precache.clone(),
            offline_fallback: config.worker.offline_fallback.clone(),
            skip_waiting_message: config.worker.skip_waiting_message.clone(),
            push: PushSettings {
                title: config.push.title.clone(),
                default_body: config.push.default_body.clone(),
                icon: config.push.icon.clone(),
                badge: config.push.badge.clone(),
                vibrate: config.push.vibrate.clone(),
                open_url: config.push.open_url.clone(),
            },
        })
    }

    /// Same settings for another version of the site
    pub fn for_cache(&self, cache_name: CacheName) -> Self {
        Self {
            cache_name,
            ..self.clone()
        }
    }

    /// Rendered store name, e.g. `portafolio-v1.0.0`
    pub fn cache_name(&self) -> String {
        self.cache_name.to_string()
    }

    pub fn resolve(&self, path: &str) -> String {
        self.origin.resolve(path)
    }
}
