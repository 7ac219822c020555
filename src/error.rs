//! Error types for swcache
//!
//! All modules use `SwResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for swcache operations
pub type SwResult<T> = Result<T, SwError>;

/// All errors that can occur in swcache
#[derive(Error, Debug)]
pub enum SwError {
    // Lifecycle errors
    #[error("Install failed: could not pre-cache {path}: {reason}")]
    InstallFailed { path: String, reason: String },

    #[error("Invalid worker state: cannot {operation} while {state}")]
    InvalidState { operation: String, state: String },

    #[error("No waiting worker to activate")]
    NothingWaiting,

    #[error("No worker installed")]
    NotInstalled,

    // Network errors
    #[error("Network request to {url} failed: {reason}")]
    Network { url: String, reason: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    // Cache storage errors
    #[error("Cache storage error on {cache}: {reason}")]
    CacheStorage { cache: String, reason: String },

    #[error("Cache not found: {0}")]
    CacheNotFound(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Invalid cache version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("TOML edit error: {0}")]
    TomlEdit(#[from] toml_edit::TomlError),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl SwError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a network error for a URL
    pub fn network(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create a cache storage error for a named store
    pub fn storage(cache: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CacheStorage {
            cache: cache.into(),
            reason: reason.into(),
        }
    }

    /// Check if the error is a network failure (as opposed to a bad response)
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::InstallFailed { .. } => {
                Some("Check that the origin serves every pre-cache path, then run: swcache install")
            }
            Self::NothingWaiting => Some("Run: swcache install"),
            Self::NotInstalled => Some("Run: swcache install"),
            Self::InvalidVersion { .. } => Some("Use a semantic version, e.g.: swcache config set worker.version 1.1.0"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = SwError::InstallFailed {
            path: "/favicon.ico".to_string(),
            reason: "status 404".to_string(),
        };
        assert!(err.to_string().contains("/favicon.ico"));
        assert!(err.to_string().contains("status 404"));
    }

    #[test]
    fn error_hint() {
        assert_eq!(SwError::NothingWaiting.hint(), Some("Run: swcache install"));
        assert!(SwError::Internal("x".to_string()).hint().is_none());
    }

    #[test]
    fn network_classification() {
        assert!(SwError::network("/", "offline").is_network());
        assert!(!SwError::storage("c", "disk full").is_network());
    }
}
