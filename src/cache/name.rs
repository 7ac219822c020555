//! Versioned cache store names

use crate::error::{SwError, SwResult};
use semver::Version;
use std::fmt;

/// A cache store name: `<prefix>-v<semver>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheName {
    prefix: String,
    version: Version,
}

impl CacheName {
    /// Build a name from a prefix and a version string
    pub fn new(prefix: &str, version: &str) -> SwResult<Self> {
        if prefix.is_empty() || prefix.contains('/') {
            return Err(SwError::User(format!("invalid cache prefix '{}'", prefix)));
        }
        let version = Version::parse(version.trim_start_matches('v')).map_err(|e| {
            SwError::InvalidVersion {
                version: version.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self {
            prefix: prefix.to_string(),
            version,
        })
    }

    /// Parse a rendered name back into prefix and version
    ///
    /// Returns `None` for names that were not produced by this scheme.
    pub fn parse(name: &str) -> Option<Self> {
        let (prefix, version) = name.rsplit_once("-v")?;
        Self::new(prefix, version).ok()
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Whether another store belongs to the same site (same prefix)
    pub fn same_family(&self, other: &str) -> bool {
        Self::parse(other).is_some_and(|o| o.prefix == self.prefix)
    }
}

impl fmt::Display for CacheName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-v{}", self.prefix, self.version)
    }
}
