//! Worker lifecycle states

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of one worker version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    /// Constructed, install not attempted yet
    Parsed,
    /// Pre-caching the manifest
    Installing,
    /// Manifest cached, waiting to activate
    Installed,
    /// Purging caches of other versions
    Activating,
    /// Serving requests
    Activated,
    /// Install failed or superseded; never used again
    Redundant,
}

impl WorkerState {
    pub fn can_install(&self) -> bool {
        matches!(self, Self::Parsed)
    }

    /// Activation is allowed once installed, and repeating it is harmless
    pub fn can_activate(&self) -> bool {
        matches!(self, Self::Installed | Self::Activated)
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parsed => write!(f, "parsed"),
            Self::Installing => write!(f, "installing"),
            Self::Installed => write!(f, "installed"),
            Self::Activating => write!(f, "activating"),
            Self::Activated => write!(f, "activated"),
            Self::Redundant => write!(f, "redundant"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions() {
        assert!(WorkerState::Parsed.can_install());
        assert!(!WorkerState::Installed.can_install());
        assert!(WorkerState::Installed.can_activate());
        assert!(WorkerState::Activated.can_activate());
        assert!(!WorkerState::Parsed.can_activate());
        assert!(!WorkerState::Redundant.can_activate());
        assert!(!WorkerState::Redundant.can_install());
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&WorkerState::Activated).unwrap();
        assert_eq!(json, "\"activated\"");
    }
}
