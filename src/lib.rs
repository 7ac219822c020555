//! swcache - Offline cache worker for a static portfolio site
//!
//! Pre-caches the site's must-have files at install, keeps exactly one
//! versioned cache per release, and answers requests cache-first with an
//! offline page for failed navigations.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod host;
pub mod http;
pub mod journal;
pub mod network;
pub mod registration;
pub mod ui;
pub mod worker;

pub use error::{SwError, SwResult};
