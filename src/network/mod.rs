//! Network access for the worker
//!
//! Provides a trait for fetching requests that can be implemented by
//! different origins (a built static site on disk, a live HTTP origin).
//! An `Err` from [`Fetcher::fetch`] means the network itself failed; any
//! HTTP status, including errors, comes back as `Ok(Response)`.

pub mod http;
pub mod offline;
pub mod static_site;

pub use self::http::HttpFetcher;
pub use offline::Disconnected;
pub use static_site::StaticSite;

use crate::error::SwResult;
use crate::http::{Request, Response};
use async_trait::async_trait;

/// Abstract network interface
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Perform the request
    async fn fetch(&self, request: &Request) -> SwResult<Response>;

    /// Human-readable description of where requests go
    fn describe(&self) -> String;
}
