//! A network that is down

use super::Fetcher;
use crate::error::{SwError, SwResult};
use crate::http::{Request, Response};
use async_trait::async_trait;

/// Fails every request as a network error
#[derive(Debug, Default)]
pub struct Disconnected;

#[async_trait]
impl Fetcher for Disconnected {
    async fn fetch(&self, request: &Request) -> SwResult<Response> {
        Err(SwError::network(&request.url, "offline"))
    }

    fn describe(&self) -> String {
        "offline".to_string()
    }
}
