//! Live HTTP origin

use super::Fetcher;
use crate::error::{SwError, SwResult};
use crate::http::{Origin, Request, Response, ResponseType};
use async_trait::async_trait;
use tracing::debug;
use ureq::Agent;

/// Fetches over HTTP(S) with a blocking client on the blocking pool
///
/// Responses from the configured origin are `basic`; everything else is
/// treated as a CORS response and therefore never cached.
pub struct HttpFetcher {
    agent: Agent,
    origin: Origin,
}

impl HttpFetcher {
    pub fn new(origin: Origin) -> Self {
        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent, origin }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &Request) -> SwResult<Response> {
        let agent = self.agent.clone();
        let req = request.clone();

        let (status, headers, body) = tokio::task::spawn_blocking(move || {
            let mut builder = ureq::http::Request::builder()
                .method(req.method.as_str())
                .uri(req.url.as_str());
            for (name, value) in &req.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            let http_request = builder
                .body(req.body.as_slice())
                .map_err(|e| SwError::InvalidUrl(format!("{}: {}", req.url, e)))?;

            let mut response = agent
                .run(http_request)
                .map_err(|e| SwError::network(&req.url, e.to_string()))?;

            let status = response.status().as_u16();
            let headers: Vec<(String, String)> = response
                .headers()
                .iter()
                .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
                .collect();
            let body = response
                .body_mut()
                .read_to_vec()
                .map_err(|e| SwError::network(&req.url, e.to_string()))?;

            Ok::<_, SwError>((status, headers, body))
        })
        .await
        .map_err(|e| SwError::Internal(format!("fetch task failed: {}", e)))??;

        debug!("{} {} -> {}", request.method, request.url, status);

        let response_type = if self.origin.contains(&request.url) {
            ResponseType::Basic
        } else {
            ResponseType::Cors
        };

        let mut response = Response::new(&request.url, status, body).with_type(response_type);
        response.headers = headers;
        Ok(response)
    }

    fn describe(&self) -> String {
        format!("{} (http)", self.origin)
    }
}
