//! A built static site served the way a static host serves it

use super::Fetcher;
use crate::error::{SwError, SwResult};
use crate::http::{Origin, Request, Response};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::fs;
use tracing::debug;

/// Serves files from a directory (e.g. `dist/`) for one origin
///
/// `/` and directory paths map to `index.html`, missing files are `404`,
/// and requests for any other origin fail as network errors. Offline mode
/// makes every request fail.
pub struct StaticSite {
    root: PathBuf,
    origin: Origin,
    offline: AtomicBool,
}

impl StaticSite {
    pub fn new(root: impl Into<PathBuf>, origin: Origin) -> Self {
        Self {
            root: root.into(),
            origin,
            offline: AtomicBool::new(false),
        }
    }

    /// Simulate losing connectivity (or regaining it)
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a URL path to a file under the root, refusing traversal
    async fn file_for(&self, url_path: &str) -> Option<PathBuf> {
        let relative = Path::new(url_path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }

        let mut path = self.root.join(relative);
        let is_dir = fs::metadata(&path).await.is_ok_and(|m| m.is_dir());
        if url_path.ends_with('/') || is_dir {
            path = path.join("index.html");
        }
        Some(path)
    }
}

#[async_trait]
impl Fetcher for StaticSite {
    async fn fetch(&self, request: &Request) -> SwResult<Response> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(SwError::network(&request.url, "offline"));
        }

        let url_path = self
            .origin
            .path_of(&request.url)
            .ok_or_else(|| SwError::network(&request.url, "host unreachable"))?;

        if !matches!(request.method.as_str(), "GET" | "HEAD") {
            return Ok(Response::new(&request.url, 405, Vec::new()));
        }

        let Some(path) = self.file_for(&url_path).await else {
            return Ok(Response::new(&request.url, 404, Vec::new()));
        };

        let body = match fs::read(&path).await {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} -> 404", url_path);
                return Ok(Response::new(&request.url, 404, Vec::new()));
            }
            Err(e) => {
                return Err(SwError::io(format!("reading {}", path.display()), e));
            }
        };

        let length = body.len().to_string();
        let body = if request.method == "HEAD" { vec![] } else { body };
        debug!("{} -> 200 ({} bytes)", url_path, length);

        Ok(Response::new(&request.url, 200, body)
            .with_header("content-type", content_type(&path))
            .with_header("content-length", &length))
    }

    fn describe(&self) -> String {
        format!("{} (static files in {})", self.origin, self.root.display())
    }
}

/// Content type by file extension
fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("js") | Some("mjs") => "text/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("json") => "application/json",
        Some("webmanifest") => "application/manifest+json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("woff2") => "font/woff2",
        Some("woff") => "font/woff",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}
