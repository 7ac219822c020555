//! Request and response types shared by the worker, cache storage and fetchers
//!
//! These mirror what a fetch event carries: a request with a destination
//! (so navigations can be told apart from subresources) and a captured
//! response with a status, headers, a body and a response type.

use crate::error::{SwError, SwResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use ureq::http::Uri;

/// What the requesting page is going to do with the response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    /// Full-page navigation
    Document,
    Image,
    Script,
    Style,
    Font,
    Manifest,
    /// fetch()/XHR and anything else without a destination
    #[default]
    Empty,
}

impl Destination {
    /// Whether a failed request for this destination should get the offline page
    pub fn is_navigation(&self) -> bool {
        matches!(self, Self::Document)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Document => "document",
            Self::Image => "image",
            Self::Script => "script",
            Self::Style => "style",
            Self::Font => "font",
            Self::Manifest => "manifest",
            Self::Empty => "",
        };
        write!(f, "{}", s)
    }
}

/// How the response was obtained, relative to the requesting origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Same-origin response
    Basic,
    /// Cross-origin response with CORS headers
    Cors,
    /// Cross-origin response without CORS, body not readable
    Opaque,
    /// Network error placeholder
    Error,
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic => write!(f, "basic"),
            Self::Cors => write!(f, "cors"),
            Self::Opaque => write!(f, "opaque"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Request identity used as the cache key: method plus fragment-less URL
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestKey {
    pub method: String,
    pub url: String,
}

impl RequestKey {
    /// Build a GET key for a URL
    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    pub fn new(method: &str, url: impl Into<String>) -> Self {
        let url = url.into();
        let url = match url.split_once('#') {
            Some((base, _)) => base.to_string(),
            None => url,
        };
        Self {
            method: method.to_ascii_uppercase(),
            url,
        }
    }

    /// Stable digest used as the on-disk file name for this key
    pub fn digest(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(self.method.as_bytes());
        hasher.update(b" ");
        hasher.update(self.url.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// An outgoing request as seen by the worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub url: String,
    pub destination: Destination,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Request {
    /// GET request for a subresource or API call
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.into(),
            destination: Destination::Empty,
            headers: vec![],
            body: vec![],
        }
    }

    /// GET request for a full-page navigation
    pub fn navigate(url: impl Into<String>) -> Self {
        Self::get(url).with_destination(Destination::Document)
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    pub fn with_method(mut self, method: &str) -> Self {
        self.method = method.to_ascii_uppercase();
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn key(&self) -> RequestKey {
        RequestKey::new(&self.method, self.url.clone())
    }
}

/// A captured response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// URL the response was produced for
    pub url: String,
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    /// Stored separately on disk
    #[serde(skip, default)]
    pub body: Vec<u8>,
}

impl Response {
    /// Build a same-origin response
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            url: url.into(),
            status,
            status_text: status_text(status).to_string(),
            headers: vec![],
            response_type: ResponseType::Basic,
            body: body.into(),
        }
    }

    pub fn with_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Status in the 2xx range
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Only plain 200 same-origin responses are worth keeping
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && self.response_type == ResponseType::Basic
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body as lossy UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Canonical reason phrase for the statuses a static host produces
pub fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "",
    }
}

/// Scheme plus authority of a URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    scheme: String,
    authority: String,
}

impl Origin {
    /// Parse the origin out of an absolute URL
    pub fn parse(url: &str) -> SwResult<Self> {
        let uri: Uri = url
            .parse()
            .map_err(|e| SwError::InvalidUrl(format!("{}: {}", url, e)))?;
        let scheme = uri
            .scheme_str()
            .ok_or_else(|| SwError::InvalidUrl(format!("{}: missing scheme", url)))?;
        let authority = uri
            .authority()
            .ok_or_else(|| SwError::InvalidUrl(format!("{}: missing host", url)))?;
        Ok(Self {
            scheme: scheme.to_ascii_lowercase(),
            authority: authority.as_str().to_ascii_lowercase(),
        })
    }

    /// Whether an absolute URL belongs to this origin
    pub fn contains(&self, url: &str) -> bool {
        Self::parse(url).is_ok_and(|other| other == *self)
    }

    /// Resolve a root-relative path against this origin; absolute URLs pass through
    pub fn resolve(&self, path: &str) -> String {
        if path.contains("://") {
            return path.to_string();
        }
        let path = path.trim_start_matches('/');
        format!("{}/{}", self, path)
    }

    /// Path component of a URL on this origin, without the query string
    pub fn path_of(&self, url: &str) -> Option<String> {
        if !self.contains(url) {
            return None;
        }
        let uri: Uri = url.parse().ok()?;
        Some(uri.path().to_string())
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.authority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_strips_fragment_and_uppercases() {
        let key = RequestKey::new("get", "https://example.com/index.html#about");
        assert_eq!(key.method, "GET");
        assert_eq!(key.url, "https://example.com/index.html");
    }

    #[test]
    fn key_digest_is_stable_and_method_sensitive() {
        let a = RequestKey::get("https://example.com/");
        let b = RequestKey::get("https://example.com/");
        let c = RequestKey::new("HEAD", "https://example.com/");
        assert_eq!(a.digest(), b.digest());
        assert_ne!(a.digest(), c.digest());
        assert_eq!(a.digest().len(), 64);
    }

    #[test]
    fn cacheable_requires_200_and_basic() {
        let ok = Response::new("https://example.com/", 200, "hi");
        assert!(ok.is_cacheable());
        assert!(!Response::new("https://example.com/", 404, "").is_cacheable());
        assert!(!Response::new("https://example.com/", 204, "").is_cacheable());
        assert!(!ok.clone().with_type(ResponseType::Opaque).is_cacheable());
        assert!(!ok.with_type(ResponseType::Cors).is_cacheable());
    }

    #[test]
    fn header_lookup_ignores_case() {
        let res = Response::new("u", 200, "").with_header("Content-Type", "text/html");
        assert_eq!(res.header("content-type"), Some("text/html"));
        assert_eq!(res.header("etag"), None);
    }

    #[test]
    fn origin_parse_and_contains() {
        let origin = Origin::parse("https://Example.com/portfolio/").unwrap();
        assert_eq!(origin.to_string(), "https://example.com");
        assert!(origin.contains("https://example.com/icon-192x192.png"));
        assert!(!origin.contains("https://cdn.example.com/font.woff2"));
        assert!(!origin.contains("http://example.com/"));
    }

    #[test]
    fn origin_rejects_relative() {
        assert!(Origin::parse("/index.html").is_err());
    }

    #[test]
    fn origin_resolve() {
        let origin = Origin::parse("http://localhost:4173").unwrap();
        assert_eq!(origin.resolve("/"), "http://localhost:4173/");
        assert_eq!(
            origin.resolve("/manifest.json"),
            "http://localhost:4173/manifest.json"
        );
        assert_eq!(
            origin.resolve("https://cdn.example.com/x.js"),
            "https://cdn.example.com/x.js"
        );
    }

    #[test]
    fn origin_path_of() {
        let origin = Origin::parse("http://localhost:4173").unwrap();
        assert_eq!(
            origin.path_of("http://localhost:4173/assets/app.js?v=2").as_deref(),
            Some("/assets/app.js")
        );
        assert_eq!(origin.path_of("https://other.dev/a"), None);
    }

    #[test]
    fn destination_navigation() {
        assert!(Destination::Document.is_navigation());
        assert!(!Destination::Image.is_navigation());
        assert!(!Destination::default().is_navigation());
    }
}
