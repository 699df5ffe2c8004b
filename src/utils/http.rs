// src/utils/http.rs

//! HTTP transport.
//!
//! Every page the adapter reads goes through [`Transport::fetch`] with a
//! fixed [`FetchProfile`]. Non-2xx responses are errors, never empty pages.
//! Bodies are capped at `max_body_bytes`, so a stream served where a page
//! was expected costs one chunk, not a full download.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HOST, REFERER, USER_AGENT};
use url::Url;

use crate::document::{Document, charset_from_content_type};
use crate::error::{AppError, Result};
use crate::models::TransportConfig;

/// Request profile applied to every fetch. The method is always GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchProfile {
    pub host: String,
    pub content_type: String,
    pub user_agent: String,
    pub referer: Option<String>,
    pub max_body_bytes: usize,
}

impl From<&TransportConfig> for FetchProfile {
    fn from(config: &TransportConfig) -> Self {
        Self {
            host: config.host.clone(),
            content_type: config.content_type.clone(),
            user_agent: config.user_agent.clone(),
            referer: config.referer.clone(),
            max_body_bytes: config.max_body_bytes,
        }
    }
}

/// A successful response.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// Final URL after redirects
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// Charset declared by the Content-Type header.
    pub fn charset(&self) -> Option<&str> {
        self.content_type
            .as_deref()
            .and_then(charset_from_content_type)
    }

    /// Parse the body as markup.
    pub fn document(&self) -> Document {
        Document::parse(&self.body, self.charset())
    }

    /// Final URL, parsed.
    pub fn final_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.url)?)
    }
}

/// Fetch primitive the adapter depends on.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url` with `profile`. Non-2xx status is an error.
    async fn fetch(&self, url: &str, profile: &FetchProfile) -> Result<FetchResponse>;
}

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &TransportConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()?;
    Ok(client)
}

/// [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &TransportConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str, profile: &FetchProfile) -> Result<FetchResponse> {
        let target = Url::parse(url)?;
        log::debug!("GET {}", target);

        let mut request = self
            .client
            .get(target.clone())
            .header(USER_AGENT, &profile.user_agent)
            .header(CONTENT_TYPE, &profile.content_type);
        if target.host_str() == Some(profile.host.as_str()) {
            request = request.header(HOST, &profile.host);
        }
        if let Some(referer) = &profile.referer {
            request = request.header(REFERER, referer);
        }

        let mut response = request
            .send()
            .await
            .map_err(|e| AppError::transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::transport(url, format!("status {}", status.as_u16())));
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| AppError::transport(url, e))?
        {
            let room = profile.max_body_bytes.saturating_sub(body.len());
            body.extend_from_slice(&chunk[..chunk.len().min(room)]);
            if body.len() >= profile.max_body_bytes {
                log::debug!("Body of {} capped at {} bytes", url, profile.max_body_bytes);
                break;
            }
        }

        Ok(FetchResponse {
            url: final_url,
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

/// A canned response served by [`MemoryTransport`].
#[derive(Debug, Clone)]
struct MemoryPage {
    status: u16,
    content_type: Option<String>,
    body: Vec<u8>,
}

/// [`Transport`] serving canned pages, keyed by exact URL.
///
/// Unknown URLs answer 404. Used for fixtures and offline hosts.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    pages: HashMap<String, MemoryPage>,
    requests: Mutex<Vec<String>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` with status 200.
    pub fn with_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        let html: String = html.into();
        self.with_response(url, 200, Some("text/html; charset=utf-8"), html)
    }

    /// Serve an arbitrary response.
    pub fn with_response(
        mut self,
        url: impl Into<String>,
        status: u16,
        content_type: Option<&str>,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        self.pages.insert(
            url.into(),
            MemoryPage {
                status,
                content_type: content_type.map(String::from),
                body: body.into(),
            },
        );
        self
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn fetch(&self, url: &str, profile: &FetchProfile) -> Result<FetchResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }

        let page = self
            .pages
            .get(url)
            .ok_or_else(|| AppError::transport(url, "status 404"))?;
        if !(200..300).contains(&page.status) {
            return Err(AppError::transport(url, format!("status {}", page.status)));
        }

        Ok(FetchResponse {
            url: url.to_string(),
            status: page.status,
            content_type: page.content_type.clone(),
            body: page.body[..page.body.len().min(profile.max_body_bytes)].to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> FetchProfile {
        FetchProfile::from(&TransportConfig::default())
    }

    #[test]
    fn test_profile_from_config() {
        let profile = profile();
        assert_eq!(profile.host, "www.yhdmz.org");
        assert!(profile.user_agent.contains("Edg/114"));
        assert_eq!(profile.content_type, "text/html; charset=utf-8");
    }

    #[test]
    fn test_create_async_client() {
        assert!(HttpTransport::new(&TransportConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_memory_transport_serves_and_records() {
        let transport = MemoryTransport::new().with_page("https://a.test/", "<p>hi</p>");
        let response = transport.fetch("https://a.test/", &profile()).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.charset(), Some("utf-8"));
        assert_eq!(
            response.document().first("p").unwrap().unwrap().text(),
            "hi"
        );
        assert_eq!(transport.requests(), vec!["https://a.test/".to_string()]);
    }

    #[tokio::test]
    async fn test_body_is_capped() {
        let transport = MemoryTransport::new().with_response(
            "https://cdn.x/stream?id=5",
            200,
            Some("video/mp4"),
            vec![0u8; 4096],
        );
        let profile = FetchProfile {
            max_body_bytes: 512,
            ..profile()
        };
        let response = transport
            .fetch("https://cdn.x/stream?id=5", &profile)
            .await
            .unwrap();
        assert_eq!(response.body.len(), 512);
        assert_eq!(response.content_type.as_deref(), Some("video/mp4"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let transport =
            MemoryTransport::new().with_response("https://a.test/gone", 500, None, Vec::new());
        let err = transport
            .fetch("https://a.test/gone", &profile())
            .await
            .unwrap_err();
        assert!(err.is_transport());

        let err = transport
            .fetch("https://a.test/missing", &profile())
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }
}
