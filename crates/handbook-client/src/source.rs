//! # Content Sources
//!
//! [`ContentSource`] is the seam between the navigator and the Policy
//! Content Endpoint. [`HttpContentSource`] talks to a running server over
//! `reqwest`; tests substitute in-memory sources.
//!
//! ## Response Shapes
//!
//! - Introduction: the raw response body, treated as markup text.
//! - Policy: a JSON envelope `{ "content": "<markup>" }`. Anything else,
//!   including a body that is not JSON at all, is a
//!   [`FetchError::MalformedEnvelope`].
//!
//! Non-2xx responses are [`FetchError::Status`] for both. There is no
//! retry; the request timeout comes from [`ClientConfig`].

use std::future::Future;
use std::time::Duration;

use handbook_core::{INTRODUCTION_CONTENT_PATH, NAVIGATION_PATH};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ConfigError, FetchError};
use crate::sidebar::NavigationDocument;

/// A validated policy response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyEnvelope {
    pub content: String,
}

impl PolicyEnvelope {
    /// Check the envelope shape: an object with a string `content` field.
    /// Extra fields are ignored.
    pub fn from_value(url: &str, value: serde_json::Value) -> Result<Self, FetchError> {
        let malformed = |reason: &str| FetchError::MalformedEnvelope {
            url: url.to_string(),
            reason: reason.to_string(),
        };
        let serde_json::Value::Object(mut fields) = value else {
            return Err(malformed("response is not a JSON object"));
        };
        match fields.remove("content") {
            Some(serde_json::Value::String(content)) => Ok(Self { content }),
            Some(_) => Err(malformed("`content` is not a string")),
            None => Err(malformed("missing `content` field")),
        }
    }

    /// Parse a raw response body.
    pub fn from_body(url: &str, body: &str) -> Result<Self, FetchError> {
        let value = serde_json::from_str(body).map_err(|e| FetchError::MalformedEnvelope {
            url: url.to_string(),
            reason: format!("body is not JSON: {e}"),
        })?;
        Self::from_value(url, value)
    }
}

/// Where the navigator gets its content from.
pub trait ContentSource: Send + Sync {
    /// Fetch the introduction fragment.
    fn fetch_introduction(&self) -> impl Future<Output = Result<String, FetchError>> + Send;

    /// Fetch a policy envelope from `url`, typically a sidebar href or a
    /// related-policy trigger's `data-url`.
    fn fetch_policy(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<PolicyEnvelope, FetchError>> + Send;
}

/// HTTP client for the Policy Content Endpoint.
///
/// Relative hrefs are resolved against the configured base URL, so
/// server-absolute paths such as `/handbook/policy/7/content/` and fully
/// qualified URLs both work.
#[derive(Debug, Clone)]
pub struct HttpContentSource {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpContentSource {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch the navigation document the sidebar is built from.
    pub async fn fetch_navigation(&self) -> Result<NavigationDocument, FetchError> {
        let (url, body) = self.get_text(NAVIGATION_PATH).await?;
        serde_json::from_str(&body).map_err(|source| FetchError::Decode { url, source })
    }

    fn resolve(&self, href: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(href)
            .map_err(|e| FetchError::transport(href, format!("invalid URL: {e}")))
    }

    /// GET `href` and return the resolved URL with the body of a 2xx
    /// response.
    async fn get_text(&self, href: &str) -> Result<(String, String), FetchError> {
        let url = self.resolve(href)?;
        let url_str = url.to_string();
        tracing::debug!(url = %url_str, "fetching");

        let resp = self.client.get(url).send().await.map_err(|e| FetchError::Transport {
            url: url_str.clone(),
            source: Box::new(e),
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url_str,
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = resp.text().await.map_err(|e| FetchError::Transport {
            url: url_str.clone(),
            source: Box::new(e),
        })?;
        Ok((url_str, body))
    }
}

impl ContentSource for HttpContentSource {
    async fn fetch_introduction(&self) -> Result<String, FetchError> {
        let (_, body) = self.get_text(INTRODUCTION_CONTENT_PATH).await?;
        Ok(body)
    }

    async fn fetch_policy(&self, url: &str) -> Result<PolicyEnvelope, FetchError> {
        let (resolved, body) = self.get_text(url).await?;
        PolicyEnvelope::from_body(&resolved, &body)
    }
}
