//! Content fetcher error types.

/// A single fetch failed. Every variant is handled the same way by the
/// navigator (inline error notice, logged diagnostic); the distinction
/// exists for logs and for callers of [`crate::HttpContentSource`].
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request never produced a response.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The server answered with a non-2xx status.
    #[error("{url} returned {status} {reason}")]
    Status {
        url: String,
        status: u16,
        reason: String,
    },

    /// The policy envelope lacked a string `content` field.
    #[error("malformed response from {url}: {reason}")]
    MalformedEnvelope { url: String, reason: String },

    /// A JSON document other than the policy envelope failed to decode.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. }
            | Self::Status { url, .. }
            | Self::MalformedEnvelope { url, .. }
            | Self::Decode { url, .. } => url,
        }
    }

    /// Transport failure with a plain message.
    pub fn transport(url: impl Into<String>, message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self::Transport {
            url: url.into(),
            source: message.into(),
        }
    }
}

/// An interaction named something the navigator does not have.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("no sidebar entry at index {0}")]
    UnknownEntry(usize),

    #[error("no bound related-policy trigger at index {0}")]
    UnboundTrigger(usize),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base URL {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("base URL {0:?} must be an http(s) URL")]
    UnsupportedScheme(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
