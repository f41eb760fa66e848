//! Client configuration.

use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where the handbook server lives and how long a single request may take.
/// There is no retry; a timed-out request is a transport failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: Url,
    pub timeout_secs: u64,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let parsed = Url::parse(base_url).map_err(|source| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(base_url.to_string()));
        }
        Ok(Self {
            base_url: parsed,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_timeout() {
        let config = ClientConfig::new("http://localhost:8080").unwrap();
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.base_url.as_str(), "http://localhost:8080/");
    }

    #[test]
    fn rejects_bad_urls() {
        assert!(matches!(
            ClientConfig::new("not a url"),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            ClientConfig::new("ftp://example.com"),
            Err(ConfigError::UnsupportedScheme(_))
        ));
    }
}
