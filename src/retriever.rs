//! Listing page retrieval
//!
//! Thin wrapper over `reqwest`: one GET per call, any non-2xx status is an
//! error. Retries and backoff are left to the caller.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, instrument};
use url::Url;

use crate::error::FetchError;

/// Default request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default `User-Agent` header
pub const DEFAULT_USER_AGENT: &str = concat!("classified-extract/", env!("CARGO_PKG_VERSION"));

/// Options for the HTTP retriever
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrieverConfig {
    /// Whole-request timeout in milliseconds (default: 30000)
    pub timeout_ms: u64,
    /// `User-Agent` header value
    pub user_agent: String,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Fetches listing pages over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpRetriever {
    client: Client,
}

impl HttpRetriever {
    /// Build a retriever with its own connection pool.
    ///
    /// # Errors
    ///
    /// [`FetchError::Transport`] if the underlying client cannot be built.
    pub fn new(config: &RetrieverConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }

    /// Download the page at `url` and return its body text.
    ///
    /// # Errors
    ///
    /// - [`FetchError::InvalidUrl`] for unparseable or non-http(s) URLs
    /// - [`FetchError::HttpStatus`] for any non-success response
    /// - [`FetchError::Transport`] for network, TLS or decoding failures
    #[instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let parsed = validate_url(url)?;

        info!("Fetching listing page");
        let response = self.client.get(parsed).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        debug!(bytes = body.len(), "Fetched listing page");
        Ok(body)
    }
}

/// Parse `url` and accept only `http` and `https` schemes.
///
/// # Errors
///
/// [`FetchError::InvalidUrl`] with the reason.
pub fn validate_url(url: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::InvalidUrl(format!(
            "{url}: unsupported scheme {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retriever_config_default() {
        let config = RetrieverConfig::default();
        assert_eq!(config.timeout_ms, 30_000);
        assert!(config.user_agent.starts_with("classified-extract/"));
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://sfbay.craigslist.org/sby/mcy/6299581569.html").is_ok());
        assert!(validate_url("http://localhost:8080/x").is_ok());
        assert!(matches!(
            validate_url("ftp://example.org/listing"),
            Err(FetchError::InvalidUrl(_))
        ));
        assert!(matches!(validate_url("not a url"), Err(FetchError::InvalidUrl(_))));
        assert!(matches!(validate_url(""), Err(FetchError::InvalidUrl(_))));
    }

    #[test]
    fn test_retriever_builds() {
        assert!(HttpRetriever::new(&RetrieverConfig::default()).is_ok());
    }
}
