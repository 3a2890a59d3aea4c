use crate::{PreviewError, PreviewMetadata};
use async_trait::async_trait;
use reqwest::{header::HeaderMap, Client};
use std::time::Duration;
use tracing::{debug, error, instrument, warn};
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://open-apis.hax.cloud/api/services/website/metadata";
pub const ENDPOINT_ENV: &str = "LINK_PREVIEW_ENDPOINT";
pub const TIMEOUT_ENV: &str = "LINK_PREVIEW_TIMEOUT_SECS";

/// Anything that can resolve a target URL into Open Graph metadata.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn lookup(&self, target: &str) -> Result<PreviewMetadata, PreviewError>;
}

#[async_trait]
impl<S: MetadataSource + ?Sized> MetadataSource for std::sync::Arc<S> {
    async fn lookup(&self, target: &str) -> Result<PreviewMetadata, PreviewError> {
        (**self).lookup(target).await
    }
}

/// Configuration for the HTTP metadata fetcher.
///
/// # Examples
/// ```ignore
/// let fetcher = Fetcher::new_with_config(FetcherConfig {
///     endpoint: "http://localhost:8080/metadata".to_string(),
///     timeout: Duration::from_secs(3),
///     ..Default::default()
/// });
/// ```
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub endpoint: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub headers: Option<HeaderMap>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: concat!("link-preview-card/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(10),
            headers: None,
        }
    }
}

impl FetcherConfig {
    /// Default configuration with `LINK_PREVIEW_ENDPOINT` and
    /// `LINK_PREVIEW_TIMEOUT_SECS` applied when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            debug!(endpoint = %endpoint, "Using metadata endpoint from environment");
            config.endpoint = endpoint;
        }

        if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => config.timeout = Duration::from_secs(secs),
                Err(e) => warn!(value = %raw, error = %e, "Ignoring invalid timeout override"),
            }
        }

        config
    }
}

/// Looks up metadata over HTTP: `GET <endpoint>?q=<target>`.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    endpoint: String,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher {
    pub fn new() -> Self {
        debug!("Fetcher initialized with default configuration");
        Self::new_with_config(FetcherConfig::default())
    }

    /// Builds a fetcher, falling back to a default client when the
    /// configuration cannot be applied. An invalid endpoint then surfaces
    /// on every lookup instead.
    pub fn new_with_config(config: FetcherConfig) -> Self {
        let endpoint = config.endpoint.clone();
        Self::try_new_with_config(config).unwrap_or_else(|e| {
            e.log();
            Self::with_client(Client::new(), endpoint)
        })
    }

    pub fn try_new_with_config(config: FetcherConfig) -> Result<Self, PreviewError> {
        Url::parse(&config.endpoint)?;
        let endpoint = config.endpoint;

        let mut client_builder = Client::builder()
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .pool_max_idle_per_host(10);

        if let Some(headers) = config.headers {
            client_builder = client_builder.default_headers(headers);
        }

        let client = client_builder.build().map_err(|e| {
            error!(error = %e, "Failed to create HTTP client");
            PreviewError::ClientBuildError(e.to_string())
        })?;

        Ok(Self { client, endpoint })
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The full lookup URL for a target, with the target encoded as the
    /// `q` query value.
    pub fn request_url(&self, target: &str) -> Result<Url, PreviewError> {
        let mut url = Url::parse(&self.endpoint)?;
        url.query_pairs_mut().append_pair("q", target);
        Ok(url)
    }

    #[instrument(level = "debug", skip(self, target), fields(target_url = %target), err)]
    pub async fn fetch(&self, target: &str) -> Result<PreviewMetadata, PreviewError> {
        let request_url = self.request_url(target)?;
        debug!(url = %request_url, "Starting metadata request");

        let response = self
            .client
            .get(request_url)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, target_url = %target, "Failed to send request");
                PreviewError::from_reqwest_error(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, target_url = %target, "Metadata service returned error status");
            return Err(PreviewError::HttpError {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| {
            error!(error = %e, target_url = %target, "Failed to read response body");
            PreviewError::from_reqwest_error(e)
        })?;

        let metadata = PreviewMetadata::from_response_body(&body)?;
        debug!(target_url = %target, keys = metadata.len(), "Successfully fetched metadata");
        Ok(metadata)
    }
}

#[async_trait]
impl MetadataSource for Fetcher {
    async fn lookup(&self, target: &str) -> Result<PreviewMetadata, PreviewError> {
        self.fetch(target).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_url_encodes_target() {
        let fetcher = Fetcher::new_with_config(FetcherConfig {
            endpoint: "https://meta.example.com/api?format=json".to_string(),
            ..Default::default()
        });

        let url = fetcher
            .request_url("https://site.example/a b?x=1&y=2")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://meta.example.com/api?format=json&q=https%3A%2F%2Fsite.example%2Fa+b%3Fx%3D1%26y%3D2"
        );

        let pairs: Vec<_> = url.query_pairs().collect();
        assert_eq!(pairs[1].1, "https://site.example/a b?x=1&y=2");
    }

    #[test]
    fn test_invalid_endpoint_is_rejected() {
        let result = Fetcher::try_new_with_config(FetcherConfig {
            endpoint: "not a url".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(PreviewError::InvalidEndpoint(_))));

        let fetcher = Fetcher::with_client(Client::new(), "not a url");
        assert!(fetcher.request_url("https://example.com").is_err());
    }
}
