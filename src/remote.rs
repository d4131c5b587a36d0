//! Shared HTTP client for the remote control and trace services.
//!
//! Both services authenticate with the same static credential, so it is
//! installed once as a default header on a single `reqwest::Client`.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use thiserror::Error;

use crate::config::RemoteConfig;

/// Errors building the remote client.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("invalid credential header name '{0}'")]
    HeaderName(String),

    #[error("credential is not a valid header value")]
    HeaderValue,

    #[error("invalid remote base URL '{url}': {reason}")]
    BaseUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Connection details for the remote services.
#[derive(Clone, Debug)]
pub struct Remote {
    pub(crate) http: reqwest::Client,
    base_url: String,
}

impl Remote {
    /// Build the authenticated client from configuration.
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        url::Url::parse(&config.base_url).map_err(|e| RemoteError::BaseUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;

        let name = HeaderName::from_bytes(config.api_key_header.as_bytes())
            .map_err(|_| RemoteError::HeaderName(config.api_key_header.clone()))?;
        let mut value =
            HeaderValue::from_str(&config.api_key).map_err(|_| RemoteError::HeaderValue)?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(name, value);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Absolute URL for a path under the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
