//! Remote control API client.
//!
//! # Responsibilities
//! - `GET /control` → every stored endpoint entry, still undecoded
//! - `PUT /control` → store one endpoint config
//!
//! Entries are decoded one at a time, so a malformed entry only affects
//! its own endpoint.

use reqwest::StatusCode;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

use crate::control::model::EndpointConfig;
use crate::remote::Remote;

/// Failures talking to the control store.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("control service unreachable: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("control service responded with {0}")]
    Status(StatusCode),

    #[error("control payload could not be decoded: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("stored entry for '{endpoint}' is malformed: {source}")]
    InvalidEntry {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One entry of the control store as received.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEntry(Value);

impl StoredEntry {
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    /// The entry's `endpoint` field, if it is a string.
    pub fn endpoint_key(&self) -> Option<&str> {
        self.0.get("endpoint")?.as_str()
    }

    /// Decode the full config.
    pub fn decode(&self) -> Result<EndpointConfig, ControlError> {
        EndpointConfig::deserialize(&self.0).map_err(|source| ControlError::InvalidEntry {
            endpoint: self.endpoint_key().unwrap_or_default().to_string(),
            source,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ControlList {
    #[serde(default, deserialize_with = "entries")]
    data: Vec<StoredEntry>,
}

/// `data` may be absent, null, or a list of arbitrary values.
fn entries<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<StoredEntry>, D::Error> {
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(raw.unwrap_or_default().into_iter().map(StoredEntry).collect())
}

/// Client for the remote control store.
#[derive(Clone, Debug)]
pub struct ControlClient {
    remote: Remote,
}

impl ControlClient {
    pub fn new(remote: Remote) -> Self {
        Self { remote }
    }

    /// Fetch every entry the store holds.
    pub async fn fetch_all(&self) -> Result<Vec<StoredEntry>, ControlError> {
        let response = self
            .remote
            .http
            .get(self.remote.url("/control"))
            .send()
            .await
            .map_err(ControlError::Transport)?;

        if !response.status().is_success() {
            return Err(ControlError::Status(response.status()));
        }

        let list: ControlList = response.json().await.map_err(ControlError::Decode)?;
        Ok(list.data)
    }

    /// Store one endpoint config.
    pub async fn persist(&self, config: &EndpointConfig) -> Result<(), ControlError> {
        let response = self
            .remote
            .http
            .put(self.remote.url("/control"))
            .json(config)
            .send()
            .await
            .map_err(ControlError::Transport)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ControlError::Status(response.status()))
        }
    }
}
