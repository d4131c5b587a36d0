//! Endpoint configuration resolution.
//!
//! # Responsibilities
//! - Look up the config for an endpoint key in the control store
//! - Create and persist the default entry for unseen keys
//! - Optionally serve recent lookups from a local cache
//!
//! # Design Decisions
//! - Cache misses and registrations run one at a time per key, so racing
//!   requests for a new key build and persist its default once
//! - Stored entries are decoded individually; only the requested key's
//!   entry can fail its resolution

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::control::client::{ControlClient, ControlError, StoredEntry};
use crate::control::model::EndpointConfig;
use crate::observability::metrics;

struct CachedConfig {
    config: EndpointConfig,
    fetched_at: Instant,
}

/// Resolves [`EndpointConfig`]s, one independent lookup per call.
pub struct ConfigResolver {
    client: ControlClient,
    cache: DashMap<String, CachedConfig>,
    flights: DashMap<String, Arc<Mutex<()>>>,
    ttl: Option<Duration>,
}

impl ConfigResolver {
    /// `ttl` of zero disables caching: every resolve reads the store.
    pub fn new(client: ControlClient, ttl: Duration) -> Self {
        Self {
            client,
            cache: DashMap::new(),
            flights: DashMap::new(),
            ttl: (!ttl.is_zero()).then_some(ttl),
        }
    }

    /// Resolve the config for `endpoint_key`.
    ///
    /// A failed read of the store, or a malformed entry for this key, is an
    /// error. A failed write of a new default entry is logged and the
    /// default is returned anyway.
    pub async fn resolve(&self, endpoint_key: &str) -> Result<EndpointConfig, ControlError> {
        if let Some(config) = self.cached(endpoint_key) {
            return Ok(config);
        }

        // Uncached: known keys take the fast path without waiting on others.
        if self.ttl.is_none() {
            if let Some(config) = self.lookup(endpoint_key).await? {
                return Ok(config);
            }
        }

        let flight = self.flight(endpoint_key);
        let _turn = flight.lock().await;

        if let Some(config) = self.cached(endpoint_key) {
            return Ok(config);
        }
        if let Some(config) = self.lookup(endpoint_key).await? {
            return Ok(config);
        }
        Ok(self.register(endpoint_key).await)
    }

    /// Read the store and decode the entry for `endpoint_key`, if any.
    async fn lookup(&self, endpoint_key: &str) -> Result<Option<EndpointConfig>, ControlError> {
        let entries = self.client.fetch_all().await?;
        self.refresh(&entries);

        entries
            .iter()
            .find(|entry| entry.endpoint_key() == Some(endpoint_key))
            .map(StoredEntry::decode)
            .transpose()
    }

    async fn register(&self, endpoint_key: &str) -> EndpointConfig {
        let config = EndpointConfig::first_seen(endpoint_key);
        tracing::info!(endpoint = %endpoint_key, "Registering new endpoint with default controls");
        if let Err(e) = self.client.persist(&config).await {
            tracing::warn!(endpoint = %endpoint_key, error = %e, "Failed to persist default endpoint config");
            metrics::record_control_failure("persist");
        }
        self.store(config.clone());
        config
    }

    fn flight(&self, endpoint_key: &str) -> Arc<Mutex<()>> {
        self.flights
            .entry(endpoint_key.to_string())
            .or_default()
            .clone()
    }

    fn cached(&self, endpoint_key: &str) -> Option<EndpointConfig> {
        let ttl = self.ttl?;
        let entry = self.cache.get(endpoint_key)?;
        (entry.fetched_at.elapsed() < ttl).then(|| entry.config.clone())
    }

    fn refresh(&self, entries: &[StoredEntry]) {
        if self.ttl.is_none() {
            return;
        }
        for entry in entries {
            match entry.decode() {
                Ok(config) => self.store(config),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping malformed control entry");
                    metrics::record_control_failure("decode");
                }
            }
        }
    }

    fn store(&self, config: EndpointConfig) {
        if self.ttl.is_none() {
            return;
        }
        self.cache.insert(
            config.endpoint_key.clone(),
            CachedConfig {
                config,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Number of cached entries.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}
