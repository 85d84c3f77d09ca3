// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Resource loader with caching, request de-duplication, timeouts and
//! exponential-backoff retries.
//!
//! Concurrent loads of the same resource share one in-flight future, so a
//! burst of callers produces a single fetch. Successful results are cached
//! for the configured TTL; failures are never cached.

use crate::config::Config;
use crate::data::cache::ResourceCache;
use crate::data::source::{SourceError, StaticSource};
use crate::data::{geojson_check, ResourceKey};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Errors from [`DataLoader::load`]. `Clone` so de-duplicated waiters can
/// all receive the same failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LoadError {
    #[error("Timed out after {timeout_ms} ms loading {key}")]
    Timeout { key: String, timeout_ms: u128 },

    #[error("Failed to load {key}: {error}")]
    Source { key: String, error: SourceError },

    #[error("Invalid GeoJSON in {key}: {}", .errors.join("; "))]
    InvalidGeoJson { key: String, errors: Vec<String> },

    #[error("Giving up on {key} after {attempts} attempts: {last}")]
    Exhausted {
        key: String,
        attempts: u32,
        last: Box<LoadError>,
    },
}

/// Loader tunables.
#[derive(Debug, Clone)]
pub struct LoaderSettings {
    pub cache_ttl: Duration,
    pub request_timeout: Duration,
    /// Timeout for `geojson-*` resources.
    pub geometry_timeout: Duration,
    /// Total attempts per load.
    pub max_retries: u32,
    /// Wait before the second attempt; doubled for each further attempt.
    pub retry_backoff: Duration,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(300),
            request_timeout: Duration::from_secs(10),
            geometry_timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_backoff: Duration::from_secs(1),
        }
    }
}

impl From<&Config> for LoaderSettings {
    fn from(config: &Config) -> Self {
        Self {
            cache_ttl: config.cache_ttl,
            request_timeout: config.request_timeout,
            geometry_timeout: config.geometry_timeout,
            max_retries: config.max_retries,
            retry_backoff: config.retry_backoff,
        }
    }
}

/// Per-call options.
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    pub use_cache: bool,
    pub timeout: Duration,
    pub max_retries: u32,
}

type SharedLoad = Shared<BoxFuture<'static, Result<Arc<Value>, LoadError>>>;

struct LoaderInner {
    source: Arc<dyn StaticSource>,
    cache: ResourceCache,
    in_flight: DashMap<String, SharedLoad>,
    settings: LoaderSettings,
}

/// Cache-or-fetch loader for static resources.
#[derive(Clone)]
pub struct DataLoader {
    inner: Arc<LoaderInner>,
}

impl DataLoader {
    pub fn new(source: Arc<dyn StaticSource>, settings: LoaderSettings) -> Self {
        Self {
            inner: Arc::new(LoaderInner {
                source,
                cache: ResourceCache::new(settings.cache_ttl),
                in_flight: DashMap::new(),
                settings,
            }),
        }
    }

    pub fn settings(&self) -> &LoaderSettings {
        &self.inner.settings
    }

    /// Default options for `key`.
    pub fn options_for(&self, key: &ResourceKey) -> LoadOptions {
        let settings = &self.inner.settings;
        LoadOptions {
            use_cache: true,
            timeout: if key.is_geometry() {
                settings.geometry_timeout
            } else {
                settings.request_timeout
            },
            max_retries: settings.max_retries,
        }
    }

    pub async fn load(&self, key: &ResourceKey) -> Result<Arc<Value>, LoadError> {
        self.load_with(key, self.options_for(key)).await
    }

    pub async fn load_with(
        &self,
        key: &ResourceKey,
        options: LoadOptions,
    ) -> Result<Arc<Value>, LoadError> {
        let cache_key = key.cache_key();

        if options.use_cache {
            if let Some(value) = self.inner.cache.get(&cache_key) {
                tracing::trace!(key = %cache_key, "Resource cache hit");
                return Ok(value);
            }
        }

        self.pending_load(key, cache_key, options).await
    }

    /// Join the in-flight load for `key`, or start one.
    fn pending_load(&self, key: &ResourceKey, cache_key: String, options: LoadOptions) -> SharedLoad {
        match self.inner.in_flight.entry(cache_key.clone()) {
            Entry::Occupied(entry) => {
                tracing::debug!(key = %cache_key, "Joining in-flight load");
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                let inner = Arc::clone(&self.inner);
                let key = key.clone();
                let load = async move {
                    let result = inner.fetch_with_retry(&key, options).await;
                    if let Ok(value) = &result {
                        inner.cache.insert(&cache_key, Arc::clone(value));
                    }
                    inner.in_flight.remove(&cache_key);
                    result
                }
                .boxed()
                .shared();
                entry.insert(load.clone());
                load
            }
        }
    }

    /// Seed the cache with a value obtained elsewhere (e.g. the live API).
    pub fn prime(&self, key: &ResourceKey, value: Value) -> Arc<Value> {
        let value = Arc::new(value);
        self.inner.cache.insert(&key.cache_key(), Arc::clone(&value));
        value
    }

    pub fn is_cached(&self, key: &ResourceKey) -> bool {
        self.inner.cache.get(&key.cache_key()).is_some()
    }

    pub fn invalidate(&self, key: &ResourceKey) {
        self.inner.cache.invalidate(&key.cache_key());
    }

    /// Drop every cached resource.
    pub fn clear(&self) {
        self.inner.cache.clear();
    }
}

impl LoaderInner {
    async fn fetch_with_retry(
        &self,
        key: &ResourceKey,
        options: LoadOptions,
    ) -> Result<Arc<Value>, LoadError> {
        let attempts = options.max_retries.max(1);
        let mut backoff = self.settings.retry_backoff;
        let mut attempt = 1;

        loop {
            let error = match self.fetch_once(key, options.timeout).await {
                Ok(value) => return Ok(value),
                // Retrying will not fix a malformed file.
                Err(error @ LoadError::InvalidGeoJson { .. }) => return Err(error),
                Err(error) => error,
            };

            tracing::warn!(key = %key, attempt, attempts, error = %error, "Resource fetch failed");

            if attempt >= attempts {
                return Err(LoadError::Exhausted {
                    key: key.cache_key(),
                    attempts,
                    last: Box::new(error),
                });
            }

            tokio::time::sleep(backoff).await;
            backoff = backoff.saturating_mul(2);
            attempt += 1;
        }
    }

    async fn fetch_once(&self, key: &ResourceKey, timeout: Duration) -> Result<Arc<Value>, LoadError> {
        let value = tokio::time::timeout(timeout, self.source.fetch(key))
            .await
            .map_err(|_| LoadError::Timeout {
                key: key.cache_key(),
                timeout_ms: timeout.as_millis(),
            })?
            .map_err(|error| LoadError::Source {
                key: key.cache_key(),
                error,
            })?;

        if key.is_geometry() {
            let report = geojson_check::validate(&value);
            if !report.is_valid() {
                return Err(LoadError::InvalidGeoJson {
                    key: key.cache_key(),
                    errors: report.errors,
                });
            }
            if !report.warnings.is_empty() {
                tracing::debug!(key = %key, warnings = ?report.warnings, "GeoJSON accepted with warnings");
            }
        }

        Ok(Arc::new(value))
    }
}
