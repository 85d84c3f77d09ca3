// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Typed entity access on top of the loader and the remote API.
//!
//! Collections are normalized once and indexed by id. Single-entity lookups
//! never fail: a miss in every source is logged and reported as `None`, and
//! the caller degrades to placeholder data.

use crate::data::loader::{DataLoader, LoadError};
use crate::data::source::{RemoteApi, SourceError};
use crate::data::storage::SessionStorage;
use crate::data::ResourceKey;
use crate::models::{
    BorderPostRecord, BorderRecord, CountryRecord, EntityKind, ItineraryRecord, Record, ZoneRecord,
};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Which source is consulted first for a single entity.
#[derive(Debug, Clone, Copy)]
enum LookupOrder {
    RemoteFirst,
    StaticFirst,
}

pub struct EntityRepository {
    loader: DataLoader,
    remote: Arc<dyn RemoteApi>,
    storage: SessionStorage,
    index_ttl: Duration,
    /// Held while the stale flag triggers a live countries reload.
    live_reload: tokio::sync::Mutex<()>,
    countries_indexed_at: Mutex<Option<Instant>>,
    countries: DashMap<String, CountryRecord>,
    borders: DashMap<String, BorderRecord>,
    border_posts: DashMap<String, BorderPostRecord>,
    zones: DashMap<String, ZoneRecord>,
    itineraries: DashMap<String, ItineraryRecord>,
    iso3: DashMap<String, String>,
}

impl EntityRepository {
    pub fn new(
        loader: DataLoader,
        remote: Arc<dyn RemoteApi>,
        storage: SessionStorage,
        index_ttl: Duration,
    ) -> Self {
        Self {
            loader,
            remote,
            storage,
            index_ttl,
            live_reload: tokio::sync::Mutex::new(()),
            countries_indexed_at: Mutex::new(None),
            countries: DashMap::new(),
            borders: DashMap::new(),
            border_posts: DashMap::new(),
            zones: DashMap::new(),
            itineraries: DashMap::new(),
            iso3: DashMap::new(),
        }
    }

    pub fn loader(&self) -> &DataLoader {
        &self.loader
    }

    /// Load every country.
    ///
    /// When the stale flag is set the live API is tried first; the flag is
    /// cleared after that attempt whatever its outcome, and a failure falls
    /// back to the static file. Concurrent callers wait for the one live
    /// attempt and then read what it left in the cache.
    pub async fn load_countries(&self) -> Result<Vec<CountryRecord>, LoadError> {
        if self.storage.data_stale() {
            let _reload = self.live_reload.lock().await;
            if self.storage.data_stale() {
                let live = self.with_timeout(self.remote.countries()).await;
                self.storage.set_data_stale(false);
                match live {
                    Ok(items) => {
                        tracing::info!(count = items.len(), "Reloaded countries from live API");
                        let value =
                            self.loader.prime(&ResourceKey::Countries, Value::Array(items));
                        return Ok(self.index_countries(&value));
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Live countries reload failed, using static data");
                    }
                }
            }
        }

        let value = self.loader.load(&ResourceKey::Countries).await?;
        Ok(self.index_countries(&value))
    }

    /// Bound a remote call by the loader's request timeout.
    async fn with_timeout<T>(
        &self,
        call: impl Future<Output = Result<T, SourceError>>,
    ) -> Result<T, SourceError> {
        let timeout = self.loader.settings().request_timeout;
        tokio::time::timeout(timeout, call)
            .await
            .unwrap_or_else(|_| {
                Err(SourceError::Timeout {
                    timeout_ms: timeout.as_millis(),
                })
            })
    }

    fn index_countries(&self, value: &Value) -> Vec<CountryRecord> {
        let countries = CountryRecord::from_collection(value);
        for country in &countries {
            self.countries.insert(country.id.clone(), country.clone());
        }
        *self.countries_indexed_at.lock() = Some(Instant::now());
        countries
    }

    fn countries_index_fresh(&self) -> bool {
        self.countries_indexed_at
            .lock()
            .is_some_and(|at| at.elapsed() < self.index_ttl)
    }

    /// Country by code, case-insensitive.
    pub async fn get_country(&self, code: &str) -> Option<CountryRecord> {
        let code = code.trim().to_ascii_uppercase();
        if code.is_empty() {
            return None;
        }
        if let Some(country) = self.countries.get(&code) {
            return Some(country.clone());
        }
        if !self.countries_index_fresh() {
            if let Err(e) = self.load_countries().await {
                tracing::warn!(code, error = %e, "Failed to load countries");
                return None;
            }
        }
        let found = self.countries.get(&code).map(|c| c.clone());
        if found.is_none() {
            tracing::debug!(code, "Unknown country code");
        }
        found
    }

    pub async fn get_border(&self, id: &str) -> Option<BorderRecord> {
        self.lookup(id, &self.borders, ResourceKey::Borders, LookupOrder::RemoteFirst)
            .await
    }

    pub async fn get_border_post(&self, id: &str) -> Option<BorderPostRecord> {
        self.lookup(
            id,
            &self.border_posts,
            ResourceKey::BorderPosts,
            LookupOrder::RemoteFirst,
        )
        .await
    }

    /// Border post already known locally, without any I/O.
    pub fn cached_border_post(&self, id: &str) -> Option<BorderPostRecord> {
        self.border_posts.get(id.trim()).map(|p| p.clone())
    }

    pub async fn get_zone(&self, id: &str) -> Option<ZoneRecord> {
        self.lookup(id, &self.zones, ResourceKey::Zones, LookupOrder::RemoteFirst)
            .await
    }

    pub async fn get_itinerary(&self, id: &str) -> Option<ItineraryRecord> {
        self.lookup(
            id,
            &self.itineraries,
            ResourceKey::Itineraries,
            LookupOrder::StaticFirst,
        )
        .await
    }

    /// ISO3 code for an ISO alpha-2 code, from the bundled lookup table.
    pub async fn iso3_for_alpha2(&self, alpha2: &str) -> Option<String> {
        let alpha2 = alpha2.trim().to_ascii_uppercase();
        if alpha2.len() != 2 {
            return None;
        }
        if let Some(iso3) = self.iso3.get(&alpha2) {
            return Some(iso3.clone());
        }

        let table = match self.loader.load(&ResourceKey::Iso3Lookup).await {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load ISO3 lookup table");
                return None;
            }
        };
        if let Some(map) = table.as_object() {
            for (a2, a3) in map {
                if let Some(a3) = a3.as_str() {
                    self.iso3
                        .insert(a2.to_ascii_uppercase(), a3.trim().to_ascii_uppercase());
                }
            }
        }
        self.iso3.get(&alpha2).map(|v| v.clone())
    }

    /// Load the collections the app needs up front.
    ///
    /// Countries and borders are essential and their failure is returned;
    /// zones and itineraries are warmed best-effort.
    pub async fn preload(&self) -> Result<(), LoadError> {
        let started = Instant::now();
        let (countries, _borders) = tokio::try_join!(
            self.load_countries(),
            self.loader.load(&ResourceKey::Borders),
        )?;

        let (zones, itineraries) = tokio::join!(
            self.loader.load(&ResourceKey::Zones),
            self.loader.load(&ResourceKey::Itineraries),
        );
        for (key, result) in [("zones", zones), ("itineraries", itineraries)] {
            if let Err(e) = result {
                tracing::warn!(key, error = %e, "Optional collection failed to preload");
            }
        }

        tracing::info!(
            countries = countries.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Preloaded map data"
        );
        Ok(())
    }

    /// Fire-and-forget [`preload`](Self::preload).
    pub fn preload_in_background(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let repository = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = repository.preload().await {
                tracing::error!(error = %e, "Background preload failed");
            }
        })
    }

    /// Forget all indexed records and cached resources.
    pub fn clear(&self) {
        self.loader.clear();
        *self.countries_indexed_at.lock() = None;
        self.countries.clear();
        self.borders.clear();
        self.border_posts.clear();
        self.zones.clear();
        self.itineraries.clear();
        self.iso3.clear();
    }

    async fn lookup<T: Record>(
        &self,
        id: &str,
        index: &DashMap<String, T>,
        resource: ResourceKey,
        order: LookupOrder,
    ) -> Option<T> {
        let id = id.trim();
        if id.is_empty() {
            return None;
        }
        if let Some(hit) = index.get(id) {
            return Some(hit.clone());
        }

        let found = match order {
            LookupOrder::RemoteFirst => match self.remote_record::<T>(id).await {
                Some(record) => Some(record),
                None => self.static_record(id, index, &resource).await,
            },
            LookupOrder::StaticFirst => match self.static_record(id, index, &resource).await {
                Some(record) => Some(record),
                None => self.remote_record::<T>(id).await,
            },
        };

        match &found {
            Some(record) => {
                index.insert(id.to_string(), record.clone());
            }
            None => tracing::warn!(kind = %T::KIND, id, "Entity not found in any source"),
        }
        found
    }

    async fn remote_record<T: Record>(&self, id: &str) -> Option<T> {
        let result = match T::KIND {
            // Countries only come as a whole collection.
            EntityKind::Country => return None,
            EntityKind::BorderPost => self
                .with_timeout(self.remote.border_posts(&[id.to_string()]))
                .await
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|item| T::from_value(item, None))
                        .find(|record| record.id() == id)
                }),
            kind => self
                .with_timeout(self.remote.entity(kind, id))
                .await
                .map(|item| item.and_then(|item| T::from_value(&item, Some(id)))),
        };

        result.unwrap_or_else(|e| {
            tracing::warn!(kind = %T::KIND, id, error = %e, "Remote lookup failed");
            None
        })
    }

    async fn static_record<T: Record>(
        &self,
        id: &str,
        index: &DashMap<String, T>,
        resource: &ResourceKey,
    ) -> Option<T> {
        let value = match self.loader.load(resource).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(resource = %resource, error = %e, "Static collection unavailable");
                return None;
            }
        };
        for record in T::from_collection(&value) {
            index.entry(record.id().to_string()).or_insert(record);
        }
        index.get(id).map(|r| r.clone())
    }
}
