// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared fakes for integration tests: an in-memory map engine, browser
//! history, static data source and remote API.

use async_trait::async_trait;
use dashmap::DashMap;
use geo::{Point, Rect};
use overland_map::config::Config;
use overland_map::data::{
    DataLoader, FsSource, LoaderSettings, MemoryStorage, RemoteApi, ResourceKey, SourceError,
    StaticSource,
};
use overland_map::db::FirestoreDb;
use overland_map::map::layers::{base_layer, highlight_layer};
use overland_map::map::{LayerFilter, MapEngine, MapError, ScreenPoint};
use overland_map::models::{EntityKind, MapFeature};
use overland_map::routes::create_router;
use overland_map::session::{MapCapabilities, MapSession};
use overland_map::url::{BrowserHistory, HistoryState};
use overland_map::AppState;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Root of the bundled data (the directory containing `data/`).
#[allow(dead_code)]
pub fn data_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Read one bundled fixture synchronously.
#[allow(dead_code)]
pub fn fixture(key: &ResourceKey) -> Value {
    let path = data_root().join(key.path());
    let bytes = std::fs::read(&path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()));
    serde_json::from_slice(&bytes).unwrap()
}

/// Config with short delays so tests run quickly under paused time.
#[allow(dead_code)]
pub fn test_config() -> Config {
    Config {
        data_dir: data_root(),
        retry_backoff: Duration::from_millis(10),
        highlight_retry_delay: Duration::from_millis(5),
        highlight_max_attempts: 10,
        ..Config::default()
    }
}

// ─── Map engine ──────────────────────────────────────────────

/// Every call the core made on the map, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum MapCall {
    Filter { layer: String, filter: LayerFilter },
    Paint { layer: String, property: String, value: Value },
    FlyTo { center: Point<f64>, zoom: f64 },
    FitBounds(Rect<f64>),
    Cursor(String),
}

#[derive(Default)]
pub struct FakeMap {
    layers: Mutex<HashSet<String>>,
    features: Mutex<Vec<MapFeature>>,
    calls: Mutex<Vec<MapCall>>,
    latency: Mutex<Duration>,
}

#[allow(dead_code)]
impl FakeMap {
    /// A map whose style has every base and highlight layer.
    pub fn ready() -> Arc<Self> {
        let map = Self::default();
        for kind in EntityKind::ALL {
            map.add_layer(base_layer(kind));
            map.add_layer(highlight_layer(kind));
        }
        Arc::new(map)
    }

    /// A map whose style has not loaded yet.
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Block every filter and paint call for `latency`, like a slow
    /// renderer on the main thread.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = latency;
    }

    fn stall(&self) {
        let latency = *self.latency.lock();
        if !latency.is_zero() {
            std::thread::sleep(latency);
        }
    }

    pub fn add_layer(&self, layer: &str) {
        self.layers.lock().insert(layer.to_string());
    }

    /// Features returned by the next point queries, topmost first.
    pub fn set_features(&self, features: Vec<MapFeature>) {
        *self.features.lock() = features;
    }

    pub fn calls(&self) -> Vec<MapCall> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Latest filter set on `layer`.
    pub fn filter_of(&self, layer: &str) -> Option<LayerFilter> {
        self.calls.lock().iter().rev().find_map(|call| match call {
            MapCall::Filter { layer: l, filter } if l == layer => Some(filter.clone()),
            _ => None,
        })
    }

    /// Highlight layers currently showing something.
    pub fn visible_highlights(&self) -> Vec<(EntityKind, LayerFilter)> {
        EntityKind::ALL
            .into_iter()
            .filter_map(|kind| {
                let filter = self.filter_of(highlight_layer(kind))?;
                (!filter.is_never()).then_some((kind, filter))
            })
            .collect()
    }

    /// Index of the first call matching `pred`.
    pub fn position(&self, pred: impl Fn(&MapCall) -> bool) -> Option<usize> {
        self.calls.lock().iter().position(pred)
    }

    pub fn last_cursor(&self) -> Option<String> {
        self.calls.lock().iter().rev().find_map(|call| match call {
            MapCall::Cursor(c) => Some(c.clone()),
            _ => None,
        })
    }
}

impl MapEngine for FakeMap {
    fn has_layer(&self, layer: &str) -> bool {
        self.layers.lock().contains(layer)
    }

    fn query_features_at_point(&self, _point: ScreenPoint) -> Vec<MapFeature> {
        self.features.lock().clone()
    }

    fn set_layer_filter(&self, layer: &str, filter: &LayerFilter) -> Result<(), MapError> {
        if !self.has_layer(layer) {
            return Err(MapError::LayerNotFound(layer.to_string()));
        }
        self.stall();
        self.calls.lock().push(MapCall::Filter {
            layer: layer.to_string(),
            filter: filter.clone(),
        });
        Ok(())
    }

    fn set_paint_property(&self, layer: &str, property: &str, value: Value) -> Result<(), MapError> {
        if !self.has_layer(layer) {
            return Err(MapError::LayerNotFound(layer.to_string()));
        }
        self.stall();
        self.calls.lock().push(MapCall::Paint {
            layer: layer.to_string(),
            property: property.to_string(),
            value,
        });
        Ok(())
    }

    fn fly_to(&self, center: Point<f64>, zoom: f64, _duration: Duration) {
        self.calls.lock().push(MapCall::FlyTo { center, zoom });
    }

    fn fit_bounds(&self, bounds: Rect<f64>) {
        self.calls.lock().push(MapCall::FitBounds(bounds));
    }

    fn set_cursor(&self, cursor: &str) {
        self.calls.lock().push(MapCall::Cursor(cursor.to_string()));
    }
}

// ─── Browser history ─────────────────────────────────────────

#[derive(Default)]
pub struct FakeHistory {
    pushes: Mutex<Vec<(Option<HistoryState>, String)>>,
    titles: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FakeHistory {
    pub fn paths(&self) -> Vec<String> {
        self.pushes.lock().iter().map(|(_, p)| p.clone()).collect()
    }

    pub fn states(&self) -> Vec<Option<HistoryState>> {
        self.pushes.lock().iter().map(|(s, _)| s.clone()).collect()
    }

    pub fn last_title(&self) -> Option<String> {
        self.titles.lock().last().cloned()
    }
}

impl BrowserHistory for FakeHistory {
    fn push_state(&self, state: Option<&HistoryState>, path: &str) {
        self.pushes.lock().push((state.cloned(), path.to_string()));
    }

    fn set_title(&self, title: &str) {
        self.titles.lock().push(title.to_string());
    }
}

// ─── Static data ─────────────────────────────────────────────

/// Static source that serves the bundled fixtures, with injectable delay
/// and failures. Counts fetches per resource.
pub struct FakeSource {
    inner: FsSource,
    delay: Mutex<Duration>,
    failures_left: AtomicU32,
    fetches: DashMap<String, usize>,
    overrides: DashMap<String, Value>,
    missing: DashMap<String, ()>,
}

#[allow(dead_code)]
impl FakeSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: FsSource::new(data_root()),
            delay: Mutex::new(Duration::ZERO),
            failures_left: AtomicU32::new(0),
            fetches: DashMap::new(),
            overrides: DashMap::new(),
            missing: DashMap::new(),
        })
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    /// Fail the next `n` fetches with a transport error.
    pub fn fail_next(&self, n: u32) {
        self.failures_left.store(n, Ordering::SeqCst);
    }

    pub fn set_override(&self, key: &ResourceKey, value: Value) {
        self.overrides.insert(key.cache_key(), value);
    }

    /// Answer `key` with not-found on every fetch.
    pub fn set_missing(&self, key: &ResourceKey) {
        self.missing.insert(key.cache_key(), ());
    }

    pub fn fetches(&self, key: &ResourceKey) -> usize {
        self.fetches.get(&key.cache_key()).map(|n| *n).unwrap_or(0)
    }
}

#[async_trait]
impl StaticSource for FakeSource {
    async fn fetch(&self, key: &ResourceKey) -> Result<Value, SourceError> {
        *self.fetches.entry(key.cache_key()).or_insert(0) += 1;

        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(SourceError::Transport("connection reset".to_string()));
        }

        if self.missing.contains_key(&key.cache_key()) {
            return Err(SourceError::NotFound(key.path()));
        }
        if let Some(value) = self.overrides.get(&key.cache_key()) {
            return Ok(value.clone());
        }
        self.inner.fetch(key).await
    }
}

// ─── Remote API ──────────────────────────────────────────────

/// Remote API with scripted answers. Unknown entities are `Ok(None)`;
/// `offline()` makes every call fail.
#[derive(Default)]
pub struct FakeRemote {
    offline: bool,
    countries: Mutex<Option<Vec<Value>>>,
    entities: DashMap<(EntityKind, String), Value>,
    delays: DashMap<String, Duration>,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl FakeRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn offline() -> Arc<Self> {
        Arc::new(Self {
            offline: true,
            ..Self::default()
        })
    }

    pub fn set_countries(&self, countries: Vec<Value>) {
        *self.countries.lock() = Some(countries);
    }

    pub fn insert(&self, kind: EntityKind, id: &str, value: Value) {
        self.entities.insert((kind, id.to_string()), value);
    }

    /// Delay every answer about `id`.
    pub fn delay(&self, id: &str, delay: Duration) {
        self.delays.insert(id.to_string(), delay);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn begin(&self, id: &str) -> Result<(), SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.delays.get(id).map(|d| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.offline {
            return Err(SourceError::Transport("offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteApi for FakeRemote {
    async fn countries(&self) -> Result<Vec<Value>, SourceError> {
        self.begin("countries").await?;
        self.countries
            .lock()
            .clone()
            .ok_or_else(|| SourceError::Status {
                status: 503,
                body: "unavailable".to_string(),
            })
    }

    async fn border_posts(&self, ids: &[String]) -> Result<Vec<Value>, SourceError> {
        let first = ids.first().map(String::as_str).unwrap_or_default();
        self.begin(first).await?;
        Ok(ids
            .iter()
            .filter_map(|id| {
                self.entities
                    .get(&(EntityKind::BorderPost, id.clone()))
                    .map(|v| v.clone())
            })
            .collect())
    }

    async fn entity(&self, kind: EntityKind, id: &str) -> Result<Option<Value>, SourceError> {
        self.begin(id).await?;
        Ok(self.entities.get(&(kind, id.to_string())).map(|v| v.clone()))
    }
}

// ─── Session ─────────────────────────────────────────────────

/// A session wired to fakes, with handles to inspect them.
#[allow(dead_code)]
pub struct TestSession {
    pub session: MapSession,
    pub map: Arc<FakeMap>,
    pub history: Arc<FakeHistory>,
    pub source: Arc<FakeSource>,
    pub remote: Arc<FakeRemote>,
    pub storage: Arc<MemoryStorage>,
}

#[allow(dead_code)]
pub fn session_with(map: Arc<FakeMap>, remote: Arc<FakeRemote>) -> TestSession {
    let history = Arc::new(FakeHistory::default());
    let source = FakeSource::new();
    let storage = Arc::new(MemoryStorage::new());
    let session = MapSession::new(
        &test_config(),
        MapCapabilities {
            map: map.clone(),
            history: history.clone(),
            storage: storage.clone(),
            source: source.clone(),
            remote: remote.clone(),
        },
    );
    TestSession {
        session,
        map,
        history,
        source,
        remote,
        storage,
    }
}

/// Session over a fully loaded style and the bundled data only.
#[allow(dead_code)]
pub fn test_session() -> TestSession {
    session_with(FakeMap::ready(), FakeRemote::new())
}

#[allow(dead_code)]
pub fn feature(layer: &str, props: Value) -> MapFeature {
    MapFeature {
        layer: layer.to_string(),
        id: None,
        properties: props.as_object().cloned().unwrap_or_default(),
        geometry: None,
    }
}

#[allow(dead_code)]
pub fn feature_with_geometry(layer: &str, props: Value, geometry: Value) -> MapFeature {
    MapFeature {
        geometry: Some(geojson::Geometry::from_json_value(geometry).unwrap()),
        ..feature(layer, props)
    }
}

#[allow(dead_code)]
pub fn loader(source: Arc<FakeSource>, settings: LoaderSettings) -> DataLoader {
    DataLoader::new(source, settings)
}

/// Router over an offline database and the bundled data.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = test_config();
    let bundle = DataLoader::new(
        Arc::new(FsSource::new(config.data_dir.clone())),
        LoaderSettings::from(&config),
    );
    let state = Arc::new(AppState {
        config,
        db: FirestoreDb::new_mock(),
        bundle,
    });
    (create_router(state.clone()), state)
}

#[allow(dead_code)]
pub fn lookup_env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}
