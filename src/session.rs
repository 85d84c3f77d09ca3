// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! One map session: the owner of every piece of per-session state.
//!
//! Built once from a [`Config`] and the host capabilities, then driven by
//! map events and browser navigation. Nothing here is global; dropping the
//! session (after [`MapSession::teardown`]) releases all of it.

use crate::config::Config;
use crate::data::{
    ClientStorage, DataLoader, EntityRepository, HttpClient, LoadError, LoaderSettings, RemoteApi,
    SessionStorage, SourceError, StaticSource,
};
use crate::map::{
    ColorScheme, ColorSchemeState, HighlightController, HighlightSettings, MapEngine, MapError,
    MapEvent,
};
use crate::models::{EntityKind, MapFeature};
use crate::resolver::EntityResolver;
use crate::selection::{Outcome, SelectionMachine, SelectionState};
use crate::url::{BrowserHistory, UrlSynchronizer};
use std::sync::Arc;
use tokio::sync::watch;

const POINTER_CURSOR: &str = "pointer";
const DEFAULT_CURSOR: &str = "";

/// Host-provided capabilities.
#[derive(Clone)]
pub struct MapCapabilities {
    pub map: Arc<dyn MapEngine>,
    pub history: Arc<dyn BrowserHistory>,
    pub storage: Arc<dyn ClientStorage>,
    pub source: Arc<dyn StaticSource>,
    pub remote: Arc<dyn RemoteApi>,
}

impl MapCapabilities {
    /// Static files and the entity API both served from `api_base_url`.
    pub fn over_http(
        config: &Config,
        map: Arc<dyn MapEngine>,
        history: Arc<dyn BrowserHistory>,
        storage: Arc<dyn ClientStorage>,
    ) -> Result<Self, SourceError> {
        let client = Arc::new(HttpClient::new(
            &config.api_base_url,
            config.request_timeout,
        )?);
        Ok(Self {
            map,
            history,
            storage,
            source: client.clone(),
            remote: client,
        })
    }
}

pub struct MapSession {
    map: Arc<dyn MapEngine>,
    storage: SessionStorage,
    repository: Arc<EntityRepository>,
    scheme: Arc<ColorSchemeState>,
    machine: SelectionMachine,
}

impl MapSession {
    pub fn new(config: &Config, capabilities: MapCapabilities) -> Self {
        let MapCapabilities {
            map,
            history,
            storage,
            source,
            remote,
        } = capabilities;

        let storage = SessionStorage::new(storage, &config.default_language);
        let loader = DataLoader::new(source, LoaderSettings::from(config));
        let repository = Arc::new(EntityRepository::new(
            loader,
            remote,
            storage.clone(),
            config.cache_ttl,
        ));
        let resolver = EntityResolver::new(Arc::clone(&repository));
        let highlight = Arc::new(HighlightController::new(
            Arc::clone(&map),
            HighlightSettings::from(config),
        ));
        let scheme = Arc::new(ColorSchemeState::new(Arc::clone(&map)));
        let url = Arc::new(UrlSynchronizer::new(history, &config.app_name));

        let machine = SelectionMachine::new(
            resolver,
            highlight,
            Arc::clone(&scheme),
            url,
            Arc::clone(&map),
            storage.clone(),
            config.scheme_switch_delay,
        );

        Self {
            map,
            storage,
            repository,
            scheme,
            machine,
        }
    }

    /// Initial load: paint the active scheme and preload essential data.
    ///
    /// The only user-visible failure in the session; the host shows it with
    /// a retry action that calls this again.
    pub async fn initialize(&self) -> Result<(), LoadError> {
        if let Err(e) = self.scheme.apply_current() {
            tracing::debug!(error = %e, "Colour scheme deferred until style loads");
        }
        self.repository.preload().await
    }

    /// Best-effort warm-up that never surfaces failures.
    pub fn preload_in_background(&self) -> tokio::task::JoinHandle<()> {
        self.repository.preload_in_background()
    }

    /// Style finished loading: apply state that needed the layers.
    pub fn on_style_loaded(&self) {
        if let Err(e) = self.scheme.apply_current() {
            tracing::warn!(error = %e, "Failed to apply colour scheme after style load");
        }
    }

    /// Dispatch a map event. Only clicks change the selection.
    pub async fn handle_event(&self, event: MapEvent) -> Option<Outcome> {
        match event {
            MapEvent::Click { point } => Some(self.machine.handle_click(point).await),
            MapEvent::MouseMove { point } => {
                let interactive = self
                    .map
                    .query_features_at_point(point)
                    .iter()
                    .any(|f| f.kind().is_some());
                self.map
                    .set_cursor(if interactive { POINTER_CURSOR } else { DEFAULT_CURSOR });
                None
            }
            MapEvent::MouseEnter { layer } => {
                if crate::map::layers::kind_for_layer(&layer).is_some() {
                    self.map.set_cursor(POINTER_CURSOR);
                }
                None
            }
            MapEvent::MouseLeave { layer } => {
                if crate::map::layers::kind_for_layer(&layer).is_some() {
                    self.map.set_cursor(DEFAULT_CURSOR);
                }
                None
            }
        }
    }

    /// Browser back/forward to `path`.
    pub async fn handle_pop_state(&self, path: &str) -> Outcome {
        self.machine.navigate(path).await
    }

    /// Deep link on first load. The path is already in the address bar, so
    /// it is handled like a navigation and nothing is pushed.
    pub async fn open_initial_route(&self, path: &str) -> Outcome {
        self.machine.navigate(path).await
    }

    /// Sidebar-initiated navigation, e.g. to a neighbouring country.
    pub async fn select(&self, kind: EntityKind, id: &str) -> Outcome {
        self.machine.select(kind, id).await
    }

    pub async fn select_feature(&self, feature: MapFeature) -> Outcome {
        self.machine.select_feature(feature).await
    }

    pub fn close(&self) -> Outcome {
        self.machine.close()
    }

    pub fn state(&self) -> SelectionState {
        self.machine.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<SelectionState> {
        self.machine.subscribe()
    }

    pub fn current_path(&self) -> String {
        self.machine.url().current_path()
    }

    pub fn set_color_scheme(&self, scheme: ColorScheme) -> Result<(), MapError> {
        self.scheme.set(scheme)
    }

    pub fn color_scheme(&self) -> ColorScheme {
        self.scheme.current()
    }

    pub fn storage(&self) -> &SessionStorage {
        &self.storage
    }

    pub fn repository(&self) -> &Arc<EntityRepository> {
        &self.repository
    }

    /// Force the next countries load to go to the live API first.
    pub fn mark_data_stale(&self) {
        self.storage.set_data_stale(true);
        self.repository.clear();
    }

    /// End of session: drop the selection, highlights and caches.
    pub fn teardown(&self) {
        self.machine.reset();
        self.repository.clear();
        tracing::debug!("Map session torn down");
    }
}
