// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The selection state machine.
//!
//! States are `Empty` and `Selected`. Every trigger bumps a generation
//! counter; work done for a trigger (resolution, scheme switch, highlight,
//! commit) is dropped as soon as its generation is no longer current, so a
//! slow resolution can never overwrite a newer selection.

use crate::data::SessionStorage;
use crate::map::{ColorScheme, ColorSchemeState, HighlightController, MapEngine, ScreenPoint};
use crate::models::{Entity, EntityKind, MapFeature, SelectedFeature};
use crate::resolver::{feature_id, EntityResolver, Resolution};
use crate::url::{Route, UrlSynchronizer};
use geo::BoundingRect;
use parking_lot::Mutex;
use std::cmp::Reverse;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Camera zoom when flying to a border post.
const BORDER_POST_ZOOM: f64 = 10.0;
const FLY_DURATION: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SelectionState {
    #[default]
    Empty,
    Selected(SelectedFeature),
}

impl SelectionState {
    pub fn selected(&self) -> Option<&SelectedFeature> {
        match self {
            SelectionState::Empty => None,
            SelectionState::Selected(selected) => Some(selected),
        }
    }

    pub fn route(&self) -> Route {
        match self {
            SelectionState::Empty => Route::Home,
            SelectionState::Selected(selected) => Route::entity(selected.kind, selected.id.clone()),
        }
    }
}

/// What a trigger ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Committed,
    Cleared,
    /// A newer trigger arrived before this one finished.
    Superseded,
    /// The feature carried no usable identifier.
    Unresolvable,
    /// Nothing interactive was hit.
    Ignored,
}

/// Where a transition came from. Navigation transitions mirror a URL the
/// browser already shows, so they never push history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    User,
    Navigation,
}

pub struct SelectionMachine {
    resolver: EntityResolver,
    highlight: Arc<HighlightController>,
    scheme: Arc<ColorSchemeState>,
    url: Arc<UrlSynchronizer>,
    map: Arc<dyn MapEngine>,
    storage: SessionStorage,
    scheme_switch_delay: Duration,
    generation: AtomicU64,
    commit_lock: Mutex<()>,
    state: watch::Sender<SelectionState>,
}

impl SelectionMachine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        resolver: EntityResolver,
        highlight: Arc<HighlightController>,
        scheme: Arc<ColorSchemeState>,
        url: Arc<UrlSynchronizer>,
        map: Arc<dyn MapEngine>,
        storage: SessionStorage,
        scheme_switch_delay: Duration,
    ) -> Self {
        let (state, _) = watch::channel(SelectionState::Empty);
        Self {
            resolver,
            highlight,
            scheme,
            url,
            map,
            storage,
            scheme_switch_delay,
            generation: AtomicU64::new(0),
            commit_lock: Mutex::new(()),
            state,
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SelectionState> {
        self.state.subscribe()
    }

    pub fn url(&self) -> &Arc<UrlSynchronizer> {
        &self.url
    }

    /// Map click at `point`.
    pub async fn handle_click(&self, point: ScreenPoint) -> Outcome {
        let features = self.map.query_features_at_point(point);
        self.handle_features(features).await
    }

    /// Pick the highest-precedence interactive feature and select it; a
    /// click that hits nothing interactive closes the selection.
    pub async fn handle_features(&self, features: Vec<MapFeature>) -> Outcome {
        let top = features
            .into_iter()
            .enumerate()
            .filter_map(|(index, feature)| Some((feature.kind()?, index, feature)))
            // Ties go to the topmost feature.
            .max_by_key(|(kind, index, _)| (kind.click_precedence(), Reverse(*index)))
            .map(|(_, _, feature)| feature);

        match top {
            Some(feature) => self.select_feature(feature).await,
            None => self.close(),
        }
    }

    /// Select a clicked feature.
    pub async fn select_feature(&self, feature: MapFeature) -> Outcome {
        let Some(kind) = feature.kind() else {
            return Outcome::Ignored;
        };
        let Some(id) = feature_id(kind, &feature) else {
            tracing::warn!(%kind, layer = %feature.layer, "Clicked feature has no identifier");
            return Outcome::Unresolvable;
        };

        let generation = self.begin(kind, &id, Some(feature.clone()));
        let resolution = self
            .resolver
            .resolve_feature(&feature)
            .await
            .unwrap_or(Resolution { id, record: None });
        self.finish(generation, kind, resolution, Some(feature), Trigger::User)
            .await
    }

    /// Select by kind and id (sidebar link).
    pub async fn select(&self, kind: EntityKind, id: &str) -> Outcome {
        self.select_from(kind, id, Trigger::User).await
    }

    async fn select_from(&self, kind: EntityKind, id: &str, trigger: Trigger) -> Outcome {
        let id = id.trim();
        if id.is_empty() {
            return Outcome::Ignored;
        }
        let generation = self.begin(kind, id, None);
        let resolution = self.resolver.resolve_id(kind, id).await;
        self.finish(generation, kind, resolution, None, trigger).await
    }

    /// Back to `Empty`. Safe to call repeatedly.
    pub fn close(&self) -> Outcome {
        self.close_from(Trigger::User)
    }

    fn close_from(&self, trigger: Trigger) -> Outcome {
        let _commit = self.commit_lock.lock();
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.highlight.clear_all();
        self.state.send_replace(SelectionState::Empty);
        if trigger == Trigger::User {
            self.url.push(&Route::Home);
        }
        self.url.set_title(None);
        Outcome::Cleared
    }

    /// Drop the selection without touching history or title.
    pub fn reset(&self) {
        let _commit = self.commit_lock.lock();
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.highlight.clear_all();
        self.state.send_replace(SelectionState::Empty);
    }

    /// Drive the machine from a browser navigation (back/forward or deep
    /// link). Only the transition this starts skips the history push; a
    /// selection made while it resolves pushes normally.
    pub async fn navigate(&self, path: &str) -> Outcome {
        let route = match Route::parse(path) {
            Ok(route) => route,
            Err(e) => {
                tracing::warn!(path, error = %e, "Ignoring navigation to unknown route");
                return Outcome::Ignored;
            }
        };

        self.url.navigated_to(&route);
        match route {
            Route::Home => self.close_from(Trigger::Navigation),
            Route::Entity { kind, id } => self.select_from(kind, &id, Trigger::Navigation).await,
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Enter the loading state for a new trigger.
    fn begin(&self, kind: EntityKind, id: &str, feature: Option<MapFeature>) -> u64 {
        let _commit = self.commit_lock.lock();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.highlight.clear_all();
        self.state.send_replace(SelectionState::Selected(SelectedFeature::pending(
            kind,
            id.to_string(),
            feature,
        )));
        tracing::debug!(%kind, id, generation, "Selection started");
        generation
    }

    async fn finish(
        &self,
        generation: u64,
        kind: EntityKind,
        resolution: Resolution,
        source_feature: Option<MapFeature>,
        trigger: Trigger,
    ) -> Outcome {
        if !self.is_current(generation) {
            tracing::debug!(%kind, id = %resolution.id, "Discarding stale resolution");
            return Outcome::Superseded;
        }

        if kind == EntityKind::Itinerary {
            self.switch_to_itinerary_scheme().await;
            if !self.is_current(generation) {
                tracing::debug!(%kind, id = %resolution.id, "Discarding stale itinerary selection");
                return Outcome::Superseded;
            }
        }

        self.highlight
            .highlight_when(kind, &resolution.id, || self.is_current(generation))
            .await;

        let record = {
            let _commit = self.commit_lock.lock();
            if !self.is_current(generation) {
                tracing::debug!(%kind, id = %resolution.id, "Selection superseded before commit");
                return Outcome::Superseded;
            }

            let selected = SelectedFeature {
                kind,
                id: resolution.id,
                record: resolution.record,
                source_feature,
            };
            let title = selected.display_name(&self.storage.language());
            let route = Route::entity(kind, selected.id.clone());
            let record = selected.record.clone();

            self.state.send_replace(SelectionState::Selected(selected));
            match trigger {
                Trigger::User => {
                    self.url.push(&route);
                }
                Trigger::Navigation => self.url.navigated_to(&route),
            }
            self.url.set_title(title.as_deref());
            record
        };

        if let Some(record) = &record {
            self.move_camera(record);
        }
        Outcome::Committed
    }

    /// Itinerary selection repaints the base layer before the highlight
    /// goes on, with a short settle delay between the two.
    async fn switch_to_itinerary_scheme(&self) {
        if self.scheme.current() == ColorScheme::Itineraries {
            return;
        }
        if let Err(e) = self.scheme.set(ColorScheme::Itineraries) {
            tracing::warn!(error = %e, "Failed to switch to itinerary colour scheme");
        }
        tokio::time::sleep(self.scheme_switch_delay).await;
    }

    fn move_camera(&self, record: &Entity) {
        match record {
            Entity::BorderPost(post) => {
                if let Some(point) = post.point() {
                    self.map.fly_to(point, BORDER_POST_ZOOM, FLY_DURATION);
                }
            }
            Entity::Zone(zone) => self.fit_geometry(zone.geometry.as_ref()),
            Entity::Itinerary(itinerary) => self.fit_geometry(itinerary.geometry.as_ref()),
            Entity::Country(_) | Entity::Border(_) => {}
        }
    }

    fn fit_geometry(&self, geometry: Option<&geojson::Geometry>) {
        let Some(geometry) = geometry else {
            return;
        };
        let converted: Result<geo::Geometry<f64>, _> = geometry.value.clone().try_into();
        match converted {
            Ok(shape) => {
                if let Some(bounds) = shape.bounding_rect() {
                    self.map.fit_bounds(bounds);
                }
            }
            Err(e) => tracing::debug!(error = %e, "Geometry not convertible for camera fit"),
        }
    }
}
