// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Single-active highlight over dedicated per-kind highlight layers.
//!
//! A highlight is a filter (`property == id`) on the kind's highlight layer;
//! base layers are never repainted. Applying one highlight clears every
//! other highlight layer first, under one lock, so at most one layer ever
//! has a matching filter.

use crate::config::Config;
use crate::map::filter::LayerFilter;
use crate::map::layers::highlight_layer;
use crate::map::{MapEngine, MapError};
use crate::models::EntityKind;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Base border line width; the highlight doubles it.
const BASE_BORDER_WIDTH: f64 = 2.0;

const MAX_ID_LEN: usize = 256;

#[derive(Debug, Clone, thiserror::Error)]
pub enum HighlightError {
    #[error("Highlight layer {layer} not ready after {attempts} attempts")]
    LayerNotReady { layer: &'static str, attempts: u32 },

    #[error("Invalid {kind} id: {id:?}")]
    InvalidId { kind: EntityKind, id: String },

    #[error(transparent)]
    Map(#[from] MapError),

    #[error("Superseded by a newer highlight request")]
    Superseded,
}

#[derive(Debug, Clone)]
pub struct HighlightSettings {
    /// Wall-clock budget per operation; overruns are logged, not failed.
    pub budget: Duration,
    pub retry_delay: Duration,
    pub max_attempts: u32,
}

impl Default for HighlightSettings {
    fn default() -> Self {
        Self {
            budget: Duration::from_millis(100),
            retry_delay: Duration::from_millis(50),
            max_attempts: 40,
        }
    }
}

impl From<&Config> for HighlightSettings {
    fn from(config: &Config) -> Self {
        Self {
            budget: config.highlight_budget,
            retry_delay: config.highlight_retry_delay,
            max_attempts: config.highlight_max_attempts,
        }
    }
}

/// Feature property the highlight filter matches on.
pub fn filter_property(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Country => "ADM0_A3",
        _ => "id",
    }
}

/// Fixed paint for each highlight layer. Chosen to read against every
/// colour scheme of the base layers.
fn highlight_paint(kind: EntityKind) -> Vec<(&'static str, Value)> {
    match kind {
        EntityKind::Country => vec![
            ("fill-color", json!("#d7263d")),
            ("fill-opacity", json!(0.5)),
        ],
        EntityKind::Border => vec![
            ("line-color", json!("#000000")),
            ("line-width", json!(BASE_BORDER_WIDTH * 2.0)),
            ("line-opacity", json!(1.0)),
        ],
        EntityKind::BorderPost => vec![
            ("circle-stroke-color", json!("#000000")),
            ("circle-stroke-width", json!(3.0)),
            ("circle-radius", json!(8.0)),
        ],
        EntityKind::Zone => vec![
            ("fill-color", json!("#d7263d")),
            ("fill-opacity", json!(0.35)),
        ],
        EntityKind::Itinerary => vec![
            ("line-color", json!("#000000")),
            ("line-width", json!(6.0)),
            ("line-opacity", json!(1.0)),
        ],
    }
}

pub struct HighlightController {
    map: Arc<dyn MapEngine>,
    settings: HighlightSettings,
    /// Bumped by every highlight and clear; a highlight whose epoch is no
    /// longer current when it reaches the map is dropped.
    epoch: AtomicU64,
    apply_lock: Mutex<()>,
    active: Mutex<Option<(EntityKind, String)>>,
    overruns: AtomicU64,
}

impl HighlightController {
    pub fn new(map: Arc<dyn MapEngine>, settings: HighlightSettings) -> Self {
        Self {
            map,
            settings,
            epoch: AtomicU64::new(0),
            apply_lock: Mutex::new(()),
            active: Mutex::new(None),
            overruns: AtomicU64::new(0),
        }
    }

    /// Highlight `(kind, id)`, logging instead of returning failures.
    pub async fn highlight(&self, kind: EntityKind, id: &str) {
        self.highlight_when(kind, id, || true).await;
    }

    /// Like [`highlight`](Self::highlight), but `still_wanted` is re-checked
    /// under the apply lock so a caller's stale request never reaches the map.
    pub async fn highlight_when<F>(&self, kind: EntityKind, id: &str, still_wanted: F)
    where
        F: Fn() -> bool + Sync,
    {
        match self.try_highlight_when(kind, id, still_wanted).await {
            Ok(()) => {}
            Err(HighlightError::Superseded) => {
                tracing::debug!(%kind, id, "Highlight superseded");
            }
            Err(e) => {
                tracing::warn!(%kind, id, error = %e, "Failed to apply highlight");
            }
        }
    }

    pub async fn try_highlight(&self, kind: EntityKind, id: &str) -> Result<(), HighlightError> {
        self.try_highlight_when(kind, id, || true).await
    }

    async fn try_highlight_when<F>(
        &self,
        kind: EntityKind,
        id: &str,
        still_wanted: F,
    ) -> Result<(), HighlightError>
    where
        F: Fn() -> bool + Sync,
    {
        let started = Instant::now();
        let id = id.trim();
        if id.is_empty() || id.len() > MAX_ID_LEN {
            return Err(HighlightError::InvalidId {
                kind,
                id: id.to_string(),
            });
        }

        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let layer = highlight_layer(kind);
        self.wait_for_layer(layer).await?;

        {
            let _guard = self.apply_lock.lock();
            if self.epoch.load(Ordering::SeqCst) != epoch || !still_wanted() {
                return Err(HighlightError::Superseded);
            }

            for other in EntityKind::ALL.into_iter().filter(|k| *k != kind) {
                let other_layer = highlight_layer(other);
                if self.map.has_layer(other_layer) {
                    self.map.set_layer_filter(other_layer, &LayerFilter::Never)?;
                }
            }
            self.map
                .set_layer_filter(layer, &LayerFilter::equals(filter_property(kind), id))?;
            for (property, value) in highlight_paint(kind) {
                self.map.set_paint_property(layer, property, value)?;
            }
            *self.active.lock() = Some((kind, id.to_string()));
        }

        self.check_budget("highlight", started);
        Ok(())
    }

    /// Clear every highlight layer. Repeated calls leave the same state.
    pub fn clear_all(&self) {
        let started = Instant::now();
        self.epoch.fetch_add(1, Ordering::SeqCst);

        {
            let _guard = self.apply_lock.lock();
            for kind in EntityKind::ALL {
                let layer = highlight_layer(kind);
                // Layers not yet in the style have nothing to clear.
                if !self.map.has_layer(layer) {
                    continue;
                }
                if let Err(e) = self.map.set_layer_filter(layer, &LayerFilter::Never) {
                    tracing::warn!(layer, error = %e, "Failed to clear highlight layer");
                }
            }
            *self.active.lock() = None;
        }

        self.check_budget("clear", started);
    }

    /// Currently highlighted entity.
    pub fn active(&self) -> Option<(EntityKind, String)> {
        self.active.lock().clone()
    }

    /// Operations that went over the time budget so far.
    pub fn budget_overruns(&self) -> u64 {
        self.overruns.load(Ordering::Relaxed)
    }

    /// Poll until the highlight layer exists, bounded by `max_attempts`.
    async fn wait_for_layer(&self, layer: &'static str) -> Result<(), HighlightError> {
        let attempts = self.settings.max_attempts.max(1);
        for attempt in 1..=attempts {
            if self.map.has_layer(layer) {
                if attempt > 1 {
                    tracing::debug!(layer, attempt, "Highlight layer became ready");
                }
                return Ok(());
            }
            if attempt < attempts {
                tokio::time::sleep(self.settings.retry_delay).await;
            }
        }
        Err(HighlightError::LayerNotReady { layer, attempts })
    }

    fn check_budget(&self, operation: &'static str, started: Instant) {
        let elapsed = started.elapsed();
        if elapsed > self.settings.budget {
            self.overruns.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                operation,
                elapsed_ms = elapsed.as_millis() as u64,
                budget_ms = self.settings.budget.as_millis() as u64,
                "Highlight operation exceeded time budget"
            );
        }
    }
}
