// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The map rendering engine as a capability, plus the controllers that drive
//! it: per-kind highlight layers and the base-layer colour scheme.

pub mod filter;
pub mod highlight;
pub mod layers;
pub mod scheme;

pub use filter::LayerFilter;
pub use highlight::{HighlightController, HighlightError, HighlightSettings};
pub use scheme::{ColorScheme, ColorSchemeState};

use crate::models::MapFeature;
use geo::{Point, Rect};
use serde_json::Value;
use std::time::Duration;

/// Errors reported by the map engine.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MapError {
    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    #[error("Map rejected update to {layer}: {reason}")]
    Rejected { layer: String, reason: String },
}

/// Position in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Input events delivered by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    Click { point: ScreenPoint },
    MouseMove { point: ScreenPoint },
    MouseEnter { layer: String },
    MouseLeave { layer: String },
}

/// Operations the core needs from a tile-rendering map engine.
///
/// Layers are created by the style; the core only filters and repaints them.
pub trait MapEngine: Send + Sync {
    /// Whether `layer` has been added to the style yet.
    fn has_layer(&self, layer: &str) -> bool;

    /// Rendered features under `point`, topmost first.
    fn query_features_at_point(&self, point: ScreenPoint) -> Vec<MapFeature>;

    fn set_layer_filter(&self, layer: &str, filter: &LayerFilter) -> Result<(), MapError>;

    fn set_paint_property(&self, layer: &str, property: &str, value: Value) -> Result<(), MapError>;

    fn fly_to(&self, center: Point<f64>, zoom: f64, duration: Duration);

    fn fit_bounds(&self, bounds: Rect<f64>);

    fn set_cursor(&self, cursor: &str);
}
