// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Thematic colour schemes for the base country layer.

use crate::map::layers::COUNTRIES_FILL;
use crate::map::{MapEngine, MapError};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;

const NO_DATA: &str = "#cccccc";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScheme {
    /// Countries coloured by overlanding status.
    #[default]
    Overlanding,
    /// Countries coloured by Carnet de Passage requirement.
    Carnet,
    /// Muted countries so itinerary lines stand out.
    Itineraries,
}

impl ColorScheme {
    pub fn as_str(self) -> &'static str {
        match self {
            ColorScheme::Overlanding => "overlanding",
            ColorScheme::Carnet => "carnet",
            ColorScheme::Itineraries => "itineraries",
        }
    }

    /// `fill-color` expression for the country layer.
    pub fn fill_color(self) -> Value {
        match self {
            ColorScheme::Overlanding => json!([
                "match", ["to-number", ["get", "overlanding"], -1],
                0, "#2b9348",
                1, "#f4a261",
                2, "#e76f51",
                3, "#6c757d",
                NO_DATA
            ]),
            ColorScheme::Carnet => json!([
                "match", ["to-number", ["get", "carnet"], -1],
                0, "#2b9348",
                1, "#e9c46a",
                2, "#e76f51",
                NO_DATA
            ]),
            ColorScheme::Itineraries => json!("#e8e4da"),
        }
    }

    pub fn fill_opacity(self) -> f64 {
        match self {
            ColorScheme::Itineraries => 0.4,
            _ => 0.7,
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The active scheme and the paint calls that apply it.
pub struct ColorSchemeState {
    map: Arc<dyn MapEngine>,
    current: Mutex<ColorScheme>,
}

impl ColorSchemeState {
    pub fn new(map: Arc<dyn MapEngine>) -> Self {
        Self {
            map,
            current: Mutex::new(ColorScheme::default()),
        }
    }

    pub fn current(&self) -> ColorScheme {
        *self.current.lock()
    }

    /// Make `scheme` active and repaint the country layer.
    pub fn set(&self, scheme: ColorScheme) -> Result<(), MapError> {
        let mut current = self.current.lock();
        *current = scheme;
        self.paint(scheme)
    }

    /// Repaint with the active scheme, e.g. once the style has loaded.
    pub fn apply_current(&self) -> Result<(), MapError> {
        let scheme = self.current();
        self.paint(scheme)
    }

    fn paint(&self, scheme: ColorScheme) -> Result<(), MapError> {
        if !self.map.has_layer(COUNTRIES_FILL) {
            return Err(MapError::LayerNotFound(COUNTRIES_FILL.to_string()));
        }
        self.map
            .set_paint_property(COUNTRIES_FILL, "fill-color", scheme.fill_color())?;
        self.map
            .set_paint_property(COUNTRIES_FILL, "fill-opacity", json!(scheme.fill_opacity()))?;
        tracing::debug!(scheme = %scheme, "Applied colour scheme");
        Ok(())
    }
}
