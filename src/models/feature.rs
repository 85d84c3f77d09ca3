// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Raw map features and the selection unit built from them.

use crate::models::props::Properties;
use crate::models::{
    BorderPostRecord, BorderRecord, CountryRecord, EntityKind, ItineraryRecord, ZoneRecord,
};
use geo::Point;
use serde_json::Value;

/// A feature as reported by the map engine for a click or hover.
#[derive(Debug, Clone, PartialEq)]
pub struct MapFeature {
    /// Layer the feature was rendered in.
    pub layer: String,
    /// Feature id, when the source assigns one.
    pub id: Option<Value>,
    pub properties: Properties,
    pub geometry: Option<geojson::Geometry>,
}

impl MapFeature {
    pub fn from_geojson(feature: geojson::Feature, layer: &str) -> Self {
        let id = feature.id.map(|id| match id {
            geojson::feature::Id::String(s) => Value::String(s),
            geojson::feature::Id::Number(n) => Value::Number(n),
        });
        Self {
            layer: layer.to_string(),
            id,
            properties: feature.properties.unwrap_or_default(),
            geometry: feature.geometry,
        }
    }

    /// Entity kind implied by the layer, `None` for non-interactive layers.
    pub fn kind(&self) -> Option<EntityKind> {
        crate::map::layers::kind_for_layer(&self.layer)
    }

    /// Feature id rendered as a string.
    pub fn id_string(&self) -> Option<String> {
        match self.id.as_ref()? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn point(&self) -> Option<Point<f64>> {
        match &self.geometry.as_ref()?.value {
            geojson::Value::Point(xy) if xy.len() >= 2 => Some(Point::new(xy[0], xy[1])),
            _ => None,
        }
    }
}

/// A fully typed domain entity, one variant per kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Country(CountryRecord),
    Border(BorderRecord),
    BorderPost(BorderPostRecord),
    Zone(ZoneRecord),
    Itinerary(ItineraryRecord),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Country(_) => EntityKind::Country,
            Entity::Border(_) => EntityKind::Border,
            Entity::BorderPost(_) => EntityKind::BorderPost,
            Entity::Zone(_) => EntityKind::Zone,
            Entity::Itinerary(_) => EntityKind::Itinerary,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Entity::Country(c) => &c.id,
            Entity::Border(b) => &b.id,
            Entity::BorderPost(p) => &p.id,
            Entity::Zone(z) => &z.id,
            Entity::Itinerary(i) => &i.id,
        }
    }

    /// Name shown in the detail panel and page title.
    pub fn display_name(&self, language: &str) -> Option<String> {
        match self {
            Entity::Country(c) => Some(c.display_name(language)),
            Entity::Border(b) => b.name.clone(),
            Entity::BorderPost(p) => p.name.clone(),
            Entity::Zone(z) => z.name.clone(),
            Entity::Itinerary(i) => Some(i.name.clone()),
        }
    }
}

/// The single active selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFeature {
    pub kind: EntityKind,
    pub id: String,
    /// Resolved record; `None` while loading or when resolution missed.
    pub record: Option<Entity>,
    /// Feature that produced the selection; `None` for URL-driven selections.
    pub source_feature: Option<MapFeature>,
}

impl SelectedFeature {
    pub fn pending(kind: EntityKind, id: String, source_feature: Option<MapFeature>) -> Self {
        Self {
            kind,
            id,
            record: None,
            source_feature,
        }
    }

    pub fn display_name(&self, language: &str) -> Option<String> {
        self.record.as_ref()?.display_name(language)
    }
}
