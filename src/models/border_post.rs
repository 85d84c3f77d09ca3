// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Border post record and normalization of its three source shapes.
//!
//! Border posts arrive as vector-tile feature properties, as items of the
//! bundled JSON file (string `latitude`/`longitude`, `status` instead of
//! `is_open`) and from the entity API (`coordinates` array or object). All of
//! them are folded into [`BorderPostRecord`] here.

use crate::models::props::{f64_prop, first_str_prop, id_prop, int_prop, owned_str, Properties};
use crate::models::translation::{translate, translations_from_value, Translations};
use crate::models::{EntityKind, MapFeature, Record};
use geo::Point;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Crossing status of a border post (also used for aggregate border status).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "i64", from = "i64")]
pub enum OpenStatus {
    #[default]
    Unknown,
    Closed,
    Bilateral,
    Open,
    Restricted,
}

impl OpenStatus {
    pub fn code(self) -> i64 {
        match self {
            OpenStatus::Unknown => -1,
            OpenStatus::Closed => 0,
            OpenStatus::Bilateral => 1,
            OpenStatus::Open => 2,
            OpenStatus::Restricted => 3,
        }
    }

    pub fn is_known(self) -> bool {
        self != OpenStatus::Unknown
    }
}

impl From<i64> for OpenStatus {
    fn from(code: i64) -> Self {
        match code {
            0 => OpenStatus::Closed,
            1 => OpenStatus::Bilateral,
            2 => OpenStatus::Open,
            3 => OpenStatus::Restricted,
            _ => OpenStatus::Unknown,
        }
    }
}

impl From<OpenStatus> for i64 {
    fn from(status: OpenStatus) -> Self {
        status.code()
    }
}

/// A single crossing point on a border.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorderPostRecord {
    pub id: String,
    pub name: Option<String>,
    pub is_open: OpenStatus,
    /// `[lon, lat]`, GeoJSON order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countries: Option<(String, String)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_translations: Option<Translations>,
}

impl BorderPostRecord {
    /// Minimal record used when nothing is known beyond the id.
    pub fn placeholder(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: None,
            is_open: OpenStatus::Unknown,
            coordinates: None,
            countries: None,
            comment: None,
            comment_translations: None,
        }
    }

    /// Build from a clicked feature's properties, taking the point geometry
    /// when the properties carry no coordinates.
    pub fn from_feature(feature: &MapFeature, id: &str) -> Self {
        let mut record = Self::from_properties(&feature.properties, Some(id))
            .unwrap_or_else(|| Self::placeholder(id));
        if record.coordinates.is_none() {
            record.coordinates = feature.point().map(|p| [p.x(), p.y()]);
        }
        record
    }

    fn from_properties(props: &Properties, fallback_id: Option<&str>) -> Option<Self> {
        let id = id_prop(props, "id").or_else(|| fallback_id.map(str::to_string))?;

        let is_open = int_prop(props, "is_open")
            .or_else(|| int_prop(props, "status"))
            .map(OpenStatus::from)
            .unwrap_or_default();

        let countries = match props.get("countries").and_then(Value::as_array) {
            Some(pair) if pair.len() == 2 => pair[0]
                .as_str()
                .zip(pair[1].as_str())
                .map(|(a, b)| (a.to_ascii_uppercase(), b.to_ascii_uppercase())),
            _ => owned_str(props, "country1")
                .zip(owned_str(props, "country2"))
                .map(|(a, b)| (a.to_ascii_uppercase(), b.to_ascii_uppercase())),
        };

        Some(Self {
            id,
            name: first_str_prop(props, &["name", "Name", "NAME", "title"]).map(str::to_string),
            is_open,
            coordinates: coordinates_from(props),
            countries,
            comment: owned_str(props, "comment"),
            comment_translations: translations_from_value(props.get("comment_translations")),
        })
    }

    /// Merge sources, preferring a fetched record, then the clicked feature,
    /// then placeholder defaults. Field-wise: a known value is never replaced
    /// by an unknown one.
    pub fn merge(id: &str, fetched: Option<Self>, feature: Option<Self>) -> Self {
        let mut merged = Self::placeholder(id);
        for source in [fetched, feature].into_iter().flatten().rev() {
            merged.name = source.name.or(merged.name);
            if source.is_open.is_known() {
                merged.is_open = source.is_open;
            }
            merged.coordinates = source.coordinates.or(merged.coordinates);
            merged.countries = source.countries.or(merged.countries);
            merged.comment = source.comment.or(merged.comment);
            merged.comment_translations = source.comment_translations.or(merged.comment_translations);
        }
        merged
    }

    /// Whether the record carries everything the detail panel shows.
    pub fn is_complete(&self) -> bool {
        self.name.is_some() && self.is_open.is_known() && self.coordinates.is_some()
    }

    pub fn point(&self) -> Option<Point<f64>> {
        self.coordinates.map(|[lon, lat]| Point::new(lon, lat))
    }

    pub fn comment_in(&self, language: &str) -> Option<String> {
        translate(
            self.comment_translations.as_ref(),
            language,
            self.comment.as_deref(),
        )
    }

    /// Normalize the bundled border-post file.
    ///
    /// Unlike feature properties, bundled items must carry parseable
    /// coordinates; items without them are skipped.
    pub fn normalize_bundle(value: &Value) -> Vec<Self> {
        let items = crate::models::collection_items(value, Self::COLLECTION_FIELD);
        let mut skipped = 0usize;
        let records: Vec<Self> = items
            .into_iter()
            .filter_map(|(key, item)| {
                let record = Self::from_value(item, key).filter(|r| r.coordinates.is_some());
                if record.is_none() {
                    skipped += 1;
                }
                record
            })
            .collect();

        if skipped > 0 {
            tracing::warn!(skipped, "Skipped bundled border posts with invalid coordinates");
        }
        records
    }
}

/// Coordinates from any of the supported layouts, validated to lon/lat range.
fn coordinates_from(props: &Properties) -> Option<[f64; 2]> {
    let pair = match props.get("coordinates") {
        Some(Value::Array(xy)) if xy.len() >= 2 => xy[0].as_f64().zip(xy[1].as_f64()),
        Some(Value::Object(obj)) => f64_prop(obj, "lng")
            .or_else(|| f64_prop(obj, "lon"))
            .zip(f64_prop(obj, "lat")),
        _ => None,
    };

    pair.or_else(|| {
        f64_prop(props, "longitude")
            .or_else(|| f64_prop(props, "lng"))
            .or_else(|| f64_prop(props, "lon"))
            .zip(f64_prop(props, "latitude").or_else(|| f64_prop(props, "lat")))
    })
    .filter(|(lon, lat)| (-180.0..=180.0).contains(lon) && (-90.0..=90.0).contains(lat))
    .map(|(lon, lat)| [lon, lat])
}

impl Record for BorderPostRecord {
    const KIND: EntityKind = EntityKind::BorderPost;
    const COLLECTION_FIELD: &'static str = "borderPosts";

    fn from_value(value: &Value, fallback_id: Option<&str>) -> Option<Self> {
        Self::from_properties(value.as_object()?, fallback_id)
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn from_collection(value: &Value) -> Vec<Self> {
        Self::normalize_bundle(value)
    }
}
