// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod api;
pub mod border;
pub mod border_post;
pub mod country;
pub mod feature;
pub mod itinerary;
pub mod kind;
pub mod props;
pub mod translation;
pub mod zone;

pub use api::{BorderPostsRequest, BorderPostsResponse, CountriesMetadata, CountriesResponse};
pub use border::BorderRecord;
pub use border_post::{BorderPostRecord, OpenStatus};
pub use country::{CountryRecord, OverlandingStatus};
pub use feature::{Entity, MapFeature, SelectedFeature};
pub use itinerary::ItineraryRecord;
pub use kind::EntityKind;
pub use translation::Translations;
pub use zone::{ZoneRecord, ZoneType};

use serde_json::Value;

/// A domain record that can be normalized from loosely-shaped JSON.
///
/// `fallback_id` is used when the record itself carries no id, e.g. when the
/// source collection is an object keyed by id.
pub trait Record: Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    /// Field wrapping the item array in a static collection file.
    const COLLECTION_FIELD: &'static str;

    fn from_value(value: &Value, fallback_id: Option<&str>) -> Option<Self>;

    fn id(&self) -> &str;

    /// Normalize a whole static collection.
    fn from_collection(value: &Value) -> Vec<Self> {
        normalize_collection(value, Self::COLLECTION_FIELD)
    }
}

/// Iterate the items of a collection resource.
///
/// Static collections come in three shapes: a bare array, an object wrapping
/// an array under `field`, or an object keyed by id.
pub fn collection_items<'a>(value: &'a Value, field: &str) -> Vec<(Option<&'a str>, &'a Value)> {
    match value {
        Value::Array(items) => items.iter().map(|v| (None, v)).collect(),
        Value::Object(map) => match map.get(field) {
            Some(Value::Array(items)) => items.iter().map(|v| (None, v)).collect(),
            _ => map
                .iter()
                .filter(|(_, v)| v.is_object())
                .map(|(k, v)| (Some(k.as_str()), v))
                .collect(),
        },
        _ => Vec::new(),
    }
}

/// Normalize every item of a collection, dropping those that fail validation.
pub fn normalize_collection<T: Record>(value: &Value, field: &str) -> Vec<T> {
    let items = collection_items(value, field);
    let total = items.len();
    let records: Vec<T> = items
        .into_iter()
        .filter_map(|(key, item)| T::from_value(item, key))
        .collect();

    if records.len() < total {
        tracing::warn!(
            kind = ?T::KIND,
            dropped = total - records.len(),
            "Dropped malformed records while normalizing collection"
        );
    }
    records
}
