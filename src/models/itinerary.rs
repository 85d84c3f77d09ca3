// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Curated itinerary record.

use crate::models::props::{f64_prop, id_prop, int_prop, owned_str};
use crate::models::translation::{translate, translations_from_value, Translations};
use crate::models::{EntityKind, Record};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryRecord {
    pub id: String,
    pub name: String,
    pub length_km: Option<f64>,
    pub duration_days: Option<f64>,
    pub difficulty: Option<i64>,
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_translations: Option<Translations>,
    pub highlights: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlights_translations: Option<Translations>,
    /// Route line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<geojson::Geometry>,
}

impl ItineraryRecord {
    pub fn description_in(&self, language: &str) -> Option<String> {
        translate(
            self.description_translations.as_ref(),
            language,
            self.description.as_deref(),
        )
    }

    pub fn highlights_in(&self, language: &str) -> Option<String> {
        translate(
            self.highlights_translations.as_ref(),
            language,
            self.highlights.as_deref(),
        )
    }
}

impl Record for ItineraryRecord {
    const KIND: EntityKind = EntityKind::Itinerary;
    const COLLECTION_FIELD: &'static str = "itineraries";

    fn from_value(value: &Value, fallback_id: Option<&str>) -> Option<Self> {
        let outer = value.as_object()?;
        let props = outer
            .get("properties")
            .and_then(Value::as_object)
            .unwrap_or(outer);

        let id = id_prop(outer, "id")
            .or_else(|| id_prop(props, "id"))
            .or_else(|| fallback_id.map(str::to_string))?;

        let geometry = outer
            .get("geometry")
            .cloned()
            .and_then(|g| geojson::Geometry::from_json_value(g).ok());

        Some(Self {
            name: owned_str(props, "name").unwrap_or_else(|| id.clone()),
            id,
            length_km: f64_prop(props, "length_km").or_else(|| f64_prop(props, "length")),
            duration_days: f64_prop(props, "duration_days"),
            difficulty: int_prop(props, "difficulty"),
            description: owned_str(props, "description"),
            description_translations: translations_from_value(
                props.get("description_translations"),
            ),
            highlights: owned_str(props, "highlights"),
            highlights_translations: translations_from_value(props.get("highlights_translations")),
            geometry,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_feature_shaped_itinerary() {
        let value = json!({
            "type": "Feature",
            "properties": {
                "id": "G6",
                "name": "Pamir Highway",
                "length": "1250",
                "difficulty": 3,
                "highlights": "Ak-Baital pass",
                "highlights_translations": {"fr": "Col d'Ak-Baital"}
            },
            "geometry": {"type": "LineString", "coordinates": [[74.0, 39.0], [71.5, 37.5]]}
        });
        let itinerary = ItineraryRecord::from_value(&value, None).unwrap();
        assert_eq!(itinerary.id, "G6");
        assert_eq!(itinerary.length_km, Some(1250.0));
        assert_eq!(itinerary.highlights_in("fr").as_deref(), Some("Col d'Ak-Baital"));
        assert_eq!(itinerary.highlights_in("es").as_deref(), Some("Ak-Baital pass"));
        assert!(itinerary.geometry.is_some());
    }
}
