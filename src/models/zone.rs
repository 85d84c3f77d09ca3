// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Restricted zone record.

use crate::models::props::{id_prop, int_prop, owned_str, str_prop, Properties};
use crate::models::{EntityKind, MapFeature, Record};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Access regime inside a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneType {
    Closed,
    GuideEscort,
    Permit,
    Restrictions,
}

impl ZoneType {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Closed),
            1 => Some(Self::GuideEscort),
            2 => Some(Self::Permit),
            3 => Some(Self::Restrictions),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneRecord {
    pub id: String,
    pub zone_type: Option<ZoneType>,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub country: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<geojson::Geometry>,
}

impl ZoneRecord {
    pub fn bare(id: &str) -> Self {
        Self {
            id: id.to_string(),
            zone_type: None,
            name: None,
            comment: None,
            country: None,
            description: None,
            properties: Properties::new(),
            geometry: None,
        }
    }

    /// Overlay live feature data on a stored record.
    ///
    /// Non-empty feature properties win for name/type/comment/country/description;
    /// geometry always comes from the feature when it has one.
    pub fn overlay_feature(mut self, feature: &MapFeature) -> Self {
        let props = &feature.properties;
        if let Some(name) = str_prop(props, "name") {
            self.name = Some(name.to_string());
        }
        if let Some(zone_type) = int_prop(props, "type").and_then(ZoneType::from_code) {
            self.zone_type = Some(zone_type);
        }
        for (field, slot) in [
            ("comment", &mut self.comment),
            ("country", &mut self.country),
            ("description", &mut self.description),
        ] {
            if let Some(value) = str_prop(props, field) {
                *slot = Some(value.to_string());
            }
        }
        if feature.geometry.is_some() {
            self.geometry = feature.geometry.clone();
        }
        self
    }
}

impl Record for ZoneRecord {
    const KIND: EntityKind = EntityKind::Zone;
    const COLLECTION_FIELD: &'static str = "zones";

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
            id,
            zone_type: int_prop(props, "type").and_then(ZoneType::from_code),
            name: owned_str(props, "name"),
            comment: owned_str(props, "comment"),
            country: owned_str(props, "country"),
            description: owned_str(props, "description"),
            properties: props.clone(),
            geometry,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }
}
