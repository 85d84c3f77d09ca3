// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Country record: travel parameters plus translated name/capital/comment.

use crate::models::props::{first_str_prop, str_prop, Properties};
use crate::models::translation::{translate, translations_from_value, Translations};
use crate::models::{EntityKind, Record};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Fields that are part of the record envelope rather than its parameters.
const ENVELOPE_FIELDS: &[&str] = &[
    "id",
    "iso3",
    "ISO_A3",
    "name",
    "NAME",
    "parameters",
    "translations",
    "name_translations",
    "capital_translations",
    "comment_translations",
];

/// Per-country vehicle travel difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlandingStatus {
    Open,
    Restricted,
    Dangerous,
    Forbidden,
}

impl OverlandingStatus {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Open),
            1 => Some(Self::Restricted),
            2 => Some(Self::Dangerous),
            3 => Some(Self::Forbidden),
            _ => None,
        }
    }
}

/// A country, keyed by its ISO3-like code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRecord {
    pub id: String,
    pub name: String,
    /// Visa rules, carnet status, driving side, overlanding code, adjacency.
    #[serde(default)]
    pub parameters: Properties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_translations: Option<Translations>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capital_translations: Option<Translations>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_translations: Option<Translations>,
}

impl CountryRecord {
    pub fn overlanding_status(&self) -> Option<OverlandingStatus> {
        crate::models::props::int_prop(&self.parameters, "overlanding")
            .and_then(OverlandingStatus::from_code)
    }

    /// Carnet de Passage requirement code.
    pub fn carnet_status(&self) -> Option<i64> {
        crate::models::props::int_prop(&self.parameters, "carnet")
    }

    pub fn driving_side(&self) -> Option<&str> {
        str_prop(&self.parameters, "driving_side")
    }

    pub fn visa(&self) -> Option<&str> {
        str_prop(&self.parameters, "visa")
    }

    /// Border adjacency: border id -> neighbouring country code.
    pub fn neighbours(&self) -> BTreeMap<String, String> {
        self.parameters
            .get("borders")
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .filter_map(|(border, iso3)| {
                        Some((border.clone(), iso3.as_str()?.to_ascii_uppercase()))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn display_name(&self, language: &str) -> String {
        translate(self.name_translations.as_ref(), language, Some(&self.name))
            .unwrap_or_else(|| self.id.clone())
    }

    pub fn capital(&self, language: &str) -> Option<String> {
        translate(
            self.capital_translations.as_ref(),
            language,
            str_prop(&self.parameters, "capital"),
        )
    }

    pub fn comment(&self, language: &str) -> Option<String> {
        translate(
            self.comment_translations.as_ref(),
            language,
            str_prop(&self.parameters, "comment"),
        )
    }
}

impl Record for CountryRecord {
    const KIND: EntityKind = EntityKind::Country;
    const COLLECTION_FIELD: &'static str = "countries";

    fn from_value(value: &Value, fallback_id: Option<&str>) -> Option<Self> {
        let props = value.as_object()?;

        let id = first_str_prop(props, &["id", "iso3", "ISO_A3"])
            .or(fallback_id)
            .map(str::trim)
            .filter(|s| !s.is_empty())?
            .to_ascii_uppercase();

        let name = first_str_prop(props, &["name", "NAME"])
            .unwrap_or(&id)
            .to_string();

        let parameters = match props.get("parameters").and_then(Value::as_object) {
            Some(params) => params.clone(),
            None => props
                .iter()
                .filter(|(k, _)| !ENVELOPE_FIELDS.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        };

        let nested = props.get("translations");
        let field_translations = |field: &str| {
            translations_from_value(props.get(&format!("{field}_translations")))
                .or_else(|| translations_from_value(nested.and_then(|t| t.get(field))))
        };

        Some(Self {
            name_translations: field_translations("name"),
            capital_translations: field_translations("capital"),
            comment_translations: field_translations("comment"),
            id,
            name,
            parameters,
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
    fn test_flat_record_collects_parameters() {
        let value = json!({
            "id": "kaz",
            "name": "Kazakhstan",
            "overlanding": 1,
            "carnet": "0",
            "driving_side": "right",
            "borders": {"KAZ-UZB": "uzb", "CHN-KAZ": "CHN"}
        });
        let country = CountryRecord::from_value(&value, None).unwrap();
        assert_eq!(country.id, "KAZ");
        assert_eq!(country.overlanding_status(), Some(OverlandingStatus::Restricted));
        assert_eq!(country.carnet_status(), Some(0));
        assert_eq!(country.driving_side(), Some("right"));
        assert_eq!(country.neighbours().get("KAZ-UZB").map(String::as_str), Some("UZB"));
    }

    #[test]
    fn test_nested_translations() {
        let value = json!({
            "name": "Georgia",
            "parameters": {"comment": "Easy crossing"},
            "translations": {"name": {"fr": "Géorgie"}, "comment": "not a map"}
        });
        let country = CountryRecord::from_value(&value, Some("GEO")).unwrap();
        assert_eq!(country.id, "GEO");
        assert_eq!(country.display_name("fr"), "Géorgie");
        assert_eq!(country.display_name("de"), "Georgia");
        assert_eq!(country.comment("fr").as_deref(), Some("Easy crossing"));
    }

    #[test]
    fn test_missing_id_rejected() {
        assert!(CountryRecord::from_value(&json!({"name": "Nowhere"}), None).is_none());
        assert!(CountryRecord::from_value(&json!(["KAZ"]), Some("KAZ")).is_none());
    }
}
