// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Border record (a shared boundary between two countries).

use crate::models::border_post::OpenStatus;
use crate::models::props::{id_prop, int_prop, owned_str, Properties};
use crate::models::translation::{translate, translations_from_value, Translations};
use crate::models::{EntityKind, Record};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorderRecord {
    pub id: String,
    /// Usually `"CODE1 - CODE2"`.
    pub name: Option<String>,
    pub is_open: OpenStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_translations: Option<Translations>,
    /// Border posts on this border: post id -> post name.
    #[serde(default)]
    pub border_posts: BTreeMap<String, String>,
    #[serde(default)]
    pub properties: Properties,
}

impl BorderRecord {
    /// The two country codes encoded in the name, if it follows `"A - B"`.
    pub fn country_codes(&self) -> Option<(String, String)> {
        let (a, b) = self.name.as_deref()?.split_once('-')?;
        let (a, b) = (a.trim(), b.trim());
        if a.is_empty() || b.is_empty() {
            return None;
        }
        Some((a.to_ascii_uppercase(), b.to_ascii_uppercase()))
    }

    pub fn comment_in(&self, language: &str) -> Option<String> {
        translate(
            self.comment_translations.as_ref(),
            language,
            self.comment.as_deref(),
        )
    }
}

impl Record for BorderRecord {
    const KIND: EntityKind = EntityKind::Border;
    const COLLECTION_FIELD: &'static str = "borders";

    fn from_value(value: &Value, fallback_id: Option<&str>) -> Option<Self> {
        let outer = value.as_object()?;
        // Stored borders nest their fields under `properties`.
        let props = outer
            .get("properties")
            .and_then(Value::as_object)
            .unwrap_or(outer);

        let id = id_prop(outer, "id")
            .or_else(|| id_prop(props, "id"))
            .or_else(|| fallback_id.map(str::to_string))?;

        let border_posts = props
            .get("border_posts")
            .and_then(Value::as_object)
            .map(|posts| {
                posts
                    .iter()
                    .map(|(post_id, name)| {
                        let name = name.as_str().unwrap_or(post_id).to_string();
                        (post_id.clone(), name)
                    })
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            id,
            name: owned_str(props, "name"),
            is_open: int_prop(props, "is_open")
                .map(OpenStatus::from)
                .unwrap_or_default(),
            comment: owned_str(props, "comment"),
            comment_translations: translations_from_value(props.get("comment_translations")),
            border_posts,
            properties: props.clone(),
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
    fn test_nested_properties() {
        let value = json!({
            "id": "KAZ-UZB",
            "properties": {
                "name": "KAZ - UZB",
                "is_open": "2",
                "border_posts": {"bp-1": "Zhibek Zholy", "bp-2": null}
            }
        });
        let border = BorderRecord::from_value(&value, None).unwrap();
        assert_eq!(border.is_open, OpenStatus::Open);
        assert_eq!(border.country_codes(), Some(("KAZ".into(), "UZB".into())));
        assert_eq!(border.border_posts.get("bp-2").map(String::as_str), Some("bp-2"));
    }

    #[test]
    fn test_unparseable_name() {
        let border = BorderRecord::from_value(&json!({"id": 9, "name": "Caspian"}), None).unwrap();
        assert_eq!(border.id, "9");
        assert_eq!(border.country_codes(), None);
    }
}
