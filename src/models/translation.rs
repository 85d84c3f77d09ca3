// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-language text variants and the fallback chain used to pick one.

use serde_json::Value;
use std::collections::BTreeMap;

/// Language used when the requested one has no entry.
pub const FALLBACK_LANGUAGE: &str = "en";

/// Translations of a single field, keyed by language code.
pub type Translations = BTreeMap<String, String>;

/// Normalize a raw translation map.
///
/// Returns `None` for anything that is not an object; non-string and empty
/// values inside the object are dropped.
pub fn translations_from_value(value: Option<&Value>) -> Option<Translations> {
    let map = value?.as_object()?;
    let translations: Translations = map
        .iter()
        .filter_map(|(lang, text)| {
            let text = text.as_str()?.trim();
            (!text.is_empty()).then(|| (lang.to_ascii_lowercase(), text.to_string()))
        })
        .collect();
    (!translations.is_empty()).then_some(translations)
}

/// Pick the text to display for `language`.
///
/// Order: the requested language, then English, then the untranslated field.
pub fn translate(
    translations: Option<&Translations>,
    language: &str,
    original: Option<&str>,
) -> Option<String> {
    if let Some(map) = translations {
        let language = language.to_ascii_lowercase();
        if let Some(text) = map.get(&language).or_else(|| map.get(FALLBACK_LANGUAGE)) {
            return Some(text.clone());
        }
    }
    original
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
