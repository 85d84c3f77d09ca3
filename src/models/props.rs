// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Lenient accessors for loosely-typed JSON properties.
//!
//! Feature properties, bundled files and API responses disagree on whether
//! numbers are numbers or strings; these helpers accept both and treat empty
//! strings as absent.

use serde_json::{Map, Value};

pub type Properties = Map<String, Value>;

/// Non-empty, trimmed string property.
pub fn str_prop<'a>(props: &'a Properties, key: &str) -> Option<&'a str> {
    props
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// First non-empty string property among `keys`.
pub fn first_str_prop<'a>(props: &'a Properties, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| str_prop(props, key))
}

/// Identifier property, accepting strings and integers.
pub fn id_prop(props: &Properties, key: &str) -> Option<String> {
    match props.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Integer property, accepting numbers and numeric strings.
pub fn int_prop(props: &Properties, key: &str) -> Option<i64> {
    match props.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Float property, accepting numbers and numeric strings.
pub fn f64_prop(props: &Properties, key: &str) -> Option<f64> {
    match props.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|f: &f64| f.is_finite())
}

/// Owned copy of a string property.
pub fn owned_str(props: &Properties, key: &str) -> Option<String> {
    str_prop(props, key).map(str::to_string)
}
