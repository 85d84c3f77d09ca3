// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Structural validation of GeoJSON payloads before they enter the cache.

use serde_json::Value;

const GEOJSON_TYPES: &[&str] = &[
    "FeatureCollection",
    "Feature",
    "GeometryCollection",
    "Point",
    "LineString",
    "Polygon",
    "MultiPoint",
    "MultiLineString",
    "MultiPolygon",
];

/// Problems found in a GeoJSON document.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GeoJsonReport {
    pub errors: Vec<String>,
    /// Tolerated oddities, e.g. features with null geometry.
    pub warnings: Vec<String>,
}

impl GeoJsonReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check that `value` is a well-formed GeoJSON object.
pub fn validate(value: &Value) -> GeoJsonReport {
    let mut report = GeoJsonReport::default();

    let Some(kind) = value.get("type").and_then(Value::as_str) else {
        report.errors.push("missing 'type' property".to_string());
        return report;
    };
    if !GEOJSON_TYPES.contains(&kind) {
        report.errors.push(format!("invalid type: {kind}"));
        return report;
    }

    match kind {
        "FeatureCollection" => match value.get("features").and_then(Value::as_array) {
            Some(features) => {
                for (i, feature) in features.iter().enumerate() {
                    check_feature(feature, &format!("feature {i}"), &mut report);
                }
            }
            None => report
                .errors
                .push("FeatureCollection missing 'features' array".to_string()),
        },
        "Feature" => check_feature(value, "feature", &mut report),
        _ => {}
    }

    report
}

fn check_feature(feature: &Value, label: &str, report: &mut GeoJsonReport) {
    match feature.get("type").and_then(Value::as_str) {
        None => report.errors.push(format!("{label} missing 'type' property")),
        Some("Feature") => {}
        Some(other) => report
            .errors
            .push(format!("{label} has invalid type: {other}")),
    }

    match feature.get("geometry") {
        None => report
            .errors
            .push(format!("{label} missing 'geometry' property")),
        Some(Value::Null) => report.warnings.push(format!("{label} has null geometry")),
        Some(geometry) => {
            if geometry.get("type").is_none() {
                report
                    .errors
                    .push(format!("{label} geometry missing 'type' property"));
            } else if geometry.get("type").and_then(Value::as_str) != Some("GeometryCollection") {
                match geometry.get("coordinates") {
                    None => report
                        .errors
                        .push(format!("{label} geometry missing 'coordinates' property")),
                    Some(c) if !c.is_array() => report
                        .errors
                        .push(format!("{label} geometry coordinates is not an array")),
                    _ => {}
                }
            }
        }
    }

    if feature.get("properties").is_none() {
        report
            .errors
            .push(format!("{label} missing 'properties' property"));
    }
}
