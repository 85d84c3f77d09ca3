// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Declarative layer filters.

use crate::models::props::Properties;
use serde_json::{json, Value};

/// A filter applied to a map layer.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerFilter {
    /// Matches nothing; hides every feature on the layer.
    Never,
    /// `feature[property] == value`.
    Equals { property: String, value: Value },
}

impl LayerFilter {
    pub fn equals(property: &str, value: impl Into<Value>) -> Self {
        LayerFilter::Equals {
            property: property.to_string(),
            value: value.into(),
        }
    }

    /// Style-spec expression form.
    pub fn to_expression(&self) -> Value {
        match self {
            LayerFilter::Never => json!(["boolean", false]),
            LayerFilter::Equals { property, value } => json!(["==", ["get", property], value]),
        }
    }

    /// Evaluate against a feature's properties.
    pub fn matches(&self, props: &Properties) -> bool {
        match self {
            LayerFilter::Never => false,
            LayerFilter::Equals { property, value } => props.get(property) == Some(value),
        }
    }

    pub fn is_never(&self) -> bool {
        matches!(self, LayerFilter::Never)
    }
}
