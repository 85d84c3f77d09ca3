// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Route paths: `/` and `/<kind>/<id>` for each selectable kind.

use crate::models::EntityKind;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("Unknown route: {0}")]
    Unknown(String),

    #[error("Empty id in route: {0}")]
    EmptyId(String),

    #[error("Malformed percent-encoding in route: {0}")]
    Encoding(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Entity { kind: EntityKind, id: String },
}

/// Payload attached to each pushed history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryState {
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub id: String,
}

impl Route {
    pub fn entity(kind: EntityKind, id: impl Into<String>) -> Self {
        Route::Entity {
            kind,
            id: id.into(),
        }
    }

    /// Parse a path. Query string and fragment are ignored, as is a single
    /// trailing slash.
    pub fn parse(path: &str) -> Result<Self, RouteError> {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let trimmed = path.strip_suffix('/').unwrap_or(path);
        if trimmed.is_empty() {
            return Ok(Route::Home);
        }

        let rest = trimmed
            .strip_prefix('/')
            .ok_or_else(|| RouteError::Unknown(path.to_string()))?;
        let (segment, raw_id) = rest
            .split_once('/')
            .ok_or_else(|| RouteError::Unknown(path.to_string()))?;

        let kind = EntityKind::from_route_segment(segment)
            .ok_or_else(|| RouteError::Unknown(path.to_string()))?;
        if raw_id.contains('/') {
            return Err(RouteError::Unknown(path.to_string()));
        }

        let id = urlencoding::decode(raw_id)
            .map_err(|_| RouteError::Encoding(path.to_string()))?;
        if id.trim().is_empty() {
            return Err(RouteError::EmptyId(path.to_string()));
        }

        Ok(Route::Entity {
            kind,
            id: id.into_owned(),
        })
    }

    pub fn to_path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Entity { kind, id } => {
                format!("/{}/{}", kind.route_segment(), urlencoding::encode(id))
            }
        }
    }

    pub fn history_state(&self) -> Option<HistoryState> {
        match self {
            Route::Home => None,
            Route::Entity { kind, id } => Some(HistoryState {
                kind: *kind,
                id: id.clone(),
            }),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path())
    }
}
