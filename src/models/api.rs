// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request/response bodies of the entity API.

use crate::models::{BorderPostRecord, CountryRecord};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// `POST /api/border-posts` body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BorderPostsRequest {
    #[validate(length(min = 1, max = 100), custom(function = "validate_ids"))]
    pub ids: Vec<String>,
}

fn validate_ids(ids: &[String]) -> Result<(), validator::ValidationError> {
    if ids.iter().all(|id| !id.trim().is_empty() && id.len() <= 64) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("invalid_id"))
    }
}

/// `POST /api/border-posts` response. Unknown ids are omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorderPostsResponse {
    pub border_posts: Vec<BorderPostRecord>,
}

/// Where a countries payload came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CountriesMetadata {
    /// `"firestore"` or `"static"`.
    pub source: String,
    pub count: usize,
    pub last_updated: String,
}

/// `GET /api/countries` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountriesResponse {
    pub countries: Vec<CountryRecord>,
    pub metadata: CountriesMetadata,
}
