// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Entity API routes.
//!
//! Firestore is authoritative; when it is offline or fails, the bundled
//! files under the data directory answer instead.

use crate::data::ResourceKey;
use crate::error::{AppError, Result};
use crate::models::{
    BorderPostRecord, BorderPostsRequest, BorderPostsResponse, BorderRecord, CountriesMetadata,
    CountriesResponse, CountryRecord, EntityKind, ItineraryRecord, Record, ZoneRecord,
};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use validator::Validate;

const SOURCE_FIRESTORE: &str = "firestore";
const SOURCE_STATIC: &str = "static";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/countries", get(get_countries))
        .route("/api/border-posts", post(get_border_posts))
        .route("/api/{kind}/{id}", get(get_entity))
}

// ─── Countries ───────────────────────────────────────────────

async fn get_countries(State(state): State<Arc<AppState>>) -> Result<Json<CountriesResponse>> {
    let (countries, source) = if state.db.is_connected() {
        match state.db.get_countries().await {
            Ok(countries) if !countries.is_empty() => (countries, SOURCE_FIRESTORE),
            Ok(_) => {
                tracing::warn!("Firestore has no countries, serving bundled data");
                (bundled::<CountryRecord>(&state, ResourceKey::Countries).await?, SOURCE_STATIC)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Firestore countries query failed, serving bundled data");
                (bundled::<CountryRecord>(&state, ResourceKey::Countries).await?, SOURCE_STATIC)
            }
        }
    } else {
        (bundled::<CountryRecord>(&state, ResourceKey::Countries).await?, SOURCE_STATIC)
    };

    tracing::debug!(count = countries.len(), source, "Serving countries");
    Ok(Json(CountriesResponse {
        metadata: CountriesMetadata {
            source: source.to_string(),
            count: countries.len(),
            last_updated: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        },
        countries,
    }))
}

// ─── Border Posts ────────────────────────────────────────────

async fn get_border_posts(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BorderPostsRequest>,
) -> Result<Json<BorderPostsResponse>> {
    request.validate()?;

    let mut ids: Vec<String> = Vec::with_capacity(request.ids.len());
    let mut seen = HashSet::new();
    for id in request.ids {
        let id = id.trim().to_string();
        if seen.insert(id.clone()) {
            ids.push(id);
        }
    }

    let border_posts = if state.db.is_connected() {
        match state.db.get_border_posts(&ids).await {
            Ok(posts) => posts,
            Err(e) => {
                tracing::warn!(error = %e, "Firestore border post lookup failed, using bundle");
                bundled_border_posts(&state, &ids).await?
            }
        }
    } else {
        bundled_border_posts(&state, &ids).await?
    };

    tracing::debug!(
        requested = ids.len(),
        found = border_posts.len(),
        "Serving border posts"
    );
    Ok(Json(BorderPostsResponse { border_posts }))
}

async fn bundled_border_posts(state: &AppState, ids: &[String]) -> Result<Vec<BorderPostRecord>> {
    let all = bundled::<BorderPostRecord>(state, ResourceKey::BorderPosts).await?;
    Ok(ids
        .iter()
        .filter_map(|id| all.iter().find(|post| &post.id == id).cloned())
        .collect())
}

// ─── Single Entities ─────────────────────────────────────────

async fn get_entity(
    State(state): State<Arc<AppState>>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Json<Value>> {
    let kind = EntityKind::from_route_segment(&kind)
        .ok_or_else(|| AppError::NotFound(format!("Unknown entity kind: {kind}")))?;
    let id = id.trim();
    if id.is_empty() || id.len() > 64 {
        return Err(AppError::BadRequest("Invalid entity id".to_string()));
    }

    let value = match kind {
        EntityKind::Country => {
            let code = id.to_ascii_uppercase();
            to_json(entity::<CountryRecord>(&state, &code, ResourceKey::Countries).await?)?
        }
        EntityKind::Border => to_json(entity::<BorderRecord>(&state, id, ResourceKey::Borders).await?)?,
        EntityKind::BorderPost => {
            to_json(entity::<BorderPostRecord>(&state, id, ResourceKey::BorderPosts).await?)?
        }
        EntityKind::Zone => to_json(entity::<ZoneRecord>(&state, id, ResourceKey::Zones).await?)?,
        EntityKind::Itinerary => {
            to_json(entity::<ItineraryRecord>(&state, id, ResourceKey::Itineraries).await?)?
        }
    };

    value
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("{kind} {id} not found")))
}

/// One record by id, from Firestore when connected, else the bundle.
async fn entity<T>(state: &AppState, id: &str, resource: ResourceKey) -> Result<Option<T>>
where
    T: Record + DeserializeOwned,
{
    if state.db.is_connected() {
        match state.db.get_entity::<T>(id).await {
            Ok(Some(record)) => return Ok(Some(record)),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(kind = %T::KIND, id, error = %e, "Firestore lookup failed, using bundle");
            }
        }
    }

    let all = bundled::<T>(state, resource).await?;
    Ok(all.into_iter().find(|record| record.id() == id))
}

async fn bundled<T: Record>(state: &AppState, resource: ResourceKey) -> Result<Vec<T>> {
    let value = state.bundle.load(&resource).await?;
    Ok(T::from_collection(&value))
}

fn to_json<T: serde::Serialize>(record: Option<T>) -> Result<Option<Value>> {
    record
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| AppError::Internal(e.into()))
}
