// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Entity resolution: turn a clicked map feature or a URL id into a typed
//! record.
//!
//! Resolution never fails loudly. When no source knows the entity the
//! result carries the raw id and no record, and the miss is logged.

pub mod country_names;

use crate::data::EntityRepository;
use crate::models::props::{first_str_prop, id_prop, str_prop};
use crate::models::{BorderPostRecord, Entity, EntityKind, MapFeature, ZoneRecord};
use std::sync::Arc;

pub use country_names::iso3_for_name;

/// Country code properties, in priority order. The lowercase variants come
/// from sources that lowercase their schema.
const COUNTRY_CODE_FIELDS: &[&str] = &["ADM0_A3", "ISO_A3"];
const COUNTRY_CODE_FIELDS_LOWER: &[&str] = &["adm0_a3", "iso_a3"];
const COUNTRY_NAME_FIELDS: &[&str] = &["NAME", "name", "NAME_EN", "ADMIN"];

/// Placeholder Natural Earth uses for "no code".
const MISSING_CODE: &str = "-99";

/// Outcome of a resolution: the canonical id plus the record, when found.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub id: String,
    pub record: Option<Entity>,
}

impl Resolution {
    fn miss(id: String) -> Self {
        Self { id, record: None }
    }
}

#[derive(Clone)]
pub struct EntityResolver {
    repository: Arc<EntityRepository>,
}

impl EntityResolver {
    pub fn new(repository: Arc<EntityRepository>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &Arc<EntityRepository> {
        &self.repository
    }

    /// Resolve a clicked feature. `None` when the feature is not on an
    /// interactive layer or carries no usable identifier.
    pub async fn resolve_feature(&self, feature: &MapFeature) -> Option<Resolution> {
        let kind = feature.kind()?;
        let Some(id) = feature_id(kind, feature) else {
            tracing::warn!(%kind, layer = %feature.layer, "Feature has no usable identifier");
            return None;
        };

        let resolution = match kind {
            EntityKind::Country => self.resolve_country_feature(feature, id).await,
            EntityKind::Border => {
                let record = self.repository.get_border(&id).await.map(Entity::Border);
                Resolution { id, record }
            }
            EntityKind::BorderPost => {
                let record = self.resolve_border_post(&id, Some(feature)).await;
                Resolution { id, record }
            }
            EntityKind::Zone => {
                let stored = self.repository.get_zone(&id).await;
                let zone = stored
                    .unwrap_or_else(|| ZoneRecord::bare(&id))
                    .overlay_feature(feature);
                Resolution {
                    id,
                    record: Some(Entity::Zone(zone)),
                }
            }
            EntityKind::Itinerary => {
                let record = self.repository.get_itinerary(&id).await.map(Entity::Itinerary);
                Resolution { id, record }
            }
        };
        Some(resolution)
    }

    /// Resolve a bare `(kind, id)`, as parsed from a URL.
    pub async fn resolve_id(&self, kind: EntityKind, id: &str) -> Resolution {
        let id = id.trim().to_string();
        let record = match kind {
            EntityKind::Country => {
                let direct = self.repository.get_country(&id).await;
                let country = match direct {
                    Some(country) => Some(country),
                    None => match iso3_for_name(&id) {
                        Some(iso3) => self.repository.get_country(iso3).await,
                        None => None,
                    },
                };
                match country {
                    Some(country) => {
                        return Resolution {
                            id: country.id.clone(),
                            record: Some(Entity::Country(country)),
                        };
                    }
                    None => None,
                }
            }
            EntityKind::Border => self.repository.get_border(&id).await.map(Entity::Border),
            EntityKind::BorderPost => self.resolve_border_post(&id, None).await,
            EntityKind::Zone => self.repository.get_zone(&id).await.map(Entity::Zone),
            EntityKind::Itinerary => self
                .repository
                .get_itinerary(&id)
                .await
                .map(Entity::Itinerary),
        };

        if record.is_none() {
            tracing::warn!(%kind, id = %id, "Could not resolve entity");
        }
        Resolution { id, record }
    }

    async fn resolve_country_feature(&self, feature: &MapFeature, best_guess: String) -> Resolution {
        let props = &feature.properties;

        let mut candidates: Vec<String> = Vec::new();
        candidates.extend(
            COUNTRY_CODE_FIELDS
                .iter()
                .filter_map(|field| str_prop(props, field).map(str::to_string)),
        );
        candidates.extend(feature.id_string());
        candidates.extend(
            COUNTRY_CODE_FIELDS_LOWER
                .iter()
                .filter_map(|field| str_prop(props, field).map(str::to_string)),
        );
        let name = first_str_prop(props, COUNTRY_NAME_FIELDS);
        candidates.extend(name.map(str::to_string));
        candidates.retain(|code| code != MISSING_CODE);

        for code in &candidates {
            if let Some(country) = self.repository.get_country(code).await {
                return Resolution {
                    id: country.id.clone(),
                    record: Some(Entity::Country(country)),
                };
            }
        }

        let fallback = match name.and_then(iso3_for_name) {
            Some(iso3) => Some(iso3.to_string()),
            None => match str_prop(props, "ISO_A2").filter(|code| *code != MISSING_CODE) {
                Some(alpha2) => self.repository.iso3_for_alpha2(alpha2).await,
                None => None,
            },
        };
        if let Some(iso3) = fallback {
            if let Some(country) = self.repository.get_country(&iso3).await {
                tracing::debug!(iso3 = %iso3, name, "Resolved country through fallback table");
                return Resolution {
                    id: country.id.clone(),
                    record: Some(Entity::Country(country)),
                };
            }
        }

        tracing::warn!(id = %best_guess, name, "Country not found, rendering raw identifier");
        Resolution::miss(best_guess)
    }

    /// Merge a previously fetched record, the clicked feature and a
    /// placeholder. Only fetches when nothing complete is at hand.
    async fn resolve_border_post(&self, id: &str, feature: Option<&MapFeature>) -> Option<Entity> {
        let from_feature = feature.map(|f| BorderPostRecord::from_feature(f, id));

        let fetched = match self.repository.cached_border_post(id) {
            Some(cached) => Some(cached),
            None if from_feature.as_ref().is_some_and(BorderPostRecord::is_complete) => None,
            None => self.repository.get_border_post(id).await,
        };

        if fetched.is_none() && from_feature.is_none() {
            return None;
        }
        Some(Entity::BorderPost(BorderPostRecord::merge(
            id,
            fetched,
            from_feature,
        )))
    }
}

/// Best-guess identifier for a feature, without any I/O.
///
/// Borders must carry their id as a property; the tile feature id is not
/// the border id.
pub fn feature_id(kind: EntityKind, feature: &MapFeature) -> Option<String> {
    let props = &feature.properties;
    match kind {
        EntityKind::Country => COUNTRY_CODE_FIELDS
            .iter()
            .chain(COUNTRY_CODE_FIELDS_LOWER)
            .filter_map(|field| str_prop(props, field))
            .find(|code| *code != MISSING_CODE)
            .map(str::to_ascii_uppercase)
            .or_else(|| feature.id_string().filter(|id| id != MISSING_CODE))
            .or_else(|| {
                let name = first_str_prop(props, COUNTRY_NAME_FIELDS)?;
                Some(iso3_for_name(name).map_or_else(|| name.to_string(), str::to_string))
            }),
        EntityKind::Border => id_prop(props, "id").or_else(|| id_prop(props, "border_id")),
        EntityKind::BorderPost | EntityKind::Zone | EntityKind::Itinerary => {
            id_prop(props, "id").or_else(|| feature.id_string())
        }
    }
}
