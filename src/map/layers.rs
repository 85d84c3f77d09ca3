// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Layer ids used by the map style.

use crate::models::EntityKind;

pub const COUNTRIES_FILL: &str = "countries-fill";
pub const BORDERS_LINE: &str = "borders-line";
pub const BORDER_POSTS: &str = "border-posts";
pub const ZONES_FILL: &str = "zones-fill";
pub const ITINERARIES_LINE: &str = "itineraries-line";

const HIGHLIGHT_PREFIX: &str = "highlight-";

/// Interactive base layer for each kind.
pub fn base_layer(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Country => COUNTRIES_FILL,
        EntityKind::Border => BORDERS_LINE,
        EntityKind::BorderPost => BORDER_POSTS,
        EntityKind::Zone => ZONES_FILL,
        EntityKind::Itinerary => ITINERARIES_LINE,
    }
}

/// Dedicated highlight layer for each kind.
pub fn highlight_layer(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Country => "highlight-country",
        EntityKind::Border => "highlight-border",
        EntityKind::BorderPost => "highlight-border-post",
        EntityKind::Zone => "highlight-zone",
        EntityKind::Itinerary => "highlight-itinerary",
    }
}

/// Kind of a rendered feature, from the layer it was drawn in.
///
/// Styles split base layers into variants (`countries-fill-disputed`,
/// `border-posts-closed`), so ids match by prefix. Highlight layers are
/// never interactive.
pub fn kind_for_layer(layer: &str) -> Option<EntityKind> {
    if layer.starts_with(HIGHLIGHT_PREFIX) {
        return None;
    }
    EntityKind::ALL
        .into_iter()
        .find(|kind| layer.starts_with(base_layer(*kind)))
}
