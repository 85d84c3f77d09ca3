// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Entity kinds that can be selected on the map.

use serde::{Deserialize, Serialize};
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// The closed set of selectable entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum EntityKind {
    Country,
    Border,
    BorderPost,
    Zone,
    Itinerary,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Country,
        EntityKind::Border,
        EntityKind::BorderPost,
        EntityKind::Zone,
        EntityKind::Itinerary,
    ];

    /// Path segment used in routes (`/border_post/<id>`).
    pub fn route_segment(self) -> &'static str {
        match self {
            EntityKind::Country => "country",
            EntityKind::Border => "border",
            EntityKind::BorderPost => "border_post",
            EntityKind::Zone => "zone",
            EntityKind::Itinerary => "itinerary",
        }
    }

    pub fn from_route_segment(segment: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.route_segment() == segment)
    }

    /// Click precedence when several kinds sit under the cursor (higher wins).
    pub fn click_precedence(self) -> u8 {
        match self {
            EntityKind::BorderPost => 4,
            EntityKind::Border => 3,
            EntityKind::Itinerary => 2,
            EntityKind::Zone => 1,
            EntityKind::Country => 0,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.route_segment())
    }
}
