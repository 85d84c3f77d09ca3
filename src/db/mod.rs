// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const COUNTRIES: &str = "countries";
    pub const BORDERS: &str = "borders";
    pub const BORDER_POSTS: &str = "border_posts";
    pub const ZONES: &str = "zones";
    pub const ITINERARIES: &str = "itineraries";
}
