// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Overland Map: an interactive map of countries, borders, border posts,
//! zones and itineraries for overland travellers.
//!
//! The crate has two halves. The map session (`session`, `selection`,
//! `resolver`, `map`, `url`, `data`) drives selection and highlighting
//! against a host-provided map engine and browser history. The API server
//! (`routes`, `db`, `middleware`) serves the entity data the session reads.

pub mod config;
pub mod data;
pub mod db;
pub mod error;
pub mod map;
pub mod middleware;
pub mod models;
pub mod resolver;
pub mod routes;
pub mod selection;
pub mod session;
pub mod url;

use config::Config;
use data::DataLoader;
use db::FirestoreDb;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    /// Bundled data files, used when Firestore cannot answer.
    pub bundle: DataLoader,
}
