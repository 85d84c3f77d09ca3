// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data access layer: cached, retrying, de-duplicating loads of static
//! collections plus lazily fetched single entities.

pub mod cache;
pub mod geojson_check;
pub mod loader;
pub mod repository;
pub mod source;
pub mod storage;

pub use cache::ResourceCache;
pub use loader::{DataLoader, LoadError, LoadOptions, LoaderSettings};
pub use repository::EntityRepository;
pub use source::{FsSource, HttpClient, RemoteApi, SourceError, StaticSource};
pub use storage::{ClientStorage, MemoryStorage, SessionStorage};

use std::fmt;

/// A logical static resource, addressable by a stable path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    Countries,
    Borders,
    BorderPosts,
    Zones,
    Itineraries,
    /// ISO alpha-2 -> alpha-3 lookup table.
    Iso3Lookup,
    /// A GeoJSON feature collection, by file name.
    GeoJson(String),
}

impl ResourceKey {
    /// Key under which the resource is cached and de-duplicated.
    pub fn cache_key(&self) -> String {
        match self {
            ResourceKey::GeoJson(file) => format!("geojson-{file}"),
            other => other.file_stem().to_string(),
        }
    }

    /// Path relative to the data root.
    pub fn path(&self) -> String {
        match self {
            ResourceKey::GeoJson(file) => format!("data/{file}"),
            other => format!("data/{}.json", other.file_stem()),
        }
    }

    /// Large geometry payloads get a longer timeout and structural validation.
    pub fn is_geometry(&self) -> bool {
        matches!(self, ResourceKey::GeoJson(_))
    }

    fn file_stem(&self) -> &str {
        match self {
            ResourceKey::Countries => "countries",
            ResourceKey::Borders => "borders",
            ResourceKey::BorderPosts => "border-posts",
            ResourceKey::Zones => "zones",
            ResourceKey::Itineraries => "itineraries",
            ResourceKey::Iso3Lookup => "iso3",
            ResourceKey::GeoJson(file) => file,
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cache_key())
    }
}
