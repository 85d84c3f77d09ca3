// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Address bar and page title synchronisation.
//!
//! Selection changes push history entries; browser navigation is parsed back
//! into selection triggers. A transition started by a navigation records its
//! path without pushing, so going back never creates a new forward entry.
//! Other transitions push as usual, even while a navigation is in flight.

pub mod route;

pub use route::{HistoryState, Route, RouteError};

use parking_lot::Mutex;
use std::sync::Arc;

/// Browser history and document capability.
pub trait BrowserHistory: Send + Sync {
    fn push_state(&self, state: Option<&HistoryState>, path: &str);

    fn set_title(&self, title: &str);
}

pub struct UrlSynchronizer {
    history: Arc<dyn BrowserHistory>,
    app_name: String,
    /// Path the browser is showing.
    current_path: Mutex<String>,
}

impl UrlSynchronizer {
    pub fn new(history: Arc<dyn BrowserHistory>, app_name: &str) -> Self {
        Self {
            history,
            app_name: app_name.to_string(),
            current_path: Mutex::new("/".to_string()),
        }
    }

    /// The browser moved to `route` on its own (back/forward or first load).
    pub fn navigated_to(&self, route: &Route) {
        *self.current_path.lock() = route.to_path();
    }

    /// Reflect `route` in the address bar. Returns whether an entry was
    /// pushed: nothing is pushed when the path is already current.
    pub fn push(&self, route: &Route) -> bool {
        let path = route.to_path();
        let mut current = self.current_path.lock();

        if *current == path {
            return false;
        }

        self.history.push_state(route.history_state().as_ref(), &path);
        *current = path;
        true
    }

    pub fn current_path(&self) -> String {
        self.current_path.lock().clone()
    }

    pub fn title_for(&self, name: Option<&str>) -> String {
        match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => format!("{name} | {}", self.app_name),
            None => self.app_name.clone(),
        }
    }

    pub fn set_title(&self, name: Option<&str>) {
        self.history.set_title(&self.title_for(name));
    }
}
