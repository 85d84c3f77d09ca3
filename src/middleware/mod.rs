// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (security headers, caching policy).

pub mod security;

pub use security::{add_security_headers, cache_control};
