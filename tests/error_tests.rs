// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use overland_map::data::{LoadError, SourceError};
use overland_map::error::AppError;

#[test]
fn test_status_codes() {
    let cases = [
        (AppError::NotFound("zone x".into()), StatusCode::NOT_FOUND),
        (AppError::BadRequest("bad id".into()), StatusCode::BAD_REQUEST),
        (
            AppError::Database("unreachable".into()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
        (
            AppError::Internal(anyhow::anyhow!("boom")),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];
    for (err, status) in cases {
        assert_eq!(err.into_response().status(), status);
    }
}

#[test]
fn test_load_errors_are_service_unavailable() {
    let err: AppError = LoadError::Source {
        key: "countries".into(),
        error: SourceError::NotFound("data/countries.json".into()),
    }
    .into();
    assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[test]
fn test_exhausted_error_message_names_last_failure() {
    let err = LoadError::Exhausted {
        key: "borders".into(),
        attempts: 3,
        last: Box::new(LoadError::Timeout {
            key: "borders".into(),
            timeout_ms: 10_000,
        }),
    };
    let message = err.to_string();
    assert!(message.contains("after 3 attempts"));
    assert!(message.contains("Timed out after 10000 ms"));
}
