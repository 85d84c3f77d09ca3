// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Capabilities the data layer fetches from: the static data store and the
//! remote entity API, with HTTP and filesystem implementations.

use crate::data::ResourceKey;
use crate::models::EntityKind;
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;

const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors from a single fetch attempt.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u128 },
}

/// Addressable JSON resources (countries, borders, GeoJSON, ...).
#[async_trait]
pub trait StaticSource: Send + Sync {
    async fn fetch(&self, key: &ResourceKey) -> Result<Value, SourceError>;
}

/// Live entity lookups, the authoritative alternative to static files.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Raw country records from `GET /api/countries`.
    async fn countries(&self) -> Result<Vec<Value>, SourceError>;

    /// Raw border post records from `POST /api/border-posts`.
    async fn border_posts(&self, ids: &[String]) -> Result<Vec<Value>, SourceError>;

    /// A single record, `Ok(None)` when the API does not know the id.
    async fn entity(&self, kind: EntityKind, id: &str) -> Result<Option<Value>, SourceError>;
}

/// HTTP client for the static data store and entity API.
#[derive(Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    /// `timeout` bounds each whole request, body included.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Check response status and parse the JSON body.
    async fn check_response_json(&self, response: reqwest::Response) -> Result<Value, SourceError> {
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(response.url().path().to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))
    }

    async fn get_json(&self, path: &str) -> Result<Value, SourceError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;
        self.check_response_json(response).await
    }
}

/// Pull the array stored under `field`.
fn array_field(mut body: Value, field: &str) -> Result<Vec<Value>, SourceError> {
    match body.get_mut(field).map(Value::take) {
        Some(Value::Array(items)) => Ok(items),
        _ => Err(SourceError::Decode(format!("missing '{field}' array"))),
    }
}

#[async_trait]
impl StaticSource for HttpClient {
    async fn fetch(&self, key: &ResourceKey) -> Result<Value, SourceError> {
        self.get_json(&key.path()).await
    }
}

#[async_trait]
impl RemoteApi for HttpClient {
    async fn countries(&self) -> Result<Vec<Value>, SourceError> {
        let body = self.get_json("api/countries").await?;
        array_field(body, "countries")
    }

    async fn border_posts(&self, ids: &[String]) -> Result<Vec<Value>, SourceError> {
        let url = format!("{}/api/border-posts", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "ids": ids }))
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let body = self.check_response_json(response).await?;
        array_field(body, "borderPosts")
    }

    async fn entity(&self, kind: EntityKind, id: &str) -> Result<Option<Value>, SourceError> {
        let path = format!(
            "api/{}/{}",
            kind.route_segment(),
            urlencoding::encode(id)
        );
        match self.get_json(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(SourceError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Static data store backed by a local directory (server side and tools).
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    /// `root` is the directory that contains `data/`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl StaticSource for FsSource {
    async fn fetch(&self, key: &ResourceKey) -> Result<Value, SourceError> {
        let path = self.root.join(key.path());
        let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SourceError::NotFound(path.display().to_string()),
            _ => SourceError::Transport(e.to_string()),
        })?;
        serde_json::from_slice(&bytes).map_err(|e| SourceError::Decode(e.to_string()))
    }
}
