// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Overland Map API server.
//!
//! Serves country, border, border post, zone and itinerary records from
//! Firestore, falling back to the bundled data files.

use overland_map::{
    config::Config,
    data::{DataLoader, FsSource, LoaderSettings},
    db::FirestoreDb,
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    let config = Config::from_env()?;
    tracing::info!(port = config.port, offline = config.offline, "Starting Overland Map API");

    let db = if config.offline {
        tracing::info!("Offline mode, serving bundled data only");
        FirestoreDb::new_mock()
    } else {
        FirestoreDb::new(&config.gcp_project_id).await?
    };

    tracing::info!(path = %config.data_dir.display(), "Using bundled data");
    let bundle = DataLoader::new(
        Arc::new(FsSource::new(config.data_dir.clone())),
        LoaderSettings::from(&config),
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        bundle,
    });

    let app = overland_map::routes::create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("overland_map=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
