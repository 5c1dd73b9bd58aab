// SPDX-License-Identifier: MIT
// Copyright 2026 Portray Labs <dev@portray.app>

//! Portray API Server
//!
//! Backend for the Portray image-transformation app: onboarding and
//! verification gating, per-image consent, the generation proxy, billing,
//! and account deletion.

use portray_api::{
    config::Config,
    db::FirestoreDb,
    services::{BackendClient, IdentityClient, StorageClient},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Portray API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Identity Toolkit client
    let identity = IdentityClient::new(config.identity_api_key.clone());
    tracing::info!("Identity client initialized");

    // Generation/billing backend client
    let backend = BackendClient::new(config.backend_url.clone(), config.backend_api_key.clone());
    tracing::info!(url = %config.backend_url, "Backend client initialized");

    // Object storage for feedback photos
    let storage = StorageClient::new(
        &config.storage_endpoint,
        config.storage_bucket.clone(),
        &config.storage_access_key,
        &config.storage_secret_key,
        config.storage_public_url.clone(),
    );
    tracing::info!(bucket = %config.storage_bucket, "Storage client initialized");

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        identity,
        backend,
        storage,
    });

    // Build router
    let app = portray_api::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("portray_api=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
