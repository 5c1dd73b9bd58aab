// SPDX-License-Identifier: MIT
// Copyright 2026 Portray Labs <dev@portray.app>

//! Application configuration loaded from environment variables.
//!
//! Secrets are injected as environment variables by the deployment
//! platform (Cloud Run secret bindings) and cached in memory at startup.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL for CORS allow-listing
    pub frontend_url: String,
    /// GCP project ID (Firestore + Identity Toolkit)
    pub gcp_project_id: String,
    /// Base URL of the generation backend
    pub backend_url: String,
    /// S3-compatible storage endpoint for feedback photos
    pub storage_endpoint: String,
    /// Bucket for feedback photos
    pub storage_bucket: String,
    /// Public URL prefix for uploaded feedback photos
    pub storage_public_url: String,
    /// Server port
    pub port: u16,

    // --- Secrets (injected as env vars) ---
    /// Identity Toolkit API key
    pub identity_api_key: String,
    /// Bearer token presented to the generation backend
    pub backend_api_key: String,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Storage access key id
    pub storage_access_key: String,
    /// Storage secret access key
    pub storage_secret_key: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            backend_url: env::var("BACKEND_URL").map_err(|_| ConfigError::Missing("BACKEND_URL"))?,
            storage_endpoint: env::var("STORAGE_ENDPOINT")
                .unwrap_or_else(|_| "https://s3.amazonaws.com".to_string()),
            storage_bucket: env::var("STORAGE_BUCKET")
                .unwrap_or_else(|_| "portray-feedback".to_string()),
            storage_public_url: env::var("STORAGE_PUBLIC_URL")
                .unwrap_or_else(|_| "https://cdn.portray.app".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),

            identity_api_key: env::var("IDENTITY_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("IDENTITY_API_KEY"))?,
            backend_api_key: env::var("BACKEND_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("BACKEND_API_KEY"))?,
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            storage_access_key: env::var("STORAGE_ACCESS_KEY").unwrap_or_default(),
            storage_secret_key: env::var("STORAGE_SECRET_KEY").unwrap_or_default(),
        })
    }

    /// Default config for offline tests.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:3000".to_string(),
            gcp_project_id: "test-project".to_string(),
            backend_url: "http://localhost:9999".to_string(),
            storage_endpoint: "http://localhost:9000".to_string(),
            storage_bucket: "test-feedback".to_string(),
            storage_public_url: "http://localhost:9000/test-feedback".to_string(),
            port: 8080,
            identity_api_key: "test_identity_key".to_string(),
            backend_api_key: "test_backend_key".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            storage_access_key: "test_access".to_string(),
            storage_secret_key: "test_secret".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
