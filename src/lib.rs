// SPDX-License-Identifier: MIT
// Copyright 2026 Portray Labs <dev@portray.app>

//! Portray API Server
//!
//! This crate provides the backend API for the Portray image-transformation
//! app: onboarding/verification gating, per-image consent records, the
//! generation proxy, billing session creation, and account deletion.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{BackendClient, IdentityClient, StorageClient};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub identity: IdentityClient,
    pub backend: BackendClient,
    pub storage: StorageClient,
}
