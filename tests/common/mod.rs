// SPDX-License-Identifier: MIT
// Copyright 2026 Portray Labs <dev@portray.app>

use portray_api::config::Config;
use portray_api::db::FirestoreDb;
use portray_api::routes::create_router;
use portray_api::services::{BackendClient, IdentityClient, StorageClient};
use portray_api::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Generate a unique uid for test isolation.
#[allow(dead_code)]
pub fn unique_uid(prefix: &str) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}-{}", prefix, nanos)
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();

    let state = Arc::new(AppState {
        db: test_db_offline(),
        identity: IdentityClient::new_mock(),
        backend: BackendClient::new_mock(),
        storage: StorageClient::new_mock(),
        config,
    });

    (create_router(state.clone()), state)
}

/// Create a test app backed by the Firestore emulator.
/// Callers must guard with `require_emulator!`.
#[allow(dead_code)]
pub async fn create_emulator_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();

    let state = Arc::new(AppState {
        db: test_db().await,
        identity: IdentityClient::new_mock(),
        backend: BackendClient::new_mock(),
        storage: StorageClient::new_mock(),
        config,
    });

    (create_router(state.clone()), state)
}
