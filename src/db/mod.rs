// SPDX-License-Identifier: MIT
// Copyright 2026 Portray Labs <dev@portray.app>

//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const PROFILES: &str = "profiles";
    /// Append-only per-image generation consent records
    pub const CONSENT_RECORDS: &str = "consent_records";
    /// Append-only deletion-wizard feedback
    pub const DELETION_FEEDBACK: &str = "deletion_feedback";
}
