// SPDX-License-Identifier: MIT
// Copyright 2026 Portray Labs <dev@portray.app>

//! Append-only records: per-image generation consent and deletion feedback.

use serde::{Deserialize, Serialize};

/// Current consent record schema version.
pub const CONSENT_SCHEMA_VERSION: u32 = 2;

/// Proof of user consent for generating from one specific image.
///
/// Scoped to the image's content hash, not to the user: uploading a
/// different image requires a new record. Never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsentRecord {
    /// Identity uid
    pub uid: String,
    /// SHA-256 hex of the exact uploaded image bytes
    pub image_hash: String,
    /// User consented to processing of the uploaded photo
    pub consent_processing: bool,
    /// User acknowledged responsibility for depicted individuals
    pub consent_responsibility: bool,
    /// Schema version at write time
    pub schema_version: u32,
    /// Best-effort caller IP
    pub ip: Option<String>,
    /// Persisted per-browser device identifier
    pub device_id: Option<String>,
    /// Server timestamp
    pub created_at: String,
}

/// Feedback collected during the account-deletion wizard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletionFeedback {
    /// Identity uid
    pub uid: String,
    /// Selected reason id from the deletion wizard table
    pub reason_id: String,
    /// Display text of the selected reason
    pub reason_text: String,
    /// Free-text feedback
    pub feedback: String,
    /// Public URLs of uploaded feedback photos (best-effort)
    pub photo_urls: Vec<String>,
    /// Server timestamp
    pub created_at: String,
}
