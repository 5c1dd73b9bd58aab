// SPDX-License-Identifier: MIT
// Copyright 2026 Portray Labs <dev@portray.app>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Profiles (verification, billing, and preference state)
//! - Consent records (append-only, per-image)
//! - Deletion feedback (append-only)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{ConsentRecord, DeletionFeedback, Profile};
use crate::time_utils::now_rfc3339;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated
        // connection to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Profile Operations ──────────────────────────────────────

    /// Get a profile by identity uid.
    pub async fn get_profile(&self, uid: &str) -> Result<Option<Profile>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::PROFILES)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or overwrite a profile document.
    pub async fn upsert_profile(&self, profile: &Profile) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::PROFILES)
            .document_id(&profile.uid)
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Fetch-modify-write a profile that must already exist.
    ///
    /// The existence check is the anti-exploit precondition behind the
    /// onboarding gates: a client cannot set verification flags while
    /// skipping profile creation (and its credit grant). A missing document
    /// fails the whole operation without creating a partial one.
    pub async fn update_profile<F>(&self, uid: &str, mutate: F) -> Result<Profile, AppError>
    where
        F: FnOnce(&mut Profile),
    {
        let mut profile = self.get_profile(uid).await?.ok_or_else(|| {
            AppError::PreconditionFailed(format!("Profile {} does not exist", uid))
        })?;

        mutate(&mut profile);
        self.upsert_profile(&profile).await?;
        Ok(profile)
    }

    /// Persist a successful age verification (flag + raw birth date).
    pub async fn set_age_verified(&self, uid: &str, birthdate: &str) -> Result<Profile, AppError> {
        let now = now_rfc3339();
        self.update_profile(uid, |p| {
            p.age_verified = true;
            p.date_of_birth = Some(birthdate.to_string());
            p.age_verified_at = Some(now);
        })
        .await
    }

    /// Persist terms acceptance with timestamp.
    pub async fn set_terms_accepted(&self, uid: &str) -> Result<Profile, AppError> {
        let now = now_rfc3339();
        self.update_profile(uid, |p| {
            p.terms_accepted = true;
            p.terms_accepted_at = Some(now);
        })
        .await
    }

    /// Mark credit/trial state as archived ahead of deletion.
    ///
    /// The flag keeps a retried deletion from re-archiving.
    pub async fn mark_deletion_archived(&self, uid: &str) -> Result<Profile, AppError> {
        let now = now_rfc3339();
        self.update_profile(uid, |p| {
            p.deletion_archived = true;
            p.deletion_archived_at = Some(now);
        })
        .await
    }

    /// Delete a profile document.
    pub async fn delete_profile(&self, uid: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::PROFILES)
            .document_id(uid)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(uid, "Profile document deleted");
        Ok(())
    }

    // ─── Consent Operations (append-only) ────────────────────────

    /// Append one consent record, keyed by (uid, image hash).
    ///
    /// Records are never updated or deleted; re-consenting to the same image
    /// rewrites an identical document id, which is harmless.
    pub async fn add_consent(&self, record: &ConsentRecord) -> Result<(), AppError> {
        let doc_id = format!("{}_{}", record.uid, record.image_hash);

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::CONSENT_RECORDS)
            .document_id(&doc_id)
            .object(record)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Look up the consent record for a specific image hash.
    pub async fn get_consent(
        &self,
        uid: &str,
        image_hash: &str,
    ) -> Result<Option<ConsentRecord>, AppError> {
        let doc_id = format!("{}_{}", uid, image_hash);

        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::CONSENT_RECORDS)
            .obj()
            .one(&doc_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Deletion Feedback (append-only) ─────────────────────────

    /// Append one deletion feedback record.
    pub async fn add_deletion_feedback(&self, record: &DeletionFeedback) -> Result<(), AppError> {
        let doc_id = format!(
            "{}_{}",
            record.uid,
            chrono::Utc::now().timestamp_millis()
        );

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::DELETION_FEEDBACK)
            .document_id(&doc_id)
            .object(record)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
