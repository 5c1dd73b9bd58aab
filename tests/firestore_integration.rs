// SPDX-License-Identifier: MIT
// Copyright 2026 Portray Labs <dev@portray.app>

//! Integration tests against the Firestore emulator.
//!
//! Run with FIRESTORE_EMULATOR_HOST set; each test skips otherwise.

use portray_api::error::AppError;
use portray_api::models::{ConsentRecord, Profile, CONSENT_SCHEMA_VERSION, SIGNUP_CREDIT_GRANT};
use portray_api::services::upload::content_hash;
use portray_api::time_utils::now_rfc3339;

mod common;

#[tokio::test]
async fn test_profile_roundtrip() {
    require_emulator!();
    let db = common::test_db().await;
    let uid = common::unique_uid("roundtrip");

    let profile = Profile::new(&uid, &now_rfc3339());
    db.upsert_profile(&profile).await.unwrap();

    let fetched = db.get_profile(&uid).await.unwrap().expect("profile exists");
    assert_eq!(fetched.uid, uid);
    assert_eq!(fetched.credits, SIGNUP_CREDIT_GRANT);
    assert!(!fetched.age_verified);
    assert!(!fetched.terms_accepted);
    assert!(fetched.analytics_enabled);
}

#[tokio::test]
async fn test_update_requires_existing_profile() {
    require_emulator!();
    let db = common::test_db().await;
    let uid = common::unique_uid("no-such");

    // Verification flags can never be written ahead of profile creation.
    let result = db.set_age_verified(&uid, "01.01.1990").await;
    assert!(matches!(result, Err(AppError::PreconditionFailed(_))));

    let result = db.set_terms_accepted(&uid).await;
    assert!(matches!(result, Err(AppError::PreconditionFailed(_))));

    // And the failed updates must not have created a document.
    assert!(db.get_profile(&uid).await.unwrap().is_none());
}

#[tokio::test]
async fn test_verification_flags_persist_in_order() {
    require_emulator!();
    let db = common::test_db().await;
    let uid = common::unique_uid("verify");

    db.upsert_profile(&Profile::new(&uid, &now_rfc3339()))
        .await
        .unwrap();

    let after_age = db.set_age_verified(&uid, "15.06.1990").await.unwrap();
    assert!(after_age.age_verified);
    assert_eq!(after_age.date_of_birth.as_deref(), Some("15.06.1990"));
    assert!(after_age.age_verified_at.is_some());
    assert!(!after_age.terms_accepted);

    let after_terms = db.set_terms_accepted(&uid).await.unwrap();
    assert!(after_terms.age_verified);
    assert!(after_terms.terms_accepted);
    assert!(after_terms.terms_accepted_at.is_some());
}

#[tokio::test]
async fn test_consent_is_scoped_to_image_hash() {
    require_emulator!();
    let db = common::test_db().await;
    let uid = common::unique_uid("consent");

    let image_a = b"first image bytes";
    let image_b = b"second image bytes";
    let hash_a = content_hash(image_a);
    let hash_b = content_hash(image_b);

    db.add_consent(&ConsentRecord {
        uid: uid.clone(),
        image_hash: hash_a.clone(),
        consent_processing: true,
        consent_responsibility: true,
        schema_version: CONSENT_SCHEMA_VERSION,
        ip: Some("203.0.113.9".to_string()),
        device_id: Some("dev-1".to_string()),
        created_at: now_rfc3339(),
    })
    .await
    .unwrap();

    // Consent for image A never covers image B.
    let found = db.get_consent(&uid, &hash_a).await.unwrap();
    assert!(found.is_some());
    assert_eq!(found.unwrap().image_hash, hash_a);

    assert!(db.get_consent(&uid, &hash_b).await.unwrap().is_none());

    // Nor does it cover another user's upload of the same image.
    let other_uid = common::unique_uid("consent-other");
    assert!(db.get_consent(&other_uid, &hash_a).await.unwrap().is_none());
}

#[tokio::test]
async fn test_deletion_archive_flag_is_sticky() {
    require_emulator!();
    let db = common::test_db().await;
    let uid = common::unique_uid("archive");

    db.upsert_profile(&Profile::new(&uid, &now_rfc3339()))
        .await
        .unwrap();

    let first = db.mark_deletion_archived(&uid).await.unwrap();
    assert!(first.deletion_archived);
    let first_at = first.deletion_archived_at.clone().unwrap();

    // A second pass keeps the flag; a retried deletion must skip archival.
    let second = db.mark_deletion_archived(&uid).await.unwrap();
    assert!(second.deletion_archived);
    assert!(second.deletion_archived_at.is_some());
    assert!(!first_at.is_empty());
}

#[tokio::test]
async fn test_delete_profile_removes_document() {
    require_emulator!();
    let db = common::test_db().await;
    let uid = common::unique_uid("delete");

    db.upsert_profile(&Profile::new(&uid, &now_rfc3339()))
        .await
        .unwrap();
    assert!(db.get_profile(&uid).await.unwrap().is_some());

    db.delete_profile(&uid).await.unwrap();
    assert!(db.get_profile(&uid).await.unwrap().is_none());
}
