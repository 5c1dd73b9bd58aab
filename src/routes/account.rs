// SPDX-License-Identifier: MIT
// Copyright 2026 Portray Labs <dev@portray.app>

//! Account surface: profile read, the deletion wizard, and the deletion
//! orchestrator endpoint.

use crate::error::{AppError, Result};
use crate::middleware::auth::{AuthUser, SESSION_COOKIE};
use crate::models::{DeletionFeedback, PremiumStatus, Profile};
use crate::services::deletion::{find_reason, DeletionReason, DELETION_REASONS};
use crate::services::upload::validate_image;
use crate::services::{DeletionOutcome, DeletionRunner};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{
    extract::{Multipart, Query, State},
    routing::{delete, get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use futures_util::stream::{FuturesOrdered, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Upper bound on feedback photos per submission.
const MAX_FEEDBACK_PHOTOS: usize = 3;

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MeResponse {
    pub uid: String,
    pub credits: u32,
    pub is_premium: bool,
    pub premium_status: Option<PremiumStatus>,
    pub age_verified: bool,
    pub terms_accepted: bool,
    pub has_seen_generator_tips: bool,
    pub has_seen_first_time_popup: bool,
    pub analytics_enabled: bool,
    pub crash_reporting_enabled: bool,
}

impl From<Profile> for MeResponse {
    fn from(p: Profile) -> Self {
        Self {
            uid: p.uid,
            credits: p.credits,
            is_premium: p.is_premium,
            premium_status: p.premium_status,
            age_verified: p.age_verified,
            terms_accepted: p.terms_accepted,
            has_seen_generator_tips: p.has_seen_generator_tips,
            has_seen_first_time_popup: p.has_seen_first_time_popup,
            analytics_enabled: p.analytics_enabled,
            crash_reporting_enabled: p.crash_reporting_enabled,
        }
    }
}

#[derive(Deserialize)]
pub struct DeletionPlanQuery {
    pub reason: Option<String>,
}

#[derive(Validate)]
struct FeedbackForm {
    #[validate(length(max = 2000, message = "Feedback must be at most 2000 characters"))]
    feedback: String,
}

#[derive(Serialize)]
pub struct FeedbackResponse {
    pub success: bool,
    pub photo_count: usize,
}

#[derive(Deserialize)]
pub struct DeleteAccountRequest {
    pub id_token: String,
}

#[derive(Serialize)]
pub struct DeleteAccountResponse {
    pub success: bool,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/account/deletion-plan", get(deletion_plan_screen))
        .route("/api/account/feedback", post(submit_feedback))
        .route("/api/account", delete(delete_account))
}

/// Current profile snapshot.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MeResponse>> {
    let profile = state
        .db
        .get_profile(user.uid())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} does not exist", user.uid())))?;

    Ok(Json(MeResponse::from(profile)))
}

/// The deletion wizard's reason table, or a single reason descriptor.
async fn deletion_plan_screen(
    Query(query): Query<DeletionPlanQuery>,
) -> Result<Json<Vec<&'static DeletionReason>>> {
    match query.reason {
        None => Ok(Json(DELETION_REASONS.iter().collect())),
        Some(id) => {
            let reason = find_reason(&id)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown reason: {}", id)))?;
            Ok(Json(vec![reason]))
        }
    }
}

/// Store deletion feedback with up to three photos.
///
/// Photo uploads are best-effort: a failed upload is dropped with a warning,
/// the feedback text is stored regardless.
async fn submit_feedback(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<Json<FeedbackResponse>> {
    let mut reason_id: Option<String> = None;
    let mut feedback = String::new();
    let mut photos: Vec<Vec<u8>> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        match field.name() {
            Some("reason_id") => {
                reason_id = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Invalid reason_id: {}", e)))?,
                );
            }
            Some("feedback") => {
                feedback = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid feedback: {}", e)))?;
            }
            Some("photo") if photos.len() < MAX_FEEDBACK_PHOTOS => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read photo: {}", e)))?;
                photos.push(bytes.to_vec());
            }
            _ => {}
        }
    }

    let reason_id = reason_id.ok_or_else(|| AppError::BadRequest("Missing reason_id".to_string()))?;
    let reason = find_reason(&reason_id)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown reason: {}", reason_id)))?;

    let form = FeedbackForm {
        feedback: feedback.clone(),
    };
    form.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let mut uploads = FuturesOrdered::new();
    for (index, data) in photos.into_iter().enumerate() {
        let format = match validate_image(&data) {
            Ok(format) => format,
            Err(e) => {
                tracing::warn!(uid = user.uid(), index, error = %e, "Skipping invalid feedback photo");
                continue;
            }
        };
        let storage = state.storage.clone();
        let uid = user.uid().to_string();
        uploads.push_back(async move {
            storage
                .upload_feedback_photo(&uid, index, data, format)
                .await
        });
    }

    let mut photo_urls = Vec::new();
    while let Some(result) = uploads.next().await {
        match result {
            Ok(url) => photo_urls.push(url),
            Err(e) => {
                tracing::warn!(uid = user.uid(), error = %e, "Feedback photo upload failed");
            }
        }
    }

    let photo_count = photo_urls.len();
    let record = DeletionFeedback {
        uid: user.uid().to_string(),
        reason_id: reason.id.to_string(),
        reason_text: reason.label.to_string(),
        feedback,
        photo_urls,
        created_at: now_rfc3339(),
    };

    state.db.add_deletion_feedback(&record).await?;
    tracing::info!(uid = user.uid(), reason = reason.id, "Deletion feedback stored");

    Ok(Json(FeedbackResponse {
        success: true,
        photo_count,
    }))
}

/// Run the account deletion sequence.
///
/// Needs the caller's fresh Identity Provider token; the session JWT alone
/// cannot delete the upstream identity. A stale token yields the distinct
/// requires-recent-login error so the client can re-authenticate and retry.
async fn delete_account(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    jar: CookieJar,
    Json(payload): Json<DeleteAccountRequest>,
) -> Result<(CookieJar, Json<DeleteAccountResponse>)> {
    if payload.id_token.is_empty() {
        return Err(AppError::BadRequest("Missing id_token".to_string()));
    }

    // The token must resolve to the session's own account before anything
    // is deleted with it.
    let token_owner = state.identity.lookup(&payload.id_token).await?;
    if token_owner.uid != user.uid() {
        tracing::warn!(
            uid = user.uid(),
            token_uid = %token_owner.uid,
            "Deletion token belongs to a different account"
        );
        return Err(AppError::Unauthorized);
    }

    let runner = DeletionRunner {
        db: &state.db,
        backend: &state.backend,
        identity: &state.identity,
    };

    match runner.run(user.uid(), &payload.id_token).await? {
        DeletionOutcome::Deleted => {
            let cookie = Cookie::build((SESSION_COOKIE, "")).path("/").build();
            Ok((
                jar.remove(cookie),
                Json(DeleteAccountResponse { success: true }),
            ))
        }
        DeletionOutcome::RequiresRecentLogin => Err(AppError::RequiresRecentLogin),
    }
}
