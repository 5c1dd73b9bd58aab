// SPDX-License-Identifier: MIT
// Copyright 2026 Portray Labs <dev@portray.app>

//! Verification gates: route resolution, age check, terms acceptance,
//! plus the write-once popup flags and privacy toggles.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::services::birthdate::{format_birthdate_input, validate_birthdate};
use crate::services::{resolve_route, Resolution, RouteIntent, VerificationStatus};
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Ceiling on the profile fetch behind route resolution. A slow database
/// must degrade to a login redirect, never an indefinitely loading client.
const RESOLVE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RouteResponse {
    #[serde(flatten)]
    pub resolution: Resolution,
    /// True when the resolution is a timeout fallback rather than a real read.
    pub degraded: bool,
}

#[derive(Deserialize)]
pub struct AgeRequest {
    pub birthdate: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct GateResponse {
    pub route: RouteIntent,
}

#[derive(Deserialize)]
pub struct TermsRequest {
    pub accept_documents: bool,
    pub acknowledge_synthetic_media: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PopupKind {
    GeneratorTips,
    FirstTime,
}

#[derive(Deserialize)]
pub struct PopupRequest {
    pub popup: PopupKind,
}

#[derive(Deserialize)]
pub struct PrivacyRequest {
    pub analytics_enabled: Option<bool>,
    pub crash_reporting_enabled: Option<bool>,
}

#[derive(Serialize)]
pub struct AckResponse {
    pub success: bool,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/route", get(current_route))
        .route("/api/onboarding/age", post(submit_age))
        .route("/api/onboarding/terms", post(accept_terms))
        .route("/api/onboarding/popup", post(dismiss_popup))
        .route("/api/privacy", patch(update_privacy))
}

/// Resolve the next route from a fresh profile read.
async fn current_route(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<RouteResponse>> {
    let fetch = state.db.get_profile(user.uid());

    match tokio::time::timeout(RESOLVE_TIMEOUT, fetch).await {
        Ok(profile) => {
            let status = profile?
                .as_ref()
                .map(VerificationStatus::from)
                .unwrap_or_default();
            Ok(Json(RouteResponse {
                resolution: resolve_route(Some(&user.identity), &status),
                degraded: false,
            }))
        }
        Err(_) => {
            tracing::warn!(uid = user.uid(), "Route resolution timed out, falling back to login");
            Ok(Json(RouteResponse {
                resolution: resolve_route(None, &VerificationStatus::default()),
                degraded: true,
            }))
        }
    }
}

/// Validate and persist an age verification.
async fn submit_age(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<AgeRequest>,
) -> Result<Json<GateResponse>> {
    let profile = state.db.get_profile(user.uid()).await?.ok_or_else(|| {
        AppError::PreconditionFailed(format!("Profile {} does not exist", user.uid()))
    })?;

    // Age is collected once. An already-verified user goes straight to the
    // next gate, whatever the resubmitted payload looks like.
    if profile.age_verified {
        return Ok(Json(GateResponse {
            route: RouteIntent::TermsService,
        }));
    }

    // Accept both pre-formatted ("31.12.1990") and raw-digit ("31121990")
    // entries; the latter gets the same auto-formatting the input field does.
    let text = if payload.birthdate.contains('.') {
        payload.birthdate.clone()
    } else {
        format_birthdate_input(&payload.birthdate)
    };

    let check = validate_birthdate(&text, Utc::now().date_naive())
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if !check.is_over_18 {
        // Nothing is persisted for an under-age date.
        return Ok(Json(GateResponse {
            route: RouteIntent::AgeBlocked,
        }));
    }

    state.db.set_age_verified(user.uid(), &text).await?;
    tracing::info!(uid = user.uid(), "Age verification recorded");

    Ok(Json(GateResponse {
        route: RouteIntent::TermsService,
    }))
}

/// Persist terms acceptance. Requires a completed age check.
async fn accept_terms(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<TermsRequest>,
) -> Result<Json<GateResponse>> {
    let profile = state.db.get_profile(user.uid()).await?.ok_or_else(|| {
        AppError::PreconditionFailed(format!("Profile {} does not exist", user.uid()))
    })?;

    // Out-of-order submission: send the client back to the age gate.
    if !profile.age_verified {
        return Ok(Json(GateResponse {
            route: RouteIntent::Age,
        }));
    }

    if profile.terms_accepted {
        return Ok(Json(GateResponse {
            route: RouteIntent::Generator,
        }));
    }

    if !(payload.accept_documents && payload.acknowledge_synthetic_media) {
        return Err(AppError::BadRequest(
            "Please accept to continue".to_string(),
        ));
    }

    state.db.set_terms_accepted(user.uid()).await?;
    tracing::info!(uid = user.uid(), "Terms acceptance recorded");

    Ok(Json(GateResponse {
        route: RouteIntent::Generator,
    }))
}

/// Record a one-time popup dismissal. The flags only ever go to true.
async fn dismiss_popup(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<PopupRequest>,
) -> Result<Json<AckResponse>> {
    state
        .db
        .update_profile(user.uid(), |p| match payload.popup {
            PopupKind::GeneratorTips => p.has_seen_generator_tips = true,
            PopupKind::FirstTime => p.has_seen_first_time_popup = true,
        })
        .await?;

    Ok(Json(AckResponse { success: true }))
}

/// Update analytics/crash-reporting opt-outs. Absent fields are untouched.
async fn update_privacy(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<PrivacyRequest>,
) -> Result<Json<AckResponse>> {
    state
        .db
        .update_profile(user.uid(), |p| {
            if let Some(analytics) = payload.analytics_enabled {
                p.analytics_enabled = analytics;
            }
            if let Some(crash) = payload.crash_reporting_enabled {
                p.crash_reporting_enabled = crash;
            }
        })
        .await?;

    Ok(Json(AckResponse { success: true }))
}
