// SPDX-License-Identifier: MIT
// Copyright 2026 Portray Labs <dev@portray.app>

//! Session establishment and teardown.
//!
//! `POST /auth/session` exchanges an Identity Toolkit ID token for a
//! first-party session JWT (cookie plus response body). First-time sign-ins
//! get a profile document with the signup credit grant.

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_session_jwt, SESSION_COOKIE};
use crate::models::{Profile, SignInMethod};
use crate::services::{resolve_route, IdentityClient, Resolution, VerificationStatus};
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Deserialize)]
pub struct SessionRequest {
    pub id_token: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionResponse {
    pub token: String,
    pub uid: String,
    #[serde(flatten)]
    pub resolution: Resolution,
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/session", post(create_session))
        .route("/auth/logout", get(logout))
}

/// Exchange an ID token for a session.
async fn create_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(payload): Json<SessionRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    if payload.id_token.is_empty() {
        return Err(AppError::BadRequest("Missing id_token".to_string()));
    }

    // Sign-in failures surface the fixed user-facing message for the
    // provider code; the raw code only goes to the log.
    let identity = state
        .identity
        .lookup(&payload.id_token)
        .await
        .map_err(|e| match e {
            AppError::IdentityApi(code) => {
                tracing::warn!(code = %code, "Identity lookup failed");
                AppError::BadRequest(IdentityClient::user_message(&code).to_string())
            }
            other => other,
        })?;

    let profile = match state.db.get_profile(&identity.uid).await? {
        Some(mut profile) => {
            profile.last_active = crate::time_utils::now_rfc3339();
            if let Err(e) = state.db.upsert_profile(&profile).await {
                tracing::warn!(uid = %identity.uid, error = %e, "Failed to bump last_active");
            }
            profile
        }
        None => {
            let profile = Profile::new(&identity.uid, &crate::time_utils::now_rfc3339());
            state.db.upsert_profile(&profile).await?;
            tracing::info!(uid = %identity.uid, "Created profile on first sign-in");

            // Unverified password accounts need the verification mail to
            // get past the login gate.
            if identity.sign_in_method == SignInMethod::Password && !identity.email_verified {
                if let Err(e) = state.identity.send_verification_email(&payload.id_token).await {
                    tracing::warn!(uid = %identity.uid, error = %e, "Verification email send failed");
                }
            }

            profile
        }
    };

    let token = create_session_jwt(&identity, &state.config.jwt_signing_key)?;
    let resolution = resolve_route(Some(&identity), &VerificationStatus::from(&profile));

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build();

    Ok((
        jar.add(cookie),
        Json(SessionResponse {
            token,
            uid: identity.uid,
            resolution,
        }),
    ))
}

/// Clear the session cookie.
async fn logout(jar: CookieJar) -> (CookieJar, Json<LogoutResponse>) {
    let cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .build();
    (jar.remove(cookie), Json(LogoutResponse { success: true }))
}
