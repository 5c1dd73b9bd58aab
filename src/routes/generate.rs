// SPDX-License-Identifier: MIT
// Copyright 2026 Portray Labs <dev@portray.app>

//! Image consent capture and generation proxy.
//!
//! Consent is scoped to the exact uploaded bytes via SHA-256; `/api/generate`
//! refuses any image it has no matching consent record for.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{ConsentRecord, CONSENT_SCHEMA_VERSION};
use crate::services::upload::{content_hash, validate_image};
use crate::services::{find_style, resolve_route, RouteIntent, VerificationStatus, STYLES};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{
    extract::{Multipart, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use crate::services::Style;
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ConsentResponse {
    pub image_hash: String,
}

pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route("/styles", get(list_styles))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/consent", post(record_consent))
        .route("/api/generate", post(generate_image))
}

/// Style catalog. Prompts are server-side only and never serialized.
async fn list_styles() -> Json<&'static [Style]> {
    Json(STYLES)
}

/// Record per-image consent. Both checkboxes are required.
async fn record_consent(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<ConsentResponse>> {
    let mut image: Option<Vec<u8>> = None;
    let mut consent_processing = false;
    let mut consent_responsibility = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        match field.name() {
            Some("image") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read image: {}", e)))?;
                image = Some(bytes.to_vec());
            }
            Some("consent_processing") => {
                consent_processing = read_bool_field(field).await?;
            }
            Some("consent_responsibility") => {
                consent_responsibility = read_bool_field(field).await?;
            }
            _ => {}
        }
    }

    let image = image.ok_or_else(|| AppError::BadRequest("Missing image".to_string()))?;
    validate_image(&image)?;

    if !(consent_processing && consent_responsibility) {
        return Err(AppError::BadRequest(
            "Both consent confirmations are required".to_string(),
        ));
    }

    let image_hash = content_hash(&image);

    let record = ConsentRecord {
        uid: user.uid().to_string(),
        image_hash: image_hash.clone(),
        consent_processing,
        consent_responsibility,
        schema_version: CONSENT_SCHEMA_VERSION,
        ip: client_ip(&headers),
        device_id: header_value(&headers, "x-device-id"),
        created_at: now_rfc3339(),
    };

    state.db.add_consent(&record).await?;
    tracing::info!(uid = user.uid(), image_hash = %image_hash, "Consent recorded");

    Ok(Json(ConsentResponse { image_hash }))
}

/// Transform an image through the generation backend.
///
/// Gate order: verification complete, valid image, known style, entitlement,
/// then the per-image consent lookup. The entitlement short-circuit keeps
/// out-of-credit requests off the backend entirely.
async fn generate_image(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let profile = state.db.get_profile(user.uid()).await?.ok_or_else(|| {
        AppError::PreconditionFailed(format!("Profile {} does not exist", user.uid()))
    })?;

    let resolution = resolve_route(Some(&user.identity), &VerificationStatus::from(&profile));
    if resolution.route != RouteIntent::Generator {
        return Err(AppError::PreconditionFailed(
            "Verification incomplete".to_string(),
        ));
    }

    let mut image: Option<Vec<u8>> = None;
    let mut style_id: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        match field.name() {
            Some("image") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read image: {}", e)))?;
                image = Some(bytes.to_vec());
            }
            Some("style_id") => {
                style_id = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Invalid style_id: {}", e)))?,
                );
            }
            _ => {}
        }
    }

    let image = image.ok_or_else(|| AppError::BadRequest("Missing image".to_string()))?;
    let style_id = style_id.ok_or_else(|| AppError::BadRequest("Missing style_id".to_string()))?;

    let format = validate_image(&image)?;
    let style = find_style(&style_id)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown style: {}", style_id)))?;

    if style.premium && !profile.is_premium {
        return Err(AppError::PaymentRequired(
            "This style requires an active subscription".to_string(),
        ));
    }
    if !profile.is_premium && profile.credits == 0 {
        return Err(AppError::PaymentRequired(
            "No credits remaining".to_string(),
        ));
    }

    let image_hash = content_hash(&image);
    if state.db.get_consent(user.uid(), &image_hash).await?.is_none() {
        return Err(AppError::ConsentRequired(
            "No consent record for this image".to_string(),
        ));
    }

    let output = state
        .backend
        .generate(user.uid(), style.prompt, image, format.mime())
        .await?;

    tracing::info!(
        uid = user.uid(),
        style = style.id,
        content_type = %output.content_type,
        bytes = output.bytes.len(),
        "Generation completed"
    );

    Ok(([(header::CONTENT_TYPE, output.content_type)], output.bytes))
}

/// Parse a "true"/"false" text field.
async fn read_bool_field(field: axum::extract::multipart::Field<'_>) -> Result<bool> {
    let text = field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid form field: {}", e)))?;
    Ok(text == "true")
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

/// Best-effort caller IP: first hop of X-Forwarded-For.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    header_value(headers, "x-forwarded-for")
        .map(|v| v.split(',').next().unwrap_or("").trim().to_string())
        .filter(|v| !v.is_empty())
}
