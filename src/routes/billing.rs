// SPDX-License-Identifier: MIT
// Copyright 2026 Portray Labs <dev@portray.app>

//! Billing surface: product catalog proxy, checkout creation, and
//! best-effort device registration for purchase attribution.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::services::backend::Product;
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Deserialize)]
pub struct CheckoutRequest {
    pub price_id: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CheckoutResponse {
    pub transaction_id: String,
}

#[derive(Deserialize)]
pub struct DeviceRequest {
    pub device_id: String,
}

#[derive(Serialize)]
pub struct DeviceResponse {
    pub registered: bool,
}

pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route("/products", get(list_products))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/checkout", post(create_checkout))
        .route("/api/device", post(register_device))
}

/// Pass-through of the billing backend's product catalog.
async fn list_products(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.backend.products().await?))
}

/// Open a checkout for one product.
async fn create_checkout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    if payload.price_id.is_empty() {
        return Err(AppError::BadRequest("Missing price_id".to_string()));
    }

    let transaction_id = state
        .backend
        .create_checkout(user.uid(), &payload.price_id)
        .await?;

    tracing::info!(uid = user.uid(), price_id = %payload.price_id, "Checkout created");

    Ok(Json(CheckoutResponse { transaction_id }))
}

/// Register the persisted device identifier with the billing backend.
///
/// Best-effort: a failure is logged and reported, never surfaced as an error,
/// since purchases still work without attribution.
async fn register_device(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<DeviceRequest>,
) -> Result<Json<DeviceResponse>> {
    if payload.device_id.is_empty() {
        return Err(AppError::BadRequest("Missing device_id".to_string()));
    }

    let registered = match state
        .backend
        .register_device(user.uid(), &payload.device_id)
        .await
    {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(uid = user.uid(), error = %e, "Device registration failed");
            false
        }
    };

    Ok(Json(DeviceResponse { registered }))
}
