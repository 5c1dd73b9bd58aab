// SPDX-License-Identifier: MIT
// Copyright 2026 Portray Labs <dev@portray.app>

//! Generation backend client.
//!
//! The backend owns image generation, credit accounting, and payment
//! processing; this client proxies to it with service bearer auth.
//! Entitlement checks done here before calling are UX short-circuits only;
//! the backend performs the authoritative check and the credit decrement.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Generation backend API client.
#[derive(Clone)]
pub struct BackendClient {
    http: Option<reqwest::Client>,
    base_url: String,
    api_key: String,
}

/// A purchasable offering (credit package or subscription).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Product {
    pub price_id: String,
    /// "credits" or "subscription"
    pub kind: String,
    pub name: String,
    pub credits: Option<u32>,
    pub amount_cents: u32,
    pub currency: String,
}

/// Binary generation result with the backend's declared content type.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct CheckoutResponse {
    transaction_id: String,
}

#[derive(Debug, Deserialize)]
struct CancelResponse {
    success: bool,
    #[serde(default)]
    reason: Option<String>,
}

impl BackendClient {
    /// Create a new client for the generation backend.
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            http: Some(reqwest::Client::new()),
            base_url,
            api_key,
        }
    }

    /// Create a mock client for offline tests. All calls return an error.
    pub fn new_mock() -> Self {
        Self {
            http: None,
            base_url: String::new(),
            api_key: String::new(),
        }
    }

    fn get_http(&self) -> Result<&reqwest::Client, AppError> {
        self.http.as_ref().ok_or_else(|| {
            AppError::BackendApi("Generation backend not configured (offline mode)".to_string())
        })
    }

    /// Generate a transformed image: multipart {image, prompt, user id},
    /// binary image response. The output format is whatever the backend
    /// declares, not necessarily the input format.
    pub async fn generate(
        &self,
        uid: &str,
        prompt: &str,
        image: Vec<u8>,
        mime: &str,
    ) -> Result<GeneratedImage, AppError> {
        let part = reqwest::multipart::Part::bytes(image)
            .file_name("upload")
            .mime_str(mime)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid mime type: {}", e)))?;

        let form = reqwest::multipart::Form::new()
            .part("image", part)
            .text("prompt", prompt.to_string())
            .text("user_id", uid.to_string());

        let response = self
            .get_http()?
            .post(format!("{}/generate", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::BackendApi(e.to_string()))?;

        // The backend is the credit authority: it signals exhaustion itself.
        if response.status().as_u16() == 402 {
            return Err(AppError::PaymentRequired(
                "Not enough credits for this generation".to_string(),
            ));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::BackendApi(format!("HTTP {}: {}", status, body)));
        }

        let content_type =
            image_content_type(response.headers().get(reqwest::header::CONTENT_TYPE));

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::BackendApi(format!("Failed to read image: {}", e)))?;

        Ok(GeneratedImage {
            content_type,
            bytes: bytes.to_vec(),
        })
    }

    /// List purchasable offerings (public).
    pub async fn products(&self) -> Result<Vec<Product>, AppError> {
        let response = self
            .get_http()?
            .get(format!("{}/products", self.base_url))
            .send()
            .await
            .map_err(|e| AppError::BackendApi(e.to_string()))?;

        check_response_json(response).await
    }

    /// Create a checkout transaction for the payment overlay.
    pub async fn create_checkout(&self, uid: &str, price_id: &str) -> Result<String, AppError> {
        let response = self
            .get_http()?
            .post(format!("{}/create-checkout", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "user_id": uid, "price_id": price_id }))
            .send()
            .await
            .map_err(|e| AppError::BackendApi(e.to_string()))?;

        let body: CheckoutResponse = check_response_json(response).await?;
        Ok(body.transaction_id)
    }

    /// Cancel an active subscription. Returns an error when the backend
    /// reports failure; deletion treats that as a hard stop.
    pub async fn cancel_subscription(
        &self,
        uid: &str,
        subscription_id: &str,
    ) -> Result<(), AppError> {
        let response = self
            .get_http()?
            .post(format!("{}/cancel-subscription", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "user_id": uid,
                "subscription_id": subscription_id,
            }))
            .send()
            .await
            .map_err(|e| AppError::BackendApi(e.to_string()))?;

        let body: CancelResponse = check_response_json(response).await?;
        if !body.success {
            return Err(AppError::BackendApi(format!(
                "Subscription cancellation refused: {}",
                body.reason.unwrap_or_else(|| "unknown".to_string())
            )));
        }
        Ok(())
    }

    /// Archive credit/trial state ahead of account deletion. Best-effort.
    pub async fn archive_account(&self, uid: &str) -> Result<(), AppError> {
        let response = self
            .get_http()?
            .post(format!("{}/archive-account", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "user_id": uid }))
            .send()
            .await
            .map_err(|e| AppError::BackendApi(e.to_string()))?;

        check_response(response).await
    }

    /// Register a device identifier. Best-effort.
    pub async fn register_device(&self, uid: &str, device_id: &str) -> Result<(), AppError> {
        let response = self
            .get_http()?
            .post(format!("{}/register-device", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "user_id": uid, "device_id": device_id }))
            .send()
            .await
            .map_err(|e| AppError::BackendApi(e.to_string()))?;

        check_response(response).await
    }
}

/// Content type declared for a binary image response. Non-image or missing
/// declarations fall back to a generic octet stream.
fn image_content_type(value: Option<&reqwest::header::HeaderValue>) -> String {
    value
        .and_then(|v| v.to_str().ok())
        .filter(|v| v.starts_with("image/"))
        .unwrap_or("application/octet-stream")
        .to_string()
}

/// Check response status and return error if not successful.
async fn check_response(response: reqwest::Response) -> Result<(), AppError> {
    if response.status().is_success() {
        return Ok(());
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(AppError::BackendApi(format!("HTTP {}: {}", status, body)))
}

/// Check response and parse JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::BackendApi(format!("HTTP {}: {}", status, body)));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::BackendApi(format!("JSON parse error: {}", e)))
}
