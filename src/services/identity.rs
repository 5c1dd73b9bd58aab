// SPDX-License-Identifier: MIT
// Copyright 2026 Portray Labs <dev@portray.app>

//! Identity Toolkit REST client.
//!
//! Handles:
//! - ID-token lookup (uid, email verification, provider kind)
//! - Verification email sending
//! - Account deletion (last step of the deletion sequence)
//! - Mapping provider error codes to user-facing strings

use crate::error::AppError;
use crate::models::{Identity, SignInMethod};
use serde::Deserialize;

const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Identity Provider API client.
#[derive(Clone)]
pub struct IdentityClient {
    http: Option<reqwest::Client>,
    base_url: String,
    api_key: String,
}

impl IdentityClient {
    /// Create a new client with the project API key.
    pub fn new(api_key: String) -> Self {
        Self {
            http: Some(reqwest::Client::new()),
            base_url: IDENTITY_TOOLKIT_URL.to_string(),
            api_key,
        }
    }

    /// Create a client pointed at a custom endpoint (auth emulator).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
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
            AppError::IdentityApi("Identity provider not configured (offline mode)".to_string())
        })
    }

    /// Resolve an ID token to an identity (uid, email verification, provider).
    pub async fn lookup(&self, id_token: &str) -> Result<Identity, AppError> {
        let url = format!("{}/accounts:lookup?key={}", self.base_url, self.api_key);

        let response = self
            .get_http()?
            .post(&url)
            .json(&serde_json::json!({ "idToken": id_token }))
            .send()
            .await
            .map_err(|e| AppError::IdentityApi(e.to_string()))?;

        let body: LookupResponse = check_response_json(response).await?;

        let user = body
            .users
            .into_iter()
            .next()
            .ok_or(AppError::InvalidToken)?;

        let sign_in_method = if user
            .provider_user_info
            .iter()
            .any(|p| p.provider_id == "password")
        {
            SignInMethod::Password
        } else {
            SignInMethod::Federated
        };

        Ok(Identity {
            uid: user.local_id,
            email_verified: user.email_verified,
            sign_in_method,
        })
    }

    /// Send a verification email for a password account. Best-effort.
    pub async fn send_verification_email(&self, id_token: &str) -> Result<(), AppError> {
        let url = format!("{}/accounts:sendOobCode?key={}", self.base_url, self.api_key);

        let response = self
            .get_http()?
            .post(&url)
            .json(&serde_json::json!({
                "requestType": "VERIFY_EMAIL",
                "idToken": id_token,
            }))
            .send()
            .await
            .map_err(|e| AppError::IdentityApi(e.to_string()))?;

        check_response(response).await
    }

    /// Delete the account behind an ID token.
    ///
    /// A stale session fails with the recent-login error class, which the
    /// deletion route surfaces as a distinct recoverable state.
    pub async fn delete_account(&self, id_token: &str) -> Result<(), AppError> {
        let url = format!("{}/accounts:delete?key={}", self.base_url, self.api_key);

        let response = self
            .get_http()?
            .post(&url)
            .json(&serde_json::json!({ "idToken": id_token }))
            .send()
            .await
            .map_err(|e| AppError::IdentityApi(e.to_string()))?;

        match check_response(response).await {
            Err(e) if e.is_recent_login_error() => Err(AppError::RequiresRecentLogin),
            other => other,
        }
    }

    /// Map a provider error code to a fixed user-facing message.
    ///
    /// Unmapped codes fall back to a generic message; the raw code is logged
    /// by the caller, never shown to the user.
    pub fn user_message(code: &str) -> &'static str {
        match code {
            "EMAIL_NOT_FOUND" | "INVALID_LOGIN_CREDENTIALS" | "INVALID_PASSWORD" => {
                "Incorrect email or password"
            }
            "INVALID_EMAIL" => "That email address is not valid",
            "EMAIL_EXISTS" => "An account with this email already exists",
            "USER_DISABLED" => "This account has been disabled",
            "TOO_MANY_ATTEMPTS_TRY_LATER" => "Too many attempts, please try again later",
            "NETWORK_REQUEST_FAILED" => "Network error, please check your connection",
            "POPUP_BLOCKED" => "Your browser blocked the sign-in popup",
            AppError::RECENT_LOGIN_CODE => "Please sign in again to continue",
            _ => "Something went wrong, please try again",
        }
    }
}

/// Check response status, extracting the Identity Toolkit error code.
async fn check_response(response: reqwest::Response) -> Result<(), AppError> {
    if response.status().is_success() {
        return Ok(());
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let code = extract_error_code(&body).unwrap_or_else(|| format!("HTTP {}", status));

    Err(AppError::IdentityApi(code))
}

/// Check response and parse JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let code = extract_error_code(&body).unwrap_or_else(|| format!("HTTP {}", status));

        // Invalid/expired ID tokens are an auth failure, not a gateway error.
        if code.starts_with("INVALID_ID_TOKEN") || code.starts_with("USER_NOT_FOUND") {
            return Err(AppError::InvalidToken);
        }
        return Err(AppError::IdentityApi(code));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::IdentityApi(format!("JSON parse error: {}", e)))
}

/// Pull `error.message` out of an Identity Toolkit error body.
fn extract_error_code(body: &str) -> Option<String> {
    let parsed: serde_json::Value = serde_json::from_str(body).ok()?;
    parsed["error"]["message"].as_str().map(|s| s.to_string())
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    #[serde(default)]
    email_verified: bool,
    #[serde(default)]
    provider_user_info: Vec<ProviderInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProviderInfo {
    provider_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_error_code() {
        let body = r#"{"error":{"code":400,"message":"EMAIL_NOT_FOUND"}}"#;
        assert_eq!(extract_error_code(body), Some("EMAIL_NOT_FOUND".to_string()));

        assert_eq!(extract_error_code("not json"), None);
        assert_eq!(extract_error_code("{}"), None);
    }

    #[test]
    fn test_user_message_table() {
        assert_eq!(
            IdentityClient::user_message("EMAIL_NOT_FOUND"),
            "Incorrect email or password"
        );
        assert_eq!(
            IdentityClient::user_message("TOO_MANY_ATTEMPTS_TRY_LATER"),
            "Too many attempts, please try again later"
        );
        // Unmapped codes fall back to the generic message.
        assert_eq!(
            IdentityClient::user_message("SOME_NEW_CODE"),
            "Something went wrong, please try again"
        );
    }

    #[test]
    fn test_recent_login_error_detection() {
        let err = AppError::IdentityApi(AppError::RECENT_LOGIN_CODE.to_string());
        assert!(err.is_recent_login_error());

        let err = AppError::IdentityApi("EMAIL_NOT_FOUND".to_string());
        assert!(!err.is_recent_login_error());

        assert!(AppError::RequiresRecentLogin.is_recent_login_error());
    }

    #[test]
    fn test_lookup_response_parsing() {
        let body = r#"{
            "users": [{
                "localId": "abc123",
                "emailVerified": true,
                "providerUserInfo": [{"providerId": "google.com"}]
            }]
        }"#;
        let parsed: LookupResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.users[0].local_id, "abc123");
        assert!(parsed.users[0].email_verified);
        assert_eq!(parsed.users[0].provider_user_info[0].provider_id, "google.com");
    }
}
