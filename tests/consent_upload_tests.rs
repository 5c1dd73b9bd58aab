// SPDX-License-Identifier: MIT
// Copyright 2026 Portray Labs <dev@portray.app>

//! Multipart validation for the consent and generation endpoints, against
//! the offline mock database. Image checks run before any write, so a 400
//! here never touches storage.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use portray_api::middleware::auth::create_session_jwt;
use portray_api::models::{Identity, SignInMethod};
use tower::ServiceExt;

mod common;

const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

fn auth_header(state: &portray_api::AppState) -> String {
    let identity = Identity {
        uid: "uid-consent".to_string(),
        email_verified: true,
        sign_in_method: SignInMethod::Password,
    };
    let token = create_session_jwt(&identity, &state.config.jwt_signing_key).unwrap();
    format!("Bearer {}", token)
}

fn png_bytes() -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&[0u8; 64]);
    bytes
}

/// Build a multipart body with one image part and arbitrary text fields.
fn multipart_body(image: Option<&[u8]>, fields: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();

    if let Some(image) = image {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"photo.png\"\r\nContent-Type: image/png\r\n\r\n",
                BOUNDARY
            )
            .as_bytes(),
        );
        body.extend_from_slice(image);
        body.extend_from_slice(b"\r\n");
    }

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

async fn post_multipart(uri: &str, body: Vec<u8>) -> StatusCode {
    let (app, state) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::AUTHORIZATION, auth_header(&state))
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    response.status()
}

#[tokio::test]
async fn test_consent_rejects_missing_image() {
    let body = multipart_body(
        None,
        &[
            ("consent_processing", "true"),
            ("consent_responsibility", "true"),
        ],
    );
    assert_eq!(
        post_multipart("/api/consent", body).await,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn test_consent_rejects_unsupported_image_type() {
    // GIF magic bytes: not an accepted format.
    let body = multipart_body(
        Some(b"GIF89a..."),
        &[
            ("consent_processing", "true"),
            ("consent_responsibility", "true"),
        ],
    );
    assert_eq!(
        post_multipart("/api/consent", body).await,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn test_consent_rejects_missing_confirmation() {
    // Only one of the two confirmations given.
    let body = multipart_body(Some(&png_bytes()), &[("consent_processing", "true")]);
    assert_eq!(
        post_multipart("/api/consent", body).await,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn test_consent_rejects_false_confirmation() {
    let body = multipart_body(
        Some(&png_bytes()),
        &[
            ("consent_processing", "true"),
            ("consent_responsibility", "false"),
        ],
    );
    assert_eq!(
        post_multipart("/api/consent", body).await,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn test_generate_requires_auth() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/generate")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(Body::from(multipart_body(Some(&png_bytes()), &[])))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_feedback_rejects_unknown_reason() {
    let body = multipart_body(
        None,
        &[("reason_id", "rage-quit"), ("feedback", "text")],
    );
    assert_eq!(
        post_multipart("/api/account/feedback", body).await,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn test_feedback_rejects_oversized_text() {
    let long = "x".repeat(2001);
    let body = multipart_body(
        None,
        &[("reason_id", "results-quality"), ("feedback", &long)],
    );
    assert_eq!(
        post_multipart("/api/account/feedback", body).await,
        StatusCode::BAD_REQUEST
    );
}
