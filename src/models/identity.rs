// SPDX-License-Identifier: MIT
// Copyright 2026 Portray Labs <dev@portray.app>

//! Identity Provider view of a user, as carried in session claims.

use serde::{Deserialize, Serialize};

/// How the user signed in. Email verification is only meaningful for
/// password accounts; federated providers verify on their side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignInMethod {
    Password,
    Federated,
}

/// Authenticated identity derived from the Identity Provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    /// Stable opaque user id (Firestore document key)
    pub uid: String,
    /// Email verification flag from the provider
    pub email_verified: bool,
    /// Sign-in provider kind
    pub sign_in_method: SignInMethod,
}
