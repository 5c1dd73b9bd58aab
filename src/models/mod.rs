// SPDX-License-Identifier: MIT
// Copyright 2026 Portray Labs <dev@portray.app>

//! Data models for the application.

pub mod consent;
pub mod identity;
pub mod profile;

pub use consent::{ConsentRecord, DeletionFeedback, CONSENT_SCHEMA_VERSION};
pub use identity::{Identity, SignInMethod};
pub use profile::{PremiumStatus, Profile, SIGNUP_CREDIT_GRANT};
