// SPDX-License-Identifier: MIT
// Copyright 2026 Portray Labs <dev@portray.app>

//! Profile document stored in Firestore, one per identity.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Premium subscription status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum PremiumStatus {
    Active,
    Paused,
}

/// User profile stored in Firestore (document id = identity uid).
///
/// Credits are decremented exclusively by the generation backend; this
/// service reads the balance but never writes it outside profile creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Identity Provider uid (also used as document ID)
    pub uid: String,
    /// Remaining generation credits
    pub credits: u32,
    /// Premium entitlement flag
    pub is_premium: bool,
    /// Premium lifecycle state (None when never subscribed)
    pub premium_status: Option<PremiumStatus>,
    /// External subscription id (billing provider)
    pub subscription_id: Option<String>,
    /// Price id of the active subscription
    pub subscription_price_id: Option<String>,
    /// Age verification gate
    pub age_verified: bool,
    /// Raw birth date string as entered (DD.MM.YYYY), set once on success
    pub date_of_birth: Option<String>,
    /// When age verification succeeded
    pub age_verified_at: Option<String>,
    /// Terms/consent checkpoint gate
    pub terms_accepted: bool,
    /// When terms were accepted
    pub terms_accepted_at: Option<String>,
    /// One-time generator tips popup shown
    pub has_seen_generator_tips: bool,
    /// One-time first-generation popup shown
    pub has_seen_first_time_popup: bool,
    /// Analytics collection consent (default true, user-togglable)
    pub analytics_enabled: bool,
    /// Crash reporting consent (default true, user-togglable)
    pub crash_reporting_enabled: bool,
    /// Credit/trial state already archived before deletion
    pub deletion_archived: bool,
    /// When archival happened
    pub deletion_archived_at: Option<String>,
    /// When the profile was created
    pub created_at: String,
    /// Last session activity timestamp
    pub last_active: String,
}

/// Credits granted to every newly created profile.
pub const SIGNUP_CREDIT_GRANT: u32 = 3;

impl Profile {
    /// Fresh profile for a first-time sign-in, with the default credit grant.
    pub fn new(uid: &str, now: &str) -> Self {
        Self {
            uid: uid.to_string(),
            credits: SIGNUP_CREDIT_GRANT,
            is_premium: false,
            premium_status: None,
            subscription_id: None,
            subscription_price_id: None,
            age_verified: false,
            date_of_birth: None,
            age_verified_at: None,
            terms_accepted: false,
            terms_accepted_at: None,
            has_seen_generator_tips: false,
            has_seen_first_time_popup: false,
            analytics_enabled: true,
            crash_reporting_enabled: true,
            deletion_archived: false,
            deletion_archived_at: None,
            created_at: now.to_string(),
            last_active: now.to_string(),
        }
    }

    /// Whether the profile has an active subscription to cancel on deletion.
    pub fn has_active_subscription(&self) -> bool {
        self.subscription_id.is_some() && self.premium_status == Some(PremiumStatus::Active)
    }
}
