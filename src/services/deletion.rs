// SPDX-License-Identifier: MIT
// Copyright 2026 Portray Labs <dev@portray.app>

//! Account deletion: wizard table and order-dependent execution.
//!
//! The wizard is a static table mapping each reason to one generic screen
//! descriptor instead of per-reason bespoke screens. Execution is modelled
//! as explicit data: a plan of steps derived from the profile, with each
//! step's failure disposition fixed, so the sequencing rules are testable
//! without any network.
//!
//! Step order matters: cancellation first (never destroy data while a
//! payment obligation is ambiguous), archival second (best-effort, gated so
//! retries archive at most once), profile before identity (deleting identity
//! first would invalidate the credentials the profile delete runs under).

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::Profile;
use crate::services::{BackendClient, IdentityClient};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

// ─── Wizard table ─────────────────────────────────────────────────────────

/// Screen kind rendered by the client's single generic wizard renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "kebab-case")]
pub enum WizardScreen {
    RetentionOffer,
    Feedback,
    Confirm,
}

/// One selectable deletion reason and the screen it leads to.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DeletionReason {
    pub id: &'static str,
    pub label: &'static str,
    pub screen: WizardScreen,
    pub copy: &'static str,
    pub primary_action: &'static str,
}

/// Reason table consumed by one generic renderer.
pub const DELETION_REASONS: &[DeletionReason] = &[
    DeletionReason {
        id: "too-expensive",
        label: "It costs too much",
        screen: WizardScreen::RetentionOffer,
        copy: "Before you go: switch to the starter plan and keep your credits.",
        primary_action: "See starter plan",
    },
    DeletionReason {
        id: "not-using",
        label: "I don't use it anymore",
        screen: WizardScreen::RetentionOffer,
        copy: "Your credits never expire. Pause instead and come back anytime.",
        primary_action: "Pause subscription",
    },
    DeletionReason {
        id: "results-quality",
        label: "I'm unhappy with the results",
        screen: WizardScreen::Feedback,
        copy: "Tell us what went wrong. Example photos help us fix it.",
        primary_action: "Send feedback",
    },
    DeletionReason {
        id: "privacy",
        label: "Privacy concerns",
        screen: WizardScreen::Confirm,
        copy: "Deleting your account removes your profile and photos permanently.",
        primary_action: "Delete my account",
    },
    DeletionReason {
        id: "other",
        label: "Something else",
        screen: WizardScreen::Feedback,
        copy: "We read every message. What made you leave?",
        primary_action: "Send feedback",
    },
];

/// Look up a wizard reason by id.
pub fn find_reason(id: &str) -> Option<&'static DeletionReason> {
    DELETION_REASONS.iter().find(|r| r.id == id)
}

// ─── Execution plan ───────────────────────────────────────────────────────

/// One step of the deletion sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionStep {
    /// Cancel the active external subscription
    CancelSubscription,
    /// Archive credit/trial state via the backend
    ArchiveCredits,
    /// Delete the profile document (while still authenticated)
    DeleteProfile,
    /// Delete the identity itself, always last
    DeleteIdentity,
}

/// What a step's failure does to the rest of the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureDisposition {
    /// Abort the whole operation; nothing later runs
    Halt,
    /// Log, warn, and keep going (best-effort step)
    ContinueWithWarning,
}

impl DeletionStep {
    pub fn on_failure(self) -> FailureDisposition {
        match self {
            DeletionStep::ArchiveCredits => FailureDisposition::ContinueWithWarning,
            _ => FailureDisposition::Halt,
        }
    }
}

/// Derive the step sequence for a profile.
///
/// Cancellation only applies with an active subscription; archival is
/// skipped when `deletion_archived` is already set (a retried deletion must
/// not top up archived state twice).
pub fn deletion_plan(profile: &Profile) -> Vec<DeletionStep> {
    let mut plan = Vec::with_capacity(4);

    if profile.has_active_subscription() {
        plan.push(DeletionStep::CancelSubscription);
    }
    if !profile.deletion_archived {
        plan.push(DeletionStep::ArchiveCredits);
    }
    plan.push(DeletionStep::DeleteProfile);
    plan.push(DeletionStep::DeleteIdentity);
    plan
}

// ─── Runner ───────────────────────────────────────────────────────────────

/// Terminal state of a deletion attempt that did not hard-fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionOutcome {
    /// Everything is gone
    Deleted,
    /// Identity deletion needs a fresh sign-in; the profile is already
    /// deleted, so the retry runs against a missing document
    RequiresRecentLogin,
}

/// Executes a deletion plan strictly in order.
pub struct DeletionRunner<'a> {
    pub db: &'a FirestoreDb,
    pub backend: &'a BackendClient,
    pub identity: &'a IdentityClient,
}

impl DeletionRunner<'_> {
    /// Run the deletion sequence for `uid`.
    ///
    /// `id_token` is the caller's fresh Identity Provider token, needed for
    /// the final identity deletion.
    pub async fn run(&self, uid: &str, id_token: &str) -> Result<DeletionOutcome, AppError> {
        let Some(profile) = self.db.get_profile(uid).await? else {
            // Retry after re-login: steps 1-3 already ran, only the
            // identity remains.
            tracing::info!(uid, "No profile during deletion, deleting identity only");
            return self.delete_identity(uid, id_token).await;
        };

        let mut outcome = DeletionOutcome::Deleted;
        for step in deletion_plan(&profile) {
            let result = match step {
                DeletionStep::CancelSubscription => {
                    let subscription_id = profile.subscription_id.as_deref().unwrap_or_default();
                    self.backend
                        .cancel_subscription(uid, subscription_id)
                        .await
                        .inspect(|_| {
                            tracing::info!(
                                uid,
                                subscription_id,
                                "Subscription cancelled for deletion"
                            );
                        })
                }
                DeletionStep::ArchiveCredits => match self.backend.archive_account(uid).await {
                    Ok(()) => {
                        if let Err(e) = self.db.mark_deletion_archived(uid).await {
                            tracing::warn!(uid, error = %e, "Failed to record archive flag");
                        }
                        Ok(())
                    }
                    Err(e) => Err(e),
                },
                DeletionStep::DeleteProfile => self.db.delete_profile(uid).await,
                DeletionStep::DeleteIdentity => {
                    outcome = self.delete_identity(uid, id_token).await?;
                    Ok(())
                }
            };

            if let Err(e) = result {
                match step.on_failure() {
                    // Never continue while the payment obligation or the
                    // data state is ambiguous.
                    FailureDisposition::Halt => return Err(e),
                    FailureDisposition::ContinueWithWarning => {
                        tracing::warn!(uid, step = ?step, error = %e, "Deletion step failed, continuing");
                    }
                }
            }
        }

        Ok(outcome)
    }

    async fn delete_identity(
        &self,
        uid: &str,
        id_token: &str,
    ) -> Result<DeletionOutcome, AppError> {
        match self.identity.delete_account(id_token).await {
            Ok(()) => {
                tracing::info!(uid, "Account deletion complete");
                Ok(DeletionOutcome::Deleted)
            }
            Err(e) if e.is_recent_login_error() => {
                tracing::info!(uid, "Identity deletion needs a recent login");
                Ok(DeletionOutcome::RequiresRecentLogin)
            }
            Err(e) => Err(e),
        }
    }
}
