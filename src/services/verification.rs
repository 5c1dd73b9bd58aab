// SPDX-License-Identifier: MIT
// Copyright 2026 Portray Labs <dev@portray.app>

//! Verification status resolver.
//!
//! Pure function mapping (identity, verification status) to the next route.
//! Callers must fetch the latest profile immediately before resolving;
//! caching a resolution across navigation boundaries acts on stale state
//! (the age screen may have just flipped `age_verified`).

use crate::models::{Identity, Profile, SignInMethod};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Route the client should navigate to next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "kebab-case")]
pub enum RouteIntent {
    Login,
    Age,
    TermsService,
    Generator,
    /// Terminal informational screen for under-18 users
    AgeBlocked,
}

/// Verification gates read from the profile document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerificationStatus {
    pub age_verified: bool,
    pub terms_accepted: bool,
}

impl From<&Profile> for VerificationStatus {
    fn from(profile: &Profile) -> Self {
        Self {
            age_verified: profile.age_verified,
            terms_accepted: profile.terms_accepted,
        }
    }
}

/// Resolved route plus the inline-message flag for rule 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Resolution {
    pub route: RouteIntent,
    /// Password sign-in with unverified email: the login screen must render
    /// a "check your email" state instead of bouncing through a redirect.
    pub verification_pending: bool,
}

impl Resolution {
    const fn route(route: RouteIntent) -> Self {
        Self {
            route,
            verification_pending: false,
        }
    }
}

/// Resolve the next route. Evaluated in strict order, first match wins.
pub fn resolve_route(identity: Option<&Identity>, status: &VerificationStatus) -> Resolution {
    let Some(identity) = identity else {
        return Resolution::route(RouteIntent::Login);
    };

    if identity.sign_in_method == SignInMethod::Password && !identity.email_verified {
        return Resolution {
            route: RouteIntent::Login,
            verification_pending: true,
        };
    }

    if !status.age_verified {
        return Resolution::route(RouteIntent::Age);
    }

    if !status.terms_accepted {
        return Resolution::route(RouteIntent::TermsService);
    }

    Resolution::route(RouteIntent::Generator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(method: SignInMethod, email_verified: bool) -> Identity {
        Identity {
            uid: "uid-1".to_string(),
            email_verified,
            sign_in_method: method,
        }
    }

    fn status(age: bool, terms: bool) -> VerificationStatus {
        VerificationStatus {
            age_verified: age,
            terms_accepted: terms,
        }
    }

    #[test]
    fn test_no_identity_resolves_login() {
        let res = resolve_route(None, &status(true, true));
        assert_eq!(res.route, RouteIntent::Login);
        assert!(!res.verification_pending);
    }

    #[test]
    fn test_unverified_password_email_pends_before_age() {
        // Rule 2 outranks rule 3: even with age_verified=false the user
        // stays on login with the verification-pending message.
        let id = identity(SignInMethod::Password, false);
        let res = resolve_route(Some(&id), &status(false, false));
        assert_eq!(res.route, RouteIntent::Login);
        assert!(res.verification_pending);
    }

    #[test]
    fn test_federated_skips_email_verification() {
        let id = identity(SignInMethod::Federated, false);
        let res = resolve_route(Some(&id), &status(false, false));
        assert_eq!(res.route, RouteIntent::Age);
    }

    #[test]
    fn test_onboarding_progression() {
        let id = identity(SignInMethod::Password, true);

        assert_eq!(
            resolve_route(Some(&id), &status(false, false)).route,
            RouteIntent::Age
        );
        assert_eq!(
            resolve_route(Some(&id), &status(true, false)).route,
            RouteIntent::TermsService
        );
        assert_eq!(
            resolve_route(Some(&id), &status(true, true)).route,
            RouteIntent::Generator
        );
    }

    #[test]
    fn test_resolver_is_pure() {
        let id = identity(SignInMethod::Password, true);
        let st = status(true, false);

        let first = resolve_route(Some(&id), &st);
        let second = resolve_route(Some(&id), &st);
        assert_eq!(first, second);
    }

    #[test]
    fn test_single_flag_flip_advances_route() {
        let id = identity(SignInMethod::Federated, true);

        let before = resolve_route(Some(&id), &status(false, false));
        let after = resolve_route(Some(&id), &status(true, false));

        assert_eq!(before.route, RouteIntent::Age);
        assert_eq!(after.route, RouteIntent::TermsService);
    }
}
