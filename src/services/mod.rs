// SPDX-License-Identifier: MIT
// Copyright 2026 Portray Labs <dev@portray.app>

//! Services module - business logic layer.

pub mod backend;
pub mod birthdate;
pub mod deletion;
pub mod identity;
pub mod storage;
pub mod styles;
pub mod upload;
pub mod verification;

pub use backend::BackendClient;
pub use deletion::{DeletionOutcome, DeletionRunner};
pub use identity::IdentityClient;
pub use storage::StorageClient;
pub use styles::{find_style, Style, STYLES};
pub use verification::{resolve_route, Resolution, RouteIntent, VerificationStatus};
