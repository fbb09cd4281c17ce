// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! App Store Connect client for team-role provisioning.
//!
//! Only the operations the provisioning flow needs are implemented: minting
//! an ES256 API token, searching users by email, reading a user's roles,
//! inviting a user, and promoting a user to App Manager.

pub mod client;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use asc_common_http::RetryConfig;
pub use client::{AppStoreClient, UserDirectory};
pub use config::AppStoreConfig;
pub use error::AppStoreError;
pub use jwt::{issue_token, AppStoreTokenIssuer, CredentialIssuer, SignedToken, TOKEN_AUDIENCE};
pub use types::{roles, DirectoryUser, LookupOutcome, UserInvitation};
