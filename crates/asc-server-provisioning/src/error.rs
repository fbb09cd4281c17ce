// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::time::Duration;

use asc_server_appstore::AppStoreError;

/// Reasons an inbound provisioning request is rejected before any upstream call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
	#[error("validation header is required")]
	MissingSecret,

	#[error("validation header does not match")]
	SecretMismatch,

	#[error("requested role is not allowed: {0}")]
	UnsupportedRole(String),

	#[error("malformed provisioning payload: {0}")]
	MalformedPayload(String),
}

/// Why the policy declined to touch an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RefusalReason {
	#[error("unsupported role")]
	UnsupportedRole,

	#[error("user is an admin or account holder")]
	PrivilegedAccount,
}

/// Errors that end a provisioning pass as a failure.
#[derive(Debug, thiserror::Error)]
pub enum ProvisioningError {
	#[error("invalid request: {0}")]
	Validation(#[from] ValidationError),

	#[error("provisioning refused: {0}")]
	Refused(RefusalReason),

	#[error(transparent)]
	Upstream(#[from] AppStoreError),

	#[error("provisioning pass exceeded its {0:?} deadline")]
	DeadlineExceeded(Duration),
}

impl ProvisioningError {
	/// Stable machine-readable error kind.
	pub fn code(&self) -> &'static str {
		match self {
			ProvisioningError::Validation(ValidationError::MissingSecret) => "missing_secret",
			ProvisioningError::Validation(ValidationError::SecretMismatch) => "secret_mismatch",
			ProvisioningError::Validation(ValidationError::UnsupportedRole(_))
			| ProvisioningError::Refused(RefusalReason::UnsupportedRole) => "unsupported_role",
			ProvisioningError::Validation(ValidationError::MalformedPayload(_)) => "malformed_payload",
			ProvisioningError::Refused(RefusalReason::PrivilegedAccount) => "privileged_account",
			ProvisioningError::Upstream(AppStoreError::Signing(_)) => "signing_error",
			ProvisioningError::Upstream(AppStoreError::Config(_)) => "configuration_error",
			ProvisioningError::Upstream(AppStoreError::InviteFailed { .. }) => "invite_failed",
			ProvisioningError::Upstream(AppStoreError::PromotionFailed { .. }) => "promotion_failed",
			ProvisioningError::Upstream(_) => "directory_error",
			ProvisioningError::DeadlineExceeded(_) => "deadline_exceeded",
		}
	}
}
