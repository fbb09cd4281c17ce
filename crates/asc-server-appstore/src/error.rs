// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Error types for the App Store Connect client.

use asc_common_http::RetryableError;
use thiserror::Error;

/// Errors that can occur when talking to App Store Connect.
#[derive(Debug, Error)]
pub enum AppStoreError {
	/// Network-level error during HTTP communication.
	#[error("Network error: {0}")]
	Network(#[from] reqwest::Error),

	/// Request timed out.
	#[error("Request timed out")]
	Timeout,

	/// The signing key could not be used to mint a token.
	#[error("Signing error: {0}")]
	Signing(String),

	/// Configuration error.
	#[error("Configuration error: {0}")]
	Config(String),

	/// A user search or profile read returned an unexpected status.
	#[error("App Store Connect directory error: {status} - {body}")]
	Directory { status: u16, body: String },

	/// The invitation endpoint did not answer `201 Created`.
	#[error("User invitation failed: {status} - {body}")]
	InviteFailed { status: u16, body: String },

	/// The role update endpoint did not answer `200 OK`.
	#[error("User promotion failed: {status} - {body}")]
	PromotionFailed { status: u16, body: String },

	/// Invalid or unparseable response body.
	#[error("Invalid response from App Store Connect: {0}")]
	InvalidResponse(String),
}

impl RetryableError for AppStoreError {
	/// Only `500` from the directory is treated as transient.
	fn is_retryable(&self) -> bool {
		matches!(self, AppStoreError::Directory { status: 500, .. })
	}
}

impl AppStoreError {
	pub fn directory(status: u16, body: impl Into<String>) -> Self {
		Self::Directory {
			status,
			body: body.into(),
		}
	}

	/// Upstream HTTP status, when the error came from a response.
	pub fn status(&self) -> Option<u16> {
		match self {
			AppStoreError::Directory { status, .. }
			| AppStoreError::InviteFailed { status, .. }
			| AppStoreError::PromotionFailed { status, .. } => Some(*status),
			AppStoreError::Network(e) => e.status().map(|s| s.as_u16()),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_retryable_only_on_directory_500() {
		assert!(AppStoreError::directory(500, "Internal Server Error").is_retryable());
		assert!(!AppStoreError::directory(502, "Bad Gateway").is_retryable());
		assert!(!AppStoreError::directory(503, "Service Unavailable").is_retryable());
		assert!(!AppStoreError::directory(404, "Not Found").is_retryable());
	}

	#[test]
	fn test_not_retryable_mutations() {
		let invite = AppStoreError::InviteFailed {
			status: 500,
			body: String::new(),
		};
		let promote = AppStoreError::PromotionFailed {
			status: 500,
			body: String::new(),
		};
		assert!(!invite.is_retryable());
		assert!(!promote.is_retryable());
	}

	#[test]
	fn test_not_retryable_signing_or_timeout() {
		assert!(!AppStoreError::Signing("bad key".to_string()).is_retryable());
		assert!(!AppStoreError::Timeout.is_retryable());
	}

	#[test]
	fn test_status_accessor() {
		assert_eq!(AppStoreError::directory(403, "").status(), Some(403));
		assert_eq!(
			AppStoreError::PromotionFailed {
				status: 409,
				body: String::new()
			}
			.status(),
			Some(409)
		);
		assert_eq!(AppStoreError::Timeout.status(), None);
	}

	#[test]
	fn test_error_display() {
		let err = AppStoreError::InviteFailed {
			status: 409,
			body: "ENTITY_ERROR".to_string(),
		};
		assert_eq!(err.to_string(), "User invitation failed: 409 - ENTITY_ERROR");
	}
}
