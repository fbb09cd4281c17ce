// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Inbound provisioning request parsing and gatekeeping.

use asc_common_config::SecretString;
use asc_server_appstore::roles;
use http::HeaderMap;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::ValidationError;

/// Header carrying the shared secret.
pub const VALIDATION_HEADER: &str = "Validation";

/// A validated request to provision one user. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningRequest {
	pub target_email: String,
	pub given_name: String,
	pub family_name: String,
	pub requested_role: String,
}

/// Result of a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
	Accepted(ProvisioningRequest),
	/// The target is outside the accepted email domain; nothing to do.
	NoAction,
}

#[derive(Debug, Deserialize)]
struct ProvisioningPayload {
	target_user: Option<TargetUser>,
	#[serde(default)]
	permissions: Vec<Permission>,
}

#[derive(Debug, Deserialize)]
struct TargetUser {
	email: Option<String>,
	given_name: Option<String>,
	family_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Permission {
	label: String,
}

/// Authenticate and parse an inbound event.
///
/// Checks run in order: the `Validation` header, the payload shape, the
/// requested role (first permission label), then the email domain. An
/// out-of-domain target yields [`ValidationOutcome::NoAction`], not an error.
pub fn validate(
	headers: &HeaderMap,
	body: &[u8],
	expected_secret: &SecretString,
	expected_domain: &str,
) -> Result<ValidationOutcome, ValidationError> {
	let provided = headers
		.get(VALIDATION_HEADER)
		.ok_or(ValidationError::MissingSecret)?;
	let provided = provided
		.to_str()
		.map_err(|_| ValidationError::SecretMismatch)?;
	if !expected_secret.matches(provided) {
		return Err(ValidationError::SecretMismatch);
	}

	let payload: ProvisioningPayload = serde_json::from_slice(body)
		.map_err(|e| ValidationError::MalformedPayload(e.to_string()))?;

	let target_user = payload
		.target_user
		.ok_or_else(|| ValidationError::MalformedPayload("missing target_user".to_string()))?;
	let target_email = target_user
		.email
		.ok_or_else(|| ValidationError::MalformedPayload("missing target_user.email".to_string()))?;

	let requested_role = payload
		.permissions
		.into_iter()
		.next()
		.map(|p| p.label)
		.ok_or_else(|| ValidationError::MalformedPayload("permissions is empty".to_string()))?;

	if requested_role != roles::APP_MANAGER {
		return Err(ValidationError::UnsupportedRole(requested_role));
	}

	if !target_email.ends_with(expected_domain) {
		info!("Email domain is not accepted, no provisioning action");
		return Ok(ValidationOutcome::NoAction);
	}

	debug!("Provisioning request validated");

	Ok(ValidationOutcome::Accepted(ProvisioningRequest {
		target_email,
		given_name: target_user.given_name.unwrap_or_default(),
		family_name: target_user.family_name.unwrap_or_default(),
		requested_role,
	}))
}

#[cfg(test)]
mod tests {
	use super::*;
	use http::HeaderValue;
	use proptest::prelude::*;
	use serde_json::json;

	const SECRET: &str = "s3cr3t-validation-key";
	const DOMAIN: &str = "@example.com";

	fn headers(secret: &str) -> HeaderMap {
		let mut headers = HeaderMap::new();
		headers.insert(VALIDATION_HEADER, HeaderValue::from_str(secret).unwrap());
		headers
	}

	fn body(email: &str, role: &str) -> Vec<u8> {
		serde_json::to_vec(&json!({
			"target_user": { "email": email, "given_name": "Jane", "family_name": "Doe" },
			"permissions": [{ "label": role }, { "label": "IGNORED" }]
		}))
		.unwrap()
	}

	fn run(headers: &HeaderMap, body: &[u8]) -> Result<ValidationOutcome, ValidationError> {
		validate(headers, body, &SecretString::new(SECRET.to_string()), DOMAIN)
	}

	#[test]
	fn test_accepts_in_domain_app_manager() {
		let outcome = run(&headers(SECRET), &body("jane@example.com", "APP_MANAGER")).unwrap();
		assert_eq!(
			outcome,
			ValidationOutcome::Accepted(ProvisioningRequest {
				target_email: "jane@example.com".to_string(),
				given_name: "Jane".to_string(),
				family_name: "Doe".to_string(),
				requested_role: "APP_MANAGER".to_string(),
			})
		);
	}

	#[test]
	fn test_missing_header() {
		let err = run(&HeaderMap::new(), &body("jane@example.com", "APP_MANAGER")).unwrap_err();
		assert_eq!(err, ValidationError::MissingSecret);
	}

	#[test]
	fn test_header_name_is_case_insensitive() {
		let mut headers = HeaderMap::new();
		headers.insert("validation", HeaderValue::from_static(SECRET));
		assert!(run(&headers, &body("jane@example.com", "APP_MANAGER")).is_ok());
	}

	#[test]
	fn test_secret_mismatch() {
		let err = run(&headers("wrong"), &body("jane@example.com", "APP_MANAGER")).unwrap_err();
		assert_eq!(err, ValidationError::SecretMismatch);
	}

	#[test]
	fn test_secret_checked_before_payload() {
		let err = run(&headers("wrong"), b"not json").unwrap_err();
		assert_eq!(err, ValidationError::SecretMismatch);
	}

	#[test]
	fn test_unsupported_role_uses_first_permission() {
		let err = run(&headers(SECRET), &body("jane@example.com", "DEVELOPER")).unwrap_err();
		assert_eq!(err, ValidationError::UnsupportedRole("DEVELOPER".to_string()));
	}

	#[test]
	fn test_role_checked_before_domain() {
		let err = run(&headers(SECRET), &body("jane@other.org", "ADMIN")).unwrap_err();
		assert_eq!(err, ValidationError::UnsupportedRole("ADMIN".to_string()));
	}

	#[test]
	fn test_out_of_domain_is_no_action() {
		let outcome = run(&headers(SECRET), &body("jane@other.org", "APP_MANAGER")).unwrap();
		assert_eq!(outcome, ValidationOutcome::NoAction);
	}

	#[test]
	fn test_domain_match_is_case_sensitive() {
		let outcome = run(&headers(SECRET), &body("jane@EXAMPLE.COM", "APP_MANAGER")).unwrap();
		assert_eq!(outcome, ValidationOutcome::NoAction);
	}

	#[test]
	fn test_missing_names_default_to_empty() {
		let body = serde_json::to_vec(&json!({
			"target_user": { "email": "jane@example.com" },
			"permissions": [{ "label": "APP_MANAGER" }]
		}))
		.unwrap();

		match run(&headers(SECRET), &body).unwrap() {
			ValidationOutcome::Accepted(request) => {
				assert_eq!(request.given_name, "");
				assert_eq!(request.family_name, "");
			}
			other => panic!("unexpected outcome: {other:?}"),
		}
	}

	#[test]
	fn test_malformed_payloads() {
		let cases: Vec<Vec<u8>> = vec![
			b"not json".to_vec(),
			serde_json::to_vec(&json!({ "permissions": [{ "label": "APP_MANAGER" }] })).unwrap(),
			serde_json::to_vec(&json!({
				"target_user": { "given_name": "Jane" },
				"permissions": [{ "label": "APP_MANAGER" }]
			}))
			.unwrap(),
			serde_json::to_vec(&json!({
				"target_user": { "email": "jane@example.com" },
				"permissions": []
			}))
			.unwrap(),
		];

		for case in cases {
			let err = run(&headers(SECRET), &case).unwrap_err();
			assert!(
				matches!(err, ValidationError::MalformedPayload(_)),
				"expected MalformedPayload, got {err:?}"
			);
		}
	}

	proptest! {
		#[test]
		fn prop_any_other_role_is_rejected(role in "[A-Z_]{1,24}") {
			prop_assume!(role != "APP_MANAGER");
			let err = run(&headers(SECRET), &body("jane@example.com", &role)).unwrap_err();
			prop_assert_eq!(err, ValidationError::UnsupportedRole(role));
		}

		#[test]
		fn prop_out_of_domain_is_no_action(local in "[a-z]{1,12}", domain in "[a-z]{1,12}\\.(org|net|io)") {
			let email = format!("{local}@{domain}");
			let outcome = run(&headers(SECRET), &body(&email, "APP_MANAGER")).unwrap();
			prop_assert_eq!(outcome, ValidationOutcome::NoAction);
		}
	}
}
