// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! ES256 token issuance for App Store Connect API authentication.

use asc_common_config::SecretString;
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::AppStoreConfig;
use crate::error::AppStoreError;

/// Audience App Store Connect expects in every API token.
pub const TOKEN_AUDIENCE: &str = "appstoreconnect-v1";

/// Lifetime of every issued token. App Store Connect rejects anything longer.
pub const TOKEN_LIFETIME_MINUTES: i64 = 20;

/// JWT claims for App Store Connect API authentication.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Claims {
	/// Issuer (API key issuer id).
	pub iss: String,
	/// Issued at timestamp (seconds since epoch).
	pub iat: i64,
	/// Expiration timestamp (seconds since epoch).
	pub exp: i64,
	/// Audience, always [`TOKEN_AUDIENCE`].
	pub aud: String,
}

/// A bearer credential minted for one provisioning pass.
///
/// `expires_at` is always exactly twenty minutes after `issued_at`.
pub struct SignedToken {
	value: SecretString,
	issued_at: DateTime<Utc>,
	expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for SignedToken {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SignedToken")
			.field("value", &self.value)
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

impl SignedToken {
	pub fn new(value: impl Into<String>, issued_at: DateTime<Utc>) -> Self {
		Self {
			value: SecretString::new(value.into()),
			issued_at,
			expires_at: issued_at + chrono::Duration::minutes(TOKEN_LIFETIME_MINUTES),
		}
	}

	/// The compact JWS.
	pub fn value(&self) -> &SecretString {
		&self.value
	}

	pub fn issued_at(&self) -> DateTime<Utc> {
		self.issued_at
	}

	pub fn expires_at(&self) -> DateTime<Utc> {
		self.expires_at
	}

	/// `Authorization` header value.
	pub(crate) fn bearer(&self) -> String {
		format!("Bearer {}", self.value.expose())
	}
}

/// Mint a signed App Store Connect token valid from `now` for twenty minutes.
///
/// The header carries `alg: ES256`, `kid` and `typ: JWT`; the payload carries
/// `iss`, `iat`, `exp` and `aud`. Fails with [`AppStoreError::Signing`] when
/// the key is not a PKCS#8 PEM P-256 key.
#[instrument(skip(private_key_pem, now))]
pub fn issue_token(
	issuer_id: &str,
	key_id: &str,
	private_key_pem: &SecretString,
	now: DateTime<Utc>,
) -> Result<SignedToken, AppStoreError> {
	let expires_at = now + chrono::Duration::minutes(TOKEN_LIFETIME_MINUTES);

	let claims = Claims {
		iss: issuer_id.to_string(),
		iat: now.timestamp(),
		exp: expires_at.timestamp(),
		aud: TOKEN_AUDIENCE.to_string(),
	};

	let encoding_key = EncodingKey::from_ec_pem(private_key_pem.expose().as_bytes())
		.map_err(|e| AppStoreError::Signing(format!("Invalid ES256 private key: {e}")))?;

	let mut header = Header::new(Algorithm::ES256);
	header.kid = Some(key_id.to_string());

	let value = encode(&header, &claims, &encoding_key)
		.map_err(|e| AppStoreError::Signing(format!("Failed to encode JWT: {e}")))?;

	debug!(exp = claims.exp, "Issued App Store Connect token");

	Ok(SignedToken::new(value, now))
}

/// Source of signed tokens for a provisioning pass.
pub trait CredentialIssuer: Send + Sync {
	fn issue(&self) -> Result<SignedToken, AppStoreError>;
}

/// Issues tokens from the configured API key using the wall clock.
#[derive(Clone)]
pub struct AppStoreTokenIssuer {
	issuer_id: String,
	key_id: String,
	private_key_pem: SecretString,
}

impl AppStoreTokenIssuer {
	pub fn new(config: &AppStoreConfig) -> Self {
		Self {
			issuer_id: config.issuer_id().to_string(),
			key_id: config.key_id().to_string(),
			private_key_pem: config.private_key_pem().clone(),
		}
	}

	/// Check that the configured key can sign, so a bad key fails at start-up
	/// rather than on the first webhook.
	pub fn verify_key(&self) -> Result<(), AppStoreError> {
		self.issue().map(|_| ())
	}
}

impl CredentialIssuer for AppStoreTokenIssuer {
	fn issue(&self) -> Result<SignedToken, AppStoreError> {
		issue_token(&self.issuer_id, &self.key_id, &self.private_key_pem, Utc::now())
	}
}
