// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Configuration for the App Store Connect client.

use std::time::Duration;

use asc_common_config::{parse_env_or, require_env, require_secret_env, SecretString};
use asc_common_http::{RetryConfig, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY};
use reqwest::Url;

use crate::error::AppStoreError;

const DEFAULT_BASE_URL: &str = "https://api.appstoreconnect.apple.com";

/// Configuration for the App Store Connect client.
///
/// The private key is stored as a [`SecretString`] so it never shows up in
/// `Debug` output or logs.
#[derive(Clone)]
pub struct AppStoreConfig {
	/// API key issuer id (JWT `iss`)
	issuer_id: String,

	/// API key id (JWT `kid`)
	key_id: String,

	/// PKCS#8 PEM private key downloaded as a `.p8` file
	private_key_pem: SecretString,

	/// Application that invited users are given visibility of
	app_id: String,

	/// Base URL for the API (validated HTTPS, parsed)
	base_url: Url,

	/// Retry policy for the user search
	pub retry_config: RetryConfig,
}

impl std::fmt::Debug for AppStoreConfig {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AppStoreConfig")
			.field("issuer_id", &self.issuer_id)
			.field("key_id", &self.key_id)
			.field("private_key_pem", &self.private_key_pem)
			.field("app_id", &self.app_id)
			.field("base_url", &self.base_url.as_str())
			.field("retry_config", &self.retry_config)
			.finish()
	}
}

impl AppStoreConfig {
	/// Validate and normalize a base URL.
	///
	/// Must parse, use `https`, and point at a host other than localhost.
	/// The path always ends in `/` so relative endpoints keep any prefix.
	fn validate_base_url(raw: &str) -> Result<Url, AppStoreError> {
		let url = Url::parse(raw)
			.map_err(|e| AppStoreError::Config(format!("Invalid App Store Connect base URL '{raw}': {e}")))?;

		if url.scheme() != "https" {
			return Err(AppStoreError::Config(format!(
				"App Store Connect base URL must use https, got '{}'",
				url.scheme()
			)));
		}

		let host = url.host_str().ok_or_else(|| {
			AppStoreError::Config("App Store Connect base URL must include a host".to_string())
		})?;

		if host == "localhost" || host == "127.0.0.1" || host == "[::1]" {
			return Err(AppStoreError::Config(
				"App Store Connect base URL must not be localhost".to_string(),
			));
		}

		Ok(with_trailing_slash(url))
	}

	/// Create a configuration against the public App Store Connect API.
	pub fn new(
		issuer_id: impl Into<String>,
		key_id: impl Into<String>,
		private_key_pem: impl Into<String>,
		app_id: impl Into<String>,
	) -> Result<Self, AppStoreError> {
		Ok(Self {
			issuer_id: issuer_id.into(),
			key_id: key_id.into(),
			private_key_pem: SecretString::new(private_key_pem.into()),
			app_id: app_id.into(),
			base_url: Self::validate_base_url(DEFAULT_BASE_URL)?,
			retry_config: RetryConfig::default(),
		})
	}

	/// Create configuration from environment variables.
	///
	/// Required:
	/// - `ASC_PROVISIONER_ISSUER_ID`
	/// - `ASC_PROVISIONER_KEY_ID`
	/// - `ASC_PROVISIONER_PRIVATE_KEY` (or `_FILE`)
	/// - `ASC_PROVISIONER_APP_ID`
	///
	/// Optional:
	/// - `ASC_PROVISIONER_BASE_URL` (must be HTTPS)
	/// - `ASC_PROVISIONER_SEARCH_MAX_ATTEMPTS` (default 6)
	/// - `ASC_PROVISIONER_SEARCH_RETRY_DELAY_SECS` (default 10)
	pub fn from_env() -> Result<Self, AppStoreError> {
		let issuer_id = require_env("ASC_PROVISIONER_ISSUER_ID").map_err(config_err)?;
		let key_id = require_env("ASC_PROVISIONER_KEY_ID").map_err(config_err)?;
		let app_id = require_env("ASC_PROVISIONER_APP_ID").map_err(config_err)?;

		let private_key_pem =
			require_secret_env("ASC_PROVISIONER_PRIVATE_KEY").map_err(config_err)?;
		if private_key_pem.is_empty() {
			return Err(AppStoreError::Config(
				"ASC_PROVISIONER_PRIVATE_KEY is empty".to_string(),
			));
		}

		let base_url = match std::env::var("ASC_PROVISIONER_BASE_URL") {
			Ok(raw) => Self::validate_base_url(&raw)?,
			Err(_) => Self::validate_base_url(DEFAULT_BASE_URL)?,
		};

		let max_attempts = parse_env_or("ASC_PROVISIONER_SEARCH_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)
			.map_err(config_err)?;
		if max_attempts == 0 {
			return Err(AppStoreError::Config(
				"ASC_PROVISIONER_SEARCH_MAX_ATTEMPTS must be at least 1".to_string(),
			));
		}
		let delay_secs = parse_env_or(
			"ASC_PROVISIONER_SEARCH_RETRY_DELAY_SECS",
			DEFAULT_RETRY_DELAY.as_secs(),
		)
		.map_err(config_err)?;

		let config = Self {
			issuer_id,
			key_id,
			private_key_pem,
			app_id,
			base_url,
			retry_config: RetryConfig::default(),
		};
		Ok(config.with_retry_config(RetryConfig::new(
			max_attempts,
			Duration::from_secs(delay_secs),
		)))
	}

	/// Point at a local mock server; skips the HTTPS/localhost checks.
	#[cfg(test)]
	pub(crate) fn with_mock_base_url(mut self, url: &str) -> Self {
		self.base_url = with_trailing_slash(Url::parse(url).expect("mock server URL is valid"));
		self
	}

	/// Set a custom retry configuration.
	pub fn with_retry_config(mut self, config: RetryConfig) -> Self {
		self.retry_config = config;
		self
	}

	pub fn issuer_id(&self) -> &str {
		&self.issuer_id
	}

	pub fn key_id(&self) -> &str {
		&self.key_id
	}

	/// Get the private key PEM (for token signing).
	pub(crate) fn private_key_pem(&self) -> &SecretString {
		&self.private_key_pem
	}

	pub fn app_id(&self) -> &str {
		&self.app_id
	}

	pub fn base_url(&self) -> &Url {
		&self.base_url
	}
}

fn with_trailing_slash(mut url: Url) -> Url {
	if !url.path().ends_with('/') {
		let path = format!("{}/", url.path());
		url.set_path(&path);
	}
	url
}

fn config_err(e: impl std::fmt::Display) -> AppStoreError {
	AppStoreError::Config(e.to_string())
}
