// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Environment variable helpers.
//!
//! Secrets follow the `VAR` / `VAR_FILE` convention so the signing key and
//! validation secret can be mounted as files (Docker secrets, Kubernetes
//! secret volumes) instead of living in the process environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::{env, fs};

use thiserror::Error;

use crate::secret::Secret;

/// Errors from reading a secret through `VAR_FILE`.
#[derive(Debug, Error)]
pub enum SecretEnvError {
	#[error("failed to read secret file at {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("secret file path in {var} is empty")]
	EmptyPath { var: String },
}

/// Errors from reading plain settings.
#[derive(Debug, Error)]
pub enum EnvError {
	#[error("{var} not set")]
	Missing { var: String },

	#[error("invalid value for {var}: {value}")]
	Invalid { var: String, value: String },
}

/// Error returned when a required secret is absent.
#[derive(Debug, Error)]
pub enum RequiredSecretError {
	#[error("required secret not found: set either {var} or {file_var}")]
	Missing { var: String, file_var: String },

	#[error(transparent)]
	Load(#[from] SecretEnvError),
}

/// Load a secret from `{var}_FILE` or `{var}`.
///
/// `{var}_FILE` takes precedence. When reading from a file a single trailing
/// newline is stripped; everything else is kept as-is. Returns `Ok(None)` when
/// neither variable is set.
pub fn load_secret_env(var: &str) -> Result<Option<Secret<String>>, SecretEnvError> {
	let file_var = format!("{var}_FILE");

	if let Ok(path_str) = env::var(&file_var) {
		if path_str.is_empty() {
			return Err(SecretEnvError::EmptyPath { var: file_var });
		}

		let path = PathBuf::from(&path_str);
		let content = fs::read_to_string(&path).map_err(|source| SecretEnvError::Io {
			path: path.clone(),
			source,
		})?;

		let secret = content.strip_suffix('\n').unwrap_or(&content).to_string();
		return Ok(Some(Secret::new(secret)));
	}

	Ok(env::var(var).ok().map(Secret::new))
}

/// Load a secret that must be present.
pub fn require_secret_env(var: &str) -> Result<Secret<String>, RequiredSecretError> {
	load_secret_env(var)?.ok_or_else(|| RequiredSecretError::Missing {
		var: var.to_string(),
		file_var: format!("{var}_FILE"),
	})
}

/// Read a non-secret setting that must be present and non-empty.
pub fn require_env(var: &str) -> Result<String, EnvError> {
	match env::var(var) {
		Ok(value) if !value.trim().is_empty() => Ok(value),
		_ => Err(EnvError::Missing {
			var: var.to_string(),
		}),
	}
}

/// Parse an optional setting, falling back to `default` when unset.
pub fn parse_env_or<T>(var: &str, default: T) -> Result<T, EnvError>
where
	T: FromStr,
{
	match env::var(var) {
		Ok(value) => value.trim().parse().map_err(|_| EnvError::Invalid {
			var: var.to_string(),
			value,
		}),
		Err(_) => Ok(default),
	}
}
