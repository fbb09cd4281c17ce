// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Configuration primitives shared by the provisioner crates.
//!
//! - [`Secret<T>`]: keeps API keys, signing keys and shared secrets out of
//!   logs and serialized output
//! - [`load_secret_env`] / [`require_secret_env`]: read secrets from `VAR` or
//!   `VAR_FILE`
//! - [`require_env`] / [`parse_env_or`]: plain (non-secret) settings

pub mod env;
pub mod secret;

pub use env::{
	load_secret_env, parse_env_or, require_env, require_secret_env, EnvError, RequiredSecretError,
	SecretEnvError,
};
pub use secret::{Secret, SecretString, REDACTED};
