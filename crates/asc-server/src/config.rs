// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Server configuration, read once from the environment at start-up.

use std::str::FromStr;
use std::time::Duration;

use asc_common_config::{
	parse_env_or, require_env, require_secret_env, EnvError, RequiredSecretError,
};
use asc_server_appstore::{AppStoreConfig, AppStoreError};
use asc_server_provisioning::{ProvisioningSettings, DEFAULT_PASS_DEADLINE};

/// Errors raised while assembling [`ServerConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error(transparent)]
	Env(#[from] EnvError),

	#[error(transparent)]
	Secret(#[from] RequiredSecretError),

	#[error("App Store Connect configuration: {0}")]
	AppStore(#[from] AppStoreError),

	#[error("{var} must not be empty")]
	Empty { var: &'static str },

	#[error("invalid value for {var}: {value}")]
	Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
	pub host: String,
	pub port: u16,
}

impl Default for HttpConfig {
	fn default() -> Self {
		Self {
			host: "0.0.0.0".to_string(),
			port: 8080,
		}
	}
}

/// Output format of the `fmt` layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
	#[default]
	Pretty,
	Json,
}

impl FromStr for LogFormat {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"pretty" | "text" => Ok(LogFormat::Pretty),
			"json" => Ok(LogFormat::Json),
			other => Err(other.to_string()),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
	/// Default filter directive; `RUST_LOG` overrides it.
	pub level: String,
	pub format: LogFormat,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			format: LogFormat::Pretty,
		}
	}
}

/// Fully resolved server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub logging: LoggingConfig,
	pub appstore: AppStoreConfig,
	pub provisioning: ProvisioningSettings,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}

	/// Build the configuration from `ASC_PROVISIONER_*` variables.
	pub fn from_env() -> Result<Self, ConfigError> {
		Ok(Self {
			http: http_from_env()?,
			logging: logging_from_env()?,
			appstore: AppStoreConfig::from_env()?,
			provisioning: provisioning_from_env()?,
		})
	}
}

/// Read only the logging section, so tracing can be installed before the rest
/// of the configuration is validated.
pub fn logging_from_env() -> Result<LoggingConfig, ConfigError> {
	let defaults = LoggingConfig::default();
	let level = parse_env_or("ASC_PROVISIONER_LOG_LEVEL", defaults.level)?;
	let format = match std::env::var("ASC_PROVISIONER_LOG_FORMAT") {
		Ok(raw) => raw.parse().map_err(|value| ConfigError::Invalid {
			var: "ASC_PROVISIONER_LOG_FORMAT",
			value,
		})?,
		Err(_) => defaults.format,
	};
	Ok(LoggingConfig { level, format })
}

fn http_from_env() -> Result<HttpConfig, ConfigError> {
	let defaults = HttpConfig::default();
	Ok(HttpConfig {
		host: parse_env_or("ASC_PROVISIONER_HOST", defaults.host)?,
		port: parse_env_or("ASC_PROVISIONER_PORT", defaults.port)?,
	})
}

fn provisioning_from_env() -> Result<ProvisioningSettings, ConfigError> {
	let validation_secret = require_secret_env("ASC_PROVISIONER_VALIDATION_SECRET")?;
	if validation_secret.is_empty() {
		return Err(ConfigError::Empty {
			var: "ASC_PROVISIONER_VALIDATION_SECRET",
		});
	}

	let email_domain = require_env("ASC_PROVISIONER_EMAIL_DOMAIN")?;

	let deadline_secs = parse_env_or(
		"ASC_PROVISIONER_PASS_DEADLINE_SECS",
		DEFAULT_PASS_DEADLINE.as_secs(),
	)?;
	if deadline_secs == 0 {
		return Err(ConfigError::Invalid {
			var: "ASC_PROVISIONER_PASS_DEADLINE_SECS",
			value: "0".to_string(),
		});
	}

	Ok(ProvisioningSettings {
		validation_secret,
		email_domain,
		pass_deadline: Duration::from_secs(deadline_secs),
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_log_format_parse() {
		assert_eq!("json".parse::<LogFormat>(), Ok(LogFormat::Json));
		assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
		assert_eq!("pretty".parse::<LogFormat>(), Ok(LogFormat::Pretty));
		assert!("xml".parse::<LogFormat>().is_err());
	}

	#[test]
	fn test_socket_addr() {
		let http = HttpConfig {
			host: "127.0.0.1".to_string(),
			port: 9000,
		};
		assert_eq!(format!("{}:{}", http.host, http.port), "127.0.0.1:9000");
		assert_eq!(HttpConfig::default().port, 8080);
	}

	#[test]
	fn test_provisioning_from_env() {
		std::env::set_var("ASC_PROVISIONER_VALIDATION_SECRET", "hook-secret");
		std::env::set_var("ASC_PROVISIONER_EMAIL_DOMAIN", "@example.com");
		std::env::set_var("ASC_PROVISIONER_PASS_DEADLINE_SECS", "45");

		let settings = provisioning_from_env().unwrap();
		assert!(settings.validation_secret.matches("hook-secret"));
		assert_eq!(settings.email_domain, "@example.com");
		assert_eq!(settings.pass_deadline, Duration::from_secs(45));

		std::env::set_var("ASC_PROVISIONER_PASS_DEADLINE_SECS", "0");
		assert!(matches!(
			provisioning_from_env(),
			Err(ConfigError::Invalid { .. })
		));

		std::env::remove_var("ASC_PROVISIONER_EMAIL_DOMAIN");
		assert!(matches!(provisioning_from_env(), Err(ConfigError::Env(_))));

		for var in [
			"ASC_PROVISIONER_VALIDATION_SECRET",
			"ASC_PROVISIONER_PASS_DEADLINE_SECS",
		] {
			std::env::remove_var(var);
		}
	}
}
