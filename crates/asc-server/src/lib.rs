// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Webhook server that provisions App Store Connect App Managers.

pub mod config;
pub mod logging;
pub mod routes;

pub use config::{ConfigError, HttpConfig, LogFormat, LoggingConfig, ServerConfig};
pub use routes::{create_router, AppState};
