// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP utilities for the provisioner.
//!
//! This crate provides:
//! - A pre-configured HTTP client with a consistent User-Agent header
//! - A bounded, fixed-interval retry loop whose pause is injectable

mod client;
mod retry;

pub use client::{builder, user_agent};
pub use retry::{
	retry, RecordingSleeper, RetryConfig, RetryableError, Sleeper, TokioSleeper,
	DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY,
};
