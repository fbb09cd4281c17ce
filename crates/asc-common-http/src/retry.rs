// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Fixed-interval retry for transient upstream failures.
//!
//! The App Store Connect user search occasionally answers `500`; the call is
//! repeated after a constant pause until it succeeds, fails with something
//! that is not transient, or `max_attempts` is reached. The pause goes through
//! a [`Sleeper`] so tests can observe it without waiting.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

/// Default pause between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(10);

/// Default attempt budget: five pauses, 50 s in total at the default delay.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
	/// Total attempts including the first one. Values below 1 behave as 1.
	pub max_attempts: u32,
	/// Constant pause between attempts.
	pub delay: Duration,
}

impl Default for RetryConfig {
	fn default() -> Self {
		Self {
			max_attempts: DEFAULT_MAX_ATTEMPTS,
			delay: DEFAULT_RETRY_DELAY,
		}
	}
}

impl RetryConfig {
	pub fn new(max_attempts: u32, delay: Duration) -> Self {
		Self {
			max_attempts,
			delay,
		}
	}
}

pub trait RetryableError {
	fn is_retryable(&self) -> bool;
}

/// Suspends the current task between attempts.
#[async_trait]
pub trait Sleeper: Send + Sync + std::fmt::Debug {
	async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer; suspends only the calling
/// task.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
	async fn sleep(&self, duration: Duration) {
		tokio::time::sleep(duration).await;
	}
}

/// Sleeper that records requested pauses and returns immediately.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
	pauses: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
	pub fn new() -> Self {
		Self::default()
	}

	/// Pauses requested so far, in order.
	pub fn pauses(&self) -> Vec<Duration> {
		match self.pauses.lock() {
			Ok(guard) => guard.clone(),
			Err(poisoned) => poisoned.into_inner().clone(),
		}
	}
}

#[async_trait]
impl Sleeper for RecordingSleeper {
	async fn sleep(&self, duration: Duration) {
		match self.pauses.lock() {
			Ok(mut guard) => guard.push(duration),
			Err(poisoned) => poisoned.into_inner().push(duration),
		}
		tokio::task::yield_now().await;
	}
}

/// Run `f` until it succeeds, returns a non-retryable error, or the attempt
/// budget is spent. The last error is returned unchanged.
pub async fn retry<F, Fut, T, E>(cfg: &RetryConfig, sleeper: &dyn Sleeper, mut f: F) -> Result<T, E>
where
	F: FnMut() -> Fut,
	Fut: std::future::Future<Output = Result<T, E>>,
	E: RetryableError + std::fmt::Debug,
{
	let max_attempts = cfg.max_attempts.max(1);
	let mut attempt = 0;

	loop {
		match f().await {
			Ok(result) => return Ok(result),
			Err(err) => {
				attempt += 1;

				if !err.is_retryable() {
					return Err(err);
				}

				if attempt >= max_attempts {
					warn!(
						error = ?err,
						attempt = attempt,
						max_attempts = max_attempts,
						"max retry attempts exhausted"
					);
					return Err(err);
				}

				warn!(
					error = ?err,
					attempt = attempt,
					max_attempts = max_attempts,
					delay_secs = cfg.delay.as_secs_f64(),
					"transient upstream error, retrying after fixed delay"
				);

				sleeper.sleep(cfg.delay).await;
			}
		}
	}
}
