// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP client builder.

use reqwest::{Client, ClientBuilder};

/// Creates an HTTP client builder with the provisioner User-Agent header.
///
/// Callers add their own timeout before building:
///
/// ```ignore
/// let client = asc_common_http::builder()
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// ```
pub fn builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

/// Returns the User-Agent string, `asc-provisioner/{version}`.
pub fn user_agent() -> String {
	format!("asc-provisioner/{}", env!("CARGO_PKG_VERSION"))
}
