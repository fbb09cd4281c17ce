// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! App Manager provisioning for App Store Connect.
//!
//! A pass validates the inbound event, mints a token, looks the user up,
//! decides between invite, promote, skip and refuse, then applies the decision.

pub mod error;
pub mod orchestrator;
pub mod policy;
pub mod request;

pub use error::{ProvisioningError, RefusalReason, ValidationError};
pub use orchestrator::{
	Provisioner, ProvisioningOutcome, ProvisioningSettings, DEFAULT_PASS_DEADLINE,
};
pub use policy::{decide, ProvisioningDecision};
pub use request::{validate, ProvisioningRequest, ValidationOutcome, VALIDATION_HEADER};
