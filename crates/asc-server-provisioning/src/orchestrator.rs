// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! One provisioning pass per inbound event.

use std::sync::Arc;
use std::time::Duration;

use asc_common_config::SecretString;
use asc_server_appstore::{
	CredentialIssuer, LookupOutcome, SignedToken, UserDirectory, UserInvitation,
};
use http::HeaderMap;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::error::ProvisioningError;
use crate::policy::{decide, ProvisioningDecision};
use crate::request::{validate, ProvisioningRequest, ValidationOutcome};

/// Default overall deadline for one pass.
pub const DEFAULT_PASS_DEADLINE: Duration = Duration::from_secs(120);

/// Settings shared by every pass, loaded once at start-up.
#[derive(Clone)]
pub struct ProvisioningSettings {
	pub validation_secret: SecretString,
	/// Accepted email suffix, matched exactly.
	pub email_domain: String,
	pub pass_deadline: Duration,
}

impl std::fmt::Debug for ProvisioningSettings {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ProvisioningSettings")
			.field("validation_secret", &self.validation_secret)
			.field("email_domain", &self.email_domain)
			.field("pass_deadline", &self.pass_deadline)
			.finish()
	}
}

/// Terminal success states of a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisioningOutcome {
	/// Target outside the accepted domain.
	NoAction,
	Invited { invitation_id: String },
	Promoted { user_id: String },
	AlreadyProvisioned { user_id: String },
}

/// Sequences validation, token issuance, lookup, policy and the resulting
/// directory mutation.
#[derive(Clone)]
pub struct Provisioner {
	issuer: Arc<dyn CredentialIssuer>,
	directory: Arc<dyn UserDirectory>,
	settings: ProvisioningSettings,
}

impl Provisioner {
	pub fn new(
		issuer: Arc<dyn CredentialIssuer>,
		directory: Arc<dyn UserDirectory>,
		settings: ProvisioningSettings,
	) -> Self {
		Self {
			issuer,
			directory,
			settings,
		}
	}

	/// Run one pass for an inbound event, bounded by the pass deadline.
	pub async fn handle(
		&self,
		headers: &HeaderMap,
		body: &[u8],
	) -> Result<ProvisioningOutcome, ProvisioningError> {
		let pass_id = Uuid::new_v4();
		let span = info_span!("provisioning_pass", %pass_id);

		let deadline = self.settings.pass_deadline;
		let result = tokio::time::timeout(deadline, self.run(headers, body))
			.instrument(span.clone())
			.await;

		span.in_scope(|| match result {
			Ok(Ok(outcome)) => {
				info!(?outcome, "Provisioning pass completed");
				Ok(outcome)
			}
			Ok(Err(e)) => {
				error!(error = %e, code = e.code(), "Provisioning pass failed");
				Err(e)
			}
			Err(_) => {
				error!(?deadline, "Provisioning pass exceeded its deadline");
				Err(ProvisioningError::DeadlineExceeded(deadline))
			}
		})
	}

	async fn run(
		&self,
		headers: &HeaderMap,
		body: &[u8],
	) -> Result<ProvisioningOutcome, ProvisioningError> {
		let request = match validate(
			headers,
			body,
			&self.settings.validation_secret,
			&self.settings.email_domain,
		)? {
			ValidationOutcome::NoAction => return Ok(ProvisioningOutcome::NoAction),
			ValidationOutcome::Accepted(request) => request,
		};

		let token = self.issuer.issue()?;

		let lookup = match self
			.directory
			.find_user_by_email(&token, &request.target_email)
			.await?
		{
			LookupOutcome::NotFound => LookupOutcome::NotFound,
			LookupOutcome::Found(user) => {
				LookupOutcome::Found(self.directory.fetch_profile(&token, &user.id).await?)
			}
		};

		self.execute(&token, &request, &lookup).await
	}

	async fn execute(
		&self,
		token: &SignedToken,
		request: &ProvisioningRequest,
		lookup: &LookupOutcome,
	) -> Result<ProvisioningOutcome, ProvisioningError> {
		let decision = decide(&request.requested_role, lookup);
		info!(?decision, "Provisioning decision");

		match decision {
			ProvisioningDecision::Refuse(reason) => Err(ProvisioningError::Refused(reason)),
			ProvisioningDecision::Invite => {
				let invitation = UserInvitation {
					email: request.target_email.clone(),
					first_name: request.given_name.clone(),
					last_name: request.family_name.clone(),
					role: request.requested_role.clone(),
				};
				let invitation_id = self.directory.invite_user(token, &invitation).await?;
				Ok(ProvisioningOutcome::Invited { invitation_id })
			}
			ProvisioningDecision::Promote { user_id } => {
				self.directory.promote_user(token, &user_id).await?;
				Ok(ProvisioningOutcome::Promoted { user_id })
			}
			ProvisioningDecision::Skip { user_id } => {
				Ok(ProvisioningOutcome::AlreadyProvisioned { user_id })
			}
		}
	}
}
