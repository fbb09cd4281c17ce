// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Invite-versus-promote decision.

use asc_server_appstore::{roles, LookupOutcome};

use crate::error::RefusalReason;

/// What a provisioning pass should do for a looked-up user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisioningDecision {
	/// The user already holds the role.
	Skip { user_id: String },
	Invite,
	Promote { user_id: String },
	Refuse(RefusalReason),
}

/// Decide the action for `requested_role` given the directory lookup.
///
/// Privileged accounts are always refused, whatever other roles they hold.
pub fn decide(requested_role: &str, lookup: &LookupOutcome) -> ProvisioningDecision {
	if requested_role != roles::APP_MANAGER {
		return ProvisioningDecision::Refuse(RefusalReason::UnsupportedRole);
	}

	match lookup {
		LookupOutcome::NotFound => ProvisioningDecision::Invite,
		LookupOutcome::Found(user) if user.is_privileged() => {
			ProvisioningDecision::Refuse(RefusalReason::PrivilegedAccount)
		}
		LookupOutcome::Found(user) if !user.has_role(roles::APP_MANAGER) => {
			ProvisioningDecision::Promote {
				user_id: user.id.clone(),
			}
		}
		LookupOutcome::Found(user) => ProvisioningDecision::Skip {
			user_id: user.id.clone(),
		},
	}
}
