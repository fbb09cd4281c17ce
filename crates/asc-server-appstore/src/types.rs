// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Directory types and App Store Connect JSON:API payloads.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// App Store Connect role names used by the provisioning flow.
pub mod roles {
	/// The only role this service grants.
	pub const APP_MANAGER: &str = "APP_MANAGER";
	/// Granted alongside every App Manager assignment; required by the platform.
	pub const CLOUD_MANAGED_APP_DISTRIBUTION: &str = "CLOUD_MANAGED_APP_DISTRIBUTION";
	pub const ADMIN: &str = "ADMIN";
	pub const ACCOUNT_HOLDER: &str = "ACCOUNT_HOLDER";

	/// Accounts holding any of these are never modified.
	pub const PRIVILEGED: [&str; 2] = [ACCOUNT_HOLDER, ADMIN];
}

/// Snapshot of an App Store Connect user at lookup time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryUser {
	pub id: String,
	pub roles: BTreeSet<String>,
}

impl DirectoryUser {
	pub fn new<I, S>(id: impl Into<String>, roles: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			id: id.into(),
			roles: roles.into_iter().map(Into::into).collect(),
		}
	}

	pub fn has_role(&self, role: &str) -> bool {
		self.roles.contains(role)
	}

	/// Whether the user holds `ACCOUNT_HOLDER` or `ADMIN`.
	pub fn is_privileged(&self) -> bool {
		roles::PRIVILEGED.iter().any(|role| self.has_role(role))
	}
}

/// Result of searching the directory by email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
	NotFound,
	Found(DirectoryUser),
}

/// Data needed to invite a new team member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInvitation {
	pub email: String,
	pub first_name: String,
	pub last_name: String,
	pub role: String,
}

// JSON:API wire types. Only the fields the provisioning flow reads or writes
// are modelled.

#[derive(Debug, Deserialize)]
pub(crate) struct UsersResponse {
	pub data: Vec<UserResource>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserResponse {
	pub data: UserResource,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserResource {
	pub id: String,
	#[serde(default)]
	pub attributes: UserAttributes,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserAttributes {
	#[serde(default)]
	pub roles: Vec<String>,
}

impl From<UserResource> for DirectoryUser {
	fn from(resource: UserResource) -> Self {
		DirectoryUser::new(resource.id, resource.attributes.roles)
	}
}

#[derive(Debug, Serialize)]
pub(crate) struct InvitationCreateRequest<'a> {
	pub data: InvitationCreateData<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct InvitationCreateData<'a> {
	#[serde(rename = "type")]
	pub kind: &'static str,
	pub attributes: InvitationAttributes<'a>,
	pub relationships: InvitationRelationships<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InvitationAttributes<'a> {
	pub email: &'a str,
	pub first_name: &'a str,
	pub last_name: &'a str,
	pub roles: [&'a str; 2],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InvitationRelationships<'a> {
	pub visible_apps: ResourceLinkage<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResourceLinkage<'a> {
	pub data: Vec<ResourceIdentifier<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResourceIdentifier<'a> {
	pub id: &'a str,
	#[serde(rename = "type")]
	pub kind: &'static str,
}

impl<'a> InvitationCreateRequest<'a> {
	/// Invite with the requested role plus the platform-required secondary
	/// role, visible to the single configured app.
	pub fn new(invitation: &'a UserInvitation, app_id: &'a str) -> Self {
		Self {
			data: InvitationCreateData {
				kind: "userInvitations",
				attributes: InvitationAttributes {
					email: &invitation.email,
					first_name: &invitation.first_name,
					last_name: &invitation.last_name,
					roles: [invitation.role.as_str(), roles::CLOUD_MANAGED_APP_DISTRIBUTION],
				},
				relationships: InvitationRelationships {
					visible_apps: ResourceLinkage {
						data: vec![ResourceIdentifier {
							id: app_id,
							kind: "apps",
						}],
					},
				},
			},
		}
	}
}

#[derive(Debug, Deserialize)]
pub(crate) struct InvitationResponse {
	pub data: InvitationResource,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InvitationResource {
	pub id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct UserUpdateRequest<'a> {
	pub data: UserUpdateData<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UserUpdateData<'a> {
	#[serde(rename = "type")]
	pub kind: &'static str,
	pub id: &'a str,
	pub attributes: UserUpdateAttributes,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserUpdateAttributes {
	pub roles: [&'static str; 2],
	pub all_apps_visible: bool,
}

impl<'a> UserUpdateRequest<'a> {
	/// Set roles to exactly App Manager plus cloud-managed distribution, with
	/// visibility of all apps.
	pub fn promote_to_app_manager(user_id: &'a str) -> Self {
		Self {
			data: UserUpdateData {
				kind: "users",
				id: user_id,
				attributes: UserUpdateAttributes {
					roles: [roles::APP_MANAGER, roles::CLOUD_MANAGED_APP_DISTRIBUTION],
					all_apps_visible: true,
				},
			},
		}
	}
}
