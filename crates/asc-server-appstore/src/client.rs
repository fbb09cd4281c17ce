// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! App Store Connect user directory client.

use std::sync::Arc;
use std::time::Duration;

use asc_common_http::{retry, Sleeper, TokioSleeper};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, instrument, warn};

use crate::config::AppStoreConfig;
use crate::error::AppStoreError;
use crate::jwt::SignedToken;
use crate::types::{
	DirectoryUser, InvitationCreateRequest, InvitationResponse, LookupOutcome, UserInvitation,
	UserResponse, UserUpdateRequest, UsersResponse,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The App Store Connect user operations the provisioning flow needs.
///
/// Every call takes the pass's [`SignedToken`] as its bearer credential.
#[async_trait]
pub trait UserDirectory: Send + Sync {
	/// Search by username. The first match wins; later matches are ignored.
	/// A `500` is retried after a fixed pause, up to the configured attempts.
	async fn find_user_by_email(
		&self,
		token: &SignedToken,
		email: &str,
	) -> Result<LookupOutcome, AppStoreError>;

	/// Read a user's current roles. Single attempt.
	async fn fetch_profile(
		&self,
		token: &SignedToken,
		user_id: &str,
	) -> Result<DirectoryUser, AppStoreError>;

	/// Create an invitation and return its id. Succeeds only on `201`.
	async fn invite_user(
		&self,
		token: &SignedToken,
		invitation: &UserInvitation,
	) -> Result<String, AppStoreError>;

	/// Set the user's roles to App Manager. Succeeds only on `200`.
	async fn promote_user(&self, token: &SignedToken, user_id: &str) -> Result<(), AppStoreError>;
}

/// HTTP implementation of [`UserDirectory`].
#[derive(Clone)]
pub struct AppStoreClient {
	http_client: Client,
	config: AppStoreConfig,
	sleeper: Arc<dyn Sleeper>,
}

impl AppStoreClient {
	pub fn new(config: AppStoreConfig) -> Result<Self, AppStoreError> {
		let http_client = asc_common_http::builder()
			.timeout(REQUEST_TIMEOUT)
			.build()
			.map_err(|e| AppStoreError::Config(format!("Failed to create HTTP client: {e}")))?;

		info!(
			base_url = %config.base_url(),
			app_id = %config.app_id(),
			search_max_attempts = config.retry_config.max_attempts,
			"Created App Store Connect client"
		);

		Ok(Self {
			http_client,
			config,
			sleeper: Arc::new(TokioSleeper),
		})
	}

	/// Replace the pause used between search retries.
	pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
		self.sleeper = sleeper;
		self
	}

	fn url(&self, path: &str) -> Result<Url, AppStoreError> {
		self
			.config
			.base_url()
			.join(path)
			.map_err(|e| AppStoreError::Config(format!("Invalid URL: {e}")))
	}

	async fn send(&self, request: RequestBuilder, token: &SignedToken) -> Result<Response, AppStoreError> {
		request
			.header("Authorization", token.bearer())
			.header("Accept", "application/json")
			.send()
			.await
			.map_err(|e| {
				if e.is_timeout() {
					error!("App Store Connect request timed out");
					return AppStoreError::Timeout;
				}
				error!(error = %e, "Network error calling App Store Connect");
				AppStoreError::Network(e)
			})
	}

	async fn find_user_inner(
		&self,
		token: &SignedToken,
		email: &str,
	) -> Result<LookupOutcome, AppStoreError> {
		let mut url = self.url("v1/users")?;
		url.query_pairs_mut().append_pair("filter[username]", email);

		debug!("Searching App Store Connect users by email");

		let response = self.send(self.http_client.get(url), token).await?;

		let status = response.status();
		if status != StatusCode::OK {
			let body = response.text().await.unwrap_or_default();
			if status == StatusCode::INTERNAL_SERVER_ERROR {
				warn!(status = status.as_u16(), "User search returned a server error");
			} else {
				error!(status = status.as_u16(), body = %body, "User search failed");
			}
			return Err(AppStoreError::directory(status.as_u16(), body));
		}

		let users: UsersResponse = parse_json(response, "user search").await?;
		if users.data.len() > 1 {
			warn!(
				matches = users.data.len(),
				"User search returned several matches, using the first"
			);
		}

		match users.data.into_iter().next() {
			Some(resource) => {
				let user = DirectoryUser::from(resource);
				info!(user_id = %user.id, "User found");
				Ok(LookupOutcome::Found(user))
			}
			None => {
				info!("User not found");
				Ok(LookupOutcome::NotFound)
			}
		}
	}
}

#[async_trait]
impl UserDirectory for AppStoreClient {
	#[instrument(skip_all)]
	async fn find_user_by_email(
		&self,
		token: &SignedToken,
		email: &str,
	) -> Result<LookupOutcome, AppStoreError> {
		retry(&self.config.retry_config, self.sleeper.as_ref(), || {
			self.find_user_inner(token, email)
		})
		.await
	}

	#[instrument(skip(self, token))]
	async fn fetch_profile(
		&self,
		token: &SignedToken,
		user_id: &str,
	) -> Result<DirectoryUser, AppStoreError> {
		let url = self.url(&format!("v1/users/{user_id}"))?;

		let response = self.send(self.http_client.get(url), token).await?;

		let status = response.status();
		if status != StatusCode::OK {
			let body = response.text().await.unwrap_or_default();
			error!(status = status.as_u16(), body = %body, "Failed to fetch user profile");
			return Err(AppStoreError::directory(status.as_u16(), body));
		}

		let profile: UserResponse = parse_json(response, "user profile").await?;
		let user = DirectoryUser::from(profile.data);

		debug!(roles = ?user.roles, "Retrieved user profile");

		Ok(user)
	}

	#[instrument(skip_all, fields(role = %invitation.role))]
	async fn invite_user(
		&self,
		token: &SignedToken,
		invitation: &UserInvitation,
	) -> Result<String, AppStoreError> {
		let url = self.url("v1/userInvitations")?;
		let body = InvitationCreateRequest::new(invitation, self.config.app_id());

		let response = self
			.send(self.http_client.post(url).json(&body), token)
			.await?;

		let status = response.status();
		if status != StatusCode::CREATED {
			let body = response.text().await.unwrap_or_default();
			error!(status = status.as_u16(), body = %body, "Failed to invite user");
			return Err(AppStoreError::InviteFailed {
				status: status.as_u16(),
				body,
			});
		}

		let created: InvitationResponse = parse_json(response, "user invitation").await?;

		info!(invitation_id = %created.data.id, "Invite successful");

		Ok(created.data.id)
	}

	#[instrument(skip(self, token))]
	async fn promote_user(&self, token: &SignedToken, user_id: &str) -> Result<(), AppStoreError> {
		let url = self.url(&format!("v1/users/{user_id}"))?;
		let body = UserUpdateRequest::promote_to_app_manager(user_id);

		let response = self
			.send(self.http_client.patch(url).json(&body), token)
			.await?;

		let status = response.status();
		if status != StatusCode::OK {
			let body = response.text().await.unwrap_or_default();
			error!(status = status.as_u16(), body = %body, "Failed to promote user");
			return Err(AppStoreError::PromotionFailed {
				status: status.as_u16(),
				body,
			});
		}

		info!("User promoted to App Manager");

		Ok(())
	}
}

async fn parse_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T, AppStoreError> {
	response.json().await.map_err(|e| {
		error!(error = %e, "Failed to parse {what} response");
		AppStoreError::InvalidResponse(format!("{what}: JSON parse error: {e}"))
	})
}
