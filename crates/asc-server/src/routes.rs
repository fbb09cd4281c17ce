// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! HTTP handlers for the provisioning webhook.

use std::sync::Arc;

use asc_server_appstore::AppStoreError;
use asc_server_provisioning::{
	Provisioner, ProvisioningError, ProvisioningOutcome, RefusalReason, ValidationError,
};
use axum::{
	body::Bytes,
	extract::State,
	http::{HeaderMap, StatusCode},
	response::{IntoResponse, Response},
	routing::{get, post},
	Json, Router,
};
use serde::Serialize;

/// Body returned when the target is outside the accepted domain.
pub const NO_PROVISIONING_ACTION: &str = "NO_PROVISIONING_ACTION";

#[derive(Clone)]
pub struct AppState {
	pub provisioner: Arc<Provisioner>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
}

#[derive(Debug, Serialize)]
struct NoActionResponse {
	response: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
	pub status: &'static str,
	pub version: &'static str,
}

pub fn create_router(provisioner: Provisioner) -> Router {
	Router::new()
		.route("/provision", post(provision))
		.route("/health", get(health_check))
		.with_state(AppState {
			provisioner: Arc::new(provisioner),
		})
}

/// POST /provision - run one provisioning pass for the inbound event.
pub async fn provision(
	State(state): State<AppState>,
	headers: HeaderMap,
	body: Bytes,
) -> Response {
	match state.provisioner.handle(&headers, &body).await {
		Ok(ProvisioningOutcome::NoAction) => (
			StatusCode::OK,
			Json(NoActionResponse {
				response: NO_PROVISIONING_ACTION,
			}),
		)
			.into_response(),
		Ok(_) => StatusCode::NO_CONTENT.into_response(),
		Err(e) => error_response(&e),
	}
}

/// GET /health - liveness.
pub async fn health_check() -> Json<HealthResponse> {
	Json(HealthResponse {
		status: "ok",
		version: env!("CARGO_PKG_VERSION"),
	})
}

fn status_for(error: &ProvisioningError) -> StatusCode {
	match error {
		ProvisioningError::Validation(ValidationError::MissingSecret)
		| ProvisioningError::Validation(ValidationError::SecretMismatch) => StatusCode::UNAUTHORIZED,
		ProvisioningError::Validation(ValidationError::MalformedPayload(_)) => StatusCode::BAD_REQUEST,
		ProvisioningError::Validation(ValidationError::UnsupportedRole(_))
		| ProvisioningError::Refused(RefusalReason::UnsupportedRole) => {
			StatusCode::UNPROCESSABLE_ENTITY
		}
		ProvisioningError::Refused(RefusalReason::PrivilegedAccount) => StatusCode::FORBIDDEN,
		ProvisioningError::Upstream(AppStoreError::Signing(_) | AppStoreError::Config(_)) => {
			StatusCode::INTERNAL_SERVER_ERROR
		}
		ProvisioningError::Upstream(_) => StatusCode::BAD_GATEWAY,
		ProvisioningError::DeadlineExceeded(_) => StatusCode::GATEWAY_TIMEOUT,
	}
}

fn error_response(error: &ProvisioningError) -> Response {
	(
		status_for(error),
		Json(ErrorResponse {
			error: error.code().to_string(),
			message: error.to_string(),
		}),
	)
		.into_response()
}

#[cfg(test)]
mod tests {
	use super::*;
	use asc_common_config::SecretString;
	use asc_server_appstore::{
		CredentialIssuer, DirectoryUser, LookupOutcome, SignedToken, UserDirectory, UserInvitation,
	};
	use asc_server_provisioning::{ProvisioningSettings, DEFAULT_PASS_DEADLINE};
	use async_trait::async_trait;
	use axum::body::Body;
	use axum::http::Request;
	use serde_json::{json, Value};
	use tower::ServiceExt;

	const SECRET: &str = "hook-secret";

	struct StaticIssuer;

	impl CredentialIssuer for StaticIssuer {
		fn issue(&self) -> Result<SignedToken, AppStoreError> {
			Ok(SignedToken::new("jws", chrono::Utc::now()))
		}
	}

	struct StaticDirectory {
		roles: Option<Vec<&'static str>>,
		search_status: Option<u16>,
	}

	#[async_trait]
	impl UserDirectory for StaticDirectory {
		async fn find_user_by_email(
			&self,
			_token: &SignedToken,
			_email: &str,
		) -> Result<LookupOutcome, AppStoreError> {
			if let Some(status) = self.search_status {
				return Err(AppStoreError::directory(status, "upstream"));
			}
			Ok(match &self.roles {
				Some(roles) => LookupOutcome::Found(DirectoryUser::new("u1", roles.iter().copied())),
				None => LookupOutcome::NotFound,
			})
		}

		async fn fetch_profile(
			&self,
			_token: &SignedToken,
			user_id: &str,
		) -> Result<DirectoryUser, AppStoreError> {
			let roles = self.roles.clone().unwrap_or_default();
			Ok(DirectoryUser::new(user_id, roles))
		}

		async fn invite_user(
			&self,
			_token: &SignedToken,
			_invitation: &UserInvitation,
		) -> Result<String, AppStoreError> {
			Ok("inv-1".to_string())
		}

		async fn promote_user(&self, _token: &SignedToken, _user_id: &str) -> Result<(), AppStoreError> {
			Ok(())
		}
	}

	fn router(roles: Option<Vec<&'static str>>, search_status: Option<u16>) -> Router {
		let settings = ProvisioningSettings {
			validation_secret: SecretString::new(SECRET.to_string()),
			email_domain: "@example.com".to_string(),
			pass_deadline: DEFAULT_PASS_DEADLINE,
		};
		create_router(Provisioner::new(
			Arc::new(StaticIssuer),
			Arc::new(StaticDirectory {
				roles,
				search_status,
			}),
			settings,
		))
	}

	fn provision_request(secret: Option<&str>, email: &str, role: &str) -> Request<Body> {
		let body = json!({
			"target_user": { "email": email, "given_name": "Jane", "family_name": "Doe" },
			"permissions": [{ "label": role }]
		});
		let mut builder = Request::builder()
			.method("POST")
			.uri("/provision")
			.header("content-type", "application/json");
		if let Some(secret) = secret {
			builder = builder.header("Validation", secret);
		}
		builder.body(Body::from(body.to_string())).unwrap()
	}

	async fn send(app: Router, request: Request<Body>) -> (StatusCode, Bytes) {
		let response = app.oneshot(request).await.unwrap();
		let status = response.status();
		let body = axum::body::to_bytes(response.into_body(), usize::MAX)
			.await
			.unwrap();
		(status, body)
	}

	fn json_body(body: &Bytes) -> Value {
		serde_json::from_slice(body).unwrap()
	}

	#[tokio::test]
	async fn test_out_of_domain_returns_no_action() {
		let (status, body) = send(
			router(None, None),
			provision_request(Some(SECRET), "jane@elsewhere.org", "APP_MANAGER"),
		)
		.await;

		assert_eq!(status, StatusCode::OK);
		assert_eq!(json_body(&body), json!({ "response": "NO_PROVISIONING_ACTION" }));
	}

	#[tokio::test]
	async fn test_invite_returns_no_content() {
		let (status, body) = send(
			router(None, None),
			provision_request(Some(SECRET), "jane@example.com", "APP_MANAGER"),
		)
		.await;

		assert_eq!(status, StatusCode::NO_CONTENT);
		assert!(body.is_empty());
	}

	#[tokio::test]
	async fn test_promote_returns_no_content() {
		let (status, _) = send(
			router(Some(vec!["VIEWER"]), None),
			provision_request(Some(SECRET), "jane@example.com", "APP_MANAGER"),
		)
		.await;

		assert_eq!(status, StatusCode::NO_CONTENT);
	}

	#[tokio::test]
	async fn test_admin_is_forbidden() {
		let (status, body) = send(
			router(Some(vec!["ADMIN"]), None),
			provision_request(Some(SECRET), "boss@example.com", "APP_MANAGER"),
		)
		.await;

		assert_eq!(status, StatusCode::FORBIDDEN);
		assert_eq!(json_body(&body)["error"], "privileged_account");
	}

	#[tokio::test]
	async fn test_missing_secret_is_unauthorized() {
		let (status, body) = send(
			router(None, None),
			provision_request(None, "jane@example.com", "APP_MANAGER"),
		)
		.await;

		assert_eq!(status, StatusCode::UNAUTHORIZED);
		assert_eq!(json_body(&body)["error"], "missing_secret");
	}

	#[tokio::test]
	async fn test_wrong_secret_is_unauthorized() {
		let (status, body) = send(
			router(None, None),
			provision_request(Some("nope"), "jane@example.com", "APP_MANAGER"),
		)
		.await;

		assert_eq!(status, StatusCode::UNAUTHORIZED);
		assert_eq!(json_body(&body)["error"], "secret_mismatch");
	}

	#[tokio::test]
	async fn test_unsupported_role_is_unprocessable() {
		let (status, _) = send(
			router(None, None),
			provision_request(Some(SECRET), "jane@example.com", "DEVELOPER"),
		)
		.await;

		assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
	}

	#[tokio::test]
	async fn test_malformed_body_is_bad_request() {
		let request = Request::builder()
			.method("POST")
			.uri("/provision")
			.header("Validation", SECRET)
			.body(Body::from("{not json"))
			.unwrap();

		let (status, body) = send(router(None, None), request).await;

		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(json_body(&body)["error"], "malformed_payload");
	}

	#[tokio::test]
	async fn test_upstream_failure_is_bad_gateway() {
		let (status, body) = send(
			router(None, Some(403)),
			provision_request(Some(SECRET), "jane@example.com", "APP_MANAGER"),
		)
		.await;

		assert_eq!(status, StatusCode::BAD_GATEWAY);
		assert_eq!(json_body(&body)["error"], "directory_error");
	}

	#[tokio::test]
	async fn test_health() {
		let request = Request::builder()
			.uri("/health")
			.body(Body::empty())
			.unwrap();

		let (status, body) = send(router(None, None), request).await;

		assert_eq!(status, StatusCode::OK);
		let body = json_body(&body);
		assert_eq!(body["status"], "ok");
		assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
	}

	#[test]
	fn test_status_mapping() {
		assert_eq!(
			status_for(&ProvisioningError::Upstream(AppStoreError::Signing(
				"bad".to_string()
			))),
			StatusCode::INTERNAL_SERVER_ERROR
		);
		assert_eq!(
			status_for(&ProvisioningError::DeadlineExceeded(
				std::time::Duration::from_secs(1)
			)),
			StatusCode::GATEWAY_TIMEOUT
		);
		assert_eq!(
			status_for(&ProvisioningError::Upstream(AppStoreError::PromotionFailed {
				status: 409,
				body: String::new(),
			})),
			StatusCode::BAD_GATEWAY
		);
	}
}
