//! Exchanges an administrator's phone number and password for API tokens.

use serde::{Deserialize, Serialize};

use crate::session::Session;

use super::BackendConfig;

const LOG_IN_PATH: &str = "admin_platform_login/";

/// The credentials entered on the log-in form.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub phone_number: String,
    pub password: String,
}

#[derive(Deserialize)]
struct LogInResponse {
    access: Option<String>,
    refresh: Option<String>,
}

/// Why a log-in attempt did not produce a [Session].
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum AuthError {
    /// The backend rejected the phone number or password.
    #[error("the phone number or password is incorrect")]
    InvalidCredentials,

    /// The backend accepted the request but did not return an access token.
    #[error("the log-in response did not contain an access token")]
    InvalidResponse,

    #[error("could not reach the backend: {0}")]
    Unreachable(String),

    #[error("the backend responded with the unexpected status {0}")]
    UnexpectedStatus(u16),
}

/// Log in to the backend with `credentials`.
///
/// Nothing is stored here, the caller decides where the returned [Session]
/// lives.
///
/// # Errors
/// Returns an [AuthError] if the credentials are rejected, the response has no
/// access token, or the backend cannot be reached.
pub async fn authenticate(
    backend: &BackendConfig,
    credentials: &Credentials,
) -> Result<Session, AuthError> {
    let url = backend.url(LOG_IN_PATH);

    let response = backend
        .http
        .post(&url)
        .json(credentials)
        .send()
        .await
        .map_err(|error| AuthError::Unreachable(error.to_string()))?;

    let status = response.status();
    if status.is_client_error() {
        tracing::debug!("Log-in rejected with status {status}");
        return Err(AuthError::InvalidCredentials);
    } else if !status.is_success() {
        return Err(AuthError::UnexpectedStatus(status.as_u16()));
    }

    let body = response
        .json::<LogInResponse>()
        .await
        .map_err(|error| {
            tracing::warn!("Could not parse log-in response: {error}");
            AuthError::InvalidResponse
        })?;

    match body.access {
        Some(access) if !access.is_empty() => Ok(Session::new(access, body.refresh)),
        _ => Err(AuthError::InvalidResponse),
    }
}

#[cfg(test)]
mod authenticate_tests {
    use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::post};
    use serde_json::{Value, json};

    use crate::{
        session::Session,
        test_utils::{spawn_backend, unreachable_backend_url},
        transport::{BackendConfig, DEFAULT_REQUEST_TIMEOUT},
    };

    use super::{AuthError, Credentials, authenticate};

    async fn log_in(Json(body): Json<Value>) -> impl IntoResponse {
        if body["phone_number"] == "0911000000" && body["password"] == "hunter2" {
            (
                StatusCode::OK,
                Json(json!({"access": "access-token", "refresh": "refresh-token"})),
            )
        } else {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({"detail": "No active account found"})),
            )
        }
    }

    async fn backend() -> BackendConfig {
        let base_url =
            spawn_backend(Router::new().route("/admin_platform_login/", post(log_in))).await;

        BackendConfig::new(&base_url, DEFAULT_REQUEST_TIMEOUT).unwrap()
    }

    fn credentials(password: &str) -> Credentials {
        Credentials {
            phone_number: "0911000000".to_owned(),
            password: password.to_owned(),
        }
    }

    #[tokio::test]
    async fn valid_credentials_create_session() {
        let backend = backend().await;

        let session = authenticate(&backend, &credentials("hunter2")).await.unwrap();

        assert_eq!(
            session,
            Session::new("access-token", Some("refresh-token".to_owned()))
        );
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let backend = backend().await;

        let result = authenticate(&backend, &credentials("wrong")).await;

        assert_eq!(result, Err(AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn missing_access_token_is_invalid_response() {
        let base_url = spawn_backend(Router::new().route(
            "/admin_platform_login/",
            post(|| async { Json(json!({"refresh": "refresh-token"})) }),
        ))
        .await;
        let backend = BackendConfig::new(&base_url, DEFAULT_REQUEST_TIMEOUT).unwrap();

        let result = authenticate(&backend, &credentials("hunter2")).await;

        assert_eq!(result, Err(AuthError::InvalidResponse));
    }

    #[tokio::test]
    async fn missing_refresh_token_is_allowed() {
        let base_url = spawn_backend(Router::new().route(
            "/admin_platform_login/",
            post(|| async { Json(json!({"access": "access-token"})) }),
        ))
        .await;
        let backend = BackendConfig::new(&base_url, DEFAULT_REQUEST_TIMEOUT).unwrap();

        let session = authenticate(&backend, &credentials("hunter2")).await.unwrap();

        assert_eq!(session, Session::new("access-token", None));
    }

    #[tokio::test]
    async fn closed_port_is_unreachable() {
        let backend =
            BackendConfig::new(&unreachable_backend_url().await, DEFAULT_REQUEST_TIMEOUT).unwrap();

        let result = authenticate(&backend, &credentials("hunter2")).await;

        assert!(
            matches!(result, Err(AuthError::Unreachable(_))),
            "want unreachable error, got {result:?}"
        );
    }
}
