//! Authenticated access to the platform-admin REST API.
//!
//! [RecordClient] is created per request from the shared [BackendConfig] and
//! the caller's [Session], and attaches the session's access token to every
//! call. Errors are classified so callers can tell an expired session apart
//! from a missing record or an unreachable backend. Nothing is retried.

mod auth;

pub use auth::{AuthError, Credentials, authenticate};

use std::{fmt, time::Duration};

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    pipeline::{Collection, Record, RecordId},
    session::Session,
};

/// The base URL of the production platform-admin API.
pub const DEFAULT_API_BASE_URL: &str = "https://potion.dev.gumisofts.com/platform_admin";

/// The default timeout for a single request to the backend.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the backend lives and the HTTP client used to reach it.
///
/// The client holds a connection pool, so create this once and clone it.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    base_url: String,
    http: Client,
}

impl BackendConfig {
    /// Create the config for the API at `base_url`, e.g.
    /// "https://example.com/platform_admin".
    ///
    /// # Errors
    /// Returns an [Error::HttpClient] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, Error> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| Error::HttpClient(error.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// The collections served by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Users,
    Transactions,
    Disputes,
    Businesses,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Users,
        ResourceKind::Transactions,
        ResourceKind::Disputes,
        ResourceKind::Businesses,
    ];

    /// The collection's path relative to the API base URL.
    pub fn collection_path(self) -> &'static str {
        match self {
            ResourceKind::Users => "all_users/",
            ResourceKind::Transactions => "transaction-records/",
            ResourceKind::Disputes => "dispute-records/",
            ResourceKind::Businesses => "business-records/",
        }
    }

    /// The field that identifies a record of this kind.
    pub fn id_field(self) -> &'static str {
        match self {
            ResourceKind::Users => "user_id",
            ResourceKind::Transactions | ResourceKind::Disputes | ResourceKind::Businesses => "id",
        }
    }

    /// The name of the kind as it appears in the dashboard's own URLs.
    pub fn slug(self) -> &'static str {
        match self {
            ResourceKind::Users => "users",
            ResourceKind::Transactions => "transactions",
            ResourceKind::Disputes => "disputes",
            ResourceKind::Businesses => "businesses",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// The ways a call to the backend can fail.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum TransportError {
    /// The backend rejected the access token. The session must be cleared.
    #[error("the backend rejected the session's access token")]
    Unauthorized,

    #[error("the backend could not find the requested resource")]
    NotFound,

    /// The request could not be sent or timed out.
    #[error("could not reach the backend: {0}")]
    Unreachable(String),

    #[error("the backend responded with the unexpected status {0}")]
    UnexpectedStatus(u16),

    #[error("could not parse the backend's response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            TransportError::InvalidResponse(error.to_string())
        } else {
            TransportError::Unreachable(error.to_string())
        }
    }
}

fn check_status(status: StatusCode) -> Result<(), TransportError> {
    match status {
        status if status.is_success() => Ok(()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(TransportError::Unauthorized),
        StatusCode::NOT_FOUND => Err(TransportError::NotFound),
        status => Err(TransportError::UnexpectedStatus(status.as_u16())),
    }
}

/// The HTTP method of a [Mutation].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationMethod {
    Patch,
    Post,
}

/// A state-transition call on a single record.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    pub method: MutationMethod,
    /// The action's path relative to the record, e.g. "move-to-review/".
    pub action: &'static str,
    pub body: Option<serde_json::Value>,
}

/// Issues authenticated requests on behalf of one session.
#[derive(Debug, Clone)]
pub struct RecordClient {
    backend: BackendConfig,
    session: Session,
}

impl RecordClient {
    pub fn new(backend: &BackendConfig, session: Session) -> Self {
        Self {
            backend: backend.clone(),
            session,
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(self.session.access_token())
    }

    /// Get every record of `kind`.
    ///
    /// # Errors
    /// Returns a [TransportError] classifying the failure. The error is never
    /// retried.
    pub async fn fetch_collection(&self, kind: ResourceKind) -> Result<Collection, TransportError> {
        let url = self.backend.url(kind.collection_path());
        tracing::debug!("Fetching {kind} from {url}");

        let response = self.authorized(self.backend.http.get(&url)).send().await?;
        check_status(response.status())?;

        let collection = response.json::<Collection>().await?;
        tracing::debug!("Fetched {} {kind}", collection.len());

        Ok(collection)
    }

    /// Run `mutation` on the record of `kind` identified by `id`.
    ///
    /// Returns the record echoed by the backend, if the response body was a
    /// JSON object.
    ///
    /// # Errors
    /// Returns a [TransportError] classifying the failure. The error is never
    /// retried.
    pub async fn mutate_record(
        &self,
        kind: ResourceKind,
        id: &RecordId,
        mutation: &Mutation,
    ) -> Result<Option<Record>, TransportError> {
        let url = self.backend.url(&format!(
            "{}{}/{}",
            kind.collection_path(),
            id.path_segment(),
            mutation.action
        ));
        tracing::debug!("Sending {:?} to {url}", mutation.method);

        let request = match mutation.method {
            MutationMethod::Patch => self.backend.http.patch(&url),
            MutationMethod::Post => self.backend.http.post(&url),
        };
        let request = match &mutation.body {
            Some(body) => request.json(body),
            None => request,
        };

        let response = self.authorized(request).send().await?;
        check_status(response.status())?;

        let body = response.text().await?;

        Ok(parse_echoed_record(&body))
    }
}

fn parse_echoed_record(body: &str) -> Option<Record> {
    if body.trim().is_empty() {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value @ serde_json::Value::Object(_)) => serde_json::from_value(value).ok(),
        Ok(_) => None,
        Err(error) => {
            tracing::debug!("Ignoring mutation response that is not JSON: {error}");
            None
        }
    }
}

#[cfg(test)]
mod record_client_tests {
    use axum::{
        Json, Router,
        extract::Path,
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::{get, patch, post},
    };
    use serde_json::{Value, json};

    use crate::{
        pipeline::{FieldValue, RecordId},
        session::Session,
        test_utils::{spawn_backend, unreachable_backend_url},
    };

    use super::{
        BackendConfig, DEFAULT_REQUEST_TIMEOUT, Mutation, MutationMethod, RecordClient,
        ResourceKind, TransportError,
    };

    const TOKEN: &str = "access-token";

    fn is_authorized(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            == Some(&format!("Bearer {TOKEN}"))
    }

    async fn list_disputes(headers: HeaderMap) -> impl IntoResponse {
        if !is_authorized(&headers) {
            return (StatusCode::UNAUTHORIZED, Json(json!({"detail": "bad token"})));
        }

        (
            StatusCode::OK,
            Json(json!([
                {"id": 1, "reportId": "REP001", "disputeAmount": 100.5},
                {"id": 2, "reportId": "REP002", "disputeAmount": 200.75}
            ])),
        )
    }

    fn client_for(base_url: &str, token: &str) -> RecordClient {
        let backend = BackendConfig::new(base_url, DEFAULT_REQUEST_TIMEOUT).unwrap();

        RecordClient::new(&backend, Session::new(token, None))
    }

    #[tokio::test]
    async fn fetches_collection_with_bearer_token() {
        let base_url =
            spawn_backend(Router::new().route("/dispute-records/", get(list_disputes))).await;
        let client = client_for(&base_url, TOKEN);

        let disputes = client
            .fetch_collection(ResourceKind::Disputes)
            .await
            .unwrap();

        assert_eq!(disputes.len(), 2);
        assert_eq!(
            disputes[1].get("reportId"),
            Some(&FieldValue::Text("REP002".to_owned()))
        );
    }

    #[tokio::test]
    async fn rejected_token_is_unauthorized() {
        let base_url =
            spawn_backend(Router::new().route("/dispute-records/", get(list_disputes))).await;
        let client = client_for(&base_url, "stale-token");

        let result = client.fetch_collection(ResourceKind::Disputes).await;

        assert_eq!(result, Err(TransportError::Unauthorized));
    }

    #[tokio::test]
    async fn forbidden_is_unauthorized() {
        let base_url = spawn_backend(
            Router::new().route("/all_users/", get(|| async { StatusCode::FORBIDDEN })),
        )
        .await;
        let client = client_for(&base_url, TOKEN);

        let result = client.fetch_collection(ResourceKind::Users).await;

        assert_eq!(result, Err(TransportError::Unauthorized));
    }

    #[tokio::test]
    async fn missing_route_is_not_found() {
        let base_url = spawn_backend(Router::new()).await;
        let client = client_for(&base_url, TOKEN);

        let result = client.fetch_collection(ResourceKind::Businesses).await;

        assert_eq!(result, Err(TransportError::NotFound));
    }

    #[tokio::test]
    async fn server_error_is_unexpected_status() {
        let base_url = spawn_backend(Router::new().route(
            "/transaction-records/",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        ))
        .await;
        let client = client_for(&base_url, TOKEN);

        let result = client.fetch_collection(ResourceKind::Transactions).await;

        assert_eq!(result, Err(TransportError::UnexpectedStatus(500)));
    }

    #[tokio::test]
    async fn malformed_body_is_invalid_response() {
        let base_url = spawn_backend(Router::new().route(
            "/dispute-records/",
            get(|| async { Json(json!({"not": "a list"})) }),
        ))
        .await;
        let client = client_for(&base_url, TOKEN);

        let result = client.fetch_collection(ResourceKind::Disputes).await;

        assert!(
            matches!(result, Err(TransportError::InvalidResponse(_))),
            "want invalid response error, got {result:?}"
        );
    }

    #[tokio::test]
    async fn closed_port_is_unreachable() {
        let client = client_for(&unreachable_backend_url().await, TOKEN);

        let result = client.fetch_collection(ResourceKind::Disputes).await;

        assert!(
            matches!(result, Err(TransportError::Unreachable(_))),
            "want unreachable error, got {result:?}"
        );
    }

    #[tokio::test]
    async fn patches_record_with_body() {
        let base_url = spawn_backend(Router::new().route(
            "/business-records/{id}/verify",
            patch(
                |Path(id): Path<String>, headers: HeaderMap, Json(body): Json<Value>| async move {
                    if !is_authorized(&headers) {
                        return StatusCode::UNAUTHORIZED.into_response();
                    }

                    Json(json!({"id": id, "verificationStatus": body["verificationStatus"]}))
                        .into_response()
                },
            ),
        ))
        .await;
        let client = client_for(&base_url, TOKEN);
        let mutation = Mutation {
            method: MutationMethod::Patch,
            action: "verify",
            body: Some(json!({"verificationStatus": "approved"})),
        };

        let echoed = client
            .mutate_record(ResourceKind::Businesses, &RecordId::new("9"), &mutation)
            .await
            .unwrap()
            .expect("want the echoed record");

        assert_eq!(echoed.id("id"), Some(RecordId::new("9")));
        assert_eq!(
            echoed.get("verificationStatus"),
            Some(&FieldValue::Text("approved".to_owned()))
        );
    }

    #[tokio::test]
    async fn record_id_is_sent_as_one_path_segment() {
        let base_url = spawn_backend(Router::new().route(
            "/dispute-records/{id}/move-to-review/",
            patch(|Path(id): Path<String>| async move { Json(json!({"id": id})) }),
        ))
        .await;
        let client = client_for(&base_url, TOKEN);
        let mutation = Mutation {
            method: MutationMethod::Patch,
            action: "move-to-review/",
            body: None,
        };

        let echoed = client
            .mutate_record(ResourceKind::Disputes, &RecordId::new("a/b?c d"), &mutation)
            .await
            .unwrap()
            .expect("want the echoed record");

        assert_eq!(echoed.id("id"), Some(RecordId::new("a/b?c d")));
    }

    #[tokio::test]
    async fn empty_mutation_response_is_none() {
        let base_url = spawn_backend(Router::new().route(
            "/business-records/{id}/request-more-info",
            post(|| async { StatusCode::NO_CONTENT }),
        ))
        .await;
        let client = client_for(&base_url, TOKEN);
        let mutation = Mutation {
            method: MutationMethod::Post,
            action: "request-more-info",
            body: None,
        };

        let echoed = client
            .mutate_record(ResourceKind::Businesses, &RecordId::new("9"), &mutation)
            .await;

        assert_eq!(echoed, Ok(None));
    }

    #[test]
    fn base_url_trailing_slash_is_ignored() {
        let backend =
            BackendConfig::new("http://localhost:1/platform_admin/", DEFAULT_REQUEST_TIMEOUT)
                .unwrap();

        assert_eq!(
            backend.url(ResourceKind::Users.collection_path()),
            "http://localhost:1/platform_admin/all_users/"
        );
    }
}
