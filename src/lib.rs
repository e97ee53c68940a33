//! Potion Admin is a web dashboard for the staff of the Potion payments
//! platform.
//!
//! This library serves HTML pages that list the platform's customers,
//! transactions, disputes and business accounts, and lets staff act on
//! disputes and business verification through the platform-admin REST API.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod dashboard;
mod dispatch;
mod endpoints;
mod html;
mod internal_server_error;
mod list_store;
mod logging;
mod navigation;
mod not_found;
mod pipeline;
mod records;
mod routing;
mod session;
mod timezone;
mod transport;

#[cfg(test)]
mod test_utils;

pub use app_state::{AppState, create_cookie_key};
pub use list_store::ListStore;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use timezone::get_local_offset;
pub use transport::{BackendConfig, DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT};

use crate::{
    alert::Alert, internal_server_error::InternalServerError,
    not_found::get_404_not_found_response, pipeline::RecordId,
    transport::{ResourceKind, TransportError},
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The session cookie is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// The session cookie could be decrypted but does not hold a token.
    #[error("could not read the session cookie: {0}")]
    InvalidSessionCookie(String),

    /// The session's expiry has passed.
    #[error("the session has expired")]
    SessionExpired,

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Adding a duration to a date time overflowed.
    #[error("could not compute the cookie expiry date time")]
    DateError,

    /// The HTTP client for the backend could not be created.
    #[error("could not create the HTTP client: {0}")]
    HttpClient(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the list store lock
    #[error("could not acquire the list store lock")]
    ListStoreLock,

    /// The list page has no tab with the given slug.
    #[error("unknown tab \"{0}\"")]
    UnknownTab(String),

    /// The list page has no column with the given key.
    #[error("cannot sort by \"{0}\"")]
    UnknownSortKey(String),

    /// A toggle of the selection did not say which row to toggle.
    #[error("no record ID given for the selection toggle")]
    InvalidSelection,

    /// The action label is not one of the actions for the resource kind.
    #[error("\"{label}\" is not an action for {kind}")]
    UnknownAction {
        /// The kind of record the action was requested for.
        kind: ResourceKind,
        /// The label that was sent.
        label: String,
    },

    /// The record is not in the session's cached list.
    ///
    /// The client should reload the page, since the record may have been
    /// removed by an earlier reload.
    #[error("record {0} is not in the list")]
    RecordNotFound(RecordId),

    /// The backend refused or could not run an action.
    #[error("{action} failed: {error}")]
    ActionFailed {
        /// The label of the action.
        action: &'static str,
        /// Why the call failed.
        error: TransportError,
    },

    /// A call to the backend failed.
    #[error(transparent)]
    Transport(TransportError),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::RecordNotFound(_) => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
                ..Default::default()
            }
            .into_response(),
            Error::Transport(TransportError::Unreachable(_)) => InternalServerError {
                status: StatusCode::BAD_GATEWAY,
                description: "Could not reach the platform",
                fix: "Check your connection and reload the page.",
            }
            .into_response(),
            Error::ListStoreLock => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

fn alert_response(status: StatusCode, message: &str, details: &str) -> Response {
    let alert = Alert::Error {
        message: message.to_owned(),
        details: details.to_owned(),
    };

    (status, Html(alert.into_html().into_string())).into_response()
}

/// Details for a failed backend call that staff can act on.
fn transport_error_details(error: &TransportError) -> &'static str {
    match error {
        TransportError::Unauthorized => "Your session has expired. Log in again.",
        TransportError::NotFound => {
            "The platform could not find the record. Reload the page to see if it still exists."
        }
        TransportError::Unreachable(_) => {
            "The platform could not be reached. Check your connection and try again."
        }
        TransportError::UnexpectedStatus(_) | TransportError::InvalidResponse(_) => {
            "The platform sent an unexpected response. Try again later."
        }
    }
}

impl Error {
    /// Render the error as an alert for htmx requests, which swap it into
    /// the page's alert container.
    fn into_alert_response(self) -> Response {
        match self {
            Error::InvalidTimezoneError(timezone) => alert_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Invalid Timezone Settings",
                &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            ),
            Error::UnknownTab(tab) => alert_response(
                StatusCode::BAD_REQUEST,
                "Unknown tab",
                &format!("This list has no \"{tab}\" tab."),
            ),
            Error::UnknownSortKey(key) => alert_response(
                StatusCode::BAD_REQUEST,
                "Cannot sort",
                &format!("This list has no \"{key}\" column."),
            ),
            Error::InvalidSelection => alert_response(
                StatusCode::BAD_REQUEST,
                "Could not change the selection",
                "No row was given. Reload the page and try again.",
            ),
            Error::UnknownAction { kind, label } => alert_response(
                StatusCode::BAD_REQUEST,
                "Unknown action",
                &format!("\"{label}\" cannot be done to {kind}."),
            ),
            Error::RecordNotFound(id) => alert_response(
                StatusCode::NOT_FOUND,
                "Record not found",
                &format!(
                    "Record {id} is no longer in this list. \
                    Reload the page to see the latest records."
                ),
            ),
            Error::ActionFailed { action, error } => {
                tracing::error!("{action} failed: {error}");
                let status = match error {
                    TransportError::NotFound => StatusCode::NOT_FOUND,
                    _ => StatusCode::BAD_GATEWAY,
                };

                alert_response(
                    status,
                    &format!("{action} failed"),
                    transport_error_details(&error),
                )
            }
            Error::Transport(error) => alert_response(
                StatusCode::BAD_GATEWAY,
                "Could not load records",
                transport_error_details(&error),
            ),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                alert_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong",
                    "An unexpected error occurred, check the server logs for more details.",
                )
            }
        }
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{
        Error,
        pipeline::RecordId,
        test_utils::{parse_html_fragment, select_text},
        transport::{ResourceKind, TransportError},
    };

    #[tokio::test]
    async fn failed_action_alert_names_action() {
        let response = Error::ActionFailed {
            action: "Escalate",
            error: TransportError::UnexpectedStatus(500),
        }
        .into_alert_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let html = parse_html_fragment(response).await;
        assert_eq!(
            select_text(&html, "[role=alert] p.font-semibold"),
            vec!["Escalate failed"]
        );
    }

    #[test]
    fn client_mistakes_are_bad_requests() {
        let errors = [
            Error::UnknownTab("archived".to_owned()),
            Error::UnknownSortKey("password".to_owned()),
            Error::InvalidSelection,
            Error::UnknownAction {
                kind: ResourceKind::Users,
                label: "Approve".to_owned(),
            },
        ];

        for error in errors {
            assert_eq!(
                error.into_alert_response().status(),
                StatusCode::BAD_REQUEST
            );
        }
    }

    #[test]
    fn missing_record_page_is_not_found() {
        let response = Error::RecordNotFound(RecordId::new("7")).into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn unexpected_errors_are_internal() {
        assert_eq!(
            Error::ListStoreLock.into_alert_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::ListStoreLock.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
