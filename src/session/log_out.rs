//! Log-out route handler that expires the session cookie, discards the
//! session's list state and redirects to the log-in page.

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};

use crate::{AppState, endpoints, list_store::ListStore};

use super::cookie::{get_token_from_cookies, invalidate_session_cookie};

/// The state needed to log out.
#[derive(Debug, Clone)]
pub struct LogOutState {
    pub cookie_key: Key,
    pub list_store: ListStore,
}

impl FromRef<AppState> for LogOutState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            list_store: state.list_store.clone(),
        }
    }
}

impl FromRef<LogOutState> for Key {
    fn from_ref(state: &LogOutState) -> Self {
        state.cookie_key.clone()
    }
}

/// Invalidate the session cookie and redirect the client to the log-in page.
///
/// Works with or without a valid session so that a stale tab can always log
/// out.
pub async fn get_log_out(State(state): State<LogOutState>, jar: PrivateCookieJar) -> Response {
    let evicted = get_token_from_cookies(&jar)
        .ok()
        .map(|token| state.list_store.evict_session(&token.session.key()));
    if let Some(Err(error)) = evicted {
        tracing::error!("Could not discard list state on log out: {error}");
    }

    let jar = invalidate_session_cookie(jar);

    (jar, Redirect::to(endpoints::LOG_IN_VIEW)).into_response()
}
