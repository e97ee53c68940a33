//! This file defines the routes for displaying the log-in page and handling log-in requests.
//! The backend checks the credentials, this module only stores the tokens it returns.

use axum::{
    Form,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, loading_spinner,
        log_in_card, password_input,
    },
    transport::{AuthError, BackendConfig, Credentials, authenticate},
};

use super::{
    cookie::{invalidate_session_cookie, set_session_cookie},
    redirect::normalize_redirect_url,
};

fn log_in_form(
    phone_number: &str,
    error_message: Option<&str>,
    redirect_url: Option<&str>,
) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN_API)
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#phone_number, #password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            div
            {
                label for="phone_number" class=(FORM_LABEL_STYLE) { "Phone number" }

                input
                    type="tel"
                    name="phone_number"
                    id="phone_number"
                    placeholder="09XXXXXXXX"
                    autocomplete="username"
                    value=(phone_number)
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    autofocus;
            }

            (password_input(error_message))

            div class="flex items-center gap-x-3"
            {
                input
                    type="checkbox"
                    name="remember_me"
                    id="remember_me"
                    tabindex="0"
                    class="rounded-xs";

                label
                    for="remember_me"
                    class="block text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Keep me logged in for one week"
                }
            }

            button
                type="submit" id="submit-button" tabindex="0"
                class={ "w-full " (BUTTON_PRIMARY_STYLE) }
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Log in"
            }
        }
    }
}

fn parse_redirect_url(raw_url: Option<&str>, source: &str) -> Option<String> {
    match raw_url.and_then(normalize_redirect_url) {
        Some(redirect_url) => Some(redirect_url),
        None => {
            if let Some(redirect_url) = raw_url {
                tracing::warn!("Invalid redirect URL from {source}: {redirect_url}");
            }
            None
        }
    }
}

#[derive(Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

/// Display the log-in page.
pub async fn get_log_in_page(Query(query): Query<RedirectQuery>) -> Response {
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "log-in query");
    let log_in_form = log_in_form("", None, redirect_url.as_deref());
    let content = log_in_card("Log in to your account", &log_in_form);

    base("Log In", &content).into_response()
}

/// How long the session cookie should last if the administrator selects
/// "remember me" at log-in.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// The state needed to perform a log-in.
#[derive(Debug, Clone)]
pub struct LogInState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which the session cookie is valid.
    pub cookie_duration: Duration,
    pub backend: BackendConfig,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            backend: state.backend.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LogInState> for Key {
    fn from_ref(state: &LogInState) -> Self {
        state.cookie_key.clone()
    }
}

pub const INVALID_CREDENTIALS_ERROR_MSG: &str =
    "Invalid phone number or password. Please try again.";
pub const INVALID_RESPONSE_ERROR_MSG: &str = "Invalid response from server. Please try again.";
pub const UNREACHABLE_ERROR_MSG: &str =
    "Could not reach the server. Please try again in a few minutes.";

/// The raw data entered by the administrator in the log-in form.
#[derive(Clone, Deserialize)]
pub struct LogInData {
    pub phone_number: String,

    pub password: String,

    /// Whether to extend the initial session cookie duration.
    ///
    /// This value comes from a checkbox, so it either has a string value or is not set
    /// (see the [MDN docs](https://developer.mozilla.org/en-US/docs/Web/HTML/Element/input/checkbox#value_2)).
    /// The `Some` variant should be interpreted as `true` irregardless of the
    /// string value, and the `None` variant should be interpreted as `false`.
    pub remember_me: Option<String>,

    /// Optional URL to redirect to after logging in.
    pub redirect_url: Option<String>,
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, the session cookie is set and the client
/// is redirected to the dashboard page, or the page they were sent away from.
/// Otherwise, the form is returned with an error message explaining the
/// problem and the phone number already filled in.
pub async fn post_log_in(
    State(state): State<LogInState>,
    jar: PrivateCookieJar,
    Form(form): Form<LogInData>,
) -> Response {
    let redirect_url = parse_redirect_url(form.redirect_url.as_deref(), "log-in form");
    let redirect_url = redirect_url.as_deref();
    let phone_number = form.phone_number.trim().to_owned();

    let credentials = Credentials {
        phone_number: phone_number.clone(),
        password: form.password,
    };

    let session = match authenticate(&state.backend, &credentials).await {
        Ok(session) => session,
        Err(error) => {
            let message = match error {
                AuthError::InvalidCredentials => {
                    tracing::info!("Log-in rejected for {phone_number}");
                    INVALID_CREDENTIALS_ERROR_MSG
                }
                AuthError::InvalidResponse => {
                    tracing::error!("Log-in response did not contain an access token");
                    INVALID_RESPONSE_ERROR_MSG
                }
                AuthError::Unreachable(_) | AuthError::UnexpectedStatus(_) => {
                    tracing::error!("Could not log in: {error}");
                    UNREACHABLE_ERROR_MSG
                }
            };

            return log_in_form(&phone_number, Some(message), redirect_url).into_response();
        }
    };

    let cookie_duration = if form.remember_me.is_some() {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    let redirect_url = redirect_url.unwrap_or(endpoints::DASHBOARD_VIEW);

    set_session_cookie(jar.clone(), session, cookie_duration)
        .map(|updated_jar| {
            (
                StatusCode::SEE_OTHER,
                HxRedirect(redirect_url.to_owned()),
                updated_jar,
            )
        })
        .map_err(|err| {
            tracing::error!("Error setting session cookie: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_session_cookie(jar),
            )
        })
        .into_response()
}
