//! Implements a struct that holds the state of the dashboard server.

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{list_store::ListStore, session::DEFAULT_COOKIE_DURATION, transport::BackendConfig};

/// The state of the dashboard server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,

    /// The local timezone as a canonical timezone name, e.g. "Africa/Addis_Ababa".
    pub local_timezone: String,

    /// Where the platform-admin API lives.
    pub backend: BackendConfig,

    /// The list views of every logged in session.
    pub list_store: ListStore,
}

impl AppState {
    /// Create a new [AppState] with no open list views.
    ///
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Africa/Addis_Ababa".
    pub fn new(cookie_secret: &str, local_timezone: &str, backend: BackendConfig) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: local_timezone.to_owned(),
            backend,
            list_store: ListStore::default(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret`s string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}
