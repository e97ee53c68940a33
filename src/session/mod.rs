//! Administrator sessions: the encrypted session cookie, the middleware that
//! guards the dashboard's routes and the log-in and log-out handlers.

pub(crate) mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod redirect;
mod token;

pub use cookie::DEFAULT_COOKIE_DURATION;
pub(crate) use cookie::invalidate_session_cookie;
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{AuthState, auth_guard, auth_guard_hx};
pub use redirect::{log_in_url_for_request, log_in_url_with_redirect, normalize_redirect_url};
pub use token::{Session, SessionKey, Token};
