//! Works out where to send an administrator after they log in.

use axum::{extract::Request, http::Uri};

use crate::endpoints;

/// Only same-origin, absolute paths are allowed, and never the log-in page
/// itself.
fn is_safe_redirect_target(path_and_query: &str) -> bool {
    if !path_and_query.starts_with('/') || path_and_query.starts_with("//") {
        return false;
    }

    let path = path_and_query
        .split_once('?')
        .map_or(path_and_query, |(path, _)| path);

    path != endpoints::LOG_IN_VIEW
}

/// Reduce `raw_url` to a safe path and query, rejecting URLs that point at
/// another origin.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }

    let path_and_query = uri.path_and_query()?.as_str();

    is_safe_redirect_target(path_and_query).then(|| path_and_query.to_owned())
}

/// htmx sends the full URL of the page in `HX-Current-URL`, so the origin is
/// dropped rather than rejected.
fn normalize_hx_current_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    let path_and_query = uri.path_and_query()?.as_str();

    is_safe_redirect_target(path_and_query).then(|| path_and_query.to_owned())
}

/// The page the request was made from.
///
/// For htmx calls to `/api` routes this is the page that made the call, for
/// everything else it is the requested URL.
fn redirect_target(request: &Request) -> Option<String> {
    if !request.uri().path().starts_with("/api") {
        return normalize_redirect_url(request.uri().path_and_query()?.as_str());
    }

    let headers = request.headers();
    let is_hx_request = headers
        .get("hx-request")
        .and_then(|header| header.to_str().ok())
        .is_some_and(|header| header.eq_ignore_ascii_case("true"));

    if !is_hx_request {
        tracing::warn!("Missing HX-Request header for /api request.");
        return None;
    }

    let current_url = headers
        .get("hx-current-url")
        .and_then(|header| header.to_str().ok());

    match current_url {
        Some(current_url) => {
            let target = normalize_hx_current_url(current_url);
            if target.is_none() {
                tracing::warn!("Invalid HX-Current-URL header value: {current_url}");
            }
            target
        }
        None => {
            tracing::warn!("Missing HX-Current-URL header for /api request.");
            None
        }
    }
}

/// The log-in page URL with `redirect_target` as its `redirect_url` query
/// parameter.
pub fn log_in_url_with_redirect(redirect_target: &str) -> String {
    match serde_urlencoded::to_string([("redirect_url", redirect_target)]) {
        Ok(query) => format!("{}?{query}", endpoints::LOG_IN_VIEW),
        Err(error) => {
            tracing::error!("Could not encode redirect URL {redirect_target}: {error}");
            endpoints::LOG_IN_VIEW.to_owned()
        }
    }
}

/// The log-in page URL that returns the administrator to the page `request`
/// came from, falling back to the dashboard.
pub fn log_in_url_for_request(request: &Request) -> String {
    let target = redirect_target(request).unwrap_or_else(|| {
        tracing::warn!(
            "Could not get redirect URL from request to {}. Falling back to dashboard.",
            request.uri().path()
        );
        endpoints::DASHBOARD_VIEW.to_owned()
    });

    log_in_url_with_redirect(&target)
}
