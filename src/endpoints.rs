//! The route URIs served by the dashboard.
//!
//! For endpoints that take parameters, e.g., '/api/records/{kind}/search', use
//! [format_endpoint].

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The landing page for logged in administrators.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page listing every customer.
pub const CUSTOMERS_VIEW: &str = "/customers";
/// The page listing every transaction.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page listing every dispute.
pub const DISPUTES_VIEW: &str = "/disputes";
/// The page listing every business account.
pub const BUSINESSES_VIEW: &str = "/businesses";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for logging in an administrator.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current administrator.
pub const LOG_OUT: &str = "/api/log_out";
/// Set the search term of a list view.
pub const RECORDS_SEARCH: &str = "/api/records/{kind}/search";
/// Sort a list view by a column.
pub const RECORDS_SORT: &str = "/api/records/{kind}/sort";
/// Change the selected rows of a list view.
pub const RECORDS_SELECTION: &str = "/api/records/{kind}/selection";
/// Switch the status tab of a list view.
pub const RECORDS_TAB: &str = "/api/records/{kind}/tab";
/// Fetch a list view's collection again.
pub const RECORDS_RELOAD: &str = "/api/records/{kind}/reload";
/// Get a record's detail modal, or run an action on the record.
pub const RECORD_ACTIONS: &str = "/api/records/{kind}/{record_id}/actions";

/// Replace the parameters in `endpoint_path` with `values`, in order.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/records/{kind}/sort', '{kind}' is
/// the parameter.
///
/// Parameters without a matching value are left as they are, and extra values
/// are ignored.
pub fn format_endpoint(endpoint_path: &str, values: &[&str]) -> String {
    let mut formatted = String::with_capacity(endpoint_path.len());
    let mut values = values.iter();
    let mut rest = endpoint_path;

    while let Some(param_start) = rest.find('{') {
        let Some(param_length) = rest[param_start..].find('}') else {
            break;
        };
        let param_end = param_start + param_length + 1;

        formatted.push_str(&rest[..param_start]);

        match values.next() {
            Some(value) => formatted.push_str(value),
            None => formatted.push_str(&rest[param_start..param_end]),
        }

        rest = &rest[param_end..];
    }

    formatted.push_str(rest);
    formatted
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok(), "{uri} is not a valid URI");
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::ROOT);
        assert_endpoint_is_valid_uri(endpoints::DASHBOARD_VIEW);
        assert_endpoint_is_valid_uri(endpoints::CUSTOMERS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::DISPUTES_VIEW);
        assert_endpoint_is_valid_uri(endpoints::BUSINESSES_VIEW);
        assert_endpoint_is_valid_uri(endpoints::LOG_IN_VIEW);
        assert_endpoint_is_valid_uri(endpoints::INTERNAL_ERROR_VIEW);
        assert_endpoint_is_valid_uri(endpoints::STATIC);

        assert_endpoint_is_valid_uri(endpoints::LOG_IN_API);
        assert_endpoint_is_valid_uri(endpoints::LOG_OUT);
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::RECORDS_SEARCH, &["users"]));
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::RECORDS_SORT, &["users"]));
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::RECORDS_SELECTION, &["users"]));
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::RECORDS_TAB, &["disputes"]));
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::RECORDS_RELOAD, &["users"]));
        assert_endpoint_is_valid_uri(&format_endpoint(
            endpoints::RECORD_ACTIONS,
            &["disputes", "3"],
        ));
    }

    #[test]
    fn replaces_single_parameter() {
        let formatted_path = format_endpoint("/hello/{world_id}", &["1"]);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn replaces_parameters_in_order() {
        let formatted_path = format_endpoint(endpoints::RECORD_ACTIONS, &["businesses", "7"]);

        assert_eq!(formatted_path, "/api/records/businesses/7/actions");
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", &["1"]);

        assert_eq!(formatted_path, "/hello/world");
    }

    #[test]
    fn keeps_parameters_without_values() {
        let formatted_path = format_endpoint("/hello/{world}/{id}", &["earth"]);

        assert_eq!(formatted_path, "/hello/earth/{id}");
    }
}
