//! Alert system for displaying success and error messages to users.
//!
//! Alerts are rendered into the page's `#alert-container`, either as the
//! target of a failed htmx request or as an out-of-band swap next to the
//! fragment a successful request returns.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use maud::{Markup, html};

/// A message shown to the user after a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    Success { message: String, details: String },
    SuccessSimple { message: String },
    Error { message: String, details: String },
    ErrorSimple { message: String },
}

impl Alert {
    fn is_success(&self) -> bool {
        matches!(self, Alert::Success { .. } | Alert::SuccessSimple { .. })
    }

    fn message(&self) -> &str {
        match self {
            Alert::Success { message, .. }
            | Alert::SuccessSimple { message }
            | Alert::Error { message, .. }
            | Alert::ErrorSimple { message } => message,
        }
    }

    fn details(&self) -> Option<&str> {
        match self {
            Alert::Success { details, .. } | Alert::Error { details, .. } => Some(details),
            Alert::SuccessSimple { .. } | Alert::ErrorSimple { .. } => None,
        }
    }

    pub fn into_html(self) -> Markup {
        let style = if self.is_success() {
            "flex items-start gap-3 p-4 mb-4 rounded-lg text-green-800 bg-green-50 \
            border border-green-300 dark:bg-gray-800 dark:text-green-400 dark:border-green-800"
        } else {
            "flex items-start gap-3 p-4 mb-4 rounded-lg text-red-800 bg-red-50 \
            border border-red-300 dark:bg-gray-800 dark:text-red-400 dark:border-red-800"
        };

        html! {
            div role="alert" class=(style)
            {
                div class="flex-1"
                {
                    p class="font-semibold" { (self.message()) }

                    @if let Some(details) = self.details() {
                        p class="text-sm" { (details) }
                    }
                }

                button
                    type="button"
                    aria-label="Dismiss"
                    class="text-lg leading-none"
                    onclick="this.closest('[role=alert]').remove()"
                {
                    "×"
                }
            }
        }
    }

    /// Render the alert so that htmx swaps it into the alert container
    /// alongside the main response.
    pub fn into_oob_html(self) -> Markup {
        html! {
            div id="alert-container" hx-swap-oob="innerHTML"
            {
                (self.into_html())
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        let status = if self.is_success() {
            StatusCode::OK
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        (status, Html(self.into_html().into_string())).into_response()
    }
}

#[cfg(test)]
mod alert_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use scraper::Html;

    use crate::test_utils::{assert_valid_html, parse_html_fragment, select_text};

    use super::Alert;

    #[tokio::test]
    async fn success_alert_is_ok() {
        let response = Alert::SuccessSimple {
            message: "Dispute escalated".to_owned(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert_eq!(
            select_text(&html, "[role=alert] p"),
            vec!["Dispute escalated"]
        );
    }

    #[tokio::test]
    async fn error_alert_shows_details() {
        let response = Alert::Error {
            message: "Could not load disputes".to_owned(),
            details: "Try again later.".to_owned(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let html = parse_html_fragment(response).await;
        assert_eq!(
            select_text(&html, "[role=alert] p"),
            vec!["Could not load disputes", "Try again later."]
        );
    }

    #[test]
    fn out_of_band_alert_targets_container() {
        let markup = Alert::ErrorSimple {
            message: "Oops".to_owned(),
        }
        .into_oob_html()
        .into_string();
        let html = Html::parse_fragment(&markup);

        let container = html
            .select(&scraper::Selector::parse("#alert-container").unwrap())
            .next()
            .expect("want alert container");
        assert_eq!(container.value().attr("hx-swap-oob"), Some("innerHTML"));
    }
}
