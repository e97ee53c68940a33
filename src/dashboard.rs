//! The landing page shown after logging in, with one card per collection.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

use crate::{
    endpoints,
    html::{PAGE_CONTAINER_STYLE, base, link},
    navigation::NavBar,
    records::table_config,
    transport::ResourceKind,
};

fn description(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Users => "Phone numbers, verification and subscription spend.",
        ResourceKind::Transactions => "Every payment made between users.",
        ResourceKind::Disputes => "Reports to review, escalate or refund.",
        ResourceKind::Businesses => "Accounts waiting for verification.",
    }
}

fn collection_card(kind: ResourceKind) -> Markup {
    let config = table_config(kind);

    html! {
        a
            href=(config.page)
            class="block p-6 bg-white border border-gray-200 rounded-lg shadow-sm
                hover:bg-gray-100 dark:bg-gray-800 dark:border-gray-700 dark:hover:bg-gray-700"
        {
            h2 class="mb-2 text-lg font-semibold text-gray-900 dark:text-white" { (config.title) }
            p class="text-sm text-gray-600 dark:text-gray-400" { (description(kind)) }
        }
    }
}

/// Display a page linking to each list page.
pub async fn get_dashboard_page() -> Response {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-4xl space-y-6"
            {
                h1 class="text-xl font-bold" { "Dashboard" }

                div class="grid gap-4 sm:grid-cols-2"
                {
                    @for kind in ResourceKind::ALL {
                        (collection_card(kind))
                    }
                }

                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "Lists are fetched from the platform each time a page is opened. New reports show up under "
                    (link(endpoints::DISPUTES_VIEW, "Disputes"))
                    "."
                }
            }
        }
    };

    base("Dashboard", &content).into_response()
}

#[cfg(test)]
mod dashboard_tests {
    use scraper::Selector;

    use crate::{
        endpoints,
        test_utils::{assert_content_type, assert_status_ok, assert_valid_html, parse_html_document},
    };

    use super::get_dashboard_page;

    #[tokio::test]
    async fn dashboard_links_to_every_list_page() {
        let response = get_dashboard_page().await;

        assert_status_ok(&response);
        assert_content_type(&response, "text/html");
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let selector = Selector::parse("main div.grid > a").unwrap();
        let links: Vec<_> = html
            .select(&selector)
            .filter_map(|link| link.value().attr("href"))
            .collect();
        assert_eq!(
            links,
            vec![
                endpoints::CUSTOMERS_VIEW,
                endpoints::TRANSACTIONS_VIEW,
                endpoints::DISPUTES_VIEW,
                endpoints::BUSINESSES_VIEW,
            ]
        );
    }
}
