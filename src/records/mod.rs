//! The four list pages: customers, transactions, disputes and business
//! accounts.

mod handlers;
mod tables;
mod view;

pub use handlers::{
    get_businesses_page, get_customers_page, get_disputes_page,
    get_record_actions, get_transactions_page, post_record_action, post_reload, post_search,
    post_selection, post_sort, post_tab,
};
pub use tables::table_config;
