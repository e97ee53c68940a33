//! Column layouts, default sorts and tabs of the four list pages.

use crate::{
    Error, endpoints,
    list_store::{ListState, Tab},
    pipeline::{FieldValue, Record, SortDirection, SortSpec},
    transport::ResourceKind,
};

/// How a column's values are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnFormat {
    Text,
    /// Birr with two decimals.
    Amount,
    /// Date and time in the configured timezone.
    Timestamp,
    /// "Yes" or "No".
    Boolean,
    /// A coloured badge.
    Status,
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub key: &'static str,
    pub title: &'static str,
    pub format: ColumnFormat,
}

const fn column(key: &'static str, title: &'static str, format: ColumnFormat) -> Column {
    Column { key, title, format }
}

/// Everything that differs between the list pages.
#[derive(Debug)]
pub struct TableConfig {
    pub kind: ResourceKind,
    /// The page heading, e.g. "Disputes".
    pub title: &'static str,
    /// The singular noun used in the detail modal, e.g. "Dispute".
    pub noun: &'static str,
    pub page: &'static str,
    pub columns: &'static [Column],
    pub default_sort_key: &'static str,
    pub default_sort_direction: SortDirection,
    /// Subsets offered next to "All", empty if the page has no tabs.
    pub tabs: &'static [Tab],
}

impl TableConfig {
    /// The list a session starts with before the first fetch.
    pub fn new_list_state(&self) -> ListState {
        ListState::new(
            self.kind.id_field(),
            SortSpec::new(self.default_sort_key, self.default_sort_direction),
        )
    }

    /// Find a tab by its slug.
    ///
    /// Returns `Ok(None)` for the "all" tab.
    ///
    /// # Errors
    /// Returns [Error::UnknownTab] if the page has no tab called `slug`.
    pub fn find_tab(&self, slug: &str) -> Result<Option<Tab>, Error> {
        if slug == ALL_TAB_SLUG {
            return Ok(None);
        }

        self.tabs
            .iter()
            .find(|tab| tab.slug == slug)
            .copied()
            .map(Some)
            .ok_or_else(|| Error::UnknownTab(slug.to_owned()))
    }
}

/// The slug of the tab that shows every record.
pub const ALL_TAB_SLUG: &str = "all";

const CUSTOMER_COLUMNS: &[Column] = &[
    column("user_id", "User ID", ColumnFormat::Text),
    column("phone_number", "Phone number", ColumnFormat::Text),
    column("is_phone_verified", "Verified", ColumnFormat::Boolean),
    column("total_spend", "Total spend", ColumnFormat::Amount),
    column("subscription_sum", "Subscriptions", ColumnFormat::Amount),
    column("is_active_subscriber", "Active subscriber", ColumnFormat::Boolean),
];

const TRANSACTION_COLUMNS: &[Column] = &[
    column("id", "ID", ColumnFormat::Text),
    column("amount", "Amount", ColumnFormat::Amount),
    column("from_user", "From", ColumnFormat::Text),
    column("to_user", "To", ColumnFormat::Text),
    column("remarks", "Remarks", ColumnFormat::Text),
    column("date", "Date", ColumnFormat::Timestamp),
];

const DISPUTE_COLUMNS: &[Column] = &[
    column("reportId", "Report ID", ColumnFormat::Text),
    column("phoneReporter", "Reporter", ColumnFormat::Text),
    column("phoneReportee", "Reportee", ColumnFormat::Text),
    column("disputeAmount", "Amount", ColumnFormat::Amount),
    column("created", "Created", ColumnFormat::Timestamp),
    column("status", "Status", ColumnFormat::Status),
];

const BUSINESS_COLUMNS: &[Column] = &[
    column("businessName", "Business", ColumnFormat::Text),
    column("registrationId", "Registration ID", ColumnFormat::Text),
    column("contactEmail", "Contact email", ColumnFormat::Text),
    column("totalRevenue", "Total revenue", ColumnFormat::Amount),
    column("createdAt", "Created", ColumnFormat::Timestamp),
    column("verificationStatus", "Verification", ColumnFormat::Status),
];

/// Lowercase `status` and treat spaces, underscores and hyphens alike, so
/// "In_review", "in-review" and "In review" compare equal.
pub fn normalize_status(status: &str) -> String {
    status
        .trim()
        .to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn status_is(record: &Record, wanted: &[&str]) -> bool {
    record
        .get("status")
        .and_then(FieldValue::as_text)
        .map(normalize_status)
        .is_some_and(|status| wanted.contains(&status.as_str()))
}

fn flag_is_set(record: &Record, key: &str) -> bool {
    record
        .get(key)
        .and_then(FieldValue::as_bool)
        .unwrap_or(false)
}

fn needs_response(record: &Record) -> bool {
    status_is(record, &["needs response", "pending"])
}

fn in_review(record: &Record) -> bool {
    status_is(record, &["in review"])
}

fn reviewed(record: &Record) -> bool {
    status_is(record, &["reviewed"]) || flag_is_set(record, "reviewed")
}

fn resolved(record: &Record) -> bool {
    status_is(record, &["resolved"]) || flag_is_set(record, "resolved")
}

const DISPUTE_TABS: &[Tab] = &[
    Tab {
        slug: "needs-response",
        label: "Needs response",
        predicate: needs_response,
    },
    Tab {
        slug: "in-review",
        label: "In review",
        predicate: in_review,
    },
    Tab {
        slug: "reviewed",
        label: "Reviewed",
        predicate: reviewed,
    },
    Tab {
        slug: "resolved",
        label: "Resolved",
        predicate: resolved,
    },
];

static CUSTOMERS: TableConfig = TableConfig {
    kind: ResourceKind::Users,
    title: "Customers",
    noun: "Customer",
    page: endpoints::CUSTOMERS_VIEW,
    columns: CUSTOMER_COLUMNS,
    default_sort_key: "user_id",
    default_sort_direction: SortDirection::Ascending,
    tabs: &[],
};

static TRANSACTIONS: TableConfig = TableConfig {
    kind: ResourceKind::Transactions,
    title: "Transactions",
    noun: "Transaction",
    page: endpoints::TRANSACTIONS_VIEW,
    columns: TRANSACTION_COLUMNS,
    default_sort_key: "date",
    default_sort_direction: SortDirection::Descending,
    tabs: &[],
};

static DISPUTES: TableConfig = TableConfig {
    kind: ResourceKind::Disputes,
    title: "Disputes",
    noun: "Dispute",
    page: endpoints::DISPUTES_VIEW,
    columns: DISPUTE_COLUMNS,
    default_sort_key: "created",
    default_sort_direction: SortDirection::Descending,
    tabs: DISPUTE_TABS,
};

static BUSINESSES: TableConfig = TableConfig {
    kind: ResourceKind::Businesses,
    title: "Business accounts",
    noun: "Business",
    page: endpoints::BUSINESSES_VIEW,
    columns: BUSINESS_COLUMNS,
    default_sort_key: "createdAt",
    default_sort_direction: SortDirection::Descending,
    tabs: &[],
};

/// The layout of the list page for `kind`.
pub fn table_config(kind: ResourceKind) -> &'static TableConfig {
    match kind {
        ResourceKind::Users => &CUSTOMERS,
        ResourceKind::Transactions => &TRANSACTIONS,
        ResourceKind::Disputes => &DISPUTES,
        ResourceKind::Businesses => &BUSINESSES,
    }
}
