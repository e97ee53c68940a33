//! Markup for the list pages: the page shell, the `#records` table fragment
//! that every list control swaps, and the record modal.

use maud::{Markup, html};
use serde_json::json;
use time::UtcOffset;

use crate::{
    alert::Alert,
    dispatch::Action,
    endpoints::{self, format_endpoint},
    html::{
        BADGE_STYLE, BUTTON_DANGER_STYLE, BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        format_amount, format_timestamp,
    },
    list_store::ListState,
    navigation::NavBar,
    pipeline::{FieldValue, Record, RecordId, SortDirection},
};

use super::tables::{ALL_TAB_SLUG, Column, ColumnFormat, TableConfig, normalize_status};

const RECORDS_ID: &str = "records";
const MODAL_ID: &str = "record-modal";

const TAB_STYLE: &str = "inline-block px-4 py-2 rounded-t-lg border-b-2 border-transparent \
    hover:text-gray-600 hover:border-gray-300 dark:hover:text-gray-300";
const ACTIVE_TAB_STYLE: &str = "inline-block px-4 py-2 rounded-t-lg border-b-2 \
    text-blue-600 border-blue-600 dark:text-blue-500 dark:border-blue-500";
const SELECTED_ROW_STYLE: &str = "bg-blue-50 border-b dark:bg-gray-700 dark:border-gray-600";

/// Render `value` as it appears in a table cell.
fn format_value(format: ColumnFormat, value: Option<&FieldValue>, local_offset: UtcOffset) -> Markup {
    let Some(value) = value.filter(|value| !value.is_null()) else {
        return html!(span class="text-gray-400" { "-" });
    };

    match format {
        ColumnFormat::Amount => match value.as_number() {
            Some(amount) => html!((format_amount(amount))),
            None => html!((value.to_string())),
        },
        ColumnFormat::Timestamp => match value.as_instant() {
            Some(instant) => html!(
                time datetime=(value.to_string()) { (format_timestamp(instant, local_offset)) }
            ),
            None => html!((value.to_string())),
        },
        ColumnFormat::Boolean => match value.as_bool() {
            Some(true) => html!("Yes"),
            Some(false) => html!("No"),
            None => html!((value.to_string())),
        },
        ColumnFormat::Status => status_badge(&value.to_string()),
        ColumnFormat::Text => html!((value.to_string())),
    }
}

fn status_badge(status: &str) -> Markup {
    let colour = match normalize_status(status).as_str() {
        "approved" | "resolved" | "reviewed" => {
            "text-green-800 bg-green-100 dark:bg-green-900 dark:text-green-300"
        }
        "rejected" => "text-red-800 bg-red-100 dark:bg-red-900 dark:text-red-300",
        "pending" | "needs response" => {
            "text-yellow-800 bg-yellow-100 dark:bg-yellow-900 dark:text-yellow-300"
        }
        _ => "",
    };

    html!(span class={ (BADGE_STYLE) " " (colour) } { (status) })
}

fn sort_header(config: &TableConfig, list: &ListState, column: &Column) -> Markup {
    let sort_url = format_endpoint(endpoints::RECORDS_SORT, &[config.kind.slug()]);
    let active_direction = (list.sort().key == column.key).then_some(list.sort().direction);
    let aria_sort = active_direction.map(|direction| match direction {
        SortDirection::Ascending => "ascending",
        SortDirection::Descending => "descending",
    });

    html! {
        th scope="col" class=(TABLE_CELL_STYLE) aria-sort=[aria_sort]
        {
            button
                type="button"
                hx-post=(sort_url)
                hx-vals=(json!({ "key": column.key }).to_string())
                class="inline-flex items-center gap-1 uppercase"
            {
                (column.title)

                @if let Some(direction) = active_direction {
                    span aria-hidden="true" { (direction.arrow()) }
                }
            }
        }
    }
}

fn tab_bar(config: &TableConfig, list: &ListState) -> Markup {
    let tab_url = format_endpoint(endpoints::RECORDS_TAB, &[config.kind.slug()]);
    let active_slug = list.tab().map_or(ALL_TAB_SLUG, |tab| tab.slug);
    let all_label = format!("All {}", config.title.to_lowercase());
    let tabs = std::iter::once((ALL_TAB_SLUG, all_label.as_str()))
        .chain(config.tabs.iter().map(|tab| (tab.slug, tab.label)));

    html! {
        ul
            role="tablist"
            class="flex flex-wrap text-sm font-medium text-center text-gray-500
                border-b border-gray-200 dark:text-gray-400 dark:border-gray-700"
        {
            @for (slug, label) in tabs {
                @let is_active = slug == active_slug;
                li class="me-2"
                {
                    button
                        type="button"
                        role="tab"
                        aria-selected=(if is_active { "true" } else { "false" })
                        hx-post=(tab_url)
                        hx-vals=(json!({ "tab": slug }).to_string())
                        class=(if is_active { ACTIVE_TAB_STYLE } else { TAB_STYLE })
                    {
                        (label)
                    }
                }
            }
        }
    }
}

fn record_row(
    config: &TableConfig,
    list: &ListState,
    record: &Record,
    local_offset: UtcOffset,
) -> Markup {
    let id = record.id(list.id_field());
    let is_selected = id.as_ref().is_some_and(|id| list.selection().contains(id));
    let selection_url = format_endpoint(endpoints::RECORDS_SELECTION, &[config.kind.slug()]);
    let button_label = if Action::for_kind(config.kind).is_empty() {
        "View"
    } else {
        "Actions"
    };

    html! {
        tr
            class=(if is_selected { SELECTED_ROW_STYLE } else { TABLE_ROW_STYLE })
            data-record-id=[id.as_ref().map(RecordId::as_str)]
        {
            td class="w-4 p-4"
            {
                @if let Some(id) = &id {
                    input
                        type="checkbox"
                        aria-label={ "Select " (config.noun) " " (id.as_str()) }
                        checked[is_selected]
                        hx-post=(selection_url)
                        hx-vals=(json!({ "change": "toggle", "record_id": id.as_str() }).to_string())
                        class="rounded-xs";
                }
            }

            @for column in config.columns {
                td class=(TABLE_CELL_STYLE)
                {
                    (format_value(column.format, record.get(column.key), local_offset))
                }
            }

            td class=(TABLE_CELL_STYLE)
            {
                @if let Some(id) = &id {
                    button
                        type="button"
                        hx-get=(format_endpoint(endpoints::RECORD_ACTIONS, &[config.kind.slug(), &id.path_segment()]))
                        hx-target="#modal-container"
                        hx-swap="innerHTML"
                        class=(BUTTON_SECONDARY_STYLE)
                    {
                        (button_label)
                    }
                }
            }
        }
    }
}

/// The table of records, with its tabs and selection summary.
///
/// Every control inside targets the fragment itself, so any list change
/// re-renders the whole table from the latest derived collection.
pub fn records_table(config: &TableConfig, list: &ListState, local_offset: UtcOffset) -> Markup {
    let derived = list.derived();
    let selection_url = format_endpoint(endpoints::RECORDS_SELECTION, &[config.kind.slug()]);
    let all_selected = list.selection().is_all_selected(derived, list.id_field());
    let select_all_change = if all_selected { "none" } else { "all" };
    let column_count = config.columns.len() + 2;

    html! {
        div
            id=(RECORDS_ID)
            hx-target={ "#" (RECORDS_ID) }
            hx-swap="outerHTML"
            class="space-y-4 w-full"
        {
            @if !config.tabs.is_empty() {
                (tab_bar(config, list))
            }

            p class="text-sm text-gray-500 dark:text-gray-400"
            {
                "Showing " (derived.len()) " of " (list.raw().len())

                @if !list.selection().is_empty() {
                    span data-selected-count=(list.selection().len())
                    {
                        ", " (list.selection().len()) " selected"
                    }
                }
            }

            div class="overflow-x-auto rounded-lg shadow"
            {
                table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class="w-4 p-4"
                            {
                                input
                                    type="checkbox"
                                    id="select-all"
                                    aria-label="Select all rows"
                                    checked[all_selected]
                                    disabled[derived.is_empty()]
                                    hx-post=(selection_url)
                                    hx-vals=(json!({ "change": select_all_change }).to_string())
                                    class="rounded-xs";
                            }

                            @for column in config.columns {
                                (sort_header(config, list, column))
                            }

                            th scope="col" class=(TABLE_CELL_STYLE) { span class="sr-only" { "Actions" } }
                        }
                    }

                    tbody
                    {
                        @for record in derived {
                            (record_row(config, list, record, local_offset))
                        }

                        @if derived.is_empty() {
                            tr
                            {
                                td
                                    colspan=(column_count)
                                    class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                {
                                    @if list.raw().is_empty() {
                                        "No " (config.title.to_lowercase()) " to show."
                                    } @else {
                                        "No " (config.title.to_lowercase()) " match the current filters."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// The full list page. `alert` is shown above the table, e.g. when the fetch
/// failed.
pub fn list_page(
    config: &TableConfig,
    list: &ListState,
    local_offset: UtcOffset,
    alert: Option<Alert>,
) -> Markup {
    let slug = config.kind.slug();
    let nav_bar = NavBar::new(config.page).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full max-w-6xl"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold" { (config.title) }

                    div class="flex gap-2 items-center"
                    {
                        input
                            type="search"
                            name="search"
                            aria-label={ "Search " (config.title.to_lowercase()) }
                            placeholder="Search..."
                            value=(list.search())
                            hx-post=(format_endpoint(endpoints::RECORDS_SEARCH, &[slug]))
                            hx-trigger="input changed delay:300ms, search"
                            hx-target={ "#" (RECORDS_ID) }
                            hx-swap="outerHTML"
                            class=(FORM_TEXT_INPUT_STYLE);

                        button
                            type="button"
                            hx-post=(format_endpoint(endpoints::RECORDS_RELOAD, &[slug]))
                            hx-target={ "#" (RECORDS_ID) }
                            hx-swap="outerHTML"
                            class=(BUTTON_SECONDARY_STYLE)
                        {
                            "Reload"
                        }
                    }
                }

                @if let Some(alert) = alert {
                    (alert.into_html())
                }

                (records_table(config, list, local_offset))
            }
        }
    };

    base(config.title, &content)
}

fn action_style(action: Action) -> &'static str {
    match action {
        Action::ReturnMoney | Action::Reject => BUTTON_DANGER_STYLE,
        _ => BUTTON_PRIMARY_STYLE,
    }
}

/// Clears the modal container, e.g. after an action has run.
pub fn close_modal_oob() -> Markup {
    html!(div id="modal-container" hx-swap-oob="innerHTML" {})
}

/// The detail dialog for one record, with the actions available for its kind.
pub fn record_modal(
    config: &TableConfig,
    record: &Record,
    id: &RecordId,
    local_offset: UtcOffset,
) -> Markup {
    let actions_url =
        format_endpoint(endpoints::RECORD_ACTIONS, &[config.kind.slug(), &id.path_segment()]);
    let format_of = |key: &str| {
        config
            .columns
            .iter()
            .find(|column| column.key == key)
            .map_or(ColumnFormat::Text, |column| column.format)
    };

    html! {
        div
            id=(MODAL_ID)
            class="fixed inset-0 z-50 flex items-center justify-center bg-black/50 p-4"
        {
            div
                role="dialog"
                aria-modal="true"
                aria-labelledby="record-modal-title"
                class="w-full max-w-lg rounded-lg bg-white p-6 shadow-xl dark:bg-gray-800 dark:text-white"
            {
                h2 id="record-modal-title" class="text-lg font-semibold mb-4"
                {
                    (config.noun) " " (id.as_str())
                }

                dl class="grid grid-cols-2 gap-x-4 gap-y-2 text-sm mb-6"
                {
                    @for (key, value) in record.fields() {
                        dt class="font-medium text-gray-500 dark:text-gray-400" { (key) }
                        dd { (format_value(format_of(key), Some(value), local_offset)) }
                    }
                }

                div class="flex flex-wrap justify-end gap-2"
                {
                    @for action in Action::for_kind(config.kind) {
                        button
                            type="button"
                            hx-post=(actions_url)
                            hx-vals=(json!({ "action": action.label() }).to_string())
                            hx-target={ "#" (RECORDS_ID) }
                            hx-swap="outerHTML"
                            class=(action_style(*action))
                        {
                            (action.label())
                        }
                    }

                    button
                        type="button"
                        onclick="document.getElementById('modal-container').innerHTML = ''"
                        class=(BUTTON_SECONDARY_STYLE)
                    {
                        "Close"
                    }
                }
            }
        }
    }
}
