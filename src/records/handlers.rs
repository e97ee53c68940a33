//! Route handlers for the list pages and the htmx endpoints behind their
//! controls.
//!
//! Full pages fetch the collection from the backend on every visit. The htmx
//! endpoints only re-derive the cached list, except for reload and actions
//! which go to the backend first.

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::Deserialize;
use time::UtcOffset;

use crate::{
    AppState, Error,
    alert::Alert,
    dispatch::{Action, apply_action, dispatch},
    list_store::{ListState, ListStore},
    pipeline::{Collection, RecordId},
    session::{Session, invalidate_session_cookie, log_in_url_with_redirect},
    timezone::get_local_offset,
    transport::{BackendConfig, RecordClient, ResourceKind, TransportError},
};

use super::{
    tables::{TableConfig, table_config},
    view::{close_modal_oob, list_page, record_modal, records_table},
};

/// The state needed by the list pages and their controls.
#[derive(Debug, Clone)]
pub struct RecordsState {
    pub cookie_key: Key,
    pub backend: BackendConfig,
    pub list_store: ListStore,
    /// The canonical timezone name used to display timestamps.
    pub local_timezone: String,
}

impl FromRef<AppState> for RecordsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            backend: state.backend.clone(),
            list_store: state.list_store.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

impl FromRef<RecordsState> for Key {
    fn from_ref(state: &RecordsState) -> Self {
        state.cookie_key.clone()
    }
}

impl RecordsState {
    fn local_offset(&self) -> Result<UtcOffset, Error> {
        get_local_offset(&self.local_timezone)
            .ok_or_else(|| Error::InvalidTimezoneError(self.local_timezone.clone()))
    }

    /// Run `f` on the session's list of `kind`, creating it with the page's
    /// default sort if needed.
    fn with_list<T>(
        &self,
        session: &Session,
        kind: ResourceKind,
        f: impl FnOnce(&mut ListState) -> T,
    ) -> Result<T, Error> {
        let config = table_config(kind);
        self.list_store
            .with_list(&session.key(), kind, || config.new_list_state(), f)
    }

    /// Render the `#records` fragment for the session's list of `kind`.
    fn render_table(&self, session: &Session, kind: ResourceKind) -> Result<Markup, Error> {
        let local_offset = self.local_offset()?;
        let config = table_config(kind);

        self.with_list(session, kind, |list| {
            records_table(config, list, local_offset)
        })
    }
}

/// The response for a backend call that was rejected because the session's
/// access token is no longer valid.
///
/// The cached lists are left alone; they are discarded on log out or once
/// they go unused.
fn session_rejected(jar: PrivateCookieJar, config: &TableConfig, is_htmx: bool) -> Response {
    tracing::info!("Backend rejected the session, redirecting to log in");
    let log_in_url = log_in_url_with_redirect(config.page);
    let jar = invalidate_session_cookie(jar);

    if is_htmx {
        (HxRedirect(log_in_url), jar, StatusCode::OK).into_response()
    } else {
        (jar, Redirect::to(&log_in_url)).into_response()
    }
}

fn fetch_failed_alert(config: &TableConfig, error: &TransportError) -> Alert {
    Alert::Error {
        message: format!("Could not load {}", config.title.to_lowercase()),
        details: match error {
            TransportError::Unreachable(_) => {
                "The platform could not be reached. Check your connection and reload.".to_owned()
            }
            _ => "The platform sent an unexpected response. Try reloading the page.".to_owned(),
        },
    }
}

async fn fetch(
    state: &RecordsState,
    session: &Session,
    kind: ResourceKind,
) -> Result<Collection, TransportError> {
    RecordClient::new(&state.backend, session.clone())
        .fetch_collection(kind)
        .await
}

async fn get_list_page(
    state: RecordsState,
    session: Session,
    jar: PrivateCookieJar,
    kind: ResourceKind,
) -> Response {
    let config = table_config(kind);
    let local_offset = match state.local_offset() {
        Ok(offset) => offset,
        Err(error) => return error.into_response(),
    };

    let alert = match fetch(&state, &session, kind).await {
        Ok(collection) => {
            if let Err(error) = state.with_list(&session, kind, |list| {
                list.replace_collection(collection)
            }) {
                return error.into_response();
            }
            None
        }
        Err(TransportError::Unauthorized) => return session_rejected(jar, config, false),
        Err(error) => {
            tracing::error!("Could not fetch {kind}: {error}");
            Some(fetch_failed_alert(config, &error))
        }
    };

    state
        .with_list(&session, kind, |list| {
            list_page(config, list, local_offset, alert)
        })
        .into_response()
}

/// Display the page listing every customer.
pub async fn get_customers_page(
    State(state): State<RecordsState>,
    Extension(session): Extension<Session>,
    jar: PrivateCookieJar,
) -> Response {
    get_list_page(state, session, jar, ResourceKind::Users).await
}

/// Display the page listing every transaction.
pub async fn get_transactions_page(
    State(state): State<RecordsState>,
    Extension(session): Extension<Session>,
    jar: PrivateCookieJar,
) -> Response {
    get_list_page(state, session, jar, ResourceKind::Transactions).await
}

/// Display the page listing every dispute.
pub async fn get_disputes_page(
    State(state): State<RecordsState>,
    Extension(session): Extension<Session>,
    jar: PrivateCookieJar,
) -> Response {
    get_list_page(state, session, jar, ResourceKind::Disputes).await
}

/// Display the page listing every business account.
pub async fn get_businesses_page(
    State(state): State<RecordsState>,
    Extension(session): Extension<Session>,
    jar: PrivateCookieJar,
) -> Response {
    get_list_page(state, session, jar, ResourceKind::Businesses).await
}

fn table_response(result: Result<Markup, Error>) -> Response {
    match result {
        Ok(table) => table.into_response(),
        Err(error) => error.into_alert_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub search: String,
}

/// Set the search term of a list and return the re-rendered table.
pub async fn post_search(
    State(state): State<RecordsState>,
    Extension(session): Extension<Session>,
    Path(kind): Path<ResourceKind>,
    Form(form): Form<SearchForm>,
) -> Response {
    let result = state
        .with_list(&session, kind, |list| list.set_search(&form.search))
        .and_then(|_| state.render_table(&session, kind));

    table_response(result)
}

#[derive(Debug, Deserialize)]
pub struct SortForm {
    pub key: String,
}

/// Sort a list by a column, flipping the direction if it is already sorted
/// by that column.
pub async fn post_sort(
    State(state): State<RecordsState>,
    Extension(session): Extension<Session>,
    Path(kind): Path<ResourceKind>,
    Form(form): Form<SortForm>,
) -> Response {
    let config = table_config(kind);

    if !config.columns.iter().any(|column| column.key == form.key) {
        return Error::UnknownSortKey(form.key).into_alert_response();
    }

    let result = state
        .with_list(&session, kind, |list| list.toggle_sort(&form.key))
        .and_then(|_| state.render_table(&session, kind));

    table_response(result)
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionChange {
    /// Select every displayed row.
    All,
    /// Clear the selection.
    None,
    /// Flip one row.
    Toggle,
}

#[derive(Debug, Deserialize)]
pub struct SelectionForm {
    pub change: SelectionChange,
    pub record_id: Option<String>,
}

/// Change which rows of a list are selected.
pub async fn post_selection(
    State(state): State<RecordsState>,
    Extension(session): Extension<Session>,
    Path(kind): Path<ResourceKind>,
    Form(form): Form<SelectionForm>,
) -> Response {
    let result = match (form.change, form.record_id) {
        (SelectionChange::All, _) => state.with_list(&session, kind, ListState::select_all),
        (SelectionChange::None, _) => state.with_list(&session, kind, ListState::clear_selection),
        (SelectionChange::Toggle, Some(record_id)) => state.with_list(&session, kind, |list| {
            list.toggle_selected(RecordId::new(record_id))
        }),
        (SelectionChange::Toggle, None) => Err(Error::InvalidSelection),
    };

    table_response(result.and_then(|_| state.render_table(&session, kind)))
}

#[derive(Debug, Deserialize)]
pub struct TabForm {
    pub tab: String,
}

/// Switch the status tab of a list.
pub async fn post_tab(
    State(state): State<RecordsState>,
    Extension(session): Extension<Session>,
    Path(kind): Path<ResourceKind>,
    Form(form): Form<TabForm>,
) -> Response {
    let result = table_config(kind)
        .find_tab(&form.tab)
        .and_then(|tab| state.with_list(&session, kind, |list| list.set_tab(tab)))
        .and_then(|_| state.render_table(&session, kind));

    table_response(result)
}

/// Fetch a list's collection again, keeping its search, sort, tab and the
/// selected rows that are still present.
pub async fn post_reload(
    State(state): State<RecordsState>,
    Extension(session): Extension<Session>,
    Path(kind): Path<ResourceKind>,
    jar: PrivateCookieJar,
) -> Response {
    match fetch(&state, &session, kind).await {
        Ok(collection) => {
            let result = state
                .with_list(&session, kind, |list| list.replace_collection(collection))
                .and_then(|_| state.render_table(&session, kind));

            table_response(result)
        }
        Err(TransportError::Unauthorized) => session_rejected(jar, table_config(kind), true),
        Err(error) => {
            tracing::error!("Could not reload {kind}: {error}");
            Error::Transport(error).into_alert_response()
        }
    }
}

/// Display the detail modal of a record in the session's list.
pub async fn get_record_actions(
    State(state): State<RecordsState>,
    Extension(session): Extension<Session>,
    Path((kind, record_id)): Path<(ResourceKind, String)>,
) -> Response {
    let config = table_config(kind);
    let id = RecordId::new(record_id);
    let local_offset = match state.local_offset() {
        Ok(offset) => offset,
        Err(error) => return error.into_alert_response(),
    };

    let modal = state.with_list(&session, kind, |list| {
        list.find(&id)
            .map(|record| record_modal(config, record, &id, local_offset))
    });

    match modal {
        Ok(Some(modal)) => modal.into_response(),
        Ok(None) => Error::RecordNotFound(id).into_alert_response(),
        Err(error) => error.into_alert_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct ActionForm {
    pub action: String,
}

/// Run an action on a record and return the updated table.
///
/// The record must be in the session's list. On success the record is
/// changed in place, the modal is closed and a success alert is shown. On
/// failure the list is left as it was.
pub async fn post_record_action(
    State(state): State<RecordsState>,
    Extension(session): Extension<Session>,
    Path((kind, record_id)): Path<(ResourceKind, String)>,
    jar: PrivateCookieJar,
    Form(form): Form<ActionForm>,
) -> Response {
    let id = RecordId::new(record_id);
    let Some(action) = Action::from_label(kind, &form.action) else {
        return Error::UnknownAction {
            kind,
            label: form.action,
        }
        .into_alert_response();
    };

    match state.with_list(&session, kind, |list| list.find(&id).is_some()) {
        Ok(true) => {}
        Ok(false) => return Error::RecordNotFound(id).into_alert_response(),
        Err(error) => return error.into_alert_response(),
    }

    let client = RecordClient::new(&state.backend, session.clone());
    match dispatch(&client, kind, &id, action).await {
        Ok(()) => {}
        Err(TransportError::Unauthorized) => {
            return session_rejected(jar, table_config(kind), true);
        }
        Err(error) => {
            return Error::ActionFailed {
                action: action.label(),
                error,
            }
            .into_alert_response();
        }
    }

    let applied = state.with_list(&session, kind, |list| apply_action(list, &id, action));
    if let Ok(false) = applied {
        tracing::warn!("{kind} {id} left the list before {action} finished");
    }

    let table = match applied.and_then(|_| state.render_table(&session, kind)) {
        Ok(table) => table,
        Err(error) => return error.into_alert_response(),
    };
    let alert = Alert::SuccessSimple {
        message: action.success_message().to_owned(),
    };

    Html(
        html! {
            (table)
            (alert.into_oob_html())
            (close_modal_oob())
        }
        .into_string(),
    )
    .into_response()
}
