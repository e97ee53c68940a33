#![allow(missing_docs)]

pub(crate) mod backend;
pub(crate) mod fixtures;
pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;

pub(crate) use backend::{spawn_backend, unreachable_backend_url};
pub(crate) use fixtures::{
    sample_business, sample_businesses, sample_businesses_json, sample_disputes,
    sample_disputes_json, test_session,
};
pub(crate) use form::{assert_form_input, assert_hx_endpoint, must_get_form};
pub(crate) use html::{assert_valid_html, parse_html_document, parse_html_fragment, select_text};
pub(crate) use http::{assert_content_type, assert_hx_redirect, assert_status_ok, get_header};
