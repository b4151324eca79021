#![allow(missing_docs)]

pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;

pub(crate) use form::{
    assert_form_endpoint, assert_form_error_message, assert_form_input,
    assert_form_input_with_value, assert_form_select, assert_form_submit_button, must_get_form,
    must_get_form_with_action,
};
pub(crate) use html::{assert_valid_html, parse_html_document};
pub(crate) use http::{assert_content_type, assert_redirect, get_header};
