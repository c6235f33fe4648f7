#![allow(missing_docs)]
//! Shared helpers for handler and router tests.

pub(crate) mod backend;

use axum::{body::Body, http::StatusCode, response::Response};
use axum_test::TestServer;
use scraper::{ElementRef, Html, Selector};

use crate::endpoints;

pub(crate) async fn parse_html_document(response: Response<Body>) -> Html {
    let body = response.into_body();
    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Could not get response body");
    let text = String::from_utf8_lossy(&body).to_string();

    Html::parse_document(&text)
}

#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(
        html.errors.is_empty(),
        "Got HTML parsing errors: {:?}",
        html.errors
    );
}

#[track_caller]
pub(crate) fn must_get_form(html: &Html) -> ElementRef<'_> {
    html.select(&Selector::parse("form").unwrap())
        .next()
        .expect("No form found")
}

#[track_caller]
pub(crate) fn assert_hx_endpoint(form: &ElementRef<'_>, attribute: &str, endpoint: &str) {
    let got = form
        .value()
        .attr(attribute)
        .unwrap_or_else(|| panic!("{attribute} attribute missing"));

    assert_eq!(
        got, endpoint,
        "want form with attribute {attribute}=\"{endpoint}\", got {got:?}"
    );
}

#[track_caller]
pub(crate) fn assert_form_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    for input in form.select(&Selector::parse("input").unwrap()) {
        let input_name = input.value().attr("name").unwrap_or_default();

        if input_name == name {
            let input_type = input.value().attr("type").unwrap_or_default();
            let input_required = input.value().attr("required");

            assert_eq!(
                input_type, type_,
                "want input with type \"{type_}\", got {input_type:?}"
            );

            assert!(
                input_required.is_some(),
                "want input with name {name} to have the required attribute but got none"
            );

            return;
        }
    }

    panic!("No input found with name \"{name}\" and type \"{type_}\"");
}

/// Log in through the test server with the fake backend's default
/// credentials, saving the session cookies on the server.
pub(crate) async fn must_log_in(server: &TestServer) {
    let response = server
        .post(endpoints::LOG_IN_API)
        .form(&[("email", "test@test.com"), ("password", "test")])
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
}
