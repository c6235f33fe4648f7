//! Middleware for logging requests and responses.

use axum::{extract::Request, http::header::CONTENT_TYPE, middleware::Next, response::Response};

/// Form fields that must never reach the logs.
const REDACTED_FIELDS: [&str; 2] = ["password", "confirm_password"];

/// Bodies longer than this are truncated at the `info` level and logged in
/// full at `debug`.
const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Credentials submitted through forms are redacted before logging.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body_text) = buffer_request(request).await;

    let is_form_post = parts.method == axum::http::Method::POST
        && parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

    if is_form_post {
        let mut display_text = body_text.clone();

        for field_name in REDACTED_FIELDS {
            display_text = redact_field(&display_text, field_name);
        }

        log_request(&parts, &display_text);
    } else {
        log_request(&parts, &body_text);
    }

    let request = Request::from_parts(parts, body_text.into());
    let response = next.run(request).await;

    let (parts, body_text) = buffer_response(response).await;
    log_response(&parts, &body_text);

    Response::from_parts(parts, body_text.into())
}

/// Replace the value of `field_name` in the urlencoded `form_text` with
/// asterisks.
fn redact_field(form_text: &str, field_name: &str) -> String {
    let start = match form_text.find(&format!("{field_name}=")) {
        Some(position) => position,
        None => return form_text.to_string(),
    };

    let end = form_text[start..]
        .find('&')
        .map(|offset| start + offset)
        .unwrap_or(form_text.len());
    let field = &form_text[start..end];

    form_text.replace(field, &format!("{field_name}=********"))
}

async fn buffer_request(request: Request) -> (axum::http::request::Parts, String) {
    let (parts, body) = request.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();

    (parts, String::from_utf8_lossy(&body_bytes).to_string())
}

async fn buffer_response(response: Response) -> (axum::http::response::Parts, String) {
    let (parts, body) = response.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();

    (parts, String::from_utf8_lossy(&body_bytes).to_string())
}

fn log_request(parts: &axum::http::request::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {parts:#?}\nbody: {:}...",
            &body[..LOG_BODY_LENGTH_LIMIT]
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Received request: {parts:#?}\nbody: {body:?}");
    }
}

fn log_response(parts: &axum::http::response::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {parts:#?}\nbody: {:}...",
            &body[..LOG_BODY_LENGTH_LIMIT]
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {parts:#?}\nbody: {body:?}");
    }
}
