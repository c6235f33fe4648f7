//! Log-out route handler that ends the backend session, invalidates the
//! session cookies and redirects users.

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;

use crate::{
    auth::{
        cookie::{get_session_from_cookies, invalidate_session_cookies},
        log_in::LogInState,
    },
    endpoints,
};

/// End the backend session, invalidate the session cookies and redirect the
/// client to the log-in page.
///
/// A backend failure is logged but does not stop the log-out: the cookies are
/// cleared either way.
pub async fn get_log_out(State(state): State<LogInState>, jar: PrivateCookieJar) -> Response {
    if let Ok(session) = get_session_from_cookies(&jar)
        && let Err(error) = state.api_client.log_out(&session.access_token).await
    {
        tracing::warn!("Could not end the backend session during log-out: {error}");
    }

    let jar = invalidate_session_cookies(jar);

    (jar, Redirect::to(endpoints::LOG_IN_VIEW)).into_response()
}
