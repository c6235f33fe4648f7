//! Authentication middleware that validates session cookies, extends
//! sessions, and handles redirects to the log-in page.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::Duration;

use crate::{
    AppState,
    auth::{
        build_log_in_redirect_url,
        cookie::{get_session_from_cookies, set_session_cookies},
        redirect::build_log_in_redirect_url_from_target,
    },
    endpoints,
};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Middleware function that checks for valid session cookies.
/// The session is placed into the request and then the request executed
/// normally if the cookies are valid, otherwise a redirect to the log-in page
/// is returned using `get_redirect`.
///
/// **Note**: Route handlers can use the function argument
/// `Extension(session): Extension<Session>` to receive the session.
#[inline]
async fn auth_guard_internal(
    state: AuthState,
    request: Request,
    next: Next,
    get_redirect: impl Fn(&str) -> Response,
) -> Response {
    let log_in_redirect_url = build_log_in_redirect_url(&request).unwrap_or_else(|| {
        if request.uri().path().starts_with("/api") {
            tracing::warn!(
                "Missing or invalid HTMX headers for /api request. Falling back to the ledger."
            );
        } else {
            tracing::warn!("Invalid redirect URL from request URI. Falling back to the ledger.");
        }

        build_log_in_redirect_url_from_target(endpoints::TRANSACTIONS_VIEW)
            .unwrap_or_else(|| endpoints::LOG_IN_VIEW.to_owned())
    });

    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(err) => {
            tracing::error!("Error getting cookie jar: {err:?}. Redirecting to log in page.");
            return get_redirect(&log_in_redirect_url);
        }
    };
    let session = match get_session_from_cookies(&jar) {
        Ok(session) => session,
        Err(_) => return get_redirect(&log_in_redirect_url),
    };

    parts.extensions.insert(session.clone());
    let request = Request::from_parts(parts, body);
    let response = next.run(request).await;

    // Re-issue the cookies so the session expiry slides forward with use.
    let (mut parts, body) = response.into_parts();
    let jar = set_session_cookies(jar, session, state.cookie_duration);
    for (key, val) in jar.into_response().headers().iter() {
        if key != SET_COOKIE {
            continue;
        }

        parts.headers.append(key, val.to_owned());
    }

    Response::from_parts(parts, body)
}

/// Middleware function that checks for valid session cookies.
/// The session is placed into the request and then the request executed
/// normally if the cookies are valid, otherwise a redirect to the log-in page
/// is returned.
///
/// **Note**: Route handlers can use the function argument
/// `Extension(session): Extension<Session>` to receive the session.
///
/// **Note**: The app state must contain an `axum_extra::extract::cookie::Key`
/// for decrypting and verifying the cookie contents.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    auth_guard_internal(state, request, next, |redirect_url| {
        Redirect::to(redirect_url).into_response()
    })
    .await
}

/// Middleware function that checks for valid session cookies.
/// The session is placed into the request and then the request executed
/// normally if the cookies are valid, otherwise a HTMX redirect to the log-in
/// page is returned.
///
/// **Note**: Route handlers can use the function argument
/// `Extension(session): Extension<Session>` to receive the session.
///
/// **Note**: The app state must contain an `axum_extra::extract::cookie::Key`
/// for decrypting and verifying the cookie contents.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    auth_guard_internal(state, request, next, |redirect_url| {
        (HxRedirect(redirect_url.to_owned()), StatusCode::OK).into_response()
    })
    .await
}
