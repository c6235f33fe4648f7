//! This file defines the routes for displaying the log-in page and handling log-in requests.
//! The auth module handles the lower level cookie auth logic; the backend
//! owns the credentials.

use axum::{
    Form,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    api::{ApiClient, models::AuthenticationRequest},
    app_state::create_cookie_key,
    auth::{DEFAULT_COOKIE_DURATION, Session, normalize_redirect_url, set_session_cookies},
    endpoints,
    html::{base, log_in_register, loading_spinner, password_input},
};

/// The error shown when the backend rejects a log-in without an explanation.
pub const LOG_IN_FALLBACK_ERROR_MSG: &str = "Login failed";

fn log_in_form(email: &str, error_message: Option<&str>, redirect_url: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            div {
                label
                    for="email"
                    class="block mb-2 text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Email"
                }

                input
                    type="email"
                    name="email"
                    id="email"
                    value=(email)
                    required
                    tabindex="0"
                    class="bg-gray-50 border border-gray-300 text-gray-900 rounded-lg block
                        w-full p-2.5 dark:bg-gray-700 dark:border-gray-600 dark:text-white";
            }

            (password_input("", 0, error_message))

            button
                type="submit" id="submit-button" tabindex="0"
                class="w-full px-4 py-2 bg-blue-500 dark:bg-blue-600 disabled:bg-blue-700
                    hover:enabled:bg-blue-600 hover:enabled:dark:bg-blue-700 text-white rounded"
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Log in"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400" {
                "Don't have an account? "
                a
                    href=(endpoints::REGISTER_VIEW) tabindex="0"
                    class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                {
                  "Register here"
                }
            }
        }
    }
}

fn parse_redirect_url(raw_url: Option<&str>, source: &str) -> Option<String> {
    match raw_url.and_then(normalize_redirect_url) {
        Some(redirect_url) => Some(redirect_url),
        None => {
            if let Some(redirect_url) = raw_url {
                tracing::warn!("Invalid redirect URL from {source}: {redirect_url}");
            }
            None
        }
    }
}

/// Display the log-in page.
pub async fn get_log_in_page(Query(query): Query<RedirectQuery>) -> Response {
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "log-in query");
    let log_in_form = log_in_form("", None, redirect_url.as_deref());
    let content = log_in_register("Log in to your account", &log_in_form);
    base("Log In", &[], &content).into_response()
}

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LogInState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The client for the backend that owns the credentials.
    pub api_client: ApiClient,
}

impl LogInState {
    /// Create the cookie key from a string and set the default cookie duration.
    pub fn new(cookie_secret: &str, api_client: ApiClient) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            api_client,
        }
    }
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            api_client: state.api_client.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LogInState> for Key {
    fn from_ref(state: &LogInState) -> Self {
        state.cookie_key.clone()
    }
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in the backend's tokens are stored in the session
/// cookies and the client is redirected to the transactions page. Otherwise,
/// the form is returned with the backend's error message, or
/// [LOG_IN_FALLBACK_ERROR_MSG] when the backend gave none.
pub async fn post_log_in(
    State(state): State<LogInState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let redirect_url = parse_redirect_url(user_data.redirect_url.as_deref(), "log-in form");
    let redirect_url = redirect_url.as_deref();

    let request = AuthenticationRequest {
        email: user_data.email.clone(),
        password: user_data.password,
    };
    let auth = match state.api_client.log_in(&request).await {
        Ok(auth) => auth,
        Err(Error::BackendRejected { message, .. }) => {
            let message = if message.trim().is_empty() {
                LOG_IN_FALLBACK_ERROR_MSG.to_owned()
            } else {
                message
            };
            return log_in_form(&user_data.email, Some(&message), redirect_url).into_response();
        }
        Err(error) => {
            tracing::error!("Unhandled error while logging in: {error}");
            return log_in_form(
                &user_data.email,
                Some("An internal error occurred. Please try again later."),
                redirect_url,
            )
            .into_response();
        }
    };

    let session = Session {
        access_token: auth.access_token,
        refresh_token: auth.refresh_token,
        user_id: auth.id,
    };
    let redirect_url = redirect_url.unwrap_or(endpoints::TRANSACTIONS_VIEW);
    let jar = set_session_cookies(jar, session, state.cookie_duration);

    (
        StatusCode::SEE_OTHER,
        HxRedirect(redirect_url.to_owned()),
        jar,
    )
        .into_response()
}

#[derive(Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

/// The raw data entered by the user in the log-in form.
///
/// The password is stored as a plain string. There is no need for validation
/// here since the backend verifies the credentials.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    /// Email entered during log-in.
    pub email: String,

    /// Password entered during log-in.
    pub password: String,

    /// Optional URL to redirect to after logging in.
    /// Only accepted from the log-in form submission.
    pub redirect_url: Option<String>,
}
