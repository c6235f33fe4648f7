//! Implements a struct that holds the shared state of the web server.

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{api::ApiClient, auth::DEFAULT_COOKIE_DURATION, pagination::PaginationConfig};

/// The state of the web server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,

    /// The client for the WealthVerse REST backend.
    pub api_client: ApiClient,

    /// The config that controls how to display pages of data.
    pub pagination_config: PaginationConfig,
}

impl AppState {
    /// Create a new [AppState] with a client for the backend at
    /// `backend_url`.
    pub fn new(
        cookie_secret: &str,
        backend_url: &str,
        pagination_config: PaginationConfig,
    ) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            api_client: ApiClient::new(backend_url),
            pagination_config,
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret` string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}
