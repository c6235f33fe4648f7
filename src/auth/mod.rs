//! User authentication: session cookies, the auth middleware, and the
//! log-in, registration and log-out routes.
//!
//! The backend issues bearer tokens; this module stores them in encrypted
//! private cookies so every session read and write goes through a single
//! place.

mod cookie;
pub mod log_in;
mod log_out;
mod middleware;
mod password;
mod redirect;
pub mod register;

pub use cookie::{
    DEFAULT_COOKIE_DURATION, Session, get_session_from_cookies, invalidate_session_cookies,
    set_session_cookies,
};
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{AuthState, auth_guard, auth_guard_hx};
pub use password::ValidatedPassword;
pub use redirect::normalize_redirect_url;

pub(crate) use redirect::build_log_in_redirect_url;
pub use register::{get_register_page, post_register};
