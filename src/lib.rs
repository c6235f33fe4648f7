//! WealthVerse is a web front end for tracking personal spending and the
//! carbon footprint that comes with it.
//!
//! This library serves HTML pages directly and keeps no durable state of its
//! own: every read and write goes through the WealthVerse REST backend, and
//! the only client-side persistence is the encrypted session cookie set.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use time::Date;
use tokio::signal;

mod alert;
mod api;
mod app_state;
mod auth;
mod category;
mod chat;
mod endpoints;
mod html;
mod logging;
mod navigation;
mod not_found;
mod pagination;
mod reports;
mod routing;
#[cfg(test)]
mod test_utils;
mod transaction;

pub use api::ApiClient;
pub use app_state::AppState;
pub use logging::logging_middleware;
pub use pagination::PaginationConfig;
pub use routing::build_router;

use crate::{
    alert::Alert,
    html::{render, render_internal_server_error},
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The session cookies are missing from the cookie jar in the request.
    #[error("no session cookies in the cookie jar :(")]
    CookieMissing,

    /// There was an error parsing a date or formatting the cookie expiry.
    ///
    /// Callers should pass in the original error as a string and the date
    /// string that caused the error.
    #[error("could not handle date-time string \"{1}\": {0}")]
    InvalidDateFormat(String, String),

    /// The backend could not be reached at all.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("could not reach the backend: {0}")]
    BackendUnreachable(String),

    /// The backend answered with a non-success status.
    ///
    /// `message` carries the backend's human-readable explanation when the
    /// error body has one, otherwise the raw body text.
    #[error("the backend rejected the request with status {status}: {message}")]
    BackendRejected {
        /// The HTTP status code the backend answered with.
        status: u16,
        /// The `message` field of the error body, or the raw body text.
        message: String,
    },

    /// The backend answered with a success status but a body that could not
    /// be decoded.
    #[error("could not decode the backend response: {0}")]
    UnexpectedResponse(String),

    /// An empty string was used as a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// A new category name matched an existing default or user category.
    #[error("the category \"{0}\" already exists")]
    DuplicateCategory(String),

    /// The month filter was not a valid `YYYY-MM` string.
    #[error("\"{0}\" is not a valid month, expected the format YYYY-MM")]
    InvalidMonth(String),

    /// A date in the future was used to record a transaction.
    ///
    /// Transactions record events that have already happened, therefore future
    /// dates are not allowed.
    #[error("{0} is a date in the future, which is not allowed")]
    FutureDate(Date),

    /// A zero or negative amount was used to record a transaction.
    #[error("the transaction amount must be greater than zero")]
    NonPositiveAmount,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// The multipart form could not be parsed as a list of CSV files.
    #[error("Could not parse multipart form: {0}")]
    MultipartError(String),

    /// The multipart form did not contain a CSV file.
    #[error("File is not a CSV")]
    NotCsv,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::BackendUnreachable(details) => {
                tracing::error!("Backend unreachable: {details}");
                render_internal_server_error(
                    "Service Unavailable",
                    "Could not reach the WealthVerse service. Please try again later.",
                )
            }
            Error::BackendRejected { status, message } if status == 404 => {
                tracing::warn!("Backend reported missing resource: {message}");
                get_404_not_found_response()
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                render_internal_server_error(
                    "Sorry, something went wrong.",
                    "Try again later or check the server logs",
                )
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            // An expired or revoked token cannot be fixed by retrying, so the
            // client is sent back to the log-in page instead of shown an alert.
            Error::BackendRejected { status, message } if api::is_auth_failure(status) => {
                tracing::warn!("The backend no longer accepts the session: {message}");
                (
                    StatusCode::SEE_OTHER,
                    axum_htmx::HxRedirect(endpoints::LOG_IN_VIEW.to_owned()),
                    (),
                )
                    .into_response()
            }
            Error::BackendUnreachable(details) => {
                tracing::error!("Backend unreachable: {details}");
                render(
                    StatusCode::SERVICE_UNAVAILABLE,
                    Alert::Error {
                        message: "Service unavailable".to_owned(),
                        details: "Could not reach the WealthVerse service. Please try again later."
                            .to_owned(),
                    }
                    .into_html(),
                )
            }
            Error::BackendRejected { status, message } => render(
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                Alert::Error {
                    message: "Request rejected".to_owned(),
                    details: message,
                }
                .into_html(),
            ),
            Error::FutureDate(date) => render(
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid transaction date".to_owned(),
                    details: format!("{date} is a date in the future, which is not allowed."),
                }
                .into_html(),
            ),
            Error::NonPositiveAmount => render(
                StatusCode::BAD_REQUEST,
                Alert::ErrorSimple {
                    message: "The amount must be greater than zero.".to_owned(),
                }
                .into_html(),
            ),
            Error::InvalidMonth(month) => render(
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid month filter".to_owned(),
                    details: format!("\"{month}\" is not a month in the format YYYY-MM."),
                }
                .into_html(),
            ),
            Error::EmptyCategoryName => render(
                StatusCode::BAD_REQUEST,
                Alert::ErrorSimple {
                    message: "Category name cannot be empty.".to_owned(),
                }
                .into_html(),
            ),
            Error::DuplicateCategory(name) => render(
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Duplicate category".to_owned(),
                    details: format!(
                        "The category \"{name}\" already exists. \
                        Pick it from the list instead of creating it again."
                    ),
                }
                .into_html(),
            ),
            Error::NotCsv => render(
                StatusCode::BAD_REQUEST,
                Alert::ErrorSimple {
                    message: "File type must be CSV.".to_owned(),
                }
                .into_html(),
            ),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                render(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Something went wrong".to_owned(),
                        details: "An unexpected error occurred, check the server logs for more details."
                            .to_owned(),
                    }
                    .into_html(),
                )
            }
        }
    }
}
