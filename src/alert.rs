//! Alert fragments for displaying success and error messages to users.
//!
//! Alerts are swapped out-of-band into the fixed `#alert-container` element
//! that [crate::html::base] renders on every page, so any htmx response can
//! attach one without knowing which page it came from.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

/// A message shown to the user at the bottom of the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    /// An operation succeeded.
    Success {
        /// The headline of the alert.
        message: String,
        /// Supporting detail below the headline.
        details: String,
    },
    /// An operation failed.
    Error {
        /// The headline of the alert.
        message: String,
        /// Supporting detail below the headline.
        details: String,
    },
    /// An operation failed and there is nothing useful to add.
    ErrorSimple {
        /// The headline of the alert.
        message: String,
    },
}

const SUCCESS_STYLE: &str = "flex items-start gap-3 w-full p-4 mb-4 rounded-lg border \
    text-green-800 border-green-300 bg-green-50 dark:bg-gray-800 \
    dark:text-green-400 dark:border-green-800";

const ERROR_STYLE: &str = "flex items-start gap-3 w-full p-4 mb-4 rounded-lg border \
    text-red-800 border-red-300 bg-red-50 dark:bg-gray-800 \
    dark:text-red-400 dark:border-red-800";

impl Alert {
    /// Render the alert as an out-of-band swap into `#alert-container`.
    pub fn into_html(self) -> Markup {
        let (style, message, details) = match self {
            Alert::Success { message, details } => (SUCCESS_STYLE, message, details),
            Alert::Error { message, details } => (ERROR_STYLE, message, details),
            Alert::ErrorSimple { message } => (ERROR_STYLE, message, String::new()),
        };

        html! {
            div id="alert-container" hx-swap-oob="true" class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div class=(style) role="alert"
                {
                    div class="flex-1"
                    {
                        p class="font-medium" { (message) }

                        @if !details.is_empty() {
                            p class="text-sm" { (details) }
                        }
                    }

                    button
                        type="button"
                        aria-label="Dismiss"
                        class="ms-auto -mx-1.5 -my-1.5 rounded-lg p-1.5 inline-flex items-center
                            justify-center h-8 w-8 hover:bg-gray-100 dark:hover:bg-gray-700"
                        onclick="this.closest('[role=alert]').remove()"
                    {
                        "✕"
                    }
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}
