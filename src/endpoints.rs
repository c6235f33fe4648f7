//! The application's route URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/chat/{chat_id}/message',
//! use [format_endpoint].

/// The root route which redirects to the transactions ledger or log in page.
pub const ROOT: &str = "/";
/// The page for displaying a user's transactions.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page for recording a new transaction.
pub const NEW_TRANSACTION_VIEW: &str = "/transactions/new";
/// The page for importing transactions from CSV files.
pub const IMPORT_VIEW: &str = "/transactions/import";
/// The page for the monthly spend analysis tables.
pub const SPEND_VIEW: &str = "/spend";
/// The page for the carbon footprint summary and emission calculator.
pub const CARBON_VIEW: &str = "/carbon";
/// The page for the financial assistant chat.
pub const CHAT_VIEW: &str = "/chat";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";
/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route for creating a new user account.
pub const REGISTER_API: &str = "/api/register";
/// The route to record a transaction.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to re-categorise a transaction, or all transactions from a merchant.
pub const APPLY_CATEGORY_API: &str = "/api/transactions/apply-category";
/// The route to register a custom category before applying it.
pub const CATEGORIES_API: &str = "/api/categories";
/// The route to upload CSV files for importing transactions.
pub const IMPORT: &str = "/api/import";
/// The route for the emission calculator fragment.
pub const EMISSION_API: &str = "/api/emission";
/// The route to start a chat session.
pub const CHAT_START_API: &str = "/api/chat/start";
/// The route to send a message within a chat session.
pub const CHAT_MESSAGE_API: &str = "/api/chat/{chat_id}/message";
/// The route to end a chat session.
pub const CHAT_END_API: &str = "/api/chat/{chat_id}/end";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/chat/{chat_id}/message',
/// '{chat_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: &str) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::ROOT);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::NEW_TRANSACTION_VIEW);
        assert_endpoint_is_valid_uri(endpoints::IMPORT_VIEW);
        assert_endpoint_is_valid_uri(endpoints::SPEND_VIEW);
        assert_endpoint_is_valid_uri(endpoints::CARBON_VIEW);
        assert_endpoint_is_valid_uri(endpoints::CHAT_VIEW);
        assert_endpoint_is_valid_uri(endpoints::REGISTER_VIEW);
        assert_endpoint_is_valid_uri(endpoints::LOG_IN_VIEW);
        assert_endpoint_is_valid_uri(endpoints::INTERNAL_ERROR_VIEW);
        assert_endpoint_is_valid_uri(endpoints::STATIC);

        assert_endpoint_is_valid_uri(endpoints::COFFEE);
        assert_endpoint_is_valid_uri(endpoints::LOG_IN_API);
        assert_endpoint_is_valid_uri(endpoints::LOG_OUT);
        assert_endpoint_is_valid_uri(endpoints::REGISTER_API);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS_API);
        assert_endpoint_is_valid_uri(endpoints::APPLY_CATEGORY_API);
        assert_endpoint_is_valid_uri(endpoints::CATEGORIES_API);
        assert_endpoint_is_valid_uri(endpoints::IMPORT);
        assert_endpoint_is_valid_uri(endpoints::EMISSION_API);
        assert_endpoint_is_valid_uri(endpoints::CHAT_START_API);
        assert_endpoint_is_valid_uri(endpoints::CHAT_MESSAGE_API);
        assert_endpoint_is_valid_uri(endpoints::CHAT_END_API);
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/api/chat/{chat_id}/message", "abc-123");

        assert_eq!(formatted_path, "/api/chat/abc-123/message");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", "1");

        assert_eq!(formatted_path, "/hello/world");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn parameter_at_end() {
        let formatted_path = format_endpoint("/hello/{world}", "1");

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}
