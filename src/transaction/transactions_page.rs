//! The transactions ledger page.
//!
//! The ledger URL is canonical: requests missing `page` or `size`, or
//! carrying a month filter that normalization changed, are redirected to the
//! fully-specified URL so that browser history, bookmarks and htmx pushes all
//! agree on what the user was looking at.

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    AppState, Error,
    api::{ApiClient, is_auth_failure},
    auth::Session,
    endpoints,
    html::render,
    pagination::{PageWindow, PaginationConfig},
};

use super::{
    models::TransactionRow,
    query::{LedgerQuery, TransactionsQuery},
    view::{LedgerContent, transactions_view},
};

/// The state needed for displaying the transactions ledger.
#[derive(Debug, Clone)]
pub struct TransactionsViewState {
    /// The client for the backend that owns the transaction data.
    pub api_client: ApiClient,
    /// The config for how many transactions to display per page.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api_client: state.api_client.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// Display the user's transactions for the requested page window.
///
/// The backend picks the window contents; this handler only mirrors what came
/// back. A backend failure renders the ledger in a fetch-failed state rather
/// than an error page so the user keeps the navigation and a retry link.
pub async fn get_transactions_page(
    State(state): State<TransactionsViewState>,
    Extension(session): Extension<Session>,
    Query(raw_query): Query<LedgerQuery>,
) -> Response {
    let query = match TransactionsQuery::normalize(raw_query.clone(), &state.pagination_config) {
        Ok(query) => query,
        Err(Error::InvalidMonth(month)) => {
            tracing::warn!("Dropping invalid month filter {month:?} from ledger request");

            let without_month = LedgerQuery {
                month: None,
                ..raw_query
            };
            // Cannot fail with the month removed.
            let Ok(query) = TransactionsQuery::normalize(without_month, &state.pagination_config)
            else {
                return crate::html::render_internal_server_error(
                    "Something went wrong displaying your transactions.",
                    "Try refreshing the page.",
                );
            };

            return Redirect::to(&query.to_url(endpoints::TRANSACTIONS_VIEW)).into_response();
        }
        Err(error) => {
            tracing::error!("Could not interpret the ledger query: {error}");
            return crate::html::render_internal_server_error(
                "Something went wrong displaying your transactions.",
                "Try refreshing the page.",
            );
        }
    };

    if query.differs_from(&raw_query) {
        return Redirect::to(&query.to_url(endpoints::TRANSACTIONS_VIEW)).into_response();
    }

    let user_categories = fetch_user_categories(&state.api_client, &session).await;

    let content = match state
        .api_client
        .get_transactions(
            &session.access_token,
            query.page,
            query.size,
            query.month.as_deref(),
        )
        .await
    {
        Ok(page) => {
            let window = PageWindow::from_response(&page);
            let rows = page.content.into_iter().map(TransactionRow::new).collect();

            LedgerContent::Loaded { rows, window }
        }
        Err(Error::BackendRejected { status, message }) if is_auth_failure(status) => {
            tracing::warn!("The backend no longer accepts the session: {message}");
            return Redirect::to(endpoints::LOG_IN_VIEW).into_response();
        }
        Err(error) => {
            tracing::error!("Could not fetch transactions: {error}");

            LedgerContent::FetchFailed
        }
    };

    render(
        StatusCode::OK,
        transactions_view(&query, content, &user_categories),
    )
}

/// Fetch the user's custom category names for the inline editor.
///
/// The editor still works with only the default categories, so a failure here
/// degrades the page instead of failing it.
async fn fetch_user_categories(api_client: &ApiClient, session: &Session) -> Vec<String> {
    match api_client.list_user_categories(&session.access_token).await {
        Ok(categories) => categories
            .into_iter()
            .map(|category| category.name)
            .collect(),
        Err(error) => {
            tracing::warn!("Could not fetch custom categories: {error}");

            vec![]
        }
    }
}
