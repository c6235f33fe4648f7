//! Category handling for the reconciliation flow: the default category
//! enumeration, client-side duplicate checks, and the handler that registers
//! a new custom category for a merchant.

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    api::{ApiClient, models::CategoryApplyRequest},
    auth::Session,
    endpoints,
    transaction::query::TransactionsQuery,
};

/// The categories every account starts with. User customs are layered on top.
pub const DEFAULT_CATEGORIES: [&str; 8] = [
    "Food",
    "Shopping",
    "Transportation",
    "Entertainment",
    "Utilities",
    "Healthcare",
    "Education",
    "Other",
];

/// Check a proposed category name against the defaults and the user's
/// existing categories without calling the backend.
///
/// # Errors
///
/// - [Error::EmptyCategoryName] if the trimmed name is empty.
/// - [Error::DuplicateCategory] if the name matches an existing category,
///   ignoring case and surrounding whitespace.
pub fn validate_new_category_name(name: &str, existing: &[String]) -> Result<String, Error> {
    let name = name.trim();

    if name.is_empty() {
        return Err(Error::EmptyCategoryName);
    }

    let is_taken = DEFAULT_CATEGORIES
        .iter()
        .copied()
        .chain(existing.iter().map(String::as_str))
        .any(|existing_name| existing_name.trim().eq_ignore_ascii_case(name));

    if is_taken {
        return Err(Error::DuplicateCategory(name.to_owned()));
    }

    Ok(name.to_owned())
}

/// The state needed for registering custom categories.
#[derive(Debug, Clone)]
pub struct CategoryState {
    /// The client for the backend that stores categories and mappings.
    pub api_client: ApiClient,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api_client: state.api_client.clone(),
        }
    }
}

/// The new-category branch of the inline category editor.
///
/// The existing category names are rendered into the form as hidden fields so
/// the duplicate check needs no backend round-trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategoryForm {
    /// The proposed category name.
    pub name: String,
    pub transaction_id: i64,
    pub merchant_name: String,
    /// "all" applies the category to every transaction from the merchant.
    pub scope: String,
    /// The user's existing custom category names.
    #[serde(default)]
    pub existing: Vec<String>,
    /// The ledger page to return to.
    pub page: u64,
    pub size: u64,
    pub month: Option<String>,
}

/// Handler for creating a custom category and applying it to a merchant.
///
/// Empty and duplicate names are rejected before any backend call. Otherwise
/// the category is registered, the merchant mapping recorded, the category
/// applied with the chosen scope, and the client redirected back to the
/// ledger page it came from.
pub async fn post_create_category(
    State(state): State<CategoryState>,
    Extension(session): Extension<Session>,
    Form(form): Form<NewCategoryForm>,
) -> Response {
    let name = match validate_new_category_name(&form.name, &form.existing) {
        Ok(name) => name,
        Err(error) => return error.into_alert_response(),
    };

    let token = session.access_token.as_str();

    if let Err(error) = state.api_client.add_custom_category(token, &name).await {
        tracing::error!("Could not create category \"{name}\": {error}");
        return error.into_alert_response();
    }

    if let Err(error) = state
        .api_client
        .add_custom_mapping(token, &form.merchant_name, &name)
        .await
    {
        tracing::error!(
            "Could not map merchant \"{}\" to category \"{name}\": {error}",
            form.merchant_name
        );
        return error.into_alert_response();
    }

    let apply_to_all = form.scope == "all";
    let request = CategoryApplyRequest {
        transaction_id: (!apply_to_all).then_some(form.transaction_id),
        merchant_name: form.merchant_name.clone(),
        new_category_name: name,
        apply_to_all,
    };

    if let Err(error) = state.api_client.apply_category(token, &request).await {
        tracing::error!("Could not apply new category: {error}");
        return error.into_alert_response();
    }

    let ledger_url = TransactionsQuery {
        page: form.page,
        size: form.size,
        month: form.month,
    }
    .to_url(endpoints::TRANSACTIONS_VIEW);

    (StatusCode::SEE_OTHER, HxRedirect(ledger_url), ()).into_response()
}

#[cfg(test)]
mod validate_new_category_name_tests {
    use crate::Error;

    use super::validate_new_category_name;

    #[test]
    fn accepts_unused_name_and_trims_it() {
        let got = validate_new_category_name("  Travel ", &["Gaming".to_owned()]);

        assert_eq!(got, Ok("Travel".to_owned()));
    }

    #[test]
    fn rejects_empty_name() {
        assert_eq!(
            validate_new_category_name("   ", &[]),
            Err(Error::EmptyCategoryName)
        );
    }

    #[test]
    fn rejects_default_category_ignoring_case() {
        assert_eq!(
            validate_new_category_name("food", &[]),
            Err(Error::DuplicateCategory("food".to_owned()))
        );
    }

    #[test]
    fn rejects_existing_user_category() {
        assert_eq!(
            validate_new_category_name("Travel", &["travel".to_owned()]),
            Err(Error::DuplicateCategory("Travel".to_owned()))
        );
    }
}

#[cfg(test)]
mod post_create_category_tests {
    use axum::{Extension, extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use axum_htmx::HX_REDIRECT;

    use crate::{ApiClient, auth::Session, test_utils::backend::FakeBackend};

    use super::{CategoryState, NewCategoryForm, post_create_category};

    fn test_session() -> Session {
        Session {
            access_token: "token".to_owned(),
            refresh_token: "refresh".to_owned(),
            user_id: 1,
        }
    }

    fn form(name: &str, existing: Vec<String>) -> NewCategoryForm {
        NewCategoryForm {
            name: name.to_owned(),
            transaction_id: 42,
            merchant_name: "Uber".to_owned(),
            scope: "all".to_owned(),
            existing,
            page: 1,
            size: 10,
            month: Some("2025-10".to_owned()),
        }
    }

    #[tokio::test]
    async fn creates_category_mapping_and_redirects_to_ledger() {
        let backend = FakeBackend::new().start().await;
        let state = CategoryState {
            api_client: ApiClient::new(&backend.base_url()),
        };

        let response = post_create_category(
            State(state),
            Extension(test_session()),
            Form(form("Travel", vec![])),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(HX_REDIRECT).unwrap(),
            "/transactions?page=1&size=10&month=2025-10"
        );
        assert_eq!(backend.recorded_mapping_registrations().len(), 1);
        assert_eq!(backend.recorded_category_applications().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected_without_backend_calls() {
        let backend = FakeBackend::new().start().await;
        let state = CategoryState {
            api_client: ApiClient::new(&backend.base_url()),
        };

        let response = post_create_category(
            State(state),
            Extension(test_session()),
            Form(form("Travel", vec!["travel".to_owned()])),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(
            backend.recorded_mapping_registrations().is_empty(),
            "a duplicate name must not reach the backend"
        );
        assert!(backend.recorded_category_applications().is_empty());
    }

    #[tokio::test]
    async fn empty_name_is_rejected_without_backend_calls() {
        let backend = FakeBackend::new().start().await;
        let state = CategoryState {
            api_client: ApiClient::new(&backend.base_url()),
        };

        let response = post_create_category(
            State(state),
            Extension(test_session()),
            Form(form("  ", vec![])),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(backend.recorded_mapping_registrations().is_empty());
    }
}
