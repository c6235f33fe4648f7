//! The inline category editor shown on reconcilable ledger rows, plus the
//! handler that applies a chosen category.
//!
//! The editor lives inside a `<details>` element so cancelling is a pure
//! client-side close with no network effect. All the context the handlers
//! need (merchant, page selection, existing categories) is embedded in the
//! forms as hidden fields.

use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    api::models::{CategoryApplyRequest, Transaction},
    category::{CategoryState, DEFAULT_CATEGORIES},
    endpoints,
    html::{
        FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE,
    },
    transaction::query::TransactionsQuery,
};

/// The existing-category branch of the inline editor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyCategoryForm {
    pub transaction_id: i64,
    pub merchant_name: String,
    /// The category the user picked from the list.
    pub category_name: String,
    /// "single" or "all".
    pub scope: String,
    /// The ledger page to return to.
    pub page: u64,
    pub size: u64,
    pub month: Option<String>,
}

/// Handler for applying an existing category to one transaction or every
/// transaction from a merchant.
///
/// On success the client is redirected back to the ledger page it came from,
/// which re-fetches the window from the backend.
pub async fn post_apply_category(
    State(state): State<CategoryState>,
    Extension(session): Extension<crate::auth::Session>,
    Form(form): Form<ApplyCategoryForm>,
) -> Response {
    let apply_to_all = form.scope == "all";
    let request = CategoryApplyRequest {
        transaction_id: (!apply_to_all).then_some(form.transaction_id),
        merchant_name: form.merchant_name.clone(),
        new_category_name: form.category_name.clone(),
        apply_to_all,
    };

    if let Err(error) = state
        .api_client
        .apply_category(&session.access_token, &request)
        .await
    {
        tracing::error!(
            "Could not apply category \"{}\" to merchant \"{}\": {error}",
            form.category_name,
            form.merchant_name
        );
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

fn hidden_context_fields(query: &TransactionsQuery, transaction: &Transaction) -> Markup {
    html! {
        input type="hidden" name="transaction_id" value=(transaction.id);
        input type="hidden" name="merchant_name" value=(transaction.merchant_name);
        input type="hidden" name="page" value=(query.page);
        input type="hidden" name="size" value=(query.size);

        @if let Some(month) = &query.month {
            input type="hidden" name="month" value=(month);
        }
    }
}

fn scope_radios(id_prefix: &str, merchant_name: &str) -> Markup {
    html! {
        fieldset class=(FORM_RADIO_GROUP_STYLE)
        {
            legend class=(FORM_LABEL_STYLE) { "Apply to" }

            div class="flex items-center gap-2"
            {
                input
                    type="radio"
                    name="scope"
                    value="single"
                    id=(format!("{id_prefix}-scope-single"))
                    checked
                    class=(FORM_RADIO_INPUT_STYLE);

                label for=(format!("{id_prefix}-scope-single")) class=(FORM_RADIO_LABEL_STYLE)
                {
                    "This transaction only"
                }
            }

            div class="flex items-center gap-2"
            {
                input
                    type="radio"
                    name="scope"
                    value="all"
                    id=(format!("{id_prefix}-scope-all"))
                    class=(FORM_RADIO_INPUT_STYLE);

                label for=(format!("{id_prefix}-scope-all")) class=(FORM_RADIO_LABEL_STYLE)
                {
                    "All transactions from " (merchant_name)
                }
            }
        }
    }
}

/// The editor fragment for one ledger row.
///
/// Closing the `<details>` element is the cancel path; no request leaves the
/// browser until one of the two forms is submitted.
pub(crate) fn category_editor(
    query: &TransactionsQuery,
    transaction: &Transaction,
    user_categories: &[String],
) -> Markup {
    let id_prefix = format!("edit-category-{}", transaction.id);

    html! {
        details class="inline-block ml-2 align-middle" id=(id_prefix)
        {
            summary
                role="button"
                aria-label=(format!("Edit category for {}", transaction.merchant_name))
                class="list-none [&::-webkit-details-marker]:hidden inline-flex cursor-pointer
                    text-gray-400 hover:text-blue-600 dark:hover:text-blue-400"
            {
                "✎"
            }

            div class="absolute z-30 mt-2 w-72 rounded-xl border border-gray-200 bg-white
                p-4 shadow-xl space-y-4 dark:border-gray-700 dark:bg-gray-900"
            {
                form
                    hx-post=(endpoints::APPLY_CATEGORY_API)
                    hx-indicator="#indicator"
                    class="space-y-3"
                {
                    (hidden_context_fields(query, transaction))

                    div
                    {
                        label
                            for=(format!("{id_prefix}-select"))
                            class=(FORM_LABEL_STYLE)
                        {
                            "Category"
                        }

                        select
                            name="category_name"
                            id=(format!("{id_prefix}-select"))
                            class=(FORM_TEXT_INPUT_STYLE)
                        {
                            @for name in DEFAULT_CATEGORIES {
                                option
                                    value=(name)
                                    selected[name == transaction.category_name]
                                {
                                    (name)
                                }
                            }

                            @for name in user_categories {
                                option
                                    value=(name)
                                    selected[*name == transaction.category_name]
                                {
                                    (name)
                                }
                            }
                        }
                    }

                    (scope_radios(&id_prefix, &transaction.merchant_name))

                    button
                        type="submit"
                        class="w-full px-3 py-2 text-sm bg-blue-500 dark:bg-blue-600
                            hover:bg-blue-600 hover:dark:bg-blue-700 text-white rounded"
                    {
                        "Apply"
                    }
                }

                details
                {
                    summary
                        class="list-none [&::-webkit-details-marker]:hidden cursor-pointer
                            text-sm text-blue-600 hover:underline dark:text-blue-400"
                    {
                        "Add new category"
                    }

                    form
                        hx-post=(endpoints::CATEGORIES_API)
                        hx-indicator="#indicator"
                        class="mt-3 space-y-3"
                    {
                        (hidden_context_fields(query, transaction))

                        @for name in user_categories {
                            input type="hidden" name="existing" value=(name);
                        }

                        div
                        {
                            label
                                for=(format!("{id_prefix}-new-name"))
                                class=(FORM_LABEL_STYLE)
                            {
                                "New category name"
                            }

                            input
                                type="text"
                                name="name"
                                id=(format!("{id_prefix}-new-name"))
                                required
                                class=(FORM_TEXT_INPUT_STYLE);
                        }

                        (scope_radios(&format!("{id_prefix}-new"), &transaction.merchant_name))

                        button
                            type="submit"
                            class="w-full px-3 py-2 text-sm bg-blue-500 dark:bg-blue-600
                                hover:bg-blue-600 hover:dark:bg-blue-700 text-white rounded"
                        {
                            "Create and apply"
                        }
                    }
                }

                button
                    type="button"
                    onclick=(format!("document.getElementById('{id_prefix}').removeAttribute('open')"))
                    class="w-full px-3 py-2 text-sm text-gray-600 hover:bg-gray-100 rounded
                        dark:text-gray-300 dark:hover:bg-gray-800"
                {
                    "Cancel"
                }
            }
        }
    }
}

#[cfg(test)]
mod post_apply_category_tests {
    use axum::{Extension, extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use axum_htmx::HX_REDIRECT;

    use crate::{
        ApiClient, auth::Session, category::CategoryState, test_utils::backend::FakeBackend,
    };

    use super::{ApplyCategoryForm, post_apply_category};

    fn test_session() -> Session {
        Session {
            access_token: "token".to_owned(),
            refresh_token: "refresh".to_owned(),
            user_id: 1,
        }
    }

    fn form(scope: &str) -> ApplyCategoryForm {
        ApplyCategoryForm {
            transaction_id: 42,
            merchant_name: "Uber".to_owned(),
            category_name: "Travel".to_owned(),
            scope: scope.to_owned(),
            page: 2,
            size: 10,
            month: None,
        }
    }

    #[tokio::test]
    async fn apply_to_all_issues_one_call_and_redirects_to_same_page() {
        let backend = FakeBackend::new().start().await;
        let state = CategoryState {
            api_client: ApiClient::new(&backend.base_url()),
        };

        let response =
            post_apply_category(State(state), Extension(test_session()), Form(form("all"))).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(HX_REDIRECT).unwrap(),
            "/transactions?page=2&size=10"
        );

        let applications = backend.recorded_category_applications();
        assert_eq!(applications.len(), 1, "want exactly one apply call");
        assert!(applications[0].apply_to_all);
        assert_eq!(applications[0].new_category_name, "Travel");
        assert_eq!(applications[0].transaction_id, None);
    }

    #[tokio::test]
    async fn single_scope_sends_the_transaction_id() {
        let backend = FakeBackend::new().start().await;
        let state = CategoryState {
            api_client: ApiClient::new(&backend.base_url()),
        };

        let response = post_apply_category(
            State(state),
            Extension(test_session()),
            Form(form("single")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let applications = backend.recorded_category_applications();
        assert_eq!(applications.len(), 1);
        assert!(!applications[0].apply_to_all);
        assert_eq!(applications[0].transaction_id, Some(42));
    }

    #[tokio::test]
    async fn backend_failure_renders_alert_without_redirect() {
        let state = CategoryState {
            api_client: ApiClient::new("http://127.0.0.1:1"),
        };

        let response =
            post_apply_category(State(state), Extension(test_session()), Form(form("all"))).await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(
            response.headers().get(HX_REDIRECT).is_none(),
            "a failed apply must not redirect"
        );
    }
}
