//! The form for recording a transaction by hand.

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    AppState, Error,
    api::{
        ApiClient,
        models::{AddTransactionRequest, PaymentMode, TransactionType},
    },
    auth::Session,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, base,
        loading_spinner, rupee_input_styles,
    },
    navigation::NavBar,
};

/// Wire format of the form's date field.
const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// The state needed for recording transactions.
#[derive(Debug, Clone)]
pub struct NewTransactionState {
    pub api_client: ApiClient,
}

impl FromRef<AppState> for NewTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api_client: state.api_client.clone(),
        }
    }
}

/// The new-transaction form data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransactionForm {
    pub amount: f64,
    pub merchant_name: String,
    pub payment_mode: PaymentMode,
    pub transaction_type: TransactionType,
    /// The transaction date as `yyyy-MM-dd`.
    pub date: String,
}

/// Display the form for recording a new transaction.
pub async fn get_new_transaction_page() -> Response {
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-md space-y-4"
            {
                h1 class="text-xl font-bold" { "Add Transaction" }

                (new_transaction_form())
            }
        }
    };

    crate::html::render(
        StatusCode::OK,
        base("Add Transaction", &[rupee_input_styles()], &content),
    )
}

fn new_transaction_form() -> Markup {
    html! {
        form
            hx-post=(endpoints::TRANSACTIONS_API)
            hx-indicator="#indicator"
            class="space-y-4"
        {
            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                div class="input-wrapper w-full"
                {
                    input
                        type="number"
                        name="amount"
                        id="amount"
                        min="0.01"
                        step="0.01"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label for="merchant_name" class=(FORM_LABEL_STYLE) { "Merchant" }

                input
                    type="text"
                    name="merchant_name"
                    id="merchant_name"
                    placeholder="e.g. Uber"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="payment_mode" class=(FORM_LABEL_STYLE) { "Payment mode" }

                select name="payment_mode" id="payment_mode" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for mode in PaymentMode::ALL {
                        option value=(mode.wire_value()) { (mode.display_name()) }
                    }
                }
            }

            div
            {
                label for="transaction_type" class=(FORM_LABEL_STYLE) { "Type" }

                select name="transaction_type" id="transaction_type" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value=(TransactionType::Debit.wire_value()) { "Debit" }
                    option value=(TransactionType::Credit.wire_value()) { "Credit" }
                }
            }

            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                input
                    type="date"
                    name="date"
                    id="date"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE)
            {
                span id="indicator" class="htmx-indicator" { (loading_spinner()) }

                "Save"
            }
        }
    }
}

/// Check the submitted form against the rules the backend also enforces, so
/// bad input never leaves the browser tier.
///
/// # Errors
///
/// - [Error::NonPositiveAmount] if `amount` is zero or negative.
/// - [Error::InvalidDateFormat] if `date` is not a `yyyy-MM-dd` date.
/// - [Error::FutureDate] if `date` is after today.
fn validate_new_transaction(form: &NewTransactionForm) -> Result<Date, Error> {
    if form.amount <= 0.0 {
        return Err(Error::NonPositiveAmount);
    }

    let date = Date::parse(&form.date, DATE_FORMAT)
        .map_err(|error| Error::InvalidDateFormat(error.to_string(), form.date.clone()))?;

    if date > OffsetDateTime::now_utc().date() {
        return Err(Error::FutureDate(date));
    }

    Ok(date)
}

/// Turn a merchant name into the stable identifier the backend keys
/// mappings on, e.g. "Cafe Coffee Day" becomes "cafe-coffee-day".
fn merchant_id_from_name(merchant_name: &str) -> String {
    merchant_name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Handler for recording a new transaction.
///
/// On success the client is redirected to the ledger, which re-fetches the
/// first page so the new transaction shows up immediately.
pub async fn post_create_transaction(
    State(state): State<NewTransactionState>,
    Extension(session): Extension<Session>,
    Form(form): Form<NewTransactionForm>,
) -> Response {
    let date = match validate_new_transaction(&form) {
        Ok(date) => date,
        Err(error) => return error.into_alert_response(),
    };

    let request = AddTransactionRequest {
        amount: form.amount,
        payment_mode: form.payment_mode,
        merchant_id: merchant_id_from_name(&form.merchant_name),
        merchant_name: form.merchant_name.trim().to_owned(),
        transaction_type: form.transaction_type,
        created_at: format!("{}T00:00:00", form.date),
    };

    if let Err(error) = state
        .api_client
        .add_transaction(&session.access_token, &request)
        .await
    {
        tracing::error!(
            "Could not record a transaction for \"{}\" on {date}: {error}",
            request.merchant_name
        );
        return error.into_alert_response();
    }

    (
        StatusCode::SEE_OTHER,
        HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
        (),
    )
        .into_response()
}



#[cfg(test)]
mod post_create_transaction_tests {
    use axum::{Extension, extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use axum_htmx::HX_REDIRECT;

    use crate::{
        ApiClient,
        api::models::{PaymentMode, TransactionType},
        auth::Session,
        test_utils::backend::FakeBackend,
    };

    use super::{NewTransactionForm, NewTransactionState, post_create_transaction};

    fn test_session() -> Session {
        Session {
            access_token: "token".to_owned(),
            refresh_token: "refresh".to_owned(),
            user_id: 1,
        }
    }

    fn form(amount: f64) -> NewTransactionForm {
        NewTransactionForm {
            amount,
            merchant_name: "Uber".to_owned(),
            payment_mode: PaymentMode::Upi,
            transaction_type: TransactionType::Debit,
            date: "2024-05-04".to_owned(),
        }
    }

    #[tokio::test]
    async fn valid_form_is_recorded_and_redirects_to_ledger() {
        let backend = FakeBackend::new().start().await;
        let state = NewTransactionState {
            api_client: ApiClient::new(&backend.base_url()),
        };

        let response =
            post_create_transaction(State(state), Extension(test_session()), Form(form(129.5)))
                .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(HX_REDIRECT).unwrap(),
            "/transactions"
        );

        let recorded = backend.recorded_transaction_additions();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].merchant_id, "uber");
        assert_eq!(recorded[0].created_at, "2024-05-04T00:00:00");
    }

    #[tokio::test]
    async fn non_positive_amount_is_rejected_without_backend_calls() {
        let backend = FakeBackend::new().start().await;
        let state = NewTransactionState {
            api_client: ApiClient::new(&backend.base_url()),
        };

        let response =
            post_create_transaction(State(state), Extension(test_session()), Form(form(0.0)))
                .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(
            response.headers().get(HX_REDIRECT).is_none(),
            "a rejected transaction must not redirect"
        );
        assert!(backend.recorded_transaction_additions().is_empty());
    }
}
