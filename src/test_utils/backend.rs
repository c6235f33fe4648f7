//! An in-process stand-in for the WealthVerse REST backend.
//!
//! The fake serves the same routes the real backend does, answers with
//! canned data, and records every mutating request so tests can assert on
//! exactly what left the web tier.

use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;

use crate::api::models::{
    AddTransactionRequest, CategoryApplyRequest, CategorySummary, EmissionCalculationRequest,
    MonthlySummary, PaymentMode, Transaction, TransactionPage, TransactionType,
};

/// Builder for the fake backend.
pub(crate) struct FakeBackend {
    transaction_count: u64,
    login_failure: Option<String>,
    register_failure: Option<String>,
}

/// The query parameters of a recorded `getall` request.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TransactionQuery {
    pub page: Option<u64>,
    pub size: Option<u64>,
    pub month: Option<String>,
}

/// A recorded merchant-to-category mapping registration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MappingRegistration {
    pub merchant_name: String,
    pub category_name: String,
}

/// A recorded CSV import.
#[derive(Debug, Clone)]
pub(crate) struct CsvImport {
    pub file_name: String,
    pub contents: String,
}

#[derive(Debug, Default)]
struct Recorders {
    transaction_queries: Vec<TransactionQuery>,
    transaction_additions: Vec<AddTransactionRequest>,
    category_applications: Vec<CategoryApplyRequest>,
    mapping_registrations: Vec<MappingRegistration>,
    csv_imports: Vec<CsvImport>,
    emission_requests: Vec<EmissionCalculationRequest>,
}

#[derive(Clone)]
struct BackendState {
    transactions: Vec<Transaction>,
    login_failure: Option<String>,
    register_failure: Option<String>,
    recorders: Arc<Mutex<Recorders>>,
}

/// A running fake backend.
pub(crate) struct FakeBackendHandle {
    base_url: String,
    recorders: Arc<Mutex<Recorders>>,
}

impl FakeBackend {
    /// A backend with no transactions that accepts every request.
    pub fn new() -> Self {
        Self {
            transaction_count: 0,
            login_failure: None,
            register_failure: None,
        }
    }

    /// A backend seeded with `count` transactions.
    pub fn with_transactions(count: u64) -> Self {
        Self {
            transaction_count: count,
            ..Self::new()
        }
    }

    /// Make log-in attempts fail with a 401 carrying `message`.
    pub fn with_login_failure(mut self, message: &str) -> Self {
        self.login_failure = Some(message.to_owned());
        self
    }

    /// Make registration attempts fail with a 409 carrying `message`.
    pub fn with_register_failure(mut self, message: &str) -> Self {
        self.register_failure = Some(message.to_owned());
        self
    }

    /// Bind an ephemeral port, serve the backend on it, and return a handle
    /// for asserting on what it received.
    pub async fn start(self) -> FakeBackendHandle {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("could not bind fake backend listener");
        let address = listener
            .local_addr()
            .expect("could not read fake backend address");

        let state = BackendState {
            transactions: (0..self.transaction_count).map(make_transaction).collect(),
            login_failure: self.login_failure,
            register_failure: self.register_failure,
            recorders: Arc::new(Mutex::new(Recorders::default())),
        };
        let recorders = state.recorders.clone();

        let router = Router::new()
            .route("/api/auth/login", post(post_login))
            .route("/api/auth/register", post(post_register))
            .route("/api/auth/logout", post(accept))
            .route("/api/transactions/getall", get(get_all_transactions))
            .route("/api/transactions/add", post(post_add_transaction))
            .route("/api/transactions/apply-category", post(post_apply_category))
            .route("/api/transactions/import", post(post_import))
            .route("/api/category/user", get(get_user_categories))
            .route("/api/category/custom", post(accept))
            .route(
                "/api/category-mapping/mappings/custom",
                post(post_custom_mapping),
            )
            .route("/api/reports/monthly/{year_month}", get(get_monthly_summary))
            .route("/api/emission/calculate", post(post_calculate_emission))
            .route("/api/chats/start", post(post_start_chat))
            .route("/api/chats/{chat_id}/message", post(post_chat_message))
            .route("/api/chats/{chat_id}/end", post(accept))
            .with_state(state);

        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("fake backend stopped");
        });

        FakeBackendHandle {
            base_url: format!("http://{address}"),
            recorders,
        }
    }
}

impl FakeBackendHandle {
    pub fn base_url(&self) -> String {
        self.base_url.clone()
    }

    pub fn recorded_transaction_queries(&self) -> Vec<TransactionQuery> {
        self.recorders.lock().unwrap().transaction_queries.clone()
    }

    pub fn recorded_transaction_additions(&self) -> Vec<AddTransactionRequest> {
        self.recorders.lock().unwrap().transaction_additions.clone()
    }

    pub fn recorded_category_applications(&self) -> Vec<CategoryApplyRequest> {
        self.recorders.lock().unwrap().category_applications.clone()
    }

    pub fn recorded_mapping_registrations(&self) -> Vec<MappingRegistration> {
        self.recorders.lock().unwrap().mapping_registrations.clone()
    }

    pub fn recorded_csv_imports(&self) -> Vec<CsvImport> {
        self.recorders.lock().unwrap().csv_imports.clone()
    }

    pub fn recorded_emission_requests(&self) -> Vec<EmissionCalculationRequest> {
        self.recorders.lock().unwrap().emission_requests.clone()
    }
}

/// Shared handler for endpoints the tests never assert on.
async fn accept() -> StatusCode {
    StatusCode::OK
}

fn make_transaction(index: u64) -> Transaction {
    Transaction {
        id: index as i64 + 1,
        amount: 100.0 + index as f64,
        payment_mode: PaymentMode::Upi,
        merchant_id: format!("m-{index}"),
        merchant_name: format!("Merchant {index}"),
        transaction_type: TransactionType::Debit,
        category_id: Some(1),
        category_name: "Food".to_owned(),
        carbon_emitted: 10.0,
        created_at: "2024-05-04T13:30:00".to_owned(),
        global: true,
    }
}

fn auth_success_body() -> serde_json::Value {
    json!({
        "accessToken": "test-access-token",
        "refreshToken": "test-refresh-token",
        "id": 1,
    })
}

async fn post_login(State(state): State<BackendState>) -> Response {
    match &state.login_failure {
        Some(message) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": message })),
        )
            .into_response(),
        None => Json(auth_success_body()).into_response(),
    }
}

async fn post_register(State(state): State<BackendState>) -> Response {
    match &state.register_failure {
        Some(message) => {
            (StatusCode::CONFLICT, Json(json!({ "message": message }))).into_response()
        }
        None => Json(auth_success_body()).into_response(),
    }
}

async fn get_all_transactions(
    State(state): State<BackendState>,
    Query(query): Query<TransactionQuery>,
) -> Json<TransactionPage> {
    let page = query.page.unwrap_or(0);
    let size = query.size.unwrap_or(10).max(1);
    state
        .recorders
        .lock()
        .unwrap()
        .transaction_queries
        .push(query);

    let total_elements = state.transactions.len() as u64;
    let total_pages = total_elements.div_ceil(size);
    let start = usize::try_from(page * size).unwrap_or(usize::MAX);
    let content = state
        .transactions
        .iter()
        .skip(start)
        .take(size as usize)
        .cloned()
        .collect();

    Json(TransactionPage {
        content,
        total_elements,
        total_pages,
        number: page,
        size,
    })
}

async fn post_add_transaction(
    State(state): State<BackendState>,
    Json(request): Json<AddTransactionRequest>,
) -> StatusCode {
    state
        .recorders
        .lock()
        .unwrap()
        .transaction_additions
        .push(request);

    StatusCode::OK
}

async fn post_apply_category(
    State(state): State<BackendState>,
    Json(request): Json<CategoryApplyRequest>,
) -> StatusCode {
    state
        .recorders
        .lock()
        .unwrap()
        .category_applications
        .push(request);

    StatusCode::OK
}

async fn post_custom_mapping(
    State(state): State<BackendState>,
    Query(registration): Query<MappingRegistration>,
) -> StatusCode {
    state
        .recorders
        .lock()
        .unwrap()
        .mapping_registrations
        .push(registration);

    StatusCode::OK
}

async fn post_import(State(state): State<BackendState>, mut multipart: Multipart) -> StatusCode {
    while let Ok(Some(field)) = multipart.next_field().await {
        let file_name = field.file_name().unwrap_or_default().to_owned();
        let contents = field.text().await.unwrap_or_default();

        state
            .recorders
            .lock()
            .unwrap()
            .csv_imports
            .push(CsvImport {
                file_name,
                contents,
            });
    }

    StatusCode::OK
}

async fn get_user_categories() -> Json<serde_json::Value> {
    Json(json!([{ "id": 9, "name": "Gaming" }]))
}

async fn get_monthly_summary(Path(year_month): Path<String>) -> Json<MonthlySummary> {
    Json(MonthlySummary {
        year_month,
        category_summaries: vec![
            CategorySummary {
                category_id: Some(1),
                category_name: "Food".to_owned(),
                total_amount: 1200.0,
                total_emission: 50.0,
                emission_percentage: 62.5,
            },
            CategorySummary {
                category_id: Some(3),
                category_name: "Transportation".to_owned(),
                total_amount: 700.0,
                total_emission: 30.0,
                emission_percentage: 37.5,
            },
        ],
        total_spending: 1900.0,
        total_emission: 80.0,
    })
}

async fn post_calculate_emission(
    State(state): State<BackendState>,
    Json(request): Json<EmissionCalculationRequest>,
) -> Json<f64> {
    state
        .recorders
        .lock()
        .unwrap()
        .emission_requests
        .push(request);

    Json(42.5)
}

async fn post_start_chat() -> Json<serde_json::Value> {
    Json(json!({ "chat_id": "chat-1", "message": "Hi! Ask me about your spending." }))
}

async fn post_chat_message() -> Json<serde_json::Value> {
    Json(json!({ "message": "You spent the most on Food this month." }))
}
