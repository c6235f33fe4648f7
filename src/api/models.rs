//! The JSON types exchanged with the WealthVerse backend.
//!
//! Field names mirror the backend's camelCase JSON, so every struct uses a
//! serde rename rule rather than renaming fields one by one.

use serde::{Deserialize, Serialize};

/// How a transaction was paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMode {
    CreditCard,
    DebitCard,
    Upi,
    NetBanking,
    Cash,
}

impl PaymentMode {
    /// Every payment mode, in the order they are shown in forms.
    pub const ALL: [PaymentMode; 5] = [
        PaymentMode::CreditCard,
        PaymentMode::DebitCard,
        PaymentMode::Upi,
        PaymentMode::NetBanking,
        PaymentMode::Cash,
    ];

    /// The human readable name shown in tables and forms.
    pub fn display_name(self) -> &'static str {
        match self {
            PaymentMode::CreditCard => "Credit Card",
            PaymentMode::DebitCard => "Debit Card",
            PaymentMode::Upi => "UPI",
            PaymentMode::NetBanking => "Net Banking",
            PaymentMode::Cash => "Cash",
        }
    }

    /// The wire value used in form submissions, e.g. "CREDIT_CARD".
    pub fn wire_value(self) -> &'static str {
        match self {
            PaymentMode::CreditCard => "CREDIT_CARD",
            PaymentMode::DebitCard => "DEBIT_CARD",
            PaymentMode::Upi => "UPI",
            PaymentMode::NetBanking => "NET_BANKING",
            PaymentMode::Cash => "CASH",
        }
    }
}

/// Whether money left or entered the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Debit,
    Credit,
}

impl TransactionType {
    pub fn display_name(self) -> &'static str {
        match self {
            TransactionType::Debit => "Debit",
            TransactionType::Credit => "Credit",
        }
    }

    pub fn wire_value(self) -> &'static str {
        match self {
            TransactionType::Debit => "DEBIT",
            TransactionType::Credit => "CREDIT",
        }
    }
}

/// A single transaction as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub amount: f64,
    pub payment_mode: PaymentMode,
    pub merchant_id: String,
    pub merchant_name: String,
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub category_id: Option<i64>,
    pub category_name: String,
    /// Grams of CO2e attributed to the transaction. The backend may omit the
    /// field for rows that predate emission tracking.
    #[serde(default)]
    pub carbon_emitted: f64,
    /// Local date-time in the `yyyy-MM-ddTHH:mm:ss` format.
    pub created_at: String,
    /// True when the category comes from the shared default mapping rather
    /// than a user-specific override.
    #[serde(default)]
    pub global: bool,
}

/// One page of transactions plus the window the server selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPage {
    pub content: Vec<Transaction>,
    pub total_elements: u64,
    pub total_pages: u64,
    /// The zero-based index of this page.
    pub number: u64,
    pub size: u64,
}

/// A category the user can assign to transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// The body for recording a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTransactionRequest {
    pub amount: f64,
    pub payment_mode: PaymentMode,
    pub merchant_id: String,
    pub merchant_name: String,
    pub transaction_type: TransactionType,
    /// Local date-time in the `yyyy-MM-ddTHH:mm:ss` format.
    pub created_at: String,
}

/// The body for re-categorising one transaction or a whole merchant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryApplyRequest {
    /// Required only when `apply_to_all` is false.
    pub transaction_id: Option<i64>,
    pub merchant_name: String,
    pub new_category_name: String,
    pub apply_to_all: bool,
}

/// The body for the emission calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionCalculationRequest {
    pub category_name: String,
    pub amount_spent: f64,
}

/// Per-category totals within a monthly summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    #[serde(default)]
    pub category_id: Option<i64>,
    pub category_name: String,
    pub total_amount: f64,
    pub total_emission: f64,
    pub emission_percentage: f64,
}

/// The monthly spending and emission report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub year_month: String,
    pub category_summaries: Vec<CategorySummary>,
    pub total_spending: f64,
    pub total_emission: f64,
}

/// The body for log-in requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticationRequest {
    pub email: String,
    pub password: String,
}

/// The body for registration requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Date of birth as `yyyy-MM-dd`.
    pub dob: String,
}

/// The tokens and user ID issued on log-in and registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub message: Option<String>,
    pub id: i64,
}

/// The response to starting a chat session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatStartResponse {
    pub chat_id: String,
    /// The assistant's greeting.
    pub message: String,
}

/// The assistant's reply to a chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessageResponse {
    pub message: String,
}

/// The error body returned by the backend on a non-success status.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
