//! View models derived from the backend's transaction DTOs.

use time::{PrimitiveDateTime, format_description::BorrowedFormatItem, macros::format_description};

use crate::api::models::Transaction;

/// Grams of CO2e above which a transaction is flagged as high impact.
pub const HIGH_EMISSION_THRESHOLD: f64 = 30.0;

/// The environmental impact badge shown next to each transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcoTag {
    High,
    Low,
}

impl EcoTag {
    pub fn from_carbon(carbon_emitted: f64) -> Self {
        if carbon_emitted > HIGH_EMISSION_THRESHOLD {
            EcoTag::High
        } else {
            EcoTag::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EcoTag::High => "High",
            EcoTag::Low => "Low",
        }
    }
}

/// Wire format of the backend's `createdAt` field.
const CREATED_AT_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

const DISPLAY_DATE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[day] [month repr:short] [year]");

/// A single ledger row, with everything the template needs precomputed.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRow {
    pub transaction: Transaction,
    /// The transaction date formatted for display, e.g. "04 May 2024".
    pub display_date: String,
    pub eco_tag: EcoTag,
    /// Whether the row offers the inline category editor. Only rows whose
    /// category comes from the shared default mapping can be reconciled.
    pub can_edit_category: bool,
}

impl TransactionRow {
    pub fn new(transaction: Transaction) -> Self {
        let display_date = PrimitiveDateTime::parse(&transaction.created_at, CREATED_AT_FORMAT)
            .ok()
            .and_then(|date_time| date_time.date().format(DISPLAY_DATE_FORMAT).ok())
            .unwrap_or_else(|| transaction.created_at.clone());
        let eco_tag = EcoTag::from_carbon(transaction.carbon_emitted);
        let can_edit_category = transaction.global;

        Self {
            transaction,
            display_date,
            eco_tag,
            can_edit_category,
        }
    }
}
