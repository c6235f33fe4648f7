//! The transactions ledger: fetching page windows from the backend,
//! rendering them, recording new transactions and importing CSV files.

mod category_editor;
mod create;
mod import;
mod models;
pub mod query;
mod transactions_page;
mod view;

pub use category_editor::post_apply_category;
pub use models::HIGH_EMISSION_THRESHOLD;
pub use create::{get_new_transaction_page, post_create_transaction};
pub use import::{get_import_page, post_import_transactions};
pub use transactions_page::{TransactionsViewState, get_transactions_page};
