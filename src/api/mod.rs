//! The WealthVerse backend client and the JSON types it exchanges.

mod client;
pub mod models;

pub use client::{ApiClient, is_auth_failure};
