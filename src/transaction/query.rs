//! Query parameter handling for the transactions ledger.
//!
//! The ledger URL carries the full page selection (`page`, `size`, `month`)
//! so that every mutation can redirect back to the exact window the user was
//! looking at.

use serde::Deserialize;

use crate::{Error, pagination::PaginationConfig};

/// The raw, possibly incomplete query parameters of a ledger request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LedgerQuery {
    /// The zero-based page index.
    pub page: Option<u64>,
    /// The number of transactions per page.
    pub size: Option<u64>,
    /// An optional `YYYY-MM` month filter.
    pub month: Option<String>,
}

/// URL encoding helper for the ledger's query params.
///
/// This is used to build consistent links and redirect URLs from
/// already-normalized values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionsQuery {
    /// The zero-based page index requested from the backend.
    pub page: u64,
    /// The number of transactions per page.
    pub size: u64,
    /// A validated `YYYY-MM` month filter.
    pub month: Option<String>,
}

impl TransactionsQuery {
    /// Apply defaults from `config` and validate the month filter.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidMonth] if `month` is present but not a valid
    /// `YYYY-MM` string.
    pub fn normalize(query: LedgerQuery, config: &PaginationConfig) -> Result<Self, Error> {
        let month = match query.month {
            Some(month) if month.is_empty() => None,
            Some(month) => {
                validate_month(&month)?;
                Some(month)
            }
            None => None,
        };

        Ok(Self {
            page: query.page.unwrap_or(config.default_page),
            size: query.size.unwrap_or(config.default_page_size).max(1),
            month,
        })
    }

    /// Whether the raw query was missing any parameter that [normalize]
    /// filled in, meaning the canonical URL differs from the requested one.
    pub fn differs_from(&self, query: &LedgerQuery) -> bool {
        query.page.is_none()
            || query.size.is_none()
            || query.month.as_deref().unwrap_or_default() != self.month.as_deref().unwrap_or_default()
    }

    pub fn with_page(&self, page: u64) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    pub fn to_query_string(&self) -> String {
        let mut query = format!("page={}&size={}", self.page, self.size);

        if let Some(month) = &self.month {
            query.push_str("&month=");
            query.push_str(month);
        }

        query
    }

    pub fn to_url(&self, route: &str) -> String {
        format!("{route}?{}", self.to_query_string())
    }
}

/// Check that `month` is a calendar month in the `YYYY-MM` format.
pub fn validate_month(month: &str) -> Result<(), Error> {
    let invalid = || Error::InvalidMonth(month.to_owned());

    let (year, month_number) = month.split_once('-').ok_or_else(invalid)?;

    if year.len() != 4 || month_number.len() != 2 {
        return Err(invalid());
    }

    year.parse::<u16>().map_err(|_| invalid())?;
    let month_number = month_number.parse::<u8>().map_err(|_| invalid())?;

    if !(1..=12).contains(&month_number) {
        return Err(invalid());
    }

    Ok(())
}
