//! This module defines the common functionality for paging data.
//!
//! The backend selects the page window; the web tier only mirrors what came
//! back in order to render the pagination controls. [PageWindow] is that
//! mirror, and [create_pagination_indicators] turns it into the indicator
//! list over 1-based display pages.

use crate::api::models::TransactionPage;

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The zero-based page index to default to when not specified in a request.
    pub default_page: u64,
    /// The maximum transactions to display per page when not specified in a request.
    pub default_page_size: u64,
    /// The maximum number of pages to show in the pagination indicator.
    pub max_pages: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 0,
            default_page_size: 10,
            max_pages: 5,
        }
    }
}

/// The page window reported by the backend, mirrored solely for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// The zero-based index of the current page.
    pub number: u64,
    /// The requested page size.
    pub size: u64,
    /// How many elements exist across all pages.
    pub total_elements: u64,
    /// How many pages exist.
    pub total_pages: u64,
}

impl PageWindow {
    /// Mirror the window fields of a transactions page response.
    pub fn from_response(page: &TransactionPage) -> Self {
        Self {
            number: page.number,
            size: page.size,
            total_elements: page.total_elements,
            total_pages: page.total_pages,
        }
    }

    /// The 1-based page number used for display.
    pub fn display_page(&self) -> u64 {
        self.number + 1
    }

    /// The 1-based index of the first element on this page, zero when the
    /// page is empty.
    pub fn first_element_index(&self) -> u64 {
        if self.total_elements == 0 {
            0
        } else {
            self.number * self.size + 1
        }
    }

    /// The 1-based index of the last element on this page.
    pub fn last_element_index(&self) -> u64 {
        u64::min((self.number + 1) * self.size, self.total_elements)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum PaginationIndicator {
    Page(u64),
    CurrPage(u64),
    Ellipsis,
    NextButton(u64),
    BackButton(u64),
}

/// Build the indicator list for `curr_page` out of `page_count` 1-based
/// display pages, showing at most `max_pages` numbered indicators around the
/// current page.
pub fn create_pagination_indicators(
    curr_page: u64,
    page_count: u64,
    max_pages: u64,
) -> Vec<PaginationIndicator> {
    let map_page = |page| {
        if page == curr_page {
            PaginationIndicator::CurrPage(page)
        } else {
            PaginationIndicator::Page(page)
        }
    };

    let mut indicators: Vec<PaginationIndicator> = if page_count <= max_pages {
        (1..=page_count).map(map_page).collect()
    } else if curr_page <= (max_pages / 2) {
        (1..=max_pages).map(map_page).collect()
    } else if curr_page > (page_count - max_pages / 2) {
        ((page_count - max_pages + 1)..=page_count)
            .map(map_page)
            .collect()
    } else {
        ((curr_page - max_pages / 2)..=(curr_page + max_pages / 2))
            .map(map_page)
            .collect()
    };

    if page_count > max_pages {
        if curr_page > (max_pages / 2) + 1 {
            indicators.insert(0, PaginationIndicator::Page(1));
            indicators.insert(1, PaginationIndicator::Ellipsis);
        }

        if curr_page < (page_count - max_pages / 2) {
            indicators.push(PaginationIndicator::Ellipsis);
            indicators.push(PaginationIndicator::Page(page_count));
        }
    }

    if curr_page > 1 {
        indicators.insert(0, PaginationIndicator::BackButton(curr_page - 1));
    }

    if curr_page < page_count {
        indicators.push(PaginationIndicator::NextButton(curr_page + 1));
    }

    indicators
}

#[cfg(test)]
mod page_window_tests {
    use crate::api::models::TransactionPage;

    use super::PageWindow;

    #[test]
    fn mirrors_server_window() {
        let response = TransactionPage {
            content: vec![],
            total_elements: 3,
            total_pages: 1,
            number: 0,
            size: 10,
        };

        let window = PageWindow::from_response(&response);

        assert_eq!(window.number, 0);
        assert_eq!(window.display_page(), 1);
        assert_eq!(window.total_pages, 1);
        assert_eq!(window.total_elements, 3);
    }

    #[test]
    fn element_indices_for_middle_page() {
        let window = PageWindow {
            number: 1,
            size: 10,
            total_elements: 25,
            total_pages: 3,
        };

        assert_eq!(window.first_element_index(), 11);
        assert_eq!(window.last_element_index(), 20);
    }

    #[test]
    fn element_indices_for_empty_window() {
        let window = PageWindow {
            number: 0,
            size: 10,
            total_elements: 0,
            total_pages: 0,
        };

        assert_eq!(window.first_element_index(), 0);
        assert_eq!(window.last_element_index(), 0);
    }
}
