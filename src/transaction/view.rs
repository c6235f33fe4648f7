//! HTML rendering for the transactions ledger.

use maud::{Markup, html};

use crate::{
    endpoints,
    html::{
        CATEGORY_BADGE_STYLE, ECO_TAG_HIGH_STYLE, ECO_TAG_LOW_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        format_currency,
    },
    navigation::NavBar,
    pagination::{PageWindow, PaginationIndicator, create_pagination_indicators},
};

use super::{
    category_editor::category_editor,
    models::{EcoTag, TransactionRow},
    query::TransactionsQuery,
};

/// What the ledger has to show for the requested window.
pub(crate) enum LedgerContent {
    /// The backend answered; `rows` may still be empty.
    Loaded {
        rows: Vec<TransactionRow>,
        window: PageWindow,
    },
    /// The backend could not be reached or rejected the request.
    FetchFailed,
}

fn amount_class(row: &TransactionRow) -> &'static str {
    use crate::api::models::TransactionType;

    match row.transaction.transaction_type {
        TransactionType::Debit => "text-red-700 dark:text-red-300",
        TransactionType::Credit => "text-green-700 dark:text-green-300",
    }
}

pub(crate) fn transactions_view(
    query: &TransactionsQuery,
    content: LedgerContent,
    user_categories: &[String],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let page_content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4" id="transactions-content"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    a href=(endpoints::IMPORT_VIEW) class=(LINK_STYLE)
                    {
                        "Import Transactions"
                    }

                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                    {
                        "Add Transaction"
                    }
                }

                (month_filter_form(query))

                section class="rounded bg-gray-50 dark:bg-gray-800 overflow-hidden lg:max-w-5xl lg:w-full lg:mx-auto"
                {
                    @match content {
                        LedgerContent::Loaded { rows, window } => {
                            (transactions_table(query, &rows, user_categories))

                            @if window.total_elements > 0 {
                                p class="px-6 pb-2 text-xs text-gray-500 dark:text-gray-400"
                                {
                                    "Showing "
                                    (window.first_element_index())
                                    "–"
                                    (window.last_element_index())
                                    " of "
                                    (window.total_elements)
                                }
                            }

                            @if window.total_pages > 1 {
                                (pagination_view(query, &window))
                            }
                        }
                        LedgerContent::FetchFailed => {
                            div
                                data-fetch-failed="true"
                                class="px-6 py-8 text-center text-gray-600 dark:text-gray-300"
                            {
                                p class="font-medium" { "Could not load your transactions." }
                                p class="text-sm"
                                {
                                    "The WealthVerse service did not answer. "

                                    a href=(query.to_url(endpoints::TRANSACTIONS_VIEW)) class=(LINK_STYLE)
                                    {
                                        "Try again"
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base("Transactions", &[], &page_content)
}

/// The month filter. `hx-sync` aborts any in-flight ledger fetch when a newer
/// one is issued, so the last selection always wins.
fn month_filter_form(query: &TransactionsQuery) -> Markup {
    html! {
        form
            hx-get=(endpoints::TRANSACTIONS_VIEW)
            hx-target="body"
            hx-push-url="true"
            hx-sync="this:replace"
            hx-trigger="change, submit"
            hx-indicator="#indicator"
            class="flex items-end gap-3 flex-wrap"
        {
            input type="hidden" name="page" value="0";
            input type="hidden" name="size" value=(query.size);

            div
            {
                label
                    for="month"
                    class="block mb-1 text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Month"
                }

                input
                    type="month"
                    name="month"
                    id="month"
                    value=[query.month.as_deref()]
                    class="bg-gray-50 border border-gray-300 text-gray-900 rounded-lg
                        p-2 text-sm dark:bg-gray-700 dark:border-gray-600 dark:text-white";
            }

            button
                type="submit"
                class="px-4 py-2 text-sm bg-blue-500 dark:bg-blue-600 hover:bg-blue-600
                    hover:dark:bg-blue-700 text-white rounded"
            {
                "Filter"
            }

            @if query.month.is_some() {
                a
                    href=(TransactionsQuery { month: None, ..query.clone() }.to_url(endpoints::TRANSACTIONS_VIEW))
                    class=(LINK_STYLE)
                {
                    "Clear"
                }
            }
        }
    }
}

fn transactions_table(
    query: &TransactionsQuery,
    rows: &[TransactionRow],
    user_categories: &[String],
) -> Markup {
    html! {
        table class="w-full my-2 text-sm text-left rtl:text-right
            text-gray-500 dark:text-gray-400"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Merchant" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                    th scope="col" class="px-6 py-3 text-right" { "Amount" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Payment" }
                    th scope="col" class=(TABLE_CELL_STYLE) { "Impact" }
                }
            }

            tbody
            {
                @for row in rows {
                    (transaction_row_view(query, row, user_categories))
                }

                @if rows.is_empty() {
                    tr
                    {
                        td
                            colspan="6"
                            data-empty-state="true"
                            class="px-6 py-4 text-center"
                        {
                            @if query.month.is_some() {
                                "No transactions in this month."
                            } @else {
                                "No transactions yet."
                            }
                        }
                    }
                }
            }
        }
    }
}

fn transaction_row_view(
    query: &TransactionsQuery,
    row: &TransactionRow,
    user_categories: &[String],
) -> Markup {
    let eco_style = match row.eco_tag {
        EcoTag::High => ECO_TAG_HIGH_STYLE,
        EcoTag::Low => ECO_TAG_LOW_STYLE,
    };

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (row.display_date) }

            td class="px-6 py-4 font-medium text-gray-900 dark:text-white"
            {
                (row.transaction.merchant_name)
            }

            td class=(TABLE_CELL_STYLE)
            {
                span class=(CATEGORY_BADGE_STYLE) { (row.transaction.category_name) }

                @if row.can_edit_category {
                    (category_editor(query, &row.transaction, user_categories))
                }
            }

            td class={ "px-6 py-4 text-right " (amount_class(row)) }
            {
                (format_currency(row.transaction.amount))
            }

            td class=(TABLE_CELL_STYLE)
            {
                (row.transaction.payment_mode.display_name())
            }

            td class=(TABLE_CELL_STYLE)
            {
                span class=(eco_style) title=(format!("{:.1} g CO2e", row.transaction.carbon_emitted))
                {
                    (row.eco_tag.label())
                }
            }
        }
    }
}

fn pagination_view(query: &TransactionsQuery, window: &PageWindow) -> Markup {
    let indicators = create_pagination_indicators(
        window.display_page(),
        window.total_pages,
        crate::pagination::PaginationConfig::default().max_pages,
    );
    let page_url = |display_page: u64| {
        query
            .with_page(display_page - 1)
            .to_url(endpoints::TRANSACTIONS_VIEW)
    };

    html! {
        nav class="pagination flex justify-center" aria-label="Ledger pages"
        {
            ul class="pagination flex items-center gap-1 p-2"
            {
                @for indicator in indicators {
                    li
                    {
                        @match indicator {
                            PaginationIndicator::BackButton(page) => {
                                a
                                    href=(page_url(page))
                                    role="button"
                                    class="block px-3 py-2 rounded-sm text-blue-600 hover:underline"
                                { "Back" }
                            }
                            PaginationIndicator::Page(page) => {
                                a
                                    href=(page_url(page))
                                    role="button"
                                    class="block px-3 py-2 rounded-sm text-blue-600 hover:underline"
                                { (page) }
                            }
                            PaginationIndicator::CurrPage(page) => {
                                span
                                    aria-current="page"
                                    class="block px-3 py-2 rounded-sm font-bold text-black dark:text-white"
                                { (page) }
                            }
                            PaginationIndicator::Ellipsis => {
                                span class="block px-3 py-2 text-gray-400" { "…" }
                            }
                            PaginationIndicator::NextButton(page) => {
                                a
                                    href=(page_url(page))
                                    role="button"
                                    class="block px-3 py-2 rounded-sm text-blue-600 hover:underline"
                                { "Next" }
                            }
                        }
                    }
                }
            }
        }
    }
}
