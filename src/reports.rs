//! The monthly spend and carbon footprint reports.
//!
//! Both pages render the same backend summary; the spend page leads with
//! money and the carbon page leads with emissions and adds the what-if
//! calculator.

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;
use maud::{Markup, html};
use serde::Deserialize;
use time::{OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    AppState, Error,
    api::{
        ApiClient,
        models::{EmissionCalculationRequest, MonthlySummary},
    },
    auth::Session,
    category::DEFAULT_CATEGORIES,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, ECO_TAG_HIGH_STYLE, ECO_TAG_LOW_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency, loading_spinner, render,
    },
    navigation::NavBar,
    transaction::query::validate_month,
};

const YEAR_MONTH_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]");

/// The state needed for the report pages.
#[derive(Debug, Clone)]
pub struct ReportsState {
    pub api_client: ApiClient,
}

impl FromRef<AppState> for ReportsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api_client: state.api_client.clone(),
        }
    }
}

/// The optional month filter shared by both report pages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportQuery {
    pub month: Option<String>,
}

/// The current month as `YYYY-MM`.
fn current_year_month() -> String {
    OffsetDateTime::now_utc()
        .date()
        .format(YEAR_MONTH_FORMAT)
        // The format only uses year and month components, which always format.
        .unwrap_or_else(|_| "1970-01".to_owned())
}

/// Resolve the month filter, redirecting invalid values back to the bare
/// report URL.
fn resolve_month(query: ReportQuery, route: &str) -> Result<String, Response> {
    match query.month {
        Some(month) if !month.is_empty() => match validate_month(&month) {
            Ok(()) => Ok(month),
            Err(error) => {
                tracing::warn!("Dropping invalid month filter from report request: {error}");
                Err(Redirect::to(route).into_response())
            }
        },
        _ => Ok(current_year_month()),
    }
}

fn month_picker(route: &str, month: &str) -> Markup {
    html! {
        form
            hx-get=(route)
            hx-target="body"
            hx-push-url="true"
            hx-sync="this:replace"
            hx-trigger="change, submit"
            hx-indicator="#indicator"
            class="flex items-end gap-3"
        {
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
                    value=(month)
                    class="bg-gray-50 border border-gray-300 text-gray-900 rounded-lg
                        p-2 text-sm dark:bg-gray-700 dark:border-gray-600 dark:text-white";
            }

            button
                type="submit"
                class="px-4 py-2 text-sm bg-blue-500 dark:bg-blue-600 hover:bg-blue-600
                    hover:dark:bg-blue-700 text-white rounded"
            {
                "Show"
            }
        }
    }
}

fn fetch_failed_panel(route: &str) -> Markup {
    html! {
        div
            data-fetch-failed="true"
            class="px-6 py-8 text-center text-gray-600 dark:text-gray-300"
        {
            p class="font-medium" { "Could not load the report." }
            p class="text-sm"
            {
                "The WealthVerse service did not answer. "

                a href=(route) class=(LINK_STYLE) { "Try again" }
            }
        }
    }
}

/// Display the monthly spend report.
pub async fn get_spend_page(
    State(state): State<ReportsState>,
    Extension(session): Extension<Session>,
    Query(query): Query<ReportQuery>,
) -> Response {
    let month = match resolve_month(query, endpoints::SPEND_VIEW) {
        Ok(month) => month,
        Err(redirect) => return redirect,
    };

    let nav_bar = NavBar::new(endpoints::SPEND_VIEW).into_html();
    let summary = fetch_summary(&state.api_client, &session, &month).await;

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 lg:max-w-4xl lg:w-full lg:mx-auto"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Monthly Spend" }

                    (month_picker(endpoints::SPEND_VIEW, &month))
                }

                @match &summary {
                    Some(summary) => { (spend_table(summary)) }
                    None => { (fetch_failed_panel(endpoints::SPEND_VIEW)) }
                }
            }
        }
    };

    render(StatusCode::OK, base("Monthly Spend", &[], &content))
}

fn spend_table(summary: &MonthlySummary) -> Markup {
    html! {
        section class="rounded bg-gray-50 dark:bg-gray-800 overflow-hidden"
        {
            table class="w-full my-2 text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class="px-6 py-3 text-right" { "Spent" }
                        th scope="col" class="px-6 py-3 text-right" { "Share of emissions" }
                    }
                }

                tbody
                {
                    @for category in &summary.category_summaries {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class="px-6 py-4 font-medium text-gray-900 dark:text-white"
                            {
                                (category.category_name)
                            }

                            td class="px-6 py-4 text-right"
                            {
                                (format_currency(category.total_amount))
                            }

                            td class="px-6 py-4 text-right"
                            {
                                (format!("{:.1}%", category.emission_percentage))
                            }
                        }
                    }

                    @if summary.category_summaries.is_empty() {
                        tr
                        {
                            td colspan="3" data-empty-state="true" class="px-6 py-4 text-center"
                            {
                                "No spending recorded this month."
                            }
                        }
                    }
                }

                tfoot
                {
                    tr class="font-semibold text-gray-900 dark:text-white"
                    {
                        td class=(TABLE_CELL_STYLE) { "Total" }
                        td class="px-6 py-4 text-right" { (format_currency(summary.total_spending)) }
                        td class="px-6 py-4 text-right" {}
                    }
                }
            }
        }
    }
}

/// Display the carbon footprint report and emission calculator.
pub async fn get_carbon_page(
    State(state): State<ReportsState>,
    Extension(session): Extension<Session>,
    Query(query): Query<ReportQuery>,
) -> Response {
    let month = match resolve_month(query, endpoints::CARBON_VIEW) {
        Ok(month) => month,
        Err(redirect) => return redirect,
    };

    let nav_bar = NavBar::new(endpoints::CARBON_VIEW).into_html();
    let summary = fetch_summary(&state.api_client, &session, &month).await;

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 lg:max-w-4xl lg:w-full lg:mx-auto"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Carbon Footprint" }

                    (month_picker(endpoints::CARBON_VIEW, &month))
                }

                @match &summary {
                    Some(summary) => { (carbon_table(summary)) }
                    None => { (fetch_failed_panel(endpoints::CARBON_VIEW)) }
                }

                (emission_calculator_form())

                div id="emission-result" {}
            }
        }
    };

    render(StatusCode::OK, base("Carbon Footprint", &[], &content))
}

fn carbon_table(summary: &MonthlySummary) -> Markup {
    html! {
        section class="rounded bg-gray-50 dark:bg-gray-800 overflow-hidden"
        {
            table class="w-full my-2 text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class="px-6 py-3 text-right" { "Emission" }
                        th scope="col" class="px-6 py-3 text-right" { "Share" }
                    }
                }

                tbody
                {
                    @for category in &summary.category_summaries {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class="px-6 py-4 font-medium text-gray-900 dark:text-white"
                            {
                                (category.category_name)
                            }

                            td class="px-6 py-4 text-right"
                            {
                                (format!("{:.1} g CO2e", category.total_emission))
                            }

                            td class="px-6 py-4 text-right"
                            {
                                (format!("{:.1}%", category.emission_percentage))
                            }
                        }
                    }

                    @if summary.category_summaries.is_empty() {
                        tr
                        {
                            td colspan="3" data-empty-state="true" class="px-6 py-4 text-center"
                            {
                                "No emissions recorded this month."
                            }
                        }
                    }
                }

                tfoot
                {
                    tr class="font-semibold text-gray-900 dark:text-white"
                    {
                        td class=(TABLE_CELL_STYLE) { "Total" }
                        td class="px-6 py-4 text-right"
                        {
                            (format!("{:.1} g CO2e", summary.total_emission))
                        }
                        td class="px-6 py-4 text-right" {}
                    }
                }
            }
        }
    }
}

fn emission_calculator_form() -> Markup {
    html! {
        section class="rounded bg-gray-50 dark:bg-gray-800 p-4 space-y-3"
        {
            h2 class="text-lg font-bold" { "Emission Calculator" }

            p class="text-sm text-gray-600 dark:text-gray-300"
            {
                "Estimate the footprint of a purchase before you make it."
            }

            form
                hx-post=(endpoints::EMISSION_API)
                hx-target="#emission-result"
                hx-indicator="#indicator"
                class="flex items-end gap-3 flex-wrap"
            {
                div
                {
                    label for="category_name" class=(FORM_LABEL_STYLE) { "Category" }

                    select name="category_name" id="category_name" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for name in DEFAULT_CATEGORIES {
                            option value=(name) { (name) }
                        }
                    }
                }

                div
                {
                    label for="amount_spent" class=(FORM_LABEL_STYLE) { "Amount" }

                    input
                        type="number"
                        name="amount_spent"
                        id="amount_spent"
                        min="0.01"
                        step="0.01"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE)
                {
                    span id="indicator" class="htmx-indicator" { (loading_spinner()) }

                    "Estimate"
                }
            }
        }
    }
}

/// The emission calculator form data.
#[derive(Debug, Clone, Deserialize)]
pub struct EmissionForm {
    pub category_name: String,
    pub amount_spent: f64,
}

/// Handler for the emission calculator fragment.
pub async fn post_calculate_emission(
    State(state): State<ReportsState>,
    Extension(session): Extension<Session>,
    Form(form): Form<EmissionForm>,
) -> Response {
    if form.amount_spent <= 0.0 {
        return Error::NonPositiveAmount.into_alert_response();
    }

    let request = EmissionCalculationRequest {
        category_name: form.category_name.clone(),
        amount_spent: form.amount_spent,
    };

    let emission = match state
        .api_client
        .calculate_emission(&session.access_token, &request)
        .await
    {
        Ok(emission) => emission,
        Err(error) => {
            tracing::error!("Could not estimate an emission: {error}");
            return error.into_alert_response();
        }
    };

    let tag_style = if emission > crate::transaction::HIGH_EMISSION_THRESHOLD {
        ECO_TAG_HIGH_STYLE
    } else {
        ECO_TAG_LOW_STYLE
    };

    let fragment = html! {
        p class="text-sm text-gray-900 dark:text-white"
        {
            "Spending "
            (format_currency(form.amount_spent))
            " on "
            (form.category_name)
            " emits about "
            span class=(tag_style) { (format!("{emission:.1} g CO2e")) }
        }
    };

    render(StatusCode::OK, fragment)
}

async fn fetch_summary(
    api_client: &ApiClient,
    session: &Session,
    month: &str,
) -> Option<MonthlySummary> {
    match api_client
        .get_monthly_summary(&session.access_token, month)
        .await
    {
        Ok(summary) => Some(summary),
        Err(error) => {
            tracing::error!("Could not fetch the monthly summary for {month}: {error}");

            None
        }
    }
}
