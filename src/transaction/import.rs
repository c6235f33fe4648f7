//! Uploading CSV files to import transactions in bulk.
//!
//! The web tier only checks that the upload is a CSV before streaming it to
//! the backend, which owns parsing and deduplication.

use axum::{
    Extension,
    extract::{FromRef, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::html;

use crate::{
    AppState, Error,
    api::ApiClient,
    auth::Session,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, base,
        loading_spinner,
    },
    navigation::NavBar,
};

/// The state needed for importing transactions.
#[derive(Debug, Clone)]
pub struct ImportState {
    pub api_client: ApiClient,
}

impl FromRef<AppState> for ImportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api_client: state.api_client.clone(),
        }
    }
}

/// Display the form for importing transactions from CSV files.
pub async fn get_import_page() -> Response {
    let nav_bar = NavBar::new(endpoints::IMPORT_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-md space-y-4"
            {
                h1 class="text-xl font-bold" { "Import Transactions" }

                p class="text-sm text-gray-600 dark:text-gray-300"
                {
                    "Upload a CSV export from your bank. Transactions that were \
                    already imported are skipped."
                }

                form
                    hx-post=(endpoints::IMPORT)
                    hx-encoding="multipart/form-data"
                    hx-indicator="#indicator"
                    class="space-y-4"
                {
                    div
                    {
                        label for="file" class=(FORM_LABEL_STYLE) { "CSV file" }

                        input
                            type="file"
                            name="file"
                            id="file"
                            accept="text/csv"
                            required
                            class=(FORM_TEXT_INPUT_STYLE);
                    }

                    button type="submit" class=(BUTTON_PRIMARY_STYLE)
                    {
                        span id="indicator" class="htmx-indicator" { (loading_spinner()) }

                        "Import"
                    }
                }
            }
        }
    };

    crate::html::render(StatusCode::OK, base("Import Transactions", &[], &content))
}

/// One uploaded file, decoded to text.
struct UploadedFile {
    file_name: String,
    contents: String,
}

/// Pull the CSV file out of the multipart upload.
///
/// # Errors
///
/// - [Error::NotCsv] if a part is not declared as `text/csv`.
/// - [Error::MultipartError] if the upload is malformed or empty.
async fn parse_csv_upload(mut multipart: Multipart) -> Result<UploadedFile, Error> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| Error::MultipartError(error.to_string()))?
    {
        if field.content_type() != Some("text/csv") {
            return Err(Error::NotCsv);
        }

        let file_name = field.file_name().unwrap_or("import.csv").to_owned();
        let contents = field
            .text()
            .await
            .map_err(|error| Error::MultipartError(error.to_string()))?;

        return Ok(UploadedFile {
            file_name,
            contents,
        });
    }

    Err(Error::MultipartError("the upload contained no file".to_owned()))
}

/// Handler for uploading a CSV file of transactions.
///
/// On success the client is redirected to the ledger so the imported rows
/// show up immediately.
pub async fn post_import_transactions(
    State(state): State<ImportState>,
    Extension(session): Extension<Session>,
    multipart: Multipart,
) -> Response {
    let upload = match parse_csv_upload(multipart).await {
        Ok(upload) => upload,
        Err(error) => {
            tracing::warn!("Rejected a transaction import: {error}");
            return error.into_alert_response();
        }
    };

    if let Err(error) = state
        .api_client
        .import_csv(&session.access_token, &upload.file_name, upload.contents)
        .await
    {
        tracing::error!("Could not import \"{}\": {error}", upload.file_name);
        return error.into_alert_response();
    }

    (
        StatusCode::SEE_OTHER,
        HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
        (),
    )
        .into_response()
}
