//! The HTTP client for the WealthVerse REST backend.
//!
//! All application state lives behind this client. Each method wraps exactly
//! one backend endpoint, attaches the caller's bearer token, and converts
//! transport failures and non-success statuses into [crate::Error] values.

use reqwest::{Client as HttpClient, RequestBuilder, Response, StatusCode};
use serde_json::json;

use crate::{
    Error,
    api::models::{
        AddTransactionRequest, AuthenticationRequest, AuthenticationResponse, Category,
        CategoryApplyRequest, ChatMessageResponse, ChatStartResponse, EmissionCalculationRequest,
        ErrorBody, MonthlySummary, RegisterRequest, TransactionPage,
    },
};

/// A client for the WealthVerse REST backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http_client: HttpClient,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the backend at `base_url`, e.g.
    /// "https://api.wealthverse.example". Trailing slashes are trimmed so
    /// paths can be appended directly.
    pub fn new(base_url: &str) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send `request` and decode a non-success status into a typed error.
    ///
    /// The backend reports validation failures as a JSON body with a
    /// `message` field. When the body carries no message the raw text is
    /// used so the caller still has something to log.
    async fn send(&self, request: RequestBuilder) -> Result<Response, Error> {
        let response = request
            .send()
            .await
            .map_err(|error| Error::BackendUnreachable(error.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body_text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body_text)
            .ok()
            .and_then(|body| body.message)
            .unwrap_or(body_text);

        Err(Error::BackendRejected {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, Error> {
        response
            .json::<T>()
            .await
            .map_err(|error| Error::UnexpectedResponse(error.to_string()))
    }

    /// POST /api/auth/login
    pub async fn log_in(
        &self,
        request: &AuthenticationRequest,
    ) -> Result<AuthenticationResponse, Error> {
        let response = self
            .send(
                self.http_client
                    .post(self.url("/api/auth/login"))
                    .json(request),
            )
            .await?;

        Self::decode(response).await
    }

    /// POST /api/auth/register
    pub async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<AuthenticationResponse, Error> {
        let response = self
            .send(
                self.http_client
                    .post(self.url("/api/auth/register"))
                    .json(request),
            )
            .await?;

        Self::decode(response).await
    }

    /// POST /api/auth/logout
    pub async fn log_out(&self, token: &str) -> Result<(), Error> {
        self.send(
            self.http_client
                .post(self.url("/api/auth/logout"))
                .bearer_auth(token),
        )
        .await?;

        Ok(())
    }

    /// GET /api/transactions/getall
    ///
    /// `page` is zero-based. `month` is an optional `YYYY-MM` filter which
    /// must be validated before calling.
    pub async fn get_transactions(
        &self,
        token: &str,
        page: u64,
        size: u64,
        month: Option<&str>,
    ) -> Result<TransactionPage, Error> {
        let mut request = self
            .http_client
            .get(self.url("/api/transactions/getall"))
            .bearer_auth(token)
            .query(&[("page", page), ("size", size)]);

        if let Some(month) = month {
            request = request.query(&[("month", month)]);
        }

        let response = self.send(request).await?;

        Self::decode(response).await
    }

    /// POST /api/transactions/add
    pub async fn add_transaction(
        &self,
        token: &str,
        request: &AddTransactionRequest,
    ) -> Result<(), Error> {
        self.send(
            self.http_client
                .post(self.url("/api/transactions/add"))
                .bearer_auth(token)
                .json(request),
        )
        .await?;

        Ok(())
    }

    /// POST /api/transactions/apply-category
    pub async fn apply_category(
        &self,
        token: &str,
        request: &CategoryApplyRequest,
    ) -> Result<(), Error> {
        self.send(
            self.http_client
                .post(self.url("/api/transactions/apply-category"))
                .bearer_auth(token)
                .json(request),
        )
        .await?;

        Ok(())
    }

    /// POST /api/transactions/import (multipart)
    ///
    /// Uploads one CSV file under the `file` part name.
    pub async fn import_csv(
        &self,
        token: &str,
        file_name: &str,
        csv_data: String,
    ) -> Result<(), Error> {
        let part = reqwest::multipart::Part::text(csv_data)
            .file_name(file_name.to_owned())
            .mime_str("text/csv")
            .map_err(|error| Error::MultipartError(error.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        self.send(
            self.http_client
                .post(self.url("/api/transactions/import"))
                .bearer_auth(token)
                .multipart(form),
        )
        .await?;

        Ok(())
    }

    /// GET /api/category/user
    pub async fn list_user_categories(&self, token: &str) -> Result<Vec<Category>, Error> {
        let response = self
            .send(
                self.http_client
                    .get(self.url("/api/category/user"))
                    .bearer_auth(token),
            )
            .await?;

        Self::decode(response).await
    }

    /// POST /api/category/custom
    pub async fn add_custom_category(&self, token: &str, name: &str) -> Result<(), Error> {
        self.send(
            self.http_client
                .post(self.url("/api/category/custom"))
                .bearer_auth(token)
                .query(&[("category", name)]),
        )
        .await?;

        Ok(())
    }

    /// POST /api/category-mapping/mappings/custom
    pub async fn add_custom_mapping(
        &self,
        token: &str,
        merchant_name: &str,
        category_name: &str,
    ) -> Result<(), Error> {
        self.send(
            self.http_client
                .post(self.url("/api/category-mapping/mappings/custom"))
                .bearer_auth(token)
                .query(&[
                    ("merchantName", merchant_name),
                    ("categoryName", category_name),
                ]),
        )
        .await?;

        Ok(())
    }

    /// GET /api/reports/monthly/{yearMonth}
    pub async fn get_monthly_summary(
        &self,
        token: &str,
        year_month: &str,
    ) -> Result<MonthlySummary, Error> {
        let response = self
            .send(
                self.http_client
                    .get(self.url(&format!("/api/reports/monthly/{year_month}")))
                    .bearer_auth(token),
            )
            .await?;

        Self::decode(response).await
    }

    /// POST /api/emission/calculate
    ///
    /// Returns the estimated emission in grams of CO2e for spending
    /// `amount_spent` in `category_name`.
    pub async fn calculate_emission(
        &self,
        token: &str,
        request: &EmissionCalculationRequest,
    ) -> Result<f64, Error> {
        let response = self
            .send(
                self.http_client
                    .post(self.url("/api/emission/calculate"))
                    .bearer_auth(token)
                    .json(request),
            )
            .await?;

        Self::decode(response).await
    }

    /// POST /api/chats/start
    pub async fn start_chat(&self, user_id: i64) -> Result<ChatStartResponse, Error> {
        let response = self
            .send(
                self.http_client
                    .post(self.url("/api/chats/start"))
                    .json(&json!({ "user_id": user_id })),
            )
            .await?;

        Self::decode(response).await
    }

    /// POST /api/chats/{chat_id}/message
    pub async fn send_chat_message(
        &self,
        user_id: i64,
        chat_id: &str,
        message: &str,
    ) -> Result<ChatMessageResponse, Error> {
        let response = self
            .send(
                self.http_client
                    .post(self.url(&format!("/api/chats/{chat_id}/message")))
                    .json(&json!({ "user_id": user_id, "message": message })),
            )
            .await?;

        Self::decode(response).await
    }

    /// POST /api/chats/{chat_id}/end
    pub async fn end_chat(&self, user_id: i64, chat_id: &str) -> Result<(), Error> {
        self.send(
            self.http_client
                .post(self.url(&format!("/api/chats/{chat_id}/end")))
                .json(&json!({ "user_id": user_id })),
        )
        .await?;

        Ok(())
    }
}

/// Returns true when `status` indicates an expired or missing session.
pub fn is_auth_failure(status: u16) -> bool {
    status == StatusCode::UNAUTHORIZED.as_u16() || status == StatusCode::FORBIDDEN.as_u16()
}

#[cfg(test)]
mod api_client_tests {
    use crate::{
        Error,
        api::models::{AuthenticationRequest, CategoryApplyRequest},
        test_utils::backend::FakeBackend,
    };

    use super::ApiClient;

    #[tokio::test]
    async fn get_transactions_decodes_page_window() {
        let backend = FakeBackend::with_transactions(3).start().await;
        let client = ApiClient::new(&backend.base_url());

        let page = client
            .get_transactions("test-token", 0, 10, None)
            .await
            .unwrap();

        assert_eq!(page.content.len(), 3);
        assert_eq!(page.total_elements, 3);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.number, 0);
    }

    #[tokio::test]
    async fn month_filter_is_forwarded() {
        let backend = FakeBackend::with_transactions(3).start().await;
        let client = ApiClient::new(&backend.base_url());

        client
            .get_transactions("test-token", 0, 10, Some("2024-05"))
            .await
            .unwrap();

        let queries = backend.recorded_transaction_queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].month.as_deref(), Some("2024-05"));
    }

    #[tokio::test]
    async fn rejected_request_surfaces_backend_message() {
        let backend = FakeBackend::new()
            .with_login_failure("Invalid email or password")
            .start()
            .await;
        let client = ApiClient::new(&backend.base_url());

        let result = client
            .log_in(&AuthenticationRequest {
                email: "user@example.com".to_owned(),
                password: "wrong".to_owned(),
            })
            .await;

        match result {
            Err(Error::BackendRejected { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid email or password");
            }
            other => panic!("want BackendRejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn transport_failure_maps_to_unreachable() {
        // Port 1 is never listening.
        let client = ApiClient::new("http://127.0.0.1:1");

        let result = client.get_transactions("test-token", 0, 10, None).await;

        assert!(matches!(result, Err(Error::BackendUnreachable(_))));
    }

    #[tokio::test]
    async fn apply_category_posts_scope_flag() {
        let backend = FakeBackend::with_transactions(1).start().await;
        let client = ApiClient::new(&backend.base_url());

        client
            .apply_category(
                "test-token",
                &CategoryApplyRequest {
                    transaction_id: Some(42),
                    merchant_name: "Uber".to_owned(),
                    new_category_name: "TRAVEL".to_owned(),
                    apply_to_all: true,
                },
            )
            .await
            .unwrap();

        let requests = backend.recorded_category_applications();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].apply_to_all);
        assert_eq!(requests[0].new_category_name, "TRAVEL");
    }
}
