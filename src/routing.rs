//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{
        auth_guard, auth_guard_hx, get_log_in_page, get_log_out, get_register_page, post_log_in,
        post_register,
    },
    category::post_create_category,
    chat::{get_chat_page, post_end_chat, post_send_message, post_start_chat},
    endpoints,
    html::render_internal_server_error,
    not_found::get_404_not_found,
    reports::{get_carbon_page, get_spend_page, post_calculate_emission},
    transaction::{
        get_import_page, get_new_transaction_page, get_transactions_page, post_apply_category,
        post_create_transaction, post_import_transactions,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(endpoints::REGISTER_API, post(post_register))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(
            endpoints::NEW_TRANSACTION_VIEW,
            get(get_new_transaction_page),
        )
        .route(endpoints::IMPORT_VIEW, get(get_import_page))
        .route(endpoints::SPEND_VIEW, get(get_spend_page))
        .route(endpoints::CARBON_VIEW, get(get_carbon_page))
        .route(endpoints::CHAT_VIEW, get(get_chat_page))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These POST routes need to use the HX-REDIRECT header for auth redirects to work properly for HTMX requests.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(
                endpoints::TRANSACTIONS_API,
                post(post_create_transaction),
            )
            .route(endpoints::APPLY_CATEGORY_API, post(post_apply_category))
            .route(endpoints::CATEGORIES_API, post(post_create_category))
            .route(endpoints::IMPORT, post(post_import_transactions))
            .route(endpoints::EMISSION_API, post(post_calculate_emission))
            .route(endpoints::CHAT_START_API, post(post_start_chat))
            .route(endpoints::CHAT_MESSAGE_API, post(post_send_message))
            .route(endpoints::CHAT_END_API, post(post_end_chat))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, Html("I'm a teapot")).into_response()
}

/// The root path '/' redirects to the transactions ledger.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::TRANSACTIONS_VIEW)
}

async fn get_internal_server_error_page() -> Response {
    render_internal_server_error(
        "Sorry, something went wrong.",
        "Try again later or check the server logs",
    )
}


#[cfg(test)]
mod build_router_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;

    use crate::{
        AppState, endpoints, pagination::PaginationConfig, routing::build_router,
        test_utils::backend::FakeBackend, test_utils::must_log_in,
    };

    async fn new_test_server(backend_url: &str) -> TestServer {
        let state = AppState::new("42", backend_url, PaginationConfig::default());
        let mut server =
            TestServer::new(build_router(state));
        server.save_cookies();

        server
    }

    #[tokio::test]
    async fn coffee_route_is_a_teapot() {
        let backend = FakeBackend::new().start().await;
        let server = new_test_server(&backend.base_url()).await;

        let response = server.get(endpoints::COFFEE).await;

        response.assert_status(StatusCode::IM_A_TEAPOT);
    }

    #[tokio::test]
    async fn unknown_route_renders_not_found() {
        let backend = FakeBackend::new().start().await;
        let server = new_test_server(&backend.base_url()).await;

        let response = server.get("/no/such/page").await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn ledger_requires_log_in() {
        let backend = FakeBackend::new().start().await;
        let server = new_test_server(&backend.base_url()).await;

        let response = server.get(endpoints::TRANSACTIONS_VIEW).await;

        response.assert_status(StatusCode::SEE_OTHER);
        let location = response.headers().get("location").unwrap();
        assert!(
            location
                .to_str()
                .unwrap()
                .starts_with(endpoints::LOG_IN_VIEW)
        );
    }

    #[tokio::test]
    async fn ledger_is_reachable_after_log_in() {
        let backend = FakeBackend::with_transactions(3).start().await;
        let server = new_test_server(&backend.base_url()).await;
        must_log_in(&server).await;

        let response = server.get("/transactions?page=0&size=10").await;

        response.assert_status_ok();
        response.assert_text_contains("Transactions");
    }
}
