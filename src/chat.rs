//! The financial assistant chat.
//!
//! The chat is a sequence of htmx fragments: starting a session swaps in the
//! message panel, each message appends two bubbles, and ending the session
//! swaps the start button back in.

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::Response,
};
use axum_extra::extract::Form;
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState,
    alert::Alert,
    api::ApiClient,
    auth::Session,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE,
        base, loading_spinner, render,
    },
    navigation::NavBar,
};

/// The state needed for the assistant chat.
#[derive(Debug, Clone)]
pub struct ChatState {
    pub api_client: ApiClient,
}

impl FromRef<AppState> for ChatState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api_client: state.api_client.clone(),
        }
    }
}

/// Display the assistant chat page with a start button.
pub async fn get_chat_page() -> Response {
    let nav_bar = NavBar::new(endpoints::CHAT_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-2xl space-y-4"
            {
                h1 class="text-xl font-bold" { "Assistant" }

                p class="text-sm text-gray-600 dark:text-gray-300"
                {
                    "Ask about your spending, categories or carbon footprint."
                }

                div id="chat-panel"
                {
                    (start_button())
                }
            }
        }
    };

    render(StatusCode::OK, base("Assistant", &[], &content))
}

fn start_button() -> Markup {
    html! {
        button
            hx-post=(endpoints::CHAT_START_API)
            hx-target="#chat-panel"
            hx-indicator="#indicator"
            class=(BUTTON_PRIMARY_STYLE)
        {
            span id="indicator" class="htmx-indicator" { (loading_spinner()) }

            "Start a conversation"
        }
    }
}

fn assistant_bubble(message: &str) -> Markup {
    html! {
        div class="max-w-[80%] rounded-lg bg-gray-100 dark:bg-gray-700 px-3 py-2
            text-sm text-gray-900 dark:text-white"
        {
            (message)
        }
    }
}

fn user_bubble(message: &str) -> Markup {
    html! {
        div class="max-w-[80%] ml-auto rounded-lg bg-blue-500 dark:bg-blue-600
            px-3 py-2 text-sm text-white"
        {
            (message)
        }
    }
}

fn chat_session_panel(chat_id: &str, greeting: &str) -> Markup {
    let message_endpoint = format_endpoint(endpoints::CHAT_MESSAGE_API, chat_id);
    let end_endpoint = format_endpoint(endpoints::CHAT_END_API, chat_id);

    html! {
        div class="space-y-3" data-chat-id=(chat_id)
        {
            div id="chat-messages" class="flex flex-col gap-2"
            {
                (assistant_bubble(greeting))
            }

            form
                hx-post=(message_endpoint)
                hx-target="#chat-messages"
                hx-swap="beforeend"
                hx-indicator="#indicator"
                "hx-on::after-request"="this.reset()"
                class="flex gap-2"
            {
                input
                    type="text"
                    name="message"
                    placeholder="Ask a question..."
                    required
                    autocomplete="off"
                    class=(FORM_TEXT_INPUT_STYLE);

                button type="submit" class="px-4 py-2 text-sm bg-blue-500 dark:bg-blue-600
                    hover:bg-blue-600 hover:dark:bg-blue-700 text-white rounded"
                {
                    "Send"
                }
            }

            button
                hx-post=(end_endpoint)
                hx-target="#chat-panel"
                class=(BUTTON_SECONDARY_STYLE)
            {
                "End conversation"
            }
        }
    }
}

/// Handler for starting a chat session.
pub async fn post_start_chat(
    State(state): State<ChatState>,
    Extension(session): Extension<Session>,
) -> Response {
    let started = match state.api_client.start_chat(session.user_id).await {
        Ok(started) => started,
        Err(error) => {
            tracing::error!("Could not start a chat session: {error}");
            return error.into_alert_response();
        }
    };

    render(
        StatusCode::OK,
        chat_session_panel(&started.chat_id, &started.message),
    )
}

/// The chat message form data.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageForm {
    pub message: String,
}

/// Handler for sending one message within a chat session.
///
/// Returns the user's bubble followed by the assistant's reply, appended to
/// the message list by htmx.
pub async fn post_send_message(
    State(state): State<ChatState>,
    Extension(session): Extension<Session>,
    Path(chat_id): Path<String>,
    Form(form): Form<MessageForm>,
) -> Response {
    let reply = match state
        .api_client
        .send_chat_message(session.user_id, &chat_id, &form.message)
        .await
    {
        Ok(reply) => reply,
        Err(error) => {
            tracing::error!("Could not send a chat message: {error}");
            return error.into_alert_response();
        }
    };

    let fragment = html! {
        (user_bubble(&form.message))
        (assistant_bubble(&reply.message))
    };

    render(StatusCode::OK, fragment)
}

/// Handler for ending a chat session.
pub async fn post_end_chat(
    State(state): State<ChatState>,
    Extension(session): Extension<Session>,
    Path(chat_id): Path<String>,
) -> Response {
    if let Err(error) = state.api_client.end_chat(session.user_id, &chat_id).await {
        // The session times out on the backend anyway.
        tracing::warn!("Could not end chat session {chat_id}: {error}");
    }

    let fragment = html! {
        (start_button())
        (Alert::Success {
            message: "Conversation ended".to_owned(),
            details: "Start a new one whenever you have another question.".to_owned(),
        }
        .into_html())
    };

    render(StatusCode::OK, fragment)
}

#[cfg(test)]
mod chat_tests {
    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
        response::Response,
    };
    use axum_extra::extract::Form;

    use crate::{ApiClient, auth::Session, test_utils::backend::FakeBackend};

    use super::{ChatState, MessageForm, post_end_chat, post_send_message, post_start_chat};

    fn test_session() -> Session {
        Session {
            access_token: "token".to_owned(),
            refresh_token: "refresh".to_owned(),
            user_id: 7,
        }
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("could not read response body");

        String::from_utf8(bytes.to_vec()).expect("response body is not UTF-8")
    }

    #[tokio::test]
    async fn starting_a_chat_renders_the_session_panel() {
        let backend = FakeBackend::new().start().await;
        let state = ChatState {
            api_client: ApiClient::new(&backend.base_url()),
        };

        let response = post_start_chat(State(state), Extension(test_session())).await;

        assert_eq!(response.status(), StatusCode::OK);

        let body = body_text(response).await;
        assert!(body.contains("chat-messages"));
        assert!(body.contains("data-chat-id"));
    }

    #[tokio::test]
    async fn sending_a_message_renders_both_bubbles() {
        let backend = FakeBackend::new().start().await;
        let state = ChatState {
            api_client: ApiClient::new(&backend.base_url()),
        };

        let response = post_send_message(
            State(state),
            Extension(test_session()),
            Path("chat-1".to_owned()),
            Form(MessageForm {
                message: "How much did I spend on food?".to_owned(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);

        let body = body_text(response).await;
        assert!(body.contains("How much did I spend on food?"));
    }

    #[tokio::test]
    async fn ending_a_chat_restores_the_start_button() {
        let backend = FakeBackend::new().start().await;
        let state = ChatState {
            api_client: ApiClient::new(&backend.base_url()),
        };

        let response = post_end_chat(
            State(state),
            Extension(test_session()),
            Path("chat-1".to_owned()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);

        let body = body_text(response).await;
        assert!(body.contains("Start a conversation"));
    }

    #[tokio::test]
    async fn unreachable_backend_renders_an_alert() {
        let state = ChatState {
            api_client: ApiClient::new("http://127.0.0.1:1"),
        };

        let response = post_start_chat(State(state), Extension(test_session())).await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
