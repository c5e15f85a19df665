//! The chat page for asking the assistant about the user's finances.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    assistant::client::{ChatContext, GeminiClient, MAX_CONTEXT_TRANSACTIONS},
    emergency_fund::get_emergency_fund,
    endpoints,
    html::{FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, base, loading_spinner},
    navigation::NavBar,
    transaction::{TransactionFilter, list_transactions},
};

const WELCOME_MESSAGE: &str = "Hi! I'm your finance assistant. I can look at your \
    spending and give you tips. What would you like to know?";

const APOLOGY_MESSAGE: &str =
    "Sorry, I had a problem processing your message. Please try again.";

/// The state needed for the assistant page and its messages.
#[derive(Debug, Clone)]
pub struct AssistantState {
    /// The database connection for reading the context of a question.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The client for the language model, `None` if no API key was configured.
    pub assistant: Option<GeminiClient>,
}

impl FromRef<AppState> for AssistantState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            assistant: state.assistant.clone(),
        }
    }
}

/// The form data for a question to the assistant.
#[derive(Debug, Deserialize)]
pub struct MessageForm {
    /// The user's question.
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    User,
    Assistant,
}

fn message_bubble(role: Role, content: &str) -> Markup {
    let (row_class, bubble_class, label) = match role {
        Role::User => (
            "flex justify-end",
            "bg-blue-600 text-white rounded-tr-none",
            "user",
        ),
        Role::Assistant => (
            "flex justify-start",
            "bg-white dark:bg-gray-800 border border-gray-200 dark:border-gray-700 rounded-tl-none",
            "assistant",
        ),
    };

    html! {
        div class=(row_class) data-role=(label)
        {
            div class={ "max-w-[80%] p-3 rounded-xl text-sm whitespace-pre-wrap " (bubble_class) }
            {
                (content)
            }
        }
    }
}

fn assistant_view(is_configured: bool) -> Markup {
    let nav_bar = NavBar::new(endpoints::ASSISTANT_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-2xl flex flex-col gap-4"
            {
                header
                {
                    h1 class="text-xl font-bold" { "Assistant" }
                    p class="text-sm text-gray-500 dark:text-gray-400"
                    {
                        "Ask questions about your last " (MAX_CONTEXT_TRANSACTIONS)
                        " transactions and your emergency fund."
                    }
                }

                @if !is_configured {
                    div
                        role="alert"
                        class="p-4 text-sm text-yellow-800 rounded-lg bg-yellow-50
                            dark:bg-gray-800 dark:text-yellow-300"
                    {
                        "The assistant is not available because no API key has been configured."
                    }
                }

                div
                    id="messages"
                    class="flex flex-col gap-4 min-h-[50vh] p-4 rounded-xl
                        bg-gray-50 dark:bg-gray-900 overflow-y-auto"
                {
                    (message_bubble(Role::Assistant, WELCOME_MESSAGE))
                }

                form
                    hx-post=(endpoints::ASSISTANT_MESSAGES)
                    hx-target="#messages"
                    hx-swap="beforeend"
                    hx-target-error="#alert-container"
                    hx-indicator="#indicator"
                    hx-disabled-elt="find button, find input"
                    "hx-on::after-request"="if (event.detail.successful) this.reset()"
                    class="flex gap-2"
                {
                    input
                        name="message"
                        type="text"
                        placeholder="Ask about your spending..."
                        autocomplete="off"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);

                    button
                        type="submit"
                        id="indicator"
                        class="px-4 py-2 bg-blue-500 dark:bg-blue-600 hover:enabled:bg-blue-600
                            disabled:bg-blue-700 text-white rounded"
                    {
                        span class="inline htmx-indicator" { (loading_spinner()) }
                        " Send"
                    }
                }
            }
        }
    };

    base("Assistant", &[], &content)
}

/// Render the chat page.
pub async fn get_assistant_page(State(state): State<AssistantState>) -> Response {
    assistant_view(state.assistant.is_some()).into_response()
}

/// Ask the assistant a question about the user's recent transactions and
/// emergency fund.
///
/// Responds with the user's message followed by the answer, or an apology if
/// the assistant could not answer.
pub async fn post_message_endpoint(
    State(state): State<AssistantState>,
    Form(form): Form<MessageForm>,
) -> Response {
    let message = form.message.trim();

    if message.is_empty() {
        return Error::EmptyMessage.into_alert_response();
    }

    let context = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_alert_response();
            }
        };

        let transactions = list_transactions(
            &TransactionFilter::default().limit(MAX_CONTEXT_TRANSACTIONS as u32),
            &connection,
        )
        .inspect_err(|error| tracing::error!("could not get recent transactions: {error}"))
        .unwrap_or_default();
        let fund = get_emergency_fund(&connection)
            .inspect_err(|error| tracing::error!("could not get the emergency fund: {error}"))
            .unwrap_or_default();

        ChatContext::new(transactions, fund)
    };

    let answer = match &state.assistant {
        Some(assistant) => assistant.ask(message, &context).await,
        None => Err(Error::AssistantNotConfigured),
    };

    let answer = answer
        .inspect_err(|error| tracing::error!("could not get an answer from the assistant: {error}"))
        .unwrap_or_else(|_| APOLOGY_MESSAGE.to_owned());

    html! {
        (message_bubble(Role::User, message))
        (message_bubble(Role::Assistant, &answer))
    }
    .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Router,
        http::StatusCode,
        routing::{get, post},
    };
    use axum_test::TestServer;
    use rust_decimal::Decimal;
    use scraper::{Html, Selector};
    use serde_json::json;
    use time::macros::date;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_string_contains, method},
    };

    use crate::{
        assistant::client::{AssistantConfig, GeminiClient},
        endpoints,
        test_utils::{assert_hx_endpoint, assert_valid_html, get_test_connection, must_get_form},
        transaction::{Transaction, create_transaction},
    };

    use super::{APOLOGY_MESSAGE, AssistantState, get_assistant_page, post_message_endpoint};

    fn test_server(assistant: Option<GeminiClient>) -> TestServer {
        let conn = get_test_connection();
        create_transaction(
            Transaction::build(Decimal::new(450, 2), date!(2025 - 03 - 10), "Coffee"),
            &conn,
        )
        .unwrap();
        let state = AssistantState {
            db_connection: Arc::new(Mutex::new(conn)),
            assistant,
        };
        let app = Router::new()
            .route(endpoints::ASSISTANT_VIEW, get(get_assistant_page))
            .route(endpoints::ASSISTANT_MESSAGES, post(post_message_endpoint))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    fn bubbles(html: &str) -> Vec<(String, String)> {
        let fragment = Html::parse_fragment(html);
        fragment
            .select(&Selector::parse("[data-role]").unwrap())
            .map(|bubble| {
                (
                    bubble.value().attr("data-role").unwrap_or_default().to_owned(),
                    bubble.text().collect::<String>().trim().to_owned(),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn page_has_chat_form() {
        let server = test_server(None);

        let response = server.get(endpoints::ASSISTANT_VIEW).await;

        response.assert_status_ok();
        let document = Html::parse_document(&response.text());
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::ASSISTANT_MESSAGES, "hx-post");
        assert!(
            response.text().contains("no API key"),
            "missing API key notice"
        );
    }

    #[tokio::test]
    async fn message_returns_question_and_answer() {
        let model = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("Coffee"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "You spent $4.50 on coffee."}]}}]
            })))
            .expect(1)
            .mount(&model)
            .await;
        let client = GeminiClient::new(AssistantConfig {
            api_key: "test-key".to_owned(),
            model: "test-model".to_owned(),
            base_url: model.uri(),
        })
        .unwrap();
        let server = test_server(Some(client));

        let response = server
            .post(endpoints::ASSISTANT_MESSAGES)
            .form(&[("message", "How much did I spend on coffee?")])
            .await;

        response.assert_status_ok();
        assert_eq!(
            bubbles(&response.text()),
            [
                ("user".to_owned(), "How much did I spend on coffee?".to_owned()),
                ("assistant".to_owned(), "You spent $4.50 on coffee.".to_owned()),
            ]
        );
    }

    #[tokio::test]
    async fn failure_shows_apology() {
        let server = test_server(None);

        let response = server
            .post(endpoints::ASSISTANT_MESSAGES)
            .form(&[("message", "Hello?")])
            .await;

        response.assert_status_ok();
        let bubbles = bubbles(&response.text());
        assert_eq!(bubbles.len(), 2);
        assert_eq!(bubbles[1].1, APOLOGY_MESSAGE);
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let server = test_server(None);

        let response = server
            .post(endpoints::ASSISTANT_MESSAGES)
            .form(&[("message", " ")])
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
