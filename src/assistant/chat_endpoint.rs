//! The JSON endpoint that relays a question and its context to the language model.

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    assistant::client::{ChatContext, GeminiClient},
};

/// The state needed for the chat endpoint.
#[derive(Debug, Clone)]
pub struct ChatState {
    /// The client for the language model, `None` if no API key was configured.
    pub assistant: Option<GeminiClient>,
}

impl FromRef<AppState> for ChatState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            assistant: state.assistant.clone(),
        }
    }
}

/// A question about the finances in `context`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user's question.
    pub message: String,
    /// The data the question is about.
    #[serde(default)]
    pub context: ChatContext,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
enum ChatResponse {
    Answer { response: String },
    Failure { error: String },
}

fn failure(status: StatusCode, error: &str) -> Response {
    (
        status,
        Json(ChatResponse::Failure {
            error: error.to_owned(),
        }),
    )
        .into_response()
}

/// Ask the language model the question in the request body.
///
/// Responds with `{"response": ...}` on success and `{"error": ...}` with a
/// 500 status if the assistant is not configured or the model fails. A body
/// that is not a valid request gets an `{"error": ...}` with a 4xx status.
pub async fn chat_endpoint(
    State(state): State<ChatState>,
    request: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request = match request {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::warn!("rejected chat request: {rejection}");
            return failure(rejection.status(), &rejection.body_text());
        }
    };

    if request.message.trim().is_empty() {
        return failure(StatusCode::BAD_REQUEST, &Error::EmptyMessage.to_string());
    }

    let Some(assistant) = state.assistant else {
        tracing::warn!("received a chat message but no API key is configured");
        return failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            &Error::AssistantNotConfigured.to_string(),
        );
    };

    let context = ChatContext::new(request.context.transactions, request.context.emergency_fund);

    match assistant.ask(&request.message, &context).await {
        Ok(response) => Json(ChatResponse::Answer { response }).into_response(),
        Err(error) => {
            tracing::error!("could not get an answer from the assistant: {error}");
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate response",
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_string_contains, method, path},
    };

    use crate::{
        assistant::client::{AssistantConfig, GeminiClient},
        endpoints,
    };

    use super::{ChatResponse, ChatState, chat_endpoint};

    fn test_server(assistant: Option<GeminiClient>) -> TestServer {
        let app = Router::new()
            .route(endpoints::CHAT_API, post(chat_endpoint))
            .with_state(ChatState { assistant });

        TestServer::try_new(app).expect("Could not create test server.")
    }

    fn client_for(server: &MockServer) -> GeminiClient {
        GeminiClient::new(AssistantConfig {
            api_key: "test-key".to_owned(),
            model: "test-model".to_owned(),
            base_url: server.uri(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn relays_question_and_context() {
        let model = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/test-model:generateContent"))
            .and(body_string_contains("Coffee"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "Spend less on coffee."}]}}]
            })))
            .expect(1)
            .mount(&model)
            .await;
        let server = test_server(Some(client_for(&model)));

        let response = server
            .post(endpoints::CHAT_API)
            .json(&json!({
                "message": "How can I save money?",
                "context": {
                    "transactions": [{
                        "id": "1",
                        "amount": "4.50",
                        "description": "Coffee",
                        "date": "2025-03-10",
                        "type": "expense",
                        "category": "food",
                        "paymentMethod": "debit",
                        "isRecurring": false,
                        "recurrenceDay": null
                    }],
                    "emergencyFund": {
                        "currentAmount": "0",
                        "goalAmount": "10000",
                        "monthlyContribution": "500"
                    }
                }
            }))
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<ChatResponse>(),
            ChatResponse::Answer {
                response: "Spend less on coffee.".to_owned()
            }
        );
    }

    #[tokio::test]
    async fn missing_api_key_is_an_error() {
        let server = test_server(None);

        let response = server
            .post(endpoints::CHAT_API)
            .json(&json!({"message": "Hello?"}))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.json::<ChatResponse>(),
            ChatResponse::Failure {
                error: "API Key not configured".to_owned()
            }
        );
    }

    #[tokio::test]
    async fn model_failure_is_an_error() {
        let model = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&model)
            .await;
        let server = test_server(Some(client_for(&model)));

        let response = server
            .post(endpoints::CHAT_API)
            .json(&json!({"message": "Hello?"}))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.json::<ChatResponse>(),
            ChatResponse::Failure {
                error: "Failed to generate response".to_owned()
            }
        );
    }

    #[tokio::test]
    async fn missing_message_is_json_error() {
        let server = test_server(None);

        let response = server
            .post(endpoints::CHAT_API)
            .json(&json!({"context": {}}))
            .await;

        assert!(response.status_code().is_client_error());
        assert!(matches!(
            response.json::<ChatResponse>(),
            ChatResponse::Failure { .. }
        ));
    }

    #[tokio::test]
    async fn malformed_body_is_json_error() {
        let server = test_server(None);

        let response = server
            .post(endpoints::CHAT_API)
            .bytes("{\"message\": ".into())
            .content_type("application/json")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(matches!(
            response.json::<ChatResponse>(),
            ChatResponse::Failure { .. }
        ));
    }

    #[tokio::test]
    async fn empty_message_is_bad_request() {
        let server = test_server(None);

        let response = server
            .post(endpoints::CHAT_API)
            .json(&json!({"message": "   "}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
