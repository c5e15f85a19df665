//! A client for the Gemini language model that answers questions about the
//! user's finances.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, emergency_fund::EmergencyFund, transaction::Transaction};

/// The model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// The Gemini REST API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// The most transactions that are sent to the model with a question.
pub const MAX_CONTEXT_TRANSACTIONS: usize = 50;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("finance_tracker/", env!("CARGO_PKG_VERSION"));

const GUIDELINES: &str = "\
1. Analyse only the data given above (transactions, emergency fund) to answer.
2. Be direct, but polite.
3. If the user asks about spending, add up the amounts of the relevant categories.
4. Give short financial tips when appropriate.
5. Do not make up data that is not in the context.";

/// How to reach the language model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantConfig {
    /// The key for the Gemini API.
    pub api_key: String,
    /// The model name, e.g. "gemini-1.5-flash".
    pub model: String,
    /// The scheme and host of the API, without a trailing slash.
    pub base_url: String,
}

impl AssistantConfig {
    /// Create a config for the default model and API.
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }
}

/// The data the model may use to answer a question.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatContext {
    /// The most recent transactions, newest first.
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    /// The user's emergency fund.
    #[serde(default)]
    pub emergency_fund: EmergencyFund,
}

impl ChatContext {
    /// Create a context, keeping only the first [MAX_CONTEXT_TRANSACTIONS] transactions.
    pub fn new(mut transactions: Vec<Transaction>, emergency_fund: EmergencyFund) -> Self {
        transactions.truncate(MAX_CONTEXT_TRANSACTIONS);

        Self {
            transactions,
            emergency_fund,
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

/// Sends one question at a time to the Gemini `generateContent` API.
///
/// There is no conversation memory, each question only sees the context
/// sent along with it.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: AssistantConfig,
}

impl GeminiClient {
    /// Create a client for the model described by `config`.
    ///
    /// # Errors
    /// Returns [Error::AssistantRequestFailed] if the HTTP client cannot be created.
    pub fn new(config: AssistantConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|error| Error::AssistantRequestFailed(error.to_string()))?;

        Ok(Self { http, config })
    }

    /// The name of the model answering questions.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Ask the model `message` about the finances in `context`.
    ///
    /// # Errors
    /// Returns [Error::AssistantRequestFailed] if the request fails, the API
    /// responds with an error status or the response has no text.
    pub async fn ask(&self, message: &str, context: &ChatContext) -> Result<String, Error> {
        let prompt = build_prompt(message, context)?;
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );
        let body = GenerateContentRequest {
            contents: [Content {
                parts: [RequestPart { text: &prompt }],
            }],
        };

        tracing::debug!(
            "asking {} with {} transactions",
            self.config.model,
            context.transactions.len()
        );

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|error| Error::AssistantRequestFailed(error.without_url().to_string()))?;

        let response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|error| Error::AssistantRequestFailed(error.without_url().to_string()))?;

        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(Error::AssistantRequestFailed(
                "the model returned no text".to_owned(),
            ));
        }

        Ok(text)
    }
}

/// The instructions, financial data and question sent to the model.
fn build_prompt(message: &str, context: &ChatContext) -> Result<String, Error> {
    let context_json = serde_json::to_string(context)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    Ok(format!(
        "You are a smart and friendly personal finance assistant.\n\n\
        USER'S FINANCIAL CONTEXT (JSON):\n{context_json}\n\n\
        USER'S QUESTION:\n\"{message}\"\n\n\
        GUIDELINES:\n{GUIDELINES}\n"
    ))
}
