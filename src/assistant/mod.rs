//! An assistant that answers questions about the user's finances with a
//! language model.

mod chat_endpoint;
mod client;
mod page;

pub use chat_endpoint::chat_endpoint;
pub use client::{AssistantConfig, DEFAULT_BASE_URL, DEFAULT_MODEL, GeminiClient};
pub use page::{get_assistant_page, post_message_endpoint};
