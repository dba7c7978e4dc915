use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::ai::error::AiError;

/// Role of a chat message sender. The panel only ever sends user prompts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
}

/// A single message sent to the chat completion API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    /// Creates a user message, the content is kept verbatim.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// One incremental piece of generated text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatFragment {
    /// The text delta, may be empty
    pub content: String,
}

impl ChatFragment {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Lazy, finite sequence of fragments produced by one streaming call.
///
/// The sequence ends after the server signals completion. An `Err` item ends
/// it early; nothing is yielded after an error.
pub type FragmentStream = BoxStream<'static, Result<ChatFragment, AiError>>;

// =================================================
// Start of Chat trait
// =================================================
#[async_trait]
pub trait AiChatTrait: Send + Sync {
    /// Opens a streaming chat completion.
    ///
    /// # Arguments
    /// - `model`: The model to be used for the chat.
    /// - `messages`: The messages sent with the request, in order.
    ///
    /// # Returns
    /// - A `FragmentStream` pulling the response body lazily, or an error if
    ///   the request could not be established (unreachable server, non-2xx
    ///   status, ...).
    async fn chat_stream(
        &self,
        model: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<FragmentStream, AiError>;
}
