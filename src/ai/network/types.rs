use serde::{Deserialize, Serialize};

use crate::ai::traits::chat::ChatMessage;

/// Configuration for API requests
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_url: String,
}

impl ApiConfig {
    /// Creates a new ApiConfig
    ///
    /// # Example
    /// ```no_run
    /// let config = ApiConfig::new("http://127.0.0.1:11434");
    /// ```
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
        }
    }
}

// Represents the request for a chat completion.
#[derive(Serialize, Debug, Clone)]
pub struct OllamaChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

// A message as it comes back from the server. The role is kept as a plain
// string since the server may answer with roles we never send.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct OllamaMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

// Represents a single line in a streaming response.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct OllamaStreamResponse {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub message: Option<OllamaMessage>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<String>,
    // The final stream object carries these additional fields.
    #[serde(default)]
    pub eval_count: Option<u64>,
    #[serde(default)]
    pub eval_duration: Option<u64>,
}

// Error body returned with a non-2xx status.
#[derive(Deserialize, Debug, Clone)]
pub struct OllamaErrorResponse {
    pub error: String,
}
