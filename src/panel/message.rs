use serde::{Deserialize, Serialize};

/// Message posted by the panel page to the host.
///
/// `{ "command": "chat", "text": "..." }`. Any other command is accepted
/// and ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command")]
pub enum InboundMessage {
    #[serde(rename = "chat")]
    Chat {
        #[serde(default)]
        text: String,
    },
    #[serde(other)]
    Unknown,
}

/// Message pushed by the host to the panel page.
///
/// `text` is always the full text to display, never a delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command")]
pub enum OutboundMessage {
    #[serde(rename = "chatResponse")]
    ChatResponse { text: String },
}

impl OutboundMessage {
    pub fn chat_response(text: impl Into<String>) -> Self {
        OutboundMessage::ChatResponse { text: text.into() }
    }

    pub fn text(&self) -> &str {
        match self {
            OutboundMessage::ChatResponse { text } => text,
        }
    }
}
