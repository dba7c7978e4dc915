use futures::StreamExt;
use std::sync::Arc;

use crate::ai::error::AiError;
use crate::ai::traits::chat::{AiChatTrait, ChatMessage};
use crate::constants::ERROR_PREFIX;
use crate::libs::panel_channels::PanelSender;
use crate::panel::OutboundMessage;

/// Bridges one panel prompt to one streaming chat completion.
///
/// Every fragment is appended to the accumulated text and the whole text so
/// far is pushed to the panel. Any failure, whether opening the call or
/// midway through the stream, ends the request with a single
/// `"Error: ..."` update. Invocations share nothing: overlapping requests
/// each keep their own accumulation and push into the same panel in
/// whatever order their fragments arrive.
#[derive(Clone)]
pub struct ChatRelay {
    chat: Arc<dyn AiChatTrait>,
    model: String,
}

impl ChatRelay {
    pub fn new(chat: Arc<dyn AiChatTrait>, model: impl Into<String>) -> Self {
        Self {
            chat,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Handles one prompt from the panel.
    ///
    /// # Arguments
    /// - `prompt_text`: The text typed in the panel, forwarded verbatim
    ///   (empty is fine).
    /// - `sender`: Where the updates go.
    pub async fn handle(&self, prompt_text: String, sender: &PanelSender) {
        #[cfg(debug_assertions)]
        log::debug!(
            "Relaying prompt of {} chars to model {}",
            prompt_text.chars().count(),
            self.model
        );

        if let Err(e) = self.relay_stream(prompt_text, sender).await {
            log::error!("Chat relay failed: {}", e);
            sender.emit(OutboundMessage::chat_response(format!(
                "{}{}",
                ERROR_PREFIX, e
            )));
        }
    }

    async fn relay_stream(&self, prompt_text: String, sender: &PanelSender) -> Result<(), AiError> {
        let mut response_text = String::new();

        let mut stream = self
            .chat
            .chat_stream(&self.model, vec![ChatMessage::user(prompt_text)])
            .await?;

        while let Some(fragment) = stream.next().await {
            let fragment = fragment?;
            response_text.push_str(&fragment.content);
            sender.emit(OutboundMessage::chat_response(response_text.clone()));
        }

        #[cfg(debug_assertions)]
        log::debug!("Chat relay finished, {} chars", response_text.chars().count());

        Ok(())
    }
}
