//! # Chat Commands
//!
//! Handles the messages a panel page posts to the host.
//!
//! ## Usage
//! The page posts `{ command: 'chat', text }` and listens for
//! `chatResponse` events:
//!
//! ```js
//! await fetch(`/panel/${panelId}/message`, {
//!     method: 'POST',
//!     headers: { 'Content-Type': 'application/json' },
//!     body: JSON.stringify({ command: 'chat', text: 'Hello' }),
//! })
//! const events = new EventSource(`/panel/${panelId}/events`)
//! events.addEventListener('message', (event) => {
//!     const { command, text } = JSON.parse(event.data)
//! })
//! ```

use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::ai::interaction::ChatRelay;
use crate::libs::panel_channels::PanelSender;
use crate::panel::InboundMessage;

/// Dispatches one panel message.
///
/// A `chat` message starts a relay on its own task so that a new prompt is
/// never held up by one still streaming. Other commands are ignored.
///
/// # Returns
/// The handle of the spawned relay task, `None` when the message was ignored.
pub fn handle_panel_message(
    relay: Arc<ChatRelay>,
    sender: PanelSender,
    message: InboundMessage,
) -> Option<JoinHandle<()>> {
    match message {
        InboundMessage::Chat { text } => Some(tokio::spawn(async move {
            relay.handle(text, &sender).await;
        })),
        InboundMessage::Unknown => {
            #[cfg(debug_assertions)]
            log::debug!("Ignoring panel message with unknown command");
            None
        }
    }
}
