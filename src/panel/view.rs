use super::message::OutboundMessage;

/// Display state of one panel: the text in its output region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelView {
    output: String,
}

impl PanelView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies an update. Each `chatResponse` replaces the output wholesale.
    pub fn apply(&mut self, message: &OutboundMessage) {
        match message {
            OutboundMessage::ChatResponse { text } => {
                self.output.clear();
                self.output.push_str(text);
            }
        }
    }

    pub fn output(&self) -> &str {
        &self.output
    }
}
