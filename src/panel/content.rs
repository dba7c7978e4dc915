use crate::constants::PANEL_TITLE;

const PANEL_TEMPLATE: &str = include_str!("panel.html");

/// Renders the panel page for one panel.
///
/// The page posts `{command: "chat", text}` to `/panel/{id}/message` and
/// listens on `/panel/{id}/events`, replacing the `#response` text with
/// every `chatResponse` it receives.
pub fn get_panel_content(panel_id: &str) -> String {
    // JSON-encode so the id lands in the script as a string literal
    let panel_id_literal =
        serde_json::to_string(panel_id).unwrap_or_else(|_| String::from("\"\""));
    PANEL_TEMPLATE
        .replace("__PANEL_TITLE__", PANEL_TITLE)
        .replace("__PANEL_ID__", &panel_id_literal)
}
