use std::path::PathBuf;

use crate::constants::{
    APP_NAME, DEFAULT_MODEL, OLLAMA_BASE_URL, PANEL_SERVER_HOST, PANEL_SERVER_PORT,
};

/// Runtime settings for the panel host.
///
/// Every value comes from the compiled-in constants; nothing is read from
/// files, the environment or the command line.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the Ollama server, e.g. `http://127.0.0.1:11434`
    pub ollama_url: String,
    /// Model identifier sent with every chat request
    pub model: String,
    /// Address the panel server binds to
    pub server_host: String,
    /// First port tried when binding the panel server
    pub server_port: u16,
    /// Directory for the log file, `None` disables file logging
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ollama_url: OLLAMA_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            server_host: PANEL_SERVER_HOST.to_string(),
            server_port: PANEL_SERVER_PORT,
            log_dir: dirs::data_local_dir().map(|dir| dir.join(APP_NAME).join("logs")),
        }
    }
}
