// modules
pub mod ai;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod http;
pub mod libs;
mod logger;
pub mod panel;

#[cfg(test)]
pub mod test;

use rust_i18n::i18n;
use std::sync::Arc;

use ai::chat::ollama::OllamaChat;
use ai::interaction::ChatRelay;
use config::AppConfig;
use http::server::start_http_server;
use logger::setup_logger;

// Initialize internationalization with the "i18n" directory
i18n!("i18n", fallback = "en");

/// Runs the chat panel host.
///
/// Sets up logging, connects the relay to the local Ollama server and
/// serves panels until Ctrl-C.
pub async fn run() -> error::Result<()> {
    let config = AppConfig::default();
    setup_logger(&config)?;

    log::info!(
        "{} {} starting, model {} at {}",
        constants::APP_NAME,
        env!("CARGO_PKG_VERSION"),
        config.model,
        config.ollama_url
    );

    let chat = OllamaChat::new(config.ollama_url.clone())?;
    let relay = Arc::new(ChatRelay::new(Arc::new(chat), config.model.clone()));

    start_http_server(&config, relay).await?;
    Ok(())
}
