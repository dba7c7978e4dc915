use std::time::Duration;

pub const APP_NAME: &str = "chatpanel";

// =================================================
// Upstream model service
// =================================================
// Local Ollama server, same default the official clients use
pub const OLLAMA_BASE_URL: &str = "http://127.0.0.1:11434";
pub const OLLAMA_CHAT_ENDPOINT: &str = "/api/chat";
pub const OLLAMA_PROVIDER: &str = "ollama";
pub const DEFAULT_MODEL: &str = "deepseek-r1:1.5b";

// =================================================
// Panel server
// =================================================
pub const PANEL_SERVER_HOST: &str = "127.0.0.1";
pub const PANEL_SERVER_PORT: u16 = 21915;
pub const PANEL_TITLE: &str = "Deepseek Ext";
pub const PANEL_SSE_KEEP_ALIVE: Duration = Duration::from_secs(15);
// Viewers that fall this far behind skip the stale updates
pub const PANEL_BROADCAST_CAPACITY: usize = 256;
// Panels without viewers and untouched this long are dropped
pub const PANEL_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);
pub const PANEL_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

// Prefix for every relay failure shown in the panel
pub const ERROR_PREFIX: &str = "Error: ";

// log file name, placed under `${data_local_dir}/chatpanel/logs`
pub const LOG_FILE_NAME: &str = "chatpanel.log";
