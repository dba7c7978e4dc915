use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Html,
    },
    routing::{get, post},
    Router,
};
use futures::{Stream, StreamExt};
use rust_i18n::t;
use std::{
    net::{AddrParseError, SocketAddr},
    sync::Arc,
};
use tokio::{net::TcpListener, signal, task, time};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tower_http::cors::{Any, CorsLayer};

use super::error::{HttpError, HttpResult};
use crate::ai::interaction::ChatRelay;
use crate::commands::chat::handle_panel_message;
use crate::config::AppConfig;
use crate::constants::{PANEL_IDLE_TIMEOUT, PANEL_SSE_KEEP_ALIVE, PANEL_SWEEP_INTERVAL};
use crate::libs::panel_channels::PanelChannels;
use crate::panel::{get_panel_content, InboundMessage, OutboundMessage};

/// State shared by all panel routes
pub struct ServerState {
    pub panels: PanelChannels,
    pub relay: Arc<ChatRelay>,
}

impl ServerState {
    pub fn new(relay: Arc<ChatRelay>) -> Self {
        Self {
            panels: PanelChannels::new(),
            relay,
        }
    }
}

/// Builds the panel routes:
///
/// * `GET /` opens a new panel and returns its page
/// * `POST /panel/{id}/message` takes a message posted by the page
/// * `GET /panel/{id}/events` streams `chatResponse` updates as Server-Sent Events
/// * `POST /panel/{id}/dispose` closes the panel
pub fn build_router(state: Arc<ServerState>) -> Router {
    // define cors config
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_open_panel))
        .route("/panel/{id}/message", post(handle_message))
        .route("/panel/{id}/events", get(handle_events))
        .route("/panel/{id}/dispose", post(handle_dispose))
        .layer(cors)
        .with_state(state)
}

/// Starts the panel server and runs it until Ctrl-C.
///
/// # Arguments
/// * `config` - Host and first port to try.
/// * `relay` - Relay shared by every panel.
pub async fn start_http_server(config: &AppConfig, relay: Arc<ChatRelay>) -> HttpResult<()> {
    let listener = try_available_port(&config.server_host, config.server_port)
        .await
        .map_err(|e| {
            log::error!("Failed to find available port: {}", e);
            e
        })?;
    let addr = listener.local_addr().map_err(|e| {
        log::error!("Failed to get local address: {}", e);
        HttpError::StartUp(e.to_string())
    })?;

    log::info!(
        "Panel server listening, open http://{} to start a chat with {}",
        addr,
        relay.model()
    );

    let state = Arc::new(ServerState::new(relay));
    let sweep_handle = task::spawn(sweep_idle_panels(state.clone()));

    let app = build_router(state);
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    sweep_handle.abort();
    served.map_err(|e| {
        log::error!("Panel server failed: {}", e);
        HttpError::StartUp(e.to_string())
    })?;

    log::info!("Panel server shut down gracefully");
    Ok(())
}

/// Periodically drops panels whose page went away without a dispose beacon.
async fn sweep_idle_panels(state: Arc<ServerState>) {
    let mut interval = time::interval(PANEL_SWEEP_INTERVAL);
    loop {
        interval.tick().await;
        let removed = state.panels.sweep_idle(PANEL_IDLE_TIMEOUT).await;
        if removed > 0 {
            log::info!("Swept {} idle panels", removed);
        }
    }
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => log::info!("Panel server received shutdown signal"),
        Err(e) => {
            log::error!("Failed to listen for ctrl_c: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

async fn handle_open_panel(State(state): State<Arc<ServerState>>) -> Html<String> {
    let panel = state.panels.create_panel().await;
    Html(get_panel_content(panel.id()))
}

async fn handle_message(
    State(state): State<Arc<ServerState>>,
    Path(panel_id): Path<String>,
    body: Bytes,
) -> HttpResult<StatusCode> {
    let panel = state
        .panels
        .get(&panel_id)
        .await
        .ok_or_else(|| HttpError::PanelNotFound(panel_id.clone()))?;
    let message: InboundMessage =
        serde_json::from_slice(&body).map_err(|e| HttpError::InvalidMessage(e.to_string()))?;

    // The relay runs detached, the page sees its updates on the event stream
    let _ = handle_panel_message(state.relay.clone(), panel.sender(), message);
    Ok(StatusCode::ACCEPTED)
}

async fn handle_events(
    State(state): State<Arc<ServerState>>,
    Path(panel_id): Path<String>,
) -> HttpResult<Sse<impl Stream<Item = Result<Event, axum::Error>>>> {
    let panel = state
        .panels
        .get(&panel_id)
        .await
        .ok_or_else(|| HttpError::PanelNotFound(panel_id.clone()))?;

    // Subscribe before reading the snapshot so no update falls in between
    let receiver = panel.subscribe();
    let snapshot = panel.snapshot();
    let initial = (!snapshot.is_empty()).then(|| Arc::new(OutboundMessage::chat_response(snapshot)));

    let live = BroadcastStream::new(receiver).filter_map(move |item| {
        let panel_id = panel_id.clone();
        async move {
            match item {
                Ok(message) => Some(message),
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    log::warn!("panel {}: viewer skipped {} updates", panel_id, skipped);
                    None
                }
            }
        }
    });

    let events = futures::stream::iter(initial)
        .chain(live)
        .map(|message| Event::default().json_data(message.as_ref()));

    Ok(Sse::new(events).keep_alive(KeepAlive::new().interval(PANEL_SSE_KEEP_ALIVE)))
}

async fn handle_dispose(
    State(state): State<Arc<ServerState>>,
    Path(panel_id): Path<String>,
) -> HttpResult<StatusCode> {
    if state.panels.dispose(&panel_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(HttpError::PanelNotFound(panel_id))
    }
}

async fn try_available_port(ip: &str, start_port: u16) -> HttpResult<TcpListener> {
    let mut attempts = 0;
    const MAX_ATTEMPTS: u32 = 3;

    let mut start_port = start_port;
    loop {
        attempts += 1;
        let port = find_available_port(ip, start_port, u16::MAX)?;
        let addr: SocketAddr = format!("{}:{}", ip, port)
            .parse()
            .map_err(|e: AddrParseError| HttpError::StartUp(e.to_string()))?;

        log::info!("Found available port: {} (attempt {})", port, attempts);

        // Bind and return the listener directly, the port may be taken meanwhile
        match TcpListener::bind(addr).await {
            Ok(listener) => {
                log::debug!("Port {} is confirmed available", port);
                return Ok(listener);
            }
            Err(e) => {
                log::warn!(
                    "Port {} became unavailable: {} (attempt {})",
                    port,
                    e,
                    attempts
                );
                if attempts >= MAX_ATTEMPTS {
                    if port == u16::MAX {
                        return Err(HttpError::StartUp(e.to_string()));
                    }
                    start_port = port + 1;
                    attempts = 0;
                }
                tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
            }
        }
    }
}

/// Attempts to find an available port starting from `start_port` up to `max_port`.
///
/// # Arguments
/// * `start_port` - The starting port number to try.
/// * `max_port` - The maximum port number to try.
fn find_available_port(ip: &str, start_port: u16, max_port: u16) -> HttpResult<u16> {
    use std::net::TcpListener;

    for port in start_port..=max_port {
        let addr: SocketAddr = format!("{}:{}", ip, port)
            .parse()
            .map_err(|e: AddrParseError| HttpError::StartUp(e.to_string()))?;

        if let Ok(listener) = TcpListener::bind(addr) {
            // Port 0 binds to whatever the OS hands out
            let bound_port = listener.local_addr()?.port();
            drop(listener);
            return Ok(bound_port);
        }
    }
    Err(HttpError::StartUp(
        t!(
            "http.server_no_available_ports",
            start_port = start_port,
            max_port = max_port
        )
        .to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::chat::ollama::OllamaChat;
    use crate::test::{spawn_mock_ollama, unreachable_url, MockReply};
    use std::time::Duration;

    struct PanelServer {
        url: String,
        state: Arc<ServerState>,
    }

    async fn spawn_panel_server(ollama_url: String) -> PanelServer {
        let chat = OllamaChat::new(ollama_url).unwrap();
        let relay = Arc::new(ChatRelay::new(Arc::new(chat), "deepseek-r1:1.5b"));
        let state = Arc::new(ServerState::new(relay));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = build_router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        PanelServer {
            url: format!("http://{}", addr),
            state,
        }
    }

    fn client() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }

    /// Opens a panel through `GET /` and returns its id
    async fn open_panel(server: &PanelServer) -> String {
        let html = client()
            .get(&server.url)
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        let start = html.find("const panelId = \"").unwrap() + "const panelId = \"".len();
        let end = start + html[start..].find('"').unwrap();
        html[start..end].to_string()
    }

    /// Reads the event stream until `needle` shows up
    async fn read_events_until(response: &mut reqwest::Response, needle: &str) -> String {
        let mut received = String::new();
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while !received.contains(needle) {
            let chunk = tokio::time::timeout_at(deadline, response.chunk())
                .await
                .expect("event in time")
                .unwrap()
                .expect("stream still open");
            received.push_str(&String::from_utf8_lossy(&chunk));
        }
        received
    }

    #[tokio::test]
    async fn test_open_panel_registers_it() {
        let server = spawn_panel_server(unreachable_url().await).await;

        let first = open_panel(&server).await;
        let second = open_panel(&server).await;

        assert_ne!(first, second);
        assert_eq!(server.state.panels.len().await, 2);
        assert!(server.state.panels.get(&first).await.is_some());
    }

    #[tokio::test]
    async fn test_chat_updates_stream_to_panel() {
        let mock = spawn_mock_ollama(MockReply::Stream(vec![
            "{\"message\":{\"role\":\"assistant\",\"content\":\"Hi\"},\"done\":false}\n",
            "{\"message\":{\"role\":\"assistant\",\"content\":\" there\"},\"done\":false}\n",
            "{\"message\":{\"role\":\"assistant\",\"content\":\"\"},\"done\":true}\n",
        ]))
        .await;
        let server = spawn_panel_server(mock.url.clone()).await;
        let panel_id = open_panel(&server).await;

        let mut events = client()
            .get(format!("{}/panel/{}/events", server.url, panel_id))
            .send()
            .await
            .unwrap();
        assert_eq!(events.status(), StatusCode::OK);

        let response = client()
            .post(format!("{}/panel/{}/message", server.url, panel_id))
            .json(&serde_json::json!({"command": "chat", "text": "hello"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let received = read_events_until(&mut events, "\"text\":\"Hi there\"").await;
        assert!(received.contains("data: {\"command\":\"chatResponse\",\"text\":\"Hi\"}"));

        let requests = mock.requests.lock();
        assert_eq!(requests[0]["messages"][0]["content"], "hello");
    }

    #[tokio::test]
    async fn test_events_start_with_current_text() {
        let server = spawn_panel_server(unreachable_url().await).await;
        let panel_id = open_panel(&server).await;
        let panel = server.state.panels.get(&panel_id).await.unwrap();

        panel.sender().emit(OutboundMessage::chat_response("cached"));
        let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
        while panel.snapshot().is_empty() && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let mut events = client()
            .get(format!("{}/panel/{}/events", server.url, panel_id))
            .send()
            .await
            .unwrap();
        let received = read_events_until(&mut events, "\n\n").await;
        assert!(received.contains("\"text\":\"cached\""));
    }

    #[tokio::test]
    async fn test_unknown_command_is_accepted() {
        let server = spawn_panel_server(unreachable_url().await).await;
        let panel_id = open_panel(&server).await;

        let response = client()
            .post(format!("{}/panel/{}/message", server.url, panel_id))
            .json(&serde_json::json!({"command": "clear"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_malformed_message_is_rejected() {
        let server = spawn_panel_server(unreachable_url().await).await;
        let panel_id = open_panel(&server).await;

        let response = client()
            .post(format!("{}/panel/{}/message", server.url, panel_id))
            .body("not json")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_panel_is_404() {
        let server = spawn_panel_server(unreachable_url().await).await;

        let response = client()
            .post(format!("{}/panel/missing/message", server.url))
            .json(&serde_json::json!({"command": "chat", "text": "hi"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["error"]["type"], "Panel Not Found");

        let response = client()
            .get(format!("{}/panel/missing/events", server.url))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_dispose_closes_panel() {
        let server = spawn_panel_server(unreachable_url().await).await;
        let panel_id = open_panel(&server).await;
        let dispose_url = format!("{}/panel/{}/dispose", server.url, panel_id);

        let response = client().post(&dispose_url).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(server.state.panels.len().await, 0);

        let response = client().post(&dispose_url).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_find_available_port_skips_taken_port() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let taken_port = taken.local_addr().unwrap().port();

        let port = find_available_port("127.0.0.1", taken_port, u16::MAX).unwrap();
        assert_ne!(port, taken_port);

        let listener = try_available_port("127.0.0.1", 0).await.unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }
}
