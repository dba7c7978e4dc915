#[cfg(test)]
mod tests {
    use crate::logger::setup_test_logger;

    #[small_ctor::ctor]
    unsafe fn init() {
        let _ = setup_test_logger();
    }
}

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use futures::StreamExt;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// What the mock Ollama server answers to `POST /api/chat`.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Streams the chunks as they are, one write per chunk
    Stream(Vec<&'static str>),
    /// Streams the chunks, then drops the connection mid-body
    StreamThenAbort(Vec<&'static str>),
    /// Answers with the status and body at once
    Status(StatusCode, &'static str),
}

/// A running mock Ollama server.
pub struct MockOllama {
    pub url: String,
    /// Every JSON body received on `/api/chat`, in arrival order
    pub requests: Arc<Mutex<Vec<Value>>>,
}

#[derive(Clone)]
struct MockState {
    reply: Arc<MockReply>,
    requests: Arc<Mutex<Vec<Value>>>,
}

/// Starts a mock Ollama server on an ephemeral local port.
pub async fn spawn_mock_ollama(reply: MockReply) -> MockOllama {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        reply: Arc::new(reply),
        requests: requests.clone(),
    };
    let app = Router::new()
        .route("/api/chat", post(mock_chat))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockOllama {
        url: format!("http://{}", addr),
        requests,
    }
}

/// A local URL nothing listens on.
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

async fn mock_chat(State(state): State<MockState>, Json(body): Json<Value>) -> Response {
    state.requests.lock().push(body);
    match state.reply.as_ref() {
        MockReply::Status(status, body) => (*status, body.to_string()).into_response(),
        MockReply::Stream(chunks) => stream_body(chunks.clone(), false),
        MockReply::StreamThenAbort(chunks) => stream_body(chunks.clone(), true),
    }
}

fn stream_body(chunks: Vec<&'static str>, abort: bool) -> Response {
    let items = chunks
        .into_iter()
        .map(|chunk| Ok::<_, std::io::Error>(Bytes::from_static(chunk.as_bytes())))
        .chain(abort.then(|| {
            Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "upstream went away",
            ))
        }));
    // a short pause keeps each chunk in its own write
    let stream = futures::stream::iter(items).then(|item| async move {
        tokio::time::sleep(Duration::from_millis(5)).await;
        item
    });

    Response::builder()
        .header(CONTENT_TYPE, "application/x-ndjson")
        .body(Body::from_stream(stream))
        .unwrap()
}
