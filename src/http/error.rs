use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_i18n::t;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// HTTP module error types
#[derive(Error, Debug, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "camelCase")]
pub enum HttpError {
    /// The panel id is unknown or the panel was disposed
    #[error("{}", t!("http.panel_not_found", id = _0))]
    PanelNotFound(String),
    /// The panel posted a body that is not a panel message
    #[error("{}", t!("http.invalid_message", error = _0))]
    InvalidMessage(String),
    /// IO error
    #[error("{0}")]
    Io(String),
    /// The server could not be started
    #[error("{}", t!("http.server_startup_failed", error = _0))]
    StartUp(String),
}

impl From<std::io::Error> for HttpError {
    fn from(err: std::io::Error) -> Self {
        HttpError::Io(err.to_string())
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            HttpError::PanelNotFound(_) => (StatusCode::NOT_FOUND, "Panel Not Found"),
            HttpError::InvalidMessage(_) => (StatusCode::BAD_REQUEST, "Invalid Message"),
            HttpError::Io(_) | HttpError::StartUp(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        };
        let message = self.to_string();

        log::error!("HttpError: type={}, message={}", error_type, &message);

        let error_response = json!({ "error": { "message": message, "type": error_type }});
        (status, Json(error_response)).into_response()
    }
}

pub type HttpResult<T> = Result<T, HttpError>;
