use serde::Serialize;
use thiserror::Error;

/// The single, unified error type for the entire application.
///
/// This enum wraps all module-specific errors. The
/// `#[serde(tag = "module", content = "details")]` attribute keeps the JSON
/// output predictable when an error is handed to a panel or logged.
#[derive(Error, Debug, Serialize)]
#[serde(tag = "module", content = "details")]
pub enum AppError {
    #[error(transparent)]
    Ai(#[from] crate::ai::error::AiError),

    /// Errors originating from the HTTP module.
    #[error(transparent)]
    Http(#[from] crate::http::error::HttpError),

    #[error("{message}")]
    General { message: String },
}

impl From<AppError> for String {
    fn from(error: AppError) -> Self {
        let error_message = error.to_string();

        match serde_json::to_value(&error) {
            Ok(mut value) => {
                if let Some(obj) = value.as_object_mut() {
                    obj.insert(
                        "message".to_string(),
                        serde_json::Value::String(error_message.clone()),
                    );
                }
                serde_json::to_string(&value).unwrap_or(error_message)
            }
            Err(e) => serde_json::json!({
                "module": "Internal",
                "details": {
                    "kind": "SerializationFailed",
                    "message": format!("Failed to serialize error: {}", e)
                },
                "message": error_message
            })
            .to_string(),
        }
    }
}

/// A universal Result type for fallible functions.
pub type Result<T> = std::result::Result<T, AppError>;
