use rust_i18n::t;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AiError {
    #[error("{}", t!("ai.error.api_request_failed", provider = .provider, details = .details))]
    ApiRequestFailed { provider: String, details: String },

    #[error("{}", t!("ai.error.request_failed_with_status", provider = .provider, status = .status, message = .message))]
    RequestFailedWithStatus {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("{}", t!("ai.error.response_parse_failed", provider = .provider, details = .details))]
    ResponseParseFailed { provider: String, details: String },

    #[error("{}", t!("ai.error.stream_processing_failed", provider = .provider, details = .details))]
    StreamProcessingFailed { provider: String, details: String },

    #[error("{}", t!("ai.error.upstream_chat_error", message = .message))]
    UpstreamChatError { message: String },

    #[error("{}", t!("ai.error.invalid_endpoint", url = .url, details = .details))]
    InvalidEndpoint { url: String, details: String },
}

impl AiError {
    /// Wraps a transport error raised while sending the request.
    pub fn request(provider: &str, err: reqwest::Error) -> Self {
        let details = if err.is_timeout() {
            t!("network.request_timeout").to_string()
        } else if err.is_connect() {
            t!("network.connection_failed", error = err.to_string()).to_string()
        } else if err.is_builder() {
            t!("network.client_build_error", error = err.to_string()).to_string()
        } else {
            err.to_string()
        };
        AiError::ApiRequestFailed {
            provider: provider.to_string(),
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_error_displays_server_message() {
        let err = AiError::UpstreamChatError {
            message: "model \"missing\" not found, try pulling it first".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "model \"missing\" not found, try pulling it first"
        );
    }

    #[test]
    fn test_status_error_mentions_status_and_body() {
        let err = AiError::RequestFailedWithStatus {
            provider: "ollama".to_string(),
            status: 502,
            message: "bad gateway".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("502"));
        assert!(text.contains("bad gateway"));
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let err = AiError::StreamProcessingFailed {
            provider: "ollama".to_string(),
            details: "reset".to_string(),
        };
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["kind"], "streamProcessingFailed");
        assert_eq!(value["details"], "reset");
    }
}
