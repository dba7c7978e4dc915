use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT},
    Client, Response,
};

use super::types::*;
use crate::ai::error::AiError;
use crate::constants::{APP_NAME, OLLAMA_PROVIDER};

/// HTTP client for the local model service
#[derive(Clone)]
pub struct DefaultApiClient {
    client: Client,
}

impl DefaultApiClient {
    /// Creates a new instance of DefaultApiClient
    ///
    /// The model service runs on the local machine, so system proxies are
    /// bypassed. No timeout is set: a slow model keeps the request open.
    pub fn new() -> Result<Self, AiError> {
        let client = Client::builder()
            .no_proxy()
            .build()
            .map_err(|e| AiError::request(OLLAMA_PROVIDER, e))?;
        Ok(Self { client })
    }

    /// Builds the request headers from the configuration
    ///
    /// # Arguments
    /// * `config` - The API configuration, named in header errors
    ///
    /// # Returns
    /// A Result containing either the HeaderMap or an error
    fn build_headers(&self, config: &ApiConfig) -> Result<HeaderMap, AiError> {
        let mut headers = HeaderMap::new();

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("{}/{}", APP_NAME, env!("CARGO_PKG_VERSION")))
                .map_err(|e| invalid_header(config, e.to_string()))?,
        );

        Ok(headers)
    }

    /// Joins the base URL and the endpoint path
    fn endpoint_url(config: &ApiConfig, endpoint: &str) -> Result<url::Url, AiError> {
        let base = url::Url::parse(&config.api_url).map_err(|e| AiError::InvalidEndpoint {
            url: config.api_url.clone(),
            details: e.to_string(),
        })?;
        let path = format!(
            "{}/{}",
            base.path().trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );
        let mut url = base;
        url.set_path(&path);
        Ok(url)
    }

    /// Sends a POST request and hands back the raw response for streaming
    ///
    /// # Arguments
    /// * `config` - The API configuration
    /// * `endpoint` - The API endpoint to send the request to
    /// * `body` - The request body as JSON
    ///
    /// # Returns
    /// The successful response with its body still unread, or an error when
    /// the request could not be sent or the server answered with a non-2xx
    /// status
    pub async fn post_request(
        &self,
        config: &ApiConfig,
        endpoint: &str,
        body: &impl serde::Serialize,
    ) -> Result<Response, AiError> {
        let headers = self.build_headers(config)?;
        let url = Self::endpoint_url(config, endpoint)?;

        #[cfg(debug_assertions)]
        log::debug!("Request URL: {}", url);

        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| AiError::request(OLLAMA_PROVIDER, e))?;

        if !response.status().is_success() {
            return Err(self.process_error_response(response).await);
        }

        Ok(response)
    }

    /// Turns a non-2xx response into an error, preferring the server's own
    /// `{"error": "..."}` message
    async fn process_error_response(&self, response: Response) -> AiError {
        let status_code = response.status().as_u16();
        let error_text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                return AiError::StreamProcessingFailed {
                    provider: OLLAMA_PROVIDER.to_string(),
                    details: e.to_string(),
                }
            }
        };

        match serde_json::from_str::<OllamaErrorResponse>(&error_text) {
            Ok(body) => {
                log::warn!(
                    "Error response - Status: {}, Message: {}",
                    status_code,
                    body.error
                );
                AiError::UpstreamChatError {
                    message: body.error,
                }
            }
            Err(_) => {
                log::warn!(
                    "Error response - Status: {}, Body: {}",
                    status_code,
                    error_text
                );
                AiError::RequestFailedWithStatus {
                    provider: OLLAMA_PROVIDER.to_string(),
                    status: status_code,
                    message: error_text,
                }
            }
        }
    }
}

fn invalid_header(config: &ApiConfig, details: String) -> AiError {
    AiError::InvalidEndpoint {
        url: config.api_url.clone(),
        details,
    }
}
