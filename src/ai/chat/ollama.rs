use async_trait::async_trait;
use reqwest::Response;

use crate::ai::error::AiError;
use crate::ai::network::{
    ApiConfig, DefaultApiClient, OllamaChatRequest, StreamChunk, StreamParser, StreamProcessor,
};
use crate::ai::traits::chat::{AiChatTrait, ChatFragment, ChatMessage, FragmentStream};
use crate::constants::{OLLAMA_CHAT_ENDPOINT, OLLAMA_PROVIDER};

/// Ollama chat implementation
#[derive(Clone)]
pub struct OllamaChat {
    config: ApiConfig,
    client: DefaultApiClient,
}

impl OllamaChat {
    /// Creates a new instance of OllamaChat
    ///
    /// # Arguments
    /// * `api_url` - Base URL of the Ollama server, e.g. `http://127.0.0.1:11434`
    pub fn new(api_url: impl Into<String>) -> Result<Self, AiError> {
        Ok(Self {
            config: ApiConfig::new(api_url),
            client: DefaultApiClient::new()?,
        })
    }

    /// Turns the streaming response body into a lazy fragment stream
    ///
    /// The body is only read when the stream is polled. Each stream object
    /// carrying a message becomes one fragment; the object marked `done`
    /// is the last one yielded.
    fn handle_stream_response(mut response: Response) -> FragmentStream {
        let stream = async_stream::stream! {
            let mut processor = StreamProcessor::new();

            loop {
                let chunk = match response.chunk().await {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        log::error!("Failed to read Ollama stream: {}", e);
                        yield Err(AiError::StreamProcessingFailed {
                            provider: OLLAMA_PROVIDER.to_string(),
                            details: e.to_string(),
                        });
                        return;
                    }
                };

                let (lines, body_finished) = match chunk {
                    Some(bytes) => {
                        processor.feed(&bytes);
                        let mut lines = Vec::new();
                        while let Some(line) = processor.next_line() {
                            lines.push(line);
                        }
                        (lines, false)
                    }
                    None => (processor.finish().into_iter().collect::<Vec<_>>(), true),
                };

                for line in lines {
                    match StreamParser::parse_line(&line) {
                        Ok(Some(stream_chunk)) => {
                            let StreamChunk { content, done, usage } = stream_chunk;
                            if let Some(usage) = usage {
                                log::debug!(
                                    "Ollama stream finished, completion tokens: {}, {:.2} tokens/s",
                                    usage.completion_tokens,
                                    usage.tokens_per_second
                                );
                            }
                            if let Some(content) = content {
                                yield Ok(ChatFragment::new(content));
                            }
                            if done {
                                return;
                            }
                        }
                        Ok(None) => {}
                        Err(e) => {
                            yield Err(e);
                            return;
                        }
                    }
                }

                if body_finished {
                    return;
                }
            }
        };

        Box::pin(stream)
    }
}

#[async_trait]
impl AiChatTrait for OllamaChat {
    async fn chat_stream(
        &self,
        model: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<FragmentStream, AiError> {
        let request = OllamaChatRequest {
            model: model.to_string(),
            messages,
            stream: true,
        };

        let response = self
            .client
            .post_request(&self.config, OLLAMA_CHAT_ENDPOINT, &request)
            .await?;

        Ok(Self::handle_stream_response(response))
    }
}
