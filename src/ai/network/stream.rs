use crate::ai::error::AiError;
use crate::constants::OLLAMA_PROVIDER;

use super::OllamaStreamResponse;

/// Token usage information, reported on the final object of a stream
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TokenUsage {
    pub completion_tokens: u64,
    /// The speed of token generation in tokens per second (tokens/s)
    pub tokens_per_second: f64,
}

/// Stream chunk parsing result
#[derive(Debug, Clone, PartialEq)]
pub struct StreamChunk {
    /// The content of the chunk, `None` when the object carried no message
    pub content: Option<String>,
    /// Whether the server marked this object as the last one
    pub done: bool,
    /// Token usage information
    pub usage: Option<TokenUsage>,
}

/// Stream response parser for Ollama's newline-delimited JSON
///
/// One line: `{"model":"m","message":{"role":"assistant","content":"Hel"},"done":false}`
pub struct StreamParser;

impl StreamParser {
    /// Parses one line of the stream.
    ///
    /// # Returns
    /// - `Ok(None)` for blank lines
    /// - `Ok(Some(chunk))` for a regular stream object
    /// - `Err` when the server reported an error inline or the line is not
    ///   valid JSON
    pub fn parse_line(line: &[u8]) -> Result<Option<StreamChunk>, AiError> {
        // from_utf8_lossy keeps going on invalid UTF-8 sequences, they are
        // replaced with U+FFFD instead of failing the whole stream
        let line_str = String::from_utf8_lossy(line);
        let data = line_str.trim();
        if data.is_empty() {
            return Ok(None);
        }

        let response = serde_json::from_str::<OllamaStreamResponse>(data).map_err(|e| {
            log::error!("Failed to parse Ollama response: {}, error:{}", data, e);
            AiError::ResponseParseFailed {
                provider: OLLAMA_PROVIDER.to_string(),
                details: e.to_string(),
            }
        })?;

        if let Some(message) = response.error {
            return Err(AiError::UpstreamChatError { message });
        }

        // Every object before the last one must carry a message
        if response.message.is_none() && !response.done {
            log::error!("Ollama stream object without message: {}", data);
            return Err(AiError::ResponseParseFailed {
                provider: OLLAMA_PROVIDER.to_string(),
                details: "stream object carries no message".to_string(),
            });
        }

        let usage = if response.done {
            response.eval_count.map(|count| TokenUsage {
                completion_tokens: count,
                tokens_per_second: match response.eval_duration {
                    // eval_duration is reported in nanoseconds
                    Some(duration) if duration > 0 => count as f64 / duration as f64 * 1e9,
                    _ => 0.0,
                },
            })
        } else {
            None
        };

        Ok(Some(StreamChunk {
            content: response.message.map(|message| message.content),
            done: response.done,
            usage,
        }))
    }
}
