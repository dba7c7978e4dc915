mod client;
mod stream;
mod stream_processor;
mod types;

pub use client::DefaultApiClient;
pub use stream::{StreamChunk, StreamParser, TokenUsage};
pub use stream_processor::StreamProcessor;
pub use types::*;
