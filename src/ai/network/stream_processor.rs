use bytes::{Bytes, BytesMut};

const LINE_DELIMITER: u8 = b'\n';

/// Splits a newline-delimited byte stream into complete lines.
///
/// Network chunks do not line up with JSON objects: one chunk may carry
/// several lines and one line may span several chunks. The processor keeps
/// the unfinished tail in an internal buffer until its delimiter arrives.
/// It is pull-based: the caller feeds chunks as it reads them and drains
/// lines in between, so nothing is read ahead of the consumer.
///
/// # Example
/// ```no_run
/// let mut processor = StreamProcessor::new();
/// while let Some(chunk) = response.chunk().await? {
///     processor.feed(&chunk);
///     while let Some(line) = processor.next_line() {
///         handle_line(line);
///     }
/// }
/// if let Some(line) = processor.finish() {
///     handle_line(line);
/// }
/// ```
#[derive(Debug)]
pub struct StreamProcessor {
    buffer: BytesMut,
}

impl StreamProcessor {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(8192),
        }
    }

    /// Appends a freshly read chunk to the buffer.
    pub fn feed(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Takes the next complete line out of the buffer, without its delimiter.
    /// A trailing `\r` is dropped too.
    pub fn next_line(&mut self) -> Option<Bytes> {
        let pos = memchr::memchr(LINE_DELIMITER, &self.buffer)?;
        let mut line = self.buffer.split_to(pos + 1);
        line.truncate(pos);
        if line.last() == Some(&b'\r') {
            line.truncate(pos - 1);
        }
        Some(line.freeze())
    }

    /// Flushes whatever is left once the stream has ended.
    pub fn finish(&mut self) -> Option<Bytes> {
        if self.buffer.is_empty() {
            return None;
        }

        #[cfg(debug_assertions)]
        log::debug!("buffer remain: {}", String::from_utf8_lossy(&self.buffer));

        let remaining = self.buffer.split().freeze();
        Some(remaining)
    }
}

impl Default for StreamProcessor {
    fn default() -> Self {
        Self::new()
    }
}
