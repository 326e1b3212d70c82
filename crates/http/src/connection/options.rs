use std::time::Duration;

use crate::codec::MAX_HEADER_BYTES;
use crate::connection::response_writer::DEFAULT_CHUNK_SIZE;

/// Per-connection protocol settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionOptions {
    /// How long an idle connection waits for its next request.
    pub keep_alive_timeout: Duration,
    /// Payload bytes read per HTTP/1.1 chunk.
    pub chunked_encoding_buffer_size: usize,
    pub max_header_bytes: usize,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            keep_alive_timeout: Duration::from_secs(10),
            chunked_encoding_buffer_size: DEFAULT_CHUNK_SIZE,
            max_header_bytes: MAX_HEADER_BYTES,
        }
    }
}
