//! Reads one request per call from a connection's byte stream.

use futures::StreamExt;
use tokio::io::AsyncRead;
use tokio_util::codec::FramedRead;
use tracing::debug;

use crate::codec::RequestParser;
use crate::codec::header::HeaderDecoder;
use crate::protocol::{HttpRequest, ParseError};

/// Initial read buffer capacity
const INIT_BUFFER_SIZE: usize = 8 * 1024;

/// Line-oriented request reader over an [`AsyncRead`].
///
/// Not shareable between tasks: each call consumes the stream up to the next
/// blank line.
#[derive(Debug)]
pub struct RequestBuffer<R> {
    framed_read: FramedRead<R, HeaderDecoder>,
}

impl<R> RequestBuffer<R>
where
    R: AsyncRead + Unpin,
{
    pub fn new(reader: R) -> Self {
        Self::with_decoder(reader, HeaderDecoder::new())
    }

    pub fn with_decoder(reader: R, decoder: HeaderDecoder) -> Self {
        Self { framed_read: FramedRead::with_capacity(reader, decoder, INIT_BUFFER_SIZE) }
    }

    /// Reads the next raw header block.
    ///
    /// `Ok(None)` means the peer sent nothing (closed, or started with a blank
    /// line). I/O errors are returned unchanged as [`ParseError::Io`].
    pub async fn read_request(&mut self) -> Result<Option<String>, ParseError> {
        match self.framed_read.next().await {
            Some(Ok(block)) if !block.is_empty() => {
                debug!(request = %block.escape_debug(), "received request");
                Ok(Some(block))
            }
            Some(Ok(_)) | None => Ok(None),
            Some(Err(e)) => Err(e),
        }
    }

    /// Reads and parses the next request.
    pub async fn next_request(&mut self) -> Result<Option<HttpRequest>, ParseError> {
        match self.read_request().await? {
            Some(block) => RequestParser::parse(&block).map(Some),
            None => Ok(None),
        }
    }

    /// The underlying reader. Bytes already buffered are not visible through it.
    pub fn get_mut(&mut self) -> &mut R {
        self.framed_read.get_mut()
    }
}
