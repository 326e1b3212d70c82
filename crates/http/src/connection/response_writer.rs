use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Encoder;

use crate::codec::ResponseEncoder;
use crate::protocol::{HttpResponse, Message, PayloadFraming, PayloadItem, ResponseHead, SendError};

/// Default number of payload bytes read per chunk
pub const DEFAULT_CHUNK_SIZE: usize = 255;

/// Buffered bytes written to the socket once this much is pending
const FLUSH_THRESHOLD: usize = 8 * 1024;

/// Serializes responses onto the connection's write half.
///
/// The head goes out before the payload renderer is invoked, so a failing
/// renderer can only end the connection, never replace the status line.
#[derive(Debug)]
pub struct ResponseWriter<W> {
    writer: W,
    buffer: BytesMut,
    encoder: ResponseEncoder,
    chunk_size: usize,
}

impl<W> ResponseWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(writer: W) -> Self {
        Self::with_chunk_size(writer, DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(writer: W, chunk_size: usize) -> Self {
        Self { writer, buffer: BytesMut::with_capacity(FLUSH_THRESHOLD), encoder: ResponseEncoder::new(), chunk_size: chunk_size.max(1) }
    }

    /// Writes one full response and flushes the socket.
    pub async fn write(&mut self, response: HttpResponse) -> Result<(), SendError> {
        let (head, payload) = response.into_parts();
        let framing = PayloadFraming::for_response(head.version(), payload.is_some());

        self.encode(Message::Header((head, framing)))?;

        if let Some(renderer) = payload {
            self.write_buffer().await?;

            // dropped at the end of this block on every path, closing the source
            let mut stream = renderer().await?;
            let mut chunk = vec![0u8; self.chunk_size];
            loop {
                let read = read_full(&mut stream, &mut chunk).await?;
                if read == 0 {
                    break;
                }
                self.encode(Message::Payload(PayloadItem::Chunk(Bytes::copy_from_slice(&chunk[..read]))))?;
                if self.buffer.len() >= FLUSH_THRESHOLD {
                    self.write_buffer().await?;
                }
            }
            self.encode(Message::Payload(PayloadItem::Eof))?;
        }

        self.flush().await
    }

    /// Shuts the write half down; the peer sees end of stream.
    pub async fn close(&mut self) -> Result<(), SendError> {
        self.buffer.clear();
        Ok(self.writer.shutdown().await?)
    }

    #[inline]
    fn encode(&mut self, item: Message<(ResponseHead, PayloadFraming), Bytes>) -> Result<(), SendError> {
        self.encoder.encode(item, &mut self.buffer)
    }

    async fn write_buffer(&mut self) -> Result<(), SendError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        self.writer.write_all(self.buffer.as_ref()).await?;
        self.buffer.clear();
        Ok(())
    }

    #[inline]
    pub async fn flush(&mut self) -> Result<(), SendError> {
        self.write_buffer().await?;
        Ok(self.writer.flush().await?)
    }
}

/// Fills `buf` unless the stream ends first; returns the number of bytes read.
async fn read_full<S: AsyncRead + Unpin + ?Sized>(stream: &mut S, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let read = stream.read(&mut buf[filled..]).await?;
        if read == 0 {
            break;
        }
        filled += read;
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditional::ETag;
    use crate::protocol::{ResponseBuilder, StatusCode, Version};
    use std::io;
    use std::time::Duration;

    async fn written(response: HttpResponse, chunk_size: usize) -> String {
        let mut out = Vec::new();
        let mut writer = ResponseWriter::with_chunk_size(&mut out, chunk_size);
        writer.write(response).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn chunked_body() {
        let mut builder = ResponseBuilder::new(Version::Http11);
        builder
            .status(StatusCode::Ok)
            .keep_alive_for(Duration::from_secs(10))
            .etag(&ETag::strong("SOMETHING"))
            .payload_bytes("Hello World!");

        assert_eq!(
            written(builder.build().unwrap(), DEFAULT_CHUNK_SIZE).await,
            "HTTP/1.1 200 OK\r\nConnection: keep-alive\r\nKeep-Alive: timeout=10\r\nETag: \"SOMETHING\"\r\nTransfer-Encoding: chunked\r\n\r\nc\r\nHello World!\r\n0\r\n\r\n"
        );
    }

    #[tokio::test]
    async fn no_content() {
        let mut builder = ResponseBuilder::new(Version::Http11);
        builder.status(StatusCode::Ok).keep_alive_for(Duration::from_secs(10));

        assert_eq!(
            written(builder.build().unwrap(), DEFAULT_CHUNK_SIZE).await,
            "HTTP/1.1 200 OK\r\nConnection: keep-alive\r\nKeep-Alive: timeout=10\r\n\r\n"
        );
    }

    #[tokio::test]
    async fn http_10_body_is_not_chunked() {
        let mut builder = ResponseBuilder::new(Version::Http10);
        builder.status(StatusCode::Ok).payload_bytes("Hello World!");

        assert_eq!(written(builder.build().unwrap(), DEFAULT_CHUNK_SIZE).await, "HTTP/1.0 200 OK\r\n\r\nHello World!\r\n");
    }

    #[tokio::test]
    async fn body_is_split_at_chunk_size() {
        let mut builder = ResponseBuilder::new(Version::Http11);
        builder.status(StatusCode::Ok).payload_bytes("Hello World!");

        assert_eq!(
            written(builder.build().unwrap(), 5).await,
            "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nHello\r\n5\r\n Worl\r\n2\r\nd!\r\n0\r\n\r\n"
        );
    }

    #[tokio::test]
    async fn empty_body_is_only_terminator() {
        let mut builder = ResponseBuilder::new(Version::Http11);
        builder.status(StatusCode::Ok).payload_bytes(Bytes::new());

        assert_eq!(
            written(builder.build().unwrap(), DEFAULT_CHUNK_SIZE).await,
            "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n0\r\n\r\n"
        );
    }

    #[tokio::test]
    async fn renderer_failure_after_head() {
        let mut builder = ResponseBuilder::new(Version::Http11);
        builder.status(StatusCode::Ok).payload(|| async { Err::<io::Cursor<Vec<u8>>, _>(io::Error::from(io::ErrorKind::NotFound)) });

        let mut out = Vec::new();
        let mut writer = ResponseWriter::new(&mut out);
        let result = writer.write(builder.build().unwrap()).await;

        assert!(matches!(result, Err(SendError::Io { .. })));
        assert_eq!(out, b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n");
    }

    #[tokio::test]
    async fn head_tokens_parse_back() {
        for (version, status) in [(Version::Http11, StatusCode::NotModified), (Version::Http10, StatusCode::NotFound)] {
            let mut builder = ResponseBuilder::new(version);
            builder.status(status);

            let wire = written(builder.build().unwrap(), DEFAULT_CHUNK_SIZE).await;
            let status_line = wire.split("\r\n").next().unwrap();
            let mut tokens = status_line.split_whitespace();

            assert_eq!(Version::from_token(tokens.next().unwrap()), Some(version));
            assert_eq!(StatusCode::from_code(tokens.next().unwrap().parse().unwrap()), Some(status));
            assert_eq!(tokens.collect::<Vec<_>>().join(" "), status.reason());
        }
    }
}
