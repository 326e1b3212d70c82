use std::io::Write;

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::Encoder;

use crate::protocol::{PayloadItem, SendError};
use crate::utils::FastWrite;

/// Chunked transfer coding for HTTP/1.1 bodies.
///
/// Each non-empty chunk is written as `<hex-length>\r\n<bytes>\r\n`; the end
/// of the body is the zero-length chunk `0\r\n\r\n`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkedEncoder {
    eof: bool,
}

impl ChunkedEncoder {
    pub fn new() -> Self {
        Self { eof: false }
    }

    pub fn is_finish(&self) -> bool {
        self.eof
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for ChunkedEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if self.eof {
            return Ok(());
        }

        match item {
            PayloadItem::Chunk(bytes) => {
                // an empty chunk would read as the terminator
                if !bytes.has_remaining() {
                    return Ok(());
                }
                write!(FastWrite(dst), "{:x}\r\n", bytes.remaining())?;
                dst.reserve(bytes.remaining() + 2);
                dst.put(bytes);
                dst.extend_from_slice(b"\r\n");
                Ok(())
            }
            PayloadItem::Eof => {
                self.eof = true;
                dst.extend_from_slice(b"0\r\n\r\n");
                Ok(())
            }
        }
    }
}
