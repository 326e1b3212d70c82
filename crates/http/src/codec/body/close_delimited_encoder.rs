use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::Encoder;

use crate::protocol::{PayloadItem, SendError};

/// HTTP/1.0 body framing: bytes verbatim, a trailing CRLF, then the
/// connection close marks the end of the body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloseDelimitedEncoder {
    eof: bool,
}

impl CloseDelimitedEncoder {
    pub fn new() -> Self {
        Self { eof: false }
    }

    pub fn is_finish(&self) -> bool {
        self.eof
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for CloseDelimitedEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if self.eof {
            return Ok(());
        }

        match item {
            PayloadItem::Chunk(bytes) => {
                dst.put(bytes);
                Ok(())
            }
            PayloadItem::Eof => {
                self.eof = true;
                dst.extend_from_slice(b"\r\n");
                Ok(())
            }
        }
    }
}
