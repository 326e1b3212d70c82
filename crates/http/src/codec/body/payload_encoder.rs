use bytes::{Buf, BytesMut};
use tokio_util::codec::Encoder;

use crate::codec::body::chunked_encoder::ChunkedEncoder;
use crate::codec::body::close_delimited_encoder::CloseDelimitedEncoder;
use crate::protocol::{PayloadFraming, PayloadItem, SendError};

/// Encodes a response body with the framing chosen for its protocol version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadEncoder {
    kind: Kind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    /// transfer-encoding chunked payload
    Chunked(ChunkedEncoder),

    /// payload terminated by closing the connection
    UntilClose(CloseDelimitedEncoder),

    /// the response has no body
    NoBody,
}

impl PayloadEncoder {
    pub fn empty() -> Self {
        Self { kind: Kind::NoBody }
    }

    pub fn chunked() -> Self {
        Self { kind: Kind::Chunked(ChunkedEncoder::new()) }
    }

    pub fn until_close() -> Self {
        Self { kind: Kind::UntilClose(CloseDelimitedEncoder::new()) }
    }

    pub fn is_finish(&self) -> bool {
        match &self.kind {
            Kind::Chunked(encoder) => encoder.is_finish(),
            Kind::UntilClose(encoder) => encoder.is_finish(),
            Kind::NoBody => true,
        }
    }
}

impl From<PayloadFraming> for PayloadEncoder {
    fn from(framing: PayloadFraming) -> Self {
        match framing {
            PayloadFraming::Chunked => Self::chunked(),
            PayloadFraming::UntilClose => Self::until_close(),
            PayloadFraming::Empty => Self::empty(),
        }
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for PayloadEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match &mut self.kind {
            Kind::Chunked(encoder) => encoder.encode(item, dst),
            Kind::UntilClose(encoder) => encoder.encode(item, dst),
            Kind::NoBody => Ok(()),
        }
    }
}
