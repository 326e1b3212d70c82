use bytes::{Buf, Bytes};

use crate::protocol::Version;

/// An outgoing message part: the response head or a piece of its payload.
///
/// `T` is the head type, `Data` the payload chunk type.
#[derive(Debug)]
pub enum Message<T, Data: Buf = Bytes> {
    Header(T),
    Payload(PayloadItem<Data>),
}

/// A payload chunk or the end-of-payload marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadItem<Data: Buf = Bytes> {
    Chunk(Data),
    Eof,
}

/// How a response body is delimited on the wire.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PayloadFraming {
    /// HTTP/1.1: hex-length prefixed chunks closed by a zero-length chunk.
    Chunked,
    /// HTTP/1.0: raw bytes followed by CRLF; the connection close ends the body.
    UntilClose,
    /// No payload renderer: the head is the whole response.
    Empty,
}

impl PayloadFraming {
    pub fn for_response(version: Version, has_payload: bool) -> Self {
        match (has_payload, version) {
            (false, _) => Self::Empty,
            (true, Version::Http11) => Self::Chunked,
            (true, Version::Http10) => Self::UntilClose,
        }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        matches!(self, PayloadFraming::Empty)
    }
}
