//! Serializes the response head: status line, header pairs and the blank
//! line that separates them from the body.

use std::io::Write;

use bytes::{BufMut, BytesMut};
use tokio_util::codec::Encoder;

use crate::protocol::{KEY_VALUE_DELIMITER, ResponseHead, SendError};
use crate::utils::FastWrite;

/// Initial buffer size reserved for a response head
const INIT_HEADER_SIZE: usize = 1024;

/// Encoder for the response head.
///
/// Headers are written exactly in the order they were added to the builder,
/// and nothing is added or rewritten here.
#[derive(Debug)]
pub struct HeaderEncoder;

impl Encoder<ResponseHead> for HeaderEncoder {
    type Error = SendError;

    fn encode(&mut self, head: ResponseHead, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(INIT_HEADER_SIZE);
        write!(FastWrite(dst), "{} {}\r\n", head.version(), head.status())?;

        for (field, value) in head.headers() {
            dst.put_slice(field.as_str().as_bytes());
            dst.put_slice(KEY_VALUE_DELIMITER.as_bytes());
            dst.put_slice(value.as_bytes());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
        Ok(())
    }
}
