//! Splits the inbound byte stream into raw header blocks.
//!
//! A header block is every line up to the first blank line. Lines may end in
//! `\n` or `\r\n`; the decoder re-joins them with a canonical `\r\n` so the
//! parser sees one delimiter only. Bytes after the blank line stay in the
//! buffer for the next call.
//!
//! # Limits
//!
//! - Maximum header block size: 8KB by default, see [`HeaderDecoder::with_limit`]

use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::protocol::{CRLF, ParseError};

/// Maximum size in bytes allowed for the entire header section
pub const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Decoder producing one canonical header block per request.
///
/// An empty block (the stream started with a blank line) is returned as an
/// empty string; callers treat it as "no request".
#[derive(Debug)]
pub struct HeaderDecoder {
    max_header_bytes: usize,
    /// Start of the first line not yet checked for blankness.
    scanned: usize,
}

impl HeaderDecoder {
    pub fn new() -> Self {
        Self::with_limit(MAX_HEADER_BYTES)
    }

    pub fn with_limit(max_header_bytes: usize) -> Self {
        Self { max_header_bytes, scanned: 0 }
    }
}

impl Default for HeaderDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for HeaderDecoder {
    type Item = String;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        while let Some(offset) = src[self.scanned..].iter().position(|b| *b == b'\n') {
            let line_end = self.scanned + offset;

            if is_blank(&src[self.scanned..line_end]) {
                let header_size = self.scanned;
                let block = src.split_to(line_end + 1);
                self.scanned = 0;
                trace!(header_size, "read header block");
                return Ok(Some(canonical_lines(&block[..header_size])));
            }

            self.scanned = line_end + 1;
            ensure!(self.scanned <= self.max_header_bytes, ParseError::too_large_header(self.scanned, self.max_header_bytes));
        }

        ensure!(src.len() <= self.max_header_bytes, ParseError::too_large_header(src.len(), self.max_header_bytes));
        Ok(None)
    }

    /// At end of stream a partial block is still handed over; an unterminated
    /// blank last line ends it like a terminated one would.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(block) = self.decode(src)? {
            return Ok(Some(block));
        }

        if src.is_empty() {
            return Ok(None);
        }

        let block = src.split();
        let header_size = if is_blank(&block[self.scanned..]) { self.scanned } else { block.len() };
        self.scanned = 0;
        Ok(Some(canonical_lines(&block[..header_size])))
    }
}

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(u8::is_ascii_whitespace)
}

fn canonical_lines(block: &[u8]) -> String {
    let mut lines = String::with_capacity(block.len() + CRLF.len());
    for line in block.split_inclusive(|b| *b == b'\n') {
        let line = line.strip_suffix(b"\n").unwrap_or(line);
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        lines.push_str(&String::from_utf8_lossy(line));
        lines.push_str(CRLF);
    }
    lines
}
