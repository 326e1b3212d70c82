//! Utility macros and helpers used internally by the protocol engine.

use std::io;
use std::io::Write;

use bytes::{BufMut, BytesMut};

/// Early-returns `Err($error)` when `$predicate` does not hold.
///
/// Works like `assert!`, except it returns an error instead of panicking,
/// which keeps size and shape checks on untrusted input panic free.
///
/// # Example
///
/// ```ignore
/// ensure!(src.len() <= max_header_bytes, ParseError::too_large_header(src.len(), max_header_bytes));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;

/// `io::Write` adapter that appends to a `BytesMut`, so `write!` can format
/// straight into an encoder's destination buffer.
pub(crate) struct FastWrite<'a>(pub(crate) &'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
