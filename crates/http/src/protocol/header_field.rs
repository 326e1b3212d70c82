use std::fmt;
use std::fmt::{Display, Formatter};

/// Separator between a header name and its value.
pub const KEY_VALUE_DELIMITER: &str = ": ";

/// Header fields the engine reads or writes by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderField {
    Connection,
    /// Emitted as the bare `ContentType` token; existing clients of this server match on it.
    ContentType,
    TransferEncoding,
    KeepAlive,
    LastModified,
    ETag,
    IfMatch,
    IfNoneMatch,
    IfModifiedSince,
}

impl HeaderField {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connection => "Connection",
            Self::ContentType => "ContentType",
            Self::TransferEncoding => "Transfer-Encoding",
            Self::KeepAlive => "Keep-Alive",
            Self::LastModified => "Last-Modified",
            Self::ETag => "ETag",
            Self::IfMatch => "If-Match",
            Self::IfNoneMatch => "If-None-Match",
            Self::IfModifiedSince => "If-Modified-Since",
        }
    }
}

impl Display for HeaderField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
