use std::fmt;
use std::fmt::{Display, Formatter};

/// Line delimiter used throughout the wire format.
pub const CRLF: &str = "\r\n";

/// Protocol versions the engine can read and frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    Http10,
    Http11,
}

impl Version {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "HTTP/1.0" => Some(Self::Http10),
            "HTTP/1.1" => Some(Self::Http11),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http10 => "HTTP/1.0",
            Self::Http11 => "HTTP/1.1",
        }
    }

    /// HTTP/1.1 connections are persistent unless the client asks to close.
    pub const fn is_persistent(self) -> bool {
        matches!(self, Self::Http11)
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
