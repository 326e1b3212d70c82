use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: ParseError,
    },

    #[error("response error: {source}")]
    ResponseError {
        #[from]
        source: SendError,
    },
}

/// Reasons a raw header block can be rejected.
///
/// Every variant except [`ParseError::Io`] is answered with `400 Bad Request`.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("empty status line")]
    EmptyStatusLine,

    #[error("http method expected")]
    MethodExpected,

    #[error("unsupported http method: {token}")]
    UnsupportedMethod { token: String },

    #[error("request uri expected")]
    UriExpected,

    #[error("http protocol expected")]
    ProtocolExpected,

    #[error("unsupported http protocol: {token}")]
    UnsupportedProtocol { token: String },

    #[error("unexpected token after http protocol: {token}")]
    UnexpectedStatusLineToken { token: String },

    #[error("invalid http header field: {line}")]
    InvalidHeaderField { line: String },

    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn unsupported_method<S: ToString>(token: S) -> Self {
        Self::UnsupportedMethod { token: token.to_string() }
    }

    pub fn unsupported_protocol<S: ToString>(token: S) -> Self {
        Self::UnsupportedProtocol { token: token.to_string() }
    }

    pub fn unexpected_status_line_token<S: ToString>(token: S) -> Self {
        Self::UnexpectedStatusLineToken { token: token.to_string() }
    }

    pub fn invalid_header_field<S: ToString>(line: S) -> Self {
        Self::InvalidHeaderField { line: line.to_string() }
    }

    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("response has no status code")]
    MissingStatus,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}
