use std::fmt;
use std::fmt::{Display, Formatter};

/// Status codes the engine and its processors emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Ok,
    NotModified,
    BadRequest,
    Forbidden,
    NotFound,
    RequestTimeout,
    InternalServerError,
}

impl StatusCode {
    pub const fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::NotModified => 304,
            Self::BadRequest => 400,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::RequestTimeout => 408,
            Self::InternalServerError => 500,
        }
    }

    pub const fn reason(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::NotModified => "Not Modified",
            Self::BadRequest => "Bad Request",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not Found",
            Self::RequestTimeout => "Request Timeout",
            Self::InternalServerError => "Internal Server Error",
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            200 => Some(Self::Ok),
            304 => Some(Self::NotModified),
            400 => Some(Self::BadRequest),
            403 => Some(Self::Forbidden),
            404 => Some(Self::NotFound),
            408 => Some(Self::RequestTimeout),
            500 => Some(Self::InternalServerError),
            _ => None,
        }
    }
}

/// Renders the status-line token, e.g. `200 OK`.
impl Display for StatusCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.reason())
    }
}
