//! Parsed request representation.

use crate::protocol::{HttpHeader, Method, Version};

/// A parsed request, built once per message and never mutated afterwards.
///
/// Method, request target and version are always present; a block missing
/// any of them fails to parse instead of producing a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    method: Method,
    uri: String,
    version: Version,
    header: HttpHeader,
    body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: Method, uri: impl Into<String>, version: Version, header: HttpHeader, body: Option<String>) -> Self {
        Self { method, uri: uri.into(), version, header, body }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// The raw request target, not yet decoded.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn header(&self) -> &HttpHeader {
        &self.header
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }
}
