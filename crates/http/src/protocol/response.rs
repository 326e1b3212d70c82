//! Response construction.
//!
//! A [`ResponseBuilder`] is bound to one protocol version when it is created.
//! Processors fill in the status, headers and an optional payload renderer;
//! the connection then finalizes it into an immutable [`HttpResponse`].
//!
//! The payload renderer is deferred I/O: it is invoked at most once, by the
//! response writer, after the head has been written. Building a response never
//! opens the payload source.

use std::fmt;
use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::io;
use std::io::Cursor;
use std::time::{Duration, SystemTime};

use bytes::Bytes;
use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::io::AsyncRead;

use crate::conditional::ETag;
use crate::protocol::{HeaderField, MediaType, SendError, StatusCode, Version};

/// Byte stream produced by a payload renderer.
pub type PayloadStream = Box<dyn AsyncRead + Send + Unpin>;

/// Opens the payload source. Called once, at write time.
pub type PayloadRenderer = Box<dyn FnOnce() -> BoxFuture<'static, io::Result<PayloadStream>> + Send>;

/// Status line and headers of a response, in wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    version: Version,
    status: StatusCode,
    headers: Vec<(HeaderField, String)>,
}

impl ResponseHead {
    pub fn version(&self) -> Version {
        self.version
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &[(HeaderField, String)] {
        &self.headers
    }
}

pub struct HttpResponse {
    head: ResponseHead,
    payload: Option<PayloadRenderer>,
}

impl HttpResponse {
    /// A bodiless response with no headers, used for protocol-level errors.
    pub(crate) fn from_status(version: Version, status: StatusCode) -> Self {
        Self { head: ResponseHead { version, status, headers: Vec::new() }, payload: None }
    }

    pub fn version(&self) -> Version {
        self.head.version
    }

    pub fn status(&self) -> StatusCode {
        self.head.status
    }

    pub fn headers(&self) -> &[(HeaderField, String)] {
        &self.head.headers
    }

    /// First value added for `field`, if any.
    pub fn header_value(&self, field: HeaderField) -> Option<&str> {
        self.head.headers.iter().find(|(name, _)| *name == field).map(|(_, value)| value.as_str())
    }

    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }

    pub fn into_parts(self) -> (ResponseHead, Option<PayloadRenderer>) {
        (self.head, self.payload)
    }
}

impl Debug for HttpResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse").field("head", &self.head).field("payload", &self.payload.is_some()).finish()
    }
}

pub struct ResponseBuilder {
    version: Version,
    status: Option<StatusCode>,
    headers: Vec<(HeaderField, String)>,
    payload: Option<PayloadRenderer>,
}

impl ResponseBuilder {
    pub fn new(version: Version) -> Self {
        Self { version, status: None, headers: Vec::new(), payload: None }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn status(&mut self, status: StatusCode) -> &mut Self {
        self.status = Some(status);
        self
    }

    /// Appends a header pair. Headers are written in the order they were added.
    pub fn add(&mut self, field: HeaderField, value: impl Into<String>) -> &mut Self {
        self.headers.push((field, value.into()));
        self
    }

    pub fn content_type(&mut self, media_type: MediaType) -> &mut Self {
        self.add(HeaderField::ContentType, media_type.as_str())
    }

    pub fn etag(&mut self, etag: &ETag) -> &mut Self {
        self.add(HeaderField::ETag, etag.to_string())
    }

    /// Adds `Last-Modified` in RFC 1123 format.
    pub fn last_modified(&mut self, last_modified: SystemTime) -> &mut Self {
        self.add(HeaderField::LastModified, httpdate::fmt_http_date(last_modified))
    }

    /// Adds `Connection: keep-alive` and `Keep-Alive: timeout=<secs>`.
    ///
    /// The header carries whole seconds, rounded up and never below one, so a
    /// sub-second timeout is not advertised as already expired.
    pub fn keep_alive_for(&mut self, timeout: Duration) -> &mut Self {
        let secs = timeout.as_secs().saturating_add(u64::from(timeout.subsec_nanos() > 0)).max(1);
        self.add(HeaderField::Connection, "keep-alive").add(HeaderField::KeepAlive, format!("timeout={secs}"))
    }

    /// Attaches a payload renderer.
    ///
    /// On HTTP/1.1 this also adds `Transfer-Encoding: chunked`, the only body
    /// framing the writer supports for persistent connections.
    pub fn payload<F, Fut, S>(&mut self, renderer: F) -> &mut Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = io::Result<S>> + Send + 'static,
        S: AsyncRead + Send + Unpin + 'static,
    {
        if self.payload.is_none() && self.version == Version::Http11 {
            self.add(HeaderField::TransferEncoding, "chunked");
        }

        let boxed: PayloadRenderer = Box::new(move || {
            async move {
                let stream = renderer().await?;
                Ok(Box::new(stream) as PayloadStream)
            }
            .boxed()
        });
        self.payload = Some(boxed);
        self
    }

    /// Attaches an in-memory payload.
    pub fn payload_bytes(&mut self, bytes: impl Into<Bytes>) -> &mut Self {
        let bytes = bytes.into();
        self.payload(move || async move { Ok(Cursor::new(bytes)) })
    }

    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }

    pub fn build(self) -> Result<HttpResponse, SendError> {
        let status = self.status.ok_or(SendError::MissingStatus)?;
        Ok(HttpResponse { head: ResponseHead { version: self.version, status, headers: self.headers }, payload: self.payload })
    }
}

impl Debug for ResponseBuilder {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseBuilder")
            .field("version", &self.version)
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("payload", &self.payload.is_some())
            .finish()
    }
}
