//! Protocol representation.
//!
//! Closed enumerations for everything that has a wire token (methods,
//! versions, status codes, media types, header names), the request and
//! response value types, and the error taxonomy.
//!
//! - [`Method`], [`Version`], [`StatusCode`], [`MediaType`], [`HeaderField`]:
//!   each category has its own lookup-by-token and rendering, no shared
//!   hierarchy.
//! - [`HttpRequest`] and its [`HttpHeader`] view.
//! - [`ResponseBuilder`], [`HttpResponse`] and the deferred [`PayloadRenderer`].
//! - [`Message`], [`PayloadItem`], [`PayloadFraming`]: what the response encoder consumes.
//! - [`HttpError`], [`ParseError`], [`SendError`].

mod method;
pub use method::Method;

mod version;
pub use version::CRLF;
pub use version::Version;

mod status;
pub use status::StatusCode;

mod media_type;
pub use media_type::MediaType;

mod header_field;
pub use header_field::HeaderField;
pub use header_field::KEY_VALUE_DELIMITER;

mod header;
pub use header::HttpHeader;

mod request;
pub use request::HttpRequest;

mod response;
pub use response::HttpResponse;
pub use response::PayloadRenderer;
pub use response::PayloadStream;
pub use response::ResponseBuilder;
pub use response::ResponseHead;

mod message;
pub use message::Message;
pub use message::PayloadFraming;
pub use message::PayloadItem;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
