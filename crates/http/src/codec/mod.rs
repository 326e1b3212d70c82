//! Wire codecs for requests and responses.
//!
//! - Request side:
//!   - [`RequestBuffer`]: reads one header block per request off the stream
//!     (via [`HeaderDecoder`]) and hands it to the parser
//!   - [`RequestParser`]: turns a header block into an [`HttpRequest`](crate::protocol::HttpRequest)
//!
//! - Response side:
//!   - [`ResponseEncoder`]: status line and headers via the header encoder,
//!     then the body framed by protocol version
//!
//! # Example
//!
//! ```
//! use vanilla_http::codec::RequestParser;
//! use vanilla_http::protocol::{Method, Version};
//!
//! let request = RequestParser::parse("GET /index.html HTTP/1.1\r\nHost: localhost\r\n").unwrap();
//! assert_eq!(request.method(), Method::Get);
//! assert_eq!(request.version(), Version::Http11);
//! ```

mod body;
mod header;
mod request_buffer;
mod request_parser;
mod response_encoder;

pub use header::HeaderDecoder;
pub use header::MAX_HEADER_BYTES;
pub use request_buffer::RequestBuffer;
pub use request_parser::RequestParser;
pub use response_encoder::ResponseEncoder;
