//! Response body framing.
//!
//! - [`ChunkedEncoder`](chunked_encoder::ChunkedEncoder): HTTP/1.1 chunked transfer coding
//! - [`CloseDelimitedEncoder`](close_delimited_encoder::CloseDelimitedEncoder): HTTP/1.0 bodies ended by connection close
//! - [`PayloadEncoder`]: picks one of the above from a [`PayloadFraming`](crate::protocol::PayloadFraming)

mod chunked_encoder;
mod close_delimited_encoder;
mod payload_encoder;

pub use payload_encoder::PayloadEncoder;
