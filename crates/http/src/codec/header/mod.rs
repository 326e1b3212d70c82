//! Header section processing.
//!
//! - [`HeaderDecoder`]: cuts the inbound stream into header blocks, enforcing the size limit
//! - [`HeaderEncoder`]: writes the response status line and header pairs

mod header_decoder;
mod header_encoder;

pub use header_decoder::HeaderDecoder;
pub use header_decoder::MAX_HEADER_BYTES;
pub use header_encoder::HeaderEncoder;
