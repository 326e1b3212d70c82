//! Connection handling.
//!
//! - [`HttpConnection`]: the per-connection state machine
//!   (`AwaitingRequest -> Processing -> Responding -> AwaitingRequest | Closed`)
//!   with keep-alive and idle-timeout policy
//! - [`ResponseWriter`]: serializes responses, framing bodies by protocol version
//! - [`ConnectionOptions`]: keep-alive timeout, chunk size and header limit
//! - [`IdleTimeout`]: a reader that gives up once the peer goes quiet

mod http_connection;
mod idle_timeout;
mod options;
mod response_writer;

pub use http_connection::HttpConnection;
pub use idle_timeout::IdleTimeout;
pub use options::ConnectionOptions;
pub use response_writer::DEFAULT_CHUNK_SIZE;
pub use response_writer::ResponseWriter;
