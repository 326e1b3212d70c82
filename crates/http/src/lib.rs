//! A from-scratch HTTP/1.0 and HTTP/1.1 protocol engine
//!
//! This crate implements the protocol mechanics of a small static-content web
//! server on top of tokio: reading and parsing requests, building and framing
//! responses, RFC 7232 conditional evaluation, persistent connections with an
//! idle timeout, and the accept loop. What a request *means* is left to an
//! injected [`handler::RequestProcessor`].
//!
//! # Features
//!
//! - `GET` and `HEAD` over HTTP/1.0 and HTTP/1.1
//! - Keep-alive connections with `408 Request Timeout` on idle HTTP/1.1 connections
//! - Chunked transfer encoding for HTTP/1.1 bodies, close-delimited bodies for HTTP/1.0
//! - Strong and weak entity tags with `If-Match`, `If-None-Match` and `If-Modified-Since`
//! - Lazy payloads: the body source is opened only after the head is written
//! - One task per connection, with an optional connection cap
//!
//! # Example
//!
//! ```no_run
//! use std::convert::Infallible;
//! use std::sync::Arc;
//! use vanilla_http::connection::ConnectionOptions;
//! use vanilla_http::handler::make_processor;
//! use vanilla_http::protocol::{HttpRequest, Method, MediaType, ResponseBuilder, StatusCode};
//! use vanilla_http::server::{AcceptorOptions, ConnectionAcceptor, TaskPerConnectionDispatcher};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let processor = make_processor(|request: &HttpRequest, response: &mut ResponseBuilder| {
//!         response.status(StatusCode::Ok).content_type(MediaType::Text);
//!         if request.method() == Method::Get {
//!             response.payload_bytes("Hello World!\r\n");
//!         }
//!         Ok::<(), Infallible>(())
//!     });
//!
//!     let dispatcher = TaskPerConnectionDispatcher::new(Arc::new(processor), ConnectionOptions::default());
//!     let mut acceptor = ConnectionAcceptor::new(AcceptorOptions::default(), Arc::new(dispatcher));
//!
//!     acceptor.start().await?;
//!     tokio::signal::ctrl_c().await?;
//!     acceptor.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`protocol`]: methods, versions, statuses, headers, requests and the response builder
//! - [`codec`]: request buffering and parsing, response encoding
//! - [`conditional`]: entity tags and the conditional request evaluator
//! - [`connection`]: the per-connection state machine and the response writer
//! - [`handler`]: the request processor seam
//! - [`server`]: the dispatcher and the acceptor
//!
//! # Error Handling
//!
//! - [`protocol::ParseError`]: why a request could not be read; answered with `400`
//! - [`protocol::SendError`]: why a response could not be written
//! - [`protocol::HttpError`]: either of the above, returned by a connection
//!   only when the transport itself failed
//!
//! # Limitations
//!
//! - No request bodies, no pipelining, no TLS
//! - Maximum header block size: 8KB by default

pub mod codec;
pub mod conditional;
pub mod connection;
pub mod handler;
pub mod protocol;
pub mod server;

mod utils;
pub(crate) use utils::ensure;
