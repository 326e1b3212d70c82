//! A static file server on top of the `vanilla-http` protocol engine.
//!
//! - [`FilesystemContentService`]: resolves request targets below a base
//!   directory, with index files and generated directory listings
//! - [`FilesystemProcessor`]: the [`RequestProcessor`](vanilla_http::handler::RequestProcessor)
//!   that turns lookups into responses, honoring conditional requests
//! - [`ServerConfig`] and [`Cli`]: TOML configuration with command line overrides

mod cli;
mod config;
mod filesystem;
mod listing;
mod processor;

pub use cli::Cli;
pub use config::{ConfigError, FilesystemSection, HttpSection, ServerConfig, ServerSection};
pub use filesystem::{ContentResponse, FilesystemContentService, SearchResult};
pub use listing::DirectoryHtmlPage;
pub use processor::FilesystemProcessor;
