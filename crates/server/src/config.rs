//! Server configuration, read from a TOML file.
//!
//! Every key is optional; missing keys keep their defaults.
//!
//! ```toml
//! log_level = "info"
//!
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//! backlog = 50
//! accept_timeout_ms = 1000
//! max_connections = 1024
//!
//! [http]
//! keep_alive_timeout_ms = 10000
//! chunked_encoding_buffer_size = 255
//! max_header_bytes = 8192
//!
//! [filesystem]
//! basedir = "./public"
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use vanilla_http::codec::MAX_HEADER_BYTES;
use vanilla_http::connection::{ConnectionOptions, DEFAULT_CHUNK_SIZE};
use vanilla_http::server::AcceptorOptions;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("can't read config file {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid config file {}: {source}", path.display())]
    Parse { path: PathBuf, source: toml::de::Error },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ServerSection,
    pub http: HttpSection,
    pub filesystem: FilesystemSection,
    /// Tracing filter used when `RUST_LOG` is not set.
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    pub backlog: u32,
    pub accept_timeout_ms: u64,
    /// Unlimited when absent.
    pub max_connections: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    pub keep_alive_timeout_ms: u64,
    pub chunked_encoding_buffer_size: usize,
    pub max_header_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FilesystemSection {
    pub basedir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: ServerSection::default(),
            http: HttpSection::default(),
            filesystem: FilesystemSection::default(),
            log_level: "info".to_owned(),
        }
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        let acceptor = AcceptorOptions::default();
        Self {
            host: acceptor.host,
            port: acceptor.port,
            backlog: acceptor.backlog,
            accept_timeout_ms: millis(acceptor.accept_timeout),
            max_connections: None,
        }
    }
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            keep_alive_timeout_ms: millis(ConnectionOptions::default().keep_alive_timeout),
            chunked_encoding_buffer_size: DEFAULT_CHUNK_SIZE,
            max_header_bytes: MAX_HEADER_BYTES,
        }
    }
}

impl Default for FilesystemSection {
    fn default() -> Self {
        Self { basedir: PathBuf::from(".") }
    }
}

impl ServerConfig {
    /// Reads the config file at `path`, or returns the defaults when there is none.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_owned(), source })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse { path: path.to_owned(), source })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn acceptor_options(&self) -> AcceptorOptions {
        AcceptorOptions {
            host: self.server.host.clone(),
            port: self.server.port,
            backlog: self.server.backlog,
            accept_timeout: Duration::from_millis(self.server.accept_timeout_ms),
        }
    }

    pub fn connection_options(&self) -> ConnectionOptions {
        ConnectionOptions {
            keep_alive_timeout: Duration::from_millis(self.http.keep_alive_timeout_ms),
            chunked_encoding_buffer_size: self.http.chunked_encoding_buffer_size,
            max_header_bytes: self.http.max_header_bytes,
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn empty_file_gives_defaults() {
        let config = ServerConfig::from_toml("").unwrap();

        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.acceptor_options(), AcceptorOptions::default());
        assert_eq!(config.connection_options(), ConnectionOptions::default());
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config = ServerConfig::from_toml(indoc! {r#"
            log_level = "debug"

            [server]
            port = 9090
            max_connections = 16

            [http]
            keep_alive_timeout_ms = 2500

            [filesystem]
            basedir = "/srv/www"
        "#})
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.backlog, 50);
        assert_eq!(config.server.max_connections, Some(16));
        assert_eq!(config.filesystem.basedir, PathBuf::from("/srv/www"));

        let options = config.connection_options();
        assert_eq!(options.keep_alive_timeout, Duration::from_millis(2500));
        assert_eq!(options.chunked_encoding_buffer_size, 255);
        assert_eq!(config.acceptor_options().accept_timeout, Duration::from_secs(1));
    }

    #[test]
    fn invalid_value_is_a_parse_error() {
        assert!(ServerConfig::from_toml("[server]\nport = \"eighty\"\n").is_err());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let result = ServerConfig::load(Some(Path::new("/definitely/not/here/vanilla.toml")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn no_path_gives_defaults() {
        assert_eq!(ServerConfig::load(None).unwrap(), ServerConfig::default());
    }
}
