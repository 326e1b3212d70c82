use std::path::PathBuf;

use clap::Parser;

use crate::config::ServerConfig;

/// Serves a directory over HTTP/1.0 and HTTP/1.1.
#[derive(Parser, Debug)]
#[command(name = "vanilla-server", version, about, long_about = None)]
pub struct Cli {
    /// TOML config file; defaults apply when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to listen on, overrides `server.host`
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on, overrides `server.port`
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory to serve, overrides `filesystem.basedir`
    #[arg(short, long)]
    pub basedir: Option<PathBuf>,
}

impl Cli {
    /// Command line values win over the config file.
    pub fn apply(&self, config: &mut ServerConfig) {
        if let Some(host) = &self.host {
            config.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(basedir) = &self.basedir {
            config.filesystem.basedir.clone_from(basedir);
        }
    }
}
