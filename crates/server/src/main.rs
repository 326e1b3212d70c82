use std::error::Error;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use vanilla_http::server::{ConnectionAcceptor, TaskPerConnectionDispatcher};
use vanilla_server::{Cli, FilesystemContentService, FilesystemProcessor, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();
    let mut config = ServerConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let processor = FilesystemProcessor::new(FilesystemContentService::new(&config.filesystem.basedir));
    let mut dispatcher = TaskPerConnectionDispatcher::new(Arc::new(processor), config.connection_options());
    if let Some(max_connections) = config.server.max_connections {
        dispatcher = dispatcher.with_connection_limit(max_connections);
    }

    let mut acceptor = ConnectionAcceptor::new(config.acceptor_options(), Arc::new(dispatcher));
    let local_addr = match acceptor.start().await {
        Ok(local_addr) => local_addr,
        Err(e) => {
            error!(cause = %e, host = %config.server.host, port = config.server.port, "bind server error");
            return Err(e.into());
        }
    };
    info!(%local_addr, basedir = %config.filesystem.basedir.display(), "vanilla server started");

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(cause = %e, "can't listen for shutdown signal");
    }

    acceptor.shutdown().await;
    Ok(())
}
