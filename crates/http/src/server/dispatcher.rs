use std::fmt;
use std::fmt::{Debug, Formatter};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tracing::{Instrument, debug, info_span};

use crate::connection::{ConnectionOptions, HttpConnection};
use crate::handler::RequestProcessor;

/// Hands an accepted socket to whatever serves it.
///
/// `dispatch` must return without waiting for the connection to finish.
pub trait ConnectionDispatcher: Send + Sync + 'static {
    fn dispatch(&self, stream: TcpStream, peer: SocketAddr);
}

/// Spawns one task per accepted connection.
///
/// Tasks are detached: stopping the acceptor does not cancel them. An optional
/// connection limit makes new tasks wait for a free slot before reading.
pub struct TaskPerConnectionDispatcher<P> {
    processor: Arc<P>,
    options: ConnectionOptions,
    next_id: AtomicU64,
    limit: Option<Arc<Semaphore>>,
}

impl<P> TaskPerConnectionDispatcher<P>
where
    P: RequestProcessor + 'static,
{
    pub fn new(processor: Arc<P>, options: ConnectionOptions) -> Self {
        Self { processor, options, next_id: AtomicU64::new(0), limit: None }
    }

    /// Caps the number of connections served at once.
    ///
    /// Sockets accepted beyond the cap stay open and are served once an
    /// earlier connection ends; `dispatch` still returns immediately.
    #[must_use]
    pub fn with_connection_limit(mut self, max_connections: usize) -> Self {
        self.limit = Some(Arc::new(Semaphore::new(max_connections.max(1))));
        self
    }
}

impl<P> ConnectionDispatcher for TaskPerConnectionDispatcher<P>
where
    P: RequestProcessor + 'static,
{
    fn dispatch(&self, stream: TcpStream, peer: SocketAddr) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let processor = Arc::clone(&self.processor);
        let options = self.options.clone();
        let limit = self.limit.as_ref().map(Arc::clone);

        let span = info_span!("connection", id, %peer);
        tokio::spawn(
            async move {
                let _permit = match limit {
                    Some(semaphore) => match semaphore.acquire_owned().await {
                        Ok(permit) => Some(permit),
                        Err(e) => {
                            debug!(cause = %e, "connection limit closed, dropping connection");
                            return;
                        }
                    },
                    None => None,
                };

                let (reader, writer) = stream.into_split();
                match HttpConnection::new(reader, writer, options).process(processor.as_ref()).await {
                    Ok(()) => debug!("finished process, connection shutdown"),
                    Err(e) => debug!(cause = %e, "connection dropped"),
                }
            }
            .instrument(span),
        );
    }
}

impl<P> Debug for TaskPerConnectionDispatcher<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskPerConnectionDispatcher")
            .field("options", &self.options)
            .field("next_id", &self.next_id)
            .field("limit", &self.limit.as_ref().map(|semaphore| semaphore.available_permits()))
            .finish_non_exhaustive()
    }
}
