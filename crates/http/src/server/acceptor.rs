use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use tokio::net::{TcpListener, TcpSocket, lookup_host};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::server::ConnectionDispatcher;

/// Where and how the acceptor listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptorOptions {
    pub host: String,
    pub port: u16,
    pub backlog: u32,
    /// Longest time the accept loop blocks before it rechecks its state.
    pub accept_timeout: Duration,
}

impl Default for AcceptorOptions {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_owned(), port: 8080, backlog: 50, accept_timeout: Duration::from_secs(1) }
    }
}

/// Lifecycle of a [`ConnectionAcceptor`]. Transitions only move forward.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum AcceptorState {
    NotStarted = 0,
    Running = 1,
    Stopping = 2,
    Stopped = 3,
}

impl AcceptorState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::NotStarted,
            1 => Self::Running,
            2 => Self::Stopping,
            _ => Self::Stopped,
        }
    }

    fn load(state: &AtomicU8) -> Self {
        Self::from_u8(state.load(Ordering::Acquire))
    }

    /// Compare-and-set; on failure returns the state actually found.
    fn transition(state: &AtomicU8, from: Self, to: Self) -> Result<(), Self> {
        match state.compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire) {
            Ok(_) => Ok(()),
            Err(actual) => Err(Self::from_u8(actual)),
        }
    }
}

/// Owns the listening socket and the accept loop.
///
/// ```no_run
/// use std::sync::Arc;
/// use vanilla_http::connection::ConnectionOptions;
/// use vanilla_http::handler::make_processor;
/// use vanilla_http::protocol::{HttpRequest, ResponseBuilder, StatusCode};
/// use vanilla_http::server::{AcceptorOptions, ConnectionAcceptor, TaskPerConnectionDispatcher};
///
/// # async fn run() -> std::io::Result<()> {
/// let processor = make_processor(|_request: &HttpRequest, response: &mut ResponseBuilder| {
///     response.status(StatusCode::Ok).payload_bytes("Hello World!");
///     Ok::<(), std::convert::Infallible>(())
/// });
/// let dispatcher = TaskPerConnectionDispatcher::new(Arc::new(processor), ConnectionOptions::default());
///
/// let mut acceptor = ConnectionAcceptor::new(AcceptorOptions::default(), Arc::new(dispatcher));
/// acceptor.start().await?;
/// tokio::signal::ctrl_c().await?;
/// acceptor.shutdown().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConnectionAcceptor<D> {
    options: AcceptorOptions,
    dispatcher: Arc<D>,
    state: Arc<AtomicU8>,
    local_addr: Option<SocketAddr>,
    accept_loop: Option<JoinHandle<()>>,
}

impl<D> ConnectionAcceptor<D>
where
    D: ConnectionDispatcher,
{
    pub fn new(options: AcceptorOptions, dispatcher: Arc<D>) -> Self {
        Self {
            options,
            dispatcher,
            state: Arc::new(AtomicU8::new(AcceptorState::NotStarted as u8)),
            local_addr: None,
            accept_loop: None,
        }
    }

    /// Binds the listening socket and spawns the accept loop.
    ///
    /// Returns the bound address, which differs from the configured one when
    /// port `0` was requested. Fails without changing state if binding fails,
    /// and with [`io::ErrorKind::AlreadyExists`] if the acceptor has already
    /// left [`AcceptorState::NotStarted`].
    pub async fn start(&mut self) -> io::Result<SocketAddr> {
        let current = self.state();
        if current != AcceptorState::NotStarted {
            return Err(already_started(current));
        }

        let listener = bind(&self.options).await?;
        let local_addr = listener.local_addr()?;

        AcceptorState::transition(&self.state, AcceptorState::NotStarted, AcceptorState::Running).map_err(already_started)?;

        info!(%local_addr, backlog = self.options.backlog, "start listening");
        self.local_addr = Some(local_addr);
        self.accept_loop = Some(tokio::spawn(accept_loop(
            listener,
            Arc::clone(&self.dispatcher),
            Arc::clone(&self.state),
            self.options.accept_timeout,
        )));
        Ok(local_addr)
    }

    /// Stops accepting. Connections already dispatched keep running.
    ///
    /// Only the first call on a running acceptor has any effect.
    pub async fn shutdown(&mut self) {
        if let Err(state) = AcceptorState::transition(&self.state, AcceptorState::Running, AcceptorState::Stopping) {
            warn!(?state, "acceptor is not running, ignore shutdown");
            return;
        }
        info!("stopping acceptor");

        if let Some(mut accept_loop) = self.accept_loop.take() {
            let join_timeout = self.options.accept_timeout.saturating_mul(2);
            match timeout(join_timeout, &mut accept_loop).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(cause = %e, "accept loop ended abnormally"),
                Err(_) => {
                    warn!(timeout = ?join_timeout, "accept loop did not stop in time, aborting it");
                    accept_loop.abort();
                }
            }
        }

        self.state.store(AcceptorState::Stopped as u8, Ordering::Release);
        info!("acceptor stopped");
    }

    pub fn state(&self) -> AcceptorState {
        AcceptorState::load(&self.state)
    }

    /// The bound address, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }
}

impl<D> Drop for ConnectionAcceptor<D> {
    fn drop(&mut self) {
        if let Some(accept_loop) = self.accept_loop.take() {
            accept_loop.abort();
        }
    }
}

async fn accept_loop<D>(listener: TcpListener, dispatcher: Arc<D>, state: Arc<AtomicU8>, accept_timeout: Duration)
where
    D: ConnectionDispatcher,
{
    let mut consecutive_errors = 0;

    while AcceptorState::load(&state) == AcceptorState::Running {
        match timeout(accept_timeout, listener.accept()).await {
            Ok(Ok((stream, peer))) => {
                consecutive_errors = 0;
                debug!(%peer, "accepted connection");
                dispatcher.dispatch(stream, peer);
            }
            Ok(Err(e)) => {
                // e.g. EMFILE: the error repeats until some connection closes
                let pause = accept_error_backoff(consecutive_errors, accept_timeout);
                consecutive_errors = consecutive_errors.saturating_add(1);
                warn!(cause = %e, ?pause, "failed to accept");
                tokio::time::sleep(pause).await;
            }
            // bounds how long a shutdown request goes unnoticed
            Err(_) => {}
        }
    }

    state.store(AcceptorState::Stopped as u8, Ordering::Release);
    debug!("accept loop finished");
}

/// Pause after a failed `accept`: doubles from 10ms per consecutive failure,
/// never longer than `cap` so a shutdown request is still noticed in time.
fn accept_error_backoff(consecutive_errors: u32, cap: Duration) -> Duration {
    const INITIAL: Duration = Duration::from_millis(10);
    INITIAL.saturating_mul(1 << consecutive_errors.min(16)).min(cap)
}

async fn bind(options: &AcceptorOptions) -> io::Result<TcpListener> {
    let mut last_error = None;

    for addr in lookup_host((options.host.as_str(), options.port)).await? {
        match listen_on(addr, options.backlog) {
            Ok(listener) => return Ok(listener),
            Err(e) => {
                debug!(%addr, cause = %e, "bind failed");
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::AddrNotAvailable, format!("{} did not resolve to any address", options.host))
    }))
}

fn listen_on(addr: SocketAddr, backlog: u32) -> io::Result<TcpListener> {
    let socket = if addr.is_ipv4() { TcpSocket::new_v4()? } else { TcpSocket::new_v6()? };
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    socket.listen(backlog)
}

fn already_started(state: AcceptorState) -> io::Error {
    io::Error::new(io::ErrorKind::AlreadyExists, format!("acceptor can only be started once, current state: {state:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionOptions;
    use crate::handler::make_processor;
    use crate::protocol::{HttpRequest, ResponseBuilder, StatusCode};
    use crate::server::TaskPerConnectionDispatcher;
    use std::convert::Infallible;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    fn acceptor(keep_alive_timeout: Duration) -> ConnectionAcceptor<impl ConnectionDispatcher> {
        let processor = make_processor(|_request: &HttpRequest, response: &mut ResponseBuilder| {
            response.status(StatusCode::Ok);
            Ok::<(), Infallible>(())
        });
        let options = ConnectionOptions { keep_alive_timeout, ..ConnectionOptions::default() };
        let dispatcher = TaskPerConnectionDispatcher::new(Arc::new(processor), options);
        let options = AcceptorOptions { port: 0, accept_timeout: Duration::from_millis(100), ..AcceptorOptions::default() };
        ConnectionAcceptor::new(options, Arc::new(dispatcher))
    }

    async fn expect(stream: &mut TcpStream, expected: &str) {
        let mut buf = vec![0u8; expected.len()];
        stream.read_exact(&mut buf).await.unwrap();
        assert_eq!(String::from_utf8_lossy(&buf), expected);
    }

    #[test]
    fn accept_errors_back_off_up_to_the_accept_timeout() {
        let cap = Duration::from_secs(1);
        assert_eq!(accept_error_backoff(0, cap), Duration::from_millis(10));
        assert_eq!(accept_error_backoff(1, cap), Duration::from_millis(20));
        assert_eq!(accept_error_backoff(3, cap), Duration::from_millis(80));
        assert_eq!(accept_error_backoff(7, cap), cap);
        assert_eq!(accept_error_backoff(u32::MAX, cap), cap);
        assert_eq!(accept_error_backoff(2, Duration::from_millis(25)), Duration::from_millis(25));
    }

    #[tokio::test]
    async fn lifecycle() {
        let mut acceptor = acceptor(Duration::from_secs(10));
        assert_eq!(acceptor.state(), AcceptorState::NotStarted);

        let addr = acceptor.start().await.unwrap();
        assert_eq!(acceptor.state(), AcceptorState::Running);
        assert_eq!(acceptor.local_addr(), Some(addr));
        assert_ne!(addr.port(), 0);

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(b"HEAD / HTTP/1.0\r\n\r\n").await.unwrap();
        expect(&mut stream, "HTTP/1.0 200 OK\r\n\r\n").await;

        acceptor.shutdown().await;
        assert_eq!(acceptor.state(), AcceptorState::Stopped);
        assert!(TcpStream::connect(addr).await.is_err());
    }

    #[tokio::test]
    async fn keep_alive_then_request_timeout() {
        let mut acceptor = acceptor(Duration::from_millis(300));
        let addr = acceptor.start().await.unwrap();

        let mut stream = TcpStream::connect(addr).await.unwrap();
        for _ in 0..3 {
            stream.write_all(b"HEAD / HTTP/1.1\r\nHost: localhost\r\n\r\n").await.unwrap();
            expect(&mut stream, "HTTP/1.1 200 OK\r\nConnection: keep-alive\r\nKeep-Alive: timeout=1\r\n\r\n").await;
        }

        expect(&mut stream, "HTTP/1.1 408 Request Timeout\r\n\r\n").await;
        let mut rest = Vec::new();
        stream.read_to_end(&mut rest).await.unwrap();
        assert!(rest.is_empty());

        acceptor.shutdown().await;
    }

    #[tokio::test]
    async fn malformed_status_line_is_rejected() {
        let mut acceptor = acceptor(Duration::from_secs(10));
        let addr = acceptor.start().await.unwrap();

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(b"HEAD / GarbageHTTP/1.1\r\n\r\n").await.unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert_eq!(response, "HTTP/1.1 400 Bad Request\r\n\r\n");

        acceptor.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_before_start_is_ignored() {
        let mut acceptor = acceptor(Duration::from_secs(10));

        acceptor.shutdown().await;
        assert_eq!(acceptor.state(), AcceptorState::NotStarted);

        acceptor.start().await.unwrap();
        assert_eq!(acceptor.state(), AcceptorState::Running);
        acceptor.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let mut acceptor = acceptor(Duration::from_secs(10));
        acceptor.start().await.unwrap();

        acceptor.shutdown().await;
        acceptor.shutdown().await;
        assert_eq!(acceptor.state(), AcceptorState::Stopped);
    }

    #[tokio::test]
    async fn starts_only_once() {
        let mut acceptor = acceptor(Duration::from_secs(10));
        acceptor.start().await.unwrap();

        let err = acceptor.start().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);

        acceptor.shutdown().await;
        let err = acceptor.start().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
    }
}
