use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::io::{AsyncRead, ReadBuf};
use tokio::time::{Instant, Sleep};

/// A reader that fails with [`io::ErrorKind::TimedOut`] once no bytes have
/// arrived for `timeout`.
///
/// The deadline restarts on every completed read, so a slow but steady
/// peer is never cut off. [`IdleTimeout::reset`] restarts it explicitly.
#[derive(Debug)]
pub struct IdleTimeout<R> {
    inner: R,
    timeout: Duration,
    sleep: Pin<Box<Sleep>>,
}

impl<R> IdleTimeout<R> {
    pub fn new(inner: R, timeout: Duration) -> Self {
        Self { inner, timeout, sleep: Box::pin(tokio::time::sleep(timeout)) }
    }

    pub fn reset(&mut self) {
        self.sleep.as_mut().reset(Instant::now() + self.timeout);
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for IdleTimeout<R> {
    fn poll_read(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();

        match Pin::new(&mut this.inner).poll_read(cx, buf) {
            Poll::Ready(result) => {
                this.reset();
                Poll::Ready(result)
            }
            Poll::Pending => match this.sleep.as_mut().poll(cx) {
                Poll::Ready(()) => Poll::Ready(Err(io::Error::new(io::ErrorKind::TimedOut, "idle timeout while reading"))),
                Poll::Pending => Poll::Pending,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn slow_writer_is_not_cut_off() {
        let (mut client, server) = tokio::io::duplex(64);
        let mut reader = IdleTimeout::new(server, Duration::from_millis(200));

        tokio::spawn(async move {
            for part in [b"ab", b"cd", b"ef"] {
                tokio::time::sleep(Duration::from_millis(120)).await;
                client.write_all(part).await.unwrap();
            }
        });

        let mut buf = [0u8; 6];
        reader.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"abcdef");
    }

    #[tokio::test]
    async fn silent_peer_times_out() {
        let (_client, server) = tokio::io::duplex(64);
        let mut reader = IdleTimeout::new(server, Duration::from_millis(50));

        let mut buf = [0u8; 1];
        let err = reader.read(&mut buf).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
    }

    #[tokio::test]
    async fn reset_restarts_the_deadline() {
        let (mut client, server) = tokio::io::duplex(64);
        let mut reader = IdleTimeout::new(server, Duration::from_millis(100));

        tokio::time::sleep(Duration::from_millis(150)).await;
        reader.reset();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            client.write_all(b"x").await.unwrap();
        });

        let mut buf = [0u8; 1];
        reader.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"x");
    }
}
