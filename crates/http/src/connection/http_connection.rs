use std::io;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, error, info};

use crate::codec::{HeaderDecoder, RequestBuffer};
use crate::connection::{ConnectionOptions, IdleTimeout, ResponseWriter};
use crate::handler::RequestProcessor;
use crate::protocol::{HttpError, HttpRequest, HttpResponse, ParseError, ResponseBuilder, StatusCode, Version};

/// Version used for a `400` when no request has been understood yet.
const DEFAULT_VERSION: Version = Version::Http11;

/// Drives one connection: read a request, let the processor fill a
/// response, write it, and repeat while the connection is persistent.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
#[derive(Debug)]
pub struct HttpConnection<R, W> {
    request_buffer: RequestBuffer<IdleTimeout<R>>,
    response_writer: ResponseWriter<W>,
    options: ConnectionOptions,
}

#[derive(Debug)]
enum State {
    AwaitingRequest,
    Processing(HttpRequest),
    Responding { response: HttpResponse, keep_alive: bool },
    Closed,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W, options: ConnectionOptions) -> Self {
        Self {
            request_buffer: RequestBuffer::with_decoder(
                IdleTimeout::new(reader, options.keep_alive_timeout),
                HeaderDecoder::with_limit(options.max_header_bytes),
            ),
            response_writer: ResponseWriter::with_chunk_size(writer, options.chunked_encoding_buffer_size),
            options,
        }
    }

    /// Serves requests until the connection ends, then releases the request
    /// buffer and the writer, in that order, on every exit path.
    ///
    /// Parse failures, timeouts and processor failures are answered on the
    /// wire and end with `Ok`. An `Err` means the transport failed and the
    /// connection was dropped without a response.
    pub async fn process<P>(mut self, processor: &P) -> Result<(), HttpError>
    where
        P: RequestProcessor + ?Sized,
    {
        let result = self.run(processor).await;
        self.close().await;
        result
    }

    async fn run<P>(&mut self, processor: &P) -> Result<(), HttpError>
    where
        P: RequestProcessor + ?Sized,
    {
        let mut previous_version = None;
        let mut state = State::AwaitingRequest;

        loop {
            state = match state {
                State::AwaitingRequest => self.await_request(previous_version).await?,
                State::Processing(request) => {
                    previous_version = Some(request.version());
                    self.handle_request(&request, processor).await
                }
                State::Responding { response, keep_alive } => {
                    self.response_writer.write(response).await?;
                    if keep_alive { State::AwaitingRequest } else { State::Closed }
                }
                State::Closed => return Ok(()),
            };
        }
    }

    async fn await_request(&mut self, previous_version: Option<Version>) -> Result<State, HttpError> {
        // the idle clock runs from the end of the previous response
        self.request_buffer.get_mut().reset();

        match self.request_buffer.next_request().await {
            Ok(Some(request)) => Ok(State::Processing(request)),

            Ok(None) => {
                debug!("cant read more request, break this connection down");
                Ok(State::Closed)
            }

            Err(ParseError::Io { source }) if source.kind() == io::ErrorKind::TimedOut => {
                debug!(timeout = ?self.options.keep_alive_timeout, "idle timeout while awaiting request");
                // HTTP/1.0 clients don't expect an unsolicited response
                if previous_version == Some(Version::Http11) {
                    Ok(State::Responding {
                        response: HttpResponse::from_status(Version::Http11, StatusCode::RequestTimeout),
                        keep_alive: false,
                    })
                } else {
                    Ok(State::Closed)
                }
            }

            Err(e @ ParseError::Io { .. }) => Err(e.into()),

            Err(e) => {
                error!(cause = %e, "can't parse request");
                let version = previous_version.unwrap_or(DEFAULT_VERSION);
                Ok(State::Responding { response: HttpResponse::from_status(version, StatusCode::BadRequest), keep_alive: false })
            }
        }
    }

    async fn handle_request<P>(&self, request: &HttpRequest, processor: &P) -> State
    where
        P: RequestProcessor + ?Sized,
    {
        let mut builder = ResponseBuilder::new(request.version());

        if let Err(e) = processor.process(request, &mut builder).await {
            error!(cause = %e, uri = request.uri(), "handle response error");
            return internal_error(request.version());
        }

        let keep_alive = request.version().is_persistent() && !request.header().is_connection_close();
        if keep_alive {
            builder.keep_alive_for(self.options.keep_alive_timeout);
        }

        match builder.build() {
            Ok(response) => {
                info!(
                    protocol = %request.version(),
                    method = %request.method(),
                    uri = request.uri(),
                    status = %response.status(),
                    keep_alive,
                    "request served"
                );
                State::Responding { response, keep_alive }
            }
            Err(e) => {
                error!(cause = %e, uri = request.uri(), "processor returned an incomplete response");
                internal_error(request.version())
            }
        }
    }

    async fn close(self) {
        let Self { request_buffer, mut response_writer, .. } = self;
        drop(request_buffer);

        if let Err(e) = response_writer.close().await {
            debug!(cause = %e, "error during close");
        }
        debug!("client connection closed");
    }
}

fn internal_error(version: Version) -> State {
    State::Responding { response: HttpResponse::from_status(version, StatusCode::InternalServerError), keep_alive: false }
}
