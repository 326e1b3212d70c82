//! The seam between the protocol engine and whatever produces content.
//!
//! A [`RequestProcessor`] receives each parsed request together with a
//! response builder already bound to the request's protocol version. Its only
//! contract is to populate the builder before returning: status, headers, and
//! a payload renderer when a body should be sent. Returning an error makes the
//! connection answer `500 Internal Server Error` and close.

use std::error::Error;
use std::sync::Arc;

use async_trait::async_trait;

use crate::protocol::{HttpRequest, ResponseBuilder};

#[async_trait]
pub trait RequestProcessor: Send + Sync {
    async fn process(&self, request: &HttpRequest, response: &mut ResponseBuilder) -> Result<(), Box<dyn Error + Send + Sync>>;
}

#[async_trait]
impl<P: RequestProcessor + ?Sized> RequestProcessor for Arc<P> {
    async fn process(&self, request: &HttpRequest, response: &mut ResponseBuilder) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.as_ref().process(request, response).await
    }
}

/// Adapts a synchronous closure into a [`RequestProcessor`].
#[derive(Debug)]
pub struct ProcessorFn<F> {
    f: F,
}

#[async_trait]
impl<F, Err> RequestProcessor for ProcessorFn<F>
where
    F: Fn(&HttpRequest, &mut ResponseBuilder) -> Result<(), Err> + Send + Sync,
    Err: Into<Box<dyn Error + Send + Sync>>,
{
    async fn process(&self, request: &HttpRequest, response: &mut ResponseBuilder) -> Result<(), Box<dyn Error + Send + Sync>> {
        (self.f)(request, response).map_err(Into::into)
    }
}

pub fn make_processor<F, Err>(f: F) -> ProcessorFn<F>
where
    F: Fn(&HttpRequest, &mut ResponseBuilder) -> Result<(), Err> + Send + Sync,
    Err: Into<Box<dyn Error + Send + Sync>>,
{
    ProcessorFn { f }
}
