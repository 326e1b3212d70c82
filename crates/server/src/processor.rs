use std::error::Error;

use async_trait::async_trait;
use tracing::debug;
use vanilla_http::conditional::ConditionalEvaluator;
use vanilla_http::handler::RequestProcessor;
use vanilla_http::protocol::{HttpRequest, MediaType, Method, ResponseBuilder, StatusCode};

use crate::filesystem::{FilesystemContentService, SearchResult};

/// Answers requests from a [`FilesystemContentService`].
///
/// Found resources go through the conditional evaluator first; a `304` carries
/// the current `ETag` and no body. `HEAD` gets the same headers as `GET`
/// without the payload.
#[derive(Debug, Clone)]
pub struct FilesystemProcessor {
    service: FilesystemContentService,
}

impl FilesystemProcessor {
    pub fn new(service: FilesystemContentService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl RequestProcessor for FilesystemProcessor {
    async fn process(&self, request: &HttpRequest, response: &mut ResponseBuilder) -> Result<(), Box<dyn Error + Send + Sync>> {
        let content = self.service.fetch(request.uri()).await;

        if content.result() != SearchResult::Found {
            response.status(content.result().status());
            return Ok(());
        }

        let evaluator = ConditionalEvaluator::new(request.header());
        if !evaluator.should_send_content(content.etag(), content.last_modified()) {
            debug!(uri = request.uri(), "resource not modified");
            response.status(StatusCode::NotModified);
            if let Some(etag) = content.etag() {
                response.etag(etag);
            }
            return Ok(());
        }

        response.status(StatusCode::Ok).content_type(content.media_type().unwrap_or(MediaType::Unknown));
        if let Some(etag) = content.etag() {
            response.etag(etag);
        }
        if let Some(last_modified) = content.last_modified() {
            response.last_modified(last_modified);
        }

        if request.method() == Method::Get {
            content.render_into(response);
        }
        Ok(())
    }
}
