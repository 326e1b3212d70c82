//! Conditional request evaluation (RFC 7232).

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::conditional::{ETag, ETagKind};
use crate::protocol::{HeaderField, HttpHeader};

/// Decides whether a resource body must be sent or a `304 Not Modified` suffices.
#[derive(Debug, Clone, Copy)]
pub struct ConditionalEvaluator<'a> {
    header: &'a HttpHeader,
}

impl<'a> ConditionalEvaluator<'a> {
    pub fn new(header: &'a HttpHeader) -> Self {
        Self { header }
    }

    /// Entity-tag preconditions win over the date precondition.
    ///
    /// With a current tag, `If-None-Match` sends content unless some listed
    /// tag weak-matches, and `If-Match` sends content unless some listed tag
    /// strong-matches. Otherwise `If-Modified-Since` sends content only when
    /// the resource changed after the given date. Without any precondition
    /// content is always sent.
    pub fn should_send_content(&self, current_etag: Option<&ETag>, current_last_modified: Option<SystemTime>) -> bool {
        if let Some(etag) = current_etag {
            if self.header.has(HeaderField::IfNoneMatch) {
                return !self.is_any_of_if_none_match(etag);
            }

            if self.header.has(HeaderField::IfMatch) {
                return !self.is_any_of_if_match(etag);
            }
        }

        match (self.if_modified_since(), current_last_modified) {
            (Some(since), Some(last_modified)) => since < truncate_to_seconds(last_modified),
            _ => true,
        }
    }

    pub fn is_any_of_if_match(&self, etag: &ETag) -> bool {
        self.any_listed(HeaderField::IfMatch, ETagKind::Strong, etag)
    }

    pub fn is_any_of_if_none_match(&self, etag: &ETag) -> bool {
        self.any_listed(HeaderField::IfNoneMatch, ETagKind::Weak, etag)
    }

    /// Parsed `If-Modified-Since`; an unparseable date counts as absent.
    pub fn if_modified_since(&self) -> Option<SystemTime> {
        let value = self.header.value_of(HeaderField::IfModifiedSince)?;
        match httpdate::parse_http_date(value.trim()) {
            Ok(since) => Some(since),
            Err(e) => {
                debug!(value, cause = %e, "ignoring malformed If-Modified-Since");
                None
            }
        }
    }

    fn any_listed(&self, field: HeaderField, kind: ETagKind, etag: &ETag) -> bool {
        self.header.values_of(field).into_iter().map(ETag::from).any(|listed| kind.compare(&listed, etag))
    }
}

/// HTTP dates carry whole seconds only.
fn truncate_to_seconds(time: SystemTime) -> SystemTime {
    match time.duration_since(UNIX_EPOCH) {
        Ok(since_epoch) => UNIX_EPOCH + Duration::from_secs(since_epoch.as_secs()),
        Err(_) => time,
    }
}
