//! Conditional requests: entity tags and the precondition evaluator.

mod etag;
mod evaluator;

pub use etag::ETag;
pub use etag::ETagKind;
pub use evaluator::ConditionalEvaluator;
