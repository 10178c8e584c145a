//! No-op implementations of the span surface.

use crate::trace::span::{Span, Status};
use crate::trace::{Event, Link, SpanContext};
use crate::KeyValue;
use std::borrow::Cow;

/// A span that discards every mutation.
///
/// Builders hand these out when sampling rejects a span or the owning
/// tracer has been stopped. The span context is still carried, so a
/// non-sampled span can participate in propagation.
#[derive(Clone, Debug)]
pub struct NoopSpan {
    span_context: SpanContext,
}

impl NoopSpan {
    /// Create a no-op span carrying the given context.
    pub fn new(span_context: SpanContext) -> Self {
        NoopSpan { span_context }
    }

    /// Create a no-op span with an invalid context.
    pub fn invalid() -> Self {
        NoopSpan {
            span_context: SpanContext::empty_context(),
        }
    }
}

impl Span for NoopSpan {
    fn span_context(&self) -> &SpanContext {
        &self.span_context
    }

    fn is_recording(&self) -> bool {
        false
    }

    fn set_attribute(&self, _attribute: KeyValue) {
        // Ignored
    }

    fn add_event(&self, _event: Event) {
        // Ignored
    }

    fn add_link(&self, _link: Link) {
        // Ignored
    }

    fn set_status(&self, _status: Status) {
        // Ignored
    }

    fn update_name(&self, _name: Cow<'static, str>) {
        // Ignored
    }

    fn end(&self) {
        // Ignored
    }
}
