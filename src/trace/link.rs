use crate::trace::SpanContext;
use crate::KeyValue;

/// A causal reference from one span to another, possibly in a different
/// trace.
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
    /// The context of the linked span.
    pub span_context: SpanContext,
    /// Attributes describing the link.
    pub attributes: Vec<KeyValue>,
}

impl Link {
    /// Create a new link to the given context with attributes.
    pub fn new(span_context: SpanContext, attributes: Vec<KeyValue>) -> Self {
        Link {
            span_context,
            attributes,
        }
    }

    /// Create a new link to the given context without attributes.
    pub fn with_context(span_context: SpanContext) -> Self {
        Link {
            span_context,
            attributes: Vec::new(),
        }
    }
}
