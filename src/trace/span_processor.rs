//! Hooks invoked on span start and end.
//!
//! Span processors are the hand-off point between the recording path and
//! downstream consumers (batchers, exporters, live introspection pages).
//! `on_start` is called synchronously on the thread that started the span,
//! after the span is fully constructed; `on_end` is called synchronously
//! from `end()`, after the ending thread has released the span's internal
//! lock. Neither call may block or panic the recording path: panics are
//! caught by the composite and logged.
//!
//! Processors are invoked in registration order and receive the span by
//! shared reference. A processor that wants to keep span data past `on_end`
//! must take its own snapshot via [`RecordingSpan::to_proto`].
//!
//! [`RecordingSpan::to_proto`]: crate::trace::RecordingSpan::to_proto

use crate::trace::span::RecordingSpan;
use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// An interface for hooks on span start and end.
///
/// Implementations must be thread-safe: spans may start and end on any
/// thread concurrently.
pub trait SpanProcessor: Send + Sync + fmt::Debug {
    /// Called when a recording span is started. The span is fully
    /// constructed but carries no end time yet.
    fn on_start(&self, span: &RecordingSpan);

    /// Called when a recording span is ended. Invoked exactly once per
    /// span; repeated `end()` calls do not re-invoke it.
    fn on_end(&self, span: &RecordingSpan);

    /// Called once when the owning tracer shuts down.
    fn shutdown(&self);
}

/// A [`SpanProcessor`] that does nothing.
#[derive(Clone, Debug, Default)]
pub struct NoopSpanProcessor {
    _private: (),
}

impl NoopSpanProcessor {
    /// Create a new no-op processor.
    pub fn new() -> Self {
        NoopSpanProcessor::default()
    }
}

impl SpanProcessor for NoopSpanProcessor {
    fn on_start(&self, _span: &RecordingSpan) {}

    fn on_end(&self, _span: &RecordingSpan) {}

    fn shutdown(&self) {}
}

/// A [`SpanProcessor`] that forwards to an ordered list of processors.
///
/// The tracer rebuilds the composite whenever the registered list changes
/// and publishes it through an atomically swappable reference, so the
/// recording hot path does a single atomic load instead of locking the
/// registration list.
#[derive(Debug, Default)]
pub struct MultiSpanProcessor {
    span_processors: Vec<Arc<dyn SpanProcessor>>,
}

impl MultiSpanProcessor {
    /// Create a composite over the given processors.
    pub fn new(span_processors: Vec<Arc<dyn SpanProcessor>>) -> Self {
        MultiSpanProcessor { span_processors }
    }
}

impl SpanProcessor for MultiSpanProcessor {
    fn on_start(&self, span: &RecordingSpan) {
        for processor in &self.span_processors {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| processor.on_start(span))) {
                crate::tracekit_error!(
                    name: "span_processor_on_start_panicked",
                    message = panic_message(&panic),
                );
            }
        }
    }

    fn on_end(&self, span: &RecordingSpan) {
        for processor in &self.span_processors {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| processor.on_end(span))) {
                crate::tracekit_error!(
                    name: "span_processor_on_end_panicked",
                    message = panic_message(&panic),
                );
            }
        }
    }

    fn shutdown(&self) {
        for processor in &self.span_processors {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| processor.shutdown())) {
                crate::tracekit_error!(
                    name: "span_processor_shutdown_panicked",
                    message = panic_message(&panic),
                );
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{start_test_span, TestSpanProcessor};
    use crate::trace::Span as _;

    #[derive(Debug)]
    struct PanickingProcessor;

    impl SpanProcessor for PanickingProcessor {
        fn on_start(&self, _span: &RecordingSpan) {
            panic!("on_start failure");
        }

        fn on_end(&self, _span: &RecordingSpan) {
            panic!("on_end failure");
        }

        fn shutdown(&self) {
            panic!("shutdown failure");
        }
    }

    #[test]
    fn forwards_in_registration_order() {
        let first = TestSpanProcessor::new();
        let second = TestSpanProcessor::new();
        let composite = MultiSpanProcessor::new(vec![
            Arc::new(first.clone()),
            Arc::new(second.clone()),
        ]);
        let span = start_test_span(Arc::new(NoopSpanProcessor::new()));

        composite.on_start(&span);
        composite.on_end(&span);
        composite.shutdown();

        assert_eq!(first.start_count(), 1);
        assert_eq!(first.end_count(), 1);
        assert_eq!(first.shutdown_count(), 1);
        assert_eq!(second.start_count(), 1);
        assert_eq!(second.end_count(), 1);
        assert_eq!(second.shutdown_count(), 1);
        span.end();
    }

    #[test]
    fn panicking_processor_does_not_poison_the_rest() {
        let witness = TestSpanProcessor::new();
        let composite = MultiSpanProcessor::new(vec![
            Arc::new(PanickingProcessor),
            Arc::new(witness.clone()),
        ]);
        let span = start_test_span(Arc::new(NoopSpanProcessor::new()));

        composite.on_start(&span);
        composite.on_end(&span);
        composite.shutdown();

        assert_eq!(witness.start_count(), 1);
        assert_eq!(witness.end_count(), 1);
        assert_eq!(witness.shutdown_count(), 1);
        span.end();
    }

    #[test]
    fn empty_composite_is_a_noop() {
        let composite = MultiSpanProcessor::default();
        let span = start_test_span(Arc::new(NoopSpanProcessor::new()));
        composite.on_start(&span);
        composite.on_end(&span);
        composite.shutdown();
        span.end();
    }
}
