//! In-memory test doubles for the span lifecycle.
//!
//! Available to downstream crates behind the `testing` feature.

use crate::proto::{self, Timestamp};
use crate::time::{Clock, NANOS_PER_SECOND};
use crate::trace::{
    RecordingSpan, Span, SpanContext, SpanId, SpanKind, SpanProcessor, TraceConfig, TraceFlags,
    TraceId, TraceState,
};
use crate::Resource;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A settable clock whose wall time and monotonic counter advance in
/// lockstep, with the monotonic origin at the Unix epoch.
#[derive(Clone, Debug)]
pub struct TestClock {
    nanos: Arc<Mutex<i64>>,
}

impl TestClock {
    /// Create a clock reading the given number of seconds past the epoch.
    pub fn with_seconds(seconds: i64) -> Self {
        TestClock {
            nanos: Arc::new(Mutex::new(seconds * NANOS_PER_SECOND)),
        }
    }

    /// Advance the clock.
    pub fn advance(&self, duration: Duration) {
        let mut nanos = self.nanos.lock().unwrap();
        *nanos += duration.as_nanos() as i64;
    }
}

impl Clock for TestClock {
    fn now(&self) -> Timestamp {
        let nanos = *self.nanos.lock().unwrap();
        Timestamp {
            seconds: nanos.div_euclid(NANOS_PER_SECOND),
            nanos: nanos.rem_euclid(NANOS_PER_SECOND) as i32,
        }
    }

    fn now_nanos(&self) -> i64 {
        *self.nanos.lock().unwrap()
    }
}

#[derive(Debug, Default)]
struct TestSpanProcessorInner {
    started: Mutex<Vec<SpanContext>>,
    ended: Mutex<Vec<proto::Span>>,
    shutdown_calls: AtomicUsize,
}

/// A [`SpanProcessor`] that records every callback it receives.
///
/// Clones share state, so a clone can be registered with a tracer while
/// the original stays behind for assertions.
#[derive(Clone, Debug, Default)]
pub struct TestSpanProcessor {
    inner: Arc<TestSpanProcessorInner>,
}

impl TestSpanProcessor {
    /// Create a new recording processor.
    pub fn new() -> Self {
        TestSpanProcessor::default()
    }

    /// The number of `on_start` callbacks observed.
    pub fn start_count(&self) -> usize {
        self.inner.started.lock().unwrap().len()
    }

    /// The number of `on_end` callbacks observed.
    pub fn end_count(&self) -> usize {
        self.inner.ended.lock().unwrap().len()
    }

    /// The number of `shutdown` calls observed.
    pub fn shutdown_count(&self) -> usize {
        self.inner.shutdown_calls.load(Ordering::SeqCst)
    }

    /// The contexts of the spans that started.
    pub fn started_contexts(&self) -> Vec<SpanContext> {
        self.inner.started.lock().unwrap().clone()
    }

    /// Snapshots of the spans that ended, in end order.
    pub fn ended_spans(&self) -> Vec<proto::Span> {
        self.inner.ended.lock().unwrap().clone()
    }
}

impl SpanProcessor for TestSpanProcessor {
    fn on_start(&self, span: &RecordingSpan) {
        self.inner
            .started
            .lock()
            .unwrap()
            .push(span.span_context().clone());
    }

    fn on_end(&self, span: &RecordingSpan) {
        self.inner.ended.lock().unwrap().push(span.to_proto());
    }

    fn shutdown(&self) {
        self.inner.shutdown_calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// A fixed, valid span context for tests.
pub fn test_span_context() -> SpanContext {
    SpanContext::new(
        TraceId::from(0x0102_0304_0506_0708_090a_0b0c_0d0e_0f10_u128),
        SpanId::from(0x1122_3344_5566_7788_u64),
        TraceFlags::SAMPLED,
        TraceState::default(),
    )
}

/// Start a standalone recording span wired to the given processor, with a
/// test clock at 1000 seconds and default configuration.
pub fn start_test_span(processor: Arc<dyn SpanProcessor>) -> Arc<RecordingSpan> {
    RecordingSpan::start(
        test_span_context(),
        "test_span".into(),
        SpanKind::Internal,
        None,
        Arc::new(TraceConfig::default()),
        processor,
        None,
        Arc::new(TestClock::with_seconds(1000)),
        Arc::new(Resource::empty()),
        Vec::new(),
        Vec::new(),
        None,
    )
}
