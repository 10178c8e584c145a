//! The span lifecycle engine.
//!
//! This module tracks the progression of single operations as they are
//! handled by the components of an application. A trace is a tree of
//! [`Span`]s sharing a trace id; each span is a timed operation record with
//! attributes, events, and links to related operations.
//!
//! [`Tracer::span_builder`] collects span properties and consults the
//! sampler. The application receives a [`RecordingSpan`] (or a no-op span,
//! when sampling declines) and mutates it from any thread. [`Span::end`]
//! freezes the record and fans it out to the registered
//! [`SpanProcessor`]s.
//!
//! ```
//! use tracekit::trace::{Span as _, Status, Tracer};
//! use tracekit::KeyValue;
//!
//! let tracer = Tracer::builder().build();
//!
//! let span = tracer.span_builder("authorize").start().unwrap();
//! span.set_attribute(KeyValue::new("user.tier", "paid"));
//! span.set_status(Status::OK);
//! span.end();
//!
//! tracer.shutdown();
//! ```

mod config;
mod error;
mod event;
mod evicted_hash_map;
mod evicted_queue;
mod id_generator;
mod link;
pub mod noop;
mod sampler;
mod span;
mod span_builder;
mod span_context;
mod span_processor;
mod tracer;

pub use config::TraceConfig;
pub use error::{TraceError, TraceResult};
pub use event::{Event, TimedEvent};
pub use evicted_hash_map::EvictedHashMap;
pub use evicted_queue::EvictedQueue;
pub use id_generator::{IdGenerator, RandomIdGenerator};
pub use link::Link;
pub use sampler::{CloneShouldSample, Sampler, SamplingDecision, SamplingResult, ShouldSample};
pub use span::{RecordingSpan, Span, Status, StatusCode};
pub use span_builder::SpanBuilder;
pub use span_context::{SpanContext, SpanId, TraceFlags, TraceId, TraceState};
pub use span_processor::{MultiSpanProcessor, NoopSpanProcessor, SpanProcessor};
pub use tracer::{Tracer, TracerBuilder};

/// The relationship of the span to the operation it records.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpanKind {
    /// An internal operation within an application.
    Internal,
    /// Server-side handling of a remote request.
    Server,
    /// The client-side wrapper around a remote request.
    Client,
    /// A message being sent to a broker.
    Producer,
    /// A message being received from a broker.
    Consumer,
}
