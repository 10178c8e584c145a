//! An in-process distributed-tracing data plane.
//!
//! tracekit captures causal operation records ("spans") from instrumented
//! application code, bounds their in-memory representation, and hands
//! finished records off to pluggable [span processors]. The crate is the
//! recording core only: exporters, batching, transports, and context
//! propagation codecs are downstream concerns that plug in through the
//! processor interface.
//!
//! # Getting started
//!
//! ```
//! use tracekit::trace::{Span as _, Status, Tracer};
//! use tracekit::KeyValue;
//!
//! let tracer = Tracer::builder().build();
//!
//! let span = tracer.span_builder("render_invoice").start().unwrap();
//! span.set_attribute(KeyValue::new("invoice.id", 8675309_i64));
//!
//! // ... do the work ...
//!
//! span.set_status(Status::OK);
//! span.end();
//! tracer.shutdown();
//! ```
//!
//! # Design
//!
//! * Each recording span owns one internal lock; any thread holding the
//!   span handle may mutate it, and a consistent wire-format snapshot can
//!   be taken at any moment, even mid-flight.
//! * Attributes, events, and links are capped per span. Overflow evicts
//!   deterministically (least-recently-written attributes, oldest events
//!   and links) and exact dropped counts are reported.
//! * Sampling is pluggable; rejected spans cost one allocation and record
//!   nothing.
//! * Processors run synchronously on span start and end, in registration
//!   order, behind an atomically swapped composite: the hot path never
//!   takes a registration lock.
//!
//! [span processors]: crate::trace::SpanProcessor

#![warn(missing_docs)]

mod common;
pub mod context;
mod internal_logging;
pub mod proto;
mod resource;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod time;
pub mod trace;

pub use common::{Key, KeyValue, Value};
pub use resource::Resource;
