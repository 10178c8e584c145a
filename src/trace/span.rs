//! The live span record.
//!
//! A [`RecordingSpan`] is the thread-safe record of one in-flight
//! operation. Any thread holding the span handle may mutate it; all mutable
//! state sits behind one internal lock that is held only for field
//! manipulation, never across processor callbacks. A serializable snapshot
//! can be taken at any moment, including before the span ends.

use crate::proto;
use crate::time::{Clock, TimestampConverter};
use crate::trace::config::TraceConfig;
use crate::trace::evicted_hash_map::EvictedHashMap;
use crate::trace::evicted_queue::EvictedQueue;
use crate::trace::span_processor::SpanProcessor;
use crate::trace::{Event, Link, SpanContext, SpanId, SpanKind, TimedEvent};
use crate::{KeyValue, Resource};
use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// The interface for recording span data.
///
/// Both [`RecordingSpan`] and [`NoopSpan`] implement this trait; sampling
/// decides which one a builder hands out, and callers need not care. Spans
/// are shared as `Arc<dyn Span>` and may be mutated from any thread.
///
/// After [`end`](Span::end) every mutator is a silent no-op.
///
/// [`NoopSpan`]: crate::trace::noop::NoopSpan
pub trait Span: Send + Sync + fmt::Debug {
    /// The immutable identifiers of this span.
    fn span_context(&self) -> &SpanContext;

    /// Whether mutations on this span are retained and reported.
    fn is_recording(&self) -> bool;

    /// Set a single attribute. Re-setting a key replaces its value and
    /// refreshes its recency with respect to eviction.
    fn set_attribute(&self, attribute: KeyValue);

    /// Record an event, timestamped now from the span's clock.
    fn add_event(&self, event: Event);

    /// Record a link to another span.
    fn add_link(&self, link: Link);

    /// Replace the span's status.
    fn set_status(&self, status: Status);

    /// Replace the span's name.
    fn update_name(&self, name: Cow<'static, str>);

    /// End the span. The first call freezes the end time and reports the
    /// span to the processor; subsequent calls do nothing.
    fn end(&self);

    /// Returns this span as a [`RecordingSpan`] when it records
    /// in-process, letting builders inherit converter state and report
    /// children to local parents.
    fn as_recording(&self) -> Option<&RecordingSpan> {
        None
    }
}

/// The canonical status codes for finished spans.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i32)]
pub enum StatusCode {
    /// The operation completed successfully.
    Ok = 0,
    /// The operation was cancelled, typically by the caller.
    Cancelled = 1,
    /// An unknown error.
    Unknown = 2,
    /// A client specified an invalid argument.
    InvalidArgument = 3,
    /// A deadline expired before the operation could complete.
    DeadlineExceeded = 4,
    /// A requested entity was not found.
    NotFound = 5,
    /// An entity the operation attempted to create already exists.
    AlreadyExists = 6,
    /// The caller lacks permission to execute the operation.
    PermissionDenied = 7,
    /// A resource has been exhausted.
    ResourceExhausted = 8,
    /// The system is not in a state required for the operation.
    FailedPrecondition = 9,
    /// The operation was aborted.
    Aborted = 10,
    /// The operation was attempted past the valid range.
    OutOfRange = 11,
    /// The operation is not implemented or supported.
    Unimplemented = 12,
    /// An internal error.
    Internal = 13,
    /// The service is currently unavailable.
    Unavailable = 14,
    /// Unrecoverable data loss or corruption.
    DataLoss = 15,
    /// The request lacks valid authentication credentials.
    Unauthenticated = 16,
}

/// The status of a finished span: a canonical code plus an optional
/// description.
///
/// A span that ends without an explicit status reports [`Status::OK`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Status {
    /// The canonical code.
    pub code: StatusCode,
    /// An optional developer-facing description.
    pub description: Option<Cow<'static, str>>,
}

impl Status {
    /// The default status of ended spans.
    pub const OK: Status = Status {
        code: StatusCode::Ok,
        description: None,
    };

    /// The operation was cancelled.
    pub const CANCELLED: Status = Status {
        code: StatusCode::Cancelled,
        description: None,
    };

    /// Create a status with the given code and no description.
    pub const fn new(code: StatusCode) -> Self {
        Status {
            code,
            description: None,
        }
    }

    /// Attach a description to this status.
    pub fn with_description(mut self, description: impl Into<Cow<'static, str>>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::OK
    }
}

/// The live, thread-safe span record.
///
/// Constructed by a span builder when sampling accepts the span. The
/// identifiers, kind, start time, and collaborators are fixed at
/// construction; everything else is guarded by the span's internal lock.
pub struct RecordingSpan {
    // Identifiers of this span. Never mutate.
    span_context: SpanContext,
    // The span id of the parent, absent iff this is a root span.
    parent_span_id: Option<SpanId>,
    // The kind of the span. Never mutates.
    kind: SpanKind,
    // Monotonic reading at construction.
    start_nanos: i64,
    // Active trace config when the span was created.
    trace_config: Arc<TraceConfig>,
    // Handler called when the span starts and ends.
    span_processor: Arc<dyn SpanProcessor>,
    // Renders monotonic readings as wall-clock timestamps. Shared with the
    // parent when the parent records locally, so sibling order survives
    // wall-clock jitter.
    timestamp_converter: TimestampConverter,
    // The clock used to get the time.
    clock: Arc<dyn Clock>,
    // The resource associated with this span.
    resource: Arc<Resource>,
    // All mutable state. Held only for field manipulation, never across
    // processor callbacks.
    inner: Mutex<SpanInner>,
}

#[derive(Debug)]
struct SpanInner {
    name: Cow<'static, str>,
    // Recorded attributes, allocated on first insert.
    attributes: Option<EvictedHashMap>,
    // Recorded events, allocated on first insert.
    events: Option<EvictedQueue<TimedEvent>>,
    // Recorded links, allocated on first insert.
    links: Option<EvictedQueue<Link>>,
    // The number of child spans reported by builders.
    children: u32,
    status: Option<Status>,
    // Valid iff `has_been_ended`.
    end_nanos: i64,
    has_been_ended: bool,
}

impl RecordingSpan {
    /// Creates and starts a span, registering it with the processor once it
    /// is fully constructed.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn start(
        span_context: SpanContext,
        name: Cow<'static, str>,
        kind: SpanKind,
        parent_span_id: Option<SpanId>,
        trace_config: Arc<TraceConfig>,
        span_processor: Arc<dyn SpanProcessor>,
        timestamp_converter: Option<TimestampConverter>,
        clock: Arc<dyn Clock>,
        resource: Arc<Resource>,
        initial_attributes: Vec<KeyValue>,
        initial_links: Vec<Link>,
        start_nanos: Option<i64>,
    ) -> Arc<RecordingSpan> {
        let start_nanos = start_nanos.unwrap_or_else(|| clock.now_nanos());
        let timestamp_converter =
            timestamp_converter.unwrap_or_else(|| TimestampConverter::now(clock.as_ref()));

        let mut inner = SpanInner {
            name,
            attributes: None,
            events: None,
            links: None,
            children: 0,
            status: None,
            end_nanos: 0,
            has_been_ended: false,
        };
        if !initial_attributes.is_empty() {
            inner
                .attributes
                .get_or_insert_with(|| {
                    EvictedHashMap::new(trace_config.max_attributes_per_span as usize)
                })
                .extend(initial_attributes);
        }
        if !initial_links.is_empty() {
            let mut initial_links = initial_links;
            inner
                .links
                .get_or_insert_with(|| {
                    EvictedQueue::new(trace_config.max_links_per_span as usize)
                })
                .append_vec(&mut initial_links);
        }

        let span = Arc::new(RecordingSpan {
            span_context,
            parent_span_id,
            kind,
            start_nanos,
            trace_config,
            span_processor,
            timestamp_converter,
            clock,
            resource,
            inner: Mutex::new(inner),
        });
        // Register here instead of in the constructor so the processor only
        // ever observes a fully initialized span.
        span.span_processor.on_start(&span);
        span
    }

    fn lock_inner(&self) -> MutexGuard<'_, SpanInner> {
        // The mutation API is total: a panic from a caller mid-update
        // cannot be allowed to wedge every later recording.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The name of the span.
    pub fn name(&self) -> Cow<'static, str> {
        self.lock_inner().name.clone()
    }

    /// The kind of the span.
    pub fn kind(&self) -> SpanKind {
        self.kind
    }

    /// The span id of the parent span, absent iff this is a root span.
    pub fn parent_span_id(&self) -> Option<SpanId> {
        self.parent_span_id
    }

    /// The resource that produced this span.
    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    /// The status of the span. Defaults to [`Status::OK`] when unset.
    pub fn status(&self) -> Status {
        self.lock_inner().status.clone().unwrap_or(Status::OK)
    }

    /// The latency of the span in nanoseconds. While the span is live this
    /// is the elapsed time so far.
    pub fn latency_nanos(&self) -> i64 {
        let inner = self.lock_inner();
        self.end_nanos_internal(&inner) - self.start_nanos
    }

    pub(crate) fn timestamp_converter(&self) -> &TimestampConverter {
        &self.timestamp_converter
    }

    /// Report a child span created under this span.
    pub(crate) fn add_child(&self) {
        let mut inner = self.lock_inner();
        if inner.has_been_ended {
            crate::tracekit_debug!(name: "span_add_child_after_end");
            return;
        }
        inner.children = inner.children.saturating_add(1);
    }

    // The frozen end time if ended, else the current reading, so that live
    // snapshots show current latency.
    fn end_nanos_internal(&self, inner: &SpanInner) -> i64 {
        if inner.has_been_ended {
            inner.end_nanos
        } else {
            self.clock.now_nanos()
        }
    }

    /// Produce the wire-format record of this span's current state.
    ///
    /// The snapshot is internally consistent: every field reflects the same
    /// moment under the span's lock. For a live span the end time is the
    /// time of the snapshot and the status is omitted; for an ended span
    /// the end time is frozen and the status defaults to OK.
    pub fn to_proto(&self) -> proto::Span {
        let inner = self.lock_inner();
        proto::Span {
            trace_id: self.span_context.trace_id().to_bytes().to_vec(),
            span_id: self.span_context.span_id().to_bytes().to_vec(),
            tracestate: Some(self.span_context.trace_state().into()),
            parent_span_id: self
                .parent_span_id
                .map(|id| id.to_bytes().to_vec())
                .unwrap_or_default(),
            name: inner.name.to_string(),
            kind: proto::span::SpanKind::from(self.kind) as i32,
            start_time: Some(self.timestamp_converter.convert_nanos(self.start_nanos)),
            end_time: Some(
                self.timestamp_converter
                    .convert_nanos(self.end_nanos_internal(&inner)),
            ),
            attributes: inner
                .attributes
                .as_ref()
                .map(proto::transform::span_attributes),
            time_events: inner
                .events
                .as_ref()
                .map(|events| proto::transform::timed_events(events, &self.timestamp_converter)),
            links: inner.links.as_ref().map(proto::transform::links),
            status: inner
                .has_been_ended
                .then(|| (&inner.status.clone().unwrap_or(Status::OK)).into()),
            child_span_count: Some(proto::UInt32Value {
                value: inner.children,
            }),
            resource: Some(self.resource.as_ref().into()),
        }
    }
}

impl Span for RecordingSpan {
    fn span_context(&self) -> &SpanContext {
        &self.span_context
    }

    fn is_recording(&self) -> bool {
        true
    }

    fn set_attribute(&self, attribute: KeyValue) {
        let mut inner = self.lock_inner();
        if inner.has_been_ended {
            crate::tracekit_debug!(name: "span_set_attribute_after_end");
            return;
        }
        let capacity = self.trace_config.max_attributes_per_span as usize;
        inner
            .attributes
            .get_or_insert_with(|| EvictedHashMap::new(capacity))
            .insert(attribute);
    }

    fn add_event(&self, event: Event) {
        // Stamp at entry so queueing for the lock cannot reorder the
        // event's time against its recording order on this thread.
        let nanos = self.clock.now_nanos();
        let mut inner = self.lock_inner();
        if inner.has_been_ended {
            crate::tracekit_debug!(name: "span_add_event_after_end");
            return;
        }
        let capacity = self.trace_config.max_events_per_span as usize;
        inner
            .events
            .get_or_insert_with(|| EvictedQueue::new(capacity))
            .push_back(TimedEvent::new(nanos, event));
    }

    fn add_link(&self, link: Link) {
        let mut inner = self.lock_inner();
        if inner.has_been_ended {
            crate::tracekit_debug!(name: "span_add_link_after_end");
            return;
        }
        let capacity = self.trace_config.max_links_per_span as usize;
        inner
            .links
            .get_or_insert_with(|| EvictedQueue::new(capacity))
            .push_back(link);
    }

    fn set_status(&self, status: Status) {
        let mut inner = self.lock_inner();
        if inner.has_been_ended {
            crate::tracekit_debug!(name: "span_set_status_after_end");
            return;
        }
        inner.status = Some(status);
    }

    fn update_name(&self, name: Cow<'static, str>) {
        let mut inner = self.lock_inner();
        if inner.has_been_ended {
            crate::tracekit_debug!(name: "span_update_name_after_end");
            return;
        }
        inner.name = name;
    }

    fn end(&self) {
        {
            let mut inner = self.lock_inner();
            if inner.has_been_ended {
                crate::tracekit_debug!(name: "span_end_after_end");
                return;
            }
            inner.end_nanos = self.clock.now_nanos();
            inner.has_been_ended = true;
        }
        // The lock is released before the callback so a processor can read
        // the span (or call back into it) without deadlocking.
        self.span_processor.on_end(self);
    }

    fn as_recording(&self) -> Option<&RecordingSpan> {
        Some(self)
    }
}

impl fmt::Debug for RecordingSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingSpan")
            .field("span_context", &self.span_context)
            .field("parent_span_id", &self.parent_span_id)
            .field("kind", &self.kind)
            .field("start_nanos", &self.start_nanos)
            .finish()
    }
}

impl Drop for RecordingSpan {
    fn drop(&mut self) {
        let inner = match self.inner.get_mut() {
            Ok(inner) => inner,
            Err(poisoned) => poisoned.into_inner(),
        };
        if !inner.has_been_ended {
            // An unended span is an observability leak: its record was
            // never reported. Nothing structural to clean up.
            crate::tracekit_error!(
                name: "span_dropped_without_end",
                span_name = inner.name.as_ref(),
            );
        }
    }
}
