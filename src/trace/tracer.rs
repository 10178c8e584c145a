//! The tracer: entry point for span construction.
//!
//! A [`Tracer`] owns the collaborators every span needs (clock, resource,
//! id generator), the active [`TraceConfig`], and the active composite
//! [`SpanProcessor`]. Config and processor are published through atomically
//! swappable references: the recording hot path does one atomic load per
//! span and never touches the registration lock.

use crate::context::{self, SpanScope};
use crate::time::{Clock, SystemClock};
use crate::trace::config::TraceConfig;
use crate::trace::error::TraceResult;
use crate::trace::id_generator::{IdGenerator, RandomIdGenerator};
use crate::trace::span::Span;
use crate::trace::span_builder::SpanBuilder;
use crate::trace::span_processor::{MultiSpanProcessor, SpanProcessor};
use crate::Resource;
use arc_swap::ArcSwap;
use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Creates spans and wires them to the active config and processors.
///
/// All state a span captures from the tracer is snapshotted when its
/// builder is created, so live reconfiguration never affects spans already
/// being built.
///
/// # Examples
///
/// ```
/// use tracekit::trace::{Span as _, Tracer};
/// use tracekit::KeyValue;
///
/// let tracer = Tracer::builder().build();
/// let span = tracer.span_builder("handle_request").start().unwrap();
/// span.set_attribute(KeyValue::new("http.route", "/users/:id"));
/// span.end();
/// ```
pub struct Tracer {
    clock: Arc<dyn Clock>,
    resource: Arc<Resource>,
    id_generator: Arc<dyn IdGenerator>,
    active_trace_config: ArcSwap<TraceConfig>,
    active_span_processor: ArcSwap<MultiSpanProcessor>,
    registered_span_processors: Mutex<Vec<Arc<dyn SpanProcessor>>>,
    is_stopped: AtomicBool,
}

impl fmt::Debug for Tracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer")
            .field("resource", &self.resource)
            .field("is_stopped", &self.is_stopped.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Tracer::builder().build()
    }
}

impl Tracer {
    /// Start building a tracer.
    pub fn builder() -> TracerBuilder {
        TracerBuilder::default()
    }

    /// Returns a builder for a span with the given name, bound to the
    /// currently active config and processors.
    ///
    /// On a stopped tracer the returned builder yields only no-op spans.
    pub fn span_builder(&self, name: impl Into<Cow<'static, str>>) -> SpanBuilder {
        SpanBuilder::new(
            name.into(),
            self.active_trace_config.load_full(),
            self.active_span_processor.load_full(),
            self.resource.clone(),
            self.id_generator.clone(),
            self.clock.clone(),
            self.is_stopped.load(Ordering::SeqCst),
        )
    }

    /// Build a span, run `f` with the span marked current, then end the
    /// span on all exit paths of `f`.
    pub fn in_span<T, F>(&self, name: impl Into<Cow<'static, str>>, f: F) -> TraceResult<T>
    where
        F: FnOnce(&Arc<dyn Span>) -> T,
    {
        let span = self.span_builder(name).start()?;
        let result = {
            let _scope = context::mark_span_as_active(span.clone());
            f(&span)
        };
        span.end();
        Ok(result)
    }

    /// The current span of this thread, if any.
    pub fn current_span(&self) -> Option<Arc<dyn Span>> {
        context::current_span()
    }

    /// Mark the given span as this thread's current span until the returned
    /// scope is dropped, restoring the previous value.
    pub fn with_span(&self, span: Arc<dyn Span>) -> SpanScope {
        context::mark_span_as_active(span)
    }

    /// The active configuration snapshot.
    pub fn active_trace_config(&self) -> Arc<TraceConfig> {
        self.active_trace_config.load_full()
    }

    /// Atomically replace the active configuration. Spans already built, or
    /// being built, keep the config they started with.
    pub fn update_active_trace_config(&self, trace_config: TraceConfig) {
        self.active_trace_config.store(Arc::new(trace_config));
    }

    /// Register an additional span processor. Processors are invoked in
    /// registration order on every span start and end.
    pub fn add_span_processor<T: SpanProcessor + 'static>(&self, span_processor: T) {
        let mut registered = self
            .registered_span_processors
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        registered.push(Arc::new(span_processor));
        self.active_span_processor
            .store(Arc::new(MultiSpanProcessor::new(registered.clone())));
    }

    /// Stop this tracer: shut down the registered processors and make all
    /// future builders yield no-op spans.
    ///
    /// Subsequent calls warn and return.
    pub fn shutdown(&self) {
        let _registered = self
            .registered_span_processors
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if self.is_stopped.load(Ordering::SeqCst) {
            crate::tracekit_warn!(name: "tracer_shutdown_called_again");
            return;
        }
        self.active_span_processor.load().shutdown();
        self.is_stopped.store(true, Ordering::SeqCst);
    }
}

/// Configures and builds a [`Tracer`].
#[derive(Default)]
pub struct TracerBuilder {
    clock: Option<Arc<dyn Clock>>,
    resource: Option<Resource>,
    id_generator: Option<Arc<dyn IdGenerator>>,
    trace_config: Option<TraceConfig>,
    span_processors: Vec<Arc<dyn SpanProcessor>>,
}

impl TracerBuilder {
    /// Use the given clock instead of the system clock.
    pub fn with_clock<T: Clock + 'static>(mut self, clock: T) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Use the given resource instead of the environment resource.
    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resource = Some(resource);
        self
    }

    /// Use the given id generator.
    pub fn with_id_generator<T: IdGenerator + 'static>(mut self, id_generator: T) -> Self {
        self.id_generator = Some(Arc::new(id_generator));
        self
    }

    /// Use the given initial configuration.
    pub fn with_trace_config(mut self, trace_config: TraceConfig) -> Self {
        self.trace_config = Some(trace_config);
        self
    }

    /// Register a span processor. May be called multiple times; processors
    /// run in registration order.
    pub fn with_span_processor<T: SpanProcessor + 'static>(mut self, span_processor: T) -> Self {
        self.span_processors.push(Arc::new(span_processor));
        self
    }

    /// Build the tracer.
    pub fn build(self) -> Tracer {
        let composite = MultiSpanProcessor::new(self.span_processors.clone());
        Tracer {
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock::new())),
            resource: Arc::new(self.resource.unwrap_or_else(Resource::from_env)),
            id_generator: self
                .id_generator
                .unwrap_or_else(|| Arc::new(RandomIdGenerator::default())),
            active_trace_config: ArcSwap::from_pointee(
                self.trace_config.unwrap_or_default(),
            ),
            active_span_processor: ArcSwap::from_pointee(composite),
            registered_span_processors: Mutex::new(self.span_processors),
            is_stopped: AtomicBool::new(false),
        }
    }
}
