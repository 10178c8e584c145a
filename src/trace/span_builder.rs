//! Span construction.
//!
//! A [`SpanBuilder`] collects everything known about a span before it
//! exists: its name, parent, kind, initial attributes and links, and an
//! optional explicit start time. On [`start`](SpanBuilder::start) it
//! resolves the parent, allocates ids, consults the sampler, and produces
//! either a recording span or a no-op span.
//!
//! Builders are bound to the tracer's active config and processor at
//! creation, so a configuration rotation between `span_builder()` and
//! `start()` cannot split one span across configs.

use crate::time::Clock;
use crate::trace::config::TraceConfig;
use crate::trace::error::{TraceError, TraceResult};
use crate::trace::id_generator::IdGenerator;
use crate::trace::noop::NoopSpan;
use crate::trace::sampler::ShouldSample;
use crate::trace::span::{RecordingSpan, Span};
use crate::trace::span_processor::SpanProcessor;
use crate::trace::{Link, SpanContext, SpanKind, TraceFlags, TraceState};
use crate::{KeyValue, Resource};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// The maximum length of a span name in bytes.
const MAX_SPAN_NAME_BYTES: usize = 255;

/// Where a new span finds its parent.
#[derive(Clone, Debug, Default)]
enum Parent {
    /// Consult the ambient current-span slot.
    #[default]
    Current,
    /// An explicit parent span handle.
    Explicit(Arc<dyn Span>),
    /// An explicit parent context, typically propagated from a remote
    /// caller.
    Remote(SpanContext),
    /// Force a root span.
    NoParent,
}

/// Collects span properties and produces a span.
pub struct SpanBuilder {
    name: Cow<'static, str>,
    parent: Parent,
    kind: SpanKind,
    attributes: Vec<KeyValue>,
    links: Vec<Link>,
    start_nanos: Option<i64>,
    sampler: Option<Box<dyn ShouldSample>>,
    trace_config: Arc<TraceConfig>,
    span_processor: Arc<dyn SpanProcessor>,
    resource: Arc<Resource>,
    id_generator: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    tracer_stopped: bool,
}

impl fmt::Debug for SpanBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpanBuilder")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("parent", &self.parent)
            .finish()
    }
}

impl SpanBuilder {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: Cow<'static, str>,
        trace_config: Arc<TraceConfig>,
        span_processor: Arc<dyn SpanProcessor>,
        resource: Arc<Resource>,
        id_generator: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
        tracer_stopped: bool,
    ) -> Self {
        SpanBuilder {
            name,
            parent: Parent::default(),
            kind: SpanKind::Internal,
            attributes: Vec::new(),
            links: Vec::new(),
            start_nanos: None,
            sampler: None,
            trace_config,
            span_processor,
            resource,
            id_generator,
            clock,
            tracer_stopped,
        }
    }

    /// Use the given span as the parent.
    pub fn with_parent(mut self, parent: Arc<dyn Span>) -> Self {
        self.parent = Parent::Explicit(parent);
        self
    }

    /// Use the given context as the parent, e.g. one extracted from an
    /// incoming request.
    pub fn with_parent_context(mut self, parent: SpanContext) -> Self {
        self.parent = Parent::Remote(parent);
        self
    }

    /// Make the span a root span, ignoring any ambient current span.
    pub fn with_no_parent(mut self) -> Self {
        self.parent = Parent::NoParent;
        self
    }

    /// Specify the span kind.
    pub fn with_kind(mut self, kind: SpanKind) -> Self {
        self.kind = kind;
        self
    }

    /// Attach initial attributes, recorded before the span is handed out.
    pub fn with_attributes(mut self, attributes: Vec<KeyValue>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Attach initial links.
    pub fn with_links(mut self, links: Vec<Link>) -> Self {
        self.links = links;
        self
    }

    /// Use an explicit start time (a monotonic nanosecond reading) instead
    /// of the clock's current reading.
    pub fn with_start_timestamp(mut self, start_nanos: i64) -> Self {
        self.start_nanos = Some(start_nanos);
        self
    }

    /// Override the config's sampler for this span only.
    pub fn with_sampler<T: ShouldSample + 'static>(mut self, sampler: T) -> Self {
        self.sampler = Some(Box::new(sampler));
        self
    }

    /// Build and start the span.
    ///
    /// Returns an error only for an invalid name. A stopped tracer or a
    /// negative sampling decision yields a no-op span, not an error.
    pub fn start(self) -> TraceResult<Arc<dyn Span>> {
        validate_name(&self.name)?;

        if self.tracer_stopped {
            return Ok(Arc::new(NoopSpan::invalid()));
        }

        let parent_span: Option<Arc<dyn Span>> = match &self.parent {
            Parent::Current => crate::context::current_span(),
            Parent::Explicit(span) => Some(span.clone()),
            Parent::Remote(_) | Parent::NoParent => None,
        };
        let parent_context = match &self.parent {
            Parent::Remote(context) => Some(context.clone()),
            _ => parent_span
                .as_ref()
                .map(|span| span.span_context().clone()),
        }
        .filter(SpanContext::is_valid);

        let span_id = self.id_generator.new_span_id();
        let (trace_id, trace_state) = match &parent_context {
            Some(parent) => (parent.trace_id(), parent.trace_state().clone()),
            None => (self.id_generator.new_trace_id(), TraceState::default()),
        };

        let sampler = self
            .sampler
            .as_deref()
            .unwrap_or_else(|| self.trace_config.sampler.as_ref());
        let sampling_result = sampler.should_sample(
            parent_context.as_ref(),
            trace_id,
            span_id,
            &self.name,
            &self.links,
        );

        let decision = sampling_result.decision;
        let trace_flags = TraceFlags::default().with_sampled(decision.is_sampled());
        let span_context = SpanContext::new(trace_id, span_id, trace_flags, trace_state);

        // A record-only decision still constructs a recording span; only
        // the sampled flag differs, and exporters act on that flag.
        if !decision.is_recording() {
            return Ok(Arc::new(NoopSpan::new(span_context)));
        }

        // A locally recording parent shares its converter so that sibling
        // records keep their monotonic order on the wall clock.
        let parent_recording = parent_span.as_ref().and_then(|span| span.as_recording());
        let timestamp_converter = parent_recording
            .map(|parent| parent.timestamp_converter().clone());

        let mut attributes = self.attributes;
        attributes.extend(sampling_result.attributes);

        let span = RecordingSpan::start(
            span_context,
            self.name,
            self.kind,
            parent_context.as_ref().map(SpanContext::span_id),
            self.trace_config,
            self.span_processor,
            timestamp_converter,
            self.clock,
            self.resource,
            attributes,
            self.links,
            self.start_nanos,
        );

        if let Some(parent) = parent_recording {
            parent.add_child();
        }

        Ok(span)
    }
}

fn validate_name(name: &str) -> TraceResult<()> {
    if name.is_empty() {
        Err(TraceError::InvalidSpanName("name is empty"))
    } else if !name.is_ascii() {
        Err(TraceError::InvalidSpanName("name must be ASCII"))
    } else if name.len() > MAX_SPAN_NAME_BYTES {
        Err(TraceError::InvalidSpanName("name exceeds 255 bytes"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TestClock, TestSpanProcessor};
    use crate::trace::id_generator::RandomIdGenerator;
    use crate::trace::sampler::{Sampler, SamplingDecision, SamplingResult};
    use crate::trace::{SpanId, TraceId};

    fn test_builder(
        name: &'static str,
        config: TraceConfig,
        processor: TestSpanProcessor,
    ) -> SpanBuilder {
        SpanBuilder::new(
            name.into(),
            Arc::new(config),
            Arc::new(processor),
            Arc::new(Resource::empty()),
            Arc::new(RandomIdGenerator::default()),
            Arc::new(TestClock::with_seconds(1000)),
            false,
        )
    }

    #[test]
    fn root_span_allocates_fresh_ids() {
        let span = test_builder("root", TraceConfig::default(), TestSpanProcessor::new())
            .with_no_parent()
            .start()
            .unwrap();
        let context = span.span_context();
        assert!(context.is_valid());
        assert!(context.is_sampled());
        let recording = span.as_recording().unwrap();
        assert!(recording.parent_span_id().is_none());
        span.end();
    }

    #[test]
    fn child_inherits_trace_id_and_state() {
        let processor = TestSpanProcessor::new();
        let parent = test_builder("parent", TraceConfig::default(), processor.clone())
            .with_no_parent()
            .start()
            .unwrap();
        let child = test_builder("child", TraceConfig::default(), processor.clone())
            .with_parent(parent.clone())
            .start()
            .unwrap();

        assert_eq!(
            child.span_context().trace_id(),
            parent.span_context().trace_id()
        );
        assert_ne!(
            child.span_context().span_id(),
            parent.span_context().span_id()
        );
        assert_eq!(
            child.as_recording().unwrap().parent_span_id(),
            Some(parent.span_context().span_id())
        );
        child.end();
        parent.end();
    }

    #[test]
    fn explicit_parent_increments_child_count() {
        let processor = TestSpanProcessor::new();
        let parent = test_builder("parent", TraceConfig::default(), processor.clone())
            .with_no_parent()
            .start()
            .unwrap();
        for _ in 0..3 {
            let child = test_builder("child", TraceConfig::default(), processor.clone())
                .with_parent(parent.clone())
                .start()
                .unwrap();
            child.end();
        }
        parent.end();
        let snapshot = parent.as_recording().unwrap().to_proto();
        assert_eq!(
            snapshot.child_span_count,
            Some(crate::proto::UInt32Value { value: 3 })
        );
    }

    #[test]
    fn ambient_span_is_the_default_parent() {
        let processor = TestSpanProcessor::new();
        let parent = test_builder("parent", TraceConfig::default(), processor.clone())
            .with_no_parent()
            .start()
            .unwrap();
        let _guard = crate::context::mark_span_as_active(parent.clone());

        let child = test_builder("child", TraceConfig::default(), processor.clone())
            .start()
            .unwrap();
        assert_eq!(
            child.span_context().trace_id(),
            parent.span_context().trace_id()
        );
        child.end();
        parent.end();
    }

    #[test]
    fn remote_parent_context_is_inherited_without_child_reporting() {
        let processor = TestSpanProcessor::new();
        let trace_state = TraceState::from_key_value(vec![("foo", "bar")]).unwrap();
        let remote = SpanContext::new(
            TraceId::from(7_u128),
            SpanId::from(8_u64),
            TraceFlags::SAMPLED,
            trace_state,
        );
        let span = test_builder("server", TraceConfig::default(), processor.clone())
            .with_parent_context(remote.clone())
            .with_kind(SpanKind::Server)
            .start()
            .unwrap();

        let context = span.span_context();
        assert_eq!(context.trace_id(), remote.trace_id());
        assert_eq!(context.trace_state().get("foo"), Some("bar"));
        assert_eq!(
            span.as_recording().unwrap().parent_span_id(),
            Some(remote.span_id())
        );
        span.end();
    }

    #[test]
    fn invalid_parent_context_starts_a_new_trace() {
        let span = test_builder("orphan", TraceConfig::default(), TestSpanProcessor::new())
            .with_parent_context(SpanContext::empty_context())
            .start()
            .unwrap();
        assert!(span.span_context().is_valid());
        assert!(span.as_recording().unwrap().parent_span_id().is_none());
        span.end();
    }

    #[test]
    fn rejected_names() {
        for name in ["", "名前"] {
            let result =
                test_builder(name, TraceConfig::default(), TestSpanProcessor::new()).start();
            assert!(matches!(result, Err(TraceError::InvalidSpanName(_))));
        }

        let long_name: &'static str = Box::leak("x".repeat(256).into_boxed_str());
        let result =
            test_builder(long_name, TraceConfig::default(), TestSpanProcessor::new()).start();
        assert!(matches!(result, Err(TraceError::InvalidSpanName(_))));

        let max_name: &'static str = Box::leak("x".repeat(255).into_boxed_str());
        let span = test_builder(max_name, TraceConfig::default(), TestSpanProcessor::new())
            .start()
            .unwrap();
        span.end();
    }

    #[test]
    fn unsampled_spans_are_noops_with_valid_contexts() {
        let processor = TestSpanProcessor::new();
        let span = test_builder(
            "dropped",
            TraceConfig::default().with_sampler(Sampler::AlwaysOff),
            processor.clone(),
        )
        .with_no_parent()
        .start()
        .unwrap();

        assert!(!span.is_recording());
        assert!(span.span_context().is_valid());
        assert!(!span.span_context().is_sampled());
        span.end();
        assert_eq!(processor.start_count(), 0);
        assert_eq!(processor.end_count(), 0);
    }

    #[test]
    fn record_only_spans_record_without_the_sampled_flag() {
        #[derive(Clone, Debug)]
        struct RecordOnlySampler;

        impl ShouldSample for RecordOnlySampler {
            fn should_sample(
                &self,
                _parent_context: Option<&SpanContext>,
                _trace_id: TraceId,
                _span_id: SpanId,
                _name: &str,
                _links: &[Link],
            ) -> SamplingResult {
                SamplingResult::new(SamplingDecision::RecordOnly)
            }
        }

        let processor = TestSpanProcessor::new();
        let span = test_builder(
            "observed",
            TraceConfig::default().with_sampler(RecordOnlySampler),
            processor.clone(),
        )
        .with_no_parent()
        .start()
        .unwrap();

        // The span records in-process and reaches the processors, but its
        // context is not marked sampled.
        assert!(span.is_recording());
        assert!(span.span_context().is_valid());
        assert!(!span.span_context().is_sampled());
        assert_eq!(processor.start_count(), 1);
        span.end();
        assert_eq!(processor.end_count(), 1);
    }

    #[test]
    fn parent_based_sampler_follows_parent_decision() {
        let processor = TestSpanProcessor::new();
        let unsampled_parent = SpanContext::new(
            TraceId::from(9_u128),
            SpanId::from(9_u64),
            TraceFlags::NOT_SAMPLED,
            TraceState::default(),
        );
        let span = test_builder("child", TraceConfig::default(), processor.clone())
            .with_parent_context(unsampled_parent)
            .start()
            .unwrap();
        assert!(!span.is_recording());
        assert!(!span.span_context().is_sampled());
    }

    #[test]
    fn builder_sampler_overrides_config_sampler() {
        let processor = TestSpanProcessor::new();
        let span = test_builder(
            "forced",
            TraceConfig::default().with_sampler(Sampler::AlwaysOff),
            processor.clone(),
        )
        .with_no_parent()
        .with_sampler(Sampler::AlwaysOn)
        .start()
        .unwrap();
        assert!(span.is_recording());
        span.end();
        assert_eq!(processor.end_count(), 1);
    }

    #[test]
    fn sampler_attributes_are_merged() {
        #[derive(Clone, Debug)]
        struct AnnotatingSampler;

        impl ShouldSample for AnnotatingSampler {
            fn should_sample(
                &self,
                _parent_context: Option<&SpanContext>,
                _trace_id: TraceId,
                _span_id: SpanId,
                _name: &str,
                _links: &[Link],
            ) -> SamplingResult {
                SamplingResult {
                    decision: SamplingDecision::RecordAndSample,
                    attributes: vec![KeyValue::new("sampler.rule", "annotate")],
                }
            }
        }

        let span = test_builder("annotated", TraceConfig::default(), TestSpanProcessor::new())
            .with_no_parent()
            .with_sampler(AnnotatingSampler)
            .with_attributes(vec![KeyValue::new("caller", "test")])
            .start()
            .unwrap();
        span.end();
        let attributes = span.as_recording().unwrap().to_proto().attributes.unwrap();
        assert_eq!(attributes.attribute_map.len(), 2);
        assert!(attributes.attribute_map.contains_key("sampler.rule"));
        assert!(attributes.attribute_map.contains_key("caller"));
    }

    #[test]
    fn initial_links_respect_caps() {
        let processor = TestSpanProcessor::new();
        let links: Vec<Link> = (0..4)
            .map(|i| {
                Link::with_context(SpanContext::new(
                    TraceId::from(100 + i as u128),
                    SpanId::from(100 + i as u64),
                    TraceFlags::default(),
                    TraceState::default(),
                ))
            })
            .collect();
        let span = test_builder(
            "linked",
            TraceConfig::default().with_max_links_per_span(2),
            processor.clone(),
        )
        .with_no_parent()
        .with_links(links)
        .start()
        .unwrap();
        span.end();
        let snapshot = span.as_recording().unwrap().to_proto();
        let links = snapshot.links.unwrap();
        assert_eq!(links.link.len(), 2);
        assert_eq!(links.dropped_links_count, 2);
    }

    #[test]
    fn explicit_start_timestamp() {
        let processor = TestSpanProcessor::new();
        let span = test_builder("timed", TraceConfig::default(), processor.clone())
            .with_no_parent()
            .with_start_timestamp(995 * crate::time::NANOS_PER_SECOND)
            .start()
            .unwrap();
        span.end();
        let snapshot = span.as_recording().unwrap().to_proto();
        assert_eq!(snapshot.start_time.unwrap().seconds, 995);
        assert_eq!(snapshot.end_time.unwrap().seconds, 1000);
    }

    #[test]
    fn stopped_tracer_produces_noop_spans() {
        let processor = TestSpanProcessor::new();
        let builder = SpanBuilder::new(
            "late".into(),
            Arc::new(TraceConfig::default()),
            Arc::new(processor.clone()),
            Arc::new(Resource::empty()),
            Arc::new(RandomIdGenerator::default()),
            Arc::new(TestClock::with_seconds(1000)),
            true,
        );
        let span = builder.start().unwrap();
        assert!(!span.is_recording());
        assert!(!span.span_context().is_valid());
        assert_eq!(processor.start_count(), 0);
    }

    #[test]
    fn processor_sees_start_before_end() {
        let processor = TestSpanProcessor::new();
        let span = test_builder("ordered", TraceConfig::default(), processor.clone())
            .with_no_parent()
            .start()
            .unwrap();
        assert_eq!(processor.start_count(), 1);
        assert_eq!(processor.end_count(), 0);
        span.end();
        assert_eq!(processor.end_count(), 1);
    }
}
