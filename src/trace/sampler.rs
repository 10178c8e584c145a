//! Sampling decisions for new spans.
//!
//! Samplers see the would-be span's parent context, proposed ids, name, and
//! proposed links, and decide what the span should do. The decision is
//! consumed by the span builder; it never changes after the span exists.

use crate::trace::{Link, SpanContext, SpanId, TraceId};
use crate::KeyValue;
use std::fmt;

/// What a new span should do, as decided by a sampler.
///
/// The middle state exists for consumers that want every span record
/// in-process (live introspection, tail-based decisions) without exporting
/// all of them: a record-only span records and reaches the processors, but
/// its sampled flag stays clear, so flag-respecting exporters skip it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SamplingDecision {
    /// Do not record the span. The builder hands out a no-op span.
    Drop,
    /// Record the span in-process but leave the sampled flag clear.
    RecordOnly,
    /// Record the span and set the sampled flag.
    RecordAndSample,
}

impl SamplingDecision {
    /// Whether this decision produces a recording span.
    pub fn is_recording(&self) -> bool {
        matches!(
            self,
            SamplingDecision::RecordOnly | SamplingDecision::RecordAndSample
        )
    }

    /// Whether this decision sets the sampled trace flag.
    pub fn is_sampled(&self) -> bool {
        matches!(self, SamplingDecision::RecordAndSample)
    }
}

/// The result of consulting a sampler.
#[derive(Clone, Debug)]
pub struct SamplingResult {
    /// What the span should do.
    pub decision: SamplingDecision,
    /// Extra attributes the sampler wants attached to the span. Merged
    /// through the same capped path as caller-supplied attributes.
    pub attributes: Vec<KeyValue>,
}

impl SamplingResult {
    /// A result carrying the given decision and no extra attributes.
    pub fn new(decision: SamplingDecision) -> Self {
        SamplingResult {
            decision,
            attributes: Vec::new(),
        }
    }
}

/// The interface for sampling strategies.
///
/// A sampler is consulted once per span, before the span exists, with the
/// information available at build time.
pub trait ShouldSample: CloneShouldSample + Send + Sync + fmt::Debug {
    /// Returns the sampling decision for a span about to be created.
    fn should_sample(
        &self,
        parent_context: Option<&SpanContext>,
        trace_id: TraceId,
        span_id: SpanId,
        name: &str,
        links: &[Link],
    ) -> SamplingResult;
}

/// This trait should not be used directly; implement [`ShouldSample`] and
/// `Clone` instead.
pub trait CloneShouldSample {
    /// Clone the sampler into a box.
    fn box_clone(&self) -> Box<dyn ShouldSample>;
}

impl<T> CloneShouldSample for T
where
    T: ShouldSample + Clone + 'static,
{
    fn box_clone(&self) -> Box<dyn ShouldSample> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn ShouldSample> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Built-in sampling strategies.
///
/// For more elaborate policies implement [`ShouldSample`] directly.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum Sampler {
    /// Always sample.
    AlwaysOn,
    /// Never sample.
    AlwaysOff,
    /// Respect the parent span's sampling decision, delegating to the inner
    /// sampler for root spans.
    ParentBased(Box<dyn ShouldSample>),
    /// Sample a given fraction of traces, keyed off the trace id so every
    /// span of a trace gets the same decision. Fractions >= 1 always
    /// sample; fractions <= 0 never sample.
    TraceIdRatioBased(f64),
}

impl ShouldSample for Sampler {
    fn should_sample(
        &self,
        parent_context: Option<&SpanContext>,
        trace_id: TraceId,
        span_id: SpanId,
        name: &str,
        links: &[Link],
    ) -> SamplingResult {
        let decision = match self {
            Sampler::AlwaysOn => SamplingDecision::RecordAndSample,
            Sampler::AlwaysOff => SamplingDecision::Drop,
            Sampler::ParentBased(delegate) => match parent_context.filter(|cx| cx.is_valid()) {
                Some(parent) => {
                    if parent.is_sampled() {
                        SamplingDecision::RecordAndSample
                    } else {
                        SamplingDecision::Drop
                    }
                }
                None => {
                    delegate
                        .should_sample(parent_context, trace_id, span_id, name, links)
                        .decision
                }
            },
            Sampler::TraceIdRatioBased(fraction) => {
                if sample_based_on_probability(fraction, trace_id) {
                    SamplingDecision::RecordAndSample
                } else {
                    SamplingDecision::Drop
                }
            }
        };
        SamplingResult::new(decision)
    }
}

pub(crate) fn sample_based_on_probability(prob: &f64, trace_id: TraceId) -> bool {
    if *prob >= 1.0 {
        true
    } else {
        let prob_upper_bound = (prob.max(0.0) * (1u64 << 63) as f64) as u64;
        let bytes = trace_id.to_bytes();
        let (_, low) = bytes.split_at(8);
        let trace_id_low = u64::from_be_bytes(low.try_into().unwrap());
        let rnd_from_trace_id = trace_id_low >> 1;

        rnd_from_trace_id < prob_upper_bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{TraceFlags, TraceState};
    use rand::Rng;

    fn parent_context(sampled: bool) -> SpanContext {
        SpanContext::new(
            TraceId::from(1_u128),
            SpanId::from(1_u64),
            TraceFlags::default().with_sampled(sampled),
            TraceState::default(),
        )
    }

    fn decide(
        sampler: &Sampler,
        parent: Option<&SpanContext>,
        trace_id: TraceId,
    ) -> SamplingDecision {
        sampler
            .should_sample(parent, trace_id, SpanId::from(2_u64), "test", &[])
            .decision
    }

    #[test]
    fn decision_predicates() {
        assert!(!SamplingDecision::Drop.is_recording());
        assert!(!SamplingDecision::Drop.is_sampled());
        assert!(SamplingDecision::RecordOnly.is_recording());
        assert!(!SamplingDecision::RecordOnly.is_sampled());
        assert!(SamplingDecision::RecordAndSample.is_recording());
        assert!(SamplingDecision::RecordAndSample.is_sampled());
    }

    #[test]
    fn static_samplers() {
        let trace_id = TraceId::from(7_u128);
        assert!(decide(&Sampler::AlwaysOn, None, trace_id).is_sampled());
        assert!(!decide(&Sampler::AlwaysOff, None, trace_id).is_recording());
        // Static samplers ignore the parent decision entirely.
        assert!(decide(
            &Sampler::AlwaysOn,
            Some(&parent_context(false)),
            trace_id
        )
        .is_sampled());
        assert!(!decide(
            &Sampler::AlwaysOff,
            Some(&parent_context(true)),
            trace_id
        )
        .is_recording());
    }

    #[test]
    fn parent_based_follows_parent() {
        let sampler = Sampler::ParentBased(Box::new(Sampler::AlwaysOn));
        let trace_id = TraceId::from(7_u128);
        assert!(decide(&sampler, Some(&parent_context(true)), trace_id).is_sampled());
        assert!(!decide(&sampler, Some(&parent_context(false)), trace_id).is_recording());
    }

    #[test]
    fn parent_based_delegates_for_roots() {
        let trace_id = TraceId::from(7_u128);
        assert!(decide(
            &Sampler::ParentBased(Box::new(Sampler::AlwaysOn)),
            None,
            trace_id
        )
        .is_sampled());
        assert!(!decide(
            &Sampler::ParentBased(Box::new(Sampler::AlwaysOff)),
            None,
            trace_id
        )
        .is_recording());
    }

    #[test]
    fn parent_based_treats_invalid_parent_as_root() {
        let sampler = Sampler::ParentBased(Box::new(Sampler::AlwaysOff));
        assert!(!decide(
            &sampler,
            Some(&SpanContext::empty_context()),
            TraceId::from(7_u128)
        )
        .is_recording());
    }

    #[test]
    fn ratio_sampler_bounds() {
        let trace_id = TraceId::from(0x1234_5678_u128);
        assert!(decide(&Sampler::TraceIdRatioBased(1.0), None, trace_id).is_sampled());
        assert!(!decide(&Sampler::TraceIdRatioBased(0.0), None, trace_id).is_recording());
        assert!(!decide(&Sampler::TraceIdRatioBased(-1.0), None, trace_id).is_recording());
    }

    #[test]
    fn ratio_sampler_roughly_matches_fraction() {
        let sampler = Sampler::TraceIdRatioBased(0.5);
        let mut rng = rand::thread_rng();
        let total = 10_000;
        let mut sampled = 0;
        for _ in 0..total {
            if decide(&sampler, None, TraceId::from(rng.gen::<u128>())).is_sampled() {
                sampled += 1;
            }
        }
        let observed = sampled as f64 / total as f64;
        assert!((observed - 0.5).abs() < 0.05, "observed {}", observed);
    }
}
