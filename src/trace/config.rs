//! Tracer configuration.
//!
//! A [`TraceConfig`] is an immutable snapshot of the sampling strategy and
//! the per-span collection caps. The tracer holds the active config behind
//! an atomically replaceable reference; span builders capture the reference
//! once, so a config rotation never splits a single span across configs.

use crate::trace::{Sampler, ShouldSample};
use std::env;
use std::str::FromStr;

const MAX_ATTRIBUTES_ENV: &str = "TRACEKIT_SPAN_ATTRIBUTE_COUNT_LIMIT";
const MAX_EVENTS_ENV: &str = "TRACEKIT_SPAN_EVENT_COUNT_LIMIT";
const MAX_LINKS_ENV: &str = "TRACEKIT_SPAN_LINK_COUNT_LIMIT";

pub(crate) const DEFAULT_MAX_ATTRIBUTES_PER_SPAN: u32 = 32;
pub(crate) const DEFAULT_MAX_EVENTS_PER_SPAN: u32 = 128;
pub(crate) const DEFAULT_MAX_LINKS_PER_SPAN: u32 = 32;

/// Immutable tracing configuration: sampler plus per-span caps.
#[derive(Debug)]
pub struct TraceConfig {
    /// The sampler consulted for every new span.
    pub sampler: Box<dyn ShouldSample>,

    /// The maximum number of attributes retained per span.
    pub max_attributes_per_span: u32,

    /// The maximum number of events retained per span.
    pub max_events_per_span: u32,

    /// The maximum number of links retained per span.
    pub max_links_per_span: u32,
}

impl TraceConfig {
    /// Specify the sampler to be used.
    pub fn with_sampler<T: ShouldSample + 'static>(mut self, sampler: T) -> Self {
        self.sampler = Box::new(sampler);
        self
    }

    /// Specify the number of attributes to be retained per span.
    pub fn with_max_attributes_per_span(mut self, max_attributes: u32) -> Self {
        self.max_attributes_per_span = max_attributes;
        self
    }

    /// Specify the number of events to be retained per span.
    pub fn with_max_events_per_span(mut self, max_events: u32) -> Self {
        self.max_events_per_span = max_events;
        self
    }

    /// Specify the number of links to be retained per span.
    pub fn with_max_links_per_span(mut self, max_links: u32) -> Self {
        self.max_links_per_span = max_links;
        self
    }
}

impl Default for TraceConfig {
    /// The default configuration: a parent-based sampler that samples every
    /// root span, and the standard caps (32 attributes, 128 events, 32
    /// links), each overridable from the environment.
    fn default() -> Self {
        let mut config = TraceConfig {
            sampler: Box::new(Sampler::ParentBased(Box::new(Sampler::AlwaysOn))),
            max_attributes_per_span: DEFAULT_MAX_ATTRIBUTES_PER_SPAN,
            max_events_per_span: DEFAULT_MAX_EVENTS_PER_SPAN,
            max_links_per_span: DEFAULT_MAX_LINKS_PER_SPAN,
        };

        if let Some(max_attributes_per_span) = positive_limit_from_env(MAX_ATTRIBUTES_ENV) {
            config.max_attributes_per_span = max_attributes_per_span;
        }

        if let Some(max_events_per_span) = positive_limit_from_env(MAX_EVENTS_ENV) {
            config.max_events_per_span = max_events_per_span;
        }

        if let Some(max_links_per_span) = positive_limit_from_env(MAX_LINKS_ENV) {
            config.max_links_per_span = max_links_per_span;
        }

        config
    }
}

fn positive_limit_from_env(var: &str) -> Option<u32> {
    let raw = env::var(var).ok()?;
    match u32::from_str(&raw) {
        Ok(limit) if limit > 0 => Some(limit),
        _ => {
            crate::tracekit_warn!(
                name: "trace_config_invalid_limit",
                variable = var,
                value = raw.as_str(),
            );
            None
        }
    }
}
