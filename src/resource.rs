//! Representations of entities producing telemetry.
//!
//! A [`Resource`] is an immutable set of string labels describing the
//! process that emits spans, for example the service name or the host. It
//! is supplied to the tracer at construction and attached verbatim to every
//! span snapshot.

use std::collections::BTreeMap;
use std::env;

/// Environment variable holding resource labels as comma-separated
/// `key=value` pairs.
const RESOURCE_LABELS_ENV: &str = "TRACEKIT_RESOURCE_LABELS";

/// Environment variable naming the service. Takes precedence over a
/// `service.name` entry in [`RESOURCE_LABELS_ENV`].
const SERVICE_NAME_ENV: &str = "TRACEKIT_SERVICE_NAME";

/// The label under which the service name is recorded.
const SERVICE_NAME_KEY: &str = "service.name";

/// An immutable set of labels describing the entity that produces spans.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resource {
    labels: BTreeMap<String, String>,
}

impl Resource {
    /// A resource with no labels.
    pub fn empty() -> Self {
        Resource::default()
    }

    /// Create a resource from the given labels.
    pub fn new<K, V, T>(labels: T) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        T: IntoIterator<Item = (K, V)>,
    {
        Resource {
            labels: labels
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Create a resource from the environment.
    ///
    /// `TRACEKIT_RESOURCE_LABELS` supplies general labels as comma-separated
    /// `key=value` pairs, e.g. `service.name=checkout,service.version=1.4.2`;
    /// malformed entries are skipped with a warning. `TRACEKIT_SERVICE_NAME`
    /// supplies the service name alone and takes precedence over a
    /// `service.name` label.
    pub fn from_env() -> Self {
        let mut labels = BTreeMap::new();
        if let Ok(raw) = env::var(RESOURCE_LABELS_ENV) {
            for entry in raw.split(',') {
                let entry = entry.trim();
                if entry.is_empty() {
                    continue;
                }
                match entry.split_once('=') {
                    Some((key, value)) if !key.is_empty() => {
                        labels.insert(key.trim().to_owned(), value.trim().to_owned());
                    }
                    _ => {
                        crate::tracekit_warn!(
                            name: "resource_label_malformed",
                            entry = entry,
                        );
                    }
                }
            }
        }
        if let Ok(service_name) = env::var(SERVICE_NAME_ENV) {
            if !service_name.is_empty() {
                labels.insert(SERVICE_NAME_KEY.to_owned(), service_name);
            }
        }
        Resource { labels }
    }

    /// Returns the label value for the given key, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    /// Iterate over the labels in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.labels.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The number of labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the resource carries no labels.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
