use crate::KeyValue;
use std::borrow::Cow;

/// A named annotation that can be added to a span.
///
/// The moment an event is recorded is attached by the span itself, from its
/// clock, producing a [`TimedEvent`].
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    /// Event name
    pub name: Cow<'static, str>,
    /// Event attributes
    pub attributes: Vec<KeyValue>,
}

impl Event {
    /// Create a new `Event` with attributes.
    pub fn new<T: Into<Cow<'static, str>>>(name: T, attributes: Vec<KeyValue>) -> Self {
        Event {
            name: name.into(),
            attributes,
        }
    }

    /// Create a new `Event` without attributes.
    pub fn with_name<T: Into<Cow<'static, str>>>(name: T) -> Self {
        Event {
            name: name.into(),
            attributes: Vec::new(),
        }
    }
}

/// An [`Event`] paired with the monotonic nanosecond reading at which it was
/// recorded.
#[derive(Clone, Debug, PartialEq)]
pub struct TimedEvent {
    /// Monotonic reading taken when the event was recorded.
    pub nanos: i64,
    /// The recorded event.
    pub event: Event,
}

impl TimedEvent {
    /// Create a new `TimedEvent` from a monotonic reading and an event.
    pub fn new(nanos: i64, event: Event) -> Self {
        TimedEvent { nanos, event }
    }
}
