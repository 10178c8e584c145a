//! Conversions from the in-memory span representation into wire-format
//! messages.

use crate::proto;
use crate::time::TimestampConverter;
use crate::trace::{
    EvictedHashMap, EvictedQueue, Link, SpanKind, Status, TimedEvent, TraceState,
};
use crate::{KeyValue, Resource, Value};
use std::collections::BTreeMap;

impl From<SpanKind> for proto::span::SpanKind {
    fn from(kind: SpanKind) -> Self {
        match kind {
            SpanKind::Internal => proto::span::SpanKind::Internal,
            SpanKind::Server => proto::span::SpanKind::Server,
            SpanKind::Client => proto::span::SpanKind::Client,
            SpanKind::Producer => proto::span::SpanKind::Producer,
            SpanKind::Consumer => proto::span::SpanKind::Consumer,
        }
    }
}

impl From<&Value> for proto::AttributeValue {
    fn from(value: &Value) -> Self {
        let value = match value {
            Value::Bool(v) => proto::attribute_value::Value::BoolValue(*v),
            Value::I64(v) => proto::attribute_value::Value::IntValue(*v),
            Value::F64(v) => proto::attribute_value::Value::DoubleValue(*v),
            Value::String(v) => proto::attribute_value::Value::StringValue(v.to_string()),
        };
        proto::AttributeValue { value: Some(value) }
    }
}

impl From<&Status> for proto::Status {
    fn from(status: &Status) -> Self {
        proto::Status {
            code: status.code as i32,
            message: status
                .description
                .as_ref()
                .map(|description| description.to_string())
                .unwrap_or_default(),
        }
    }
}

impl From<&TraceState> for proto::span::Tracestate {
    fn from(trace_state: &TraceState) -> Self {
        proto::span::Tracestate {
            entries: trace_state
                .entries()
                .map(|(key, value)| proto::span::tracestate::Entry {
                    key: key.to_owned(),
                    value: value.to_owned(),
                })
                .collect(),
        }
    }
}

impl From<&Resource> for proto::Resource {
    fn from(resource: &Resource) -> Self {
        proto::Resource {
            labels: resource
                .iter()
                .map(|(key, value)| (key.to_owned(), value.to_owned()))
                .collect(),
        }
    }
}

/// Convert a span's capped attribute map, deriving the dropped count from
/// its running total.
pub(crate) fn span_attributes(attributes: &EvictedHashMap) -> proto::span::Attributes {
    proto::span::Attributes {
        attribute_map: attributes
            .iter()
            .map(|(key, value)| (key.as_str().to_owned(), value.into()))
            .collect(),
        dropped_attributes_count: attributes.dropped_count(),
    }
}

/// Convert an event or link attribute list. These lists are not bounded by
/// the span, so their dropped count is always zero.
pub(crate) fn attribute_list(attributes: &[KeyValue]) -> proto::span::Attributes {
    let mut attribute_map = BTreeMap::new();
    for attribute in attributes {
        attribute_map.insert(
            attribute.key.as_str().to_owned(),
            proto::AttributeValue::from(&attribute.value),
        );
    }
    proto::span::Attributes {
        attribute_map,
        dropped_attributes_count: 0,
    }
}

/// Convert a span's event queue, rendering each monotonic reading through
/// the span's timestamp converter.
pub(crate) fn timed_events(
    events: &EvictedQueue<TimedEvent>,
    converter: &TimestampConverter,
) -> proto::span::TimedEvents {
    proto::span::TimedEvents {
        timed_event: events
            .iter()
            .map(|timed_event| proto::span::TimedEvent {
                time: Some(converter.convert_nanos(timed_event.nanos)),
                event: Some(proto::span::Event {
                    name: timed_event.event.name.to_string(),
                    attributes: if timed_event.event.attributes.is_empty() {
                        None
                    } else {
                        Some(attribute_list(&timed_event.event.attributes))
                    },
                }),
            })
            .collect(),
        dropped_timed_events_count: events.dropped_count(),
    }
}

/// Convert a span's link queue.
pub(crate) fn links(links: &EvictedQueue<Link>) -> proto::span::Links {
    proto::span::Links {
        link: links
            .iter()
            .map(|link| proto::span::Link {
                trace_id: link.span_context.trace_id().to_bytes().to_vec(),
                span_id: link.span_context.span_id().to_bytes().to_vec(),
                tracestate: Some(link.span_context.trace_state().into()),
                attributes: if link.attributes.is_empty() {
                    None
                } else {
                    Some(attribute_list(&link.attributes))
                },
            })
            .collect(),
        dropped_links_count: links.dropped_count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Clock;
    use crate::trace::{Event, SpanContext, SpanId, StatusCode, TraceFlags, TraceId};

    #[test]
    fn value_oneofs() {
        assert_eq!(
            proto::AttributeValue::from(&Value::Bool(true)).value,
            Some(proto::attribute_value::Value::BoolValue(true))
        );
        assert_eq!(
            proto::AttributeValue::from(&Value::I64(-3)).value,
            Some(proto::attribute_value::Value::IntValue(-3))
        );
        assert_eq!(
            proto::AttributeValue::from(&Value::F64(0.25)).value,
            Some(proto::attribute_value::Value::DoubleValue(0.25))
        );
        assert_eq!(
            proto::AttributeValue::from(&Value::String("s".into())).value,
            Some(proto::attribute_value::Value::StringValue("s".to_owned()))
        );
    }

    #[test]
    fn status_codes_and_messages() {
        let status: proto::Status = (&Status::OK).into();
        assert_eq!(status.code, 0);
        assert_eq!(status.message, "");

        let status: proto::Status =
            (&Status::new(StatusCode::DeadlineExceeded).with_description("took too long")).into();
        assert_eq!(status.code, 4);
        assert_eq!(status.message, "took too long");
    }

    #[test]
    fn kind_ordinals() {
        assert_eq!(proto::span::SpanKind::from(SpanKind::Internal) as i32, 1);
        assert_eq!(proto::span::SpanKind::from(SpanKind::Server) as i32, 2);
        assert_eq!(proto::span::SpanKind::from(SpanKind::Client) as i32, 3);
        assert_eq!(proto::span::SpanKind::from(SpanKind::Producer) as i32, 4);
        assert_eq!(proto::span::SpanKind::from(SpanKind::Consumer) as i32, 5);
    }

    #[test]
    fn span_attributes_carry_dropped_count() {
        let mut attributes = EvictedHashMap::new(1);
        attributes.insert(KeyValue::new("a", 1_i64));
        attributes.insert(KeyValue::new("b", 2_i64));
        let converted = span_attributes(&attributes);
        assert_eq!(converted.attribute_map.len(), 1);
        assert_eq!(converted.dropped_attributes_count, 1);
    }

    #[test]
    fn links_carry_contexts_and_dropped_count() {
        let context = SpanContext::new(
            TraceId::from(10_u128),
            SpanId::from(20_u64),
            TraceFlags::default(),
            TraceState::default(),
        );
        let mut queue = EvictedQueue::new(1);
        queue.push_back(Link::with_context(context.clone()));
        queue.push_back(Link::new(context.clone(), vec![KeyValue::new("k", "v")]));

        let converted = links(&queue);
        assert_eq!(converted.dropped_links_count, 1);
        assert_eq!(converted.link.len(), 1);
        let link = &converted.link[0];
        assert_eq!(link.trace_id, context.trace_id().to_bytes().to_vec());
        assert_eq!(link.span_id, context.span_id().to_bytes().to_vec());
        assert_eq!(link.attributes.as_ref().unwrap().attribute_map.len(), 1);
    }

    #[test]
    fn empty_event_attributes_are_absent_on_the_wire() {
        let clock = crate::testing::TestClock::with_seconds(1);
        let converter = TimestampConverter::now(&clock);
        let mut queue = EvictedQueue::new(4);
        queue.push_back(TimedEvent::new(clock.now_nanos(), Event::with_name("bare")));

        let converted = timed_events(&queue, &converter);
        assert_eq!(converted.timed_event.len(), 1);
        let event = converted.timed_event[0].event.as_ref().unwrap();
        assert_eq!(event.name, "bare");
        assert!(event.attributes.is_none());
    }
}
