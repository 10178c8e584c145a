/// A point in time expressed as wall-clock seconds and nanoseconds since the
/// Unix epoch. Mirrors `google.protobuf.Timestamp`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Timestamp {
    /// Represents seconds of UTC time since Unix epoch.
    #[prost(int64, tag = "1")]
    pub seconds: i64,
    /// Non-negative fractions of a second at nanosecond resolution.
    #[prost(int32, tag = "2")]
    pub nanos: i32,
}

/// Wrapper message for `uint32`, so that an unset count can be told apart
/// from an explicit zero. Mirrors `google.protobuf.UInt32Value`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UInt32Value {
    /// The uint32 value.
    #[prost(uint32, tag = "1")]
    pub value: u32,
}

/// The value of an attribute. A oneof over the supported scalar types.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AttributeValue {
    /// The type of the value.
    #[prost(oneof = "attribute_value::Value", tags = "1, 2, 3, 4")]
    pub value: ::core::option::Option<attribute_value::Value>,
}
/// Nested message and enum types in `AttributeValue`.
pub mod attribute_value {
    /// The type of the value.
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Value {
        /// A string value.
        #[prost(string, tag = "1")]
        StringValue(::prost::alloc::string::String),
        /// An integer value.
        #[prost(int64, tag = "2")]
        IntValue(i64),
        /// A double value.
        #[prost(double, tag = "3")]
        DoubleValue(f64),
        /// A boolean value.
        #[prost(bool, tag = "4")]
        BoolValue(bool),
    }
}

/// The resource information describing the entity that produced a span, as
/// a set of string labels.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Resource {
    /// Set of labels that describe the resource.
    #[prost(btree_map = "string, string", tag = "1")]
    pub labels: ::prost::alloc::collections::BTreeMap<
        ::prost::alloc::string::String,
        ::prost::alloc::string::String,
    >,
}

/// The `Status` type defines a logical error model. Contains a canonical
/// status code and an optional developer-facing message.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Status {
    /// The status code.
    #[prost(int32, tag = "1")]
    pub code: i32,
    /// A developer-facing error message in English.
    #[prost(string, tag = "2")]
    pub message: ::prost::alloc::string::String,
}

/// A span represents a single operation within a trace. Spans can be
/// nested to form a trace tree. Often, a trace contains a root span
/// that describes the end-to-end latency, and one or more subspans for
/// its sub-operations. A trace can also contain multiple root spans,
/// or none at all. Spans do not need to be contiguous - there may be
/// gaps or overlaps between spans in a trace.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Span {
    /// A unique identifier for a trace. All spans from the same trace share
    /// the same `trace_id`. The ID is a 16-byte array.
    ///
    /// This field is required.
    #[prost(bytes = "vec", tag = "1")]
    pub trace_id: ::prost::alloc::vec::Vec<u8>,
    /// A unique identifier for a span within a trace, assigned when the span
    /// is created. The ID is an 8-byte array.
    ///
    /// This field is required.
    #[prost(bytes = "vec", tag = "2")]
    pub span_id: ::prost::alloc::vec::Vec<u8>,
    /// Conveys information about request position in multiple distributed
    /// tracing graphs. This field is optional.
    #[prost(message, optional, tag = "3")]
    pub tracestate: ::core::option::Option<span::Tracestate>,
    /// The `span_id` of this span's parent span. If this is a root span, then
    /// this field must be empty. The ID is an 8-byte array.
    #[prost(bytes = "vec", tag = "4")]
    pub parent_span_id: ::prost::alloc::vec::Vec<u8>,
    /// A description of the span's operation.
    ///
    /// This field is required.
    #[prost(string, tag = "5")]
    pub name: ::prost::alloc::string::String,
    /// Distinguishes between spans generated in a particular context.
    #[prost(enumeration = "span::SpanKind", tag = "6")]
    pub kind: i32,
    /// The start time of the span.
    ///
    /// This field is required.
    #[prost(message, optional, tag = "7")]
    pub start_time: ::core::option::Option<Timestamp>,
    /// The end time of the span. For an in-flight snapshot this is the time
    /// the snapshot was taken.
    ///
    /// This field is required.
    #[prost(message, optional, tag = "8")]
    pub end_time: ::core::option::Option<Timestamp>,
    /// A set of attributes on the span.
    #[prost(message, optional, tag = "9")]
    pub attributes: ::core::option::Option<span::Attributes>,
    /// The included timed events.
    #[prost(message, optional, tag = "11")]
    pub time_events: ::core::option::Option<span::TimedEvents>,
    /// The included links.
    #[prost(message, optional, tag = "12")]
    pub links: ::core::option::Option<span::Links>,
    /// An optional final status for this span. Only present on snapshots of
    /// ended spans.
    #[prost(message, optional, tag = "13")]
    pub status: ::core::option::Option<Status>,
    /// An optional number of child spans that were generated while this span
    /// was active.
    #[prost(message, optional, tag = "14")]
    pub child_span_count: ::core::option::Option<UInt32Value>,
    /// The resource that produced this span.
    #[prost(message, optional, tag = "15")]
    pub resource: ::core::option::Option<Resource>,
}
/// Nested message and enum types in `Span`.
pub mod span {
    /// This field conveys information about request position in multiple
    /// distributed tracing graphs. There can be a maximum of 32 members in
    /// the list.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Tracestate {
        /// A list of entries that comprise the Tracestate.
        #[prost(message, repeated, tag = "1")]
        pub entries: ::prost::alloc::vec::Vec<tracestate::Entry>,
    }
    /// Nested message and enum types in `Tracestate`.
    pub mod tracestate {
        /// A single Tracestate entry.
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Entry {
            /// The key must begin with a lowercase letter, and can only
            /// contain lowercase letters 'a'-'z', digits '0'-'9', underscores
            /// '_', dashes '-', asterisks '*', and forward slashes '/'.
            #[prost(string, tag = "1")]
            pub key: ::prost::alloc::string::String,
            /// The value is opaque string up to 256 characters printable
            /// ASCII RFC0020 characters (i.e., the range 0x20 to 0x7E)
            /// except ',' and '='.
            #[prost(string, tag = "2")]
            pub value: ::prost::alloc::string::String,
        }
    }
    /// A set of attributes, each with a key and a value.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Attributes {
        /// The set of attributes. Each attribute's key can be up to 128
        /// bytes long.
        #[prost(btree_map = "string, message", tag = "1")]
        pub attribute_map: ::prost::alloc::collections::BTreeMap<
            ::prost::alloc::string::String,
            super::AttributeValue,
        >,
        /// The number of attributes that were discarded. Attributes can be
        /// discarded because their keys are too long or because there are
        /// too many attributes. If this value is 0, then no attributes were
        /// dropped.
        #[prost(uint32, tag = "2")]
        pub dropped_attributes_count: u32,
    }
    /// A text annotation with a set of attributes.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Event {
        /// A user-supplied name describing the event.
        #[prost(string, tag = "1")]
        pub name: ::prost::alloc::string::String,
        /// A set of attributes on the event.
        #[prost(message, optional, tag = "2")]
        pub attributes: ::core::option::Option<Attributes>,
    }
    /// A timed event consists of a time the event happened and the
    /// description of the event.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct TimedEvent {
        /// The time the event occurred.
        #[prost(message, optional, tag = "1")]
        pub time: ::core::option::Option<super::Timestamp>,
        /// The description of the event.
        #[prost(message, optional, tag = "2")]
        pub event: ::core::option::Option<Event>,
    }
    /// A collection of `TimedEvent`s together with a count of dropped
    /// events.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct TimedEvents {
        /// A collection of `TimedEvent`s.
        #[prost(message, repeated, tag = "1")]
        pub timed_event: ::prost::alloc::vec::Vec<TimedEvent>,
        /// The number of dropped timed events. If the value is 0, then no
        /// events were dropped.
        #[prost(uint32, tag = "2")]
        pub dropped_timed_events_count: u32,
    }
    /// A pointer from the current span to another span in the same trace or
    /// in a different trace. For example, this can be used in batching
    /// operations, where a single batch handler processes multiple requests
    /// from different traces.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Link {
        /// A unique identifier of a trace that this linked span is part of.
        /// The ID is a 16-byte array.
        #[prost(bytes = "vec", tag = "1")]
        pub trace_id: ::prost::alloc::vec::Vec<u8>,
        /// A unique identifier for the linked span. The ID is an 8-byte
        /// array.
        #[prost(bytes = "vec", tag = "2")]
        pub span_id: ::prost::alloc::vec::Vec<u8>,
        /// The Tracestate associated with the link.
        #[prost(message, optional, tag = "3")]
        pub tracestate: ::core::option::Option<Tracestate>,
        /// A set of attributes on the link.
        #[prost(message, optional, tag = "4")]
        pub attributes: ::core::option::Option<Attributes>,
    }
    /// A collection of links, which are references from this span to a span
    /// in the same or different trace.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Links {
        /// A collection of links.
        #[prost(message, repeated, tag = "1")]
        pub link: ::prost::alloc::vec::Vec<Link>,
        /// The number of dropped links after the maximum size was enforced.
        /// If this value is 0, then no links were dropped.
        #[prost(uint32, tag = "2")]
        pub dropped_links_count: u32,
    }
    /// Type of span. Can be used to specify additional relationships between
    /// spans in addition to a parent/child relationship.
    #[derive(
        Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
    )]
    #[repr(i32)]
    pub enum SpanKind {
        /// Unspecified.
        Unspecified = 0,
        /// Default value. Indicates that the span is used internally.
        Internal = 1,
        /// Indicates that the span covers server-side handling of an RPC or
        /// other remote network request.
        Server = 2,
        /// Indicates that the span covers the client-side wrapper around an
        /// RPC or other remote request.
        Client = 3,
        /// Indicates that the span describes producer sending a message to a
        /// broker.
        Producer = 4,
        /// Indicates that the span describes consumer receiving a message
        /// from a broker.
        Consumer = 5,
    }
    impl SpanKind {
        /// String value of the enum field names used in the ProtoBuf
        /// definition.
        pub fn as_str_name(&self) -> &'static str {
            match self {
                SpanKind::Unspecified => "SPAN_KIND_UNSPECIFIED",
                SpanKind::Internal => "INTERNAL",
                SpanKind::Server => "SERVER",
                SpanKind::Client => "CLIENT",
                SpanKind::Producer => "PRODUCER",
                SpanKind::Consumer => "CONSUMER",
            }
        }
    }
}
