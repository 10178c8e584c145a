use crate::trace::error::{TraceError, TraceResult};
use std::fmt;
use std::num::ParseIntError;
use thiserror::Error;

/// Flags carried alongside the ids of a [`SpanContext`].
///
/// A single bit is meaningful today: `sampled`, set when the span was
/// selected for export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TraceFlags(u8);

impl TraceFlags {
    const SAMPLED_BIT: u8 = 0x01;

    /// Flags with the `sampled` bit clear.
    ///
    /// Spans that are not sampled will be ignored by most tracing tools.
    pub const NOT_SAMPLED: TraceFlags = TraceFlags(0);

    /// Flags with the `sampled` bit set.
    pub const SAMPLED: TraceFlags = TraceFlags(Self::SAMPLED_BIT);

    /// Construct flags from their byte representation.
    pub const fn new(flags: u8) -> Self {
        TraceFlags(flags)
    }

    /// Whether the `sampled` bit is set.
    pub fn is_sampled(&self) -> bool {
        self.0 & Self::SAMPLED_BIT != 0
    }

    /// A copy of these flags with the `sampled` bit set or cleared.
    pub fn with_sampled(&self, sampled: bool) -> Self {
        if sampled {
            TraceFlags(self.0 | Self::SAMPLED_BIT)
        } else {
            TraceFlags(self.0 & !Self::SAMPLED_BIT)
        }
    }

    /// The flags as a byte.
    pub fn to_u8(self) -> u8 {
        self.0
    }
}

/// A 16-byte value identifying a trace.
///
/// All spans of one trace carry the same trace id. The all-zero value is
/// reserved as "invalid".
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(u128);

impl TraceId {
    /// The invalid, all-zero trace id.
    pub const INVALID: TraceId = TraceId(0);

    /// Build a trace id from its 16 big-endian bytes.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        TraceId(u128::from_be_bytes(bytes))
    }

    /// The 16 big-endian bytes of this trace id.
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0.to_be_bytes()
    }

    /// Parse a trace id from its hexadecimal form.
    pub fn from_hex(hex: &str) -> Result<Self, ParseIntError> {
        u128::from_str_radix(hex, 16).map(TraceId)
    }
}

impl From<u128> for TraceId {
    fn from(value: u128) -> Self {
        TraceId(value)
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl fmt::Debug for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// An 8-byte value identifying a span within a trace.
///
/// The all-zero value is reserved as "invalid".
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpanId(u64);

impl SpanId {
    /// The invalid, all-zero span id.
    pub const INVALID: SpanId = SpanId(0);

    /// Build a span id from its 8 big-endian bytes.
    pub const fn from_bytes(bytes: [u8; 8]) -> Self {
        SpanId(u64::from_be_bytes(bytes))
    }

    /// The 8 big-endian bytes of this span id.
    pub const fn to_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// Parse a span id from its hexadecimal form.
    pub fn from_hex(hex: &str) -> Result<Self, ParseIntError> {
        u64::from_str_radix(hex, 16).map(SpanId)
    }
}

impl From<u64> for SpanId {
    fn from(value: u64) -> Self {
        SpanId(value)
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl fmt::Debug for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Tracing-system-specific context carried with a trace, as an ordered
/// list of key-value pairs.
///
/// Keys and values follow the W3C `tracestate` grammar, and mutation
/// follows its rules: setting a key removes any previous entry and places
/// the new one at the front. States are immutable; mutators return a new
/// state. Header parsing belongs to the propagation layer, not here; this
/// type only validates, orders, and renders entries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TraceState(Vec<(String, String)>);

impl TraceState {
    /// The empty `TraceState`, as a constant.
    pub const NONE: TraceState = TraceState(Vec::new());

    /// Build a `TraceState` from key-value pairs, validating every entry.
    pub fn from_key_value<T, K, V>(pairs: T) -> TraceResult<Self>
    where
        T: IntoIterator<Item = (K, V)>,
        K: ToString,
        V: ToString,
    {
        let mut entries = Vec::new();
        for (key, value) in pairs {
            let (key, value) = (key.to_string(), value.to_string());
            validate_entry(&key, &value)?;
            entries.push((key, value));
        }
        Ok(TraceState(entries))
    }

    /// The value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(entry_key, _)| entry_key == key)
            .map(|(_, value)| value.as_str())
    }

    /// Returns a new state with `key` set to `value` at the front of the
    /// list, displacing any previous entry for `key`.
    pub fn insert<K, V>(&self, key: K, value: V) -> TraceResult<TraceState>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let (key, value) = (key.into(), value.into());
        validate_entry(&key, &value)?;

        let mut entries: Vec<_> = self
            .0
            .iter()
            .filter(|(entry_key, _)| *entry_key != key)
            .cloned()
            .collect();
        entries.insert(0, (key, value));
        Ok(TraceState(entries))
    }

    /// Returns a new state without any entry for `key`. Removing an absent
    /// key yields an unchanged copy.
    pub fn delete<K: Into<String>>(&self, key: K) -> TraceResult<TraceState> {
        let key = key.into();
        if !valid_key(&key) {
            return Err(TraceStateError::Key(key).into());
        }
        Ok(TraceState(
            self.0
                .iter()
                .filter(|(entry_key, _)| *entry_key != key)
                .cloned()
                .collect(),
        ))
    }

    /// Iterate over the entries, front to back.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Render the entries as a `tracestate`-style header value, for
    /// diagnostics and snapshots.
    pub fn header(&self) -> String {
        let mut header = String::new();
        for (key, value) in &self.0 {
            if !header.is_empty() {
                header.push(',');
            }
            header.push_str(key);
            header.push('=');
            header.push_str(value);
        }
        header
    }
}

// A key is either a single lowercase identifier, or `tenant@system` for
// multi-tenant systems. Identifiers start with a lowercase letter or digit
// and use only lowercase letters, digits, `_`, `-`, `*`, and `/`; the
// system part is at most 14 bytes. Whole keys cap at 256 bytes.
fn valid_key(key: &str) -> bool {
    fn identifier(part: &str) -> bool {
        let starts_ok = part
            .as_bytes()
            .first()
            .is_some_and(|b| b.is_ascii_lowercase() || b.is_ascii_digit());
        starts_ok
            && part.bytes().all(|b| {
                b.is_ascii_lowercase()
                    || b.is_ascii_digit()
                    || matches!(b, b'_' | b'-' | b'*' | b'/')
            })
    }

    if key.is_empty() || key.len() > 256 {
        return false;
    }
    match key.split_once('@') {
        None => identifier(key),
        Some((tenant, system)) => {
            identifier(tenant) && system.len() <= 14 && identifier(system)
        }
    }
}

// Values are up to 256 bytes of printable ASCII, excluding the delimiters
// `,` and `=`. The empty value is allowed.
fn valid_value(value: &str) -> bool {
    value.len() <= 256
        && value
            .bytes()
            .all(|b| (0x20..=0x7e).contains(&b) && b != b',' && b != b'=')
}

fn validate_entry(key: &str, value: &str) -> Result<(), TraceStateError> {
    if !valid_key(key) {
        return Err(TraceStateError::Key(key.to_owned()));
    }
    if !valid_value(value) {
        return Err(TraceStateError::Value(value.to_owned()));
    }
    Ok(())
}

/// Error returned by `TraceState` operations.
#[derive(Error, Debug)]
enum TraceStateError {
    /// The key does not match the tracestate key grammar.
    #[error("{0:?} is not a valid tracestate key")]
    Key(String),

    /// The value contains a delimiter or non-printable byte.
    #[error("{0:?} is not a valid tracestate value")]
    Value(String),
}

impl From<TraceStateError> for TraceError {
    fn from(err: TraceStateError) -> Self {
        TraceError::Other(Box::new(err))
    }
}

/// Immutable portion of a span which can be serialized and propagated.
///
/// A context is valid iff both its trace id and span id are non-zero.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SpanContext {
    trace_id: TraceId,
    span_id: SpanId,
    trace_flags: TraceFlags,
    trace_state: TraceState,
}

impl SpanContext {
    /// An invalid span context.
    pub const NONE: SpanContext = SpanContext {
        trace_id: TraceId::INVALID,
        span_id: SpanId::INVALID,
        trace_flags: TraceFlags::NOT_SAMPLED,
        trace_state: TraceState::NONE,
    };

    /// Create an invalid empty span context.
    pub fn empty_context() -> Self {
        SpanContext::NONE
    }

    /// Construct a new `SpanContext`.
    pub fn new(
        trace_id: TraceId,
        span_id: SpanId,
        trace_flags: TraceFlags,
        trace_state: TraceState,
    ) -> Self {
        SpanContext {
            trace_id,
            span_id,
            trace_flags,
            trace_state,
        }
    }

    /// The [`TraceId`] for this span context.
    pub fn trace_id(&self) -> TraceId {
        self.trace_id
    }

    /// The [`SpanId`] for this span context.
    pub fn span_id(&self) -> SpanId {
        self.span_id
    }

    /// The flags carried with the ids.
    pub fn trace_flags(&self) -> TraceFlags {
        self.trace_flags
    }

    /// Returns `true` if the span context has a valid (non-zero) `trace_id`
    /// and a valid (non-zero) `span_id`.
    pub fn is_valid(&self) -> bool {
        self.trace_id != TraceId::INVALID && self.span_id != SpanId::INVALID
    }

    /// Returns `true` if the `sampled` trace flag is set.
    pub fn is_sampled(&self) -> bool {
        self.trace_flags.is_sampled()
    }

    /// A reference to the span context's [`TraceState`].
    pub fn trace_state(&self) -> &TraceState {
        &self.trace_state
    }
}
