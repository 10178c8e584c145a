use thiserror::Error;

/// A specialized `Result` for trace operations that can fail.
pub type TraceResult<T> = Result<T, TraceError>;

/// Errors returned by the trace API.
///
/// Only argument validation surfaces errors; the span mutation API is total
/// and never fails from the caller's point of view.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TraceError {
    /// The supplied span name was rejected.
    ///
    /// Span names must be non-empty ASCII strings of at most 255 bytes.
    #[error("invalid span name: {0}")]
    InvalidSpanName(&'static str),

    /// Other errors propagated from trace components.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync + 'static>),
}
