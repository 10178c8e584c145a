//! Wire-format types for span snapshots.
//!
//! The message definitions in [`trace`] are the serialization contract for
//! finished and in-flight span records: fixed-width byte strings for trace
//! and span ids, wall-clock `(seconds, nanos)` timestamps, bounded
//! collections paired with their dropped counts, and a wrapped `uint32`
//! child count so that "zero" and "unset" stay distinguishable.
//!
//! [`transform`] converts the in-memory span representation into these
//! messages.

pub mod transform;

#[allow(clippy::all)]
mod trace;

pub use trace::*;
