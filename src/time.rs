//! Time sources for span records.
//!
//! Spans are timed with two distinct readings: a monotonic nanosecond
//! counter that orders operations, and a wall-clock anchor that renders
//! those readings as timestamps. [`TimestampConverter`] captures one
//! `(wall, monotonic)` pair and maps any later monotonic reading onto the
//! wall clock, so sibling spans sharing a converter keep their relative
//! order even if the system clock jumps between readings.

use crate::proto::Timestamp;
use once_cell::sync::Lazy;
use std::fmt;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

pub(crate) const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// A source of wall-clock and monotonic time.
///
/// The wall clock and the monotonic counter have unrelated origins; only
/// [`TimestampConverter`] relates them. Implementations must be thread-safe.
pub trait Clock: Send + Sync + fmt::Debug {
    /// The current wall-clock time.
    fn now(&self) -> Timestamp;

    /// A monotonic nanosecond reading with an arbitrary origin.
    fn now_nanos(&self) -> i64;
}

// The origin of the monotonic counter, fixed on first use for the lifetime
// of the process.
static MONOTONIC_ORIGIN: Lazy<Instant> = Lazy::new(Instant::now);

/// The default [`Clock`], backed by [`SystemTime`] and [`Instant`].
#[derive(Clone, Debug, Default)]
pub struct SystemClock {
    _private: (),
}

impl SystemClock {
    /// Create a new system clock.
    pub fn new() -> Self {
        SystemClock::default()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Timestamp {
            seconds: since_epoch.as_secs() as i64,
            nanos: since_epoch.subsec_nanos() as i32,
        }
    }

    fn now_nanos(&self) -> i64 {
        MONOTONIC_ORIGIN.elapsed().as_nanos() as i64
    }
}

/// Converts monotonic nanosecond readings into wall-clock timestamps.
///
/// The converter captures one `(wall, monotonic)` pair at construction and
/// renders any later monotonic reading as `wall + (reading - monotonic)`.
/// All spans below a common parent share the parent's converter, so the
/// wall-time order of their records matches the monotonic order in which
/// the records were made.
#[derive(Clone, Debug)]
pub struct TimestampConverter {
    wall_time: Timestamp,
    nanos: i64,
}

impl TimestampConverter {
    /// Create a converter anchored at the clock's current readings.
    pub fn now(clock: &dyn Clock) -> Self {
        TimestampConverter {
            wall_time: clock.now(),
            nanos: clock.now_nanos(),
        }
    }

    /// Convert a monotonic reading taken after this converter's anchor into
    /// a wall-clock timestamp.
    pub fn convert_nanos(&self, nanos: i64) -> Timestamp {
        let total = self.wall_time.seconds as i128 * NANOS_PER_SECOND as i128
            + self.wall_time.nanos as i128
            + (nanos - self.nanos) as i128;
        Timestamp {
            seconds: total.div_euclid(NANOS_PER_SECOND as i128) as i64,
            nanos: total.rem_euclid(NANOS_PER_SECOND as i128) as i32,
        }
    }
}
