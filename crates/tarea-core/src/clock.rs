//! Time source abstraction used for stamping and due-date bucketing.

use time::{OffsetDateTime, UtcOffset};

/// Source of the current instant.
///
/// The offset of the returned value defines the "local" calendar used by
/// due-date buckets.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> OffsetDateTime;
}

/// Wall clock in the local offset, falling back to UTC when the offset is unknown.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        let now = OffsetDateTime::now_utc();
        UtcOffset::current_local_offset().map_or(now, |offset| now.to_offset(offset))
    }
}

/// Clock frozen at a given instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}
