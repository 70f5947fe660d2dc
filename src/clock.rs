//! Reference time for "today" calculations.
//!
//! The host clock is read only through [`Clock`], and "today" is always
//! evaluated at a fixed UTC offset (Singapore by default) regardless of the
//! machine's local timezone.

use chrono::{DateTime, FixedOffset, Utc};
use std::sync::Arc;

/// Singapore Standard Time. Singapore observes no daylight saving.
pub const SINGAPORE_UTC_OFFSET_HOURS: i32 = 8;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the host clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Returned for offsets outside ±23 hours.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("UTC offset of {0} hours is out of range")]
pub struct InvalidOffset(pub i32);

/// Builds a fixed offset `hours` east of UTC.
pub fn utc_offset(hours: i32) -> Result<FixedOffset, InvalidOffset> {
    hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .ok_or(InvalidOffset(hours))
}

/// A clock paired with the timezone "today" is read in.
#[derive(Clone)]
pub struct ReferenceClock {
    clock: Arc<dyn Clock>,
    zone: FixedOffset,
}

impl ReferenceClock {
    pub fn new(clock: Arc<dyn Clock>, zone: FixedOffset) -> Self {
        Self { clock, zone }
    }

    pub fn system(zone: FixedOffset) -> Self {
        Self::new(Arc::new(SystemClock), zone)
    }

    pub fn zone(&self) -> FixedOffset {
        self.zone
    }

    /// Current instant expressed in the reference zone.
    pub fn now(&self) -> DateTime<FixedOffset> {
        self.clock.now().with_timezone(&self.zone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_utc_offset_bounds() {
        assert_eq!(
            utc_offset(SINGAPORE_UTC_OFFSET_HOURS).unwrap().local_minus_utc(),
            8 * 3600
        );
        assert_eq!(utc_offset(-5).unwrap().local_minus_utc(), -5 * 3600);
        assert_eq!(utc_offset(24), Err(InvalidOffset(24)));
        assert_eq!(utc_offset(i32::MAX), Err(InvalidOffset(i32::MAX)));
    }

    #[test]
    fn test_reference_clock_shifts_date() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 9, 18, 0, 0).unwrap();
        let clock = ReferenceClock::new(
            Arc::new(FixedClock(instant)),
            utc_offset(SINGAPORE_UTC_OFFSET_HOURS).unwrap(),
        );

        assert_eq!(clock.now().date_naive().to_string(), "2024-03-10");
    }
}
