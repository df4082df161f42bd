//! Item timestamps in the archive's native resolution.
//!
//! Timestamps are handed to the engine as Windows FILETIME values: 100-ns
//! intervals since January 1, 1601 (UTC). Filesystem times are read through
//! the [`filetime`] crate and converted here.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Difference between the FILETIME epoch (1601) and the Unix epoch (1970),
/// in 100-nanosecond intervals.
const FILETIME_UNIX_DIFF: u64 = 116444736000000000;

/// Number of 100-nanosecond intervals per second.
const INTERVALS_PER_SECOND: u64 = 10_000_000;

/// A FILETIME timestamp attached to an archive item.
///
/// # Example
///
/// ```rust
/// use arcweave::Timestamp;
/// use std::time::SystemTime;
///
/// let ts = Timestamp::from_filetime(116444736000000000);
/// assert_eq!(ts.as_unix_secs(), 0);
/// assert_eq!(ts.as_system_time(), SystemTime::UNIX_EPOCH);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    filetime: u64,
}

impl Timestamp {
    /// Creates a timestamp from a raw FILETIME value.
    #[inline]
    pub const fn from_filetime(filetime: u64) -> Self {
        Self { filetime }
    }

    /// Returns the current time.
    ///
    /// Clocks set before 1601 collapse to the FILETIME epoch.
    pub fn now() -> Self {
        Self::from_system_time(SystemTime::now()).unwrap_or(Self::from_filetime(0))
    }

    /// Creates a timestamp from Unix seconds and a sub-second nanosecond part.
    ///
    /// Nanoseconds are truncated to 100 ns. Returns `None` when the value is
    /// not representable as a FILETIME.
    pub fn from_unix_secs_nanos(secs: i64, nanos: u32) -> Option<Self> {
        let sub = u64::from(nanos) / 100;
        let whole = secs.unsigned_abs().checked_mul(INTERVALS_PER_SECOND)?;
        let filetime = if secs >= 0 {
            FILETIME_UNIX_DIFF.checked_add(whole)?.checked_add(sub)?
        } else {
            FILETIME_UNIX_DIFF.checked_sub(whole)?.checked_add(sub)?
        };
        Some(Self::from_filetime(filetime))
    }

    /// Creates a timestamp from a `SystemTime`.
    pub fn from_system_time(time: SystemTime) -> Option<Self> {
        match time.duration_since(UNIX_EPOCH) {
            Ok(after) => Self::from_unix_secs_nanos(
                i64::try_from(after.as_secs()).ok()?,
                after.subsec_nanos(),
            ),
            Err(e) => {
                let before = e.duration();
                let intervals = before
                    .as_secs()
                    .checked_mul(INTERVALS_PER_SECOND)?
                    .checked_add(u64::from(before.subsec_nanos()) / 100)?;
                FILETIME_UNIX_DIFF
                    .checked_sub(intervals)
                    .map(Self::from_filetime)
            }
        }
    }

    /// Creates a timestamp from a [`filetime::FileTime`] read from disk.
    pub fn from_file_time(time: filetime::FileTime) -> Option<Self> {
        Self::from_unix_secs_nanos(time.unix_seconds(), time.nanoseconds())
    }

    /// Returns the raw FILETIME value.
    #[inline]
    pub const fn as_filetime(&self) -> u64 {
        self.filetime
    }

    /// Returns the timestamp as Unix seconds, rounding towards negative infinity.
    pub fn as_unix_secs(&self) -> i64 {
        if self.filetime >= FILETIME_UNIX_DIFF {
            ((self.filetime - FILETIME_UNIX_DIFF) / INTERVALS_PER_SECOND) as i64
        } else {
            let intervals = FILETIME_UNIX_DIFF - self.filetime;
            -(intervals.div_ceil(INTERVALS_PER_SECOND) as i64)
        }
    }

    /// Converts to a `SystemTime`, preserving 100 ns precision.
    pub fn as_system_time(&self) -> SystemTime {
        let (intervals, after_epoch) = if self.filetime >= FILETIME_UNIX_DIFF {
            (self.filetime - FILETIME_UNIX_DIFF, true)
        } else {
            (FILETIME_UNIX_DIFF - self.filetime, false)
        };
        let offset = Duration::new(
            intervals / INTERVALS_PER_SECOND,
            ((intervals % INTERVALS_PER_SECOND) * 100) as u32,
        );
        if after_epoch {
            UNIX_EPOCH + offset
        } else {
            UNIX_EPOCH - offset
        }
    }
}

impl From<Timestamp> for u64 {
    fn from(ts: Timestamp) -> u64 {
        ts.filetime
    }
}

impl From<Timestamp> for SystemTime {
    fn from(ts: Timestamp) -> SystemTime {
        ts.as_system_time()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unix_epoch() {
        let ts = Timestamp::from_filetime(FILETIME_UNIX_DIFF);
        assert_eq!(ts.as_unix_secs(), 0);
        assert_eq!(ts.as_system_time(), UNIX_EPOCH);
    }

    #[test]
    fn test_from_unix_secs_nanos() {
        let ts = Timestamp::from_unix_secs_nanos(1, 500_000_099).unwrap();
        assert_eq!(ts.as_filetime(), FILETIME_UNIX_DIFF + 15_000_000);

        let ts = Timestamp::from_unix_secs_nanos(-1, 0).unwrap();
        assert_eq!(ts.as_filetime(), FILETIME_UNIX_DIFF - INTERVALS_PER_SECOND);
        assert_eq!(ts.as_unix_secs(), -1);
    }

    #[test]
    fn test_before_filetime_epoch_is_none() {
        assert!(Timestamp::from_unix_secs_nanos(-20_000_000_000, 0).is_none());
    }

    #[test]
    fn test_system_time_conversions() {
        let original = UNIX_EPOCH + Duration::new(1234567890, 123_456_700);
        let ts = Timestamp::from_system_time(original).unwrap();
        assert_eq!(ts.as_system_time(), original);

        let before = UNIX_EPOCH - Duration::new(86400, 0);
        let ts = Timestamp::from_system_time(before).unwrap();
        assert_eq!(ts.as_unix_secs(), -86400);
        assert_eq!(SystemTime::from(ts), before);
    }

    #[test]
    fn test_from_file_time() {
        let ft = filetime::FileTime::from_unix_time(1_700_000_000, 250);
        let ts = Timestamp::from_file_time(ft).unwrap();
        assert_eq!(ts.as_unix_secs(), 1_700_000_000);
        assert_eq!(ts.as_filetime() % INTERVALS_PER_SECOND, 2);
    }

    #[test]
    fn test_now_is_after_epoch() {
        assert!(Timestamp::now().as_unix_secs() > 0);
    }
}
