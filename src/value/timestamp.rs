//! Timestamp with nanosecond precision
//!
//! The representable range is 0001-01-01T00:00:00Z through
//! 9999-12-31T23:59:59.999999999Z. Every constructor and arithmetic helper
//! returns `None` when its result leaves that range.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

const NANOS_PER_SECOND: i128 = 1_000_000_000;
const NANOS_PER_MICRO: i128 = 1_000;

/// Seconds and nanoseconds since the Unix epoch.
///
/// `nanos` is always in `0..1_000_000_000`, so the derived ordering on
/// `(seconds, nanos)` is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp {
    seconds: i64,
    nanos: i32,
}

impl Timestamp {
    /// 0001-01-01T00:00:00Z
    pub const MIN_SECONDS: i64 = -62_135_596_800;
    /// 9999-12-31T23:59:59Z
    pub const MAX_SECONDS: i64 = 253_402_300_799;

    pub fn new(seconds: i64, nanos: i32) -> Option<Self> {
        if !(0..1_000_000_000).contains(&nanos) {
            return None;
        }
        if !(Self::MIN_SECONDS..=Self::MAX_SECONDS).contains(&seconds) {
            return None;
        }
        Some(Self { seconds, nanos })
    }

    pub fn from_seconds(seconds: i64) -> Option<Self> {
        Self::new(seconds, 0)
    }

    pub fn from_millis(millis: i64) -> Option<Self> {
        Self::from_total_nanos(millis as i128 * 1_000_000)
    }

    pub fn from_micros(micros: i64) -> Option<Self> {
        Self::from_total_nanos(micros as i128 * NANOS_PER_MICRO)
    }

    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    pub fn nanos(&self) -> i32 {
        self.nanos
    }

    /// Whole seconds since the epoch, rounded toward negative infinity.
    pub fn to_unix_seconds(&self) -> i64 {
        self.seconds
    }

    pub fn to_unix_millis(&self) -> i64 {
        // fits: |MAX_SECONDS| * 1e3 is far below i64::MAX
        self.seconds * 1_000 + (self.nanos / 1_000_000) as i64
    }

    pub fn to_unix_micros(&self) -> i64 {
        self.seconds * 1_000_000 + (self.nanos / 1_000) as i64
    }

    /// Adds a signed number of microseconds.
    pub fn checked_add_micros(&self, micros: i128) -> Option<Self> {
        let delta = micros.checked_mul(NANOS_PER_MICRO)?;
        Self::from_total_nanos(self.total_nanos().checked_add(delta)?)
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Option<Self> {
        Self::new(dt.timestamp(), dt.timestamp_subsec_nanos() as i32)
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.seconds, self.nanos as u32)
    }

    fn total_nanos(&self) -> i128 {
        self.seconds as i128 * NANOS_PER_SECOND + self.nanos as i128
    }

    fn from_total_nanos(total: i128) -> Option<Self> {
        let seconds = total.div_euclid(NANOS_PER_SECOND);
        let nanos = total.rem_euclid(NANOS_PER_SECOND);
        Self::new(i64::try_from(seconds).ok()?, nanos as i32)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            None => write!(f, "Timestamp(seconds={}, nanos={})", self.seconds, self.nanos),
        }
    }
}
