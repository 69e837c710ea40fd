use chrono::{DateTime, Duration, Utc};
use clap::ValueEnum;
use std::fmt;
use tracing::info;

use crate::error::{ReportError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
}

impl TimeUnit {
    /// Inclusive range of poll values accepted for this unit.
    pub fn bounds(self) -> (i64, i64) {
        match self {
            TimeUnit::Seconds => (1, 299),
            TimeUnit::Minutes => (1, 719),
            TimeUnit::Hours => (1, 47),
            TimeUnit::Days => (1, 90),
            TimeUnit::Weeks => (1, 4),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeUnit::Seconds => "seconds",
            TimeUnit::Minutes => "minutes",
            TimeUnit::Hours => "hours",
            TimeUnit::Days => "days",
            TimeUnit::Weeks => "weeks",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated look-back period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollWindow {
    unit: TimeUnit,
    value: i64,
}

impl PollWindow {
    pub fn new(unit: TimeUnit, value: i64) -> Result<Self> {
        let (min, max) = unit.bounds();
        if !(min..=max).contains(&value) {
            return Err(ReportError::PollWindowOutOfRange {
                unit,
                value,
                min,
                max,
            });
        }

        info!(action = "validate", component = "poll_window", unit = %unit, value, "Accepted poll window");
        Ok(Self { unit, value })
    }

    pub fn as_duration(&self) -> Duration {
        match self.unit {
            TimeUnit::Seconds => Duration::seconds(self.value),
            TimeUnit::Minutes => Duration::minutes(self.value),
            TimeUnit::Hours => Duration::hours(self.value),
            TimeUnit::Days => Duration::days(self.value),
            TimeUnit::Weeks => Duration::weeks(self.value),
        }
    }

    /// The `[now - window, now]` range queried by the search endpoint.
    pub fn ending_at(&self, now: DateTime<Utc>) -> TimeWindow {
        TimeWindow {
            start: now - self.as_duration(),
            end: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn start_zulu(&self) -> String {
        zulu_millis(self.start)
    }

    pub fn end_zulu(&self) -> String {
        zulu_millis(self.end)
    }
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
pub fn zulu_millis(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}
