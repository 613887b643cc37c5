//! Calendar handling for billing periods
//!
//! Copayment ceilings accumulate per calendar year. The year a charge falls
//! into is decided in the hospital's local timezone, not UTC: a bill issued
//! at 21:00 on December 31st in Bogotá belongs to the old year even though
//! it is already January 1st in UTC.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Year {0} is outside the supported range")]
    YearOutOfRange(i32),
}

/// Timezone wrapper for the hospital's jurisdiction
///
/// Wraps chrono_tz::Tz with custom serialization support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl FromStr for Timezone {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tz::from_str(s)
            .map(Timezone)
            .map_err(|_| TemporalError::InvalidTimezone(s.to_string()))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Returns the local calendar date of a UTC instant
    pub fn local_date(&self, utc: DateTime<Utc>) -> NaiveDate {
        utc.with_timezone(&self.0).date_naive()
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::America::Bogota)
    }
}

impl fmt::Display for Timezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.name())
    }
}

/// A calendar year used to key annual copayment accumulators
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalendarYear(i32);

impl CalendarYear {
    /// Earliest year accepted for billing records
    pub const MIN: i32 = 1900;
    /// Latest year accepted for billing records
    pub const MAX: i32 = 9999;

    /// Creates a year, rejecting values outside `MIN..=MAX`
    pub fn new(year: i32) -> Result<Self, TemporalError> {
        if !(Self::MIN..=Self::MAX).contains(&year) {
            return Err(TemporalError::YearOutOfRange(year));
        }
        Ok(Self(year))
    }

    /// The year a calendar date belongs to
    pub fn of(date: NaiveDate) -> Self {
        Self(date.year())
    }

    pub fn value(&self) -> i32 {
        self.0
    }

    /// The following year
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for CalendarYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source of "today" for services that depend on the calendar
pub trait Clock: Send + Sync + fmt::Debug {
    /// The current UTC instant
    fn now(&self) -> DateTime<Utc>;

    /// Today's date in the given timezone
    fn today_in(&self, timezone: &Timezone) -> NaiveDate {
        timezone.local_date(self.now())
    }
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a single instant, for tests and replays
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Shared clock handle
pub type SharedClock = Arc<dyn Clock>;
