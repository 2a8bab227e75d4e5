//! Calendar handling for the fixed reference timezone.
//!
//! Every client observes the same daily answer, so "today" is always
//! computed in one fixed UTC offset and never in the caller's local zone.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DATE_FORMAT, DEFAULT_UTC_OFFSET_SECONDS, MAX_UTC_OFFSET_SECONDS};

/// Errors raised while parsing dates or building the reference zone.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("date {0:?} is not in YYYY-MM-DD form")]
    Malformed(String),
    #[error("date {0:?} is not a real calendar day")]
    OutOfRange(String),
    #[error("utc offset {0}s is outside +/-18h")]
    Offset(i32),
}

/// A calendar day in the reference timezone, rendered as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GameDate(NaiveDate);

impl GameDate {
    #[must_use]
    pub const fn from_naive(date: NaiveDate) -> Self {
        Self(date)
    }

    #[must_use]
    pub const fn naive(self) -> NaiveDate {
        self.0
    }

    /// The following calendar day, if representable.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }
}

impl FromStr for GameDate {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        let shaped = bytes.len() == 10
            && bytes.iter().enumerate().all(|(idx, b)| match idx {
                4 | 7 => *b == b'-',
                _ => b.is_ascii_digit(),
            });
        if !shaped {
            return Err(DateError::Malformed(s.to_string()));
        }
        NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(Self)
            .map_err(|_| DateError::OutOfRange(s.to_string()))
    }
}

impl TryFrom<String> for GameDate {
    type Error = DateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GameDate> for String {
    fn from(value: GameDate) -> Self {
        value.to_string()
    }
}

impl fmt::Display for GameDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

/// Fixed UTC offset that defines when a game day starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceZone {
    offset: FixedOffset,
}

impl ReferenceZone {
    /// Build a zone from an offset east of UTC, in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`DateError::Offset`] when the offset exceeds 18 hours.
    pub fn from_offset_seconds(seconds: i32) -> Result<Self, DateError> {
        if seconds.abs() > MAX_UTC_OFFSET_SECONDS {
            return Err(DateError::Offset(seconds));
        }
        FixedOffset::east_opt(seconds)
            .map(|offset| Self { offset })
            .ok_or(DateError::Offset(seconds))
    }

    #[must_use]
    pub fn offset_seconds(&self) -> i32 {
        self.offset.local_minus_utc()
    }

    /// The game day containing `instant`.
    #[must_use]
    pub fn date_at(&self, instant: DateTime<Utc>) -> GameDate {
        GameDate(instant.with_timezone(&self.offset).date_naive())
    }

    /// The game day for the clock's current instant.
    #[must_use]
    pub fn today<C: Clock + ?Sized>(&self, clock: &C) -> GameDate {
        self.date_at(clock.now())
    }
}

impl Default for ReferenceZone {
    fn default() -> Self {
        Self {
            offset: FixedOffset::east_opt(DEFAULT_UTC_OFFSET_SECONDS)
                .unwrap_or_else(|| Utc.fix()),
        }
    }
}

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant, for replays and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_and_displays_iso_days() {
        let date: GameDate = "2024-02-29".parse().unwrap();
        assert_eq!(date.to_string(), "2024-02-29");
        assert_eq!(date.next().unwrap().to_string(), "2024-03-01");
    }

    #[test]
    fn rejects_malformed_and_impossible_days() {
        for bad in ["2024-1-01", "2024/01/01", "20240101", " 2024-01-01", "2024-01-01T00"] {
            assert!(matches!(
                bad.parse::<GameDate>(),
                Err(DateError::Malformed(_))
            ));
        }
        assert_eq!(
            "2023-02-29".parse::<GameDate>(),
            Err(DateError::OutOfRange("2023-02-29".to_string()))
        );
    }

    #[test]
    fn serde_uses_string_form() {
        let date: GameDate = "2024-01-01".parse().unwrap();
        assert_eq!(serde_json::to_string(&date).unwrap(), "\"2024-01-01\"");
        let back: GameDate = serde_json::from_str("\"2024-01-01\"").unwrap();
        assert_eq!(back, date);
        assert!(serde_json::from_str::<GameDate>("\"2024-13-01\"").is_err());
    }

    #[test]
    fn reference_zone_lags_utc_at_midnight() {
        let zone = ReferenceZone::default();
        assert_eq!(zone.offset_seconds(), -10_800);
        let just_after_utc_midnight = Utc.with_ymd_and_hms(2024, 1, 2, 1, 0, 0).unwrap();
        assert_eq!(zone.date_at(just_after_utc_midnight).to_string(), "2024-01-01");
        let after_local_midnight = Utc.with_ymd_and_hms(2024, 1, 2, 3, 0, 0).unwrap();
        assert_eq!(zone.date_at(after_local_midnight).to_string(), "2024-01-02");
    }

    #[test]
    fn offsets_beyond_eighteen_hours_are_rejected() {
        assert_eq!(
            ReferenceZone::from_offset_seconds(19 * 3600),
            Err(DateError::Offset(19 * 3600))
        );
        let utc = ReferenceZone::from_offset_seconds(0).unwrap();
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 6, 1, 23, 59, 59).unwrap());
        assert_eq!(utc.today(&clock).to_string(), "2024-06-01");
    }
}
