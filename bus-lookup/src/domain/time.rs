//! Arrival time handling for schedule rows.
//!
//! The schedule database stores arrival times as wall-clock strings with no
//! date ("08:05:00", sometimes "8:05"). Feeds may also use hours past 23 for
//! trips that run after midnight. This module parses those strings into a
//! numeric value so comparisons never depend on string ordering.

use std::cmp::Ordering;
use std::fmt;

use chrono::{Local, NaiveTime, Timelike};

/// Seconds in one service day.
const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

/// Latest hour accepted in a schedule string (after-midnight service).
const MAX_HOUR: u32 = 47;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A time of day on the service clock, stored as seconds since midnight.
///
/// # Examples
///
/// ```
/// use bus_lookup::domain::ArrivalTime;
///
/// let t = ArrivalTime::parse("08:05:00").unwrap();
/// assert_eq!(t.to_string(), "08:05");
///
/// // Lexically "9:00" > "10:00", numerically it is not
/// let nine = ArrivalTime::parse("9:00").unwrap();
/// let ten = ArrivalTime::parse("10:00").unwrap();
/// assert!(nine < ten);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArrivalTime(u32);

impl ArrivalTime {
    /// Build a time from hours and minutes.
    ///
    /// Returns `None` if the minute is out of range or the hour exceeds the
    /// after-midnight limit.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if hour > MAX_HOUR || minute > 59 {
            return None;
        }
        Some(Self(hour * 3600 + minute * 60))
    }

    /// Parse `H:MM`, `HH:MM` or `HH:MM:SS`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bus_lookup::domain::ArrivalTime;
    ///
    /// assert!(ArrivalTime::parse("00:00").is_ok());
    /// assert!(ArrivalTime::parse("7:30").is_ok());
    /// assert!(ArrivalTime::parse("25:10:00").is_ok());
    ///
    /// assert!(ArrivalTime::parse("0730").is_err());
    /// assert!(ArrivalTime::parse("12:60").is_err());
    /// assert!(ArrivalTime::parse("48:00").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        let mut parts = s.trim().split(':');

        let hour = parts
            .next()
            .filter(|p| (1..=2).contains(&p.len()))
            .and_then(parse_digits)
            .ok_or_else(|| TimeError::new("invalid hour digits"))?;
        if hour > MAX_HOUR {
            return Err(TimeError::new("hour must be 0-47"));
        }

        let minute = parts
            .next()
            .filter(|p| p.len() == 2)
            .and_then(parse_digits)
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }

        let second = match parts.next() {
            None => 0,
            Some(p) => {
                let sec = Some(p)
                    .filter(|p| p.len() == 2)
                    .and_then(parse_digits)
                    .ok_or_else(|| TimeError::new("invalid second digits"))?;
                if sec > 59 {
                    return Err(TimeError::new("second must be 0-59"));
                }
                sec
            }
        };

        if parts.next().is_some() {
            return Err(TimeError::new("expected HH:MM or HH:MM:SS format"));
        }

        Ok(Self(hour * 3600 + minute * 60 + second))
    }

    /// Convert a wall-clock time, dropping seconds.
    ///
    /// The current time is compared at minute resolution, so a bus at
    /// "12:00:00" still counts as upcoming for the whole of 12:00.
    pub fn from_clock(time: NaiveTime) -> Self {
        Self(time.hour() * 3600 + time.minute() * 60)
    }

    /// The current local time of day, at minute resolution.
    pub fn now_local() -> Self {
        Self::from_clock(Local::now().time())
    }

    /// Seconds since midnight of the service day.
    pub fn seconds(&self) -> u32 {
        self.0
    }

    /// Returns the displayed hour (0-23).
    pub fn hour(&self) -> u32 {
        (self.0 % SECONDS_PER_DAY) / 3600
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u32 {
        (self.0 % 3600) / 60
    }

    /// Whether this time belongs to the following calendar day.
    pub fn is_after_midnight(&self) -> bool {
        self.0 >= SECONDS_PER_DAY
    }
}

fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl Ord for ArrivalTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl PartialOrd for ArrivalTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for ArrivalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArrivalTime({}s)", self.0)
    }
}

impl fmt::Display for ArrivalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}
