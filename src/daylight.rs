//! Daylight curve calculations.
//!
//! Maps a time of day onto a simulated daylight value in [0, 1] using the two
//! user-configured anchors: 1.0 at the brightest time, 0.0 at the darkest time,
//! and linear interpolation in between. Both legs of the curve may cross
//! midnight, so the calculation works on minutes since midnight and wraps the
//! anchors around the day where needed.

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::constants::MINUTES_IN_DAY;

/// A time of day normalized to whole minutes since midnight (0..=1439).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeOfDayMinutes(u32);

impl TimeOfDayMinutes {
    /// Build from an hour/minute pair, `None` if either is out of range.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self(hour * 60 + minute))
        } else {
            None
        }
    }

    /// Drop seconds and below.
    pub fn from_time(time: NaiveTime) -> Self {
        Self(time.hour() * 60 + time.minute())
    }

    /// Drop the date component of a timestamp.
    pub fn from_datetime(datetime: NaiveDateTime) -> Self {
        Self::from_time(datetime.time())
    }

    pub fn minutes(self) -> u32 {
        self.0
    }

    pub fn to_time(self) -> NaiveTime {
        // Always valid: the inner value never exceeds 1439
        NaiveTime::from_hms_opt(self.0 / 60, self.0 % 60, 0).unwrap_or(NaiveTime::MIN)
    }
}

impl From<NaiveTime> for TimeOfDayMinutes {
    fn from(time: NaiveTime) -> Self {
        Self::from_time(time)
    }
}

impl fmt::Display for TimeOfDayMinutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

/// The two ends of the daylight curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchors {
    pub brightest: TimeOfDayMinutes,
    pub darkest: TimeOfDayMinutes,
}

impl Anchors {
    pub fn new(brightest: impl Into<TimeOfDayMinutes>, darkest: impl Into<TimeOfDayMinutes>) -> Self {
        Self {
            brightest: brightest.into(),
            darkest: darkest.into(),
        }
    }

    /// Daylight value at the time of day of `datetime`.
    pub fn daylight_at(&self, datetime: NaiveDateTime) -> f64 {
        daylight_value(
            TimeOfDayMinutes::from_datetime(datetime),
            self.brightest,
            self.darkest,
        )
    }

    /// Both anchors on the same minute; the curve is flat at 0.0.
    pub fn is_degenerate(&self) -> bool {
        self.brightest == self.darkest
    }
}

/// Which end of the curve the current segment is heading towards.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Heading {
    Brightest,
    Darkest,
}

/// Compute the daylight value for `now` given the two anchor times.
///
/// Returns exactly 1.0 at `brightest` and exactly 0.0 at `darkest`. When the
/// anchors coincide the curve is undefined and 0.0 is returned for every time.
///
/// The six strict orderings of (now, brightest, darkest) each select a segment
/// of the curve. Segments that pass midnight measure the part before midnight
/// against `MINUTES_IN_DAY`.
///
/// # Examples
/// ```
/// use lumawall::daylight::{TimeOfDayMinutes, daylight_value};
/// let b = TimeOfDayMinutes::from_hm(13, 0).unwrap();
/// let d = TimeOfDayMinutes::from_hm(23, 0).unwrap();
/// let now = TimeOfDayMinutes::from_hm(18, 0).unwrap();
/// assert_eq!(daylight_value(now, b, d), 0.5);
/// ```
pub fn daylight_value(
    now: TimeOfDayMinutes,
    brightest: TimeOfDayMinutes,
    darkest: TimeOfDayMinutes,
) -> f64 {
    if brightest == darkest {
        return 0.0;
    }
    if now == brightest {
        return 1.0;
    }
    if now == darkest {
        return 0.0;
    }

    let (n, b, d) = (now.0, brightest.0, darkest.0);

    use Ordering::{Greater, Less};
    let (covered, span, heading) = match (n.cmp(&b), n.cmp(&d), b.cmp(&d)) {
        // brightest < now < darkest
        (Greater, Less, Less) => (n - b, d - b, Heading::Darkest),
        // darkest < now < brightest
        (Less, Greater, Greater) => (n - d, b - d, Heading::Brightest),
        // now < brightest < darkest: darkness carried over from last night
        (Less, Less, Less) => ((MINUTES_IN_DAY - d) + n, (MINUTES_IN_DAY - d) + b, Heading::Brightest),
        // now < darkest < brightest: brightness carried over from yesterday
        (Less, Less, Greater) => ((MINUTES_IN_DAY - b) + n, (MINUTES_IN_DAY - b) + d, Heading::Darkest),
        // brightest < darkest < now
        (Greater, Greater, Less) => (n - d, (MINUTES_IN_DAY - d) + b, Heading::Brightest),
        // darkest < brightest < now
        (Greater, Greater, Greater) => (n - b, (MINUTES_IN_DAY - b) + d, Heading::Darkest),
        ordering => unreachable!(
            "inconsistent ordering {:?} for now={} brightest={} darkest={}",
            ordering, now, brightest, darkest
        ),
    };

    let fraction = f64::from(covered) / f64::from(span);
    match heading {
        Heading::Brightest => fraction,
        Heading::Darkest => 1.0 - fraction,
    }
}
