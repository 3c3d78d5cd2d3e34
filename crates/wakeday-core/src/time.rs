//! Clock-time arithmetic on the wake-relative day.
//!
//! All conversions are total. Malformed input degrades to midnight instead
//! of failing, because the interactive layer depends on these helpers never
//! erroring out mid-gesture. Strict parsing is available through
//! [`ClockTime::parse`], which callers pattern-match on.

use std::fmt;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Minutes in a full day.
pub const MINUTES_PER_DAY: i64 = 1440;

/// A clock time of day, stored as minutes since midnight in `[0, 1439]`.
///
/// Serializes as the zero-padded `HH:MM` string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u16);

impl ClockTime {
    pub const MIDNIGHT: ClockTime = ClockTime(0);

    /// Normalize any minute count, including negative and >= 1440 values,
    /// into a clock time via double-modulo.
    pub fn from_minutes(minutes: i64) -> Self {
        let normalized = ((minutes % MINUTES_PER_DAY) + MINUTES_PER_DAY) % MINUTES_PER_DAY;
        ClockTime(normalized as u16)
    }

    pub fn from_hm(hour: u32, minute: u32) -> Self {
        Self::from_minutes(i64::from(hour) * 60 + i64::from(minute))
    }

    pub fn from_naive_time(time: NaiveTime) -> Self {
        Self::from_hm(time.hour(), time.minute())
    }

    /// Parse an `HH:MM` string. `None` when the colon is missing or either
    /// side is not an integer; numeric values outside the day wrap like
    /// [`ClockTime::from_minutes`].
    pub fn parse(s: &str) -> Option<Self> {
        let (hours, minutes) = s.split_once(':')?;
        let hours: i64 = hours.trim().parse().ok()?;
        let minutes: i64 = minutes.trim().parse().ok()?;
        Some(Self::from_minutes(hours * 60 + minutes))
    }

    /// Parse, degrading malformed input to midnight.
    pub fn parse_lenient(s: &str) -> Self {
        Self::parse(s).unwrap_or(Self::MIDNIGHT)
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }

    pub fn as_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(u32::from(self.hour()), u32::from(self.minute()), 0)
            .unwrap_or(NaiveTime::MIN)
    }

    /// Add (or subtract) minutes, wrapping across midnight.
    pub fn add_minutes(self, delta: i64) -> Self {
        Self::from_minutes(i64::from(self.0) + delta)
    }

    /// Minutes elapsed since `wake`, in `[0, 1439]`.
    ///
    /// Always the wrap-forward interpretation: a clock time earlier than the
    /// wake time belongs to the next calendar day of that wake day, never to
    /// the previous one.
    pub fn minutes_since(self, wake: ClockTime) -> u16 {
        let mut diff = i64::from(self.0) - i64::from(wake.0);
        if diff < 0 {
            diff += MINUTES_PER_DAY;
        }
        diff as u16
    }

    /// 12-hour display form: `9:30 AM`, or `9 AM` without minutes.
    pub fn format_12h(self, show_minutes: bool) -> String {
        let hour = self.hour();
        let suffix = if hour >= 12 { "PM" } else { "AM" };
        let display_hour = match hour {
            0 => 12,
            h if h > 12 => h - 12,
            h => h,
        };
        if show_minutes {
            format!("{}:{:02} {}", display_hour, self.minute(), suffix)
        } else {
            format!("{} {}", display_hour, suffix)
        }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ClockTime::parse_lenient(&s))
    }
}

/// Human-readable duration: `45min`, `2h`, `1h 30m`.
pub fn format_duration_minutes(minutes: u32) -> String {
    if minutes < 60 {
        return format!("{minutes}min");
    }
    let hours = minutes / 60;
    let mins = minutes % 60;
    if mins > 0 {
        format!("{hours}h {mins}m")
    } else {
        format!("{hours}h")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_and_formats() {
        assert_eq!(ClockTime::parse("07:05"), Some(ClockTime::from_hm(7, 5)));
        assert_eq!(ClockTime::parse("7:5"), Some(ClockTime::from_hm(7, 5)));
        assert_eq!(ClockTime::from_hm(7, 5).to_string(), "07:05");
        assert_eq!(ClockTime::from_hm(0, 0).to_string(), "00:00");
    }

    #[test]
    fn malformed_input_degrades_to_midnight() {
        for bad in ["", "0700", "ab:cd", "7", ":30", "07:"] {
            assert_eq!(ClockTime::parse(bad), None, "{bad:?} should not parse");
            assert_eq!(ClockTime::parse_lenient(bad), ClockTime::MIDNIGHT);
        }
    }

    #[test]
    fn numeric_out_of_range_wraps() {
        assert_eq!(ClockTime::parse("25:00"), Some(ClockTime::from_hm(1, 0)));
        assert_eq!(ClockTime::parse("24:00"), Some(ClockTime::MIDNIGHT));
    }

    #[test]
    fn negative_minutes_normalize() {
        assert_eq!(ClockTime::from_minutes(-1).minutes(), 1439);
        assert_eq!(ClockTime::from_minutes(-1440).minutes(), 0);
        assert_eq!(ClockTime::from_minutes(1440).minutes(), 0);
        assert_eq!(ClockTime::from_minutes(2885).minutes(), 5);
    }

    #[test]
    fn minutes_since_wraps_forward() {
        let wake = ClockTime::from_hm(7, 0);
        assert_eq!(ClockTime::from_hm(7, 0).minutes_since(wake), 0);
        assert_eq!(ClockTime::from_hm(9, 30).minutes_since(wake), 150);
        // 03:00 is "the next morning" relative to a 07:00 wake-up.
        assert_eq!(ClockTime::from_hm(3, 0).minutes_since(wake), 1200);
        assert_eq!(ClockTime::from_hm(6, 59).minutes_since(wake), 1439);
    }

    #[test]
    fn twelve_hour_labels() {
        assert_eq!(ClockTime::from_hm(0, 15).format_12h(true), "12:15 AM");
        assert_eq!(ClockTime::from_hm(9, 5).format_12h(true), "9:05 AM");
        assert_eq!(ClockTime::from_hm(12, 0).format_12h(false), "12 PM");
        assert_eq!(ClockTime::from_hm(23, 0).format_12h(false), "11 PM");
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration_minutes(45), "45min");
        assert_eq!(format_duration_minutes(60), "1h");
        assert_eq!(format_duration_minutes(90), "1h 30m");
    }

    #[test]
    fn serde_round_trips_as_string() {
        let time = ClockTime::from_hm(6, 30);
        let json = serde_json::to_string(&time).unwrap();
        assert_eq!(json, "\"06:30\"");
        let back: ClockTime = serde_json::from_str(&json).unwrap();
        assert_eq!(back, time);
    }

    proptest! {
        #[test]
        fn from_minutes_matches_double_modulo(m in -100_000i64..100_000) {
            let t = ClockTime::from_minutes(m);
            prop_assert_eq!(
                i64::from(t.minutes()),
                ((m % MINUTES_PER_DAY) + MINUTES_PER_DAY) % MINUTES_PER_DAY
            );
        }

        #[test]
        fn parse_display_round_trip(m in 0i64..MINUTES_PER_DAY) {
            let t = ClockTime::from_minutes(m);
            prop_assert_eq!(ClockTime::parse(&t.to_string()), Some(t));
        }

        #[test]
        fn minutes_since_is_inverse_of_add(t in 0i64..MINUTES_PER_DAY, w in 0i64..MINUTES_PER_DAY) {
            let time = ClockTime::from_minutes(t);
            let wake = ClockTime::from_minutes(w);
            let since = time.minutes_since(wake);
            prop_assert!(since <= 1439);
            prop_assert_eq!(wake.add_minutes(i64::from(since)), time);
        }
    }
}
