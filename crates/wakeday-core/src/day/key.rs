//! Wake-day identity.
//!
//! A wake day is keyed `YYYY-MM-DD_HH:MM`: the calendar date it started on
//! plus the wake time. Waking twice on one calendar date produces two
//! distinct keys, so a key names exactly one lifecycle instance.

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::day::WakeDay;
use crate::time::ClockTime;

/// Wake days older than this are finalized automatically.
pub const EXPIRY_THRESHOLD_HOURS: i64 = 24;

/// The two components encoded in a wake-day key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedKey {
    pub date: NaiveDate,
    pub wake_time: ClockTime,
}

pub fn make_key(date: NaiveDate, wake_time: ClockTime) -> String {
    format!("{}_{}", date.format("%Y-%m-%d"), wake_time)
}

/// Parse a wake-day key.
///
/// `None` unless the key splits into exactly two `_`-separated parts shaped
/// `\d{4}-\d{2}-\d{2}` and `\d{2}:\d{2}`, with the date naming a real
/// calendar day. Callers treat `None` as invalid-and-expired.
pub fn parse_key(key: &str) -> Option<ParsedKey> {
    let mut parts = key.split('_');
    let date_part = parts.next()?;
    let time_part = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    if !is_strict_date(date_part) || !is_strict_time(time_part) {
        return None;
    }
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()?;
    let wake_time = ClockTime::parse(time_part)?;
    Some(ParsedKey { date, wake_time })
}

fn is_strict_date(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 10
        && b[4] == b'-'
        && b[7] == b'-'
        && [0, 1, 2, 3, 5, 6, 8, 9].iter().all(|&i| b[i].is_ascii_digit())
}

fn is_strict_time(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 5 && b[2] == b':' && [0, 1, 3, 4].iter().all(|&i| b[i].is_ascii_digit())
}

/// The instant this key's wake day began.
pub fn wake_timestamp(key: &str) -> Option<NaiveDateTime> {
    let parsed = parse_key(key)?;
    Some(parsed.date.and_time(parsed.wake_time.as_naive_time()))
}

/// Pure form of [`is_expired`] for a caller-supplied clock.
pub fn is_expired_at(key: &str, now: NaiveDateTime, threshold_hours: i64) -> bool {
    match wake_timestamp(key) {
        Some(started) => now.signed_duration_since(started).num_minutes() >= threshold_hours * 60,
        None => true,
    }
}

/// Whether the key's wake day started 24 or more wall-clock hours ago.
/// Unparseable keys count as expired.
pub fn is_expired(key: &str) -> bool {
    is_expired_at(key, Local::now().naive_local(), EXPIRY_THRESHOLD_HOURS)
}

/// Select the single most-recent uncompleted wake day.
///
/// Ties keep the first entry encountered in iteration order. Entries whose
/// key does not parse are skipped; startup expiry has already finalized
/// them by the time selection runs.
pub fn most_recent_uncompleted(
    days: &BTreeMap<String, WakeDay>,
) -> Option<(&String, &WakeDay)> {
    let mut best: Option<(&String, &WakeDay, NaiveDateTime)> = None;
    for (key, day) in days {
        if day.is_completed {
            continue;
        }
        let Some(started) = wake_timestamp(key) else {
            continue;
        };
        match best {
            Some((_, _, best_started)) if started <= best_started => {}
            _ => best = Some((key, day, started)),
        }
    }
    best.map(|(key, day, _)| (key, day))
}
