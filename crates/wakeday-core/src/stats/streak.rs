//! Consecutive-day completion streaks.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime};

use crate::day::WakeDay;

/// Days counting toward a streak must close at or above this rate.
pub const STREAK_MIN_RATE: u32 = 80;

/// Length of the streak of qualifying days ending now.
///
/// Qualifying days are completed with a rate of at least 80 percent. The
/// walk starts from `now` and follows wake timestamps backward: the first
/// hop tolerates a full day so an in-progress today neither counts nor
/// breaks anything, and every later day must land on the expected date,
/// one day earlier each step. A day that misses its slot, including a day
/// that fell below the rate threshold, breaks the chain.
pub fn streak(days: &BTreeMap<String, WakeDay>, now: NaiveDateTime) -> u32 {
    let mut qualifying: Vec<NaiveDateTime> = days
        .values()
        .filter(|day| day.is_completed && day.stats.rate >= STREAK_MIN_RATE)
        .map(WakeDay::wake_timestamp)
        .collect();
    qualifying.sort_by(|a, b| b.cmp(a));

    let mut count = 0;
    let mut expected = now;
    let mut tolerance_days = 1;
    for started in qualifying {
        if expected.signed_duration_since(started).num_days() <= tolerance_days {
            count += 1;
            expected = started - Duration::days(1);
            tolerance_days = 0;
        } else {
            break;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::day::key::make_key;
    use crate::day::{DayStats, WakeDay};
    use crate::time::ClockTime;
    use chrono::NaiveDate;

    fn completed_day(date: NaiveDate, rate: u32) -> WakeDay {
        let mut day = WakeDay::new(date, ClockTime::from_hm(6, 0), Vec::new());
        day.is_completed = true;
        day.stats = DayStats {
            total: 10,
            completed: rate / 10,
            rate,
        };
        day
    }

    fn insert(days: &mut BTreeMap<String, WakeDay>, day: WakeDay) {
        days.insert(make_key(day.date, day.wake_time), day);
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn three_consecutive_days_with_today_open() {
        let mut days = BTreeMap::new();
        insert(&mut days, completed_day(date(7), 90));
        insert(&mut days, completed_day(date(8), 100));
        insert(&mut days, completed_day(date(9), 80));
        // Today (the 10th) is still in progress and not in the map.
        let now = date(10).and_time(ClockTime::from_hm(12, 0).as_naive_time());
        assert_eq!(streak(&days, now), 3);
    }

    #[test]
    fn low_rate_day_breaks_the_chain() {
        let mut days = BTreeMap::new();
        insert(&mut days, completed_day(date(6), 90));
        insert(&mut days, completed_day(date(7), 70));
        insert(&mut days, completed_day(date(8), 90));
        insert(&mut days, completed_day(date(9), 90));
        let now = date(10).and_time(ClockTime::from_hm(12, 0).as_naive_time());
        // Only the unbroken suffix past the 70% day counts.
        assert_eq!(streak(&days, now), 2);
    }

    #[test]
    fn replacing_a_day_with_low_rate_leaves_only_the_suffix() {
        let mut days = BTreeMap::new();
        insert(&mut days, completed_day(date(7), 90));
        insert(&mut days, completed_day(date(8), 70));
        insert(&mut days, completed_day(date(9), 90));
        let now = date(10).and_time(ClockTime::from_hm(12, 0).as_naive_time());
        assert_eq!(streak(&days, now), 1);
    }

    #[test]
    fn gap_of_more_than_a_day_breaks_the_chain() {
        let mut days = BTreeMap::new();
        insert(&mut days, completed_day(date(5), 90));
        insert(&mut days, completed_day(date(9), 90));
        let now = date(10).and_time(ClockTime::from_hm(12, 0).as_naive_time());
        assert_eq!(streak(&days, now), 1);
    }

    #[test]
    fn incomplete_days_do_not_qualify() {
        let mut days = BTreeMap::new();
        let mut open = completed_day(date(9), 90);
        open.is_completed = false;
        insert(&mut days, open);
        let now = date(10).and_time(ClockTime::from_hm(12, 0).as_naive_time());
        assert_eq!(streak(&days, now), 0);
    }

    #[test]
    fn empty_history_is_zero() {
        let now = date(10).and_time(ClockTime::from_hm(12, 0).as_naive_time());
        assert_eq!(streak(&BTreeMap::new(), now), 0);
    }
}
