//! Date-windowed completion rollups.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::day::{percent, DayStats, WakeDay};

/// Completion counters for one reporting window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PeriodStats {
    pub completed: u32,
    pub total: u32,
    pub rate: u32,
}

impl PeriodStats {
    fn from_counts(completed: u32, total: u32) -> Self {
        Self {
            completed,
            total,
            rate: percent(completed, total),
        }
    }

    fn from_day(stats: DayStats) -> Self {
        Self {
            completed: stats.completed,
            total: stats.total,
            rate: stats.rate,
        }
    }
}

/// Snapshot across the standard reporting windows.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct DailyStatsReport {
    pub today: PeriodStats,
    pub yesterday: PeriodStats,
    pub week: PeriodStats,
    pub all_time: PeriodStats,
}

/// Rounded completion percentage over the trailing seven days, inclusive.
pub fn weekly_rate(days: &BTreeMap<String, WakeDay>, now: NaiveDateTime) -> u32 {
    let week_ago = now - Duration::days(7);
    let mut total = 0;
    let mut completed = 0;
    for day in days.values() {
        let started = day.wake_timestamp();
        if started >= week_ago && started <= now {
            total += day.stats.total;
            completed += day.stats.completed;
        }
    }
    percent(completed, total)
}

/// Per-window rollups.
///
/// The today bucket only sees the still-open day: a wake day already marked
/// completed has rolled into history and never lands there, even when its
/// calendar date matches. A user who slept before reading the report sees
/// zeros for "today".
pub fn daily_stats(days: &BTreeMap<String, WakeDay>, now: NaiveDateTime) -> DailyStatsReport {
    let today = now.date();
    let yesterday = today - Duration::days(1);
    let week_ago = now - Duration::days(7);

    let mut report = DailyStatsReport::default();
    let mut week_total = 0;
    let mut week_completed = 0;
    let mut all_total = 0;
    let mut all_completed = 0;

    for day in days.values() {
        if day.date == today && !day.is_completed {
            report.today = PeriodStats::from_day(day.stats);
        } else if day.date == yesterday {
            report.yesterday = PeriodStats::from_day(day.stats);
        }

        let started = day.wake_timestamp();
        if started >= week_ago && started <= now {
            week_total += day.stats.total;
            week_completed += day.stats.completed;
        }
        all_total += day.stats.total;
        all_completed += day.stats.completed;
    }

    report.week = PeriodStats::from_counts(week_completed, week_total);
    report.all_time = PeriodStats::from_counts(all_completed, all_total);
    report
}

/// Rate deltas for the end-of-day summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SummaryDeltas {
    pub vs_yesterday: i32,
    pub vs_week: i32,
}

pub fn summary_deltas(report: &DailyStatsReport) -> SummaryDeltas {
    SummaryDeltas {
        vs_yesterday: report.today.rate as i32 - report.yesterday.rate as i32,
        vs_week: report.today.rate as i32 - report.week.rate as i32,
    }
}
