use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::day::DayStats;
use crate::time::ClockTime;

/// Every state change in the system produces an Event.
/// The UI layer consumes them; by the time an event is returned, the
/// post-mutation persistence side effect has already run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A new wake day started.
    WokeUp {
        key: String,
        wake_time: ClockTime,
        habit_count: usize,
        at: DateTime<Utc>,
    },
    /// The current wake day was finalized, either by an explicit sleep
    /// action or by background expiry. `save_ok` is false when the final
    /// write failed; hosts surface that for explicit sleeps.
    DayCompleted {
        key: String,
        auto: bool,
        stats: DayStats,
        save_ok: bool,
        at: DateTime<Utc>,
    },
    HabitUpserted {
        id: String,
        at: DateTime<Utc>,
    },
    HabitRemoved {
        id: String,
        at: DateTime<Utc>,
    },
    HabitCompletionToggled {
        id: String,
        completed: bool,
        at: DateTime<Utc>,
    },
    SubHabitToggled {
        habit_id: String,
        sub_habit_id: String,
        completed: bool,
        at: DateTime<Utc>,
    },
    /// A habit was dropped onto a new timeline position.
    HabitRescheduled {
        id: String,
        minutes_since_wake: u16,
        time: ClockTime,
        at: DateTime<Utc>,
    },
}
