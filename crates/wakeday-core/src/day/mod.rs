//! Habit and wake-day data model.
//!
//! A `WakeDay` owns a snapshot of its habits: history stays stable when the
//! user later edits the routine, and each new day is seeded from a template
//! copy of the previous one with every completion flag reset.

pub mod key;
pub mod lifecycle;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time::ClockTime;

/// Longest accepted title or tag text; longer input is truncated.
const MAX_TEXT_LEN: usize = 100;

/// Wake-relative offsets live in `[1, 1439]`: 0 is reserved for the wake
/// marker itself and 1440 for the virtual end-of-day marker.
pub(crate) fn clamp_offset(minutes: i64) -> u16 {
    minutes.clamp(1, 1439) as u16
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn sanitize(text: &str) -> String {
    text.trim().chars().take(MAX_TEXT_LEN).collect()
}

/// How a habit is anchored within the wake day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Scheduling {
    /// An absolute clock time, re-interpreted relative to each day's wake.
    Fixed { time: ClockTime },
    /// Minutes after wake-up, clamped to `[1, 1439]`.
    Dynamic { offset_minutes: u16 },
}

/// A checklist item under a habit, completed independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubHabit {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub completed: bool,
}

/// A recurring activity positioned on the wake-relative timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Expected length in minutes; also sizes the pre-due warning window.
    pub duration_minutes: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub sub_habits: Vec<SubHabit>,
    pub scheduling: Scheduling,
    /// Resolved clock time for the current wake day.
    pub effective_time: ClockTime,
    pub completed: bool,
    /// Pixel position on the current timeline; rebuilt every layout pass.
    #[serde(skip)]
    pub position: f64,
    /// Filtered out of the current timeline view.
    #[serde(skip)]
    pub hidden: bool,
}

impl Habit {
    /// Build a habit from user input. `None` when the title is blank.
    pub fn from_draft(draft: HabitDraft, wake: ClockTime) -> Option<Habit> {
        let title = sanitize(&draft.title);
        if title.is_empty() {
            return None;
        }

        let mut tags: Vec<String> = Vec::new();
        for tag in &draft.tags {
            let tag = sanitize(tag).to_lowercase();
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        let sub_habits = draft
            .sub_habits
            .into_iter()
            .filter_map(|sub| {
                let title = sanitize(&sub.title);
                if title.is_empty() {
                    return None;
                }
                Some(SubHabit {
                    id: sub.id.unwrap_or_else(new_id),
                    title,
                    description: sub.description,
                    completed: sub.completed,
                })
            })
            .collect();

        let scheduling = match draft.scheduling {
            Scheduling::Dynamic { offset_minutes } => Scheduling::Dynamic {
                offset_minutes: clamp_offset(i64::from(offset_minutes)),
            },
            fixed => fixed,
        };

        let mut habit = Habit {
            id: new_id(),
            title,
            description: draft.description,
            duration_minutes: draft.duration_minutes,
            tags,
            sub_habits,
            scheduling,
            effective_time: wake,
            completed: false,
            position: 0.0,
            hidden: false,
        };
        habit.resolve_effective_time(wake);
        // A fixed time is stored in its clamped form so re-resolving it
        // against the same wake time is a no-op.
        if let Scheduling::Fixed { ref mut time } = habit.scheduling {
            *time = habit.effective_time;
        }
        Some(habit)
    }

    /// Apply an edit, preserving what the user has already done today:
    /// the habit's own completed flag survives, and sub-habit completion is
    /// carried over by id. Everything else comes from the draft.
    /// Returns false (and changes nothing) when the draft title is blank.
    pub fn apply_edit(&mut self, draft: HabitDraft, wake: ClockTime) -> bool {
        let Some(mut incoming) = Habit::from_draft(draft, wake) else {
            return false;
        };
        incoming.id = self.id.clone();
        incoming.completed = self.completed;
        for sub in &mut incoming.sub_habits {
            if let Some(existing) = self.sub_habits.iter().find(|s| s.id == sub.id) {
                sub.completed = existing.completed;
            }
        }
        *self = incoming;
        true
    }

    /// Recompute `effective_time`, pinned into wake-relative `[1, 1439]`.
    pub fn resolve_effective_time(&mut self, wake: ClockTime) {
        let offset = match self.scheduling {
            Scheduling::Dynamic { offset_minutes } => clamp_offset(i64::from(offset_minutes)),
            Scheduling::Fixed { time } => clamp_offset(i64::from(time.minutes_since(wake))),
        };
        self.effective_time = wake.add_minutes(i64::from(offset));
    }

    pub fn minutes_since_wake(&self, wake: ClockTime) -> u16 {
        self.effective_time.minutes_since(wake)
    }

    /// Completing a habit force-completes its checklist. Un-completing
    /// leaves sub-habit flags untouched, and completing every sub-habit
    /// never completes the parent.
    pub fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
        if completed {
            for sub in &mut self.sub_habits {
                sub.completed = true;
            }
        }
    }

    /// Template copy used to seed the next wake day: same definition, all
    /// completion flags reset.
    pub fn as_template(&self) -> Habit {
        let mut template = self.clone();
        template.completed = false;
        for sub in &mut template.sub_habits {
            sub.completed = false;
        }
        template.position = 0.0;
        template.hidden = false;
        template
    }
}

/// Sub-habit fields as entered in the editor.
#[derive(Debug, Clone, Default)]
pub struct SubHabitDraft {
    /// Existing id when editing; `None` mints a new one.
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub completed: bool,
}

/// Habit fields as entered in the editor, before sanitization.
#[derive(Debug, Clone)]
pub struct HabitDraft {
    pub title: String,
    pub description: String,
    pub duration_minutes: u32,
    pub tags: Vec<String>,
    pub sub_habits: Vec<SubHabitDraft>,
    pub scheduling: Scheduling,
}

impl Default for HabitDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            duration_minutes: 30,
            tags: Vec::new(),
            sub_habits: Vec::new(),
            scheduling: Scheduling::Fixed {
                time: ClockTime::from_hm(9, 0),
            },
        }
    }
}

/// Completion counters for one wake day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayStats {
    pub total: u32,
    pub completed: u32,
    /// Whole-percent completion; 0 when the day has no habits.
    pub rate: u32,
}

impl DayStats {
    pub fn of(habits: &[Habit]) -> Self {
        let total = habits.len() as u32;
        let completed = habits.iter().filter(|h| h.completed).count() as u32;
        Self {
            total,
            completed,
            rate: percent(completed, total),
        }
    }
}

/// Rounded whole percent, 0 for an empty denominator.
pub(crate) fn percent(completed: u32, total: u32) -> u32 {
    if total == 0 {
        0
    } else {
        (completed * 100 + total / 2) / total
    }
}

/// One lifecycle instance of "being awake", from wake-up to sleep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WakeDay {
    pub date: NaiveDate,
    pub wake_time: ClockTime,
    /// Snapshot owned by this day, not a live reference.
    pub habits: Vec<Habit>,
    pub is_completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub auto_completed: bool,
    #[serde(default)]
    pub stats: DayStats,
}

impl WakeDay {
    pub fn new(date: NaiveDate, wake_time: ClockTime, habits: Vec<Habit>) -> Self {
        let stats = DayStats::of(&habits);
        Self {
            date,
            wake_time,
            habits,
            is_completed: false,
            completed_at: None,
            auto_completed: false,
            stats,
        }
    }

    pub fn recompute_stats(&mut self) {
        self.stats = DayStats::of(&self.habits);
    }

    /// Finalize on sleep or expiry.
    pub fn complete(&mut self, now: DateTime<Utc>, auto: bool) {
        self.recompute_stats();
        self.is_completed = true;
        self.completed_at = Some(now);
        self.auto_completed = auto;
    }

    pub fn wake_timestamp(&self) -> NaiveDateTime {
        self.date.and_time(self.wake_time.as_naive_time())
    }
}

/// Stable sort by wake-relative time.
pub fn sort_by_wake_order(habits: &mut [Habit], wake: ClockTime) {
    habits.sort_by_key(|h| h.effective_time.minutes_since(wake));
}

/// Time-relative display status of a habit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HabitStatus {
    Completed,
    /// The due time passed without completion.
    Overdue,
    /// Inside the pre-due warning window; progress runs from 0.0 at the
    /// window start to 1.0 at the due minute.
    Warning { progress: f64 },
    Upcoming,
}

/// Warning window ahead of the due time, never narrower than 10 minutes.
fn warning_window(habit: &Habit) -> i64 {
    i64::from(habit.duration_minutes.max(10))
}

pub fn habit_status(habit: &Habit, wake: ClockTime, now: ClockTime) -> HabitStatus {
    if habit.completed {
        return HabitStatus::Completed;
    }
    let due = i64::from(habit.effective_time.minutes_since(wake));
    let current = i64::from(now.minutes_since(wake));
    let window = warning_window(habit);
    if current > due {
        HabitStatus::Overdue
    } else if current >= due - window {
        HabitStatus::Warning {
            progress: (current - (due - window)) as f64 / window as f64,
        }
    } else {
        HabitStatus::Upcoming
    }
}

/// The next habit still comfortably in the future, shown as "current".
/// Habits already inside their warning window do not qualify.
pub fn next_upcoming<'a>(
    habits: &'a [Habit],
    wake: ClockTime,
    now: ClockTime,
) -> Option<&'a Habit> {
    let current = i64::from(now.minutes_since(wake));
    habits
        .iter()
        .filter(|h| !h.completed)
        .filter(|h| {
            let due = i64::from(h.effective_time.minutes_since(wake));
            current < due - warning_window(h)
        })
        .min_by_key(|h| i64::from(h.effective_time.minutes_since(wake)) - current)
}
