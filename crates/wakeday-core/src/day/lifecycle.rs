//! Day lifecycle state machine and the application controller.
//!
//! `RoutineController` owns all mutable application state. Every mutation
//! goes through a named method; each persists as a post-mutation side
//! effect and returns the resulting [`Event`], or `None` when the command
//! is invalid in the current phase. Persistence never blocks a state
//! transition: a failed write is logged and the in-memory state stands.
//!
//! The controller is single-threaded and caller-driven. The only background
//! activity is [`TickDriver`], a cancelable interval task that feeds tick
//! instants back into the owning event loop.

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate, NaiveDateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use super::key;
use super::{
    clamp_offset, habit_status, next_upcoming, sort_by_wake_order, DayStats, Habit, HabitDraft,
    HabitStatus, Scheduling, WakeDay,
};
use crate::events::Event;
use crate::stats;
use crate::storage::{DocumentState, Store};
use crate::time::ClockTime;
use crate::timeline::{
    self, DragPreview, DragState, Timeline, TimelineGeometry, OFFSCREEN_POSITION,
};

/// Whether a wake day is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPhase {
    /// No uncompleted wake day exists; the tracker waits for wake-up.
    NoDay,
    /// Exactly one uncompleted wake day is canonical.
    Awake,
}

/// The application controller.
pub struct RoutineController<S: Store> {
    store: S,
    doc: DocumentState,
    current_key: Option<String>,
    current_date: NaiveDate,
    wake_time: ClockTime,
    /// Working copy of the current day's habits, synced back into the
    /// document on every persist.
    habits: Vec<Habit>,
    tag_filter: Vec<String>,
    geometry: TimelineGeometry,
    timeline: Timeline,
    drag: DragState,
}

impl<S: Store> RoutineController<S> {
    /// Create an idle controller. Call [`startup`](Self::startup) next to
    /// load persisted state.
    pub fn new(store: S) -> Self {
        Self::with_geometry(store, TimelineGeometry::default())
    }

    pub fn with_geometry(store: S, geometry: TimelineGeometry) -> Self {
        let timeline = Timeline::idle(&geometry);
        Self {
            store,
            doc: DocumentState::default(),
            current_key: None,
            current_date: NaiveDate::default(),
            wake_time: ClockTime::MIDNIGHT,
            habits: Vec::new(),
            tag_filter: Vec::new(),
            geometry,
            timeline,
            drag: DragState::default(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> DayPhase {
        if self.current_key.is_some() {
            DayPhase::Awake
        } else {
            DayPhase::NoDay
        }
    }

    pub fn is_awake(&self) -> bool {
        self.phase() == DayPhase::Awake
    }

    /// The active day's wake time while awake; tracks the clock otherwise.
    pub fn wake_time(&self) -> ClockTime {
        self.wake_time
    }

    pub fn current_key(&self) -> Option<&str> {
        self.current_key.as_deref()
    }

    pub fn current_date(&self) -> NaiveDate {
        self.current_date
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn days(&self) -> &BTreeMap<String, WakeDay> {
        &self.doc.days
    }

    pub fn document(&self) -> &DocumentState {
        &self.doc
    }

    /// Live completion counters for the working habit list.
    pub fn current_stats(&self) -> DayStats {
        DayStats::of(&self.habits)
    }

    pub fn status_of(&self, habit: &Habit, now: NaiveDateTime) -> HabitStatus {
        habit_status(habit, self.wake_time, ClockTime::from_naive_time(now.time()))
    }

    /// The habit highlighted as "up next".
    pub fn current_habit(&self, now: NaiveDateTime) -> Option<&Habit> {
        next_upcoming(
            &self.habits,
            self.wake_time,
            ClockTime::from_naive_time(now.time()),
        )
    }

    /// Pixel position of the now-marker on the current timeline.
    pub fn current_time_position(&self, now: NaiveDateTime) -> f64 {
        timeline::time_to_position(
            ClockTime::from_naive_time(now.time()),
            &self.timeline.segments,
            self.wake_time,
            &self.geometry,
        )
    }

    /// Every tag in use, sorted and deduplicated.
    pub fn available_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self
            .habits
            .iter()
            .flat_map(|h| h.tags.iter().cloned())
            .collect();
        tags.sort();
        tags.dedup();
        tags
    }

    pub fn streak(&self, now: NaiveDateTime) -> u32 {
        stats::streak(&self.doc.days, now)
    }

    pub fn weekly_rate(&self, now: NaiveDateTime) -> u32 {
        stats::weekly_rate(&self.doc.days, now)
    }

    pub fn daily_stats(&self, now: NaiveDateTime) -> stats::DailyStatsReport {
        stats::daily_stats(&self.doc.days, now)
    }

    // ── Lifecycle transitions ────────────────────────────────────────

    /// Load persisted state and settle on the canonical wake day.
    ///
    /// Expired uncompleted days are finalized first; the most recent
    /// surviving uncompleted day becomes current, otherwise the controller
    /// idles in `NoDay`. A failed load degrades to an empty session.
    pub fn startup(&mut self, now: NaiveDateTime) {
        self.doc = self.store.load();

        // Finalize anything that expired while the app was closed.
        let mut swept = false;
        for (day_key, day) in self.doc.days.iter_mut() {
            if !day.is_completed && key::is_expired_at(day_key, now, key::EXPIRY_THRESHOLD_HOURS) {
                day.complete(Utc::now(), true);
                swept = true;
            }
        }
        if swept && !self.persist() {
            warn!("failed to persist startup expiry sweep");
        }

        let selected = key::most_recent_uncompleted(&self.doc.days).map(|(k, _)| k.clone());
        let Some(selected_key) = selected else {
            self.enter_no_day(now);
            return;
        };

        // The sweep normally catches this; guard anyway so a stale
        // selection can never become the active day.
        if key::is_expired_at(&selected_key, now, key::EXPIRY_THRESHOLD_HOURS) {
            if let Some(day) = self.doc.days.get_mut(&selected_key) {
                day.complete(Utc::now(), true);
            }
            self.persist();
            self.enter_no_day(now);
            return;
        }

        let (wake_time, date, habits) = match self.doc.days.get(&selected_key) {
            Some(day) => (day.wake_time, day.date, day.habits.clone()),
            None => {
                self.enter_no_day(now);
                return;
            }
        };
        info!(key = %selected_key, habits = habits.len(), "resumed wake day");
        self.current_key = Some(selected_key);
        self.wake_time = wake_time;
        self.current_date = date;
        self.habits = habits;
        for habit in &mut self.habits {
            habit.resolve_effective_time(wake_time);
        }
        sort_by_wake_order(&mut self.habits, wake_time);
        self.rebuild_timeline();
    }

    /// Begin a new wake day. Valid only in `NoDay`.
    ///
    /// The habit list is seeded from the most recent prior day of any
    /// completion status, with every completion flag reset.
    pub fn wake_up(&mut self, now: NaiveDateTime) -> Option<Event> {
        if self.current_key.is_some() {
            return None;
        }
        let wake_time = ClockTime::from_naive_time(now.time());
        let date = now.date();
        let new_key = key::make_key(date, wake_time);

        let mut habits: Vec<Habit> = self
            .doc
            .days
            .values()
            .max_by_key(|day| day.wake_timestamp())
            .map(|day| day.habits.iter().map(Habit::as_template).collect())
            .unwrap_or_default();
        for habit in &mut habits {
            habit.resolve_effective_time(wake_time);
        }
        sort_by_wake_order(&mut habits, wake_time);

        self.current_key = Some(new_key.clone());
        self.current_date = date;
        self.wake_time = wake_time;
        self.habits = habits;

        self.doc
            .days
            .insert(new_key.clone(), WakeDay::new(date, wake_time, self.habits.clone()));
        if !self.persist() {
            warn!(key = %new_key, "failed to persist new wake day");
        }
        self.rebuild_timeline();
        info!(key = %new_key, habits = self.habits.len(), "wake day started");

        Some(Event::WokeUp {
            key: new_key,
            wake_time,
            habit_count: self.habits.len(),
            at: Utc::now(),
        })
    }

    /// Finalize the current wake day. Valid only while awake.
    pub fn go_to_sleep(&mut self, now: NaiveDateTime) -> Option<Event> {
        let day_key = self.current_key.clone()?;
        self.finalize_current(day_key, now, false)
    }

    /// Periodic maintenance, driven every 60 seconds by the host.
    ///
    /// While awake, auto-completes the day once it expires, but only when
    /// the host reports the app out of foreground focus: an active session
    /// is never interrupted. While idle, keeps the displayed wake time
    /// tracking the clock.
    pub fn tick(&mut self, now: NaiveDateTime, in_foreground: bool) -> Option<Event> {
        match self.current_key.clone() {
            Some(day_key) => {
                if !in_foreground
                    && key::is_expired_at(&day_key, now, key::EXPIRY_THRESHOLD_HOURS)
                {
                    return self.finalize_current(day_key, now, true);
                }
                None
            }
            None => {
                self.wake_time = ClockTime::from_naive_time(now.time());
                None
            }
        }
    }

    fn finalize_current(&mut self, day_key: String, now: NaiveDateTime, auto: bool) -> Option<Event> {
        self.sync_current_into_doc(&day_key);
        let stats = match self.doc.days.get_mut(&day_key) {
            Some(day) => {
                day.complete(Utc::now(), auto);
                day.stats
            }
            None => DayStats::default(),
        };
        let save_ok = self.persist();
        if !save_ok {
            warn!(key = %day_key, auto, "end-of-day save failed");
        }
        info!(key = %day_key, auto, rate = stats.rate, "wake day completed");
        self.enter_no_day(now);
        Some(Event::DayCompleted {
            key: day_key,
            auto,
            stats,
            save_ok,
            at: Utc::now(),
        })
    }

    fn enter_no_day(&mut self, now: NaiveDateTime) {
        self.current_key = None;
        self.habits.clear();
        self.drag = DragState::default();
        self.wake_time = ClockTime::from_naive_time(now.time());
        self.current_date = now.date();
        self.rebuild_timeline();
    }

    // ── Habit mutations ──────────────────────────────────────────────

    /// Add a habit from editor input. `None` while asleep or when the
    /// draft title is blank.
    pub fn add_habit(&mut self, draft: HabitDraft) -> Option<Event> {
        if self.current_key.is_none() {
            return None;
        }
        let habit = Habit::from_draft(draft, self.wake_time)?;
        let id = habit.id.clone();
        self.habits.push(habit);
        self.after_change();
        Some(Event::HabitUpserted { id, at: Utc::now() })
    }

    /// Re-apply editor input to an existing habit, preserving completion
    /// state per the merge rules.
    pub fn edit_habit(&mut self, id: &str, draft: HabitDraft) -> Option<Event> {
        let wake = self.wake_time;
        let applied = self
            .habits
            .iter_mut()
            .find(|h| h.id == id)?
            .apply_edit(draft, wake);
        if !applied {
            return None;
        }
        self.after_change();
        Some(Event::HabitUpserted {
            id: id.to_string(),
            at: Utc::now(),
        })
    }

    pub fn delete_habit(&mut self, id: &str) -> Option<Event> {
        let before = self.habits.len();
        self.habits.retain(|h| h.id != id);
        if self.habits.len() == before {
            return None;
        }
        self.after_change();
        Some(Event::HabitRemoved {
            id: id.to_string(),
            at: Utc::now(),
        })
    }

    pub fn toggle_habit_completion(&mut self, id: &str) -> Option<Event> {
        let completed = {
            let habit = self.habits.iter_mut().find(|h| h.id == id)?;
            let completed = !habit.completed;
            habit.set_completed(completed);
            completed
        };
        self.after_change();
        Some(Event::HabitCompletionToggled {
            id: id.to_string(),
            completed,
            at: Utc::now(),
        })
    }

    pub fn toggle_sub_habit(&mut self, habit_id: &str, sub_id: &str) -> Option<Event> {
        let completed = {
            let habit = self.habits.iter_mut().find(|h| h.id == habit_id)?;
            let sub = habit.sub_habits.iter_mut().find(|s| s.id == sub_id)?;
            sub.completed = !sub.completed;
            sub.completed
        };
        self.after_change();
        Some(Event::SubHabitToggled {
            habit_id: habit_id.to_string(),
            sub_habit_id: sub_id.to_string(),
            completed,
            at: Utc::now(),
        })
    }

    /// Show only habits carrying one of `tags`; empty clears the filter.
    pub fn set_tag_filter(&mut self, tags: Vec<String>) {
        self.tag_filter = tags;
        self.rebuild_timeline();
    }

    pub fn tag_filter(&self) -> &[String] {
        &self.tag_filter
    }

    // ── Drag protocol ────────────────────────────────────────────────

    /// Start dragging a habit. The pointer origin is accepted for protocol
    /// symmetry; the tile's own position anchors the drag.
    pub fn drag_start(&mut self, habit_id: &str, _y: f64) -> bool {
        let position = match self.habits.iter().find(|h| h.id == habit_id) {
            Some(habit) => habit.position,
            None => return false,
        };
        self.drag.begin(habit_id, position);
        true
    }

    /// Track a pointer move. `None` without an active drag.
    pub fn drag_move(&mut self, y: f64) -> Option<DragPreview> {
        let position = self.drag.update(y, self.timeline.height)?;
        let mapped = timeline::position_to_time(position, &self.timeline.segments, self.wake_time);
        Some(DragPreview {
            habit_id: self.drag.dragging_habit()?.to_string(),
            position,
            time: mapped.time,
            label: mapped.time.format_12h(true),
        })
    }

    /// Drop the dragged habit, rescheduling it at the drop position. The
    /// resulting wake-relative offset is clamped into `[1, 1439]`, so a
    /// drop on the wake marker or the end-of-day marker still lands inside
    /// the day. `None` without an active drag.
    pub fn drag_end(&mut self) -> Option<Event> {
        let (habit_id, position) = self.drag.finish()?;
        let mapped = timeline::position_to_time(position, &self.timeline.segments, self.wake_time);
        let minutes_since_wake = clamp_offset(mapped.minutes_since_wake.floor() as i64);
        let new_time = self.wake_time.add_minutes(i64::from(minutes_since_wake));

        {
            let habit = self.habits.iter_mut().find(|h| h.id == habit_id)?;
            match &mut habit.scheduling {
                Scheduling::Dynamic { offset_minutes } => *offset_minutes = minutes_since_wake,
                Scheduling::Fixed { time } => *time = new_time,
            }
            habit.effective_time = new_time;
        }
        self.after_change();

        Some(Event::HabitRescheduled {
            id: habit_id,
            minutes_since_wake,
            time: new_time,
            at: Utc::now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Re-sort, re-layout, and persist after any habit mutation.
    fn after_change(&mut self) {
        sort_by_wake_order(&mut self.habits, self.wake_time);
        self.rebuild_timeline();
        if let Some(day_key) = self.current_key.clone() {
            self.sync_current_into_doc(&day_key);
            if !self.persist() {
                warn!("post-mutation save failed; continuing with in-memory state");
            }
        }
    }

    fn sync_current_into_doc(&mut self, day_key: &str) {
        if let Some(day) = self.doc.days.get_mut(day_key) {
            day.habits = self.habits.clone();
            day.recompute_stats();
        }
    }

    fn persist(&mut self) -> bool {
        self.doc.updated_at = Some(Utc::now());
        self.store.save(&self.doc)
    }

    fn rebuild_timeline(&mut self) {
        let filter = &self.tag_filter;
        for habit in &mut self.habits {
            habit.hidden =
                !filter.is_empty() && !habit.tags.iter().any(|tag| filter.contains(tag));
        }

        if self.current_key.is_none() {
            self.timeline = Timeline::idle(&self.geometry);
            return;
        }

        self.timeline = timeline::generate_timeline(&self.habits, self.wake_time, &self.geometry);
        for habit in &mut self.habits {
            habit.position = if habit.hidden {
                OFFSCREEN_POSITION
            } else {
                timeline::time_to_position(
                    habit.effective_time,
                    &self.timeline.segments,
                    self.wake_time,
                    &self.geometry,
                )
            };
        }
    }
}

/// Cancelable tick source for the 60-second maintenance cadence.
///
/// Owns a detached interval task that delivers tick instants over a
/// channel; the receiving event loop stays single-threaded and calls
/// [`RoutineController::tick`] itself. Stopping or dropping the driver
/// aborts the task.
pub struct TickDriver {
    handle: JoinHandle<()>,
}

impl TickDriver {
    pub const DEFAULT_PERIOD: std::time::Duration = std::time::Duration::from_secs(60);

    pub fn spawn(period: std::time::Duration) -> (Self, mpsc::Receiver<NaiveDateTime>) {
        let (tx, rx) = mpsc::channel(1);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first interval tick completes immediately; consume it so
            // the first delivery lands one full period in.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(Local::now().naive_local()).await.is_err() {
                    break;
                }
            }
        });
        (Self { handle }, rx)
    }

    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for TickDriver {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
