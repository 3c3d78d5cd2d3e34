//! # Wakeday Core Library
//!
//! Core engine for a wake-relative daily routine tracker. A day begins when
//! the user wakes up and ends when they choose to sleep, so every habit is
//! positioned against that wake moment rather than against midnight. The
//! interactive UI is a thin layer over this library.
//!
//! ## Architecture
//!
//! - **Day lifecycle**: a caller-driven state machine over wake days --
//!   the host invokes [`RoutineController`] methods and ticks it once a
//!   minute for expiry and highlighting maintenance
//! - **Timeline**: fixed-pitch segment layout with density-adaptive
//!   time-scale markers, plus the pixel/time mapper behind
//!   drag-to-reschedule
//! - **Storage**: one JSON document behind the [`Store`] seam, with an
//!   optional later-write-wins remote mirror
//! - **Stats**: streaks and date-windowed completion rollups
//! - **Notifications**: pure reminder planning, delivered through the
//!   [`Notifier`] seam on cancelable tasks
//!
//! ## Key Components
//!
//! - [`RoutineController`]: the application state machine
//! - [`generate_timeline`](timeline::generate_timeline): layout engine
//! - [`JsonFileStore`]: best-effort local persistence
//! - [`Config`]: TOML application configuration

pub mod config;
pub mod day;
pub mod error;
pub mod events;
pub mod logging;
pub mod notify;
pub mod stats;
pub mod storage;
pub mod time;
pub mod timeline;

pub use config::Config;
pub use day::lifecycle::{DayPhase, RoutineController, TickDriver};
pub use day::{
    DayStats, Habit, HabitDraft, HabitStatus, Scheduling, SubHabit, SubHabitDraft, WakeDay,
};
pub use error::{ConfigError, CoreError, StorageError};
pub use events::Event;
pub use notify::{Notifier, ReminderPlan, ReminderScheduler};
pub use stats::{DailyStatsReport, PeriodStats};
pub use storage::{DocumentState, JsonFileStore, MemoryStore, MirroredStore, Settings, Store};
pub use time::ClockTime;
pub use timeline::{
    DragPreview, MappedTime, Segment, SlotKind, TimeSlot, Timeline, TimelineGeometry,
};
