//! Reminder planning and fire-and-forget delivery.
//!
//! Planning is pure: given the current habits and the clock, it yields the
//! reminders that should fire over the next 24 hours. Delivery is delegated
//! to the host through the [`Notifier`] seam and runs on detached tasks
//! that are all cancelable on teardown.

use std::sync::Arc;

use chrono::{Duration, NaiveDateTime};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::day::Habit;
use crate::time::format_duration_minutes;

/// Delivery seam for the host notification system.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, body: &str);
}

/// Minutes before the due time at which the secondary warning fires.
pub const DEFAULT_WARNING_LEAD_MINUTES: i64 = 10;

/// A planned reminder for one habit: the due notification plus, when there
/// is enough lead, a warning beforehand.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderPlan {
    pub habit_id: String,
    pub habit_title: String,
    pub body: String,
    pub fire_at: NaiveDateTime,
    pub warn_at: Option<NaiveDateTime>,
}

/// Plan reminders for every incomplete habit.
///
/// A due time that already passed today rolls to tomorrow; anything landing
/// 24 hours or more out is dropped.
pub fn plan_reminders(
    habits: &[Habit],
    now: NaiveDateTime,
    warning_lead_minutes: i64,
) -> Vec<ReminderPlan> {
    let mut plans = Vec::new();
    for habit in habits {
        if habit.completed {
            continue;
        }
        let mut fire_at = now.date().and_time(habit.effective_time.as_naive_time());
        if fire_at <= now {
            fire_at += Duration::days(1);
        }
        let until = fire_at.signed_duration_since(now);
        if until >= Duration::hours(24) {
            continue;
        }
        let warn_at = (until > Duration::minutes(warning_lead_minutes))
            .then(|| fire_at - Duration::minutes(warning_lead_minutes));

        plans.push(ReminderPlan {
            habit_id: habit.id.clone(),
            habit_title: habit.title.clone(),
            body: if habit.description.is_empty() {
                format!(
                    "Planned for {}",
                    format_duration_minutes(habit.duration_minutes)
                )
            } else {
                habit.description.clone()
            },
            fire_at,
            warn_at,
        });
    }
    plans
}

/// Fire-and-forget reminder delivery.
///
/// One detached task per plan; `cancel_all` (or drop) aborts everything so
/// teardown never leaves stray timers behind.
#[derive(Default)]
pub struct ReminderScheduler {
    handles: Vec<JoinHandle<()>>,
}

impl ReminderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any previously scheduled reminders with `plans`.
    pub fn schedule(
        &mut self,
        plans: Vec<ReminderPlan>,
        notifier: Arc<dyn Notifier>,
        now: NaiveDateTime,
    ) {
        self.cancel_all();
        for plan in plans {
            let notifier = Arc::clone(&notifier);
            let due_in = plan
                .fire_at
                .signed_duration_since(now)
                .to_std()
                .unwrap_or_default();
            let warn_in = plan
                .warn_at
                .map(|at| at.signed_duration_since(now).to_std().unwrap_or_default());
            let lead_minutes = plan
                .warn_at
                .map(|at| plan.fire_at.signed_duration_since(at).num_minutes())
                .unwrap_or(DEFAULT_WARNING_LEAD_MINUTES);

            self.handles.push(tokio::spawn(async move {
                if let Some(warn_in) = warn_in {
                    tokio::time::sleep(warn_in).await;
                    notifier.notify(
                        &format!("Upcoming: {}", plan.habit_title),
                        &format!("Starting in {lead_minutes} minutes"),
                    );
                    tokio::time::sleep(due_in.saturating_sub(warn_in)).await;
                } else {
                    tokio::time::sleep(due_in).await;
                }
                notifier.notify(&format!("Time for: {}", plan.habit_title), &plan.body);
            }));
        }
        debug!(count = self.handles.len(), "reminders scheduled");
    }

    pub fn cancel_all(&mut self) {
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
