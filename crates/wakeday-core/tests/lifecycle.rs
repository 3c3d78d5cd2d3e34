//! End-to-end lifecycle scenarios against the file-backed store.

use chrono::{NaiveDate, NaiveDateTime};
use wakeday_core::{
    ClockTime, DayPhase, HabitDraft, JsonFileStore, RoutineController, Scheduling, Store,
};

fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, day)
        .unwrap()
        .and_time(ClockTime::from_hm(hour, minute).as_naive_time())
}

fn dynamic_draft(title: &str, offset: u16) -> HabitDraft {
    HabitDraft {
        title: title.to_string(),
        scheduling: Scheduling::Dynamic {
            offset_minutes: offset,
        },
        ..HabitDraft::default()
    }
}

#[test]
fn wake_edit_sleep_persists_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("document.json");

    {
        let mut controller = RoutineController::new(JsonFileStore::at(&path));
        controller.startup(at(10, 6, 55));
        assert_eq!(controller.phase(), DayPhase::NoDay);

        controller.wake_up(at(10, 7, 0)).unwrap();
        controller.add_habit(dynamic_draft("stretch", 60)).unwrap();
        let id = controller.habits()[0].id.clone();
        assert_eq!(
            controller.habits()[0].effective_time,
            ClockTime::from_hm(8, 0)
        );

        // Push the routine an extra half hour out.
        controller
            .edit_habit(&id, dynamic_draft("stretch", 90))
            .unwrap();
        assert_eq!(
            controller.habits()[0].effective_time,
            ClockTime::from_hm(8, 30)
        );

        controller.go_to_sleep(at(10, 22, 0)).unwrap();
        assert_eq!(controller.phase(), DayPhase::NoDay);
    }

    // Everything must have reached disk, habit count included.
    let doc = JsonFileStore::at(&path).load();
    let day = doc.days.get("2024-03-10_07:00").expect("day persisted");
    assert!(day.is_completed);
    assert!(!day.auto_completed);
    assert!(day.completed_at.is_some());
    assert_eq!(day.stats.total, day.habits.len() as u32);
    assert_eq!(day.habits.len(), 1);
    assert_eq!(
        day.habits[0].scheduling,
        Scheduling::Dynamic { offset_minutes: 90 }
    );
}

#[test]
fn restart_resumes_the_open_day() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("document.json");

    {
        let mut controller = RoutineController::new(JsonFileStore::at(&path));
        controller.startup(at(10, 6, 55));
        controller.wake_up(at(10, 7, 0)).unwrap();
        controller.add_habit(dynamic_draft("stretch", 60)).unwrap();
    }

    let mut controller = RoutineController::new(JsonFileStore::at(&path));
    controller.startup(at(10, 13, 0));
    assert_eq!(controller.phase(), DayPhase::Awake);
    assert_eq!(controller.current_key(), Some("2024-03-10_07:00"));
    assert_eq!(controller.wake_time(), ClockTime::from_hm(7, 0));
    assert_eq!(controller.habits().len(), 1);
}

#[test]
fn restart_after_24h_sweeps_the_day_closed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("document.json");

    {
        let mut controller = RoutineController::new(JsonFileStore::at(&path));
        controller.startup(at(1, 5, 55));
        controller.wake_up(at(1, 6, 0)).unwrap();
        controller.add_habit(dynamic_draft("stretch", 60)).unwrap();
    }

    let mut controller = RoutineController::new(JsonFileStore::at(&path));
    controller.startup(at(10, 9, 0));
    assert_eq!(controller.phase(), DayPhase::NoDay);

    let day = &controller.days()["2024-03-01_06:00"];
    assert!(day.is_completed);
    assert!(day.auto_completed);
}

#[test]
fn consecutive_days_build_history_and_streak() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("document.json");

    let mut controller = RoutineController::new(JsonFileStore::at(&path));
    controller.startup(at(7, 5, 55));

    for day in 7..=9 {
        controller.wake_up(at(day, 6, 0)).unwrap();
        if controller.habits().is_empty() {
            controller.add_habit(dynamic_draft("stretch", 60)).unwrap();
        }
        // The template seeds the habit uncompleted each morning.
        assert!(controller.habits().iter().all(|h| !h.completed));
        let id = controller.habits()[0].id.clone();
        controller.toggle_habit_completion(&id).unwrap();
        controller.go_to_sleep(at(day, 22, 0)).unwrap();
    }

    let now = at(10, 12, 0);
    assert_eq!(controller.days().len(), 3);
    assert_eq!(controller.streak(now), 3);
    assert_eq!(controller.weekly_rate(now), 100);

    let report = controller.daily_stats(now);
    assert_eq!(report.yesterday.rate, 100);
    // No open day today, so the today bucket reads zeros.
    assert_eq!(report.today.total, 0);
    assert_eq!(report.all_time.completed, 3);
}

#[test]
fn second_wake_on_one_date_gets_its_own_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("document.json");

    let mut controller = RoutineController::new(JsonFileStore::at(&path));
    controller.startup(at(10, 5, 55));

    controller.wake_up(at(10, 6, 0)).unwrap();
    controller.go_to_sleep(at(10, 10, 0)).unwrap();
    // Nap over; the same calendar date wakes again.
    controller.wake_up(at(10, 14, 30)).unwrap();

    assert_eq!(controller.current_key(), Some("2024-03-10_14:30"));
    assert!(controller.days().contains_key("2024-03-10_06:00"));
    assert!(controller.days().contains_key("2024-03-10_14:30"));
}
