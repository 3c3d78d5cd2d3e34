//! Fixed-pitch interpolation anchors.

use crate::day::Habit;
use crate::time::ClockTime;
use crate::timeline::TimelineGeometry;

/// The virtual end-of-day anchor: 24 hours after wake.
pub const END_OF_DAY_MINUTES: u16 = 1440;

/// An anchor point for piecewise-linear position interpolation.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub position: f64,
    pub minutes_since_wake: u16,
    pub habit_id: Option<String>,
}

/// Build the anchor sequence: the wake anchor at the leading padding, one
/// anchor per visible habit (sorted by wake order) at a fixed pitch each,
/// and the virtual end-of-day anchor one pitch past the last habit.
///
/// Spacing is ordinal, not proportional: habits two minutes apart get the
/// same pitch as habits eight hours apart. With no habits only the wake
/// anchor is produced.
pub fn build_segments(
    habits: &[&Habit],
    wake: ClockTime,
    geometry: &TimelineGeometry,
) -> Vec<Segment> {
    let mut segments = Vec::with_capacity(habits.len() + 2);
    segments.push(Segment {
        position: geometry.edge_padding,
        minutes_since_wake: 0,
        habit_id: None,
    });

    let mut position = geometry.edge_padding;
    for habit in habits {
        position += geometry.tile_pitch;
        segments.push(Segment {
            position,
            minutes_since_wake: habit.effective_time.minutes_since(wake),
            habit_id: Some(habit.id.clone()),
        });
    }

    if !habits.is_empty() {
        position += geometry.tile_pitch;
        segments.push(Segment {
            position,
            minutes_since_wake: END_OF_DAY_MINUTES,
            habit_id: None,
        });
    }

    segments
}
