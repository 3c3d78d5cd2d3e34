//! Forward and inverse mapping between clock times and pixel positions.
//!
//! The two directions are mutual inverses only at segment anchors. Between
//! anchors, equal pixel deltas deliberately do NOT correspond to equal time
//! deltas: tiles keep a uniform visual size however close their clock times
//! sit, so the ruler stretches and compresses per segment pair.

use crate::time::ClockTime;
use crate::timeline::layout::interpolate_position;
use crate::timeline::segment::Segment;
use crate::timeline::TimelineGeometry;

/// Result of an inverse lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MappedTime {
    pub time: ClockTime,
    /// Fractional wake-relative minutes, before flooring into `time`.
    pub minutes_since_wake: f64,
}

/// Pixel position for a clock time. Falls back to the leading padding when
/// no segment pair bounds the target (for instance, an empty segment list).
pub fn time_to_position(
    time: ClockTime,
    segments: &[Segment],
    wake: ClockTime,
    geometry: &TimelineGeometry,
) -> f64 {
    let target = f64::from(time.minutes_since(wake));
    interpolate_position(target, segments).unwrap_or(geometry.edge_padding)
}

/// Clock time for a pixel position. Positions before the first anchor clamp
/// to the wake moment; positions past the last anchor clamp to the final
/// minute of the wake day.
pub fn position_to_time(position: f64, segments: &[Segment], wake: ClockTime) -> MappedTime {
    let Some(first) = segments.first() else {
        return MappedTime { time: wake, minutes_since_wake: 0.0 };
    };
    if position < first.position {
        return MappedTime { time: wake, minutes_since_wake: 0.0 };
    }
    if position > segments[segments.len() - 1].position {
        return MappedTime {
            time: wake.add_minutes(1439),
            minutes_since_wake: 1439.0,
        };
    }

    for pair in segments.windows(2) {
        let (start, end) = (&pair[0], &pair[1]);
        if position >= start.position && position <= end.position {
            let pixel_span = end.position - start.position;
            let progress = if pixel_span == 0.0 {
                0.0
            } else {
                (position - start.position) / pixel_span
            };
            let minutes_since_wake = f64::from(start.minutes_since_wake)
                + (f64::from(end.minutes_since_wake) - f64::from(start.minutes_since_wake))
                    * progress;
            return MappedTime {
                time: wake.add_minutes(minutes_since_wake.floor() as i64),
                minutes_since_wake,
            };
        }
    }

    MappedTime { time: wake, minutes_since_wake: 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::day::{Habit, HabitDraft, Scheduling};
    use crate::timeline::segment::build_segments;

    fn wake() -> ClockTime {
        ClockTime::from_hm(7, 0)
    }

    fn segments_for(offsets: &[u16]) -> Vec<Segment> {
        let habits: Vec<Habit> = offsets
            .iter()
            .map(|&offset| {
                Habit::from_draft(
                    HabitDraft {
                        title: format!("habit+{offset}"),
                        scheduling: Scheduling::Dynamic { offset_minutes: offset },
                        ..HabitDraft::default()
                    },
                    wake(),
                )
                .unwrap()
            })
            .collect();
        let refs: Vec<&Habit> = habits.iter().collect();
        build_segments(&refs, wake(), &TimelineGeometry::default())
    }

    #[test]
    fn round_trips_at_segment_boundaries() {
        let segments = segments_for(&[30, 120, 960]);
        let geometry = TimelineGeometry::default();
        for offset in [30u16, 120, 960] {
            let time = wake().add_minutes(i64::from(offset));
            let position = time_to_position(time, &segments, wake(), &geometry);
            let mapped = position_to_time(position, &segments, wake());
            assert_eq!(mapped.time, time, "offset {offset}");
            assert_eq!(mapped.minutes_since_wake, f64::from(offset));
        }
    }

    #[test]
    fn unbounded_time_falls_back_to_padding() {
        let geometry = TimelineGeometry::default();
        let position = time_to_position(ClockTime::from_hm(9, 0), &[], wake(), &geometry);
        assert_eq!(position, geometry.edge_padding);
    }

    #[test]
    fn positions_clamp_at_edges() {
        let segments = segments_for(&[60]);
        let before = position_to_time(0.0, &segments, wake());
        assert_eq!(before.time, wake());
        assert_eq!(before.minutes_since_wake, 0.0);

        let after = position_to_time(10_000.0, &segments, wake());
        assert_eq!(after.minutes_since_wake, 1439.0);
        assert_eq!(after.time, wake().add_minutes(1439));
    }

    #[test]
    fn interpolation_is_per_pair_not_global() {
        // Habits at +30 and +960: both pairs span 120 px but cover wildly
        // different time spans, so the midpoint of each pair lands on the
        // pair's own midpoint time.
        let segments = segments_for(&[30, 960]);
        let mid_first = position_to_time(160.0 + 60.0, &segments, wake());
        assert_eq!(mid_first.minutes_since_wake, (30.0 + 960.0) / 2.0);

        let mid_last = position_to_time(280.0 + 60.0, &segments, wake());
        assert_eq!(mid_last.minutes_since_wake, (960.0 + 1440.0) / 2.0);
    }

    #[test]
    fn fractional_minutes_floor_into_clock_time() {
        let segments = segments_for(&[30]);
        // Halfway through the second pair: 30 + 1410/2 = 735.
        let mapped = position_to_time(160.0 + 60.0, &segments, wake());
        assert_eq!(mapped.minutes_since_wake, 735.0);
        // A position a hair further produces a fraction that floors.
        let mapped = position_to_time(160.0 + 60.05, &segments, wake());
        assert_eq!(mapped.time, wake().add_minutes(mapped.minutes_since_wake.floor() as i64));
    }

    #[test]
    fn empty_segments_map_to_wake() {
        let mapped = position_to_time(123.0, &[], wake());
        assert_eq!(mapped.time, wake());
    }

    #[test]
    fn single_anchor_timeline_maps_to_wake() {
        // No habits: only the wake anchor exists, so any in-range position
        // resolves to the wake moment.
        let segments = segments_for(&[]);
        let mapped = position_to_time(40.0, &segments, wake());
        assert_eq!(mapped.time, wake());
        assert_eq!(mapped.minutes_since_wake, 0.0);
    }
}
