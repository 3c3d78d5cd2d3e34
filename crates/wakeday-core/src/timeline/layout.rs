//! Timeline slot generation: habit anchors plus a dynamically scaled
//! time ruler.
//!
//! Marker density adapts per segment pair. A pair covering few minutes in
//! many pixels earns minute-level ticks; a pair covering most of the day in
//! one tile pitch gets hour marks at most.

use serde::Serialize;

use crate::day::Habit;
use crate::time::ClockTime;
use crate::timeline::segment::{build_segments, Segment};
use crate::timeline::TimelineGeometry;

/// Marker rank on the ruler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    Wake,
    Habit,
    Hour,
    Half,
    Quarter,
    Micro,
}

/// One marker on the rendered timeline. Rebuilt on every layout pass.
#[derive(Debug, Clone, Serialize)]
pub struct TimeSlot {
    /// Absolute clock time in minutes since midnight.
    pub clock_minutes: u16,
    pub position: f64,
    pub kind: SlotKind,
    pub label: String,
    /// Cleared (not removed) when the label loses overlap resolution.
    pub display_label: bool,
    pub minutes_since_wake: u16,
    /// Hour markers outrank sub-hour markers when labels collide.
    pub priority: u8,
}

/// A fully laid-out timeline.
#[derive(Debug, Clone)]
pub struct Timeline {
    pub slots: Vec<TimeSlot>,
    pub segments: Vec<Segment>,
    pub height: f64,
}

impl Timeline {
    /// The canvas shown while no wake day is active.
    pub fn idle(geometry: &TimelineGeometry) -> Self {
        Self {
            slots: Vec::new(),
            segments: Vec::new(),
            height: geometry.idle_canvas,
        }
    }
}

/// Lay out the timeline for one wake day. Hidden habits are excluded;
/// the rest are ordered by wake-relative time.
pub fn generate_timeline(
    habits: &[Habit],
    wake: ClockTime,
    geometry: &TimelineGeometry,
) -> Timeline {
    let mut visible: Vec<&Habit> = habits.iter().filter(|h| !h.hidden).collect();
    visible.sort_by_key(|h| h.effective_time.minutes_since(wake));
    let segments = build_segments(&visible, wake, geometry);

    let mut slots = Vec::new();
    slots.push(TimeSlot {
        clock_minutes: wake.minutes(),
        position: geometry.edge_padding,
        kind: SlotKind::Wake,
        label: wake.format_12h(true),
        display_label: true,
        minutes_since_wake: 0,
        priority: 0,
    });

    for segment in &segments {
        if segment.habit_id.is_some() {
            slots.push(TimeSlot {
                clock_minutes: wake.add_minutes(i64::from(segment.minutes_since_wake)).minutes(),
                position: segment.position,
                kind: SlotKind::Habit,
                label: String::new(),
                display_label: false,
                minutes_since_wake: segment.minutes_since_wake,
                priority: 0,
            });
        }
    }

    add_scale_markers(&mut slots, &segments, wake);
    resolve_overlapping_labels(&mut slots, geometry.min_marker_spacing);
    slots.sort_by(|a, b| a.position.total_cmp(&b.position));

    let height = if segments.len() > 1 {
        // Last anchor is the end-of-day segment.
        segments[segments.len() - 1].position + geometry.tile_pitch + geometry.edge_padding * 2.0
    } else {
        geometry.edge_padding + geometry.fallback_canvas
    };

    Timeline {
        slots,
        segments,
        height,
    }
}

/// Density thresholds, in pixels per minute. Each tier includes all coarser
/// tiers: at 0.5 px/min a pair gets half- and quarter-hour marks but no
/// five-minute ticks.
const HALF_HOUR_DENSITY: f64 = 0.2;
const QUARTER_HOUR_DENSITY: f64 = 0.4;
const FIVE_MINUTE_DENSITY: f64 = 0.8;
const EVERY_MINUTE_DENSITY: f64 = 4.0;

fn add_scale_markers(slots: &mut Vec<TimeSlot>, segments: &[Segment], wake: ClockTime) {
    if segments.len() < 2 {
        return;
    }
    let wake_minutes = i64::from(wake.minutes());
    let end_minutes_since_wake = i64::from(segments[segments.len() - 1].minutes_since_wake);

    // Hour markers, starting at the first whole clock hour strictly after
    // wake. Interpolated globally so each lands inside whatever segment
    // pair contains it.
    let mut clock = (wake_minutes / 60 + 1) * 60;
    for _ in 0..24 {
        let since_wake = clock - wake_minutes;
        if since_wake > end_minutes_since_wake {
            break;
        }
        if let Some(position) = interpolate_position(since_wake as f64, segments) {
            let clock_time = ClockTime::from_minutes(clock);
            slots.push(TimeSlot {
                clock_minutes: clock_time.minutes(),
                position,
                kind: SlotKind::Hour,
                label: clock_time.format_12h(false),
                display_label: true,
                minutes_since_wake: since_wake as u16,
                priority: 1,
            });
        }
        clock += 60;
    }

    // Sub-hour markers, density chosen per segment pair.
    for pair in segments.windows(2) {
        let (start, end) = (&pair[0], &pair[1]);
        let time_span = f64::from(end.minutes_since_wake) - f64::from(start.minutes_since_wake);
        if time_span <= 0.0 {
            continue;
        }
        let pixel_span = end.position - start.position;
        let pixels_per_minute = pixel_span / time_span;

        let include_half = pixels_per_minute > HALF_HOUR_DENSITY;
        let include_quarter = pixels_per_minute > QUARTER_HOUR_DENSITY;
        let include_five = pixels_per_minute > FIVE_MINUTE_DENSITY;
        let include_minutes = pixels_per_minute > EVERY_MINUTE_DENSITY;
        if !include_half {
            continue;
        }

        for since_wake in (start.minutes_since_wake + 1)..end.minutes_since_wake {
            let clock_mod = (wake_minutes + i64::from(since_wake)) % 60;
            let kind = if clock_mod == 0 {
                // Whole hours were already emitted above.
                continue;
            } else if clock_mod == 30 && include_half {
                SlotKind::Half
            } else if (clock_mod == 15 || clock_mod == 45) && include_quarter {
                SlotKind::Quarter
            } else if clock_mod % 5 == 0 && include_five {
                SlotKind::Micro
            } else if include_minutes {
                SlotKind::Micro
            } else {
                continue;
            };

            let progress = f64::from(since_wake - start.minutes_since_wake) / time_span;
            let clock_time = wake.add_minutes(i64::from(since_wake));
            slots.push(TimeSlot {
                clock_minutes: clock_time.minutes(),
                position: start.position + progress * pixel_span,
                kind,
                label: String::new(),
                display_label: false,
                minutes_since_wake: since_wake,
                priority: 0,
            });
        }
    }
}

/// Interpolate the pixel position of a wake-relative minute within the
/// segment pair containing it. `None` past the last segment.
pub(crate) fn interpolate_position(minutes_since_wake: f64, segments: &[Segment]) -> Option<f64> {
    for pair in segments.windows(2) {
        let (start, end) = (&pair[0], &pair[1]);
        let start_minutes = f64::from(start.minutes_since_wake);
        let end_minutes = f64::from(end.minutes_since_wake);
        if minutes_since_wake >= start_minutes && minutes_since_wake <= end_minutes {
            if end_minutes == start_minutes {
                return Some(start.position);
            }
            let progress = (minutes_since_wake - start_minutes) / (end_minutes - start_minutes);
            return Some(start.position + (end.position - start.position) * progress);
        }
    }
    None
}

/// Hide labels that would collide. The wake label is always shown. A higher
/// priority marker displaces lower ones inside the spacing threshold; among
/// equals the first in position order wins and later labels within 1.5x the
/// minimum spacing of anything kept are suppressed.
fn resolve_overlapping_labels(slots: &mut [TimeSlot], min_spacing: f64) {
    let mut order: Vec<usize> = (0..slots.len())
        .filter(|&i| slots[i].display_label && slots[i].kind != SlotKind::Wake)
        .collect();
    order.sort_by(|&a, &b| slots[a].position.total_cmp(&slots[b].position));

    let threshold = min_spacing * 1.5;
    let mut kept: Vec<usize> = Vec::new();
    for index in order {
        let conflicts: Vec<usize> = kept
            .iter()
            .copied()
            .filter(|&k| (slots[k].position - slots[index].position).abs() < threshold)
            .collect();
        if conflicts.is_empty() {
            kept.push(index);
        } else if conflicts.iter().all(|&k| slots[index].priority > slots[k].priority) {
            for k in conflicts {
                slots[k].display_label = false;
                kept.retain(|&x| x != k);
            }
            kept.push(index);
        } else {
            slots[index].display_label = false;
        }
    }
}
