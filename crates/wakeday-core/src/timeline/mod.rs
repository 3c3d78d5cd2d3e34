//! Wake-relative timeline layout and position mapping.
//!
//! The timeline is vertical and ordinal: consecutive habit tiles sit one
//! fixed pitch apart regardless of the clock-time gap between them, so a
//! packed morning and an empty afternoon occupy the same screen space.
//! Time-scale markers are interpolated into that non-uniform ruler at a
//! density matched to the local pixels-per-minute ratio.

mod drag;
mod layout;
mod mapper;
mod segment;

pub use drag::{DragPreview, DragState};
pub use layout::{generate_timeline, SlotKind, TimeSlot, Timeline};
pub use mapper::{position_to_time, time_to_position, MappedTime};
pub use segment::{build_segments, Segment, END_OF_DAY_MINUTES};

/// Pixel position assigned to habits filtered out of the current view.
pub const OFFSCREEN_POSITION: f64 = -1000.0;

/// Pixel geometry of the timeline canvas.
#[derive(Debug, Clone)]
pub struct TimelineGeometry {
    /// Vertical pixels between consecutive habit tiles.
    pub tile_pitch: f64,
    /// Padding at both timeline edges.
    pub edge_padding: f64,
    /// Minimum pixel spacing between marker labels.
    pub min_marker_spacing: f64,
    /// Canvas height past the padding when a wake day has no habits.
    pub fallback_canvas: f64,
    /// Canvas height while no wake day is active.
    pub idle_canvas: f64,
}

impl Default for TimelineGeometry {
    fn default() -> Self {
        Self {
            tile_pitch: 120.0,
            edge_padding: 40.0,
            min_marker_spacing: 20.0,
            fallback_canvas: 400.0,
            idle_canvas: 800.0,
        }
    }
}
