//! Drag-to-reschedule session bookkeeping.
//!
//! The input collaborator normalizes touch/mouse/pointer events into a
//! three-phase protocol: start, repeated move, end. At most one habit drags
//! at a time; a move or end without a matching start is a no-op.

use crate::time::ClockTime;

/// Live preview of where a dragged habit would land.
#[derive(Debug, Clone, PartialEq)]
pub struct DragPreview {
    pub habit_id: String,
    pub position: f64,
    pub time: ClockTime,
    /// 12-hour label for the floating drag indicator.
    pub label: String,
}

#[derive(Debug)]
struct DragSession {
    habit_id: String,
    position: f64,
}

/// Tracks the single in-flight drag, if any.
#[derive(Debug, Default)]
pub struct DragState {
    session: Option<DragSession>,
}

impl DragState {
    /// Begin dragging a habit from its current pixel position. Starting a
    /// new drag replaces any session left dangling by the input layer.
    pub fn begin(&mut self, habit_id: &str, position: f64) {
        self.session = Some(DragSession {
            habit_id: habit_id.to_string(),
            position,
        });
    }

    /// Record a pointer move, clamped into the canvas. Returns the new
    /// position, or `None` when no drag is active.
    pub fn update(&mut self, y: f64, canvas_height: f64) -> Option<f64> {
        let session = self.session.as_mut()?;
        session.position = y.clamp(0.0, canvas_height);
        Some(session.position)
    }

    /// Finish the drag, yielding the dragged habit and its drop position.
    pub fn finish(&mut self) -> Option<(String, f64)> {
        self.session.take().map(|s| (s.habit_id, s.position))
    }

    pub fn dragging_habit(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.habit_id.as_str())
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_without_start_is_noop() {
        let mut drag = DragState::default();
        assert_eq!(drag.update(100.0, 800.0), None);
        assert_eq!(drag.finish(), None);
    }

    #[test]
    fn full_session() {
        let mut drag = DragState::default();
        drag.begin("h1", 160.0);
        assert_eq!(drag.dragging_habit(), Some("h1"));
        assert_eq!(drag.update(300.0, 800.0), Some(300.0));
        assert_eq!(drag.finish(), Some(("h1".to_string(), 300.0)));
        assert!(!drag.is_dragging());
    }

    #[test]
    fn moves_clamp_into_canvas() {
        let mut drag = DragState::default();
        drag.begin("h1", 160.0);
        assert_eq!(drag.update(-50.0, 800.0), Some(0.0));
        assert_eq!(drag.update(5_000.0, 800.0), Some(800.0));
    }

    #[test]
    fn restart_replaces_session() {
        let mut drag = DragState::default();
        drag.begin("h1", 160.0);
        drag.begin("h2", 40.0);
        assert_eq!(drag.finish(), Some(("h2".to_string(), 40.0)));
    }
}
