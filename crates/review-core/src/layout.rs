//! Drag-resize of the issue list pane
//!
//! Candidate widths outside `[min_width_px, max_viewport_fraction * viewport]`
//! are dropped rather than clamped, so the pane stops at the last valid width
//! until the pointer comes back into range.

use tracing::{debug, trace};

use crate::config::{LayoutConfig, PaneSide};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging,
}

#[derive(Debug, Clone)]
pub struct ResizableLayout {
    width_px: f64,
    min_width_px: f64,
    max_viewport_fraction: f64,
    pane_side: PaneSide,
    state: DragState,
}

impl Default for ResizableLayout {
    fn default() -> Self {
        Self::new(&LayoutConfig::default())
    }
}

impl ResizableLayout {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            width_px: config.initial_width_px,
            min_width_px: config.min_width_px,
            max_viewport_fraction: config.max_viewport_fraction,
            pane_side: config.pane_side,
            state: DragState::Idle,
        }
    }

    pub fn width(&self) -> f64 {
        self.width_px
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        self.state == DragState::Dragging
    }

    /// Allowed width span for a viewport. Empty when the viewport is too
    /// narrow for the minimum.
    pub fn bounds(&self, viewport_width: f64) -> (f64, f64) {
        (
            self.min_width_px,
            viewport_width * self.max_viewport_fraction,
        )
    }

    pub fn begin_resize(&mut self) {
        debug!(width = self.width_px, "resize started");
        self.state = DragState::Dragging;
    }

    /// Width the pointer position asks for
    pub fn candidate_width(&self, pointer_x: f64, viewport_width: f64) -> f64 {
        match self.pane_side {
            PaneSide::Right => viewport_width - pointer_x,
            PaneSide::Left => pointer_x,
        }
    }

    /// Apply a pointer move. Returns the new width when it was accepted.
    pub fn update_pointer(&mut self, pointer_x: f64, viewport_width: f64) -> Option<f64> {
        if self.state != DragState::Dragging {
            return None;
        }

        let candidate = self.candidate_width(pointer_x, viewport_width);
        let (min, max) = self.bounds(viewport_width);
        if !candidate.is_finite() || candidate < min || candidate > max {
            trace!(candidate, min, max, "resize candidate out of range");
            return None;
        }

        self.width_px = candidate;
        Some(candidate)
    }

    pub fn end_resize(&mut self) {
        if self.state == DragState::Dragging {
            debug!(width = self.width_px, "resize finished");
        }
        self.state = DragState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_idle_with_initial_width() {
        let layout = ResizableLayout::default();
        assert_eq!(layout.state(), DragState::Idle);
        assert_eq!(layout.width(), 400.0);
    }

    #[test]
    fn test_pointer_ignored_when_idle() {
        let mut layout = ResizableLayout::default();
        assert_eq!(layout.update_pointer(1000.0, 1600.0), None);
        assert_eq!(layout.width(), 400.0);
    }

    #[test]
    fn test_right_pane_width_from_pointer() {
        let mut layout = ResizableLayout::default();
        layout.begin_resize();
        assert_eq!(layout.update_pointer(1100.0, 1600.0), Some(500.0));
        assert_eq!(layout.width(), 500.0);
        layout.end_resize();
        assert_eq!(layout.state(), DragState::Idle);
    }

    #[test]
    fn test_left_pane_width_from_pointer() {
        let mut layout = ResizableLayout::new(&LayoutConfig {
            pane_side: PaneSide::Left,
            ..LayoutConfig::default()
        });
        layout.begin_resize();
        assert_eq!(layout.update_pointer(450.0, 1600.0), Some(450.0));
    }

    #[test]
    fn test_out_of_range_is_rejected_not_clamped() {
        let mut layout = ResizableLayout::default();
        layout.begin_resize();
        layout.update_pointer(1100.0, 1600.0);

        // 1600 - 1450 = 150 < 300
        assert_eq!(layout.update_pointer(1450.0, 1600.0), None);
        assert_eq!(layout.width(), 500.0);

        // 1600 - 100 = 1500 > 960
        assert_eq!(layout.update_pointer(100.0, 1600.0), None);
        assert_eq!(layout.width(), 500.0);

        // back in range
        assert_eq!(layout.update_pointer(700.0, 1600.0), Some(900.0));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let mut layout = ResizableLayout::default();
        layout.begin_resize();
        assert_eq!(layout.update_pointer(700.0, 1000.0), Some(300.0));
        assert_eq!(layout.update_pointer(400.0, 1000.0), Some(600.0));
    }

    #[test]
    fn test_narrow_viewport_accepts_nothing() {
        let mut layout = ResizableLayout::default();
        layout.begin_resize();
        for x in [0.0, 100.0, 200.0, 300.0, 400.0] {
            assert_eq!(layout.update_pointer(x, 400.0), None);
        }
        assert_eq!(layout.width(), 400.0);
    }

    #[test]
    fn test_non_finite_pointer_rejected() {
        let mut layout = ResizableLayout::default();
        layout.begin_resize();
        assert_eq!(layout.update_pointer(f64::NAN, 1600.0), None);
        assert_eq!(layout.update_pointer(f64::NEG_INFINITY, 1600.0), None);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn accepted_widths_stay_in_bounds(
            viewport in 200.0f64..4000.0,
            moves in prop::collection::vec(-10_000.0f64..10_000.0, 1..50),
            left in any::<bool>(),
        ) {
            let side = if left { PaneSide::Left } else { PaneSide::Right };
            let mut layout = ResizableLayout::new(&LayoutConfig { pane_side: side, ..LayoutConfig::default() });
            layout.begin_resize();
            for x in moves {
                if let Some(width) = layout.update_pointer(x, viewport) {
                    prop_assert!(width >= 300.0);
                    prop_assert!(width <= 0.6 * viewport);
                    prop_assert_eq!(layout.width(), width);
                }
            }
        }

        #[test]
        fn rejected_moves_leave_width_unchanged(viewport in 600.0f64..4000.0, x in -10_000.0f64..10_000.0) {
            let mut layout = ResizableLayout::default();
            layout.begin_resize();
            let before = layout.width();
            if layout.update_pointer(x, viewport).is_none() {
                prop_assert_eq!(layout.width(), before);
            }
        }
    }
}
