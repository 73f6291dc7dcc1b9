//! Pointer/touch normalization
//!
//! Raw events carry absolute screen coordinates. The tracker converts them to
//! percentages of the game container and remembers whether the pointer is
//! pressed. The step reads a [`PointerSample`] copied once per frame.

use glam::Vec2;

use crate::clamp_percent;
use crate::consts::VIEWPORT_EXTENT;
use crate::sim::PointerSample;

/// On-screen rectangle of the game container
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ContainerRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Convert an absolute point to container percentages.
    /// `None` for a degenerate rect or non-finite input.
    pub fn normalize(&self, screen: Vec2) -> Option<Vec2> {
        if !(self.width > 0.0 && self.height > 0.0) || !screen.is_finite() {
            return None;
        }
        let x = (screen.x - self.left) / self.width * VIEWPORT_EXTENT;
        let y = (screen.y - self.top) / self.height * VIEWPORT_EXTENT;
        let pos = Vec2::new(x, y);
        if !pos.is_finite() {
            return None;
        }
        Some(Vec2::new(clamp_percent(pos.x), clamp_percent(pos.y)))
    }
}

/// A press/move event as delivered by the host
#[derive(Debug, Clone, PartialEq)]
pub enum RawPointer {
    /// Mouse events carry flat client coordinates
    Mouse { x: f32, y: f32 },
    /// Touch events carry a list of touch points; the first one is used
    Touch { points: Vec<Vec2> },
}

impl RawPointer {
    /// Absolute point of the event, if it has one
    pub fn screen_point(&self) -> Option<Vec2> {
        match self {
            RawPointer::Mouse { x, y } => Some(Vec2::new(*x, *y)),
            RawPointer::Touch { points } => points.first().copied(),
        }
    }
}

/// Tracks the normalized pointer position and pressed state
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    pos: Option<Vec2>,
    held: bool,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer/touch down
    pub fn press(&mut self, raw: &RawPointer, rect: Option<ContainerRect>) {
        let Some(screen) = raw.screen_point() else {
            log::debug!("Ignoring press without touch points");
            return;
        };
        self.held = true;
        self.update(screen, rect);
    }

    /// Pointer/touch move; hover without a press is ignored
    pub fn move_to(&mut self, raw: &RawPointer, rect: Option<ContainerRect>) {
        if !self.held {
            return;
        }
        if let Some(screen) = raw.screen_point() {
            self.update(screen, rect);
        }
    }

    /// Pointer up, leave, touch end or cancel
    pub fn release(&mut self) {
        self.held = false;
    }

    /// Forget everything (new page session)
    pub fn reset(&mut self) {
        self.pos = None;
        self.held = false;
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    pub fn position(&self) -> Option<Vec2> {
        self.pos
    }

    /// Consistent copy for one simulation step
    pub fn sample(&self) -> PointerSample {
        PointerSample {
            pos: self.pos,
            held: self.held,
        }
    }

    fn update(&mut self, screen: Vec2, rect: Option<ContainerRect>) {
        // Missing or unusable geometry leaves the last position in place
        if let Some(pos) = rect.and_then(|r| r.normalize(screen)) {
            self.pos = Some(pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> ContainerRect {
        ContainerRect::new(100.0, 50.0, 200.0, 400.0)
    }

    #[test]
    fn test_normalize_to_percent() {
        let pos = rect().normalize(Vec2::new(150.0, 150.0)).unwrap();
        assert!((pos.x - 25.0).abs() < 1e-4);
        assert!((pos.y - 25.0).abs() < 1e-4);
    }

    #[test]
    fn test_normalize_clamps_outside_points() {
        let pos = rect().normalize(Vec2::new(0.0, 1000.0)).unwrap();
        assert_eq!(pos, Vec2::new(0.0, 100.0));
    }

    #[test]
    fn test_normalize_rejects_bad_input() {
        assert_eq!(rect().normalize(Vec2::new(f32::NAN, 10.0)), None);
        assert_eq!(rect().normalize(Vec2::new(f32::INFINITY, 10.0)), None);
        let empty = ContainerRect::new(0.0, 0.0, 0.0, 300.0);
        assert_eq!(empty.normalize(Vec2::new(10.0, 10.0)), None);
    }

    #[test]
    fn test_mouse_and_touch_agree() {
        let mut mouse = PointerTracker::new();
        mouse.press(&RawPointer::Mouse { x: 200.0, y: 250.0 }, Some(rect()));

        let mut touch = PointerTracker::new();
        touch.press(
            &RawPointer::Touch {
                points: vec![Vec2::new(200.0, 250.0), Vec2::new(0.0, 0.0)],
            },
            Some(rect()),
        );

        assert_eq!(mouse.sample(), touch.sample());
        assert_eq!(mouse.position(), Some(Vec2::new(50.0, 50.0)));
        assert!(mouse.is_held());
    }

    #[test]
    fn test_touch_without_points_is_ignored() {
        let mut tracker = PointerTracker::new();
        tracker.press(&RawPointer::Touch { points: vec![] }, Some(rect()));
        assert!(!tracker.is_held());
        assert_eq!(tracker.position(), None);
    }

    #[test]
    fn test_missing_container_keeps_last_position() {
        let mut tracker = PointerTracker::new();
        tracker.press(&RawPointer::Mouse { x: 200.0, y: 250.0 }, Some(rect()));
        tracker.move_to(&RawPointer::Mouse { x: 120.0, y: 90.0 }, None);
        assert_eq!(tracker.position(), Some(Vec2::new(50.0, 50.0)));
        assert!(tracker.is_held());
    }

    #[test]
    fn test_hover_does_not_move() {
        let mut tracker = PointerTracker::new();
        tracker.move_to(&RawPointer::Mouse { x: 200.0, y: 250.0 }, Some(rect()));
        assert_eq!(tracker.position(), None);
    }

    #[test]
    fn test_release_keeps_position() {
        let mut tracker = PointerTracker::new();
        tracker.press(&RawPointer::Mouse { x: 200.0, y: 250.0 }, Some(rect()));
        tracker.release();
        let sample = tracker.sample();
        assert!(!sample.held);
        assert_eq!(sample.active_point(), None);
        assert!(sample.pos.is_some());

        tracker.reset();
        assert_eq!(tracker.sample(), PointerSample::default());
    }
}
