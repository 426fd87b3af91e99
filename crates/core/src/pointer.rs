//! Pointer and touch tracking
//!
//! Positions are normalized to `[-1, 1]` on both axes with `+y` up. Events
//! only record the latest position; the displacement is computed once per
//! simulation step by `PointerTracker::sample`.

use crate::core_types::Vec2;
use tracing::trace;

/// Pointer state consumed by one simulation step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    /// Current position, normalized
    pub position: Vec2,
    /// Displacement since the previous step
    pub diff: Vec2,
    /// Whether a touch is in progress
    pub touching: bool,
}

impl PointerSample {
    /// A stationary pointer at the origin
    pub fn idle() -> Self {
        Self {
            position: Vec2::zeros(),
            diff: Vec2::zeros(),
            touching: false,
        }
    }
}

impl Default for PointerSample {
    fn default() -> Self {
        Self::idle()
    }
}

/// Tracks the pointer between simulation steps.
///
/// One tracker is shared by everything that feeds pointer input into a
/// solver, so every consumer sees the same displacement.
#[derive(Debug, Clone)]
pub struct PointerTracker {
    current: Vec2,
    previous: Vec2,
    diff: Vec2,
    touching: bool,
    seeded: bool,
}

impl PointerTracker {
    /// Create a tracker at the origin with no motion recorded
    pub fn new() -> Self {
        Self {
            current: Vec2::zeros(),
            previous: Vec2::zeros(),
            diff: Vec2::zeros(),
            touching: false,
            seeded: false,
        }
    }

    /// Convert a pixel position to normalized coordinates.
    ///
    /// # Arguments
    ///
    /// * `x`, `y` - Pixel position with the origin at the top-left corner
    /// * `width`, `height` - Viewport size in pixels
    pub fn normalize(x: f32, y: f32, width: f32, height: f32) -> Vec2 {
        Vec2::new(
            (x / width.max(1.0)) * 2.0 - 1.0,
            -((y / height.max(1.0)) * 2.0 - 1.0),
        )
    }

    /// Record a pointer move to a normalized position.
    pub fn move_to(&mut self, position: Vec2) {
        if !self.seeded {
            self.previous = position;
            self.seeded = true;
        }
        self.current = position;
    }

    /// Record the start of a touch at a normalized position.
    ///
    /// `previous` jumps to the touch point, so the touch does not register a
    /// jump from wherever the pointer was last seen, even if it ends before
    /// the next sample.
    pub fn touch_start(&mut self, position: Vec2) {
        if !self.touching {
            self.previous = position;
        }
        self.current = position;
        self.seeded = true;
        self.touching = true;
    }

    /// Record a touch move.
    pub fn touch_move(&mut self, position: Vec2) {
        self.move_to(position);
    }

    /// Record the end of a touch.
    pub fn touch_end(&mut self) {
        self.touching = false;
    }

    /// Whether a touch is in progress
    pub fn is_touching(&self) -> bool {
        self.touching
    }

    /// Discard pending motion so the next sample has zero displacement.
    pub fn reseed(&mut self) {
        self.previous = self.current;
        self.diff = Vec2::zeros();
    }

    /// Latest recorded position
    pub fn position(&self) -> Vec2 {
        self.current
    }

    /// Consume pending input and produce the sample for one step.
    ///
    /// `diff = current - previous`, then `previous := current`. The first
    /// sample after a move, and the first after a touch starts, has zero
    /// displacement.
    pub fn sample(&mut self) -> PointerSample {
        self.diff = self.current - self.previous;
        self.previous = self.current;

        if self.diff != Vec2::zeros() {
            trace!(dx = self.diff.x, dy = self.diff.y, "pointer moved");
        }

        PointerSample {
            position: self.current,
            diff: self.diff,
            touching: self.touching,
        }
    }

    /// Displacement produced by the last `sample`
    pub fn last_diff(&self) -> Vec2 {
        self.diff
    }
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new()
    }
}
