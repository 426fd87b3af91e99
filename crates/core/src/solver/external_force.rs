//! Pointer-driven external force
//!
//! Pointer motion since the last step is turned into a radial impulse that is
//! added onto the advected velocity. The impulse falls off quadratically from
//! the cursor center to zero at the cursor radius, so cells outside the
//! footprint are never modified.

use super::boundary::pass_region;
use super::fields::Field;
use super::pass::{execute, Blend, Cell, CellRect, ComputePass};
use crate::config::BoundaryMode;
use crate::core_types::Vec2;
use crate::pointer::PointerSample;

/// Uniforms for the force splat
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceParams {
    /// Impulse per unit of normalized pointer displacement
    pub mouse_force: f32,
    /// Footprint radius in cells (of the force cell scale)
    pub cursor_size: f32,
    /// Aspect-corrected cell scale sizing the footprint
    pub force_cell_scale: Vec2,
    /// Boundary treatment
    pub boundary: BoundaryMode,
}

/// Geometry and strength of one splat, in normalized `[-1, 1]` coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Splat {
    /// Impulse at the center
    pub force: Vec2,
    /// Center after clamping away from the edges
    pub center: Vec2,
    /// Footprint radius per axis
    pub radius: Vec2,
}

impl Splat {
    /// Build the splat for a pointer sample, or `None` when the pointer did not move.
    pub fn from_pointer(sample: &PointerSample, params: &ForceParams) -> Option<Self> {
        if sample.diff == Vec2::zeros() {
            return None;
        }
        let radius = params.force_cell_scale * params.cursor_size;
        let margin = radius + params.force_cell_scale * 2.0;
        Some(Self {
            force: sample.diff * 0.5 * params.mouse_force,
            center: Vec2::new(
                clamp_axis(sample.position.x, margin.x),
                clamp_axis(sample.position.y, margin.y),
            ),
            radius,
        })
    }

    /// Impulse contributed at normalized position `p`
    #[inline]
    pub fn contribution(&self, p: Vec2) -> Vec2 {
        let distance = (p - self.center).component_div(&self.radius).norm();
        let falloff = 1.0 - distance.min(1.0);
        self.force * (falloff * falloff)
    }

    /// Cells that may receive a nonzero contribution, with one cell of slack.
    pub fn bounds(&self, width: usize, height: usize) -> CellRect {
        let lo = (self.center - self.radius + Vec2::new(1.0, 1.0)) * 0.5;
        let hi = (self.center + self.radius + Vec2::new(1.0, 1.0)) * 0.5;
        let (x0, x1) = cell_span(lo.x, hi.x, width);
        let (y0, y1) = cell_span(lo.y, hi.y, height);
        CellRect { x0, x1, y0, y1 }
    }
}

// Keep `value` at least `margin` away from both edges of [-1, 1]
fn clamp_axis(value: f32, margin: f32) -> f32 {
    let limit = 1.0 - margin;
    if limit <= 0.0 {
        0.0
    } else {
        value.clamp(-limit, limit)
    }
}

// Half-open range of cell indices whose centers may lie in [lo, hi] (UV)
fn cell_span(lo: f32, hi: f32, cells: usize) -> (usize, usize) {
    let n = cells as f32;
    let first = (lo * n - 0.5).floor() - 1.0;
    let last = (hi * n - 0.5).ceil() + 1.0;
    (
        first.clamp(0.0, n) as usize,
        (last + 1.0).clamp(0.0, n) as usize,
    )
}

struct ForcePass {
    splat: Splat,
}

impl ComputePass for ForcePass {
    type Output = Vec2;

    fn compute(&self, cell: Cell) -> Vec2 {
        let p = cell.uv * 2.0 - Vec2::new(1.0, 1.0);
        self.splat.contribution(p)
    }
}

/// Add the pointer impulse onto the current velocity buffer in place.
///
/// # Returns
///
/// `false` when the pointer did not move and nothing was written
pub fn apply_force(velocity: &mut Field, sample: &PointerSample, params: &ForceParams) -> bool {
    let Some(splat) = Splat::from_pointer(sample, params) else {
        return false;
    };
    let width = velocity.width();
    let height = velocity.height();
    let region = pass_region(params.boundary, width, height).intersect(splat.bounds(width, height));
    execute(
        &ForcePass { splat },
        &mut velocity.current_mut(),
        region,
        Blend::Additive,
    );
    true
}
