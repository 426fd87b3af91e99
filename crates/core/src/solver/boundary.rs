//! Boundary handling shared by all passes

use super::fields::FieldTarget;
use super::pass::CellRect;
use crate::config::BoundaryMode;
use crate::core_types::Vec2;

/// Boundary space for a mode: `(0, 0)` when closed, one cell when open.
pub fn boundary_space(mode: BoundaryMode, cell_scale: Vec2) -> Vec2 {
    match mode {
        BoundaryMode::Closed => Vec2::zeros(),
        BoundaryMode::Open => cell_scale,
    }
}

/// Cells a pass writes under `mode`.
///
/// The boundary space inset, expressed in whole cells: closed mode covers
/// the full grid, open mode drops the outermost ring.
pub fn pass_region(mode: BoundaryMode, width: usize, height: usize) -> CellRect {
    let cell_scale = Vec2::new(1.0 / width as f32, 1.0 / height as f32);
    let inset = boundary_space(mode, cell_scale);
    let inset_x = (inset.x * width as f32).round() as usize;
    let inset_y = (inset.y * height as f32).round() as usize;
    CellRect {
        x0: inset_x,
        x1: width.saturating_sub(inset_x).max(inset_x),
        y0: inset_y,
        y1: height.saturating_sub(inset_y).max(inset_y),
    }
}

/// Rasterize a zero-valued loop over the outermost ring of cells.
pub fn zero_border(target: &mut FieldTarget<'_>) {
    let width = target.width();
    let height = target.height();
    let components = target.components();
    let row_len = width * components;
    let data = target.as_mut_slice();

    data[..row_len].fill(0.0);
    data[(height - 1) * row_len..].fill(0.0);
    for y in 1..height.saturating_sub(1) {
        let row = &mut data[y * row_len..(y + 1) * row_len];
        row[..components].fill(0.0);
        row[row_len - components..].fill(0.0);
    }
}
