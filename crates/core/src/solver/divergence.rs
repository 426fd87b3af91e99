//! Central-difference divergence of velocity

use super::boundary::pass_region;
use super::fields::{Field, FieldView};
use super::pass::{execute, Blend, Cell, ComputePass};
use crate::config::BoundaryMode;
use crate::core_types::Vec2;

struct DivergencePass<'a> {
    velocity: FieldView<'a>,
    cell_scale: Vec2,
    inv_two_dt: f32,
}

impl ComputePass for DivergencePass<'_> {
    type Output = f32;

    fn compute(&self, cell: Cell) -> f32 {
        let dx = Vec2::new(self.cell_scale.x, 0.0);
        let dy = Vec2::new(0.0, self.cell_scale.y);
        let right: Vec2 = self.velocity.sample(cell.uv + dx);
        let left: Vec2 = self.velocity.sample(cell.uv - dx);
        let top: Vec2 = self.velocity.sample(cell.uv + dy);
        let bottom: Vec2 = self.velocity.sample(cell.uv - dy);
        ((right.x - left.x) + (top.y - bottom.y)) * self.inv_two_dt
    }
}

/// Write the divergence of `velocity` into `divergence` and swap.
///
/// # Arguments
///
/// * `velocity` - Velocity to differentiate
/// * `divergence` - One-component destination of the same size
/// * `dt` - PDE timestep; the result is scaled by `1 / (2 dt)`
/// * `boundary` - Boundary treatment
pub fn compute_divergence(
    velocity: FieldView<'_>,
    divergence: &mut Field,
    dt: f32,
    boundary: BoundaryMode,
) {
    let pass = DivergencePass {
        velocity,
        cell_scale: velocity.cell_scale(),
        inv_two_dt: 1.0 / (2.0 * dt),
    };
    let region = pass_region(boundary, divergence.width(), divergence.height());
    execute(&pass, &mut divergence.write_target(), region, Blend::Replace);
    divergence.swap();
}
