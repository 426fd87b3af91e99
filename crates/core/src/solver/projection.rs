//! Pressure-gradient projection

use super::boundary::pass_region;
use super::fields::{FieldTarget, FieldView};
use super::pass::{execute, Blend, Cell, ComputePass};
use crate::config::BoundaryMode;
use crate::core_types::Vec2;

struct ProjectionPass<'a> {
    pressure: FieldView<'a>,
    velocity: FieldView<'a>,
    cell_scale: Vec2,
    half_dt: f32,
}

impl ComputePass for ProjectionPass<'_> {
    type Output = Vec2;

    fn compute(&self, cell: Cell) -> Vec2 {
        let dx = Vec2::new(self.cell_scale.x, 0.0);
        let dy = Vec2::new(0.0, self.cell_scale.y);
        let p_right: f32 = self.pressure.sample(cell.uv + dx);
        let p_left: f32 = self.pressure.sample(cell.uv - dx);
        let p_top: f32 = self.pressure.sample(cell.uv + dy);
        let p_bottom: f32 = self.pressure.sample(cell.uv - dy);
        let gradient = Vec2::new(p_right - p_left, p_top - p_bottom);
        let v: Vec2 = self.velocity.texel(cell.x, cell.y);
        v - gradient * self.half_dt
    }
}

/// Subtract `dt / 2` times the central-difference pressure gradient.
///
/// `target` must not alias `velocity`; the caller swaps afterwards.
pub fn project(
    pressure: FieldView<'_>,
    velocity: FieldView<'_>,
    target: &mut FieldTarget<'_>,
    dt: f32,
    boundary: BoundaryMode,
) {
    let pass = ProjectionPass {
        pressure,
        velocity,
        cell_scale: pressure.cell_scale(),
        half_dt: dt * 0.5,
    };
    let region = pass_region(boundary, target.width(), target.height());
    execute(&pass, target, region, Blend::Replace);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::divergence::compute_divergence;
    use crate::solver::fields::{Field, StoragePrecision};
    use crate::solver::pressure::{solve_pressure, PressureParams};
    use approx::assert_relative_eq;

    #[test]
    fn test_uniform_pressure_leaves_velocity() {
        let mut pressure = Field::new("pressure", 6, 6, 1, StoragePrecision::Full).unwrap();
        pressure.current_mut().as_mut_slice().fill(3.0);
        let mut velocity = Field::new("velocity", 6, 6, 2, StoragePrecision::Full).unwrap();
        velocity.current_mut().as_mut_slice().fill(0.5);

        {
            let (read, mut write) = velocity.split();
            project(pressure.read(), read, &mut write, 0.014, BoundaryMode::Closed);
        }
        velocity.swap();
        assert_relative_eq!(velocity.read().vector_at(3, 3).x, 0.5, epsilon = 1e-6);
        assert_relative_eq!(velocity.read().vector_at(0, 0).y, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_pressure_ramp_pushes_downhill() {
        let n = 8;
        let mut pressure = Field::new("pressure", n, n, 1, StoragePrecision::Full).unwrap();
        {
            let mut target = pressure.current_mut();
            for y in 0..n {
                for x in 0..n {
                    target.store(x, y, x as f32);
                }
            }
        }
        let mut velocity = Field::new("velocity", n, n, 2, StoragePrecision::Full).unwrap();
        {
            let (read, mut write) = velocity.split();
            project(pressure.read(), read, &mut write, 1.0, BoundaryMode::Open);
        }
        velocity.swap();
        // Gradient of 2 across two cells, scaled by dt / 2
        let v = velocity.read().vector_at(4, 4);
        assert_relative_eq!(v.x, -1.0, epsilon = 1e-5);
        assert_relative_eq!(v.y, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_projection_reduces_divergence() {
        let n = 32;
        let dt = 0.014;
        let mut velocity = Field::new("velocity", n, n, 2, StoragePrecision::Full).unwrap();
        {
            let mut target = velocity.current_mut();
            for y in 0..n {
                for x in 0..n {
                    let u = (x as f32 + 0.5) / n as f32;
                    let w = (y as f32 + 0.5) / n as f32;
                    let source = Vec2::new(u - 0.5, w - 0.5);
                    let swirl = Vec2::new(-(w - 0.5), u - 0.5);
                    target.store(x, y, (source + swirl) * (-12.0 * source.norm_squared()).exp());
                }
            }
        }
        let mut divergence = Field::new("divergence", n, n, 1, StoragePrecision::Full).unwrap();
        let mut pressure = Field::new("pressure", n, n, 1, StoragePrecision::Full).unwrap();

        let interior_l2 = |field: &Field| -> f32 {
            let view = field.read();
            let mut sum = 0.0;
            for y in 2..n - 2 {
                for x in 2..n - 2 {
                    sum += view.scalar_at(x, y).powi(2);
                }
            }
            sum.sqrt()
        };

        compute_divergence(velocity.read(), &mut divergence, dt, BoundaryMode::Open);
        let before = interior_l2(&divergence);

        let params = PressureParams {
            iterations: 2,
            straightness: 1.0,
            warm_start: true,
            boundary: BoundaryMode::Open,
        };
        solve_pressure(divergence.read(), &mut pressure, &params);
        {
            let (read, mut write) = velocity.split();
            project(pressure.read(), read, &mut write, dt, BoundaryMode::Open);
        }
        velocity.swap();

        compute_divergence(velocity.read(), &mut divergence, dt, BoundaryMode::Open);
        let after = interior_l2(&divergence);
        assert!(after < before, "divergence grew: {before} -> {after}");
    }
}
