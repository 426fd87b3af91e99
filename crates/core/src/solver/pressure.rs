//! Jacobi relaxation of the pressure Poisson equation

use super::boundary::pass_region;
use super::fields::{Field, FieldView};
use super::pass::{execute, Blend, Cell, ComputePass};
use crate::config::BoundaryMode;
use crate::core_types::Vec2;

/// Uniforms for the pressure solve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureParams {
    /// Jacobi rounds
    pub iterations: u32,
    /// Added to the stencil denominator `4 + straightness`
    pub straightness: f32,
    /// Start from the previous step's pressure instead of zero
    pub warm_start: bool,
    /// Boundary treatment
    pub boundary: BoundaryMode,
}

struct PoissonPass<'a> {
    pressure: FieldView<'a>,
    divergence: FieldView<'a>,
    offset: Vec2,
    inv_denominator: f32,
}

impl ComputePass for PoissonPass<'_> {
    type Output = f32;

    fn compute(&self, cell: Cell) -> f32 {
        let dx = Vec2::new(self.offset.x, 0.0);
        let dy = Vec2::new(0.0, self.offset.y);
        let p0: f32 = self.pressure.sample(cell.uv + dx);
        let p1: f32 = self.pressure.sample(cell.uv - dx);
        let p2: f32 = self.pressure.sample(cell.uv + dy);
        let p3: f32 = self.pressure.sample(cell.uv - dy);
        let div: f32 = self.divergence.texel(cell.x, cell.y);
        (p0 + p1 + p2 + p3) * self.inv_denominator - div
    }
}

/// Relax `pressure` against `divergence` for `params.iterations` rounds.
///
/// Neighbors are read two cells away. With `warm_start` off the pressure is
/// zeroed first. The result is the current buffer of `pressure`.
pub fn solve_pressure(divergence: FieldView<'_>, pressure: &mut Field, params: &PressureParams) {
    if !params.warm_start {
        pressure.clear();
    }

    let region = pass_region(params.boundary, pressure.width(), pressure.height());
    let offset = pressure.cell_scale() * 2.0;
    let inv_denominator = 1.0 / (4.0 + params.straightness);

    for _ in 0..params.iterations {
        {
            let (current, mut write) = pressure.split();
            let pass = PoissonPass {
                pressure: current,
                divergence,
                offset,
                inv_denominator,
            };
            execute(&pass, &mut write, region, Blend::Replace);
        }
        pressure.swap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::fields::StoragePrecision;
    use approx::assert_relative_eq;

    fn params(iterations: u32, warm_start: bool) -> PressureParams {
        PressureParams {
            iterations,
            straightness: 1.0,
            warm_start,
            boundary: BoundaryMode::Closed,
        }
    }

    #[test]
    fn test_first_round_from_zero_is_negative_divergence() {
        let mut divergence = Field::new("divergence", 6, 6, 1, StoragePrecision::Full).unwrap();
        divergence.current_mut().store(3, 3, 2.0_f32);
        let mut pressure = Field::new("pressure", 6, 6, 1, StoragePrecision::Full).unwrap();

        solve_pressure(divergence.read(), &mut pressure, &params(1, true));
        assert_relative_eq!(pressure.read().scalar_at(3, 3), -2.0);
        assert_eq!(pressure.read().scalar_at(2, 2), 0.0);
    }

    #[test]
    fn test_second_round_uses_two_cell_stencil() {
        let mut divergence = Field::new("divergence", 8, 8, 1, StoragePrecision::Full).unwrap();
        divergence.current_mut().store(4, 4, 1.0_f32);
        let mut pressure = Field::new("pressure", 8, 8, 1, StoragePrecision::Full).unwrap();

        solve_pressure(divergence.read(), &mut pressure, &params(2, true));
        let view = pressure.read();
        // Cell two to the right sees p = -1 once, divided by 4 + straightness
        assert_relative_eq!(view.scalar_at(6, 4), -0.2, epsilon = 1e-6);
        assert_relative_eq!(view.scalar_at(5, 4), 0.0, epsilon = 1e-6);
        assert_relative_eq!(view.scalar_at(4, 4), -1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_warm_start_keeps_previous_pressure() {
        let divergence = Field::new("divergence", 5, 5, 1, StoragePrecision::Full).unwrap();
        let mut pressure = Field::new("pressure", 5, 5, 1, StoragePrecision::Full).unwrap();
        pressure.current_mut().as_mut_slice().fill(1.0);

        // Uniform pressure with zero divergence relaxes toward 4/5 of itself
        solve_pressure(divergence.read(), &mut pressure, &params(1, true));
        assert_relative_eq!(pressure.read().scalar_at(2, 2), 0.8, epsilon = 1e-6);

        pressure.current_mut().as_mut_slice().fill(1.0);
        solve_pressure(divergence.read(), &mut pressure, &params(1, false));
        assert_eq!(pressure.read().scalar_at(2, 2), 0.0);
    }
}
