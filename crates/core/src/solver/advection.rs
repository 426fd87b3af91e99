//! Semi-Lagrangian self-advection of velocity
//!
//! Each cell traces backwards along the velocity field and takes the
//! bilinearly sampled value found there, scaled by `dissipation`. The BFECC
//! variant runs one extra forward trace to estimate the error of the backward
//! trace and shifts the starting point by half of it before the final trace.

use super::boundary::{pass_region, zero_border};
use super::fields::{Field, FieldView};
use super::pass::{execute, Blend, Cell, ComputePass};
use crate::config::{AdvectionScheme, BoundaryMode};
use crate::core_types::Vec2;

/// Uniforms for one advection pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdvectionParams {
    /// PDE timestep
    pub dt: f32,
    /// Multiplier applied to every advected value, in `(0, 1]`
    pub dissipation: f32,
    /// Back-trace scheme
    pub scheme: AdvectionScheme,
    /// Boundary treatment
    pub boundary: BoundaryMode,
}

struct AdvectionPass<'a> {
    velocity: FieldView<'a>,
    // dt * ratio, per axis
    step: Vec2,
    dissipation: f32,
    scheme: AdvectionScheme,
}

impl AdvectionPass<'_> {
    #[inline]
    fn trace_back(&self, uv: Vec2) -> Vec2 {
        let v: Vec2 = self.velocity.sample(uv);
        uv - v.component_mul(&self.step)
    }
}

impl ComputePass for AdvectionPass<'_> {
    type Output = Vec2;

    fn compute(&self, cell: Cell) -> Vec2 {
        let origin = match self.scheme {
            AdvectionScheme::Simple => self.trace_back(cell.uv),
            AdvectionScheme::Bfecc => {
                let back = self.trace_back(cell.uv);
                let v_back: Vec2 = self.velocity.sample(back);
                let forward = back + v_back.component_mul(&self.step);
                let error = forward - cell.uv;
                self.trace_back(cell.uv - error * 0.5)
            }
        };
        let advected: Vec2 = self.velocity.sample(origin);
        advected * self.dissipation
    }
}

/// Per-axis factor mapping velocity to UV displacement: `max(w, h) / (w, h)`.
pub fn aspect_ratio(width: usize, height: usize) -> Vec2 {
    let longest = width.max(height) as f32;
    Vec2::new(longest / width as f32, longest / height as f32)
}

/// Advect `velocity` by itself for one timestep.
///
/// Reads the current buffer, writes the other and swaps. In closed mode the
/// outermost ring is zeroed afterwards; in open mode it is left untouched.
pub fn advect(velocity: &mut Field, params: &AdvectionParams) {
    let width = velocity.width();
    let height = velocity.height();
    let region = pass_region(params.boundary, width, height);
    let step = aspect_ratio(width, height) * params.dt;

    {
        let (read, mut write) = velocity.split();
        let pass = AdvectionPass {
            velocity: read,
            step,
            dissipation: params.dissipation,
            scheme: params.scheme,
        };
        execute(&pass, &mut write, region, Blend::Replace);
    }
    velocity.swap();

    if params.boundary == BoundaryMode::Closed {
        zero_border(&mut velocity.current_mut());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::fields::StoragePrecision;
    use approx::assert_relative_eq;

    fn params(scheme: AdvectionScheme, boundary: BoundaryMode) -> AdvectionParams {
        AdvectionParams {
            dt: 0.014,
            dissipation: 0.96,
            scheme,
            boundary,
        }
    }

    #[test]
    fn test_aspect_ratio() {
        assert_eq!(aspect_ratio(200, 100), Vec2::new(1.0, 2.0));
        assert_eq!(aspect_ratio(50, 50), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_uniform_field_only_dissipates() {
        for scheme in [AdvectionScheme::Simple, AdvectionScheme::Bfecc] {
            let mut velocity = Field::new("velocity", 8, 8, 2, StoragePrecision::Full).unwrap();
            velocity.current_mut().as_mut_slice().fill(0.5);
            advect(&mut velocity, &params(scheme, BoundaryMode::Open));

            let view = velocity.read();
            let v = view.vector_at(4, 4);
            assert_relative_eq!(v.x, 0.48, epsilon = 1e-6);
            assert_relative_eq!(v.y, 0.48, epsilon = 1e-6);
            // Open mode never writes the ring
            assert_eq!(view.vector_at(0, 4), Vec2::zeros());
        }
    }

    #[test]
    fn test_closed_mode_zeroes_ring() {
        let mut velocity = Field::new("velocity", 6, 6, 2, StoragePrecision::Full).unwrap();
        velocity.current_mut().as_mut_slice().fill(1.0);
        advect(
            &mut velocity,
            &params(AdvectionScheme::Bfecc, BoundaryMode::Closed),
        );

        let view = velocity.read();
        for i in 0..6 {
            assert_eq!(view.vector_at(i, 0), Vec2::zeros());
            assert_eq!(view.vector_at(i, 5), Vec2::zeros());
            assert_eq!(view.vector_at(0, i), Vec2::zeros());
            assert_eq!(view.vector_at(5, i), Vec2::zeros());
        }
        assert!(view.vector_at(2, 2).x > 0.9);
    }

    #[test]
    fn test_zero_field_stays_zero() {
        let mut velocity = Field::new("velocity", 5, 7, 2, StoragePrecision::Full).unwrap();
        advect(
            &mut velocity,
            &params(AdvectionScheme::Bfecc, BoundaryMode::Closed),
        );
        assert!(velocity.read().as_slice().iter().all(|&v| v == 0.0));
    }
}
