//! Implicit viscous diffusion by Jacobi relaxation

use super::boundary::pass_region;
use super::fields::{Field, FieldView};
use super::pass::{execute, Blend, Cell, ComputePass};
use crate::config::BoundaryMode;
use crate::core_types::Vec2;

/// Uniforms for the viscous solve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViscosityParams {
    /// Viscosity coefficient ν
    pub viscosity: f32,
    /// PDE timestep
    pub dt: f32,
    /// Jacobi rounds
    pub iterations: u32,
    /// Boundary treatment
    pub boundary: BoundaryMode,
}

struct ViscousPass<'a> {
    // Post-force velocity, the right-hand side
    old: FieldView<'a>,
    iterate: FieldView<'a>,
    offset: Vec2,
    nu_dt: f32,
}

impl ComputePass for ViscousPass<'_> {
    type Output = Vec2;

    fn compute(&self, cell: Cell) -> Vec2 {
        let old: Vec2 = self.old.texel(cell.x, cell.y);
        let right: Vec2 = self.iterate.sample(cell.uv + Vec2::new(self.offset.x, 0.0));
        let left: Vec2 = self.iterate.sample(cell.uv - Vec2::new(self.offset.x, 0.0));
        let top: Vec2 = self.iterate.sample(cell.uv + Vec2::new(0.0, self.offset.y));
        let bottom: Vec2 = self.iterate.sample(cell.uv - Vec2::new(0.0, self.offset.y));
        (old * 4.0 + (right + left + top + bottom) * self.nu_dt) / (4.0 * (1.0 + self.nu_dt))
    }
}

/// Diffuse `velocity` into `viscous`.
///
/// The iterate is seeded from the current velocity, then relaxed for
/// `iterations` rounds reading neighbors two cells away. The result is the
/// current buffer of `viscous`; `velocity` is not modified.
pub fn diffuse(velocity: &Field, viscous: &mut Field, params: &ViscosityParams) {
    let old = velocity.read();
    viscous.current_mut().copy_from(&old);

    let region = pass_region(params.boundary, viscous.width(), viscous.height());
    let offset = viscous.cell_scale() * 2.0;
    let nu_dt = params.viscosity * params.dt;

    for _ in 0..params.iterations {
        {
            let (iterate, mut write) = viscous.split();
            let pass = ViscousPass {
                old,
                iterate,
                offset,
                nu_dt,
            };
            execute(&pass, &mut write, region, Blend::Replace);
        }
        viscous.swap();
    }
}
