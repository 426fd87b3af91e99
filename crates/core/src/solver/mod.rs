//! Stable-fluids solver module
//!
//! This module provides the grid solver behind the fluid cursor effect. The
//! core abstraction is the `FluidSolver` trait; the crate ships a CPU
//! implementation that evaluates every pass row-parallel with Rayon.
//!
//! # Pipeline
//!
//! Each step runs, in order:
//! 1. Advection (semi-Lagrangian, optionally BFECC-corrected)
//! 2. External force from pointer motion
//! 3. Viscous diffusion (optional)
//! 4. Divergence
//! 5. Pressure Poisson solve (Jacobi)
//! 6. Pressure-gradient projection
//!
//! # Example
//!
//! ```rust,ignore
//! use fluid_cursor_core::solver::{create_fluid_solver, SolverContext};
//! use fluid_cursor_core::{PointerSample, SimulationConfig};
//!
//! let mut solver = create_fluid_solver(&SimulationConfig::default(), &SolverContext::desktop(1280, 720))?;
//! solver.step(&PointerSample::idle());
//! let velocity = solver.velocity();
//! ```

pub mod advection;
pub mod boundary;
mod context;
mod cpu;
pub mod diagnostics;
pub mod divergence;
pub mod external_force;
mod fields;
pub mod pass;
pub mod pressure;
pub mod profiler;
pub mod projection;
mod quality;
#[allow(clippy::module_name_repetitions)]
mod r#trait;
pub mod viscosity;

// Re-exports
pub use context::{DeviceClass, SolverContext, Viewport};
pub use cpu::CpuFluidSolver;
pub use fields::{Field, FieldTarget, FieldView, StoragePrecision, Texel};
pub use profiler::{FrameTimer, ProfilerScope, StageTimings};
pub use quality::{GridLayout, QualityPreset};
pub use r#trait::FluidSolver;

use crate::config::SimulationConfig;
use crate::error::FluidError;
use tracing::info;

/// Create a fluid solver for the given configuration and host context
///
/// Only the CPU backend ships with this crate, so the selection always
/// resolves to `CpuFluidSolver`.
///
/// # Arguments
///
/// * `config` - Solver parameters
/// * `context` - Viewport and device class
///
/// # Returns
///
/// A boxed `FluidSolver` trait object
///
/// # Errors
///
/// Returns the construction error of the selected backend: invalid
/// configuration, a grid over the cell budget, or a refused allocation.
pub fn create_fluid_solver(
    config: &SimulationConfig,
    context: &SolverContext,
) -> Result<Box<dyn FluidSolver>, FluidError> {
    info!(
        "Using CPU backend for {}x{} viewport ({:?})",
        context.viewport.width(),
        context.viewport.height(),
        context.device
    );
    Ok(Box::new(CpuFluidSolver::new(config, context)?))
}
