//! Fluid solver trait definition
//!
//! This module defines the `FluidSolver` trait, a backend-agnostic interface
//! for the stable-fluids pipeline. The CPU backend implements it; a host may
//! provide its own GPU implementation behind the same interface.

use super::context::Viewport;
use super::fields::FieldView;
use super::profiler::StageTimings;
use super::quality::GridLayout;
use crate::config::SimulationConfig;
use crate::error::FluidError;
use crate::pointer::PointerSample;

/// Backend-agnostic interface for the fluid cursor solver
///
/// One call to `step` runs the whole stage chain: advection, external force,
/// optional viscosity, divergence, pressure solve and projection. The final
/// velocity field stays readable until the next `step` or `resize`.
pub trait FluidSolver: Send + Sync {
    /// Advance the simulation by one fixed step
    ///
    /// # Arguments
    ///
    /// * `pointer` - Pointer state for this step; a zero `diff` applies no force
    fn step(&mut self, pointer: &PointerSample);

    /// Reallocate every field for a new viewport
    ///
    /// New fields are zero-initialized.
    ///
    /// # Errors
    ///
    /// Returns `FluidError::GridTooLarge` or `FluidError::Allocation` if the
    /// fields cannot be allocated. The previous fields are kept in that case.
    fn resize(&mut self, viewport: Viewport) -> Result<(), FluidError>;

    /// Apply new tuning values, reallocating when grid sizing or precision changed
    ///
    /// # Errors
    ///
    /// Returns `FluidError::InvalidConfig` for out-of-range values, or an
    /// allocation error if reallocation fails. The old config stays active on error.
    fn apply_config(&mut self, config: &SimulationConfig) -> Result<(), FluidError>;

    /// Active configuration
    fn config(&self) -> &SimulationConfig;

    /// Latest projected velocity
    ///
    /// # Returns
    ///
    /// Two-component field in row-major order
    fn velocity(&self) -> FieldView<'_>;

    /// Grid layout of every field
    fn layout(&self) -> GridLayout;

    /// Get grid dimensions
    ///
    /// # Returns
    ///
    /// Tuple of `(width, height)` in cells
    fn dimensions(&self) -> (usize, usize) {
        let layout = self.layout();
        (layout.width, layout.height)
    }

    /// Number of steps run since construction or the last resize
    fn step_count(&self) -> u64;

    /// Per-stage wall-clock time of the last step
    fn stage_timings(&self) -> StageTimings;
}
