//! Simulation configuration
//!
//! `SimulationConfig` is created once when the solver is built. Individual
//! values may be tuned at runtime (for example from a debug panel) through the
//! validated setters; tuning is not transactional and takes effect on the next
//! simulation step.

use crate::error::FluidError;
use crate::solver::StoragePrecision;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Boundary treatment shared by every pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundaryMode {
    /// Walls: every cell is written and a zero-velocity loop is rasterized on
    /// the grid edge after advection. Boundary space is `(0, 0)`.
    Closed,
    /// The outermost ring of cells is excluded from every pass. Boundary space
    /// equals the cell scale.
    Open,
}

/// Velocity advection scheme, resolved once when the pipeline is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdvectionScheme {
    /// First-order semi-Lagrangian back-trace.
    Simple,
    /// Back-and-forth error compensation of the back-traced sample position.
    Bfecc,
}

/// Tunable solver parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Grid cells per viewport pixel
    pub resolution_factor: f32,
    /// Jacobi rounds for the pressure Poisson solve
    pub iterations_poisson: u32,
    /// Jacobi rounds for implicit viscous diffusion
    pub iterations_viscous: u32,
    /// Per-step velocity retention in (0, 1]
    pub dissipation: f32,
    /// Scale applied to half the pointer displacement
    pub mouse_force: f32,
    /// Cursor footprint radius in cells of the force scale
    pub cursor_size: f32,
    /// Kinematic viscosity coefficient
    pub viscosity: f32,
    /// Boundary treatment
    pub boundary: BoundaryMode,
    /// Fixed PDE timestep used inside the stages
    pub dt: f32,
    /// Run the viscosity stage
    pub is_viscous: bool,
    /// Advection scheme
    pub advection: AdvectionScheme,
    /// Damping term added to the Poisson denominator
    pub straightness: f32,
    /// Keep the previous step's pressure as the Jacobi starting guess
    pub warm_start_pressure: bool,
    /// Storage precision override; `None` follows the device class
    pub precision: Option<StoragePrecision>,
    /// Upper bound on cells per field, checked before allocation
    pub max_cells: usize,
    /// Wall-clock interval between simulation steps
    pub step_interval: Duration,
    /// Catch-up cap; backlog beyond this many steps per tick is dropped
    pub max_steps_per_tick: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            resolution_factor: 0.5,
            iterations_poisson: 2,
            iterations_viscous: 2,
            dissipation: 0.96,
            mouse_force: 20.0,
            cursor_size: 100.0,
            viscosity: 30.0,
            boundary: BoundaryMode::Open,
            dt: 0.014,
            is_viscous: false,
            advection: AdvectionScheme::Bfecc,
            straightness: 1.0,
            warm_start_pressure: true,
            precision: None,
            max_cells: 2048 * 2048,
            step_interval: Duration::from_nanos(1_000_000_000 / 60),
            max_steps_per_tick: 10,
        }
    }
}

fn check_finite_positive(field: &'static str, value: f32) -> Result<(), FluidError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FluidError::invalid_config(
            field,
            format!("must be finite and positive, got {value}"),
        ))
    }
}

fn check_finite_non_negative(field: &'static str, value: f32) -> Result<(), FluidError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(FluidError::invalid_config(
            field,
            format!("must be finite and non-negative, got {value}"),
        ))
    }
}

fn check_at_least_one(field: &'static str, value: u32) -> Result<(), FluidError> {
    if value >= 1 {
        Ok(())
    } else {
        Err(FluidError::invalid_config(field, "must be at least 1"))
    }
}

impl SimulationConfig {
    /// Validate every field against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns `FluidError::InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> Result<(), FluidError> {
        check_finite_positive("resolution_factor", self.resolution_factor)?;
        check_at_least_one("iterations_poisson", self.iterations_poisson)?;
        check_at_least_one("iterations_viscous", self.iterations_viscous)?;
        if !(self.dissipation > 0.0 && self.dissipation <= 1.0) {
            return Err(FluidError::invalid_config(
                "dissipation",
                format!("must be in (0, 1], got {}", self.dissipation),
            ));
        }
        check_finite_non_negative("mouse_force", self.mouse_force)?;
        check_finite_positive("cursor_size", self.cursor_size)?;
        check_finite_non_negative("viscosity", self.viscosity)?;
        check_finite_positive("dt", self.dt)?;
        check_finite_non_negative("straightness", self.straightness)?;
        if self.max_cells == 0 {
            return Err(FluidError::invalid_config("max_cells", "must be at least 1"));
        }
        if self.step_interval.is_zero() {
            return Err(FluidError::invalid_config(
                "step_interval",
                "must be longer than zero",
            ));
        }
        check_at_least_one("max_steps_per_tick", self.max_steps_per_tick)
    }

    /// Set the grid resolution factor.
    ///
    /// Takes effect on the next resize; `FluidCursor::update_config` triggers
    /// one automatically.
    ///
    /// # Errors
    ///
    /// Returns `FluidError::InvalidConfig` if `factor` is not finite and positive.
    pub fn set_resolution_factor(&mut self, factor: f32) -> Result<(), FluidError> {
        check_finite_positive("resolution_factor", factor)?;
        self.resolution_factor = factor;
        Ok(())
    }

    /// Set the number of pressure Jacobi rounds.
    ///
    /// # Errors
    ///
    /// Returns `FluidError::InvalidConfig` if `iterations` is zero.
    pub fn set_iterations_poisson(&mut self, iterations: u32) -> Result<(), FluidError> {
        check_at_least_one("iterations_poisson", iterations)?;
        self.iterations_poisson = iterations;
        Ok(())
    }

    /// Set the number of viscous Jacobi rounds.
    ///
    /// # Errors
    ///
    /// Returns `FluidError::InvalidConfig` if `iterations` is zero.
    pub fn set_iterations_viscous(&mut self, iterations: u32) -> Result<(), FluidError> {
        check_at_least_one("iterations_viscous", iterations)?;
        self.iterations_viscous = iterations;
        Ok(())
    }

    /// Set the per-step dissipation factor.
    ///
    /// # Errors
    ///
    /// Returns `FluidError::InvalidConfig` unless `dissipation` is in (0, 1].
    pub fn set_dissipation(&mut self, dissipation: f32) -> Result<(), FluidError> {
        if !(dissipation > 0.0 && dissipation <= 1.0) {
            return Err(FluidError::invalid_config(
                "dissipation",
                format!("must be in (0, 1], got {dissipation}"),
            ));
        }
        self.dissipation = dissipation;
        Ok(())
    }

    /// Set the pointer force multiplier.
    ///
    /// # Errors
    ///
    /// Returns `FluidError::InvalidConfig` if `force` is negative or not finite.
    pub fn set_mouse_force(&mut self, force: f32) -> Result<(), FluidError> {
        check_finite_non_negative("mouse_force", force)?;
        self.mouse_force = force;
        Ok(())
    }

    /// Set the cursor footprint radius.
    ///
    /// # Errors
    ///
    /// Returns `FluidError::InvalidConfig` if `size` is not finite and positive.
    pub fn set_cursor_size(&mut self, size: f32) -> Result<(), FluidError> {
        check_finite_positive("cursor_size", size)?;
        self.cursor_size = size;
        Ok(())
    }

    /// Set the viscosity coefficient.
    ///
    /// # Errors
    ///
    /// Returns `FluidError::InvalidConfig` if `viscosity` is negative or not finite.
    pub fn set_viscosity(&mut self, viscosity: f32) -> Result<(), FluidError> {
        check_finite_non_negative("viscosity", viscosity)?;
        self.viscosity = viscosity;
        Ok(())
    }

    /// Set the fixed PDE timestep.
    ///
    /// # Errors
    ///
    /// Returns `FluidError::InvalidConfig` if `dt` is not finite and positive.
    pub fn set_dt(&mut self, dt: f32) -> Result<(), FluidError> {
        check_finite_positive("dt", dt)?;
        self.dt = dt;
        Ok(())
    }

    /// Set the Poisson damping term.
    ///
    /// # Errors
    ///
    /// Returns `FluidError::InvalidConfig` if `straightness` is negative or not finite.
    pub fn set_straightness(&mut self, straightness: f32) -> Result<(), FluidError> {
        check_finite_non_negative("straightness", straightness)?;
        self.straightness = straightness;
        Ok(())
    }

    /// Select the boundary treatment.
    pub fn set_boundary(&mut self, boundary: BoundaryMode) {
        self.boundary = boundary;
    }

    /// Enable or disable the viscosity stage.
    pub fn set_viscous(&mut self, enabled: bool) {
        self.is_viscous = enabled;
    }

    /// Select the advection scheme.
    pub fn set_advection(&mut self, scheme: AdvectionScheme) {
        self.advection = scheme;
    }

    /// Whether switching from `self` to `other` requires reallocating fields.
    pub(crate) fn requires_realloc(&self, other: &Self) -> bool {
        self.resolution_factor != other.resolution_factor
            || self.precision != other.precision
            || self.max_cells != other.max_cells
    }
}
