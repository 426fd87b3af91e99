use fluid_cursor_core::{
    AdvectionScheme, BoundaryMode, DeviceClass, SimulationConfig, StoragePrecision,
};
use std::time::Duration;

use crate::error::DefaultFluidCursorError;

/// Boundary treatment shared by every solver pass.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FluidCursorBoundary {
    /// Walls with zero velocity on the grid edge.
    Closed = 0,
    /// Outermost ring of cells left untouched.
    Open = 1,
}

/// Velocity advection scheme.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FluidCursorAdvection {
    Simple = 0,
    Bfecc = 1,
}

/// Field storage precision.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FluidCursorPrecision {
    /// Follow the device class (half precision on mobile).
    Auto = 0,
    Full = 1,
    Half = 2,
}

/// Device class the effect runs on.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FluidCursorDevice {
    Desktop = 0,
    Mobile = 1,
}

impl From<FluidCursorDevice> for DeviceClass {
    fn from(device: FluidCursorDevice) -> Self {
        match device {
            FluidCursorDevice::Desktop => DeviceClass::Desktop,
            FluidCursorDevice::Mobile => DeviceClass::Mobile,
        }
    }
}

/// C-compatible mirror of `SimulationConfig`.
///
/// Obtain defaults with `fluid_cursor_default_config()` and override the
/// fields you need.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluidCursorConfig {
    /// Grid cells per viewport pixel
    pub resolution_factor: f32,
    /// Jacobi rounds for the pressure solve (>= 1)
    pub iterations_poisson: u32,
    /// Jacobi rounds for viscous diffusion (>= 1)
    pub iterations_viscous: u32,
    /// Per-step velocity retention in (0, 1]
    pub dissipation: f32,
    /// Pointer force multiplier
    pub mouse_force: f32,
    /// Cursor footprint radius in cells
    pub cursor_size: f32,
    /// Viscosity coefficient
    pub viscosity: f32,
    /// Fixed PDE timestep
    pub dt: f32,
    /// Damping term of the pressure solve
    pub straightness: f32,
    /// Run the viscosity stage
    pub is_viscous: bool,
    /// Reuse the previous pressure as the Jacobi starting guess
    pub warm_start_pressure: bool,
    pub boundary: FluidCursorBoundary,
    pub advection: FluidCursorAdvection,
    pub precision: FluidCursorPrecision,
    /// Upper bound on cells per field
    pub max_cells: usize,
    /// Wall-clock seconds between simulation steps
    pub step_interval_seconds: f64,
    /// Steps run per call before the backlog is dropped
    pub max_steps_per_tick: u32,
}

impl From<&SimulationConfig> for FluidCursorConfig {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            resolution_factor: config.resolution_factor,
            iterations_poisson: config.iterations_poisson,
            iterations_viscous: config.iterations_viscous,
            dissipation: config.dissipation,
            mouse_force: config.mouse_force,
            cursor_size: config.cursor_size,
            viscosity: config.viscosity,
            dt: config.dt,
            straightness: config.straightness,
            is_viscous: config.is_viscous,
            warm_start_pressure: config.warm_start_pressure,
            boundary: match config.boundary {
                BoundaryMode::Closed => FluidCursorBoundary::Closed,
                BoundaryMode::Open => FluidCursorBoundary::Open,
            },
            advection: match config.advection {
                AdvectionScheme::Simple => FluidCursorAdvection::Simple,
                AdvectionScheme::Bfecc => FluidCursorAdvection::Bfecc,
            },
            precision: match config.precision {
                None => FluidCursorPrecision::Auto,
                Some(StoragePrecision::Full) => FluidCursorPrecision::Full,
                Some(StoragePrecision::Half) => FluidCursorPrecision::Half,
            },
            max_cells: config.max_cells,
            step_interval_seconds: config.step_interval.as_secs_f64(),
            max_steps_per_tick: config.max_steps_per_tick,
        }
    }
}

impl TryFrom<&FluidCursorConfig> for SimulationConfig {
    type Error = DefaultFluidCursorError;

    /// Range checks beyond the interval conversion are left to
    /// `SimulationConfig::validate`.
    fn try_from(config: &FluidCursorConfig) -> Result<Self, Self::Error> {
        let step_interval = Duration::try_from_secs_f64(config.step_interval_seconds)
            .map_err(|err| {
                DefaultFluidCursorError::invalid_parameter(format!(
                    "step_interval_seconds {}: {err}",
                    config.step_interval_seconds
                ))
            })?;

        Ok(Self {
            resolution_factor: config.resolution_factor,
            iterations_poisson: config.iterations_poisson,
            iterations_viscous: config.iterations_viscous,
            dissipation: config.dissipation,
            mouse_force: config.mouse_force,
            cursor_size: config.cursor_size,
            viscosity: config.viscosity,
            boundary: match config.boundary {
                FluidCursorBoundary::Closed => BoundaryMode::Closed,
                FluidCursorBoundary::Open => BoundaryMode::Open,
            },
            dt: config.dt,
            is_viscous: config.is_viscous,
            advection: match config.advection {
                FluidCursorAdvection::Simple => AdvectionScheme::Simple,
                FluidCursorAdvection::Bfecc => AdvectionScheme::Bfecc,
            },
            straightness: config.straightness,
            warm_start_pressure: config.warm_start_pressure,
            precision: match config.precision {
                FluidCursorPrecision::Auto => None,
                FluidCursorPrecision::Full => Some(StoragePrecision::Full),
                FluidCursorPrecision::Half => Some(StoragePrecision::Half),
            },
            max_cells: config.max_cells,
            step_interval,
            max_steps_per_tick: config.max_steps_per_tick,
        })
    }
}

/// Default configuration, matching `SimulationConfig::default()`.
#[no_mangle]
pub extern "C" fn fluid_cursor_default_config() -> FluidCursorConfig {
    FluidCursorConfig::from(&SimulationConfig::default())
}
