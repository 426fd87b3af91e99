//! CPU-based fluid solver implementation
//!
//! This module provides a CPU implementation of the `FluidSolver` trait using
//! double-buffered `Vec<f32>` fields and Rayon row parallelism inside each
//! pass. Stages run strictly one after another.

use super::advection::{advect, AdvectionParams};
use super::context::{DeviceClass, SolverContext, Viewport};
use super::divergence::compute_divergence;
use super::external_force::{apply_force, ForceParams};
use super::fields::{Field, FieldView, StoragePrecision};
use super::pressure::{solve_pressure, PressureParams};
use super::profiler::{ProfilerScope, StageTimings};
use super::projection::project;
use super::quality::GridLayout;
use super::viscosity::{diffuse, ViscosityParams};
use super::FluidSolver;
use crate::config::SimulationConfig;
use crate::core_types::Vec2;
use crate::error::FluidError;
use crate::pointer::PointerSample;
use tracing::{debug, info};

// Run `stage` and return its wall-clock time in milliseconds
fn timed(name: &'static str, stage: impl FnOnce()) -> f64 {
    let scope = ProfilerScope::new(name);
    stage();
    scope.elapsed_ms()
}

struct FieldSet {
    velocity: Field,
    viscous: Field,
    divergence: Field,
    pressure: Field,
}

impl FieldSet {
    fn allocate(
        layout: &GridLayout,
        precision: StoragePrecision,
        max_cells: usize,
    ) -> Result<Self, FluidError> {
        if layout.cell_count() > max_cells {
            return Err(FluidError::GridTooLarge {
                width: layout.width,
                height: layout.height,
                max_cells,
            });
        }
        let (width, height) = (layout.width, layout.height);
        Ok(Self {
            velocity: Field::new("velocity", width, height, 2, precision)?,
            viscous: Field::new("viscous", width, height, 2, precision)?,
            divergence: Field::new("divergence", width, height, 1, precision)?,
            pressure: Field::new("pressure", width, height, 1, precision)?,
        })
    }
}

/// CPU-based fluid solver using Rayon for parallelism
///
/// Owns the velocity, viscous, divergence and pressure fields. The velocity
/// field's current buffer holds the projected result of the last step and is
/// the advection input of the next one.
pub struct CpuFluidSolver {
    config: SimulationConfig,
    device: DeviceClass,
    viewport: Viewport,
    layout: GridLayout,
    precision: StoragePrecision,

    velocity: Field,
    viscous: Field,
    divergence: Field,
    pressure: Field,

    timings: StageTimings,
    step_count: u64,
}

impl CpuFluidSolver {
    /// Create a new CPU fluid solver
    ///
    /// # Arguments
    ///
    /// * `config` - Solver parameters, validated before use
    /// * `context` - Viewport and device class
    ///
    /// # Errors
    ///
    /// Returns `FluidError::InvalidConfig` for out-of-range parameters,
    /// `FluidError::GridTooLarge` if the grid exceeds `config.max_cells`, or
    /// `FluidError::Allocation` if the allocator refuses a field.
    pub fn new(config: &SimulationConfig, context: &SolverContext) -> Result<Self, FluidError> {
        config.validate()?;

        let layout = GridLayout::from_viewport(context.viewport, config.resolution_factor);
        let precision = context.resolve_precision(config.precision);
        let fields = FieldSet::allocate(&layout, precision, config.max_cells)?;

        info!(
            "CPU fluid solver ready: {}x{} grid, {:?} precision, {:?} boundary",
            layout.width, layout.height, precision, config.boundary
        );

        Ok(Self {
            config: config.clone(),
            device: context.device,
            viewport: context.viewport,
            layout,
            precision,
            velocity: fields.velocity,
            viscous: fields.viscous,
            divergence: fields.divergence,
            pressure: fields.pressure,
            timings: StageTimings::default(),
            step_count: 0,
        })
    }

    fn install(
        &mut self,
        viewport: Viewport,
        layout: GridLayout,
        precision: StoragePrecision,
        fields: FieldSet,
    ) {
        self.viewport = viewport;
        self.layout = layout;
        self.precision = precision;
        self.velocity = fields.velocity;
        self.viscous = fields.viscous;
        self.divergence = fields.divergence;
        self.pressure = fields.pressure;
        self.timings = StageTimings::default();
        self.step_count = 0;
    }

    /// Viewport the fields are sized for
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Storage precision of every field
    pub fn precision(&self) -> StoragePrecision {
        self.precision
    }

    /// Latest pressure field
    pub fn pressure(&self) -> FieldView<'_> {
        self.pressure.read()
    }

    /// Latest divergence field (before projection)
    pub fn divergence(&self) -> FieldView<'_> {
        self.divergence.read()
    }

    /// Overwrite the current velocity with `f(uv)` evaluated at every cell center.
    ///
    /// Used by hosts and tests to start from a known flow.
    pub fn seed_velocity(&mut self, f: impl Fn(Vec2) -> Vec2) {
        let (width, height) = (self.layout.width, self.layout.height);
        let mut target = self.velocity.current_mut();
        for y in 0..height {
            for x in 0..width {
                let uv = Vec2::new(
                    (x as f32 + 0.5) / width as f32,
                    (y as f32 + 0.5) / height as f32,
                );
                target.store(x, y, f(uv));
            }
        }
    }

    /// Zero every field without reallocating.
    pub fn clear(&mut self) {
        self.velocity.clear();
        self.viscous.clear();
        self.divergence.clear();
        self.pressure.clear();
    }
}

impl FluidSolver for CpuFluidSolver {
    fn step(&mut self, pointer: &PointerSample) {
        let config = &self.config;
        let boundary = config.boundary;
        let dt = config.dt;

        let advection = AdvectionParams {
            dt,
            dissipation: config.dissipation,
            scheme: config.advection,
            boundary,
        };
        self.timings.advection_ms = timed("advection", || advect(&mut self.velocity, &advection));

        let force = ForceParams {
            mouse_force: config.mouse_force,
            cursor_size: config.cursor_size,
            force_cell_scale: self.layout.force_cell_scale,
            boundary,
        };
        let mut force_applied = false;
        self.timings.external_force_ms = timed("external_force", || {
            force_applied = apply_force(&mut self.velocity, pointer, &force);
        });

        let viscous = config.is_viscous;
        if viscous {
            let viscosity = ViscosityParams {
                viscosity: config.viscosity,
                dt,
                iterations: config.iterations_viscous,
                boundary,
            };
            self.timings.viscosity_ms = timed("viscosity", || {
                diffuse(&self.velocity, &mut self.viscous, &viscosity);
            });
        } else {
            self.timings.viscosity_ms = 0.0;
        }

        let source = if viscous { &self.viscous } else { &self.velocity };
        self.timings.divergence_ms = timed("divergence", || {
            compute_divergence(source.read(), &mut self.divergence, dt, boundary);
        });

        let pressure = PressureParams {
            iterations: config.iterations_poisson,
            straightness: config.straightness,
            warm_start: config.warm_start_pressure,
            boundary,
        };
        self.timings.pressure_ms = timed("pressure", || {
            solve_pressure(self.divergence.read(), &mut self.pressure, &pressure);
        });

        self.timings.projection_ms = timed("projection", || {
            if viscous {
                project(
                    self.pressure.read(),
                    self.viscous.read(),
                    &mut self.velocity.write_target(),
                    dt,
                    boundary,
                );
            } else {
                let (read, mut write) = self.velocity.split();
                project(self.pressure.read(), read, &mut write, dt, boundary);
            }
        });
        self.velocity.swap();

        self.step_count += 1;
        debug!(
            step = self.step_count,
            force_applied,
            total_ms = self.timings.total_ms(),
            "fluid step"
        );
    }

    fn resize(&mut self, viewport: Viewport) -> Result<(), FluidError> {
        let layout = GridLayout::from_viewport(viewport, self.config.resolution_factor);
        let fields = FieldSet::allocate(&layout, self.precision, self.config.max_cells)?;
        self.install(viewport, layout, self.precision, fields);
        info!(
            "Resized fluid grid to {}x{} for {}x{} viewport",
            layout.width,
            layout.height,
            viewport.width(),
            viewport.height()
        );
        Ok(())
    }

    fn apply_config(&mut self, config: &SimulationConfig) -> Result<(), FluidError> {
        config.validate()?;
        if self.config.requires_realloc(config) {
            let layout = GridLayout::from_viewport(self.viewport, config.resolution_factor);
            let precision = config
                .precision
                .unwrap_or_else(|| self.device.storage_precision());
            let fields = FieldSet::allocate(&layout, precision, config.max_cells)?;
            self.install(self.viewport, layout, precision, fields);
            info!(
                "Reallocated fluid grid: {}x{}, {:?} precision",
                layout.width, layout.height, precision
            );
        }
        self.config = config.clone();
        debug!(?config, "fluid config applied");
        Ok(())
    }

    fn config(&self) -> &SimulationConfig {
        &self.config
    }

    fn velocity(&self) -> FieldView<'_> {
        self.velocity.read()
    }

    fn layout(&self) -> GridLayout {
        self.layout
    }

    fn step_count(&self) -> u64 {
        self.step_count
    }

    fn stage_timings(&self) -> StageTimings {
        self.timings
    }
}
