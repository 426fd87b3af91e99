//! Fluid cursor owner
//!
//! `FluidCursor` is what a host embeds. It owns the single pointer tracker,
//! the fixed-step scheduler and the solver, and it keeps serving a neutral
//! velocity field when the solver cannot allocate its grid, so a failed
//! allocation disables the effect instead of the page.

use crate::config::SimulationConfig;
use crate::core_types::Vec2;
use crate::error::FluidError;
use crate::pointer::PointerTracker;
use crate::scheduler::FixedStepScheduler;
use crate::solver::{
    create_fluid_solver, DeviceClass, FieldView, FluidSolver, FrameTimer, SolverContext, Viewport,
};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Fluid cursor effect: pointer input in, velocity field out.
pub struct FluidCursor {
    config: SimulationConfig,
    context: SolverContext,
    solver: Option<Box<dyn FluidSolver>>,
    pointer: PointerTracker,
    scheduler: FixedStepScheduler,
    frame_timer: FrameTimer,
    last_error: Option<FluidError>,
}

impl FluidCursor {
    /// Create the effect for a viewport.
    ///
    /// If the grid cannot be allocated the effect starts disabled: it logs a
    /// warning, records the error in `last_error` and serves the neutral field.
    ///
    /// # Arguments
    ///
    /// * `config` - Solver and scheduler parameters
    /// * `width`, `height` - Viewport in pixels (clamped to at least 1)
    /// * `device` - Device class, selects the default storage precision
    ///
    /// # Errors
    ///
    /// Returns `FluidError::InvalidConfig` if `config` fails validation.
    pub fn new(
        config: SimulationConfig,
        width: u32,
        height: u32,
        device: DeviceClass,
    ) -> Result<Self, FluidError> {
        config.validate()?;

        let mut cursor = Self {
            scheduler: FixedStepScheduler::from_config(&config),
            context: SolverContext {
                viewport: Viewport::new(width, height),
                device,
            },
            config,
            solver: None,
            pointer: PointerTracker::new(),
            frame_timer: FrameTimer::new(),
            last_error: None,
        };
        // Allocation failures leave the effect disabled rather than failing construction
        if cursor.rebuild().is_err() {
            debug!("fluid cursor starts disabled");
        }
        info!(
            "Fluid cursor created for {}x{} viewport (enabled: {})",
            cursor.context.viewport.width(),
            cursor.context.viewport.height(),
            cursor.is_enabled()
        );
        Ok(cursor)
    }

    fn rebuild(&mut self) -> Result<(), FluidError> {
        match create_fluid_solver(&self.config, &self.context) {
            Ok(solver) => {
                self.enable(solver);
                Ok(())
            }
            Err(err) => {
                self.disable(err.clone());
                Err(err)
            }
        }
    }

    fn enable(&mut self, solver: Box<dyn FluidSolver>) {
        if self.last_error.take().is_some() {
            info!("Fluid cursor re-enabled");
        }
        self.solver = Some(solver);
        self.pointer.reseed();
    }

    fn disable(&mut self, err: FluidError) {
        if self.solver.is_some() || self.last_error.is_none() {
            warn!("Fluid cursor disabled: {}", err);
        }
        self.solver = None;
        self.last_error = Some(err);
    }

    /// Advance by the wall-clock time since the last call.
    ///
    /// Runs zero or more fixed steps. Pointer motion recorded since the last
    /// step is applied by the first of them only.
    ///
    /// # Returns
    ///
    /// Number of simulation steps run (0 while disabled)
    pub fn step(&mut self, elapsed: Duration) -> u32 {
        let due = self.scheduler.advance(elapsed);
        let Some(solver) = self.solver.as_mut() else {
            return 0;
        };
        if due == 0 {
            return 0;
        }

        let start = Instant::now();
        for _ in 0..due {
            let sample = self.pointer.sample();
            solver.step(&sample);
        }
        self.frame_timer.record(start.elapsed().as_secs_f64() * 1000.0);
        due
    }

    /// Resize to a new viewport, reallocating every field.
    ///
    /// Dimensions below 1 are clamped to 1. A successful resize re-enables a
    /// disabled effect. Pointer motion recorded before the resize is dropped,
    /// so the zeroed grid receives no impulse from it.
    ///
    /// # Errors
    ///
    /// Returns the allocation error; the effect is disabled until a later
    /// resize succeeds.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), FluidError> {
        let viewport = Viewport::new(width, height);
        self.context.viewport = viewport;
        self.scheduler.reset();

        let Some(solver) = self.solver.as_mut() else {
            return self.rebuild();
        };
        match solver.resize(viewport) {
            Ok(()) => {
                self.pointer.reseed();
                Ok(())
            }
            Err(err) => {
                self.disable(err.clone());
                Err(err)
            }
        }
    }

    /// Latest projected velocity, or a neutral 1×1 zero field while disabled.
    pub fn current_velocity_field(&self) -> FieldView<'_> {
        match &self.solver {
            Some(solver) => solver.velocity(),
            None => FieldView::neutral_velocity(),
        }
    }

    /// Record a pointer move in normalized `[-1, 1]` coordinates.
    pub fn pointer_move(&mut self, position: Vec2) {
        self.pointer.move_to(position);
    }

    /// Record a pointer move in pixels, origin at the top-left corner.
    pub fn pointer_move_pixels(&mut self, x: f32, y: f32) {
        let viewport = self.context.viewport;
        let position =
            PointerTracker::normalize(x, y, viewport.width() as f32, viewport.height() as f32);
        self.pointer.move_to(position);
    }

    /// Record the start of a touch in normalized coordinates.
    pub fn touch_start(&mut self, position: Vec2) {
        self.pointer.touch_start(position);
    }

    /// Record a touch move in normalized coordinates.
    pub fn touch_move(&mut self, position: Vec2) {
        self.pointer.touch_move(position);
    }

    /// Record the end of a touch.
    pub fn touch_end(&mut self) {
        self.pointer.touch_end();
    }

    /// Replace the configuration.
    ///
    /// Stage parameters take effect on the next step. Grid sizing or
    /// precision changes reallocate the fields.
    ///
    /// # Errors
    ///
    /// Returns `FluidError::InvalidConfig` (nothing changes) or an allocation
    /// error (the effect is disabled).
    pub fn update_config(&mut self, config: SimulationConfig) -> Result<(), FluidError> {
        config.validate()?;
        self.scheduler.reconfigure(config.step_interval, config.max_steps_per_tick);

        let realloc = self.config.requires_realloc(&config);
        self.config = config;
        debug!(realloc, "fluid cursor config updated");

        match self.solver.as_mut() {
            Some(solver) => match solver.apply_config(&self.config) {
                Ok(()) => {
                    if realloc {
                        self.pointer.reseed();
                    }
                    Ok(())
                }
                Err(err) => {
                    self.disable(err.clone());
                    Err(err)
                }
            },
            None if realloc => self.rebuild(),
            None => Ok(()),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Whether the solver is allocated and running
    pub fn is_enabled(&self) -> bool {
        self.solver.is_some()
    }

    /// Error that disabled the effect, if any
    pub fn last_error(&self) -> Option<&FluidError> {
        self.last_error.as_ref()
    }

    /// The solver, while enabled
    pub fn solver(&self) -> Option<&dyn FluidSolver> {
        self.solver.as_deref()
    }

    /// Shared pointer tracker
    pub fn pointer(&self) -> &PointerTracker {
        &self.pointer
    }

    /// Current viewport
    pub fn viewport(&self) -> Viewport {
        self.context.viewport
    }

    /// Timing of recent ticks that ran at least one step
    pub fn frame_timer(&self) -> &FrameTimer {
        &self.frame_timer
    }
}
