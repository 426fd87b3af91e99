//! Fluid Cursor Core Library
//!
//! A grid-based incompressible fluid solver that drives a "fluid cursor"
//! distortion effect. Pointer motion stirs a velocity field; a host samples
//! that field once per frame to displace whatever it renders.
//!
//! ## Pipeline
//!
//! Each fixed simulation step runs the stable-fluids stage chain:
//! - Semi-Lagrangian advection with optional BFECC error compensation
//! - Radial external force from pointer displacement
//! - Optional implicit viscous diffusion (Jacobi)
//! - Divergence, Jacobi pressure solve and pressure-gradient projection
//!
//! `FluidCursor` ties the solver to pointer input and a fixed-timestep
//! scheduler; `solver` exposes the individual stages.

// Core types and utilities
pub mod core_types;

pub mod config;
pub mod error;
pub mod pointer;
pub mod scheduler;
pub mod simulation;
pub mod solver;

// Re-export core types
pub use core_types::Vec2;

pub use config::{AdvectionScheme, BoundaryMode, SimulationConfig};
pub use error::FluidError;
pub use pointer::{PointerSample, PointerTracker};
pub use scheduler::FixedStepScheduler;
pub use simulation::FluidCursor;
pub use solver::{
    create_fluid_solver, CpuFluidSolver, DeviceClass, FieldView, FluidSolver, GridLayout,
    QualityPreset, SolverContext, StoragePrecision, Viewport,
};
