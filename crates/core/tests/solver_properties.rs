//! Physical properties of the solver stages
//!
//! Run with `RUST_LOG=fluid_cursor_core=trace` to see per-stage timings.

use approx::assert_relative_eq;
use fluid_cursor_core::solver::advection::{advect, AdvectionParams};
use fluid_cursor_core::solver::diagnostics::{kinetic_energy, mean_abs_divergence};
use fluid_cursor_core::solver::divergence::compute_divergence;
use fluid_cursor_core::solver::external_force::{apply_force, ForceParams, Splat};
use fluid_cursor_core::solver::pressure::{solve_pressure, PressureParams};
use fluid_cursor_core::solver::projection::project;
use fluid_cursor_core::solver::Field;
use fluid_cursor_core::{
    AdvectionScheme, BoundaryMode, CpuFluidSolver, FluidSolver, PointerSample, SimulationConfig,
    SolverContext, StoragePrecision, Vec2,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn random_velocity(n: usize, seed: u64) -> Field {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut field = Field::new("velocity", n, n, 2, StoragePrecision::Full).unwrap();
    for value in field.current_mut().as_mut_slice() {
        *value = rng.random_range(-1.0..1.0);
    }
    field
}

fn interior_l2(field: &Field) -> f64 {
    let view = field.read();
    let mut sum = 0.0;
    for y in 1..view.height() - 1 {
        for x in 1..view.width() - 1 {
            sum += f64::from(view.scalar_at(x, y)).powi(2);
        }
    }
    sum.sqrt()
}

#[test]
fn pressure_projection_reduces_divergence() {
    let n = 32;
    let dt = 0.014;
    for (seed, boundary) in [(1, BoundaryMode::Open), (2, BoundaryMode::Closed)] {
        let mut velocity = random_velocity(n, seed);
        let mut divergence = Field::new("divergence", n, n, 1, StoragePrecision::Full).unwrap();
        let mut pressure = Field::new("pressure", n, n, 1, StoragePrecision::Full).unwrap();

        let before_mean = mean_abs_divergence(&velocity.read());
        compute_divergence(velocity.read(), &mut divergence, dt, boundary);
        let before = interior_l2(&divergence);

        let params = PressureParams {
            iterations: 2,
            straightness: 1.0,
            warm_start: true,
            boundary,
        };
        solve_pressure(divergence.read(), &mut pressure, &params);
        {
            let (read, mut write) = velocity.split();
            project(pressure.read(), read, &mut write, dt, boundary);
        }
        velocity.swap();

        let after_mean = mean_abs_divergence(&velocity.read());
        assert!(
            after_mean < before_mean,
            "{boundary:?}: mean |div| {before_mean} -> {after_mean}"
        );

        compute_divergence(velocity.read(), &mut divergence, dt, boundary);
        let after = interior_l2(&divergence);
        assert!(
            after < before * 0.9,
            "{boundary:?}: divergence {before} -> {after}"
        );
    }
}

#[test]
fn unforced_energy_decays_to_zero() {
    let config = SimulationConfig {
        boundary: BoundaryMode::Closed,
        ..SimulationConfig::default()
    };
    let mut solver = CpuFluidSolver::new(&config, &SolverContext::desktop(48, 48)).unwrap();
    solver.seed_velocity(|uv| {
        let p = uv - Vec2::new(0.5, 0.5);
        Vec2::new(-p.y, p.x) * 4.0 * (-20.0 * p.norm_squared()).exp()
    });

    let epsilon = 1e-8;
    let mut previous = kinetic_energy(&solver.velocity());
    assert!(previous > epsilon);

    let idle = PointerSample::idle();
    let mut steps = 0;
    while previous >= epsilon {
        solver.step(&idle);
        let energy = kinetic_energy(&solver.velocity());
        assert!(
            energy < previous,
            "energy grew at step {steps}: {previous} -> {energy}"
        );
        previous = energy;
        steps += 1;
        assert!(steps < 1000, "energy did not decay: {previous}");
    }
}

#[test]
fn force_stays_inside_cursor_footprint() {
    let n = 80;
    let scale = Vec2::new(1.0 / n as f32, 1.0 / n as f32);
    let params = ForceParams {
        mouse_force: 20.0,
        cursor_size: 12.0,
        force_cell_scale: scale,
        boundary: BoundaryMode::Closed,
    };
    let pointer = PointerSample {
        position: Vec2::new(-0.25, 0.4),
        diff: Vec2::new(0.03, -0.01),
        touching: true,
    };

    let mut velocity = Field::new("velocity", n, n, 2, StoragePrecision::Full).unwrap();
    assert!(apply_force(&mut velocity, &pointer, &params));

    let splat = Splat::from_pointer(&pointer, &params).unwrap();
    let view = velocity.read();
    let mut touched = 0;
    for y in 0..n {
        for x in 0..n {
            let p = Vec2::new(
                (x as f32 + 0.5) * 2.0 / n as f32 - 1.0,
                (y as f32 + 0.5) * 2.0 / n as f32 - 1.0,
            );
            // Distance to the footprint disk, in cells
            let offset = p - splat.center;
            let outside_by = (offset.norm() - splat.radius.x) / (2.0 * scale.x);
            let value = view.vector_at(x, y);
            if outside_by > 1.0 {
                assert_eq!(value, Vec2::zeros(), "cell ({x}, {y}) outside the cursor");
            } else if value != Vec2::zeros() {
                touched += 1;
            }
        }
    }
    assert!(touched > 0);
}

#[test]
fn centered_impulse_fills_cursor_disk() {
    let n = 80;
    let cell = 2.0 / n as f32;
    let scale = Vec2::new(1.0 / n as f32, 1.0 / n as f32);
    let params = ForceParams {
        mouse_force: 50.0,
        cursor_size: 10.0,
        force_cell_scale: scale,
        boundary: BoundaryMode::Open,
    };
    let pointer = PointerSample {
        position: Vec2::zeros(),
        diff: Vec2::new(1.0, 0.0),
        touching: false,
    };
    let radius = params.cursor_size * scale.x;

    let mut velocity = Field::new("velocity", n, n, 2, StoragePrecision::Full).unwrap();
    assert!(apply_force(&mut velocity, &pointer, &params));

    let view = velocity.read();
    let mut farthest = 0.0f32;
    for y in 0..n {
        for x in 0..n {
            let p = Vec2::new(
                (x as f32 + 0.5) * cell - 1.0,
                (y as f32 + 0.5) * cell - 1.0,
            );
            let distance = p.norm();
            let value = view.vector_at(x, y);
            if distance > radius + cell {
                assert_eq!(value, Vec2::zeros(), "cell ({x}, {y}) outside the cursor");
            } else if value != Vec2::zeros() {
                farthest = farthest.max(distance);
            }
        }
    }
    assert!(view.vector_at(n / 2, n / 2).x > 0.0);
    assert!(
        (farthest - radius).abs() <= cell,
        "footprint reaches {farthest}, expected {radius}"
    );
}

#[test]
fn closed_boundary_ring_is_zero_after_advection() {
    let n = 24;
    let mut velocity = random_velocity(n, 7);
    let params = AdvectionParams {
        dt: 0.014,
        dissipation: 0.96,
        scheme: AdvectionScheme::Bfecc,
        boundary: BoundaryMode::Closed,
    };
    advect(&mut velocity, &params);

    let view = velocity.read();
    for i in 0..n {
        for (x, y) in [(i, 0), (i, n - 1), (0, i), (n - 1, i)] {
            assert!(
                view.vector_at(x, y).norm() < 1e-5,
                "ring cell ({x}, {y}) is {:?}",
                view.vector_at(x, y)
            );
        }
    }
}

/// Advect a linear radial field forward, then backward, and return the L2
/// error against the starting field over the central region.
fn round_trip_error(scheme: AdvectionScheme) -> f64 {
    let n = 64;
    let strength = 10.0;
    let mut velocity = Field::new("velocity", n, n, 2, StoragePrecision::Full).unwrap();
    let initial = |x: usize, y: usize| {
        let uv = Vec2::new(
            (x as f32 + 0.5) / n as f32,
            (y as f32 + 0.5) / n as f32,
        );
        (uv - Vec2::new(0.5, 0.5)) * strength
    };
    {
        let mut target = velocity.current_mut();
        for y in 0..n {
            for x in 0..n {
                target.store(x, y, initial(x, y));
            }
        }
    }

    let params = AdvectionParams {
        dt: 0.02,
        dissipation: 1.0,
        scheme,
        boundary: BoundaryMode::Open,
    };
    let negate = |field: &mut Field| {
        for value in field.current_mut().as_mut_slice() {
            *value = -*value;
        }
    };

    advect(&mut velocity, &params);
    negate(&mut velocity);
    advect(&mut velocity, &params);
    negate(&mut velocity);

    let view = velocity.read();
    let mut sum = 0.0;
    for y in 0..n {
        for x in 0..n {
            let expected = initial(x, y);
            if (expected / strength).norm() < 0.3 {
                sum += f64::from((view.vector_at(x, y) - expected).norm_squared());
            }
        }
    }
    sum.sqrt()
}

#[test]
fn bfecc_round_trip_beats_simple_advection() {
    let simple = round_trip_error(AdvectionScheme::Simple);
    let bfecc = round_trip_error(AdvectionScheme::Bfecc);
    assert!(simple > 0.0);
    assert!(
        bfecc < simple * 0.75,
        "bfecc error {bfecc} not below simple error {simple}"
    );
}

#[test]
fn half_precision_solver_tracks_full_precision() {
    let config = SimulationConfig::default();
    let mut full = CpuFluidSolver::new(&config, &SolverContext::desktop(64, 64)).unwrap();
    let mut half = CpuFluidSolver::new(&config, &SolverContext::mobile(64, 64)).unwrap();

    let pointer = PointerSample {
        position: Vec2::new(0.1, -0.1),
        diff: Vec2::new(0.02, 0.01),
        touching: false,
    };
    full.step(&pointer);
    half.step(&pointer);

    let full_energy = kinetic_energy(&full.velocity());
    let half_energy = kinetic_energy(&half.velocity());
    assert!(full_energy > 0.0);
    assert_relative_eq!(full_energy, half_energy, max_relative = 1e-2);
}
