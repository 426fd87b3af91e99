use clap::{Parser, ValueEnum};
use fluid_cursor_core::solver::diagnostics::{kinetic_energy, max_speed, mean_abs_divergence};
use fluid_cursor_core::{
    AdvectionScheme, BoundaryMode, DeviceClass, FluidCursor, FluidError, QualityPreset,
    SimulationConfig, Vec2,
};
use std::f32::consts::TAU;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Pattern {
    /// Pointer circles the center
    Circle,
    /// Lissajous figure eight
    Figure8,
    /// Horizontal sweep back and forth
    Sweep,
    /// Pointer never moves
    Idle,
}

impl Pattern {
    /// Pointer position in normalized coordinates at time `t` seconds
    fn position(self, t: f32, radius: f32, speed: f32) -> Vec2 {
        let phase = t * speed * TAU;
        match self {
            Pattern::Circle => Vec2::new(phase.cos(), phase.sin()) * radius,
            Pattern::Figure8 => Vec2::new(phase.sin(), (2.0 * phase).sin() * 0.5) * radius,
            Pattern::Sweep => Vec2::new(phase.sin() * radius, 0.0),
            Pattern::Idle => Vec2::zeros(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Boundary {
    Open,
    Closed,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Scheme {
    Simple,
    Bfecc,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Quality {
    /// Preset recommended for the device class
    Auto,
    Ultra,
    High,
    Medium,
    Low,
}

impl Quality {
    fn preset(self, device: DeviceClass) -> QualityPreset {
        match self {
            Quality::Auto => QualityPreset::recommended(device),
            Quality::Ultra => QualityPreset::Ultra,
            Quality::High => QualityPreset::High,
            Quality::Medium => QualityPreset::Medium,
            Quality::Low => QualityPreset::Low,
        }
    }
}

/// Fluid cursor demo: drives the solver with a scripted pointer and reports
/// field statistics
#[derive(Parser, Debug)]
#[command(name = "fluid-cursor-demo")]
#[command(about = "Headless fluid cursor simulation", long_about = None)]
struct Args {
    /// Viewport width in pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Simulated wall-clock duration in seconds
    #[arg(short, long, default_value_t = 5.0)]
    duration: f32,

    /// Host frame rate; the solver itself always steps at 60 Hz
    #[arg(short, long, default_value_t = 144.0)]
    fps: f32,

    /// Pointer path
    #[arg(short, long, value_enum, default_value_t = Pattern::Circle)]
    pattern: Pattern,

    /// Path radius in normalized units
    #[arg(long, default_value_t = 0.5)]
    radius: f32,

    /// Path revolutions per second
    #[arg(long, default_value_t = 0.5)]
    speed: f32,

    /// Boundary treatment
    #[arg(short, long, value_enum, default_value_t = Boundary::Open)]
    boundary: Boundary,

    /// Advection scheme
    #[arg(long, value_enum, default_value_t = Scheme::Bfecc)]
    advection: Scheme,

    /// Enable viscous diffusion
    #[arg(long)]
    viscous: bool,

    /// Grid cells per viewport pixel
    #[arg(long, default_value_t = 0.5)]
    resolution: f32,

    /// Quality preset; overrides --resolution when given
    #[arg(short, long, value_enum)]
    quality: Option<Quality>,

    /// Pointer force multiplier
    #[arg(long, default_value_t = 20.0)]
    mouse_force: f32,

    /// Cursor footprint radius in cells
    #[arg(long, default_value_t = 100.0)]
    cursor_size: f32,

    /// Run as a mobile device (half precision storage, touch input)
    #[arg(short, long)]
    mobile: bool,

    /// Stop moving the pointer after this many seconds (0 = never)
    #[arg(long, default_value_t = 0.0)]
    release_after: f32,

    /// Report interval in seconds
    #[arg(short, long, default_value_t = 0.5)]
    report_interval: f32,
}

fn build_config(args: &Args, device: DeviceClass) -> Result<SimulationConfig, FluidError> {
    let mut config = SimulationConfig {
        boundary: match args.boundary {
            Boundary::Open => BoundaryMode::Open,
            Boundary::Closed => BoundaryMode::Closed,
        },
        advection: match args.advection {
            Scheme::Simple => AdvectionScheme::Simple,
            Scheme::Bfecc => AdvectionScheme::Bfecc,
        },
        is_viscous: args.viscous,
        ..SimulationConfig::default()
    };
    let resolution = match args.quality {
        Some(quality) => quality.preset(device).resolution_factor(),
        None => args.resolution,
    };
    config.set_resolution_factor(resolution)?;
    config.set_mouse_force(args.mouse_force)?;
    config.set_cursor_size(args.cursor_size)?;
    Ok(config)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    println!("=== Fluid Cursor Demo ===\n");

    let device = if args.mobile {
        DeviceClass::Mobile
    } else {
        DeviceClass::Desktop
    };

    let config = match build_config(&args, device) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Invalid arguments: {err}");
            std::process::exit(2);
        }
    };

    let mut cursor = match FluidCursor::new(config, args.width, args.height, device) {
        Ok(cursor) => cursor,
        Err(err) => {
            eprintln!("Failed to create fluid cursor: {err}");
            std::process::exit(1);
        }
    };

    if let Some(err) = cursor.last_error() {
        println!("Effect disabled: {err}");
        println!("Serving the neutral velocity field; nothing to simulate.");
        return;
    }

    {
        let field = cursor.current_velocity_field();
        println!(
            "Viewport {}x{} px -> grid {}x{} cells ({:?}, {:?} boundary, {:?})",
            args.width,
            args.height,
            field.width(),
            field.height(),
            device,
            cursor.config().boundary,
            cursor.config().advection,
        );
        println!(
            "Pattern: {:?}, radius {:.2}, {:.2} rev/s, host at {:.0} fps\n",
            args.pattern, args.radius, args.speed, args.fps
        );
    }

    let fps = args.fps.max(1.0);
    let frame = Duration::from_secs_f32(1.0 / fps);
    let frames = (args.duration.max(0.0) * fps).ceil() as u32;
    let report_every = ((args.report_interval.max(0.0) * fps).round() as u32).max(1);

    println!(
        "{:>7}  {:>6}  {:>12}  {:>10}  {:>12}",
        "time", "steps", "energy", "max |v|", "mean |div|"
    );

    let mut total_steps = 0u32;
    let mut touching = false;
    for i in 0..frames {
        let t = i as f32 / fps;
        let moving = args.release_after <= 0.0 || t < args.release_after;

        if moving && args.pattern != Pattern::Idle {
            let position = args.pattern.position(t, args.radius, args.speed);
            if args.mobile {
                if touching {
                    cursor.touch_move(position);
                } else {
                    cursor.touch_start(position);
                    touching = true;
                }
            } else {
                cursor.pointer_move(position);
            }
        } else if touching {
            cursor.touch_end();
            touching = false;
        }

        total_steps += cursor.step(frame);

        if (i + 1) % report_every == 0 || i + 1 == frames {
            let field = cursor.current_velocity_field();
            println!(
                "{:>6.2}s  {:>6}  {:>12.6e}  {:>10.4}  {:>12.6e}",
                t + 1.0 / fps,
                total_steps,
                kinetic_energy(&field),
                max_speed(&field),
                mean_abs_divergence(&field),
            );
        }
    }

    println!("\n=== Summary ===");
    println!("Frames: {frames}, simulation steps: {total_steps}");
    println!(
        "Average tick time: {:.3} ms",
        cursor.frame_timer().average_frame_time_ms()
    );
    if let Some(solver) = cursor.solver() {
        let timings = solver.stage_timings();
        println!("Last step stage timings (ms):");
        println!("  advection       {:.3}", timings.advection_ms);
        println!("  external force  {:.3}", timings.external_force_ms);
        println!("  viscosity       {:.3}", timings.viscosity_ms);
        println!("  divergence      {:.3}", timings.divergence_ms);
        println!("  pressure        {:.3}", timings.pressure_ms);
        println!("  projection      {:.3}", timings.projection_ms);
        println!("  total           {:.3}", timings.total_ms());
    }
}
