//! Headless fractal simulation driver
//!
//! Builds a fractal, runs it for a number of fixed-step frames and prints a
//! JSON summary of the final frame.
//!
//! Usage:
//!     fractal_sim [OPTIONS]
//!
//! Options:
//!     -d, --depth <N>         Number of levels including the root (default: 4)
//!     --seed <SEED>           Seed for per-part variation (default: random)
//!     -n, --frames <N>        Frames to simulate (default: 600)
//!     --dt <SECONDS>          Fixed frame step (default: 0.0166667)
//!     --scale <S>             Root world scale (default: 1.0)
//!     -c, --config <FILE>     JSON config file (flags override its values)
//!     -h, --help              Show this help message

use std::env;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use glam::{Quat, Vec3};
use serde::Serialize;

use fractal_sag::core::logging;
use fractal_sag::core::time::FrameTimer;
use fractal_sag::render::InstanceBatcher;
use fractal_sag::{FractalConfig, FractalSystem, Placement};

fn print_help() {
    eprintln!("fractal_sim - Headless fractal simulation driver");
    eprintln!();
    eprintln!("Usage: fractal_sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("    -d, --depth <N>         Number of levels including the root (default: 4)");
    eprintln!("    --seed <SEED>           Seed for per-part variation (default: random)");
    eprintln!("    -n, --frames <N>        Frames to simulate (default: 600)");
    eprintln!("    --dt <SECONDS>          Fixed frame step (default: 0.0166667)");
    eprintln!("    --scale <S>             Root world scale (default: 1.0)");
    eprintln!("    -c, --config <FILE>     JSON config file (flags override its values)");
    eprintln!("    -h, --help              Show this help message");
    eprintln!();
    eprintln!("Example:");
    eprintln!("    fractal_sim -d 6 --seed 42 -n 120");
    eprintln!("    RUST_LOG=fractal_sag=trace fractal_sim -c fractal.json");
}

#[derive(Debug)]
struct Args {
    config_path: Option<PathBuf>,
    depth: Option<usize>,
    seed: Option<u64>,
    frames: u32,
    dt: f32,
    scale: f32,
}

fn parse_value<T: std::str::FromStr>(args: &[String], i: &mut usize, name: &str) -> Result<T, String> {
    *i += 1;
    let value = args.get(*i).ok_or_else(|| format!("Missing value for {}", name))?;
    value.parse().map_err(|_| format!("Invalid {}: {}", name, value))
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut parsed = Args {
        config_path: None,
        depth: None,
        seed: None,
        frames: 600,
        dt: 1.0 / 60.0,
        scale: 1.0,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-d" | "--depth" => parsed.depth = Some(parse_value(&args, &mut i, "--depth")?),
            "--seed" => parsed.seed = Some(parse_value(&args, &mut i, "--seed")?),
            "-n" | "--frames" => parsed.frames = parse_value(&args, &mut i, "--frames")?,
            "--dt" => parsed.dt = parse_value(&args, &mut i, "--dt")?,
            "--scale" => parsed.scale = parse_value(&args, &mut i, "--scale")?,
            "-c" | "--config" => {
                parsed.config_path = Some(PathBuf::from(parse_value::<String>(&args, &mut i, "--config")?));
            }
            other => return Err(format!("Unknown option: {}", other)),
        }
        i += 1;
    }

    step_duration(parsed.dt)?;
    Ok(parsed)
}

/// Frame step as a `Duration`; rejects negative, non-finite and overflowing values
fn step_duration(dt: f32) -> Result<Duration, String> {
    Duration::try_from_secs_f32(dt).map_err(|e| format!("Invalid --dt: {} ({})", dt, e))
}

#[derive(Serialize)]
struct LevelSummary {
    level: usize,
    instances: usize,
    mesh: String,
    mean_height: f32,
}

#[derive(Serialize)]
struct Summary {
    seed: u64,
    depth: usize,
    frames: u32,
    parts: usize,
    bounds_min: [f32; 3],
    bounds_max: [f32; 3],
    mean_frame_ms: f64,
    levels: Vec<LevelSummary>,
}

fn run(args: Args) -> fractal_sag::core::Result<Summary> {
    let mut config = match &args.config_path {
        Some(path) => FractalConfig::from_json_file(path)?,
        None => FractalConfig::default(),
    };
    if let Some(depth) = args.depth {
        config.depth = depth;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let mut system = FractalSystem::new(config)?;
    let placement = Placement::new(Vec3::ZERO, Quat::IDENTITY, args.scale)?;
    let step = step_duration(args.dt).map_err(fractal_sag::core::Error::Config)?;
    let mut timer = FrameTimer::fixed(step);
    let mut batcher = InstanceBatcher::new();

    let start = Instant::now();
    let mut update_time = Duration::ZERO;
    for _ in 0..args.frames {
        let dt = timer.tick();
        if let Some(stats) = system.update(dt, &placement, &mut batcher) {
            update_time += stats.total_time();
            if stats.frame % 60 == 0 {
                log::debug!(
                    "Frame {}: {} parts in {:.3}ms",
                    stats.frame,
                    stats.part_count,
                    stats.total_time().as_secs_f64() * 1000.0
                );
            }
        }
    }
    log::info!(
        "Simulated {} frames ({:.1}s of fractal time) in {:.2}s",
        timer.frame_count(),
        timer.elapsed().as_secs_f64(),
        start.elapsed().as_secs_f64()
    );

    let hierarchy = system.hierarchy().ok_or_else(|| {
        fractal_sag::core::Error::Config("fractal deactivated during run".to_string())
    })?;
    let levels = batcher
        .batches()
        .iter()
        .map(|batch| {
            let instances = batcher.level_instances(batch.level).unwrap_or(&[]);
            let mean_height = if instances.is_empty() {
                0.0
            } else {
                instances.iter().map(|m| m.c3[1]).sum::<f32>() / instances.len() as f32
            };
            LevelSummary {
                level: batch.level,
                instances: batch.count,
                mesh: format!("{:?}", batch.style.mesh),
                mean_height,
            }
        })
        .collect();

    let bounds = batcher.bounds();
    Ok(Summary {
        seed: hierarchy.seed(),
        depth: hierarchy.depth(),
        frames: args.frames,
        parts: hierarchy.part_count(),
        bounds_min: bounds.min.to_array(),
        bounds_max: bounds.max.to_array(),
        mean_frame_ms: if args.frames > 0 {
            update_time.as_secs_f64() * 1000.0 / args.frames as f64
        } else {
            0.0
        },
        levels,
    })
}

fn main() {
    logging::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_help();
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(summary) => match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: failed to encode summary: {}", e);
                std::process::exit(1);
            }
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
