use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use crate::config::SceneConfig;
use crate::host::{HeadlessHost, HeadlessSurface, ScheduledResize, StatsRenderer};
use crate::scheduler::{FrameScheduler, FrameStats};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the rain scene headless and print a JSON summary
    Simulate {
        /// Scene config JSON file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of frames to run
        #[arg(long, default_value_t = 600)]
        frames: u64,

        /// Simulated refresh rate
        #[arg(long, default_value_t = 60.0)]
        fps: f64,

        /// Random seed (overrides the config file)
        #[arg(long)]
        seed: Option<u64>,

        /// Particle count (overrides the config file)
        #[arg(long)]
        particles: Option<usize>,

        /// Initial surface width
        #[arg(long, default_value_t = 800)]
        width: u32,

        /// Initial surface height
        #[arg(long, default_value_t = 600)]
        height: u32,

        /// Resize the surface at a frame, as FRAME:WIDTHxHEIGHT (repeatable)
        #[arg(long = "resize", value_parser = parse_resize)]
        resizes: Vec<ScheduledResize>,

        /// Fail every n-th render submission
        #[arg(long)]
        drop_every: Option<u64>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Summary {
    stats: FrameStats,
    surface: (u32, u32),
    aspect: f32,
    projection_updates: u64,
    lightning_armed: bool,
    lightning_intensity: f32,
    particle_height_range: Option<(f32, f32)>,
}

fn parse_resize(arg: &str) -> Result<ScheduledResize, String> {
    let (frame, size) = arg
        .split_once(':')
        .ok_or_else(|| format!("expected FRAME:WIDTHxHEIGHT, got '{}'", arg))?;
    let (width, height) = size
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", size))?;
    Ok(ScheduledResize {
        frame: frame.trim().parse().map_err(|e| format!("bad frame '{}': {}", frame, e))?,
        width: width.trim().parse().map_err(|e| format!("bad width '{}': {}", width, e))?,
        height: height.trim().parse().map_err(|e| format!("bad height '{}': {}", height, e))?,
    })
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            config,
            frames,
            fps,
            seed,
            particles,
            width,
            height,
            resizes,
            drop_every,
        } => {
            let mut scene_config = match config {
                Some(path) => SceneConfig::from_file(&path)
                    .with_context(|| format!("loading config {:?}", path))?,
                None => SceneConfig::default(),
            };
            if let Some(seed) = seed {
                scene_config.seed = seed;
            }
            if let Some(count) = particles {
                scene_config.rain.particle_count = count;
            }
            if !(fps.is_finite() && fps > 0.0) {
                anyhow::bail!("FPS must be positive");
            }

            let summary = simulate(&scene_config, frames, fps, (width, height), resizes, drop_every)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}

fn simulate(
    config: &SceneConfig,
    frames: u64,
    fps: f64,
    (width, height): (u32, u32),
    resizes: Vec<ScheduledResize>,
    drop_every: Option<u64>,
) -> Result<Summary> {
    let mut scheduler = FrameScheduler::from_config(config)?;
    let mut host =
        HeadlessHost::new(HeadlessSurface::new(width, height), fps, frames).with_resizes(resizes);
    let mut renderer = match drop_every {
        Some(n) => StatsRenderer::dropping_every(n),
        None => StatsRenderer::new(),
    };

    log::info!("Simulating {} frames at {} fps, seed {}", frames, fps, config.seed);
    let stats = scheduler.run(&mut host, &mut renderer)?;

    let scene = scheduler
        .scene()
        .ok_or_else(|| anyhow::anyhow!("scene detached during run"))?;
    let camera = scheduler
        .camera()
        .ok_or_else(|| anyhow::anyhow!("camera detached during run"))?;

    Ok(Summary {
        stats,
        surface: host.headless_surface().backing_size(),
        aspect: camera.aspect,
        projection_updates: camera.projection_updates(),
        lightning_armed: scene.lightning.is_armed(),
        lightning_intensity: scene.lightning.intensity(),
        particle_height_range: scene.rain.height_range(),
    })
}
