use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wavy_background::prelude::*;

/// Command-line tool to render a layered, noise-driven wave background
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Container width in pixels
    #[arg(short, long, default_value_t = 1200.0)]
    width: f64,

    /// Container height in pixels
    #[arg(long, default_value_t = 320.0)]
    height: f64,

    /// Number of parallax layers to generate
    #[arg(short, long, default_value_t = 3)]
    layers: usize,

    /// Segments across the width of each wave
    #[arg(short, long, default_value_t = 3.0)]
    points: f64,

    /// Vertical noise scale of the front layer
    #[arg(short, long, default_value_t = 10.0)]
    amplitude: f64,

    /// Baseline of the front layer, from the top of the container
    #[arg(long, default_value_t = 50.0)]
    baseline: f64,

    /// Drift speed of the front layer
    #[arg(short, long, default_value_t = 0.1)]
    speed: f64,

    /// Target frame rate of each wave
    #[arg(long, default_value_t = 30.0)]
    fps: f64,

    /// Simulated display refresh rate
    #[arg(long, default_value_t = 60.0)]
    display_hz: f64,

    /// Length of the simulated scroll-through, in milliseconds
    #[arg(short, long, default_value_t = 2000.0)]
    duration_ms: f64,

    /// Extend wave outlines this far past the container edges
    #[arg(long, default_value_t = 0.0)]
    edge_bleed: f64,

    /// Master seed for layer generation
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// YAML scene file; overrides the generation options above
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Output format: svg or json
    #[arg(short, long, default_value = "svg")]
    format: String,

    /// Output directory (svg) or file (json)
    #[arg(short, long, default_value = "wave_frames")]
    output: PathBuf,
}

fn main() -> Result<()> {
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();
    let format: ExportFormat = args.format.parse().map_err(anyhow::Error::msg)?;

    let scene = match &args.scene {
        Some(path) => Scene::load(path)
            .with_context(|| format!("failed to load scene from {}", path.display()))?,
        None => generated_scene(&args)?,
    };

    info!(
        width = scene.width,
        height = scene.height,
        layers = scene.layers.len(),
        duration_ms = scene.duration_ms,
        "rendering wave background"
    );

    let frames = scene.render();
    info!(frames = frames.len(), "frames rendered");

    let written = export_frames(&frames, format, scene.width, scene.height, &args.output)
        .with_context(|| format!("failed to export frames to {}", args.output.display()))?;

    info!(files = written.len(), output = %args.output.display(), "done");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

fn generated_scene(args: &Args) -> Result<Scene> {
    let template = LayerTemplate {
        points: args.points,
        amplitude: args.amplitude,
        height: args.baseline,
        speed: args.speed,
        fps: args.fps,
    };
    let mut scene = Scene::generated(args.width, args.height, args.layers, template, args.seed)
        .context("invalid generation options")?;

    scene.display_hz = args.display_hz;
    scene.duration_ms = args.duration_ms;
    scene.edge_bleed = args.edge_bleed;
    scene.validate().context("invalid timing options")?;
    Ok(scene)
}
