use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use cubescene_common::Transform;
use cubescene_kernel::{Animator, FrameState, Scene, SceneConfig};
use cubescene_render::{DebugTextRenderer, RenderView, Renderer};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cubescene-cli", about = "Headless tool for the cube scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene config (YAML). Defaults to the stock scene.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and a summary of the scene
    Info,
    /// Evaluate the animated transform at a point in time
    Sample {
        /// Elapsed time in seconds
        #[arg(short, long)]
        time: f32,
        /// Frames already rendered, at least 1 (drives the accumulated rotation)
        #[arg(short, long, default_value = "1")]
        frames: u64,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Run the scene headless at a fixed frame rate
    Simulate {
        /// Number of frames to run
        #[arg(short = 'n', long, default_value = "120")]
        frames: u64,
        /// Frames per second
        #[arg(long, default_value = "60")]
        fps: f32,
        /// Print the scene every N frames (0 prints only the last frame)
        #[arg(short, long, default_value = "30")]
        every: u64,
    },
    /// Print the effective scene config as YAML
    Config,
}

#[derive(Debug, Serialize)]
struct Sample {
    time: f32,
    frames: u64,
    position: [f32; 3],
    rotation: [f32; 3],
    scale: [f32; 3],
}

/// Transform after `frames` updates, the last one at `time` seconds.
fn sample(config: &SceneConfig, time: f32, frames: u64) -> anyhow::Result<Sample> {
    if !time.is_finite() || time < 0.0 {
        bail!("--time must be a non-negative number, got {time}");
    }
    if frames == 0 {
        bail!("--frames must be at least 1; the transform is only written by a frame update");
    }
    let mut animator = config.animation;
    let mut transform = Transform::default();
    for frame in 1..=frames {
        let state = FrameState {
            elapsed: time,
            delta: 0.0,
            frame,
        };
        animator.on_frame(&state, &mut transform);
    }
    Ok(Sample {
        time,
        frames,
        position: transform.position.to_array(),
        rotation: transform.rotation.to_array(),
        scale: transform.scale.to_array(),
    })
}

/// Run `frames` fixed steps and collect the debug report at each printed frame.
fn simulate(scene: &mut Scene, frames: u64, fps: f32, every: u64) -> Vec<String> {
    let dt = 1.0 / fps;
    let renderer = DebugTextRenderer::new();
    let view = RenderView::from(scene.camera());
    let mut reports = Vec::new();
    for i in 1..=frames {
        scene.frame(dt);
        let due = if every == 0 { i == frames } else { i % every == 0 || i == frames };
        if due {
            reports.push(renderer.render(scene, &view));
        }
    }
    reports
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("loading scene config {}", path.display()))?,
        None => SceneConfig::default(),
    };

    match cli.command {
        Commands::Info => {
            println!("cubescene-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("render: {}", cubescene_render::crate_info());
            let scene = Scene::from_config(&config).context("building scene")?;
            print!("{}", DebugTextRenderer::new().render(&scene, &RenderView::from(scene.camera())));
        }
        Commands::Sample { time, frames, json } => {
            let s = sample(&config, time, frames)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&s)?);
            } else {
                println!("t={:.3}s frames={}", s.time, s.frames);
                println!(
                    "position=({:.3}, {:.3}, {:.3})",
                    s.position[0], s.position[1], s.position[2]
                );
                println!(
                    "rotation=({:.3}, {:.3}, {:.3})",
                    s.rotation[0], s.rotation[1], s.rotation[2]
                );
                println!("scale={:.3}", s.scale[0]);
            }
        }
        Commands::Simulate { frames, fps, every } => {
            if !(fps.is_finite() && fps > 0.0) {
                bail!("--fps must be positive, got {fps}");
            }
            let mut scene = Scene::from_config(&config).context("building scene")?;
            scene.mount();
            tracing::info!(frames, fps, "simulating");
            for report in simulate(&mut scene, frames, fps, every) {
                print!("{report}");
            }
            scene.unmount();
        }
        Commands::Config => {
            print!("{}", config.to_yaml()?);
        }
    }

    Ok(())
}
