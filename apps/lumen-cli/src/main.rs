use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use lumen_assets::{AssetLoader, FileAssetLoader};
use lumen_capture::CaptureOutcome;
use lumen_compose::{DemoConfig, DemoScene, builtin_assets};
use lumen_host::{FrameLoop, HostEvent};
use lumen_render::{CubeFace, Renderer, SoftwareRenderer, TextReport, ToneMapping};
use lumen_tools::SceneInspector;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lumen", about = "Headless runner for the reflection demos")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum SceneArg {
    EnvironmentMap,
    Portal,
}

impl From<SceneArg> for DemoScene {
    fn from(arg: SceneArg) -> Self {
        match arg {
            SceneArg::EnvironmentMap => DemoScene::EnvironmentMap,
            SceneArg::Portal => DemoScene::Portal,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print version, scenes and tone mapping operators
    Info,
    /// Print the default configuration as YAML
    Config,
    /// Run a scene for a number of frames and report ordering and state
    Run {
        /// YAML config file; defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Override the configured scene
        #[arg(short, long)]
        scene: Option<SceneArg>,
        /// Number of frames to render
        #[arg(short, long, default_value = "60")]
        frames: u32,
        /// Simulated refresh rate
        #[arg(long, default_value = "60")]
        fps: u32,
        /// Debug panel edits applied before the first frame, as `control=value`
        #[arg(long = "set", value_name = "CONTROL=VALUE")]
        sets: Vec<String>,
    },
    /// Capture the environment-map scene once and draw the six cube faces
    Faces {
        /// Cube face resolution in texels
        #[arg(short, long, default_value = "24")]
        resolution: u32,
        /// Animation time of the capture, in seconds
        #[arg(short, long, default_value = "0")]
        time: f32,
    },
}

/// Seconds from the command line as a tick timestamp.
fn capture_time(seconds: f32) -> anyhow::Result<Duration> {
    Duration::try_from_secs_f32(seconds).with_context(|| format!("invalid capture time {seconds}"))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("lumen v{}", env!("CARGO_PKG_VERSION"));
            println!("scenes: environment-map, portal");
            let operators: Vec<_> = ToneMapping::ALL.iter().map(|t| t.label()).collect();
            println!("tone mapping: {}", operators.join(", "));
            let caps = SoftwareRenderer::new(1, 1).capabilities();
            println!(
                "software renderer: max cube resolution={} power-of-two only={}",
                caps.max_cube_resolution, caps.power_of_two_cube_targets
            );
        }
        Commands::Config => {
            print!("{}", DemoConfig::default().to_yaml()?);
        }
        Commands::Run {
            config,
            scene,
            frames,
            fps,
            sets,
        } => {
            let mut config = match config {
                Some(path) => DemoConfig::load(&path).with_context(|| format!("loading {}", path.display()))?,
                None => DemoConfig::default(),
            };
            if let Some(scene) = scene {
                config.scene = scene.into();
            }
            config.validate()?;

            let mut loader: Box<dyn AssetLoader> = match &config.assets {
                Some(root) => Box::new(FileAssetLoader::new(root)),
                None => Box::new(builtin_assets()),
            };
            let renderer = Box::new(SoftwareRenderer::new(1, 1));
            let mut frame_loop = FrameLoop::new(config, renderer, loader.as_mut())?;

            for set in &sets {
                let (control, value) = set
                    .split_once('=')
                    .with_context(|| format!("expected CONTROL=VALUE, got {set:?}"))?;
                frame_loop.handle(HostEvent::PanelInput {
                    control: control.trim().to_string(),
                    value: value.to_string(),
                })?;
            }

            let step = 1.0 / fps.max(1) as f64;
            let mut captured = 0;
            for i in 0..frames {
                let report = frame_loop.tick(Duration::from_secs_f64(i as f64 * step))?;
                frame_loop
                    .verify_frame(report.frame)
                    .with_context(|| format!("frame {} ordering", report.frame))?;
                if matches!(report.capture, Some(CaptureOutcome::Captured { .. })) {
                    captured += 1;
                }
                tracing::debug!(frame = report.frame, elapsed = report.elapsed, "frame done");
            }

            println!("{}: {frames} frames, {captured} captures, ordering OK", frame_loop.panel_title());
            println!("{}", SceneInspector::summary(frame_loop.scene()));
            println!("Panel:");
            for (name, value) in frame_loop.controls() {
                println!("  {name} = {value}");
            }
        }
        Commands::Faces { resolution, time } => {
            let time = capture_time(time)?;
            let config = DemoConfig {
                scene: DemoScene::EnvironmentMap,
                cube_resolution: resolution,
                ..DemoConfig::default()
            };
            config.validate()?;
            let renderer = Box::new(SoftwareRenderer::new(1, 1));
            let mut frame_loop = FrameLoop::new(config, renderer, &mut builtin_assets())?;
            // The clock starts at the first tick, so reaching `time` takes two.
            let mut report = frame_loop.tick(Duration::ZERO)?;
            if !time.is_zero() {
                report = frame_loop.tick(time)?;
            }
            frame_loop.verify_frame(report.frame)?;

            let capturer = frame_loop.capturer().context("scene has no reflective node")?;
            let texture = capturer.texture().context("capture is not active")?;
            let reflective = capturer.reflective();
            let text = TextReport::new();
            print!("{}", text.scene(frame_loop.scene(), frame_loop.camera()));
            for face in CubeFace::ALL {
                let fb = frame_loop
                    .renderer()
                    .cube_face(texture, face)
                    .with_context(|| format!("face {} missing", face.label()))?;
                let hits = reflective.map_or(0, |id| fb.coverage(id));
                println!("--- {} (reflective texels: {hits}) ---", face.label());
                print!("{}", text.coverage(fb, reflective));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_time_rejects_non_finite_and_negative() {
        assert_eq!(capture_time(1.5).unwrap(), Duration::from_millis(1500));
        assert_eq!(capture_time(0.0).unwrap(), Duration::ZERO);
        for bad in [f32::INFINITY, f32::NAN, -1.0] {
            assert!(capture_time(bad).is_err(), "{bad} accepted");
        }
    }

    #[test]
    fn faces_time_parses_before_any_rendering() {
        let cli = Cli::try_parse_from(["lumen", "faces", "--time", "inf"]).unwrap();
        let Commands::Faces { time, .. } = cli.command else {
            panic!("expected faces");
        };
        assert!(capture_time(time).is_err());
    }
}
