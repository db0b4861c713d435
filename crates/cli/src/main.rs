#![deny(unsafe_code)]
//! CLI binary for the driftfield particle animation engine.
//!
//! Subcommands:
//! - `render <pattern>` — tick the simulation headless, write a PNG
//! - `list` — print available formation patterns and assignment policies

mod error;

use clap::{Parser, Subcommand};
use driftfield_core::{BlendMode, DrawSurface, Scene, Viewport};
use driftfield_raster::RasterSurface;
use driftfield_sim::{Assignment, FormationKind, SimConfig, Simulation};
use error::CliError;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "driftfield", about = "Particle animation engine CLI")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Tick the simulation for N frames and write a PNG snapshot of the
    /// final frame.
    Render {
        /// Formation pattern name (e.g. "compass-rose").
        #[arg(default_value = "compass-rose")]
        pattern: String,

        /// Viewport width in pixels.
        #[arg(short = 'W', long, default_value_t = 800)]
        width: usize,

        /// Viewport height in pixels.
        #[arg(short = 'H', long, default_value_t = 600)]
        height: usize,

        /// Number of frames to tick.
        #[arg(short, long, default_value_t = 300)]
        frames: u64,

        /// Frame at which the formation flag goes up (omit to stay
        /// dispersed).
        #[arg(long)]
        form_at: Option<u64>,

        /// PRNG seed for deterministic output.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Anchor assignment policy (nearest-first, by-index).
        #[arg(short, long, default_value = "nearest-first")]
        assignment: String,

        /// Engine parameters as a JSON string.
        #[arg(long, default_value = "{}")]
        params: String,

        /// Replay a scene file instead of the pattern/size/seed flags.
        #[arg(long)]
        scene: Option<PathBuf>,

        /// Output file path.
        #[arg(short, long, default_value = "frame.png")]
        output: PathBuf,
    },
    /// List available formation patterns and assignment policies.
    List,
}

fn load_scene(path: &PathBuf) -> Result<Scene, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| CliError::Input(format!("invalid scene file {}: {e}", path.display())))
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let patterns = FormationKind::list_patterns();
            let policies = Assignment::list_policies();
            if cli.json {
                let info = serde_json::json!({
                    "patterns": patterns,
                    "assignment_policies": policies,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Formation patterns:");
                for name in patterns {
                    println!("  {name}");
                }
                println!("Assignment policies:");
                println!("  {}", policies.join(", "));
            }
        }
        Command::Render {
            pattern,
            width,
            height,
            frames,
            form_at,
            seed,
            assignment,
            params,
            scene,
            output,
        } => {
            let scene = match scene {
                Some(path) => load_scene(&path)?,
                None => {
                    let params: serde_json::Value = serde_json::from_str(&params)
                        .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
                    let mut s = Scene::new(&pattern, width, height, seed);
                    s.params = params;
                    s.frames = frames;
                    s.form_at = form_at;
                    s
                }
            };
            scene.validate().map_err(|e| CliError::Input(e.to_string()))?;

            let mut config = SimConfig::from_json(&scene.params);
            config.assignment =
                Assignment::from_name(&assignment).map_err(|e| CliError::Input(e.to_string()))?;
            let formation = FormationKind::from_name(&scene.pattern)?;

            let mut sim = Simulation::new(config, formation, scene.seed);
            sim.initialize(Viewport::new(scene.width as f64, scene.height as f64));

            let mut surface = RasterSurface::new(scene.width, scene.height)?;
            surface.set_blend_mode(BlendMode::Additive);

            for frame in 0..scene.frames {
                let requested = scene.form_at.is_some_and(|at| frame >= at);
                sim.tick(requested, &mut surface);
            }

            driftfield_raster::write_png(&surface, &output)?;

            if cli.json {
                let info = serde_json::json!({
                    "pattern": scene.pattern,
                    "width": scene.width,
                    "height": scene.height,
                    "frames": scene.frames,
                    "form_at": scene.form_at,
                    "seed": scene.seed,
                    "particles": sim.particles().len(),
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {} ({}x{}, {} frames, {} particles, seed {}) -> {}",
                    scene.pattern,
                    scene.width,
                    scene.height,
                    scene.frames,
                    sim.particles().len(),
                    scene.seed,
                    output.display()
                );
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
