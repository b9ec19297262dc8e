//! Trace an optical stack described in JSON and export the viewer scene.
//!
//! ```sh
//! lensmaker stack.json [scene.json]
//! ```
//!
//! The scene goes to stdout when no output path is given.

mod config;

use std::env;
use std::path::Path;

use anyhow::{Context, Result};
use lensmaker_core::{OpticalElement, SimulationState};
use lensmaker_view::render_sequence;

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <stack.json> [output.json]", args[0]);
        std::process::exit(1);
    }

    let stack_path = Path::new(&args[1]);
    let config = config::load_config(stack_path)?;
    let sequence = config
        .build_sequence()
        .with_context(|| format!("invalid optical stack in {}", stack_path.display()))?;
    let sampling = config.sampling.to_sampling()?;
    log::info!(
        "Loaded {} elements from {} ({}D, base {})",
        sequence.len(),
        stack_path.display(),
        sampling.dim,
        sampling.base
    );

    let (_, steps) = sequence.full_forward(SimulationState::new(sampling));
    for (i, step) in steps.iter().enumerate() {
        // Only surfaces block; later steps carry their mask along
        let blocked = match step.element {
            OpticalElement::Surface(_) => step.outputs.blocked_count(),
            _ => 0,
        };
        log::info!(
            "{i}: {:<7} {:>4} -> {:>4} rays, {} blocked",
            step.element.kind(),
            step.inputs.rays().len(),
            step.outputs.rays().len(),
            blocked
        );
    }

    let scene = render_sequence(&sequence, sampling, config.end, &config.theme);
    match args.get(2) {
        Some(output) => scene.write(Path::new(output))?,
        None => println!("{}", scene.to_json()?),
    }

    Ok(())
}
