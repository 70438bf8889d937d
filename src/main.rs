mod app;
mod equalize;
mod params;
mod render;
mod sim;

use anyhow::{ensure, Result};
use clap::Parser;
use params::{Scheme, PRESETS};

/// Scanline reaction-diffusion patterns with histogram-equalized
/// false color.
#[derive(Parser, Debug)]
struct Args {
    /// board dimension; the grid is size x size and wraps on both axes
    #[arg(long, default_value_t = 800)]
    size: usize,

    /// RNG seed for the rate field and resets
    #[arg(long, default_value_t = 0xC0FFEE)]
    seed: u64,

    /// starting preset (index into the preset table)
    #[arg(long, default_value_t = 0)]
    preset: usize,

    /// row integration scheme
    #[arg(long, value_enum, default_value_t = Scheme::Stabilized)]
    scheme: Scheme,

    /// Euler step for the direct scheme
    #[arg(long, default_value_t = 0.01)]
    delta: f64,

    /// micro-steps per row for the stabilized scheme
    #[arg(long, default_value_t = 1000)]
    substeps: u32,

    /// simulation rows advanced per displayed frame
    #[arg(long, default_value_t = 2)]
    rows_per_frame: u64,

    /// ms per frame (lower = faster)
    #[arg(long, default_value_t = 33)]
    ms: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    ensure!(args.size >= 4, "--size must be at least 4");
    ensure!(args.substeps >= 1, "--substeps must be at least 1");
    ensure!(args.delta > 0.0, "--delta must be positive");
    ensure!(
        args.preset < PRESETS.len(),
        "--preset must be below {}",
        PRESETS.len()
    );
    // a vanishing inhibitor base invites division by zero in the stepper
    ensure!(
        PRESETS[args.preset].p.base_b > 0.0,
        "preset has a non-positive base_b"
    );
    app::run(&args)
}
