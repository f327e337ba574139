use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use rand::{rngs::SmallRng, SeedableRng};
use tracing::{info, Level};

use retrofy::{
    config::Config,
    editor::Editor,
    effects::EffectRegistry,
};

#[derive(Parser)]
#[command(
    name = "retrofy",
    version,
    about = "Give your photos an analog VHS / retrowave look",
    long_about = "Retrofy synthesizes analog-video artifacts (tape noise lines, chromatic channel glitch, film grain, scanlines, tracking warp, VCR timestamp) and composites them onto still images."
)]
struct Cli {
    /// Input image path (PNG, JPEG)
    #[arg(short, long)]
    input: PathBuf,

    /// Output image file path
    #[arg(short, long)]
    output: PathBuf,

    /// Comma-separated effect chain, applied in order
    #[arg(
        short,
        long,
        default_value = "noise_lines,color_glitch,scanlines,film_grain"
    )]
    effects: String,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the random generator; omit for a fresh draw each run
    #[arg(short, long)]
    seed: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .init();

    info!("Starting Retrofy v{}", env!("CARGO_PKG_VERSION"));
    info!("Input: {:?}", cli.input);
    info!("Output: {:?}", cli.output);
    info!("Effects: {}", cli.effects);

    // Load configuration
    let config = match cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(&config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };

    // Build the pipeline from the requested effect names
    let names: Vec<&str> = cli
        .effects
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    let registry = EffectRegistry::new();
    let pipeline = registry.build_pipeline(&names, &config)?;

    let mut rng = match cli.seed {
        Some(seed) => {
            info!("Seeding random generator with {}", seed);
            SmallRng::seed_from_u64(seed)
        }
        None => SmallRng::from_entropy(),
    };

    let mut editor = Editor::load(&cli.input)?;

    info!("Applying {} effect(s)...", pipeline.len());
    let styled = pipeline.apply(editor.current(), &config, &mut rng)?;
    editor.commit(styled);
    editor.save(&cli.output)?;

    info!("Done! Output saved to: {:?}", cli.output);
    Ok(())
}
