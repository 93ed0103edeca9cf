//! Headless trainer: evolves a population without a window and writes the
//! champion genome as JSON.
//!
//! Usage:
//!   cargo run --release --bin train -- --config config/flappy.json --seed 7

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use flappy_evo::simulation::evolution::Population;
use flappy_evo::simulation::generation;
use flappy_evo::simulation::params::Config;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "train")]
#[command(about = "Evolve flappy agents headless and export the champion")]
struct Args {
    /// Path to the JSON configuration (defaults are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the generation limit from the configuration
    #[arg(long)]
    generations: Option<u32>,

    /// Seed for a reproducible run (overrides the configuration)
    #[arg(long)]
    seed: Option<u64>,

    /// Where to write the champion genome
    #[arg(long, default_value = "champion.json")]
    champion: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(generations) = args.generations {
        config.evolution.max_generations = generations;
    }
    if let Some(seed) = args.seed {
        config.evolution.seed = Some(seed);
    }
    config.validate().context("invalid configuration")?;

    let mut rng = match config.evolution.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    info!(
        population = config.evolution.population_size,
        generations = config.evolution.max_generations,
        seed = ?config.evolution.seed,
        "training started"
    );

    let mut population = Population::new(&config.evolution, &mut rng);
    let champion = population.run(&mut rng, |genomes, number, rng| {
        generation::evaluate(genomes, &config, number, rng)
    });

    let Some(champion) = champion else {
        bail!("no generation was evaluated");
    };

    champion
        .save_to_file(&args.champion)
        .with_context(|| format!("writing champion to {}", args.champion.display()))?;

    let history = population.history();
    info!(
        id = champion.id,
        fitness = champion.fitness,
        best_score = history.best_score(),
        generations = population.generation(),
        path = %args.champion.display(),
        "champion saved"
    );

    Ok(())
}
