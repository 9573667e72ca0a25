use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use hamlet::{
    config::ConfigLoader,
    engine::{EngineBuilder, EngineSettings},
    save,
    state::GameState,
    systems::{DemographicsSystem, ExplorationSystem, ProductionSystem},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Headless village simulation runner")]
struct Cli {
    /// Path to the game config YAML file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Override tick count (uses config default when omitted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Override the world seed
    #[arg(long)]
    seed: Option<u64>,

    /// Resume from the save slot instead of starting a new village
    #[arg(long)]
    resume: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loader = ConfigLoader::new(".");
    let config = loader.load(&cli.config)?;
    let seed = cli.seed.unwrap_or(config.seed);
    let ticks = config.ticks(cli.ticks);

    let mut worldgen = ChaCha8Rng::seed_from_u64(seed);
    let mut state = if cli.resume && config.save_path.exists() {
        save::read_save(&config.save_path, &mut worldgen)?
    } else {
        GameState::new(&mut worldgen)
    };

    let settings = EngineSettings {
        seed,
        speed: config.speed,
        autosave_interval_ticks: config.autosave_interval_ticks(),
        save_path: config.save_path.clone(),
    };
    let mut engine = EngineBuilder::new(settings)
        .with_system(ProductionSystem::new())
        .with_system(DemographicsSystem::new())
        .with_system(ExplorationSystem::new())
        .build();

    engine.run(&mut state, ticks)?;
    save::write_save(&config.save_path, &state)?;

    let events = state.drain_events();
    println!(
        "Village '{}' ran {} ticks. Population: {} / {} | explored tiles: {} | deaths: {} | events: {}",
        config.name,
        ticks,
        state.population(),
        state.population_cap(),
        state.map.explored_tiles,
        state.global.death_count,
        events.len(),
    );
    Ok(())
}
