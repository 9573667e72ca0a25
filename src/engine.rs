use std::path::PathBuf;

use anyhow::Result;

use crate::{
    rng::{RngManager, StreamRng},
    save::SaveWriter,
    state::GameState,
};

pub struct EngineSettings {
    pub seed: u64,
    /// Ticks per second of game time; per-second rates divide by this.
    pub speed: f64,
    /// Zero disables autosaving.
    pub autosave_interval_ticks: u64,
    pub save_path: PathBuf,
}

pub struct EngineBuilder {
    settings: EngineSettings,
    systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            systems: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            rng: RngManager::new(self.settings.seed),
            systems: self.systems,
            save_writer: SaveWriter::new(
                &self.settings.save_path,
                self.settings.autosave_interval_ticks,
            ),
            settings: self.settings,
        }
    }
}

pub struct Engine {
    rng: RngManager,
    systems: Vec<Box<dyn System>>,
    save_writer: SaveWriter,
    settings: EngineSettings,
}

impl Engine {
    pub fn run(&mut self, state: &mut GameState, ticks: u64) -> Result<()> {
        for _ in 0..ticks {
            let current_tick = state.tick();
            for system in &mut self.systems {
                let mut rng_stream = self.rng.stream(system.name());
                let ctx = SystemContext {
                    tick: current_tick,
                    speed: self.settings.speed,
                };
                system.run(&ctx, state, &mut rng_stream)?;
            }
            state.advance_tick();
            self.save_writer.maybe_write(state)?;
        }
        Ok(())
    }

    /// Named RNG stream off the engine's manager, for callers that need
    /// deterministic draws outside the tick loop (worldgen, prestige).
    pub fn stream(&mut self, name: &str) -> StreamRng<'_> {
        self.rng.stream(name)
    }
}

pub struct SystemContext {
    pub tick: u64,
    pub speed: f64,
}

pub trait System {
    fn name(&self) -> &str;
    fn run(
        &mut self,
        ctx: &SystemContext,
        state: &mut GameState,
        rng: &mut StreamRng<'_>,
    ) -> Result<()>;
}
