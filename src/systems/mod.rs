mod demographics;
mod exploration;
mod production;

pub use demographics::DemographicsSystem;
pub use exploration::{resolve_tile, ExplorationSystem};
pub use production::ProductionSystem;
