pub mod actions;
pub mod buildings;
pub mod config;
pub mod engine;
pub mod events;
pub mod jobs;
pub mod map;
pub mod prestige;
pub mod research;
pub mod resources;
pub mod rng;
pub mod save;
pub mod state;
pub mod systems;
