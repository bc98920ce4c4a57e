//! Asteroid world generation: shape, holes, tunnels, veins, hazards, aliens,
//! items, crystals and the outpost.

pub mod aliens;
pub mod config;
pub mod crystals;
pub mod dimensions;
pub mod economy;
pub mod error;
pub mod flood;
pub mod generator;
pub mod grid;
pub mod hazards;
pub mod holes;
pub mod items;
pub mod noise;
pub mod outpost;
pub mod placement;
pub mod shape;
pub mod tunnels;
pub mod veins;

pub use config::WorldConfig;
pub use error::ConfigError;
pub use generator::{generate, generate_detailed, generate_seeded, generate_with, GenerationReport, World, WorldStats};
