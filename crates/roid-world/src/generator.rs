//! World assembly: runs every phase in order and packages the result.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::aliens::{place_aliens, AlienInstance, AlienRegistry};
use crate::config::WorldConfig;
use crate::crystals::place_crystals;
use crate::dimensions::Dimensions;
use crate::economy::{resolve_new_player, resolve_outpost_economy};
use crate::error::ConfigError;
use crate::grid::{CellMask, FluidKind, Grid, Hazard, Provenance};
use crate::hazards::{place_hazards, HazardSummary};
use crate::holes::HoleField;
use crate::items::place_items;
use crate::outpost::{locate_outpost, Outpost};
use crate::placement::Placement;
use crate::shape::AsteroidShape;
use crate::tunnels::generate_tunnels;
use crate::veins::{fill_base_ground, paint_veins, VeinCanvas};

/// A finished asteroid world, ready to hand to a game session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct World {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub width: u32,
    pub depth: u32,
    pub air_gap: u32,
    /// `grid[x][y]`
    pub grid: Grid,
    #[serde(rename = "spaceco")]
    pub outpost: Outpost,
    pub aliens: BTreeMap<String, AlienInstance>,
    pub new_player: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_requirements: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_price: Option<Value>,
}

/// Cell, hazard and item tallies of a world.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorldStats {
    pub solid: usize,
    pub space: usize,
    /// Solid cells per mineral.
    pub ground: BTreeMap<String, usize>,
    pub lava: usize,
    pub gas: usize,
    pub aliens: usize,
    /// Item counts per name, summed over stacks.
    pub items: BTreeMap<String, u32>,
}

impl World {
    pub fn stats(&self) -> WorldStats {
        let mut stats = WorldStats::default();
        for (_, cell) in self.grid.cells() {
            if cell.is_space() {
                stats.space += 1;
            } else {
                stats.solid += 1;
            }
            if let Some(ground) = &cell.ground {
                *stats.ground.entry(ground.mineral.clone()).or_default() += 1;
            }
            for hazard in &cell.hazards {
                match hazard {
                    Hazard::Fluid {
                        kind: FluidKind::Lava,
                    } => stats.lava += 1,
                    Hazard::Fluid {
                        kind: FluidKind::Gas,
                    } => stats.gas += 1,
                    Hazard::Alien(_) => stats.aliens += 1,
                }
            }
            for item in &cell.items {
                *stats.items.entry(item.name.clone()).or_default() += item.count;
            }
        }
        stats
    }
}

/// A world plus the generation-time bookkeeping stripped from it.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub world: World,
    pub dimensions: Dimensions,
    /// Vein provenance of every ground cell still carrying a vein.
    pub provenance: Provenance,
    pub hazards: HazardSummary,
    pub items: Vec<Placement>,
    pub crystal_stacks: u32,
}

/// Generate with the configured seed, or a fresh one when none is set.
pub fn generate(config: &WorldConfig) -> Result<World, ConfigError> {
    match config.seed {
        Some(seed) => generate_seeded(config, seed),
        None => generate_with(config, &mut StdRng::from_entropy()),
    }
}

/// Same config and seed always give the same world.
pub fn generate_seeded(config: &WorldConfig, seed: u64) -> Result<World, ConfigError> {
    generate_with(config, &mut StdRng::seed_from_u64(seed))
}

pub fn generate_with<R: Rng + ?Sized>(config: &WorldConfig, rng: &mut R) -> Result<World, ConfigError> {
    generate_detailed(config, rng).map(|report| report.world)
}

/// Run every phase and keep the bookkeeping.
pub fn generate_detailed<R: Rng + ?Sized>(
    config: &WorldConfig,
    rng: &mut R,
) -> Result<GenerationReport, ConfigError> {
    config.validate()?;

    let dims = Dimensions::resolve(config);
    let shape = AsteroidShape::new(dims);
    debug!(
        "Resolved {:?} asteroid: {}x{} with air gap {}",
        dims.shape, dims.width, dims.depth, dims.air_gap
    );

    // ---- structure
    let holes = HoleField::generate(&shape, &config.craters, &config.caves, rng);
    let tunnels = generate_tunnels(&shape, &config.tunnels, rng);
    let hole_mask = CellMask::from_fn(dims.width, dims.depth, |x, y| holes.is_hole(x, y));

    // ---- geology
    let mut grid = Grid::new(dims.width, dims.depth);
    fill_base_ground(&mut grid, &shape, &hole_mask, &tunnels, &config.ground.base);
    let mut provenance = Provenance::new(dims.width, dims.depth);
    {
        let mut canvas = VeinCanvas::new(&mut grid, &mut provenance, &shape, &hole_mask, &tunnels);
        paint_veins(&mut canvas, &config.ground.veins, rng);
    }

    // ---- hazards and entities
    let hazards = place_hazards(&mut grid, &shape, &holes, config, rng);
    for (x, y) in grid.positions() {
        if grid.is_space(x, y) {
            provenance.clear(x, y);
        }
    }
    let aliens = place_aliens(&mut grid, dims.air_gap, &config.aliens, &AlienRegistry::new(), rng);
    let items = place_items(&mut grid, &config.items, rng);
    let crystal_stacks = place_crystals(&mut grid, &provenance, rng);

    // ---- outpost and economy
    let pad = locate_outpost(&grid, dims.air_gap);
    let outpost = Outpost::new(pad, resolve_outpost_economy(config.spaceco.as_ref(), rng));

    let world = World {
        id: config.id.clone(),
        description: config.description.clone(),
        width: dims.width,
        depth: dims.depth,
        air_gap: dims.air_gap,
        grid,
        outpost,
        aliens,
        new_player: resolve_new_player(config.new_player.as_ref()),
        transport_requirements: config.transport_requirements.clone(),
        transport_price: config.transport_price.clone(),
    };

    info!(
        "Generated world '{}': {}x{}, {} holes, {} tunnel cells, {} vein instances, {} lava cells, {} gas cells, {} aliens, {} items, {} crystal stacks",
        world.id.as_deref().unwrap_or("unnamed"),
        world.width,
        world.depth,
        holes.holes().len(),
        tunnels.len(),
        provenance.instances().len(),
        hazards.lava_cells,
        hazards.gas_cells,
        world.aliens.len(),
        items.len(),
        crystal_stacks,
    );

    Ok(GenerationReport {
        world,
        dimensions: dims,
        provenance,
        hazards,
        items,
        crystal_stacks,
    })
}
