//! Alien type definitions and budgeted alien placement.
//!
//! Aliens prefer the deepest reachable floor cells. Each instance is also
//! written into its cell's hazard list and into the world's alien registry.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::EntityBudget;
use crate::grid::{Grid, Hazard, Pos};
use crate::placement::{too_close, Placement, TypeTable};

/// Types used when the configuration names none.
pub const DEFAULT_ALIEN_TYPES: [&str; 3] = ["rock_mite", "tunnel_bat", "magma_slug"];

const MIN_DISTANCE: f64 = 8.0;
const PLACEMENT_ATTEMPTS: u32 = 20;
/// Share of remaining candidates, deepest first, an alien is drawn from.
const DEEP_FRACTION: f64 = 0.3;
const MIN_ROWS_BELOW_AIR_GAP: i32 = 2;
const ROOF_SEARCH: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlienMovement {
    Crawl,
    Fly,
    Burrow,
    Stationary,
}

/// Behaviour snapshot copied onto every instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlienBehavior {
    pub movement: AlienMovement,
    /// 0 ignores players, 1 always attacks.
    pub aggression: f64,
    pub damage: u32,
    pub speed: f64,
    pub vision_range: u32,
}

/// Definition of an alien type.
#[derive(Debug, Clone)]
pub struct AlienDefinition {
    /// Identifier used in configurations, e.g. `"rock_mite"`.
    pub type_id: String,
    pub display_name: String,
    pub max_health: u32,
    pub behavior: AlienBehavior,
}

/// Registry of known alien types.
pub struct AlienRegistry {
    aliens: Vec<AlienDefinition>,
}

impl Default for AlienRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AlienRegistry {
    pub fn new() -> Self {
        let def = |type_id: &str, name: &str, max_health, movement, aggression, damage, speed, vision_range| {
            AlienDefinition {
                type_id: type_id.into(),
                display_name: name.into(),
                max_health,
                behavior: AlienBehavior {
                    movement,
                    aggression,
                    damage,
                    speed,
                    vision_range,
                },
            }
        };
        Self {
            aliens: vec![
                def("rock_mite", "Rock Mite", 3, AlienMovement::Crawl, 0.6, 1, 1.0, 4),
                def("tunnel_bat", "Tunnel Bat", 2, AlienMovement::Fly, 0.4, 1, 2.0, 6),
                def("magma_slug", "Magma Slug", 6, AlienMovement::Crawl, 0.8, 3, 0.5, 3),
                def("crystal_spider", "Crystal Spider", 4, AlienMovement::Crawl, 0.7, 2, 1.5, 5),
                def("burrow_worm", "Burrow Worm", 8, AlienMovement::Burrow, 0.9, 4, 0.75, 2),
                def("spore_pod", "Spore Pod", 5, AlienMovement::Stationary, 1.0, 2, 0.0, 2),
            ],
        }
    }

    pub fn get(&self, type_id: &str) -> Option<&AlienDefinition> {
        self.aliens.iter().find(|a| a.type_id == type_id)
    }

    pub fn all(&self) -> &[AlienDefinition] {
        &self.aliens
    }

    /// Register a custom type; replaces an existing one with the same id.
    pub fn register(&mut self, def: AlienDefinition) {
        self.aliens.retain(|a| a.type_id != def.type_id);
        self.aliens.push(def);
    }
}

/// One placed alien, as stored in the world and in its cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlienInstance {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub health: u32,
    pub behavior: AlienBehavior,
    pub x: i32,
    pub y: i32,
}

impl AlienInstance {
    pub fn spawn(id: String, def: &AlienDefinition, (x, y): Pos) -> Self {
        Self {
            id,
            kind: def.type_id.clone(),
            health: def.max_health,
            behavior: def.behavior.clone(),
            x,
            y,
        }
    }

    pub fn pos(&self) -> Pos {
        (self.x, self.y)
    }
}

/// Open, hazard-free floor cells with a roof, below the air gap.
pub fn alien_candidates(grid: &Grid, air_gap: u32) -> Vec<Pos> {
    let min_y = air_gap as i32 + MIN_ROWS_BELOW_AIR_GAP;
    let mut cells: Vec<Pos> = grid
        .positions()
        .filter(|&(x, y)| {
            y >= min_y
                && grid.get(x, y).is_some_and(|c| c.is_space() && c.hazards.is_empty())
                && grid.is_solid(x, y + 1)
                && (1..=ROOF_SEARCH).any(|k| grid.is_solid(x, y - k))
        })
        .collect();
    // deepest first; stable, so ties stay row-major
    cells.sort_by_key(|&(_, y)| std::cmp::Reverse(y));
    cells
}

/// Place the configured alien budget. Returns the new instances by id.
pub fn place_aliens<R: Rng + ?Sized>(
    grid: &mut Grid,
    air_gap: u32,
    config: &EntityBudget,
    registry: &AlienRegistry,
    rng: &mut R,
) -> BTreeMap<String, AlienInstance> {
    let mut aliens = BTreeMap::new();
    let count = config.budget.roll(rng);
    if count == 0 {
        return aliens;
    }

    let table = match TypeTable::parse(config.types.as_ref()) {
        Ok(Some(table)) => table,
        Ok(None) => TypeTable::uniform(&DEFAULT_ALIEN_TYPES),
        Err(reason) => {
            warn!("Malformed alien type table ({reason}), using default types");
            TypeTable::uniform(&DEFAULT_ALIEN_TYPES)
        }
    };

    let mut candidates = alien_candidates(grid, air_gap);
    let mut placed: Vec<Placement> = Vec::new();
    let mut waived = 0;

    for _ in 0..count {
        if candidates.is_empty() {
            break;
        }
        let pool = ((candidates.len() as f64 * DEEP_FRACTION).ceil() as usize).clamp(1, candidates.len());
        let spaced = (0..PLACEMENT_ATTEMPTS)
            .map(|_| rng.gen_range(0..pool))
            .find(|&i| !too_close(&placed, candidates[i], MIN_DISTANCE));
        let index = match spaced {
            Some(i) => i,
            None => {
                waived += 1;
                rng.gen_range(0..pool)
            }
        };
        let pos = candidates.remove(index);

        let Some(kind) = table.pick(rng) else {
            break;
        };
        let Some(def) = registry.get(kind) else {
            warn!("Unknown alien type '{kind}', skipping");
            continue;
        };
        let id = format!("alien_{:03}", aliens.len());
        let alien = AlienInstance::spawn(id.clone(), def, pos);
        if let Some(cell) = grid.get_mut(pos.0, pos.1) {
            cell.hazards.push(Hazard::Alien(alien.clone()));
        }
        placed.push(Placement {
            kind: def.type_id.clone(),
            pos,
        });
        aliens.insert(id, alien);
    }

    debug!(
        "Placed {} of {count} aliens ({waived} with spacing waived)",
        aliens.len()
    );
    aliens
}
