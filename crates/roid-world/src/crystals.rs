//! Pure mineral crystals, seeded from vein provenance.

use rand::Rng;
use tracing::debug;

use crate::grid::{Grid, Item, Pos, Provenance};

const BASE_CHANCE: f64 = 0.1;
const CHANCE_PER_YIELD: f64 = 0.2;
const MAX_BASE_CHANCE: f64 = 0.8;
const BONUS_TIERS: u32 = 3;

/// Item name for the crystal of a mineral.
pub fn crystal_name(mineral: &str) -> String {
    format!("mineral_{mineral}")
}

/// Chance a vein cell yields any crystal.
pub fn base_chance(yield_rate: f64) -> f64 {
    (BASE_CHANCE + yield_rate * CHANCE_PER_YIELD).min(MAX_BASE_CHANCE)
}

/// Chance of one extra stack at `tier` (1-based).
pub fn tier_chance(yield_rate: f64, tier: u32) -> f64 {
    ((yield_rate - tier as f64 + 0.5) * 0.5).clamp(0.0, 1.0)
}

/// Roll crystals for every vein instance with a positive yield. Returns the
/// number of stacks created.
pub fn place_crystals<R: Rng + ?Sized>(grid: &mut Grid, provenance: &Provenance, rng: &mut R) -> u32 {
    let mut by_instance: Vec<Vec<Pos>> = vec![Vec::new(); provenance.instances().len()];
    for (x, y) in grid.positions() {
        if let Some(tag) = provenance.get(x, y) {
            if let Some(cells) = by_instance.get_mut(tag.vein_index as usize) {
                cells.push((x, y));
            }
        }
    }

    let mut stacks = 0;
    for (instance, cells) in provenance.instances().iter().zip(by_instance) {
        if instance.yield_rate <= 0.0 {
            continue;
        }
        let name = crystal_name(&instance.mineral);
        let chance = base_chance(instance.yield_rate);
        for (x, y) in cells {
            let Some(cell) = grid.get_mut(x, y) else {
                continue;
            };
            if cell.ground.is_none() || !rng.gen_bool(chance) {
                continue;
            }
            let mut count = 1;
            for tier in 1..=BONUS_TIERS {
                if rng.gen_bool(tier_chance(instance.yield_rate, tier)) {
                    count += 1;
                }
            }
            cell.add_item(Item::stack(name.as_str(), count));
            stacks += 1;
        }
    }
    debug!("Grew {stacks} crystal stacks");
    stacks
}
