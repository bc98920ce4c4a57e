//! Outpost landing pad search and the outpost descriptor.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::economy::OutpostEconomy;
use crate::grid::{Grid, Pos};

/// Half-width of the square pad footprint (3x3).
const PAD_HALF: i32 = 1;
const PAD_HEIGHT: i32 = 3;

/// The operator outpost as delivered to the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outpost {
    pub x: i32,
    pub y: i32,
    pub health: u32,
    pub xp: u32,
    pub stock: BTreeMap<String, u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Outpost {
    pub fn new((x, y): Pos, economy: OutpostEconomy) -> Self {
        Self {
            x,
            y,
            health: economy.health,
            xp: economy.xp,
            stock: economy.stock,
            extra: economy.extra,
        }
    }
}

/// Surface row of the pad centred on column `x`: the bottom row of the
/// footprint, directly above the first solid row under all three columns.
fn surface_pad(grid: &Grid, x: i32) -> Option<Pos> {
    let columns = x - PAD_HALF..=x + PAD_HALF;
    let floor = (0..grid.depth() as i32).find(|&y| columns.clone().any(|cx| grid.is_solid(cx, y)))?;
    if !columns.clone().all(|cx| grid.is_solid(cx, floor)) {
        return None;
    }
    let top = floor - PAD_HEIGHT;
    if top < 0 {
        return None;
    }
    let clear = (top..floor).all(|y| {
        columns
            .clone()
            .all(|cx| grid.get(cx, y).is_some_and(|c| c.is_space() && c.hazards.is_empty()))
    });
    clear.then_some((x, floor - 1))
}

/// Search outward from the centre column for a flat, open 3x3 pad.
pub fn find_landing_pad(grid: &Grid) -> Option<Pos> {
    let width = grid.width() as i32;
    let center = width / 2;
    for offset in 0..=center {
        for x in [center - offset, center + offset] {
            if x - PAD_HALF < 0 || x + PAD_HALF >= width {
                continue;
            }
            if let Some(pad) = surface_pad(grid, x) {
                return Some(pad);
            }
            if offset == 0 {
                break;
            }
        }
    }
    None
}

/// Pad position, or a fixed spot above the centre in the air gap.
pub fn locate_outpost(grid: &Grid, air_gap: u32) -> Pos {
    match find_landing_pad(grid) {
        Some(pad) => {
            debug!("Outpost landing pad at {pad:?}");
            pad
        }
        None => {
            let fallback = (grid.width() as i32 / 2, (air_gap as i32 - 1).max(0));
            warn!("No flat landing pad found, placing outpost at {fallback:?}");
            fallback
        }
    }
}
