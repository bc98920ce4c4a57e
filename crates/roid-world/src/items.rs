//! Budgeted item placement.

use rand::Rng;
use tracing::{debug, warn};

use crate::config::EntityBudget;
use crate::grid::{Grid, Item, Pos};
use crate::placement::{too_close, Placement, TypeTable};

/// Item type used when the weight table is missing or malformed.
pub const FALLBACK_ITEM: &str = "oil";

const MIN_DISTANCE: f64 = 6.0;
const PLACEMENT_ATTEMPTS: u32 = 15;

/// Open cells resting on ground, row-major.
pub fn item_candidates(grid: &Grid) -> Vec<Pos> {
    grid.positions()
        .filter(|&(x, y)| {
            grid.is_space(x, y) && grid.get(x, y + 1).is_some_and(|below| below.ground.is_some())
        })
        .collect()
}

fn item_table(config: &EntityBudget) -> TypeTable {
    match TypeTable::parse(config.types.as_ref()) {
        Ok(Some(table)) => table.normalized(),
        Ok(None) => TypeTable::Weighted(vec![(FALLBACK_ITEM.to_string(), 100.0)]),
        Err(reason) => {
            warn!("Malformed item type table ({reason}), placing only {FALLBACK_ITEM}");
            TypeTable::Weighted(vec![(FALLBACK_ITEM.to_string(), 100.0)])
        }
    }
}

/// Place the configured item budget. Returns the placements made.
pub fn place_items<R: Rng + ?Sized>(grid: &mut Grid, config: &EntityBudget, rng: &mut R) -> Vec<Placement> {
    let mut placed = Vec::new();
    let count = config.budget.roll(rng);
    if count == 0 {
        return placed;
    }
    let table = item_table(config);
    let mut candidates = item_candidates(grid);

    for _ in 0..count {
        if candidates.is_empty() {
            break;
        }
        let spot = (0..PLACEMENT_ATTEMPTS)
            .map(|_| rng.gen_range(0..candidates.len()))
            .find(|&i| !too_close(&placed, candidates[i], MIN_DISTANCE));
        let Some(index) = spot else {
            continue;
        };
        let pos = candidates.swap_remove(index);
        let Some(name) = table.pick(rng) else {
            break;
        };
        if let Some(cell) = grid.get_mut(pos.0, pos.1) {
            cell.add_item(Item::new(name));
        }
        placed.push(Placement {
            kind: name.to_string(),
            pos,
        });
    }

    debug!("Placed {} of {count} items", placed.len());
    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Budget;
    use crate::grid::Cell;
    use crate::placement::min_pairwise_distance;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    /// Flat floor at row 10 under open space.
    fn floor_grid(width: u32) -> Grid {
        let mut grid = Grid::new(width, 14);
        for x in 0..width as i32 {
            for y in 10..14 {
                *grid.get_mut(x, y).unwrap() = Cell::solid("white");
            }
        }
        grid
    }

    fn budget(n: u32, types: Option<serde_json::Value>) -> EntityBudget {
        EntityBudget {
            budget: Budget::fixed(n),
            types,
        }
    }

    #[test]
    fn candidates_rest_on_ground() {
        let grid = floor_grid(12);
        let cells = item_candidates(&grid);
        assert_eq!(cells.len(), 12);
        assert!(cells.iter().all(|&(_, y)| y == 9));
    }

    #[test]
    fn items_respect_spacing() {
        let mut grid = floor_grid(200);
        let mut rng = StdRng::seed_from_u64(1);
        let placed = place_items(&mut grid, &budget(6, None), &mut rng);
        assert!(!placed.is_empty());
        let positions: Vec<Pos> = placed.iter().map(|p| p.pos).collect();
        if let Some(d) = min_pairwise_distance(&positions) {
            assert!(d >= MIN_DISTANCE);
        }
        assert!(placed.iter().all(|p| p.kind == FALLBACK_ITEM));
        for p in &placed {
            assert_eq!(grid.get(p.pos.0, p.pos.1).unwrap().items, vec![Item::new("oil")]);
        }
    }

    #[test]
    fn weighted_table_is_used() {
        let mut grid = floor_grid(300);
        let mut rng = StdRng::seed_from_u64(2);
        let types = json!({"battery": 1, "teleporter": 0});
        let placed = place_items(&mut grid, &budget(8, Some(types)), &mut rng);
        assert!(placed.iter().all(|p| p.kind == "battery"));
    }

    #[test]
    fn malformed_table_falls_back_to_oil() {
        let mut grid = floor_grid(300);
        let mut rng = StdRng::seed_from_u64(3);
        let placed = place_items(&mut grid, &budget(4, Some(json!({"battery": "many"}))), &mut rng);
        assert!(!placed.is_empty());
        assert!(placed.iter().all(|p| p.kind == FALLBACK_ITEM));
    }

    #[test]
    fn crowded_floor_drops_items() {
        let mut grid = floor_grid(8);
        let mut rng = StdRng::seed_from_u64(4);
        let placed = place_items(&mut grid, &budget(10, None), &mut rng);
        // an 8-wide floor fits at most two items six apart
        assert!(placed.len() <= 2);
    }
}
