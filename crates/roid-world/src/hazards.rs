//! Lava and gas placement.
//!
//! Pools seed inside enclosed cave cells and settle with
//! [`settle_fill`](crate::flood::settle_fill): lava from the lowest supported
//! row upward, gas from the highest supported row downward. All pools share
//! one claimed-cell mask so the two fluids never overlap. Bubbles are single
//! cells carved out of solid rock. A final column pass removes any gas that
//! ended up beneath lava.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::config::WorldConfig;
use crate::flood::{flood_fill, settle_fill, SettleContext, SettleDirection};
use crate::grid::{CellMask, FluidKind, Grid, Hazard, Pos, CARDINALS};
use crate::holes::HoleField;
use crate::shape::AsteroidShape;

/// A solid cell within this many rows above counts as a roof.
const ROOF_SEARCH: i32 = 12;
/// Minimum clearance from the asteroid boundary for an enclosed cell.
const ENCLOSURE_MARGIN: i32 = 2;
/// Minimum solid cells among the 8 neighbours (25%).
const MIN_SOLID_NEIGHBOURS: usize = 2;
const POOL_ATTEMPTS: u32 = 3;
/// Target cells per pool.
const POOL_BUDGET: usize = 30;
/// Cap on the cave region explored from a seed.
const REGION_CAP: usize = 4096;
const CORRECTION_PASSES: u32 = 3;

impl FluidKind {
    pub fn settle_direction(self) -> SettleDirection {
        match self {
            FluidKind::Lava => SettleDirection::Down,
            FluidKind::Gas => SettleDirection::Up,
        }
    }

    fn hazard(self) -> Hazard {
        match self {
            FluidKind::Lava => Hazard::lava(),
            FluidKind::Gas => Hazard::gas(),
        }
    }
}

/// Per-world hazard counts, for logging and tests.
///
/// Pool and bubble counts are what was placed; the column correction may
/// thin them afterwards. Cell counts are taken once the correction is done.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HazardSummary {
    pub lava_pools: u32,
    pub gas_pockets: u32,
    pub lava_bubbles: u32,
    pub gas_bubbles: u32,
    /// Lava cells left in the world, pools and bubbles together.
    pub lava_cells: usize,
    /// Gas cells left in the world, pools and bubbles together.
    pub gas_cells: usize,
    /// Fluid cells deleted by the column correction.
    pub corrected: usize,
}

struct HazardPlacer<'a> {
    grid: &'a mut Grid,
    shape: &'a AsteroidShape,
    holes: &'a HoleField,
    filled: CellMask,
}

/// Place pools, pockets and bubbles, then run the column correction.
pub fn place_hazards<R: Rng + ?Sized>(
    grid: &mut Grid,
    shape: &AsteroidShape,
    holes: &HoleField,
    config: &WorldConfig,
    rng: &mut R,
) -> HazardSummary {
    let dims = *shape.dims();
    let mut placer = HazardPlacer {
        grid,
        shape,
        holes,
        filled: CellMask::new(dims.width, dims.depth),
    };
    let mut summary = HazardSummary::default();

    for _ in 0..config.lava_pools.count.roll(rng) {
        if placer.place_pool(FluidKind::Lava, rng) > 0 {
            summary.lava_pools += 1;
        }
    }
    for _ in 0..config.gas_pockets.count.roll(rng) {
        if placer.place_pool(FluidKind::Gas, rng) > 0 {
            summary.gas_pockets += 1;
        }
    }

    let lava_bubbles = config.lava_bubbles.count.roll(rng);
    summary.lava_bubbles = placer.place_bubbles(FluidKind::Lava, lava_bubbles, rng);
    let gas_bubbles = config.gas_bubbles.count.roll(rng);
    summary.gas_bubbles = placer.place_bubbles(FluidKind::Gas, gas_bubbles, rng);

    summary.corrected = correct_columns(placer.grid);
    for (_, cell) in placer.grid.cells() {
        if cell.has_fluid(FluidKind::Lava) {
            summary.lava_cells += 1;
        }
        if cell.has_fluid(FluidKind::Gas) {
            summary.gas_cells += 1;
        }
    }
    debug!("Hazards placed: {summary:?}");
    summary
}

impl HazardPlacer<'_> {
    /// Space inside a cave, roofed, away from the boundary and wall-backed.
    fn is_enclosed(&self, x: i32, y: i32) -> bool {
        let air_gap = self.shape.dims().air_gap as i32;
        if y <= air_gap + 1
            || !self.grid.is_space(x, y)
            || !self.shape.is_solid(x, y)
            || !self.holes.is_hole(x, y)
        {
            return false;
        }
        let roofed = (1..=ROOF_SEARCH).any(|k| self.grid.is_solid(x, y - k));
        if !roofed || !self.shape.has_margin(x, y, ENCLOSURE_MARGIN) {
            return false;
        }
        let solid_neighbours = (-1..=1)
            .flat_map(|dy| (-1..=1).map(move |dx| (dx, dy)))
            .filter(|&(dx, dy)| (dx, dy) != (0, 0) && self.grid.is_solid(x + dx, y + dy))
            .count();
        solid_neighbours >= MIN_SOLID_NEIGHBOURS
    }

    /// Unclaimed enclosed cells, row-major. Cells in caves flagged for this
    /// fluid come first when there are any.
    fn seed_candidates(&self, kind: FluidKind) -> Vec<Pos> {
        let all: Vec<Pos> = self
            .grid
            .positions()
            .filter(|&(x, y)| !self.filled.contains(x, y) && self.is_enclosed(x, y))
            .collect();
        let flagged: Vec<Pos> = all
            .iter()
            .copied()
            .filter(|&(x, y)| {
                self.holes.hole_at(x, y).is_some_and(|h| match kind {
                    FluidKind::Lava => h.has_lava,
                    FluidKind::Gas => h.has_gas,
                })
            })
            .collect();
        if flagged.is_empty() {
            all
        } else {
            flagged
        }
    }

    fn is_open(&self, x: i32, y: i32) -> bool {
        y > self.shape.dims().air_gap as i32
            && self.grid.is_space(x, y)
            && self.shape.is_solid(x, y)
            && self.shape.has_margin(x, y, 1)
    }

    /// Returns the number of cells filled, zero when every attempt failed.
    fn place_pool<R: Rng + ?Sized>(&mut self, kind: FluidKind, rng: &mut R) -> usize {
        let direction = kind.settle_direction();
        for _ in 0..POOL_ATTEMPTS {
            let candidates = self.seed_candidates(kind);
            let Some(&seed) = candidates.choose(rng) else {
                return 0;
            };
            let Some(start) = self.settle_start(seed, direction) else {
                continue;
            };

            let (cells, filled) = {
                let open = |x: i32, y: i32| self.is_open(x, y);
                let blocked = |x: i32, y: i32| !self.grid.is_space(x, y);
                let ctx = SettleContext {
                    open: &open,
                    blocked: &blocked,
                };
                let mut filled = self.filled.clone();
                let cells = settle_fill(&ctx, start, direction, POOL_BUDGET, &mut filled);
                (cells, filled)
            };
            if cells.is_empty() {
                continue;
            }
            self.filled = filled;
            for &(x, y) in &cells {
                if let Some(cell) = self.grid.get_mut(x, y) {
                    cell.hazards.push(kind.hazard());
                }
            }
            return cells.len();
        }
        0
    }

    /// Lowest (lava) or highest (gas) supported cell of the seed's cave
    /// region, nearest the seed column.
    fn settle_start(&self, seed: Pos, direction: SettleDirection) -> Option<Pos> {
        let region = flood_fill(seed, REGION_CAP, |x, y| {
            self.is_open(x, y) && !self.filled.contains(x, y)
        });
        let supported = region
            .into_iter()
            .filter(|&(x, y)| !self.grid.is_space(x, y + direction.dy()));
        let extremal = |p: &Pos| p.1 * direction.dy();
        let mut best: Option<Pos> = None;
        for p in supported {
            best = match best {
                None => Some(p),
                Some(b) => {
                    let deeper = extremal(&p) > extremal(&b);
                    let same_row_closer = extremal(&p) == extremal(&b)
                        && ((p.0 - seed.0).abs(), p.0) < ((b.0 - seed.0).abs(), b.0);
                    if deeper || same_row_closer {
                        Some(p)
                    } else {
                        Some(b)
                    }
                }
            };
        }
        best
    }

    /// Carve `count` single-cell pockets into rock walled on all four sides.
    fn place_bubbles<R: Rng + ?Sized>(&mut self, kind: FluidKind, count: u32, rng: &mut R) -> u32 {
        if count == 0 {
            return 0;
        }
        let air_gap = self.shape.dims().air_gap as i32;
        let mut candidates: Vec<Pos> = self
            .grid
            .positions()
            .filter(|&(x, y)| {
                y > air_gap
                    && self.grid.is_solid(x, y)
                    && CARDINALS
                        .iter()
                        .all(|(dx, dy)| self.grid.is_solid(x + dx, y + dy))
            })
            .collect();

        candidates.shuffle(rng);

        let mut placed = 0;
        for (x, y) in candidates {
            if placed == count {
                break;
            }
            // an earlier bubble may have opened a neighbour
            if !CARDINALS.iter().all(|(dx, dy)| self.grid.is_solid(x + dx, y + dy)) {
                continue;
            }
            if let Some(cell) = self.grid.get_mut(x, y) {
                cell.hollow();
                cell.hazards.push(kind.hazard());
                self.filled.insert(x, y);
                placed += 1;
            }
        }
        placed
    }
}

/// Remove gas lying beneath lava in the same column, then lava lying above
/// gas. Runs over the whole world. Returns the number of cells cleared.
pub fn correct_columns(grid: &mut Grid) -> usize {
    let (width, depth) = (grid.width() as i32, grid.depth() as i32);
    let mut total = 0;
    for _ in 0..CORRECTION_PASSES {
        let mut removed = 0;
        for x in 0..width {
            let mut lava_above = false;
            for y in 0..depth {
                let Some(cell) = grid.get_mut(x, y) else {
                    continue;
                };
                if lava_above && cell.has_fluid(FluidKind::Gas) {
                    cell.hazards.retain(|h| h.fluid_kind() != Some(FluidKind::Gas));
                    removed += 1;
                }
                lava_above |= cell.has_fluid(FluidKind::Lava);
            }

            let mut gas_below = false;
            for y in (0..depth).rev() {
                let Some(cell) = grid.get_mut(x, y) else {
                    continue;
                };
                if gas_below && cell.has_fluid(FluidKind::Lava) {
                    cell.hazards.retain(|h| h.fluid_kind() != Some(FluidKind::Lava));
                    removed += 1;
                }
                gas_below |= cell.has_fluid(FluidKind::Gas);
            }
        }
        total += removed;
        if removed == 0 {
            break;
        }
    }
    total
}

/// True when some column holds gas below lava.
pub fn has_gas_below_lava(grid: &Grid) -> bool {
    grid.columns().iter().any(|column| {
        let mut lava_seen = false;
        column.iter().any(|cell| {
            lava_seen |= cell.has_fluid(FluidKind::Lava);
            lava_seen && cell.has_fluid(FluidKind::Gas)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Budget, HazardCount, SizeSpec};
    use crate::dimensions::Dimensions;
    use crate::holes::{Hole, HoleTier};
    use crate::veins::fill_base_ground;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct World {
        grid: Grid,
        shape: AsteroidShape,
        holes: HoleField,
    }

    /// Medium asteroid with a single smooth cave at its centre.
    fn world_with_cave(rx: f64, ry: f64) -> World {
        let mut cfg = WorldConfig::with_ground("white", vec![]);
        cfg.size = SizeSpec::Base(64);
        let dims = Dimensions::resolve(&cfg);
        let shape = AsteroidShape::new(dims);
        let cave = Hole::cave(HoleTier::Medium, shape.center(), rx, ry);
        let holes = HoleField::from_holes(vec![cave], dims.air_gap);
        let mut grid = Grid::new(dims.width, dims.depth);
        let hole_mask = CellMask::from_fn(dims.width, dims.depth, |x, y| holes.is_hole(x, y));
        let tunnels = CellMask::new(dims.width, dims.depth);
        fill_base_ground(&mut grid, &shape, &hole_mask, &tunnels, "white");
        World { grid, shape, holes }
    }

    fn config(lava: u32, gas: u32) -> WorldConfig {
        let mut cfg = WorldConfig::with_ground("white", vec![]);
        cfg.lava_pools = HazardCount {
            count: Budget::fixed(lava),
        };
        cfg.gas_pockets = HazardCount {
            count: Budget::fixed(gas),
        };
        cfg
    }

    fn fluid_cells(grid: &Grid, kind: FluidKind) -> Vec<Pos> {
        grid.cells()
            .filter(|(_, c)| c.has_fluid(kind))
            .map(|(p, _)| p)
            .collect()
    }

    #[test]
    fn lava_settles_on_the_cave_floor() {
        let mut w = world_with_cave(8.0, 6.0);
        let mut rng = StdRng::seed_from_u64(1);
        let summary = place_hazards(&mut w.grid, &w.shape, &w.holes, &config(1, 0), &mut rng);
        assert_eq!(summary.lava_pools, 1);
        let lava = fluid_cells(&w.grid, FluidKind::Lava);
        assert!(!lava.is_empty() && lava.len() <= POOL_BUDGET);
        for (x, y) in lava {
            let below = w.grid.get(x, y + 1).unwrap();
            assert!(below.is_solid() || below.has_fluid(FluidKind::Lava), "lava at ({x}, {y}) floats");
        }
    }

    #[test]
    fn gas_collects_under_the_roof() {
        let mut w = world_with_cave(8.0, 6.0);
        let mut rng = StdRng::seed_from_u64(2);
        let summary = place_hazards(&mut w.grid, &w.shape, &w.holes, &config(0, 1), &mut rng);
        assert_eq!(summary.gas_pockets, 1);
        for (x, y) in fluid_cells(&w.grid, FluidKind::Gas) {
            let above = w.grid.get(x, y - 1).unwrap();
            assert!(above.is_solid() || above.has_fluid(FluidKind::Gas), "gas at ({x}, {y}) sinks");
        }
    }

    #[test]
    fn fluids_never_share_a_cell() {
        let mut w = world_with_cave(10.0, 8.0);
        let mut rng = StdRng::seed_from_u64(3);
        place_hazards(&mut w.grid, &w.shape, &w.holes, &config(2, 2), &mut rng);
        for (_, cell) in w.grid.cells() {
            assert!(!(cell.has_fluid(FluidKind::Lava) && cell.has_fluid(FluidKind::Gas)));
        }
        assert!(!has_gas_below_lava(&w.grid));
    }

    #[test]
    fn cell_counts_follow_the_correction() {
        let mut cfg = config(2, 2);
        cfg.lava_bubbles = HazardCount {
            count: Budget::fixed(3),
        };
        cfg.gas_bubbles = HazardCount {
            count: Budget::fixed(3),
        };
        for seed in 0..8 {
            let mut w = world_with_cave(10.0, 8.0);
            let mut rng = StdRng::seed_from_u64(seed);
            let summary = place_hazards(&mut w.grid, &w.shape, &w.holes, &cfg, &mut rng);
            assert_eq!(summary.lava_cells, fluid_cells(&w.grid, FluidKind::Lava).len(), "seed {seed}");
            assert_eq!(summary.gas_cells, fluid_cells(&w.grid, FluidKind::Gas).len(), "seed {seed}");
        }
    }

    #[test]
    fn tiny_cave_takes_one_fluid() {
        let mut w = world_with_cave(2.3, 2.3);
        let mut rng = StdRng::seed_from_u64(4);
        let summary = place_hazards(&mut w.grid, &w.shape, &w.holes, &config(1, 1), &mut rng);
        assert!(summary.lava_pools + summary.gas_pockets <= 1);
        for column in w.grid.columns() {
            let lava = column.iter().any(|c| c.has_fluid(FluidKind::Lava));
            let gas = column.iter().any(|c| c.has_fluid(FluidKind::Gas));
            assert!(!(lava && gas));
        }
    }

    #[test]
    fn no_pools_without_caves() {
        let mut cfg = WorldConfig::with_ground("white", vec![]);
        cfg.size = SizeSpec::Base(48);
        let dims = Dimensions::resolve(&cfg);
        let shape = AsteroidShape::new(dims);
        let holes = HoleField::empty(dims.air_gap);
        let mut grid = Grid::new(dims.width, dims.depth);
        let empty = CellMask::new(dims.width, dims.depth);
        fill_base_ground(&mut grid, &shape, &empty, &empty, "white");
        let mut rng = StdRng::seed_from_u64(5);
        let summary = place_hazards(&mut grid, &shape, &holes, &config(3, 3), &mut rng);
        assert_eq!(summary.lava_pools + summary.gas_pockets, 0);
    }

    #[test]
    fn bubbles_are_walled_pockets() {
        let mut w = world_with_cave(4.0, 4.0);
        let mut cfg = config(0, 0);
        cfg.lava_bubbles = HazardCount {
            count: Budget::fixed(5),
        };
        cfg.gas_bubbles = HazardCount {
            count: Budget::fixed(5),
        };
        let mut rng = StdRng::seed_from_u64(6);
        let summary = place_hazards(&mut w.grid, &w.shape, &w.holes, &cfg, &mut rng);
        assert_eq!(summary.lava_bubbles, 5);
        assert_eq!(summary.gas_bubbles, 5);
        for kind in [FluidKind::Lava, FluidKind::Gas] {
            for (x, y) in fluid_cells(&w.grid, kind) {
                let cell = w.grid.get(x, y).unwrap();
                assert!(cell.is_space() && cell.ground.is_none());
            }
        }
        assert!(!has_gas_below_lava(&w.grid));
    }

    #[test]
    fn correction_removes_gas_under_lava() {
        let mut grid = Grid::new(1, 6);
        grid.get_mut(0, 1).unwrap().hazards.push(Hazard::gas());
        grid.get_mut(0, 2).unwrap().hazards.push(Hazard::lava());
        grid.get_mut(0, 4).unwrap().hazards.push(Hazard::gas());
        let removed = correct_columns(&mut grid);
        assert_eq!(removed, 1);
        assert!(grid.get(0, 1).unwrap().has_fluid(FluidKind::Gas));
        assert!(grid.get(0, 2).unwrap().has_fluid(FluidKind::Lava));
        assert!(!grid.get(0, 4).unwrap().has_fluid(FluidKind::Gas));
        assert!(!has_gas_below_lava(&grid));
    }
}
