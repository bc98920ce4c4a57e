//! Bounded flood fill shared by lava and gas.
//!
//! Lava settles on floors and spreads upward layer by layer; gas collects
//! under ceilings and spreads downward. Both are the same fill with the
//! vertical axis flipped, parameterised by [`SettleDirection`].

use std::collections::VecDeque;

use crate::grid::{CellMask, Pos, CARDINALS};

/// Which way a fluid settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleDirection {
    /// Sinks: rests on a floor, fills upward (lava).
    Down,
    /// Rises: rests under a ceiling, fills downward (gas).
    Up,
}

impl SettleDirection {
    /// Row offset toward where the fluid settles.
    pub fn dy(self) -> i32 {
        match self {
            SettleDirection::Down => 1,
            SettleDirection::Up => -1,
        }
    }

    /// Row offset in which the fluid stacks as it fills.
    pub fn fill_dy(self) -> i32 {
        -self.dy()
    }
}

/// Plain 4-connected BFS from `start` over cells accepted by `open`,
/// stopping after `cap` cells. Visits in breadth-first order.
pub fn flood_fill(start: Pos, cap: usize, mut open: impl FnMut(i32, i32) -> bool) -> Vec<Pos> {
    let mut out = Vec::new();
    if cap == 0 || !open(start.0, start.1) {
        return out;
    }
    let mut seen = std::collections::BTreeSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some((x, y)) = queue.pop_front() {
        out.push((x, y));
        if out.len() >= cap {
            break;
        }
        for (dx, dy) in CARDINALS {
            let next = (x + dx, y + dy);
            if !seen.contains(&next) && open(next.0, next.1) {
                seen.insert(next);
                queue.push_back(next);
            }
        }
    }
    out
}

/// Environment a settling fill runs in.
pub struct SettleContext<'a> {
    /// Cell may hold fluid (open space, inside the asteroid, not claimed).
    pub open: &'a dyn Fn(i32, i32) -> bool,
    /// Cell stops fluid (solid rock or out of bounds).
    pub blocked: &'a dyn Fn(i32, i32) -> bool,
}

impl SettleContext<'_> {
    fn is_free(&self, p: Pos, mask: &CellMask) -> bool {
        (self.open)(p.0, p.1) && !mask.contains(p.0, p.1)
    }
}

fn claim(p: Pos, mask: &mut CellMask, filled: &mut Vec<Pos>) {
    if mask.insert(p.0, p.1) {
        filled.push(p);
    }
}

/// Layered settle fill.
///
/// Starting at `seed`, which must rest against a blocking cell in the
/// settle direction, each layer spreads horizontally along its row. Any
/// cell in the layer with open space in the settle direction drips into it,
/// and the drip becomes part of the next pass over that row. When a layer
/// is done the fill stacks one row against the settle direction from
/// supported cells. Stops at `budget` cells.
pub fn settle_fill(ctx: &SettleContext<'_>, seed: Pos, direction: SettleDirection, budget: usize, mask: &mut CellMask) -> Vec<Pos> {
    let mut filled = Vec::new();
    if budget == 0 || !(ctx.open)(seed.0, seed.1) {
        return filled;
    }
    let mut layer = vec![seed];
    claim(seed, mask, &mut filled);

    while !layer.is_empty() && filled.len() < budget {
        // spread along rows, dripping toward the settle side
        let mut queue: VecDeque<Pos> = layer.iter().copied().collect();
        let mut row_cells = layer.clone();
        while let Some((x, y)) = queue.pop_front() {
            if filled.len() >= budget {
                break;
            }
            for next in [(x - 1, y), (x + 1, y), (x, y + direction.dy())] {
                if filled.len() >= budget {
                    break;
                }
                if ctx.is_free(next, mask) {
                    claim(next, mask, &mut filled);
                    queue.push_back(next);
                    row_cells.push(next);
                }
            }
        }

        // stack one row against the settle direction
        let mut next_layer = Vec::new();
        for &(x, y) in &row_cells {
            let up = (x, y + direction.fill_dy());
            let supported = (ctx.blocked)(x, y + direction.dy()) || mask.contains(x, y + direction.dy());
            if supported && ctx.is_free(up, mask) && filled.len() < budget {
                claim(up, mask, &mut filled);
                next_layer.push(up);
            }
        }
        layer = next_layer;
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;

    /// ASCII map: `#` solid, `.` open. Out of bounds is solid.
    fn map<'a>(rows: &'a [&'a str]) -> (impl Fn(i32, i32) -> bool + 'a, impl Fn(i32, i32) -> bool + 'a) {
        let at = move |x: i32, y: i32| -> u8 {
            if x < 0 || y < 0 {
                return b'#';
            }
            rows.get(y as usize)
                .and_then(|r| r.as_bytes().get(x as usize).copied())
                .unwrap_or(b'#')
        };
        (move |x, y| at(x, y) == b'.', move |x, y| at(x, y) == b'#')
    }

    const BASIN: [&str; 6] = ["#########", "#.......#", "#.......#", "#..###..#", "#.......#", "#########"];

    #[test]
    fn flood_fill_respects_cap() {
        let (open, _) = map(&BASIN);
        assert_eq!(flood_fill((1, 1), 5, &open).len(), 5);
        assert_eq!(flood_fill((1, 1), 100, &open).len(), 7 * 4 - 3);
        assert!(flood_fill((0, 0), 10, &open).is_empty());
    }

    #[test]
    fn lava_fills_floor_first() {
        let (open, blocked) = map(&BASIN);
        let ctx = SettleContext { open: &open, blocked: &blocked };
        let mut mask = CellMask::new(9, 6);
        let cells = settle_fill(&ctx, (1, 4), SettleDirection::Down, 7, &mut mask);
        assert_eq!(cells.len(), 7);
        assert!(cells.iter().all(|&(_, y)| y == 4));
    }

    #[test]
    fn gas_fills_ceiling_first() {
        let (open, blocked) = map(&BASIN);
        let ctx = SettleContext { open: &open, blocked: &blocked };
        let mut mask = CellMask::new(9, 6);
        let cells = settle_fill(&ctx, (4, 1), SettleDirection::Up, 7, &mut mask);
        assert_eq!(cells.len(), 7);
        assert!(cells.iter().all(|&(_, y)| y == 1));
    }

    #[test]
    fn lava_stacks_upward_when_floor_is_full() {
        let (open, blocked) = map(&BASIN);
        let ctx = SettleContext { open: &open, blocked: &blocked };
        let mut mask = CellMask::new(9, 6);
        let cells = settle_fill(&ctx, (1, 4), SettleDirection::Down, 10, &mut mask);
        assert_eq!(cells.len(), 10);
        assert!(cells.iter().all(|&(_, y)| y >= 3));
        assert!(cells.iter().any(|&(_, y)| y == 3));
    }

    #[test]
    fn gas_never_drips_below_its_ceiling_row() {
        let rows = ["#####", "#...#", "#...#", "#...#", "#####"];
        let (open, blocked) = map(&rows);
        let ctx = SettleContext { open: &open, blocked: &blocked };
        let mut mask = CellMask::new(5, 5);
        let cells = settle_fill(&ctx, (2, 1), SettleDirection::Up, 3, &mut mask);
        assert!(cells.iter().all(|&(_, y)| y == 1));
    }

    #[test]
    fn claimed_cells_are_skipped() {
        let (open, blocked) = map(&BASIN);
        let ctx = SettleContext { open: &open, blocked: &blocked };
        let mut mask = CellMask::new(9, 6);
        mask.insert(4, 4);
        let cells = settle_fill(&ctx, (1, 4), SettleDirection::Down, 30, &mut mask);
        assert!(!cells.contains(&(4, 4)));
    }
}
