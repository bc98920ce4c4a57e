//! Sparse veins: blob clusters, fault traces and maze corridors.

use rand::Rng;

use super::{VeinBrush, VeinCanvas};

const START_ATTEMPTS: u32 = 30;
/// Below this density, faults degrade to isolated pixels.
const FAULT_DENSITY_THRESHOLD: f64 = 2.0;
const MAX_FAULT_PIXELS: u32 = 5;
const MAX_FAULT_TRACES: u32 = 2;
const FAULT_FILL: f64 = 0.55;

/// Blob clusters, denser toward each cluster centre.
pub(super) fn scattered<R: Rng + ?Sized>(canvas: &mut VeinCanvas<'_>, brush: &VeinBrush, rng: &mut R) {
    let radius = 1.5 + brush.size * 1.5;
    let reach = radius.ceil() as i32;
    for _ in 0..brush.instance_count {
        let Some((ox, oy)) = canvas.random_valid(rng, START_ATTEMPTS) else {
            continue;
        };
        let vein = canvas.open_instance(brush);
        canvas.paint(ox, oy, &brush.mineral, vein);
        for y in oy - reach..=oy + reach {
            for x in ox - reach..=ox + reach {
                let d = (((x - ox).pow(2) + (y - oy).pow(2)) as f64).sqrt() / radius;
                if d <= 1.0 && rng.gen_bool((1.0 - d) * 0.9 + 0.05) {
                    canvas.paint(x, y, &brush.mineral, vein);
                }
            }
        }
    }
}

/// Jagged fault traces. Low densities leave only a handful of lone pixels.
pub(super) fn faults<R: Rng + ?Sized>(canvas: &mut VeinCanvas<'_>, brush: &VeinBrush, rng: &mut R) {
    if brush.density < FAULT_DENSITY_THRESHOLD {
        for _ in 0..brush.instance_count.clamp(1, MAX_FAULT_PIXELS) {
            if let Some((x, y)) = canvas.random_valid(rng, START_ATTEMPTS) {
                let vein = canvas.open_instance(brush);
                canvas.paint(x, y, &brush.mineral, vein);
            }
        }
        return;
    }

    let traces = (brush.instance_count / 4).clamp(1, MAX_FAULT_TRACES);
    for _ in 0..traces {
        let Some((sx, sy)) = canvas.random_valid(rng, START_ATTEMPTS) else {
            continue;
        };
        let vein = canvas.open_instance(brush);
        let length = (10.0 + brush.size * 10.0) as u32;
        let mut angle = rng.gen_range(0.0..std::f64::consts::TAU);
        let (mut x, mut y) = (sx as f64, sy as f64);
        let mut until_turn = rng.gen_range(2..5);
        for _ in 0..length {
            if rng.gen_bool(FAULT_FILL) {
                canvas.paint(x.round() as i32, y.round() as i32, &brush.mineral, vein);
            }
            until_turn -= 1;
            if until_turn == 0 {
                let turn = rng.gen_range(0.5..1.2);
                angle += if rng.gen_bool(0.5) { turn } else { -turn };
                until_turn = rng.gen_range(2..5);
            }
            x += angle.cos();
            y += angle.sin();
        }
    }
}

/// Corridors of a randomized Prim's maze laid over a coarse grid.
pub(super) fn maze<R: Rng + ?Sized>(canvas: &mut VeinCanvas<'_>, brush: &VeinBrush, rng: &mut R) {
    let dims = *canvas.dims();
    let patches = brush.instance_count.div_ceil(4).clamp(1, 4);
    let step = (5.0 - brush.size.round()).clamp(2.0, 4.0) as i32;
    let n = (4.0 + brush.size * 2.0).clamp(4.0, 12.0) as i32;
    let span = (n - 1) * step;

    for _ in 0..patches {
        let Some((cx, cy)) = canvas.random_valid(rng, START_ATTEMPTS) else {
            continue;
        };
        let vein = canvas.open_instance(brush);
        let ox = (cx - span / 2).clamp(0, (dims.width as i32 - span - 1).max(0));
        let oy = (cy - span / 2).clamp(dims.air_gap as i32, (dims.depth as i32 - span - 1).max(dims.air_gap as i32));

        for ((ax, ay), (bx, by)) in prim_passages(n, rng) {
            let (x0, y0) = (ox + ax * step, oy + ay * step);
            let (x1, y1) = (ox + bx * step, oy + by * step);
            for k in 0..=step {
                let x = x0 + (x1 - x0) * k / step;
                let y = y0 + (y1 - y0) * k / step;
                canvas.paint(x, y, &brush.mineral, vein);
            }
        }
    }
}

type MazeCell = (i32, i32);

/// Passages of a spanning tree over an `n` by `n` maze.
fn prim_passages<R: Rng + ?Sized>(n: i32, rng: &mut R) -> Vec<(MazeCell, MazeCell)> {
    let mut visited = vec![false; (n * n) as usize];
    let idx = |(x, y): MazeCell| (y * n + x) as usize;
    let mut frontier: Vec<(MazeCell, MazeCell)> = Vec::new();
    let mut passages = Vec::new();

    let push_walls = |cell: MazeCell, frontier: &mut Vec<(MazeCell, MazeCell)>| {
        for (dx, dy) in crate::grid::CARDINALS {
            let next = (cell.0 + dx, cell.1 + dy);
            if (0..n).contains(&next.0) && (0..n).contains(&next.1) {
                frontier.push((cell, next));
            }
        }
    };

    let start = (rng.gen_range(0..n), rng.gen_range(0..n));
    visited[idx(start)] = true;
    push_walls(start, &mut frontier);

    while !frontier.is_empty() {
        let (from, to) = frontier.swap_remove(rng.gen_range(0..frontier.len()));
        if visited[idx(to)] {
            continue;
        }
        visited[idx(to)] = true;
        passages.push((from, to));
        push_walls(to, &mut frontier);
    }
    passages
}

#[cfg(test)]
mod tests {
    use super::super::testing::Fixture;
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn prim_builds_a_spanning_tree() {
        let mut rng = StdRng::seed_from_u64(1);
        let passages = prim_passages(6, &mut rng);
        assert_eq!(passages.len(), 35);
        for (a, b) in passages {
            assert_eq!((a.0 - b.0).abs() + (a.1 - b.1).abs(), 1);
        }
    }

    #[test]
    fn dense_faults_draw_traces() {
        let mut fx = Fixture::new(64);
        let brush = fx.brush(3.0, 2.0);
        let mut rng = StdRng::seed_from_u64(10);
        faults(&mut fx.canvas(), &brush, &mut rng);
        assert!(fx.provenance.instances().len() <= MAX_FAULT_TRACES as usize);
        assert!(fx.painted() > MAX_FAULT_PIXELS as usize);
    }

    #[test]
    fn scattered_clusters_are_compact() {
        let mut fx = Fixture::new(64);
        let brush = fx.brush(0.001, 1.0);
        let mut rng = StdRng::seed_from_u64(11);
        scattered(&mut fx.canvas(), &brush, &mut rng);
        let cells = fx.provenance.cells_of(0);
        assert!(!cells.is_empty());
        let (x0, y0) = cells[0];
        for (x, y) in cells {
            assert!((x - x0).abs() <= 6 && (y - y0).abs() <= 6);
        }
    }
}
