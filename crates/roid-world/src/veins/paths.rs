//! Walker-based veins: organic paths, branching trees, jagged bolts and
//! downward seepage.

use std::f64::consts::{FRAC_PI_2, TAU};

use rand::Rng;

use super::{VeinBrush, VeinCanvas};
use crate::grid::{CellMask, Pos};

const START_ATTEMPTS: u32 = 30;

const FRACTAL_BRANCH_CHANCE: f64 = 0.15;
const FRACTAL_MAX_DEPTH: u32 = 3;
const LIGHTNING_BRANCH_CHANCE: f64 = 0.3;
const LIGHTNING_MAX_DEPTH: u32 = 4;
/// Hard cap on queued branches per tree.
const MAX_BRANCHES: usize = 64;

/// Smoothly wandering paths, one per instance.
pub(super) fn organic<R: Rng + ?Sized>(canvas: &mut VeinCanvas<'_>, brush: &VeinBrush, rng: &mut R) {
    let radius = brush.stroke_radius();
    for _ in 0..brush.instance_count {
        let Some((sx, sy)) = canvas.random_valid(rng, START_ATTEMPTS) else {
            continue;
        };
        let vein = canvas.open_instance(brush);
        let length = (brush.size * 12.0 + rng.gen_range(6.0..18.0)) as u32;
        let mut angle = rng.gen_range(0.0..TAU);
        let (mut x, mut y) = (sx as f64, sy as f64);

        for _ in 0..length {
            canvas.stamp(x, y, radius, &brush.mineral, vein);
            angle += rng.gen_range(-0.45..0.45);
            x += angle.cos();
            y += angle.sin();
            if !canvas.dims().in_bounds(x.round() as i32, y.round() as i32) {
                break;
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Branch {
    x: f64,
    y: f64,
    angle: f64,
    length: f64,
    radius: f64,
    depth: u32,
}

/// Recursive trees walked with an explicit work stack. Children are thinner
/// and shorter than their parent.
pub(super) fn fractal<R: Rng + ?Sized>(canvas: &mut VeinCanvas<'_>, brush: &VeinBrush, rng: &mut R) {
    let trees = brush.instance_count.div_ceil(3).max(1);
    for _ in 0..trees {
        let Some((sx, sy)) = canvas.random_valid(rng, START_ATTEMPTS) else {
            continue;
        };
        let vein = canvas.open_instance(brush);
        let mut stack = vec![Branch {
            x: sx as f64,
            y: sy as f64,
            angle: rng.gen_range(0.0..TAU),
            length: brush.size * 14.0 + 10.0,
            radius: brush.stroke_radius().max(0.6),
            depth: 0,
        }];
        let mut queued = 1;

        while let Some(mut b) = stack.pop() {
            for _ in 0..b.length as u32 {
                canvas.stamp(b.x, b.y, b.radius, &brush.mineral, vein);
                b.angle += rng.gen_range(-0.25..0.25);
                b.x += b.angle.cos();
                b.y += b.angle.sin();
                if !canvas.dims().in_bounds(b.x.round() as i32, b.y.round() as i32) {
                    break;
                }
                if b.depth < FRACTAL_MAX_DEPTH
                    && queued < MAX_BRANCHES
                    && rng.gen_bool(FRACTAL_BRANCH_CHANCE)
                {
                    let turn = rng.gen_range(0.4..1.0);
                    let turn = if rng.gen_bool(0.5) { turn } else { -turn };
                    stack.push(Branch {
                        angle: b.angle + turn,
                        length: b.length * 0.6,
                        radius: b.radius * 0.6,
                        depth: b.depth + 1,
                        ..b
                    });
                    queued += 1;
                }
            }
        }
    }
}

/// Jagged bolts: straight segments with abrupt heading changes, forking at
/// segment ends. Bolts lean downward.
pub(super) fn lightning<R: Rng + ?Sized>(canvas: &mut VeinCanvas<'_>, brush: &VeinBrush, rng: &mut R) {
    let bolts = brush.instance_count.div_ceil(4).max(1);
    for _ in 0..bolts {
        let Some((sx, sy)) = canvas.random_valid(rng, START_ATTEMPTS) else {
            continue;
        };
        let vein = canvas.open_instance(brush);
        let mut stack = vec![Branch {
            x: sx as f64,
            y: sy as f64,
            angle: FRAC_PI_2 + rng.gen_range(-0.6..0.6),
            length: brush.size * 12.0 + 15.0,
            radius: brush.stroke_radius(),
            depth: 0,
        }];
        let mut queued = 1;

        while let Some(mut b) = stack.pop() {
            let mut walked = 0.0;
            'bolt: while walked < b.length {
                let segment = rng.gen_range(3..8);
                for _ in 0..segment {
                    canvas.stamp(b.x, b.y, b.radius, &brush.mineral, vein);
                    b.x += b.angle.cos();
                    b.y += b.angle.sin();
                    walked += 1.0;
                    if !canvas.dims().in_bounds(b.x.round() as i32, b.y.round() as i32) {
                        break 'bolt;
                    }
                }
                // zig-zag around the downward axis
                let jump = rng.gen_range(0.4..1.1);
                let toward = if b.angle > FRAC_PI_2 { -jump } else { jump };
                b.angle = (b.angle + toward).clamp(0.2, std::f64::consts::PI - 0.2);

                if b.depth < LIGHTNING_MAX_DEPTH
                    && queued < MAX_BRANCHES
                    && rng.gen_bool(LIGHTNING_BRANCH_CHANCE)
                {
                    stack.push(Branch {
                        angle: b.angle + rng.gen_range(-0.9..0.9),
                        length: (b.length - walked) * 0.5,
                        radius: b.radius * 0.5,
                        depth: b.depth + 1,
                        ..b
                    });
                    queued += 1;
                }
            }
        }
    }
}

/// Step weights for seepage: down, left, right, up.
const SEEP_STEPS: [(Pos, f64); 4] = [((0, 1), 0.45), ((-1, 0), 0.2), ((1, 0), 0.2), ((0, -1), 0.15)];

/// Downward-biased walkers that never revisit a cell.
pub(super) fn percolation<R: Rng + ?Sized>(canvas: &mut VeinCanvas<'_>, brush: &VeinBrush, rng: &mut R) {
    let dims = *canvas.dims();
    let (_, center_y) = canvas.shape().center();
    for _ in 0..brush.instance_count {
        // start in the upper half of the body
        let mut start = None;
        for _ in 0..START_ATTEMPTS {
            let x = rng.gen_range(0..dims.width as i32);
            let y = rng.gen_range(dims.air_gap as i32..=center_y as i32);
            if canvas.is_valid(x, y) {
                start = Some((x, y));
                break;
            }
        }
        let Some((mut x, mut y)) = start else {
            continue;
        };
        let vein = canvas.open_instance(brush);
        let mut visited = CellMask::new(dims.width, dims.depth);
        let steps = (brush.size * 20.0 + 20.0) as u32;

        for _ in 0..steps {
            canvas.paint(x, y, &brush.mineral, vein);
            visited.insert(x, y);

            let mut next = None;
            for _ in 0..6 {
                let (dx, dy) = pick_step(rng);
                let (nx, ny) = (x + dx, y + dy);
                if !visited.contains(nx, ny) && canvas.is_valid(nx, ny) {
                    next = Some((nx, ny));
                    break;
                }
            }
            match next {
                Some(p) => (x, y) = p,
                None => break,
            }
        }
    }
}

fn pick_step<R: Rng + ?Sized>(rng: &mut R) -> Pos {
    let mut roll = rng.gen::<f64>();
    for (step, weight) in SEEP_STEPS {
        if roll < weight {
            return step;
        }
        roll -= weight;
    }
    SEEP_STEPS[0].0
}
