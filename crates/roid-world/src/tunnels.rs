//! Thin wandering tunnels.
//!
//! Each tunnel is one random walker. Branching is a sharp heading change at a
//! segment boundary, not a forked walker.

use std::f64::consts::{FRAC_PI_3, TAU};

use rand::Rng;
use tracing::debug;

use crate::config::TunnelConfig;
use crate::grid::{CellMask, CARDINALS};
use crate::holes::INTERIOR_CLEARANCE;
use crate::shape::AsteroidShape;

const START_ATTEMPTS: u32 = 30;
/// Chance of widening a step by one adjacent cell.
const WIDEN_CHANCE: f64 = 0.3;

/// Walk every configured tunnel; returns the set of carved cells.
pub fn generate_tunnels<R: Rng + ?Sized>(
    shape: &AsteroidShape,
    config: &TunnelConfig,
    rng: &mut R,
) -> CellMask {
    let dims = *shape.dims();
    let mut cells = CellMask::new(dims.width, dims.depth);
    let count = config.count.roll(rng);
    let segment_length = config.segment_length.clamp(1, 200);
    let segments = config.max_branches.min(32) + 1;

    let min_y = (dims.air_gap + INTERIOR_CLEARANCE) as f64;
    let max_y = dims.depth.saturating_sub(2) as f64;
    let max_x = dims.width.saturating_sub(2) as f64;
    let (center_x, center_y) = shape.center();

    for _ in 0..count {
        let Some((mut x, mut y)) = pick_start(shape, min_y as i32, rng) else {
            continue;
        };
        let angle = rng.gen_range(0.0..TAU);
        let (mut hx, mut hy) = (angle.cos(), angle.sin());

        for _ in 0..segments {
            for _ in 0..segment_length {
                hx += rng.gen_range(-1.0..1.0) * config.wander_strength;
                hy += rng.gen_range(-1.0..1.0) * config.wander_strength;
                let len = (hx * hx + hy * hy).sqrt();
                if len < 1e-6 {
                    let angle = rng.gen_range(0.0..TAU);
                    (hx, hy) = (angle.cos(), angle.sin());
                } else {
                    (hx, hy) = (hx / len, hy / len);
                }

                x = (x + hx).clamp(1.0, max_x.max(1.0));
                y = (y + hy).clamp(min_y, max_y.max(min_y));
                let (cx, cy) = (x.round() as i32, y.round() as i32);

                if !shape.is_solid(cx, cy) {
                    // steer back toward the body
                    let (tx, ty) = (center_x - x, center_y - y);
                    let tlen = (tx * tx + ty * ty).sqrt().max(1e-6);
                    (hx, hy) = (tx / tlen, ty / tlen);
                    continue;
                }
                cells.insert(cx, cy);

                if rng.gen_bool(WIDEN_CHANCE) {
                    let (dx, dy) = CARDINALS[rng.gen_range(0..CARDINALS.len())];
                    if shape.is_solid(cx + dx, cy + dy) && cy + dy >= min_y as i32 {
                        cells.insert(cx + dx, cy + dy);
                    }
                }
            }

            if rng.gen::<f64>() < config.branch_probability {
                let turn = rng.gen_range(FRAC_PI_3..2.0 * FRAC_PI_3);
                let turn = if rng.gen_bool(0.5) { turn } else { -turn };
                let angle = hy.atan2(hx) + turn;
                (hx, hy) = (angle.cos(), angle.sin());
            }
        }
    }

    debug!("Carved {count} tunnels over {} cells", cells.len());
    cells
}

fn pick_start<R: Rng + ?Sized>(shape: &AsteroidShape, min_y: i32, rng: &mut R) -> Option<(f64, f64)> {
    let dims = shape.dims();
    for _ in 0..START_ATTEMPTS {
        let x = rng.gen_range(0..dims.width as i32);
        let y = rng.gen_range(min_y.min(dims.depth as i32 - 1)..dims.depth as i32);
        if shape.has_margin(x, y, 2) {
            return Some((x as f64, y as f64));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Budget, SizeSpec, WorldConfig};
    use crate::dimensions::Dimensions;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn shape(size: u32) -> AsteroidShape {
        let mut cfg = WorldConfig::with_ground("white", vec![]);
        cfg.size = SizeSpec::Base(size);
        AsteroidShape::new(Dimensions::resolve(&cfg))
    }

    #[test]
    fn no_tunnels_when_count_is_zero() {
        let s = shape(64);
        let mut rng = StdRng::seed_from_u64(1);
        let cells = generate_tunnels(&s, &TunnelConfig::default(), &mut rng);
        assert!(cells.is_empty());
    }

    #[test]
    fn tunnels_stay_inside_body() {
        let s = shape(64);
        let config = TunnelConfig {
            count: Budget::fixed(4),
            branch_probability: 0.5,
            max_branches: 3,
            segment_length: 15,
            wander_strength: 0.4,
        };
        let mut rng = StdRng::seed_from_u64(11);
        let cells = generate_tunnels(&s, &config, &mut rng);
        assert!(!cells.is_empty());
        let min_y = (s.dims().air_gap + INTERIOR_CLEARANCE) as i32;
        for (x, y) in cells.iter() {
            assert!(s.is_solid(x, y), "tunnel cell ({x}, {y}) outside body");
            assert!(y >= min_y);
        }
    }

    #[test]
    fn tunnels_are_sparse() {
        let s = shape(64);
        let config = TunnelConfig {
            count: Budget::fixed(2),
            ..TunnelConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(2);
        let cells = generate_tunnels(&s, &config, &mut rng);
        // 2 tunnels * 3 segments * 12 steps, at most doubled by widening
        assert!(cells.len() <= 2 * 3 * 12 * 2);
    }

    #[test]
    fn same_seed_same_tunnels() {
        let s = shape(48);
        let config = TunnelConfig {
            count: Budget::fixed(3),
            ..TunnelConfig::default()
        };
        let a = generate_tunnels(&s, &config, &mut StdRng::seed_from_u64(8));
        let b = generate_tunnels(&s, &config, &mut StdRng::seed_from_u64(8));
        assert_eq!(a, b);
    }
}
