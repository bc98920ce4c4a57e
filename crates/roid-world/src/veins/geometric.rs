//! Veins with regular geometry anchored on the body or on random centres.

use std::f64::consts::TAU;

use rand::seq::SliceRandom;
use rand::Rng;

use super::{VeinBrush, VeinCanvas};

const START_ATTEMPTS: u32 = 30;
const RING_FILL: f64 = 0.75;
const LINE_FILL: f64 = 0.85;
/// Radial growth of a spiral arm per unit of angle.
const SPIRAL_TWIST: f64 = 0.1;

/// Spokes from the body centre to near the surface.
pub(super) fn radial<R: Rng + ?Sized>(canvas: &mut VeinCanvas<'_>, brush: &VeinBrush, rng: &mut R) {
    let (cx, cy) = canvas.shape().center();
    let (hx, hy) = canvas.shape().half_axes();
    let spokes = brush.instance_count.clamp(3, 24);
    let base = rng.gen_range(0.0..TAU);
    let radius = brush.stroke_radius();

    for i in 0..spokes {
        let vein = canvas.open_instance(brush);
        let angle = base + i as f64 * TAU / spokes as f64 + rng.gen_range(-0.15..0.15);
        let (dx, dy) = (angle.cos(), angle.sin());
        // distance to the ellipse edge along this direction
        let reach = 1.0 / ((dx / hx).powi(2) + (dy / hy).powi(2)).sqrt();
        let length = reach * rng.gen_range(0.55..0.95);
        let mut r = 2.0;
        while r < length {
            canvas.stamp(cx + dx * r, cy + dy * r, radius, &brush.mineral, vein);
            r += 0.7;
        }
    }
}

/// Rings around a few random centres. Each ring is its own instance.
pub(super) fn concentric<R: Rng + ?Sized>(canvas: &mut VeinCanvas<'_>, brush: &VeinBrush, rng: &mut R) {
    let centers = brush.instance_count.div_ceil(6).clamp(1, 8);
    let rings = (brush.instance_count / 3).clamp(1, 6) as i32;
    let spacing = 3.0 + brush.size * 2.0;
    let half_width = 0.4 + brush.size * 0.3;

    for _ in 0..centers {
        let Some((ox, oy)) = canvas.random_valid(rng, START_ATTEMPTS) else {
            continue;
        };
        for ring in 1..=rings {
            let vein = canvas.open_instance(brush);
            let r = ring as f64 * spacing;
            let reach = (r + half_width).ceil() as i32;
            for y in oy - reach..=oy + reach {
                for x in ox - reach..=ox + reach {
                    let d = (((x - ox).pow(2) + (y - oy).pow(2)) as f64).sqrt();
                    if (d - r).abs() <= half_width && rng.gen_bool(RING_FILL) {
                        canvas.paint(x, y, &brush.mineral, vein);
                    }
                }
            }
        }
    }
}

/// Jittered vertical and horizontal lines on an even lattice.
pub(super) fn lattice<R: Rng + ?Sized>(canvas: &mut VeinCanvas<'_>, brush: &VeinBrush, rng: &mut R) {
    let dims = *canvas.dims();
    let spacing = (12.0 - brush.size * 2.0).clamp(4.0, 12.0) as i32;
    let lines = brush.instance_count.max(2);
    let vertical = lines.div_ceil(2) as i32;
    let horizontal = (lines / 2).max(1) as i32;
    let (width, top, bottom) = (dims.width as i32, dims.air_gap as i32, dims.depth as i32);

    let origin_x = ((width - (vertical - 1) * spacing) / 2).max(0) + rng.gen_range(-spacing / 2..=spacing / 2);
    for k in 0..vertical {
        let vein = canvas.open_instance(brush);
        let x = origin_x + k * spacing;
        for y in top..bottom {
            let jitter = if rng.gen_bool(0.2) { rng.gen_range(-1..=1) } else { 0 };
            if rng.gen_bool(LINE_FILL) {
                canvas.paint(x + jitter, y, &brush.mineral, vein);
            }
        }
    }

    let body = bottom - top;
    let origin_y = top + ((body - (horizontal - 1) * spacing) / 2).max(0) + rng.gen_range(-spacing / 2..=spacing / 2);
    for k in 0..horizontal {
        let vein = canvas.open_instance(brush);
        let y = origin_y + k * spacing;
        for x in 0..width {
            let jitter = if rng.gen_bool(0.2) { rng.gen_range(-1..=1) } else { 0 };
            if rng.gen_bool(LINE_FILL) {
                canvas.paint(x, y + jitter, &brush.mineral, vein);
            }
        }
    }
}

/// Arms winding out from the body centre.
pub(super) fn spiral<R: Rng + ?Sized>(canvas: &mut VeinCanvas<'_>, brush: &VeinBrush, rng: &mut R) {
    let (cx, cy) = canvas.shape().center();
    let (hx, hy) = canvas.shape().half_axes();
    let arms = brush.instance_count.clamp(1, 8);
    let offset = rng.gen_range(0.0..TAU);
    let max_r = hx.max(hy);
    let squash = hy / hx.max(1.0);
    let radius = brush.stroke_radius();

    for arm in 0..arms {
        let vein = canvas.open_instance(brush);
        let base = offset + arm as f64 * TAU / arms as f64 + rng.gen_range(-0.2..0.2);
        let mut r = 1.0;
        while r < max_r {
            let angle = base + r * SPIRAL_TWIST;
            canvas.stamp(cx + angle.cos() * r, cy + angle.sin() * r * squash, radius, &brush.mineral, vein);
            r += 0.5;
        }
    }
}

/// Honeycomb walls: circular outlines stamped around hex-lattice centres.
pub(super) fn cellular<R: Rng + ?Sized>(canvas: &mut VeinCanvas<'_>, brush: &VeinBrush, rng: &mut R) {
    let dims = *canvas.dims();
    let cell = 6.0 + brush.size * 4.0;
    let row_step = cell * 0.866;
    let wall = brush.stroke_radius() * 0.5;

    let mut centers = Vec::new();
    let mut row = 0;
    let mut y = dims.air_gap as f64 + rng.gen_range(0.0..row_step);
    while y < dims.depth as f64 {
        let shift = if row % 2 == 1 { cell / 2.0 } else { 0.0 };
        let mut x = shift + rng.gen_range(0.0..1.0);
        while x < dims.width as f64 {
            if canvas.shape().is_solid(x.round() as i32, y.round() as i32) {
                centers.push((x, y));
            }
            x += cell;
        }
        y += row_step;
        row += 1;
    }
    centers.shuffle(rng);
    centers.truncate(brush.instance_count.max(1) as usize);

    let r = cell / 2.0;
    let steps = (TAU * r * 1.5).ceil() as u32;
    for (ox, oy) in centers {
        let vein = canvas.open_instance(brush);
        for step in 0..steps {
            let angle = step as f64 / steps as f64 * TAU;
            canvas.stamp(ox + angle.cos() * r, oy + angle.sin() * r, wall, &brush.mineral, vein);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::Fixture;
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn radial_has_at_least_three_spokes() {
        let mut fx = Fixture::new(64);
        let brush = fx.brush(0.001, 1.0);
        let mut rng = StdRng::seed_from_u64(2);
        radial(&mut fx.canvas(), &brush, &mut rng);
        assert_eq!(fx.provenance.instances().len(), 3);
    }

    #[test]
    fn radial_spokes_leave_the_centre() {
        let mut fx = Fixture::new(64);
        let brush = fx.brush(1.0, 1.0);
        let mut rng = StdRng::seed_from_u64(6);
        radial(&mut fx.canvas(), &brush, &mut rng);
        let (cx, cy) = fx.shape.center();
        let far = fx
            .provenance
            .cells_of(0)
            .into_iter()
            .map(|(x, y)| ((x as f64 - cx).powi(2) + (y as f64 - cy).powi(2)).sqrt())
            .fold(0.0, f64::max);
        assert!(far > 8.0);
    }

    #[test]
    fn concentric_rings_scale_with_instances() {
        let mut fx = Fixture::new(64);
        let brush = fx.brush(2.0, 1.0);
        let mut rng = StdRng::seed_from_u64(4);
        concentric(&mut fx.canvas(), &brush, &mut rng);
        let rings = (brush.instance_count / 3).clamp(1, 6) as usize;
        assert_eq!(fx.provenance.instances().len() % rings, 0);
    }

    #[test]
    fn lattice_paints_whole_lines() {
        let mut fx = Fixture::new(64);
        let brush = fx.brush(1.0, 1.0);
        let mut rng = StdRng::seed_from_u64(12);
        lattice(&mut fx.canvas(), &brush, &mut rng);
        let longest = fx
            .provenance
            .instances()
            .iter()
            .map(|inst| fx.provenance.cells_of(inst.index).len())
            .max()
            .unwrap_or(0);
        assert!(longest > 20);
    }

    #[test]
    fn cellular_limits_cell_count() {
        let mut fx = Fixture::new(96);
        let brush = fx.brush(0.5, 1.0);
        let mut rng = StdRng::seed_from_u64(8);
        cellular(&mut fx.canvas(), &brush, &mut rng);
        assert!(fx.provenance.instances().len() <= brush.instance_count as usize);
    }
}
