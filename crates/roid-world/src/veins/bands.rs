//! Horizontal banding: strata, curved streams and noisy wavy bands.

use rand::Rng;

use super::{VeinBrush, VeinCanvas};
use crate::noise::OctaveNoise;

const STRATA_FILL: f64 = 0.8;

/// Horizontal strata with a small gap probability.
pub(super) fn layered<R: Rng + ?Sized>(canvas: &mut VeinCanvas<'_>, brush: &VeinBrush, rng: &mut R) {
    let dims = *canvas.dims();
    let body = dims.body_depth().max(1);
    let bands = brush.instance_count.clamp(1, (body / 3).max(1));
    let thickness = brush.size.round().max(1.0) as i32;

    for _ in 0..bands {
        let vein = canvas.open_instance(brush);
        let margin = (body / 10) as i32;
        let lo = dims.air_gap as i32 + margin;
        let hi = (dims.depth as i32 - margin - thickness).max(lo + 1);
        let top = rng.gen_range(lo..hi);
        for y in top..top + thickness {
            for x in 0..dims.width as i32 {
                if rng.gen_bool(STRATA_FILL) {
                    canvas.paint(x, y, &brush.mineral, vein);
                }
            }
        }
    }
}

/// Parallel sinusoidal streams sharing one wave, jittered with noise.
pub(super) fn flow<R: Rng + ?Sized>(canvas: &mut VeinCanvas<'_>, brush: &VeinBrush, rng: &mut R) {
    let dims = *canvas.dims();
    let streams = brush.instance_count.clamp(1, 12);
    let amplitude = 2.0 + brush.size * 1.5;
    let frequency = rng.gen_range(0.05..0.15);
    let phase = rng.gen_range(0.0..std::f64::consts::TAU);
    let half = (brush.size * 0.5).max(0.5);
    let noise = OctaveNoise::new(rng.gen(), 2, 2.0, 0.5);
    let spacing = dims.body_depth() as f64 / (streams + 1) as f64;

    for s in 0..streams {
        let vein = canvas.open_instance(brush);
        let base = dims.air_gap as f64 + spacing * (s + 1) as f64 + rng.gen_range(-1.0..1.0);
        for x in 0..dims.width as i32 {
            let xf = x as f64;
            let center = base + amplitude * (xf * frequency + phase).sin() + noise.sample(xf * 0.1, base * 0.1) * 1.5;
            let (lo, hi) = ((center - half).round() as i32, (center + half).round() as i32);
            for y in lo..=hi {
                canvas.paint(x, y, &brush.mineral, vein);
            }
        }
    }
}

/// Wavy bands whose edges fade out with distance from the band centre line.
pub(super) fn noise_bands<R: Rng + ?Sized>(canvas: &mut VeinCanvas<'_>, brush: &VeinBrush, rng: &mut R) {
    let dims = *canvas.dims();
    let bands = brush.instance_count.clamp(1, 10);
    let half = (1.0 + brush.size) as i32;
    let amplitude = 2.0 + brush.size;
    let noise = OctaveNoise::new(rng.gen(), 3, 2.0, 0.5);

    for b in 0..bands {
        let vein = canvas.open_instance(brush);
        let base = rng.gen_range(dims.air_gap as f64..dims.depth as f64);
        let frequency = rng.gen_range(0.04..0.1);
        let phase = rng.gen_range(0.0..std::f64::consts::TAU);
        for x in 0..dims.width as i32 {
            let xf = x as f64;
            let wave = amplitude * (xf * frequency + phase).sin();
            let jitter = noise.sample(xf * 0.3, b as f64 * 7.1) * 2.0;
            let center = (base + wave + jitter).round() as i32;
            for dy in -half..=half {
                let fade = 1.0 - dy.abs() as f64 / (half + 1) as f64;
                if rng.gen_bool(fade * 0.9) {
                    canvas.paint(x, center + dy, &brush.mineral, vein);
                }
            }
        }
    }
}
