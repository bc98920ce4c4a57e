//! Seeded 2D gradient noise and its fractal sum.
//!
//! Used for the ragged edges of banded vein patterns. The seed is drawn from
//! the generation RNG, so noise is as reproducible as the rest of the world.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

const DIAG: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// Eight unit gradients around the compass.
const GRADIENTS: [(f64, f64); 8] = [
    (1.0, 0.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (0.0, -1.0),
    (DIAG, DIAG),
    (-DIAG, DIAG),
    (DIAG, -DIAG),
    (-DIAG, -DIAG),
];

/// Offset between octaves so they do not share lattice points.
const OCTAVE_SHIFT: f64 = 37.71;

fn quintic(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn mix(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Classic 2D Perlin noise over a shuffled 256-entry lattice.
#[derive(Debug, Clone)]
pub struct Perlin2 {
    lattice: [u8; 512],
}

impl Perlin2 {
    pub fn new(seed: u64) -> Self {
        let mut lattice = [0u8; 512];
        for (i, slot) in lattice[..256].iter_mut().enumerate() {
            *slot = i as u8;
        }
        lattice[..256].shuffle(&mut StdRng::seed_from_u64(seed));
        let (low, high) = lattice.split_at_mut(256);
        high.copy_from_slice(low);
        Self { lattice }
    }

    fn corner(&self, cx: i32, cy: i32, dx: f64, dy: f64) -> f64 {
        let hx = self.lattice[(cx & 255) as usize] as usize;
        let (gx, gy) = GRADIENTS[self.lattice[hx + (cy & 255) as usize] as usize & 7];
        gx * dx + gy * dy
    }

    /// Noise at `(x, y)`, within about `[-1, 1]`; zero on lattice points.
    pub fn at(&self, x: f64, y: f64) -> f64 {
        let (fx, fy) = (x.floor(), y.floor());
        let (cx, cy) = (fx as i32, fy as i32);
        let (dx, dy) = (x - fx, y - fy);

        let top = mix(
            self.corner(cx, cy, dx, dy),
            self.corner(cx + 1, cy, dx - 1.0, dy),
            quintic(dx),
        );
        let bottom = mix(
            self.corner(cx, cy + 1, dx, dy - 1.0),
            self.corner(cx + 1, cy + 1, dx - 1.0, dy - 1.0),
            quintic(dx),
        );
        // the 2D peak is sqrt(0.5)
        mix(top, bottom, quintic(dy)) * std::f64::consts::SQRT_2
    }
}

/// Fractal sum of one [`Perlin2`] lattice sampled at rising frequencies.
#[derive(Debug, Clone)]
pub struct OctaveNoise {
    base: Perlin2,
    octaves: u32,
    lacunarity: f64,
    gain: f64,
}

impl OctaveNoise {
    pub fn new(seed: u64, octaves: u32, lacunarity: f64, gain: f64) -> Self {
        Self {
            base: Perlin2::new(seed),
            octaves,
            lacunarity,
            gain,
        }
    }

    /// Normalised by the summed amplitudes, so within about `[-1, 1]`.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let (mut total, mut weight) = (0.0, 0.0);
        let (mut amplitude, mut scale) = (1.0, 1.0);
        for octave in 0..self.octaves {
            let shift = octave as f64 * OCTAVE_SHIFT;
            total += amplitude * self.base.at(x * scale + shift, y * scale - shift);
            weight += amplitude;
            amplitude *= self.gain;
            scale *= self.lacunarity;
        }
        if weight > 0.0 {
            total / weight
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_field() {
        let (a, b) = (Perlin2::new(42), Perlin2::new(42));
        for step in 0..64 {
            let (x, y) = (step as f64 * 0.41, step as f64 * -0.29);
            assert_eq!(a.at(x, y), b.at(x, y));
        }
    }

    #[test]
    fn seeds_differ() {
        let (a, b) = (Perlin2::new(1), Perlin2::new(2));
        let differs = (0..64).any(|s| {
            let x = s as f64 * 0.77 + 0.5;
            a.at(x, 0.5) != b.at(x, 0.5)
        });
        assert!(differs);
    }

    #[test]
    fn stays_in_range() {
        let n = Perlin2::new(2024);
        for step in 0..5000 {
            let x = step as f64 * 0.173 - 400.0;
            let y = step as f64 * 0.311 - 250.0;
            let v = n.at(x, y);
            assert!(v.abs() <= 1.01, "noise {v} out of range at ({x}, {y})");
        }
    }

    #[test]
    fn vanishes_on_lattice() {
        let n = Perlin2::new(7);
        for i in -4..4 {
            assert_eq!(n.at(i as f64, (2 * i) as f64), 0.0);
        }
    }

    #[test]
    fn octaves_are_bounded_and_smooth() {
        let noise = OctaveNoise::new(11, 3, 2.0, 0.5);
        let mut previous = noise.sample(0.0, 3.3);
        for step in 1..400 {
            let v = noise.sample(step as f64 * 0.01, 3.3);
            assert!(v.abs() <= 1.01);
            assert!((v - previous).abs() < 0.2, "jump of {} at step {step}", v - previous);
            previous = v;
        }
    }
}
