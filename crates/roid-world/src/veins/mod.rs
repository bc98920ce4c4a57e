//! Geological formation: base ground fill and vein overlays.
//!
//! Every solid cell that is not a hole or tunnel gets the base mineral. Each
//! configured vein is then painted with one of fifteen pattern algorithms.
//! Painted cells are tagged in the [`Provenance`] layer with the vein instance
//! that produced them so crystals can be correlated back to their vein.

mod bands;
mod geometric;
mod paths;
mod sparse;

use rand::Rng;
use tracing::{debug, warn};

use crate::config::VeinSpec;
use crate::dimensions::Dimensions;
use crate::grid::{Cell, CellMask, Grid, Ground, Provenance};
use crate::shape::AsteroidShape;

/// Vein pattern algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VeinPattern {
    Organic,
    Fractal,
    Layered,
    Radial,
    Scattered,
    Concentric,
    Grid,
    Spiral,
    Faults,
    Lightning,
    Cellular,
    Flow,
    Percolation,
    Maze,
    NoiseBands,
}

impl VeinPattern {
    pub const ALL: [VeinPattern; 15] = [
        VeinPattern::Organic,
        VeinPattern::Fractal,
        VeinPattern::Layered,
        VeinPattern::Radial,
        VeinPattern::Scattered,
        VeinPattern::Concentric,
        VeinPattern::Grid,
        VeinPattern::Spiral,
        VeinPattern::Faults,
        VeinPattern::Lightning,
        VeinPattern::Cellular,
        VeinPattern::Flow,
        VeinPattern::Percolation,
        VeinPattern::Maze,
        VeinPattern::NoiseBands,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        let pattern = match name.trim().to_ascii_lowercase().as_str() {
            "organic" => Self::Organic,
            "fractal" => Self::Fractal,
            "layered" => Self::Layered,
            "radial" => Self::Radial,
            "scattered" => Self::Scattered,
            "concentric" => Self::Concentric,
            "grid" => Self::Grid,
            "spiral" => Self::Spiral,
            "faults" => Self::Faults,
            "lightning" => Self::Lightning,
            "cellular" => Self::Cellular,
            "flow" => Self::Flow,
            "percolation" => Self::Percolation,
            "maze" => Self::Maze,
            "noise_bands" => Self::NoiseBands,
            _ => return None,
        };
        Some(pattern)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Organic => "organic",
            Self::Fractal => "fractal",
            Self::Layered => "layered",
            Self::Radial => "radial",
            Self::Scattered => "scattered",
            Self::Concentric => "concentric",
            Self::Grid => "grid",
            Self::Spiral => "spiral",
            Self::Faults => "faults",
            Self::Lightning => "lightning",
            Self::Cellular => "cellular",
            Self::Flow => "flow",
            Self::Percolation => "percolation",
            Self::Maze => "maze",
            Self::NoiseBands => "noise_bands",
        }
    }

    /// Like [`VeinPattern::from_name`], but unknown names become organic.
    pub fn resolve(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            warn!("Unknown vein pattern '{name}', falling back to organic");
            Self::Organic
        })
    }
}

// ---------------------------------------------------------------------------
// Canvas
// ---------------------------------------------------------------------------

/// Paint target shared by every pattern: the grid, the provenance layer, and
/// the masks that decide whether a cell may take a vein.
pub struct VeinCanvas<'a> {
    grid: &'a mut Grid,
    provenance: &'a mut Provenance,
    shape: &'a AsteroidShape,
    holes: &'a CellMask,
    tunnels: &'a CellMask,
}

impl<'a> VeinCanvas<'a> {
    pub fn new(
        grid: &'a mut Grid,
        provenance: &'a mut Provenance,
        shape: &'a AsteroidShape,
        holes: &'a CellMask,
        tunnels: &'a CellMask,
    ) -> Self {
        Self {
            grid,
            provenance,
            shape,
            holes,
            tunnels,
        }
    }

    pub fn dims(&self) -> &Dimensions {
        self.shape.dims()
    }

    pub fn shape(&self) -> &AsteroidShape {
        self.shape
    }

    /// In bounds, inside the body, outside holes and tunnels, not space.
    pub fn is_valid(&self, x: i32, y: i32) -> bool {
        self.grid.in_bounds(x, y)
            && self.shape.is_solid(x, y)
            && !self.holes.contains(x, y)
            && !self.tunnels.contains(x, y)
            && self.grid.is_solid(x, y)
    }

    /// Paint one cell for a vein instance. Invalid cells are skipped.
    pub fn paint(&mut self, x: i32, y: i32, mineral: &str, vein: u32) -> bool {
        if !self.is_valid(x, y) {
            return false;
        }
        if let Some(cell) = self.grid.get_mut(x, y) {
            cell.ground = Some(Ground {
                mineral: mineral.to_string(),
            });
        }
        self.provenance.tag(x, y, vein);
        true
    }

    /// Paint a filled disc; radius below 0.5 paints a single cell.
    pub fn stamp(&mut self, x: f64, y: f64, radius: f64, mineral: &str, vein: u32) -> u32 {
        let (cx, cy) = (x.round() as i32, y.round() as i32);
        if radius < 0.5 {
            return self.paint(cx, cy, mineral, vein) as u32;
        }
        let r = radius.ceil() as i32;
        let mut painted = 0;
        for dy in -r..=r {
            for dx in -r..=r {
                let (fx, fy) = ((cx + dx) as f64 - x, (cy + dy) as f64 - y);
                if fx * fx + fy * fy <= radius * radius && self.paint(cx + dx, cy + dy, mineral, vein) {
                    painted += 1;
                }
            }
        }
        painted
    }

    /// Random valid cell, or `None` after `attempts` misses.
    pub fn random_valid<R: Rng + ?Sized>(&self, rng: &mut R, attempts: u32) -> Option<(i32, i32)> {
        let dims = self.dims();
        for _ in 0..attempts {
            let x = rng.gen_range(0..dims.width as i32);
            let y = rng.gen_range(dims.air_gap as i32..dims.depth as i32);
            if self.is_valid(x, y) {
                return Some((x, y));
            }
        }
        None
    }

    fn open_instance(&mut self, brush: &VeinBrush) -> u32 {
        self.provenance
            .open_instance(brush.spec_index, &brush.mineral, brush.yield_rate)
    }
}

/// One configured vein, resolved against the world size.
#[derive(Debug, Clone)]
pub struct VeinBrush {
    pub mineral: String,
    pub spec_index: usize,
    pub density: f64,
    pub size: f64,
    pub yield_rate: f64,
    pub instance_count: u32,
}

impl VeinBrush {
    pub fn new(spec: &VeinSpec, spec_index: usize, dims: &Dimensions) -> Self {
        let density = spec.density.max(0.0);
        let raw = density * dims.area() as f64 / 1000.0;
        let instance_count = if density > 0.0 {
            (raw.round() as u32).max(1)
        } else {
            0
        };
        Self {
            mineral: spec.color.clone(),
            spec_index,
            density,
            size: spec.size.clamp(0.25, 10.0),
            yield_rate: spec.yield_rate.max(0.0),
            instance_count,
        }
    }

    /// Disc radius for path thickness: single-cell paths until size exceeds 1.
    pub fn stroke_radius(&self) -> f64 {
        if self.size > 1.0 {
            (self.size - 1.0) * 0.75 + 0.5
        } else {
            0.0
        }
    }
}

// ---------------------------------------------------------------------------
// Formation
// ---------------------------------------------------------------------------

/// Fill every body cell outside holes and tunnels with the base mineral.
pub fn fill_base_ground(grid: &mut Grid, shape: &AsteroidShape, holes: &CellMask, tunnels: &CellMask, base: &str) {
    for ((x, y), cell) in grid.cells_mut() {
        *cell = if shape.is_solid(x, y) && !holes.contains(x, y) && !tunnels.contains(x, y) {
            Cell::solid(base)
        } else {
            Cell::space()
        };
    }
}

/// Paint every configured vein in order.
pub fn paint_veins<R: Rng + ?Sized>(canvas: &mut VeinCanvas<'_>, veins: &[VeinSpec], rng: &mut R) {
    for (spec_index, spec) in veins.iter().enumerate() {
        let brush = VeinBrush::new(spec, spec_index, canvas.dims());
        if brush.instance_count == 0 {
            continue;
        }
        let pattern = VeinPattern::resolve(&spec.pattern);
        paint_pattern(canvas, pattern, &brush, rng);
        debug!(
            "Painted vein '{}' ({}, {} instances)",
            brush.mineral,
            pattern.name(),
            brush.instance_count
        );
    }
}

pub fn paint_pattern<R: Rng + ?Sized>(
    canvas: &mut VeinCanvas<'_>,
    pattern: VeinPattern,
    brush: &VeinBrush,
    rng: &mut R,
) {
    match pattern {
        VeinPattern::Organic => paths::organic(canvas, brush, rng),
        VeinPattern::Fractal => paths::fractal(canvas, brush, rng),
        VeinPattern::Lightning => paths::lightning(canvas, brush, rng),
        VeinPattern::Percolation => paths::percolation(canvas, brush, rng),
        VeinPattern::Radial => geometric::radial(canvas, brush, rng),
        VeinPattern::Concentric => geometric::concentric(canvas, brush, rng),
        VeinPattern::Grid => geometric::lattice(canvas, brush, rng),
        VeinPattern::Spiral => geometric::spiral(canvas, brush, rng),
        VeinPattern::Cellular => geometric::cellular(canvas, brush, rng),
        VeinPattern::Layered => bands::layered(canvas, brush, rng),
        VeinPattern::Flow => bands::flow(canvas, brush, rng),
        VeinPattern::NoiseBands => bands::noise_bands(canvas, brush, rng),
        VeinPattern::Scattered => sparse::scattered(canvas, brush, rng),
        VeinPattern::Faults => sparse::faults(canvas, brush, rng),
        VeinPattern::Maze => sparse::maze(canvas, brush, rng),
    }
}


#[cfg(test)]
mod tests {
    use super::testing::Fixture;
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn pattern_names_roundtrip() {
        for pattern in VeinPattern::ALL {
            assert_eq!(VeinPattern::from_name(pattern.name()), Some(pattern));
        }
        assert_eq!(VeinPattern::from_name("plaid"), None);
        assert_eq!(VeinPattern::resolve("plaid"), VeinPattern::Organic);
    }

    #[test]
    fn instance_count_scales_with_density() {
        let fx = Fixture::new(64);
        let area = fx.shape.dims().area() as f64;
        let brush = fx.brush(2.0, 1.0);
        assert_eq!(brush.instance_count, (2.0 * area / 1000.0).round() as u32);
        assert_eq!(fx.brush(0.0, 1.0).instance_count, 0);
        assert_eq!(fx.brush(0.001, 1.0).instance_count, 1);
    }

    #[test]
    fn paint_skips_invalid_cells() {
        let mut fx = Fixture::new(48);
        fx.tunnels.insert(30, 30);
        let mut canvas = fx.canvas();
        assert!(!canvas.paint(0, 0, "orange", 0));
        assert!(!canvas.paint(-3, 10, "orange", 0));
        assert!(!canvas.paint(30, 30, "orange", 0));
        let (cx, cy) = canvas.shape().center();
        assert!(canvas.paint(cx as i32, cy as i32, "orange", 0));
        assert_eq!(fx.provenance.get(cx as i32, cy as i32).unwrap().vein_index, 0);
    }

    #[test]
    fn every_pattern_paints_and_tags() {
        for pattern in VeinPattern::ALL {
            let mut fx = Fixture::new(64);
            let brush = fx.brush(3.0, 2.0);
            let mut rng = StdRng::seed_from_u64(21);
            paint_pattern(&mut fx.canvas(), pattern, &brush, &mut rng);
            let painted = fx.painted();
            assert!(painted > 0, "{} painted nothing", pattern.name());
            assert_eq!(
                painted,
                fx.provenance.tagged_count(),
                "{} left untagged cells",
                pattern.name()
            );
            for inst in fx.provenance.instances() {
                assert_eq!(inst.mineral, "orange");
            }
        }
    }

    #[test]
    fn patterns_never_paint_space() {
        for pattern in VeinPattern::ALL {
            let mut fx = Fixture::new(48);
            let brush = fx.brush(4.0, 3.0);
            let mut rng = StdRng::seed_from_u64(4);
            paint_pattern(&mut fx.canvas(), pattern, &brush, &mut rng);
            for (_, cell) in fx.grid.cells() {
                if cell.is_space() {
                    assert!(cell.ground.is_none(), "{} painted space", pattern.name());
                }
            }
        }
    }

    #[test]
    fn sparse_faults_stay_sparse() {
        let mut fx = Fixture::new(64);
        let brush = fx.brush(0.5, 1.0);
        let mut rng = StdRng::seed_from_u64(9);
        paint_pattern(&mut fx.canvas(), VeinPattern::Faults, &brush, &mut rng);
        assert!(fx.painted() <= 5, "faults painted {} cells", fx.painted());
    }
}
