//! Craters and caves: the hole predicate.
//!
//! Craters burst through one of the four boundary edges and shallow out away
//! from it. Caves sit fully inside the body. Both get noisy, organic edges from
//! a few summed sine/cosine waves keyed on per-instance irregularity and phase.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

use rand::Rng;
use tracing::debug;

use crate::config::{Budget, HoleTiers};
use crate::shape::AsteroidShape;

/// Interior holes never reach closer than this to the air gap.
pub const INTERIOR_CLEARANCE: u32 = 3;
/// Placement attempts per hole instance before it is dropped.
const PLACEMENT_ATTEMPTS: u32 = 20;
/// How much a crater flattens per radius of depth away from its edge.
const CRATER_FALLOFF: f64 = 0.6;
/// Outline scale checked against the body; covers the widest edge noise.
const CAVE_PADDING: f64 = 1.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoleTier {
    Huge,
    Big,
    Medium,
    Small,
    Tiny,
}

impl HoleTier {
    pub const ALL: [HoleTier; 5] = [
        HoleTier::Huge,
        HoleTier::Big,
        HoleTier::Medium,
        HoleTier::Small,
        HoleTier::Tiny,
    ];

    fn budget(self, tiers: &HoleTiers) -> Budget {
        match self {
            HoleTier::Huge => tiers.huge,
            HoleTier::Big => tiers.big,
            HoleTier::Medium => tiers.medium,
            HoleTier::Small => tiers.small,
            HoleTier::Tiny => tiers.tiny,
        }
    }

    /// Radius as a fraction of the smaller body dimension.
    fn crater_radius(self) -> f64 {
        match self {
            HoleTier::Huge => 0.2,
            HoleTier::Big => 0.14,
            HoleTier::Medium => 0.1,
            HoleTier::Small => 0.07,
            HoleTier::Tiny => 0.045,
        }
    }

    fn cave_radius(self) -> f64 {
        match self {
            HoleTier::Huge => 0.13,
            HoleTier::Big => 0.1,
            HoleTier::Medium => 0.075,
            HoleTier::Small => 0.055,
            HoleTier::Tiny => 0.035,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoleCategory {
    Crater(HoleTier),
    Cave(HoleTier),
}

/// Boundary edge a crater bursts through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl Edge {
    /// Impacts favour the top edge.
    fn pick<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let roll: f64 = rng.gen();
        if roll < 0.4 {
            Edge::Top
        } else if roll < 0.6 {
            Edge::Right
        } else if roll < 0.8 {
            Edge::Bottom
        } else {
            Edge::Left
        }
    }

    /// Angle of the edge's midpoint on the body ellipse (y grows downward).
    fn angle(self) -> f64 {
        match self {
            Edge::Top => -FRAC_PI_2,
            Edge::Right => 0.0,
            Edge::Bottom => FRAC_PI_2,
            Edge::Left => PI,
        }
    }

    /// Unit vector pointing from the edge into the body.
    fn inward(self) -> (f64, f64) {
        match self {
            Edge::Top => (0.0, 1.0),
            Edge::Right => (-1.0, 0.0),
            Edge::Bottom => (0.0, -1.0),
            Edge::Left => (1.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hole {
    pub category: HoleCategory,
    pub center: (f64, f64),
    pub radius_x: f64,
    pub radius_y: f64,
    pub irregularity: f64,
    phase: f64,
    /// Craters only.
    pub edge: Option<Edge>,
    /// Caves only; never both.
    pub has_lava: bool,
    pub has_gas: bool,
}

impl Hole {
    /// A smooth elliptical cave with no hazard flags.
    pub fn cave(tier: HoleTier, center: (f64, f64), radius_x: f64, radius_y: f64) -> Self {
        Self {
            category: HoleCategory::Cave(tier),
            center,
            radius_x,
            radius_y,
            irregularity: 0.0,
            phase: 0.0,
            edge: None,
            has_lava: false,
            has_gas: false,
        }
    }

    pub fn is_crater(&self) -> bool {
        matches!(self.category, HoleCategory::Crater(_))
    }

    /// Multi-frequency edge perturbation around 1.0.
    fn edge_noise(&self, angle: f64, x: f64, y: f64) -> f64 {
        let p = self.phase;
        let wave = 0.5 * (angle * 3.0 + p).sin()
            + 0.3 * (angle * 5.0 + p * 1.7).cos()
            + 0.2 * (x * 0.35 + y * 0.4 + p).sin();
        1.0 + self.irregularity * wave
    }

    /// Crater depth falloff: grows with distance inward from the burst edge.
    fn edge_falloff(&self, dx: f64, dy: f64) -> f64 {
        let Some(edge) = self.edge else {
            return 1.0;
        };
        let (nx, ny) = edge.inward();
        let reach = if nx != 0.0 { self.radius_x } else { self.radius_y };
        let depth = (dx * nx + dy * ny) / reach;
        if depth > 0.0 {
            1.0 + depth * depth * CRATER_FALLOFF
        } else {
            1.0
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        let (fx, fy) = (x as f64, y as f64);
        let dx = fx - self.center.0;
        let dy = fy - self.center.1;
        let nx = dx / self.radius_x;
        let ny = dy / self.radius_y;
        let dist = (nx * nx + ny * ny).sqrt();
        // cheap reject well outside the noisy envelope
        if dist > 1.0 + self.irregularity * 2.0 + 0.5 {
            return false;
        }
        let angle = ny.atan2(nx);
        dist * self.edge_noise(angle, fx, fy) * self.edge_falloff(dx, dy) < 1.0
    }
}

/// All holes of one world.
#[derive(Debug, Clone)]
pub struct HoleField {
    holes: Vec<Hole>,
    air_gap: u32,
}

impl HoleField {
    pub fn empty(air_gap: u32) -> Self {
        Self {
            holes: Vec::new(),
            air_gap,
        }
    }

    pub fn from_holes(holes: Vec<Hole>, air_gap: u32) -> Self {
        Self { holes, air_gap }
    }

    /// Roll every configured crater and cave and place those that fit.
    pub fn generate<R: Rng + ?Sized>(
        shape: &AsteroidShape,
        craters: &HoleTiers,
        caves: &HoleTiers,
        rng: &mut R,
    ) -> Self {
        let mut field = Self::empty(shape.dims().air_gap);
        let mut dropped = 0u32;

        for tier in HoleTier::ALL {
            for _ in 0..tier.budget(craters).roll(rng) {
                let crater = place_crater(shape, tier, rng);
                field.holes.push(crater);
            }
        }
        for tier in HoleTier::ALL {
            for _ in 0..tier.budget(caves).roll(rng) {
                match place_cave(shape, tier, &field.holes, rng) {
                    Some(cave) => field.holes.push(cave),
                    None => dropped += 1,
                }
            }
        }

        debug!(
            "Placed {} craters and {} caves ({dropped} dropped)",
            field.holes.iter().filter(|h| h.is_crater()).count(),
            field.holes.iter().filter(|h| !h.is_crater()).count(),
        );
        field
    }

    pub fn holes(&self) -> &[Hole] {
        &self.holes
    }

    fn hole_applies(&self, hole: &Hole, x: i32, y: i32) -> bool {
        if !hole.is_crater() && (y as i64) < (self.air_gap + INTERIOR_CLEARANCE) as i64 {
            return false;
        }
        hole.contains(x, y)
    }

    /// True when any hole instance covers `(x, y)`.
    pub fn is_hole(&self, x: i32, y: i32) -> bool {
        self.holes.iter().any(|h| self.hole_applies(h, x, y))
    }

    /// First hole covering `(x, y)`.
    pub fn hole_at(&self, x: i32, y: i32) -> Option<&Hole> {
        self.holes.iter().find(|h| self.hole_applies(h, x, y))
    }
}

fn tier_radius(shape: &AsteroidShape, fraction: f64) -> f64 {
    let dims = shape.dims();
    let span = dims.width.min(dims.body_depth()) as f64;
    span * fraction
}

fn place_crater<R: Rng + ?Sized>(shape: &AsteroidShape, tier: HoleTier, rng: &mut R) -> Hole {
    let edge = Edge::pick(rng);
    let angle = edge.angle() + rng.gen_range(-FRAC_PI_4..FRAC_PI_4);
    let radius = tier_radius(shape, tier.crater_radius()).max(2.0);
    let radius_x = radius * rng.gen_range(0.8..1.25);
    let radius_y = radius * rng.gen_range(0.7..1.1);

    let (bx, by) = shape.boundary_point(angle);
    let (nx, ny) = edge.inward();
    let sink = rng.gen_range(0.0..0.3);
    let center = (bx + nx * radius_x * sink, by + ny * radius_y * sink);

    Hole {
        category: HoleCategory::Crater(tier),
        center,
        radius_x,
        radius_y,
        irregularity: rng.gen_range(0.1..0.3),
        phase: rng.gen_range(0.0..TAU),
        edge: Some(edge),
        has_lava: false,
        has_gas: false,
    }
}

fn place_cave<R: Rng + ?Sized>(
    shape: &AsteroidShape,
    tier: HoleTier,
    existing: &[Hole],
    rng: &mut R,
) -> Option<Hole> {
    let dims = shape.dims();
    let radius = tier_radius(shape, tier.cave_radius()).max(1.5);
    let top = (dims.air_gap + INTERIOR_CLEARANCE) as f64;

    for _ in 0..PLACEMENT_ATTEMPTS {
        let radius_x = radius * rng.gen_range(0.85..1.3);
        let radius_y = radius * rng.gen_range(0.7..1.1);
        let cx = rng.gen_range(0.0..dims.width as f64);
        let cy = rng.gen_range(top..dims.depth as f64);

        if cy - radius_y * CAVE_PADDING < top {
            continue;
        }
        // the padded outline must stay inside the body, away from its boundary
        let enclosed = (0..16).all(|i| {
            let a = i as f64 * TAU / 16.0;
            let px = (cx + a.cos() * radius_x * CAVE_PADDING).round() as i32;
            let py = (cy + a.sin() * radius_y * CAVE_PADDING).round() as i32;
            shape.has_margin(px, py, 2)
        });
        if !enclosed {
            continue;
        }
        if existing
            .iter()
            .any(|h| !h.is_crater() && h.contains(cx.round() as i32, cy.round() as i32))
        {
            continue;
        }

        let roll: f64 = rng.gen();
        return Some(Hole {
            category: HoleCategory::Cave(tier),
            center: (cx, cy),
            radius_x,
            radius_y,
            irregularity: rng.gen_range(0.1..0.35),
            phase: rng.gen_range(0.0..TAU),
            edge: None,
            has_lava: roll < 0.15,
            has_gas: (0.15..0.3).contains(&roll),
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SizeSpec, WorldConfig};
    use crate::dimensions::Dimensions;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn shape(size: u32) -> AsteroidShape {
        let mut cfg = WorldConfig::with_ground("white", vec![]);
        cfg.size = SizeSpec::Base(size);
        AsteroidShape::new(Dimensions::resolve(&cfg))
    }

    fn cave(center: (f64, f64), r: f64) -> Hole {
        Hole::cave(HoleTier::Small, center, r, r)
    }

    #[test]
    fn zero_budgets_make_no_holes() {
        let s = shape(64);
        let mut rng = StdRng::seed_from_u64(1);
        let field = HoleField::generate(&s, &HoleTiers::default(), &HoleTiers::default(), &mut rng);
        assert!(field.holes().is_empty());
        assert!(!field.is_hole(30, 30));
    }

    #[test]
    fn smooth_cave_is_an_ellipse() {
        let hole = cave((20.0, 20.0), 4.0);
        assert!(hole.contains(20, 20));
        assert!(hole.contains(23, 20));
        assert!(!hole.contains(25, 20));
        assert!(!hole.contains(20, 25));
    }

    #[test]
    fn caves_respect_interior_clearance() {
        let field = HoleField::from_holes(vec![cave((10.0, 6.0), 5.0)], 5);
        assert!(!field.is_hole(10, 6));
        assert!(field.is_hole(10, 9));
    }

    #[test]
    fn craters_are_exempt_from_clearance() {
        let mut crater = cave((10.0, 6.0), 5.0);
        crater.category = HoleCategory::Crater(HoleTier::Small);
        crater.edge = Some(Edge::Top);
        let field = HoleField::from_holes(vec![crater], 5);
        assert!(field.is_hole(10, 6));
    }

    #[test]
    fn crater_shallows_away_from_edge() {
        let mut crater = cave((20.0, 10.0), 6.0);
        crater.category = HoleCategory::Crater(HoleTier::Big);
        crater.edge = Some(Edge::Top);
        // full reach sideways, reduced reach inward
        assert!(crater.contains(25, 10));
        assert!(!crater.contains(20, 15));
        assert!(crater.contains(20, 5));
    }

    #[test]
    fn caves_stay_inside_the_body() {
        let s = shape(96);
        let caves = HoleTiers {
            medium: Budget::fixed(6),
            small: Budget::fixed(6),
            ..HoleTiers::default()
        };
        let mut rng = StdRng::seed_from_u64(99);
        let field = HoleField::generate(&s, &HoleTiers::default(), &caves, &mut rng);
        assert!(!field.holes().is_empty());
        let dims = *s.dims();
        for y in 0..dims.depth as i32 {
            for x in 0..dims.width as i32 {
                if field.is_hole(x, y) {
                    assert!(s.is_solid(x, y), "cave cell ({x}, {y}) outside body");
                    assert!(y as u32 >= dims.air_gap + INTERIOR_CLEARANCE);
                }
            }
        }
        for hole in field.holes() {
            assert!(!(hole.has_lava && hole.has_gas));
            assert!(hole.edge.is_none());
        }
    }

    #[test]
    fn craters_touch_the_boundary() {
        let s = shape(96);
        let craters = HoleTiers {
            big: Budget::fixed(4),
            ..HoleTiers::default()
        };
        let mut rng = StdRng::seed_from_u64(5);
        let field = HoleField::generate(&s, &craters, &HoleTiers::default(), &mut rng);
        assert_eq!(field.holes().len(), 4);
        for hole in field.holes() {
            assert!(hole.is_crater());
            assert!(hole.edge.is_some());
            assert!(s.ellipse_distance(hole.center.0, hole.center.1) < 1.1);
        }
    }

    #[test]
    fn predicate_is_referentially_consistent() {
        let s = shape(64);
        let tiers = HoleTiers {
            small: Budget::fixed(3),
            ..HoleTiers::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let field = HoleField::generate(&s, &tiers, &tiers, &mut rng);
        let first: Vec<bool> = (0..70).map(|i| field.is_hole(i, i / 2 + 5)).collect();
        let second: Vec<bool> = (0..70).map(|i| field.is_hole(i, i / 2 + 5)).collect();
        assert_eq!(first, second);
    }
}
