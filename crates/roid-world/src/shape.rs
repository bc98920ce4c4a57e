//! Asteroid body membership.

use crate::dimensions::Dimensions;

/// Ellipse radius in normalised body space before the shape aspect is applied.
const BASE_RADIUS: f64 = 0.45;
/// Keeps the body off the grid border.
const MAX_RADIUS: f64 = 0.49;

/// Pure membership predicate for the asteroid body.
///
/// Coordinates are normalised into `[0, 1]²` over the rows below the air gap
/// and tested against an ellipse. No randomness is involved.
#[derive(Debug, Clone, Copy)]
pub struct AsteroidShape {
    dims: Dimensions,
    radius_x: f64,
    radius_y: f64,
}

impl AsteroidShape {
    pub fn new(dims: Dimensions) -> Self {
        let (ax, ay) = dims.shape.aspect();
        Self {
            dims,
            radius_x: (BASE_RADIUS * ax).min(MAX_RADIUS),
            radius_y: (BASE_RADIUS * ay).min(MAX_RADIUS),
        }
    }

    pub fn dims(&self) -> &Dimensions {
        &self.dims
    }

    /// Normalised elliptical distance from the body centre (`<= 1.0` is inside).
    pub fn ellipse_distance(&self, x: f64, y: f64) -> f64 {
        let body = self.dims.body_depth() as f64;
        let nx = (x + 0.5) / self.dims.width as f64;
        let ny = (y - self.dims.air_gap as f64 + 0.5) / body;
        let dx = (nx - 0.5) / self.radius_x;
        let dy = (ny - 0.5) / self.radius_y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        if !self.dims.in_bounds(x, y) || (y as u32) < self.dims.air_gap {
            return false;
        }
        self.ellipse_distance(x as f64, y as f64) <= 1.0
    }

    /// Grid-space centre of the body.
    pub fn center(&self) -> (f64, f64) {
        (
            self.dims.width as f64 / 2.0,
            self.dims.air_gap as f64 + self.dims.body_depth() as f64 / 2.0,
        )
    }

    /// Grid-space half axes of the body ellipse.
    pub fn half_axes(&self) -> (f64, f64) {
        (
            self.radius_x * self.dims.width as f64,
            self.radius_y * self.dims.body_depth() as f64,
        )
    }

    /// Point on the body boundary at `angle` radians (y grows downward).
    pub fn boundary_point(&self, angle: f64) -> (f64, f64) {
        let (cx, cy) = self.center();
        let (hx, hy) = self.half_axes();
        (cx + angle.cos() * hx, cy + angle.sin() * hy)
    }

    /// True when every cell within `margin` cells in the four cardinal
    /// directions is inside the body.
    pub fn has_margin(&self, x: i32, y: i32, margin: i32) -> bool {
        (1..=margin).all(|k| {
            self.is_solid(x + k, y)
                && self.is_solid(x - k, y)
                && self.is_solid(x, y + k)
                && self.is_solid(x, y - k)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SizeSpec, WorldConfig};

    fn shape(size: u32, kind: &str) -> AsteroidShape {
        let mut cfg = WorldConfig::with_ground("white", vec![]);
        cfg.size = SizeSpec::Base(size);
        cfg.shape = kind.into();
        AsteroidShape::new(Dimensions::resolve(&cfg))
    }

    #[test]
    fn center_is_solid_corners_are_not() {
        let s = shape(48, "balanced");
        let (cx, cy) = s.center();
        assert!(s.is_solid(cx as i32, cy as i32));
        let d = s.dims();
        assert!(!s.is_solid(0, d.air_gap as i32));
        assert!(!s.is_solid(d.width as i32 - 1, d.depth as i32 - 1));
    }

    #[test]
    fn air_gap_never_solid() {
        let s = shape(48, "square");
        let d = *s.dims();
        for y in 0..d.air_gap as i32 {
            for x in 0..d.width as i32 {
                assert!(!s.is_solid(x, y), "air gap cell ({x}, {y}) is solid");
            }
        }
    }

    #[test]
    fn out_of_bounds_is_not_solid() {
        let s = shape(32, "balanced");
        assert!(!s.is_solid(-1, 20));
        assert!(!s.is_solid(10_000, 20));
    }

    #[test]
    fn predicate_is_pure() {
        let s = shape(64, "wide");
        let d = *s.dims();
        for y in 0..d.depth as i32 {
            for x in 0..d.width as i32 {
                assert_eq!(s.is_solid(x, y), s.is_solid(x, y));
            }
        }
    }

    #[test]
    fn body_covers_most_of_its_box() {
        let s = shape(64, "balanced");
        let d = *s.dims();
        let solid = (0..d.depth as i32)
            .flat_map(|y| (0..d.width as i32).map(move |x| (x, y)))
            .filter(|&(x, y)| s.is_solid(x, y))
            .count();
        let body = (d.width * d.body_depth()) as usize;
        // pi * 0.45^2 of the box
        assert!(solid > body / 2, "only {solid} of {body} body cells solid");
    }

    #[test]
    fn boundary_point_is_on_edge() {
        let s = shape(64, "balanced");
        let (bx, by) = s.boundary_point(std::f64::consts::FRAC_PI_2);
        let (cx, _) = s.center();
        assert!((bx - cx).abs() < 1e-9);
        assert!(s.ellipse_distance(bx - 0.5, by - 0.5) < 1.05);
    }
}
