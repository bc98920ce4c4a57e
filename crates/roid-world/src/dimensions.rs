//! Size and shape resolution: `(size, shape)` to concrete grid dimensions.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::{SizeSpec, WorldConfig};

/// Base width used when a size tier name is not recognised.
const DEFAULT_BASE: u32 = 64;

/// Overall silhouette of the asteroid body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Wide,
    Tall,
    Deep,
    Square,
    Balanced,
}

impl ShapeKind {
    /// Parse a shape name, falling back to [`ShapeKind::Balanced`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "wide" => Self::Wide,
            "tall" => Self::Tall,
            "deep" => Self::Deep,
            "square" => Self::Square,
            "balanced" => Self::Balanced,
            other => {
                warn!("Unknown asteroid shape '{other}', using balanced");
                Self::Balanced
            }
        }
    }

    /// Grid stretch `(width, depth)` applied to the base size.
    pub fn grid_multipliers(self) -> (f64, f64) {
        match self {
            Self::Wide => (1.5, 0.75),
            Self::Tall => (0.75, 1.4),
            Self::Deep => (0.6, 1.8),
            Self::Square => (1.0, 1.0),
            Self::Balanced => (1.2, 1.0),
        }
    }

    /// Ellipse aspect `(x, y)` in normalised body space.
    pub fn aspect(self) -> (f64, f64) {
        match self {
            Self::Wide => (1.05, 0.85),
            Self::Tall => (0.85, 1.05),
            Self::Deep => (0.8, 1.1),
            Self::Square => (1.1, 1.1),
            Self::Balanced => (1.0, 1.0),
        }
    }
}

/// Base width for a named size tier.
pub fn tier_base(name: &str) -> Option<u32> {
    match name.trim().to_ascii_lowercase().as_str() {
        "tiny" => Some(32),
        "small" => Some(48),
        "medium" => Some(64),
        "large" => Some(96),
        "huge" => Some(128),
        _ => None,
    }
}

/// Concrete grid dimensions for one world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    /// Total rows, including the air gap.
    pub depth: u32,
    /// Open-sky rows above the asteroid body.
    pub air_gap: u32,
    pub shape: ShapeKind,
}

impl Dimensions {
    /// Resolve the configuration's size, shape and explicit overrides.
    pub fn resolve(config: &WorldConfig) -> Self {
        let shape = ShapeKind::from_name(&config.shape);
        let base = match &config.size {
            SizeSpec::Base(n) => *n,
            SizeSpec::Tier(name) => tier_base(name).unwrap_or_else(|| {
                warn!("Unknown size tier '{name}', using medium");
                DEFAULT_BASE
            }),
        };
        let (mw, md) = shape.grid_multipliers();
        let width = config
            .width
            .unwrap_or_else(|| (base as f64 * mw).round() as u32)
            .max(8);
        let body = config
            .depth
            .unwrap_or_else(|| (base as f64 * md).round() as u32)
            .max(8);
        let air_gap = (body / 12).clamp(3, 10);

        Self {
            width,
            depth: body + air_gap,
            air_gap,
            shape,
        }
    }

    /// Rows occupied by the asteroid body.
    pub fn body_depth(&self) -> u32 {
        self.depth - self.air_gap
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.depth as usize
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.depth
    }
}
