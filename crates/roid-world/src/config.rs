//! World configuration as stored by the game.
//!
//! Configurations are JSON documents. The structural checks in
//! [`WorldConfig::from_value`] run before typed deserialization so that a
//! broken document is reported against the field that broke it.

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Budgets
// ---------------------------------------------------------------------------

/// An inclusive `[min, max]` range from which a concrete count is drawn.
///
/// Accepts either a bare number or a two-element array on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "BudgetRepr", into = "BudgetWire")]
pub struct Budget {
    pub min: u32,
    pub max: u32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BudgetRepr {
    Fixed(f64),
    Range([f64; 2]),
}

#[derive(Serialize)]
#[serde(untagged)]
enum BudgetWire {
    Fixed(u32),
    Range([u32; 2]),
}

fn count_from_f64(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round().min(u32::MAX as f64) as u32
    } else {
        0
    }
}

impl From<BudgetRepr> for Budget {
    fn from(repr: BudgetRepr) -> Self {
        match repr {
            BudgetRepr::Fixed(n) => Budget::fixed(count_from_f64(n)),
            BudgetRepr::Range([a, b]) => Budget::range(count_from_f64(a), count_from_f64(b)),
        }
    }
}

impl From<Budget> for BudgetWire {
    fn from(budget: Budget) -> Self {
        if budget.min == budget.max {
            BudgetWire::Fixed(budget.min)
        } else {
            BudgetWire::Range([budget.min, budget.max])
        }
    }
}

impl Budget {
    pub const NONE: Budget = Budget { min: 0, max: 0 };

    pub fn fixed(n: u32) -> Self {
        Self { min: n, max: n }
    }

    /// Builds a range, swapping reversed bounds.
    pub fn range(a: u32, b: u32) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.max == 0
    }

    /// Draw a concrete count from the range.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        if self.min >= self.max {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Asteroid size: a named tier or an explicit base width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SizeSpec {
    Base(u32),
    Tier(String),
}

impl Default for SizeSpec {
    fn default() -> Self {
        SizeSpec::Tier("medium".into())
    }
}

/// Per-tier instance counts for craters or caves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoleTiers {
    #[serde(default)]
    pub huge: Budget,
    #[serde(default)]
    pub big: Budget,
    #[serde(default)]
    pub medium: Budget,
    #[serde(default)]
    pub small: Budget,
    #[serde(default)]
    pub tiny: Budget,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TunnelConfig {
    #[serde(default)]
    pub count: Budget,
    #[serde(default = "default_branch_probability")]
    pub branch_probability: f64,
    #[serde(default = "default_max_branches")]
    pub max_branches: u32,
    #[serde(default = "default_segment_length")]
    pub segment_length: u32,
    #[serde(default = "default_wander_strength")]
    pub wander_strength: f64,
}

fn default_branch_probability() -> f64 {
    0.1
}

fn default_max_branches() -> u32 {
    2
}

fn default_segment_length() -> u32 {
    12
}

fn default_wander_strength() -> f64 {
    0.3
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            count: Budget::NONE,
            branch_probability: default_branch_probability(),
            max_branches: default_max_branches(),
            segment_length: default_segment_length(),
            wander_strength: default_wander_strength(),
        }
    }
}

/// One configured vein overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VeinSpec {
    /// Mineral id painted by this vein.
    pub color: String,
    /// Instance count per 1000 cells of world area.
    #[serde(default = "default_vein_scalar")]
    pub density: f64,
    /// Path length and thickness scale.
    #[serde(default = "default_vein_scalar")]
    pub size: f64,
    /// Pure-mineral crystal yield; zero disables crystals for this vein.
    #[serde(default, rename = "yield")]
    pub yield_rate: f64,
    #[serde(default = "default_vein_pattern")]
    pub pattern: String,
}

fn default_vein_scalar() -> f64 {
    1.0
}

fn default_vein_pattern() -> String {
    "organic".into()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundConfig {
    pub base: String,
    pub veins: Vec<VeinSpec>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HazardCount {
    #[serde(default)]
    pub count: Budget,
}

/// Budget plus type table for aliens or items.
///
/// `types` stays raw JSON: a malformed table degrades at placement time
/// rather than rejecting the whole configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityBudget {
    #[serde(default)]
    pub budget: Budget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<Value>,
}

// ---------------------------------------------------------------------------
// Root
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default)]
    pub size: SizeSpec,
    #[serde(default = "default_shape")]
    pub shape: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,
    #[serde(default)]
    pub craters: HoleTiers,
    #[serde(default)]
    pub caves: HoleTiers,
    #[serde(default)]
    pub tunnels: TunnelConfig,
    pub ground: GroundConfig,
    #[serde(default, rename = "lava_pools")]
    pub lava_pools: HazardCount,
    #[serde(default, rename = "gas_pockets")]
    pub gas_pockets: HazardCount,
    #[serde(default, rename = "lava_bubbles")]
    pub lava_bubbles: HazardCount,
    #[serde(default, rename = "gas_bubbles")]
    pub gas_bubbles: HazardCount,
    #[serde(default)]
    pub aliens: EntityBudget,
    #[serde(default)]
    pub items: EntityBudget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spaceco: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_player: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_requirements: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_price: Option<Value>,
}

fn default_shape() -> String {
    "balanced".into()
}

impl WorldConfig {
    /// A configuration with the given ground and every optional feature off.
    pub fn with_ground(base: impl Into<String>, veins: Vec<VeinSpec>) -> Self {
        Self {
            id: None,
            description: None,
            seed: None,
            size: SizeSpec::default(),
            shape: default_shape(),
            width: None,
            depth: None,
            craters: HoleTiers::default(),
            caves: HoleTiers::default(),
            tunnels: TunnelConfig::default(),
            ground: GroundConfig {
                base: base.into(),
                veins,
            },
            lava_pools: HazardCount::default(),
            gas_pockets: HazardCount::default(),
            lava_bubbles: HazardCount::default(),
            gas_bubbles: HazardCount::default(),
            aliens: EntityBudget::default(),
            items: EntityBudget::default(),
            spaceco: None,
            new_player: None,
            transport_requirements: None,
            transport_price: None,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Validate the document's structure, then deserialize it.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        validate_structure(&value)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Re-check a configuration built in code.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_structure(&serde_json::to_value(self)?)
    }
}

/// Smallest and largest accepted `size`, `width` and `depth`.
pub const MIN_DIMENSION: u64 = 8;
pub const MAX_DIMENSION: u64 = 1024;

fn validate_dimension(root: &serde_json::Map<String, Value>, field: &str) -> Result<(), ConfigError> {
    match root.get(field) {
        None | Some(Value::Null) => Ok(()),
        Some(v) => match v.as_u64() {
            Some(n) if (MIN_DIMENSION..=MAX_DIMENSION).contains(&n) => Ok(()),
            Some(n) => Err(ConfigError::invalid(
                field,
                format!("must be between {MIN_DIMENSION} and {MAX_DIMENSION}, got {n}"),
            )),
            None => Err(ConfigError::invalid(field, format!("expected a positive integer, got {v}"))),
        },
    }
}

fn validate_structure(value: &Value) -> Result<(), ConfigError> {
    let root = value.as_object().ok_or(ConfigError::NotAnObject)?;

    match root.get("size") {
        None | Some(Value::Null) | Some(Value::String(_)) => {}
        Some(v) => match v.as_u64() {
            Some(n) if (MIN_DIMENSION..=MAX_DIMENSION).contains(&n) => {}
            _ => {
                return Err(ConfigError::invalid(
                    "size",
                    format!("expected a size tier name or an integer from {MIN_DIMENSION} to {MAX_DIMENSION}, got {v}"),
                ))
            }
        },
    }
    validate_dimension(root, "width")?;
    validate_dimension(root, "depth")?;

    let ground = root.get("ground").ok_or_else(|| ConfigError::missing("ground"))?;
    let ground = ground
        .as_object()
        .ok_or_else(|| ConfigError::invalid("ground", "expected an object"))?;

    match ground.get("base") {
        None | Some(Value::Null) => return Err(ConfigError::missing("ground.base")),
        Some(Value::String(s)) if !s.trim().is_empty() => {}
        Some(v) => {
            return Err(ConfigError::invalid(
                "ground.base",
                format!("expected a mineral name, got {v}"),
            ))
        }
    }

    let veins = match ground.get("veins") {
        None | Some(Value::Null) => return Err(ConfigError::missing("ground.veins")),
        Some(Value::Array(veins)) => veins,
        Some(v) => {
            return Err(ConfigError::invalid(
                "ground.veins",
                format!("expected an array, got {v}"),
            ))
        }
    };
    for (i, vein) in veins.iter().enumerate() {
        match vein.get("color") {
            Some(Value::String(s)) if !s.trim().is_empty() => {}
            _ => {
                return Err(ConfigError::invalid(
                    format!("ground.veins[{i}].color"),
                    "expected a mineral name",
                ))
            }
        }
    }

    Ok(())
}
