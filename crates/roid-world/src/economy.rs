//! Outpost economy and starting-player defaults.
//!
//! Configured `spaceco` and `newPlayer` objects are merged over built-in
//! defaults. Stock entries may be fixed counts or `[min, max]` ranges; ranges
//! are rolled into concrete counts here.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::warn;

pub const DEFAULT_OUTPOST_HEALTH: u32 = 9;
pub const DEFAULT_OUTPOST_XP: u32 = 0;

/// Outpost fields set by pad placement, never passed through.
const POSITION_KEYS: [&str; 2] = ["x", "y"];

/// Default stock ranges, inclusive.
pub const DEFAULT_STOCK: [(&str, u32, u32); 4] = [
    ("oil", 10, 20),
    ("battery", 4, 8),
    ("repair_kit", 2, 5),
    ("teleporter", 1, 2),
];

/// Resolved outpost economy, without a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutpostEconomy {
    pub health: u32,
    pub xp: u32,
    pub stock: BTreeMap<String, u32>,
    /// Remaining `spaceco` fields, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Starting player values used when `newPlayer` omits them.
pub fn default_new_player() -> Map<String, Value> {
    [("credits", 0), ("fuel", 100), ("health", 100), ("cargo", 10)]
        .into_iter()
        .map(|(key, value)| (key.to_string(), json!(value)))
        .collect()
}

/// Roll one stock entry: a count, or an inclusive `[min, max]` range.
fn roll_stock<R: Rng + ?Sized>(value: &Value, rng: &mut R) -> Option<u32> {
    let count = |v: &Value| v.as_f64().filter(|n| n.is_finite()).map(|n| n.max(0.0).round() as u32);
    match value {
        Value::Array(pair) if pair.len() == 2 => {
            let (a, b) = (count(&pair[0])?, count(&pair[1])?);
            Some(rng.gen_range(a.min(b)..=a.max(b)))
        }
        other => count(other),
    }
}

fn numeric_field(map: &mut Map<String, Value>, key: &str, default: u32) -> u32 {
    match map.remove(key) {
        None => default,
        Some(v) => v.as_u64().map(|n| n as u32).unwrap_or_else(|| {
            warn!("spaceco.{key} is not a non-negative integer, using {default}");
            default
        }),
    }
}

/// Merge a configured `spaceco` object over the defaults and roll its stock.
pub fn resolve_outpost_economy<R: Rng + ?Sized>(spaceco: Option<&Value>, rng: &mut R) -> OutpostEconomy {
    let mut extra = match spaceco {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(other) => {
            warn!("spaceco is not an object ({other}), using defaults");
            Map::new()
        }
    };
    for key in POSITION_KEYS {
        if let Some(v) = extra.remove(key) {
            warn!("spaceco.{key} ({v}) is ignored, the outpost position comes from the landing pad");
        }
    }
    let health = numeric_field(&mut extra, "health", DEFAULT_OUTPOST_HEALTH);
    let xp = numeric_field(&mut extra, "xp", DEFAULT_OUTPOST_XP);

    let mut ranges: BTreeMap<String, Value> = DEFAULT_STOCK
        .iter()
        .map(|&(name, min, max)| (name.to_string(), json!([min, max])))
        .collect();
    match extra.remove("stock") {
        None => {}
        Some(Value::Object(configured)) => ranges.extend(configured),
        Some(other) => warn!("spaceco.stock is not an object ({other}), using default stock"),
    }

    let mut stock = BTreeMap::new();
    for (name, value) in &ranges {
        match roll_stock(value, rng) {
            Some(n) => {
                stock.insert(name.clone(), n);
            }
            None => warn!("spaceco.stock.{name} is neither a count nor a [min, max] range, dropping it"),
        }
    }

    OutpostEconomy {
        health,
        xp,
        stock,
        extra,
    }
}

/// Merge a configured `newPlayer` object over the starting defaults.
pub fn resolve_new_player(new_player: Option<&Value>) -> Value {
    let mut merged = default_new_player();
    match new_player {
        None | Some(Value::Null) => {}
        Some(Value::Object(map)) => merged.extend(map.clone()),
        Some(other) => warn!("newPlayer is not an object ({other}), using defaults"),
    }
    Value::Object(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn defaults_when_absent() {
        let mut rng = StdRng::seed_from_u64(1);
        let eco = resolve_outpost_economy(None, &mut rng);
        assert_eq!(eco.health, 9);
        assert_eq!(eco.xp, 0);
        for (name, min, max) in DEFAULT_STOCK {
            let n = eco.stock[name];
            assert!((min..=max).contains(&n), "{name} stock {n} outside {min}..={max}");
        }
        assert!(eco.extra.is_empty());
    }

    #[test]
    fn configured_stock_overrides_and_rolls() {
        let mut rng = StdRng::seed_from_u64(2);
        let spaceco = json!({
            "health": 12,
            "stock": {"oil": 3, "battery": [7, 5], "drill": [1, 1]},
            "name": "Outpost 9",
        });
        let eco = resolve_outpost_economy(Some(&spaceco), &mut rng);
        assert_eq!(eco.health, 12);
        assert_eq!(eco.stock["oil"], 3);
        assert!((5..=7).contains(&eco.stock["battery"]));
        assert_eq!(eco.stock["drill"], 1);
        assert!(eco.stock.contains_key("teleporter"));
        assert_eq!(eco.extra["name"], "Outpost 9");
        assert!(!eco.extra.contains_key("stock"));
    }

    #[test]
    fn bad_entries_degrade() {
        let mut rng = StdRng::seed_from_u64(3);
        let spaceco = json!({"xp": "lots", "stock": {"oil": "plenty"}});
        let eco = resolve_outpost_economy(Some(&spaceco), &mut rng);
        assert_eq!(eco.xp, 0);
        assert!(!eco.stock.contains_key("oil"));

        let eco = resolve_outpost_economy(Some(&json!(5)), &mut rng);
        assert_eq!(eco.health, DEFAULT_OUTPOST_HEALTH);
    }

    #[test]
    fn configured_position_is_dropped() {
        let mut rng = StdRng::seed_from_u64(5);
        let spaceco = json!({"x": 99, "y": -1, "name": "Hub"});
        let eco = resolve_outpost_economy(Some(&spaceco), &mut rng);
        assert!(!eco.extra.contains_key("x"));
        assert!(!eco.extra.contains_key("y"));
        assert_eq!(eco.extra["name"], "Hub");
    }

    #[test]
    fn economy_serializes_flat() {
        let mut rng = StdRng::seed_from_u64(4);
        let eco = resolve_outpost_economy(Some(&json!({"name": "Hub"})), &mut rng);
        let v = serde_json::to_value(&eco).unwrap();
        assert_eq!(v["name"], "Hub");
        assert_eq!(v["health"], 9);
        assert!(v["stock"]["oil"].is_u64());
    }

    #[test]
    fn new_player_merge() {
        let merged = resolve_new_player(Some(&json!({"credits": 500, "name": "rookie"})));
        assert_eq!(merged["credits"], 500);
        assert_eq!(merged["fuel"], 100);
        assert_eq!(merged["cargo"], 10);
        assert_eq!(merged["name"], "rookie");
        assert_eq!(resolve_new_player(None)["health"], 100);
    }
}
