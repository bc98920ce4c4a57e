//! Shared pieces of budgeted entity placement: spacing checks and
//! configured type tables.

use rand::Rng;
use serde_json::Value;

use crate::grid::Pos;

/// A placed entity, kept while placing the rest of its budget.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub kind: String,
    pub pos: Pos,
}

/// True when `pos` is closer than `min_distance` to any placement.
pub fn too_close(placed: &[Placement], pos: Pos, min_distance: f64) -> bool {
    placed.iter().any(|p| {
        let dx = (p.pos.0 - pos.0) as f64;
        let dy = (p.pos.1 - pos.1) as f64;
        (dx * dx + dy * dy).sqrt() < min_distance
    })
}

/// Smallest pairwise distance among placements, `None` below two entries.
pub fn min_pairwise_distance(positions: &[Pos]) -> Option<f64> {
    let mut best: Option<f64> = None;
    for (i, a) in positions.iter().enumerate() {
        for b in &positions[i + 1..] {
            let d = (((a.0 - b.0).pow(2) + (a.1 - b.1).pow(2)) as f64).sqrt();
            best = Some(best.map_or(d, |m| m.min(d)));
        }
    }
    best
}

/// How an entity's type is chosen.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeTable {
    /// `{ "name": weight, ... }`
    Weighted(Vec<(String, f64)>),
    /// `["name", ...]`
    Uniform(Vec<String>),
}

impl TypeTable {
    /// `Ok(None)` when no table is configured; `Err` describes a malformed one.
    pub fn parse(value: Option<&Value>) -> Result<Option<Self>, String> {
        let value = match value {
            None | Some(Value::Null) => return Ok(None),
            Some(v) => v,
        };
        match value {
            Value::Object(map) => {
                let mut weights = Vec::with_capacity(map.len());
                for (name, weight) in map {
                    let w = weight
                        .as_f64()
                        .filter(|w| w.is_finite() && *w >= 0.0)
                        .ok_or_else(|| format!("weight for '{name}' is not a non-negative number"))?;
                    weights.push((name.clone(), w));
                }
                if weights.iter().map(|(_, w)| w).sum::<f64>() <= 0.0 {
                    return Err("weights sum to zero".into());
                }
                Ok(Some(TypeTable::Weighted(weights)))
            }
            Value::Array(list) => {
                let names = list
                    .iter()
                    .map(|v| v.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()
                    .ok_or("type list must contain only strings")?;
                if names.is_empty() {
                    return Err("type list is empty".into());
                }
                Ok(Some(TypeTable::Uniform(names)))
            }
            other => Err(format!("expected an object or array, got {other}")),
        }
    }

    pub fn uniform<S: AsRef<str>>(names: &[S]) -> Self {
        TypeTable::Uniform(names.iter().map(|n| n.as_ref().to_string()).collect())
    }

    /// Rescale weights to sum to 100. Lists are unchanged.
    pub fn normalized(self) -> Self {
        match self {
            TypeTable::Weighted(weights) => {
                let total: f64 = weights.iter().map(|(_, w)| w).sum();
                if total <= 0.0 {
                    return TypeTable::Weighted(weights);
                }
                TypeTable::Weighted(
                    weights
                        .into_iter()
                        .map(|(n, w)| (n, w * 100.0 / total))
                        .collect(),
                )
            }
            uniform => uniform,
        }
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        match self {
            TypeTable::Uniform(names) => {
                if names.is_empty() {
                    return None;
                }
                Some(names[rng.gen_range(0..names.len())].as_str())
            }
            TypeTable::Weighted(weights) => {
                let total: f64 = weights.iter().map(|(_, w)| w).sum();
                if total <= 0.0 {
                    return None;
                }
                let mut roll = rng.gen_range(0.0..total);
                for (name, w) in weights {
                    if roll < *w {
                        return Some(name.as_str());
                    }
                    roll -= w;
                }
                // float drift: fall to the last positive weight
                weights
                    .iter()
                    .rev()
                    .find(|(_, w)| *w > 0.0)
                    .map(|(n, _)| n.as_str())
            }
        }
    }
}
