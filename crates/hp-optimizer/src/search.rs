//! Search space definitions and parameter sweep strategies.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single parameter dimension in the search space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDef {
    pub name: String,
    pub kind: ParameterKind,
}

/// Describes how a parameter is sampled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterKind {
    /// Continuous uniform range [low, high].
    FloatRange { low: f64, high: f64 },
    /// Integer range [low, high] inclusive.
    IntRange { low: i64, high: i64 },
    /// Categorical choices.
    Choice { values: Vec<serde_json::Value> },
}

/// A concrete parameter value produced by a search strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Int(i64),
    Float(f64),
    Json(serde_json::Value),
}

impl std::fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Json(serde_json::Value::String(s)) => f.write_str(s),
            Self::Json(v) => write!(f, "{v}"),
        }
    }
}

/// The full search space: an ordered list of parameter definitions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchSpace {
    pub parameters: Vec<ParameterDef>,
}

impl SearchSpace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_float(mut self, name: impl Into<String>, low: f64, high: f64) -> Self {
        self.parameters.push(ParameterDef {
            name: name.into(),
            kind: ParameterKind::FloatRange { low, high },
        });
        self
    }

    pub fn add_int(mut self, name: impl Into<String>, low: i64, high: i64) -> Self {
        self.parameters.push(ParameterDef {
            name: name.into(),
            kind: ParameterKind::IntRange { low, high },
        });
        self
    }

    pub fn add_choice(mut self, name: impl Into<String>, values: Vec<serde_json::Value>) -> Self {
        self.parameters.push(ParameterDef {
            name: name.into(),
            kind: ParameterKind::Choice { values },
        });
        self
    }

    /// Number of grid points when every float dimension is split into
    /// `float_steps` values. `None` on overflow.
    pub fn grid_size(&self, float_steps: usize) -> Option<usize> {
        self.parameters.iter().try_fold(1usize, |total, param| {
            let dim = match &param.kind {
                ParameterKind::IntRange { low, high } => (high - low + 1).max(0) as usize,
                ParameterKind::Choice { values } => values.len(),
                ParameterKind::FloatRange { .. } => float_steps.max(2),
            };
            total.checked_mul(dim)
        })
    }
}

// ---------------------------------------------------------------------------
// Search strategies
// ---------------------------------------------------------------------------

/// Common trait for all search strategies.
pub trait SearchStrategy: Send {
    /// Generate the next batch of parameter combinations to evaluate.
    fn suggest(&mut self, count: usize) -> Vec<HashMap<String, ParameterValue>>;

    fn name(&self) -> &str;
}

// ---- Grid search ----

/// Exhaustive grid search. Float ranges are split into evenly spaced steps.
#[derive(Debug, Clone)]
pub struct GridSearch {
    cursor: usize,
    combos: Vec<HashMap<String, ParameterValue>>,
}

impl GridSearch {
    pub fn new(space: &SearchSpace, float_steps: usize) -> Self {
        Self {
            cursor: 0,
            combos: Self::build_grid(space, float_steps),
        }
    }

    fn build_grid(space: &SearchSpace, float_steps: usize) -> Vec<HashMap<String, ParameterValue>> {
        let mut result: Vec<HashMap<String, ParameterValue>> = vec![HashMap::new()];

        for param in &space.parameters {
            let values: Vec<ParameterValue> = match &param.kind {
                ParameterKind::FloatRange { low, high } => {
                    let steps = float_steps.max(2);
                    (0..steps)
                        .map(|i| {
                            let t = i as f64 / (steps - 1) as f64;
                            ParameterValue::Float(low + t * (high - low))
                        })
                        .collect()
                }
                ParameterKind::IntRange { low, high } => {
                    (*low..=*high).map(ParameterValue::Int).collect()
                }
                ParameterKind::Choice { values } => {
                    values.iter().cloned().map(ParameterValue::Json).collect()
                }
            };

            // Cartesian product, earlier parameters vary slowest.
            let mut next = Vec::with_capacity(result.len() * values.len());
            for existing in &result {
                for value in &values {
                    let mut combo = existing.clone();
                    combo.insert(param.name.clone(), value.clone());
                    next.push(combo);
                }
            }
            result = next;
        }

        result
    }
}

impl SearchStrategy for GridSearch {
    fn suggest(&mut self, count: usize) -> Vec<HashMap<String, ParameterValue>> {
        let end = (self.cursor + count).min(self.combos.len());
        let batch = self.combos[self.cursor..end].to_vec();
        self.cursor = end;
        batch
    }

    fn name(&self) -> &str {
        "grid"
    }
}

// ---- Random search ----

/// Independent random sampling across the search space.
#[derive(Debug, Clone)]
pub struct RandomSearch {
    space: SearchSpace,
    rng: StdRng,
}

impl RandomSearch {
    pub fn new(space: SearchSpace) -> Self {
        Self {
            space,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible sampling for a fixed seed.
    pub fn with_seed(space: SearchSpace, seed: u64) -> Self {
        Self {
            space,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn sample_one(&mut self) -> HashMap<String, ParameterValue> {
        let mut params = HashMap::new();

        for param in &self.space.parameters {
            let value = match &param.kind {
                ParameterKind::FloatRange { low, high } => {
                    ParameterValue::Float(self.rng.random_range(*low..=*high))
                }
                ParameterKind::IntRange { low, high } => {
                    ParameterValue::Int(self.rng.random_range(*low..=*high))
                }
                ParameterKind::Choice { values } => {
                    if values.is_empty() {
                        continue;
                    }
                    let idx = self.rng.random_range(0..values.len());
                    ParameterValue::Json(values[idx].clone())
                }
            };
            params.insert(param.name.clone(), value);
        }

        params
    }
}

impl SearchStrategy for RandomSearch {
    fn suggest(&mut self, count: usize) -> Vec<HashMap<String, ParameterValue>> {
        (0..count).map(|_| self.sample_one()).collect()
    }

    fn name(&self) -> &str {
        "random"
    }
}
