//! # hp-optimizer
//!
//! The optimizer-facing side of the hello pipeline.
//!
//! Describes the four tunable parameters as a search space, provides grid and
//! random sweep strategies, tracks trials, and reads the `target_metric` an
//! optimizer maximizes back out of `final_metrics.json`.

mod scores;
mod search;
mod space;
mod trial;

pub use scores::{extract_scores, objective_from_scores, TARGET_METRIC};
pub use search::{
    GridSearch, ParameterDef, ParameterKind, ParameterValue, RandomSearch, SearchSpace,
    SearchStrategy,
};
pub use space::{hello_search_space, params_from_values};
pub use trial::{
    ObjectiveDirection, OptimizationState, OptimizationStatus, SweepConfig, Trial, TrialResult,
    TrialStatus,
};
