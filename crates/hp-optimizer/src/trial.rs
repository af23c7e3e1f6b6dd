//! Trial tracking and sweep run management.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::scores::TARGET_METRIC;
use crate::search::ParameterValue;

/// Whether we are maximizing or minimizing the objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ObjectiveDirection {
    #[default]
    Maximize,
    Minimize,
}

impl std::str::FromStr for ObjectiveDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "maximize" | "max" => Ok(Self::Maximize),
            "minimize" | "min" => Ok(Self::Minimize),
            other => Err(format!(
                "unknown objective direction '{other}', expected 'maximize' or 'minimize'"
            )),
        }
    }
}

/// Configuration for a local parameter sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    pub id: Uuid,
    pub name: String,

    /// "grid" or "random".
    pub strategy: String,

    pub max_trials: usize,

    /// Score key read from the trial's final metrics.
    pub objective_metric: String,

    pub direction: ObjectiveDirection,

    /// Number of steps per float dimension for grid search.
    pub grid_steps: usize,

    /// Seed for random search. `None` samples from the OS.
    pub seed: Option<u64>,

    pub created_at: DateTime<Utc>,
}

impl SweepConfig {
    pub fn new(name: impl Into<String>, strategy: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            strategy: strategy.to_string(),
            max_trials: 20,
            objective_metric: TARGET_METRIC.to_string(),
            direction: ObjectiveDirection::Maximize,
            grid_steps: 3,
            seed: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_max_trials(mut self, n: usize) -> Self {
        self.max_trials = n;
        self
    }

    pub fn with_grid_steps(mut self, n: usize) -> Self {
        self.grid_steps = n;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_objective(mut self, metric: &str, direction: ObjectiveDirection) -> Self {
        self.objective_metric = metric.to_string();
        self.direction = direction;
        self
    }
}

/// Lifecycle state for a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptimizationState {
    Pending,
    Running,
    Completed,
    Failed,
}

/// Aggregate status of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationStatus {
    pub config: SweepConfig,
    pub state: OptimizationState,
    pub trials: Vec<Trial>,
    pub best_trial: Option<TrialResult>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl OptimizationStatus {
    pub fn new(config: SweepConfig) -> Self {
        Self {
            config,
            state: OptimizationState::Pending,
            trials: Vec::new(),
            best_trial: None,
            started_at: None,
            finished_at: None,
            error: None,
        }
    }

    pub fn trials_completed(&self) -> usize {
        self.count(TrialStatus::Completed)
    }

    pub fn trials_failed(&self) -> usize {
        self.count(TrialStatus::Failed)
    }

    fn count(&self, status: TrialStatus) -> usize {
        self.trials.iter().filter(|t| t.status == status).count()
    }

    pub fn mark_running(&mut self) {
        self.state = OptimizationState::Running;
        self.started_at = Some(Utc::now());
    }

    pub fn mark_completed(&mut self) {
        self.state = OptimizationState::Completed;
        self.finished_at = Some(Utc::now());
    }

    pub fn mark_failed(&mut self, error: String) {
        self.state = OptimizationState::Failed;
        self.finished_at = Some(Utc::now());
        self.error = Some(error);
    }

    /// Record a finished trial and update the best result.
    pub fn record(&mut self, trial: Trial) {
        if let Some(result) = &trial.result {
            self.update_best(result);
        }
        self.trials.push(trial);
    }

    /// Update the best trial if `result` improves on the current best.
    pub fn update_best(&mut self, result: &TrialResult) {
        let improves = match &self.best_trial {
            None => true,
            Some(current_best) => match self.config.direction {
                ObjectiveDirection::Maximize => result.objective > current_best.objective,
                ObjectiveDirection::Minimize => result.objective < current_best.objective,
            },
        };
        if improves {
            self.best_trial = Some(result.clone());
        }
    }
}

// ---------------------------------------------------------------------------
// Individual trial
// ---------------------------------------------------------------------------

/// One parameter combination evaluated by a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    pub id: Uuid,
    pub trial_number: usize,
    pub parameters: HashMap<String, ParameterValue>,
    pub status: TrialStatus,
    pub result: Option<TrialResult>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl Trial {
    pub fn new(trial_number: usize, parameters: HashMap<String, ParameterValue>) -> Self {
        Self {
            id: Uuid::new_v4(),
            trial_number,
            parameters,
            status: TrialStatus::Pending,
            result: None,
            started_at: None,
            finished_at: None,
            error: None,
        }
    }

    pub fn mark_running(&mut self) {
        self.status = TrialStatus::Running;
        self.started_at = Some(Utc::now());
    }

    pub fn mark_completed(&mut self, result: TrialResult) {
        self.status = TrialStatus::Completed;
        self.finished_at = Some(Utc::now());
        self.result = Some(result);
    }

    pub fn mark_failed(&mut self, error: String) {
        self.status = TrialStatus::Failed;
        self.finished_at = Some(Utc::now());
        self.error = Some(error);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrialStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

/// Result of a single trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub trial_id: Uuid,
    pub trial_number: usize,
    pub objective: f64,
    pub metrics: HashMap<String, f64>,
    pub parameters: HashMap<String, ParameterValue>,
    pub duration_seconds: f64,
}
