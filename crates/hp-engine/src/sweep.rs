//! Local parameter sweep: propose, run, score, keep the best.

use std::sync::Arc;

use hp_optimizer::{
    extract_scores, hello_search_space, objective_from_scores, params_from_values, GridSearch,
    OptimizationStatus, RandomSearch, SearchStrategy, SweepConfig, Trial, TrialResult,
};
use hp_types::{config_error, HpResult, PipelineParams};
use tokio::time::Instant;
use tracing::{info, warn};

use crate::output::ResultWriter;
use crate::pipeline::Pipeline;
use crate::simulator::WorkSimulator;

pub const SWEEP_SUMMARY_FILE: &str = "sweep_summary.json";

fn build_strategy(config: &SweepConfig) -> HpResult<Box<dyn SearchStrategy>> {
    let space = hello_search_space();
    match config.strategy.as_str() {
        "grid" => {
            if let Some(size) = space.grid_size(config.grid_steps) {
                if size > config.max_trials {
                    warn!(
                        "Grid has {} points but only {} trials will run",
                        size, config.max_trials
                    );
                }
            }
            Ok(Box::new(GridSearch::new(&space, config.grid_steps)))
        }
        "random" => Ok(match config.seed {
            Some(seed) => Box::new(RandomSearch::with_seed(space, seed)),
            None => Box::new(RandomSearch::new(space)),
        }),
        other => Err(config_error!(
            "unknown search strategy '{other}', expected 'grid' or 'random'"
        )),
    }
}

/// Run up to `config.max_trials` trials one after another.
///
/// Each trial writes into `<base.outdir>/trial_<NNN>` and is scored from its
/// own `final_metrics.json`. A failed trial is recorded and the sweep moves on;
/// the sweep itself is marked failed only when no trial completes. The returned
/// status is also written to `<base.outdir>/sweep_summary.json`.
pub async fn run_sweep(
    config: SweepConfig,
    base: &PipelineParams,
    work: Arc<dyn WorkSimulator>,
) -> HpResult<OptimizationStatus> {
    let mut strategy = build_strategy(&config)?;
    let suggestions = strategy.suggest(config.max_trials);
    if suggestions.is_empty() {
        return Err(config_error!("search strategy proposed no trials"));
    }

    let writer = ResultWriter::create(&base.outdir).await?;
    let mut status = OptimizationStatus::new(config);
    status.mark_running();

    info!(
        "Starting {} sweep '{}' with {} trials",
        strategy.name(),
        status.config.name,
        suggestions.len()
    );

    for (trial_number, values) in suggestions.into_iter().enumerate() {
        let mut trial = Trial::new(trial_number, values);
        trial.mark_running();
        let started = Instant::now();

        let outcome = match params_from_values(&trial.parameters, base) {
            Ok(params) => {
                let trial_dir = base.outdir.join(format!("trial_{trial_number:03}"));
                let params = params.with_outdir(trial_dir);
                Pipeline::new(params).with_work(work.clone()).run().await
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok(report) => {
                let scores = extract_scores(&report.final_metrics_path);
                let objective = objective_from_scores(&scores, &status.config.objective_metric);
                info!("Trial {} scored {:.4}", trial_number, objective);

                trial.mark_completed(TrialResult {
                    trial_id: trial.id,
                    trial_number,
                    objective,
                    metrics: scores,
                    parameters: trial.parameters.clone(),
                    duration_seconds: started.elapsed().as_secs_f64(),
                });
            }
            Err(e) => {
                warn!("Trial {} failed: {}", trial_number, e);
                trial.mark_failed(e.to_string());
            }
        }

        status.record(trial);
    }

    if status.trials_completed() == 0 {
        let error = format!("all {} trials failed", status.trials_failed());
        warn!("Sweep '{}': {}", status.config.name, error);
        status.mark_failed(error);
    } else {
        status.mark_completed();
    }
    if let Some(best) = &status.best_trial {
        info!(
            "Best trial #{} with {} = {:.4}",
            best.trial_number, status.config.objective_metric, best.objective
        );
    }

    writer
        .write_json(&writer.outdir().join(SWEEP_SUMMARY_FILE), &status)
        .await?;

    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::SleepWork;
    use hp_optimizer::{ObjectiveDirection, OptimizationState, TrialStatus};
    use hp_types::HpError;

    #[tokio::test(start_paused = true)]
    async fn random_sweep_tracks_best_trial() {
        let dir = tempfile::tempdir().unwrap();
        let base = PipelineParams::new().with_outdir(dir.path());
        let config = SweepConfig::new("test", "random")
            .with_max_trials(4)
            .with_seed(Some(42));

        let status = run_sweep(config, &base, Arc::new(SleepWork)).await.unwrap();

        assert_eq!(status.state, OptimizationState::Completed);
        assert_eq!(status.trials.len(), 4);
        assert_eq!(status.trials_completed(), 4);

        let best = status.best_trial.as_ref().unwrap();
        let max = status
            .trials
            .iter()
            .filter_map(|t| t.result.as_ref())
            .map(|r| r.objective)
            .fold(f64::MIN, f64::max);
        assert_eq!(best.objective, max);
        assert!(best.objective > 0.0);

        assert!(dir.path().join("trial_000/final_metrics.json").exists());
        assert!(dir.path().join(SWEEP_SUMMARY_FILE).exists());
    }

    #[tokio::test(start_paused = true)]
    async fn grid_sweep_stops_at_max_trials() {
        let dir = tempfile::tempdir().unwrap();
        let base = PipelineParams::new().with_outdir(dir.path());
        let config = SweepConfig::new("grid", "grid")
            .with_max_trials(2)
            .with_grid_steps(2);

        let status = run_sweep(config, &base, Arc::new(SleepWork)).await.unwrap();
        assert_eq!(status.trials.len(), 2);
        assert!(status
            .trials
            .iter()
            .all(|t| t.status == TrialStatus::Completed));
    }

    #[tokio::test]
    async fn unknown_strategy_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let base = PipelineParams::new().with_outdir(dir.path());
        let err = run_sweep(SweepConfig::new("x", "annealing"), &base, Arc::new(SleepWork))
            .await
            .unwrap_err();
        assert!(matches!(err, HpError::Config(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn minimize_keeps_lowest_objective() {
        let dir = tempfile::tempdir().unwrap();
        let base = PipelineParams::new().with_outdir(dir.path());
        let config = SweepConfig::new("fast", "random")
            .with_max_trials(3)
            .with_seed(Some(3))
            .with_objective("total_elapsed_seconds", ObjectiveDirection::Minimize);

        let status = run_sweep(config, &base, Arc::new(SleepWork)).await.unwrap();

        let min = status
            .trials
            .iter()
            .filter_map(|t| t.result.as_ref())
            .map(|r| r.objective)
            .fold(f64::MAX, f64::min);
        assert_eq!(status.best_trial.as_ref().unwrap().objective, min);
    }

    #[tokio::test]
    async fn sweep_fails_when_no_trial_completes() {
        let dir = tempfile::tempdir().unwrap();
        // Files where the trial directories belong make every trial fail.
        std::fs::write(dir.path().join("trial_000"), "").unwrap();
        std::fs::write(dir.path().join("trial_001"), "").unwrap();

        let base = PipelineParams::new().with_outdir(dir.path());
        let config = SweepConfig::new("blocked", "grid").with_max_trials(2);
        let status = run_sweep(config, &base, Arc::new(SleepWork)).await.unwrap();

        assert_eq!(status.state, OptimizationState::Failed);
        assert_eq!(status.trials_failed(), 2);
        assert!(status.best_trial.is_none());
        assert_eq!(status.error.as_deref(), Some("all 2 trials failed"));
        assert!(dir.path().join(SWEEP_SUMMARY_FILE).exists());
    }
}
