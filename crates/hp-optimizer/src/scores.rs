//! Reading a run's final metrics back as optimizer scores.

use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Key of the value an optimizer maximizes.
pub const TARGET_METRIC: &str = "target_metric";

const SCORE_KEYS: [&str; 5] = [
    TARGET_METRIC,
    "average_efficiency_score",
    "average_throughput",
    "total_greetings_processed",
    "total_elapsed_seconds",
];

/// Extract scores from a `final_metrics.json` file.
///
/// A missing or unreadable file is not an error: the trial simply scores
/// `target_metric = 0.0`. Fields absent from the file read as 0.
pub fn extract_scores(path: &Path) -> HashMap<String, f64> {
    match read_metrics(path) {
        Ok(metrics) => {
            let scores: HashMap<String, f64> = SCORE_KEYS
                .iter()
                .map(|key| {
                    let value = metrics.get(*key).and_then(|v| v.as_f64()).unwrap_or(0.0);
                    (key.to_string(), value)
                })
                .collect();
            info!("Extracted scores from {}: {:?}", path.display(), scores);
            scores
        }
        Err(e) => {
            warn!(
                "Could not read metrics from {}: {}, returning defaults",
                path.display(),
                e
            );
            HashMap::from([(TARGET_METRIC.to_string(), 0.0)])
        }
    }
}

fn read_metrics(path: &Path) -> Result<serde_json::Value, String> {
    let contents = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&contents).map_err(|e| e.to_string())
}

/// The objective named `metric`, 0 when absent.
pub fn objective_from_scores(scores: &HashMap<String, f64>, metric: &str) -> f64 {
    scores.get(metric).copied().unwrap_or(0.0)
}
