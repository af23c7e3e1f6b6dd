//! Metric records exchanged between batch processors, the aggregator and optimizers.

use serde::{Deserialize, Serialize};

/// Metrics for one processed batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub greetings_processed: usize,
    pub elapsed_seconds: f64,
    pub throughput: f64,
    pub efficiency_score: f64,
}

/// Run-level reduction of every [`MetricsRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalMetrics {
    pub total_greetings_processed: usize,
    pub total_elapsed_seconds: f64,
    pub average_throughput: f64,
    pub average_efficiency_score: f64,
    /// The value an external optimizer maximizes. Always equal to
    /// `average_efficiency_score`.
    pub target_metric: f64,
}
