//! Reduction of per-batch metrics into the run's final metrics.

use hp_types::{config_error, FinalMetrics, HpResult, MetricsRecord};
use tracing::info;

/// Reduce every batch's metrics into one [`FinalMetrics`].
///
/// Totals are sums. Averages are unweighted means over batches, so a short
/// trailing batch counts as much as a full one; existing optimization traces
/// were recorded this way. An empty slice is a configuration error.
pub fn aggregate(records: &[MetricsRecord]) -> HpResult<FinalMetrics> {
    if records.is_empty() {
        return Err(config_error!(
            "cannot aggregate metrics: no batches were processed"
        ));
    }

    let batches = records.len() as f64;
    let total_greetings_processed = records.iter().map(|r| r.greetings_processed).sum();
    let total_elapsed_seconds = records.iter().map(|r| r.elapsed_seconds).sum();
    let average_throughput = records.iter().map(|r| r.throughput).sum::<f64>() / batches;
    let average_efficiency_score =
        records.iter().map(|r| r.efficiency_score).sum::<f64>() / batches;

    info!(
        "Aggregated {} batches: {} greetings, target metric {:.4}",
        records.len(),
        total_greetings_processed,
        average_efficiency_score
    );

    Ok(FinalMetrics {
        total_greetings_processed,
        total_elapsed_seconds,
        average_throughput,
        average_efficiency_score,
        target_metric: average_efficiency_score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hp_types::HpError;

    fn record(greetings: usize, elapsed: f64, throughput: f64, efficiency: f64) -> MetricsRecord {
        MetricsRecord {
            greetings_processed: greetings,
            elapsed_seconds: elapsed,
            throughput,
            efficiency_score: efficiency,
        }
    }

    #[test]
    fn unweighted_means() {
        // Batch sizes differ; each batch still counts once.
        let records = vec![
            record(8, 4.0, 2.0, 2.0),
            record(2, 1.0, 2.0, 4.0),
            record(4, 1.0, 5.0, 6.0),
        ];
        let final_metrics = aggregate(&records).unwrap();

        assert_eq!(final_metrics.total_greetings_processed, 14);
        assert_eq!(final_metrics.total_elapsed_seconds, 6.0);
        assert_eq!(final_metrics.average_throughput, 3.0);
        assert_eq!(final_metrics.average_efficiency_score, 4.0);
        assert_eq!(final_metrics.target_metric, 4.0);
    }

    #[test]
    fn single_batch_target_is_its_own_score() {
        let final_metrics = aggregate(&[record(6, 0.6, 10.0, 100.0)]).unwrap();
        assert_eq!(final_metrics.target_metric, 100.0);
        assert_eq!(final_metrics.total_greetings_processed, 6);
    }

    #[test]
    fn zero_records_is_config_error() {
        let err = aggregate(&[]).unwrap_err();
        assert!(matches!(err, HpError::Config(_)));
    }
}
