//! Per-batch processing: transform, simulate work, expand, measure.

use std::sync::Arc;
use std::time::Duration;

use hp_types::{GreetingStyle, HpResult, MetricsRecord, PipelineParams, GREETING_SUFFIX};
use tokio::time::Instant;
use tracing::debug;

use crate::batcher::Batch;
use crate::simulator::WorkSimulator;

/// Everything one batch produces.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutput {
    pub index: usize,
    /// Transformed greetings, each repeated `repeat_count` times, in input order.
    pub lines: Vec<String>,
    pub metrics: MetricsRecord,
}

/// Processes batches under one immutable parameter set.
///
/// Holds no mutable state, so a single instance can serve any number of
/// concurrently running batches.
pub struct BatchProcessor {
    style: GreetingStyle,
    repeat_count: usize,
    delay: Duration,
    delay_seconds: f64,
    work: Arc<dyn WorkSimulator>,
}

impl BatchProcessor {
    pub fn new(params: &PipelineParams, work: Arc<dyn WorkSimulator>) -> HpResult<Self> {
        Ok(Self {
            style: params.greeting_style,
            repeat_count: params.repeat_count,
            delay: params.delay_duration()?,
            delay_seconds: params.delay,
            work,
        })
    }

    /// Run one batch to completion.
    pub async fn process(&self, batch: &Batch) -> BatchOutput {
        let start = Instant::now();
        let mut lines = Vec::with_capacity(batch.len() * self.repeat_count);

        for item in &batch.items {
            self.work.simulate(self.delay).await;
            let greeting = format!("{}{}", self.style.apply(item), GREETING_SUFFIX);
            lines.extend(std::iter::repeat(greeting).take(self.repeat_count));
        }

        let elapsed_seconds = start.elapsed().as_secs_f64();
        let metrics = compute_metrics(
            batch.len() * self.repeat_count,
            elapsed_seconds,
            self.delay_seconds,
        );

        debug!(
            "Batch {} processed {} greetings in {:.3}s (efficiency {:.3})",
            batch.index, metrics.greetings_processed, elapsed_seconds, metrics.efficiency_score
        );

        BatchOutput {
            index: batch.index,
            lines,
            metrics,
        }
    }
}

/// Throughput and efficiency for one batch.
///
/// Both fall back to 0 rather than dividing by zero: throughput when no time
/// elapsed, efficiency when `elapsed_seconds * delay` is zero.
pub fn compute_metrics(
    greetings_processed: usize,
    elapsed_seconds: f64,
    delay: f64,
) -> MetricsRecord {
    let count = greetings_processed as f64;

    let throughput = if elapsed_seconds > 0.0 {
        count / elapsed_seconds
    } else {
        0.0
    };

    let cost = elapsed_seconds * delay;
    let efficiency_score = if cost > 0.0 { count / cost } else { 0.0 };

    MetricsRecord {
        greetings_processed,
        elapsed_seconds,
        throughput,
        efficiency_score,
    }
}
