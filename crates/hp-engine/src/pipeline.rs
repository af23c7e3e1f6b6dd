// Pipeline runner: batch, fan out one task per batch, join, aggregate

use std::path::PathBuf;
use std::sync::Arc;

use hp_types::{
    config_error, BatchError, FinalMetrics, HpResult, PipelineParams, INPUT_GREETINGS,
};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::aggregator::aggregate;
use crate::batcher::make_batches;
use crate::output::ResultWriter;
use crate::processor::{BatchOutput, BatchProcessor};
use crate::simulator::{SleepWork, WorkSimulator};

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Per-batch outputs, ordered by batch index.
    pub batches: Vec<BatchOutput>,
    pub final_metrics: FinalMetrics,
    pub final_metrics_path: PathBuf,
}

/// One configured run over an ordered input sequence.
pub struct Pipeline {
    params: PipelineParams,
    inputs: Vec<String>,
    work: Arc<dyn WorkSimulator>,
}

impl Pipeline {
    /// Pipeline over the fixed greetings, paying the real delay per item.
    pub fn new(params: PipelineParams) -> Self {
        Self {
            params,
            inputs: INPUT_GREETINGS.iter().map(|s| s.to_string()).collect(),
            work: Arc::new(SleepWork),
        }
    }

    pub fn with_work(mut self, work: Arc<dyn WorkSimulator>) -> Self {
        self.work = work;
        self
    }

    pub fn with_inputs<S: Into<String>>(mut self, inputs: impl IntoIterator<Item = S>) -> Self {
        self.inputs = inputs.into_iter().map(Into::into).collect();
        self
    }

    /// Run every batch concurrently, then aggregate and write final metrics.
    ///
    /// Configuration errors surface before any batch starts. The first failed
    /// batch aborts the rest and no final metrics are written.
    pub async fn run(&self) -> HpResult<RunReport> {
        self.params.validate()?;
        let batches = make_batches(self.inputs.as_slice(), self.params.batch_size)?;
        if batches.is_empty() {
            return Err(config_error!("input produced no batches"));
        }

        info!(
            "Running {} batches (style={}, batch_size={}, repeat_count={}, delay={}s)",
            batches.len(),
            self.params.greeting_style,
            self.params.batch_size,
            self.params.repeat_count,
            self.params.delay
        );

        let processor = Arc::new(BatchProcessor::new(&self.params, self.work.clone())?);
        let writer = ResultWriter::create(&self.params.outdir).await?;

        let handles: Vec<(usize, JoinHandle<Result<BatchOutput, BatchError>>)> = batches
            .into_iter()
            .map(|batch| {
                let processor = processor.clone();
                let writer = writer.clone();
                let index = batch.index;
                let handle = tokio::spawn(async move {
                    let output = processor.process(&batch).await;
                    writer
                        .write_batch(&output)
                        .await
                        .map_err(|e| BatchError::OutputFailed {
                            index,
                            message: e.to_string(),
                        })?;
                    Ok(output)
                });
                (index, handle)
            })
            .collect();

        let outputs = join_batches(handles).await?;

        let records: Vec<_> = outputs.iter().map(|o| o.metrics.clone()).collect();
        let final_metrics = aggregate(&records)?;
        let final_metrics_path = writer.write_final(&final_metrics).await?;

        info!(
            "Run complete: target_metric={:.4}, written to {}",
            final_metrics.target_metric,
            final_metrics_path.display()
        );

        Ok(RunReport {
            batches: outputs,
            final_metrics,
            final_metrics_path,
        })
    }
}

/// Await every batch in index order, aborting the remainder on first failure.
async fn join_batches(
    handles: Vec<(usize, JoinHandle<Result<BatchOutput, BatchError>>)>,
) -> HpResult<Vec<BatchOutput>> {
    let mut outputs = Vec::with_capacity(handles.len());
    let mut pending = handles.into_iter();

    while let Some((index, handle)) = pending.next() {
        let failure = match handle.await {
            Ok(Ok(output)) => {
                debug!("Batch {} joined", index);
                outputs.push(output);
                continue;
            }
            Ok(Err(e)) => e,
            Err(e) if e.is_panic() => BatchError::Panicked {
                index,
                message: e.to_string(),
            },
            Err(_) => BatchError::Cancelled { index },
        };

        warn!("{}; aborting remaining batches", failure);
        for (_, rest) in pending {
            rest.abort();
        }
        return Err(failure.into());
    }

    Ok(outputs)
}
