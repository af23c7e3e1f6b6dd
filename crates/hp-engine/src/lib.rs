// Hello pipeline engine
// Batches the input, processes each batch as an independent task, and reduces
// the per-batch metrics into the run's optimization target.

pub mod aggregator;
pub mod batcher;
pub mod output;
pub mod pipeline;
pub mod processor;
pub mod simulator;
pub mod sweep;

pub use aggregator::aggregate;
pub use batcher::{make_batches, Batch};
pub use output::{ResultWriter, FINAL_METRICS_FILE};
pub use pipeline::{Pipeline, RunReport};
pub use processor::{compute_metrics, BatchOutput, BatchProcessor};
pub use simulator::{InstantWork, SleepWork, WorkSimulator};
pub use sweep::{run_sweep, SWEEP_SUMMARY_FILE};
