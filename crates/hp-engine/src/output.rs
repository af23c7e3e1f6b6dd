//! Flat-file outputs of a run.

use std::path::{Path, PathBuf};

use hp_types::{FinalMetrics, HpResult};
use serde::Serialize;
use tracing::debug;

use crate::processor::BatchOutput;

pub const FINAL_METRICS_FILE: &str = "final_metrics.json";

/// Writes run outputs under one directory.
#[derive(Debug, Clone)]
pub struct ResultWriter {
    outdir: PathBuf,
}

impl ResultWriter {
    /// Create the output directory if needed.
    pub async fn create<P: AsRef<Path>>(outdir: P) -> HpResult<Self> {
        let outdir = outdir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&outdir).await?;
        Ok(Self { outdir })
    }

    pub fn outdir(&self) -> &Path {
        &self.outdir
    }

    pub fn greetings_path(&self, index: usize) -> PathBuf {
        self.outdir.join(format!("batch_{index}_greetings.txt"))
    }

    pub fn metrics_path(&self, index: usize) -> PathBuf {
        self.outdir.join(format!("batch_{index}_metrics.json"))
    }

    pub fn final_metrics_path(&self) -> PathBuf {
        self.outdir.join(FINAL_METRICS_FILE)
    }

    /// Write one batch's greetings and metrics.
    pub async fn write_batch(&self, output: &BatchOutput) -> HpResult<()> {
        let greetings_path = self.greetings_path(output.index);
        tokio::fs::write(&greetings_path, output.lines.join("\n")).await?;
        self.write_json(&self.metrics_path(output.index), &output.metrics)
            .await?;
        debug!("Wrote outputs for batch {} to {}", output.index, self.outdir.display());
        Ok(())
    }

    /// Write the run's final metrics, returning the file path.
    pub async fn write_final(&self, metrics: &FinalMetrics) -> HpResult<PathBuf> {
        let path = self.final_metrics_path();
        self.write_json(&path, metrics).await?;
        Ok(path)
    }

    pub async fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> HpResult<()> {
        let json = serde_json::to_string_pretty(value)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}
