// Splits the ordered input into contiguous batches.

use hp_types::{config_error, HpResult};

/// A contiguous run of input items, processed as one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// Zero-based position of this batch in the run; names its output files.
    pub index: usize,
    pub items: Vec<String>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Partition `items` into batches of `batch_size`, keeping order.
///
/// Every batch holds exactly `batch_size` items except possibly the last, which
/// holds the remainder. Fails before producing anything if `batch_size < 1`.
pub fn make_batches<S: AsRef<str>>(items: &[S], batch_size: usize) -> HpResult<Vec<Batch>> {
    if batch_size < 1 {
        return Err(config_error!("batch_size must be at least 1, got {batch_size}"));
    }

    Ok(items
        .chunks(batch_size)
        .enumerate()
        .map(|(index, chunk)| Batch {
            index,
            items: chunk.iter().map(|s| s.as_ref().to_string()).collect(),
        })
        .collect())
}
