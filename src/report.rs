use std::path::PathBuf;

use crate::foundation::error::MintResult;

/// Result of one item of a batch, keyed by its 1-based position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemOutcome {
    /// 1-based position in the manifest (matches the output file name).
    pub position: usize,
    /// Written path, or the failure reason.
    pub result: Result<PathBuf, String>,
}

impl ItemOutcome {
    /// Convert a per-item result, keeping only the error's message.
    pub fn from_result(position: usize, r: MintResult<PathBuf>) -> Self {
        Self {
            position,
            result: r.map_err(|e| e.to_string()),
        }
    }

    /// Whether the item was written.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-item outcomes of a batch, in manifest order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// One entry per attempted item.
    pub outcomes: Vec<ItemOutcome>,
}

impl BatchReport {
    /// Append an outcome.
    pub fn push(&mut self, outcome: ItemOutcome) {
        self.outcomes.push(outcome);
    }

    /// Number of attempted items.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether nothing was attempted.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Successfully written items.
    pub fn succeeded(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes.iter().filter(|o| o.is_ok())
    }

    /// Failed items.
    pub fn failed(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }

    /// Positions that failed, ascending.
    pub fn failed_positions(&self) -> Vec<usize> {
        self.failed().map(|o| o.position).collect()
    }

    /// True when every attempted item succeeded.
    pub fn is_clean(&self) -> bool {
        self.outcomes.iter().all(ItemOutcome::is_ok)
    }
}

#[cfg(test)]
#[path = "../tests/unit/report.rs"]
mod tests;
