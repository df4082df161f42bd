//! Items whose data could not be opened during a run.

use crate::OutputIndex;
use std::fmt;
use std::io;

/// An item whose data could not be opened during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedItem {
    /// Output index the engine asked for.
    pub index: OutputIndex,
    /// In-archive path of the item.
    pub path: String,
    /// Human-readable reason.
    pub reason: String,
    /// Kind of the underlying I/O error.
    pub kind: io::ErrorKind,
}

impl fmt::Display for FailedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.path, self.index, self.reason)
    }
}

/// Items whose data could not be opened, in the order the engine asked.
///
/// A failure here never aborts the run; the engine skips the item and moves
/// on. Failures the engine reports itself are not recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureLog {
    entries: Vec<FailedItem>,
}

impl FailureLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, index: OutputIndex, path: &str, error: &io::Error) -> &FailedItem {
        self.entries.push(FailedItem {
            index,
            path: path.to_string(),
            reason: error.to_string(),
            kind: error.kind(),
        });
        &self.entries[self.entries.len() - 1]
    }

    /// Returns the number of failed items.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when every item could be opened.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the failures.
    pub fn iter(&self) -> std::slice::Iter<'_, FailedItem> {
        self.entries.iter()
    }

    /// Returns the failure recorded for `index`, if any.
    pub fn get(&self, index: OutputIndex) -> Option<&FailedItem> {
        self.entries.iter().find(|f| f.index == index)
    }

    /// Returns the failures as a slice.
    pub fn as_slice(&self) -> &[FailedItem] {
        &self.entries
    }
}

impl<'a> IntoIterator for &'a FailureLog {
    type Item = &'a FailedItem;
    type IntoIter = std::slice::Iter<'a, FailedItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
