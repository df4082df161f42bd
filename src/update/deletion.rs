//! Original items marked for removal.

use crate::{Error, OriginalIndex, Result};
use std::collections::BTreeSet;

/// Original items marked for removal.
///
/// The set knows how many items the original archive has and refuses indices
/// outside that range, so every member is a real item.
///
/// # Example
///
/// ```rust
/// use arcweave::{DeletionSet, OriginalIndex};
///
/// let mut deletions = DeletionSet::new(5);
/// deletions.insert(OriginalIndex::new(1))?;
/// deletions.insert(OriginalIndex::new(3))?;
/// assert_eq!(deletions.kept_count(), 3);
/// assert!(deletions.insert(OriginalIndex::new(5)).is_err());
/// # Ok::<(), arcweave::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionSet {
    original_count: u32,
    indices: BTreeSet<OriginalIndex>,
}

impl DeletionSet {
    /// Creates an empty set for an archive with `original_count` items.
    pub fn new(original_count: u32) -> Self {
        Self {
            original_count,
            indices: BTreeSet::new(),
        }
    }

    /// Marks `index` for deletion.
    ///
    /// Returns `Ok(true)` if the index was newly marked.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if `index` is not below the
    /// original item count.
    pub fn insert(&mut self, index: OriginalIndex) -> Result<bool> {
        if index.get() >= self.original_count {
            return Err(Error::IndexOutOfRange {
                index: index.get(),
                count: self.original_count,
            });
        }
        Ok(self.indices.insert(index))
    }

    /// Unmarks `index`. Returns `true` if it was marked.
    pub fn remove(&mut self, index: OriginalIndex) -> bool {
        self.indices.remove(&index)
    }

    /// Returns `true` if `index` is marked.
    pub fn contains(&self, index: OriginalIndex) -> bool {
        self.indices.contains(&index)
    }

    /// Returns the number of marked items.
    pub fn len(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Returns `true` when nothing is marked.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Returns the item count of the original archive.
    pub fn original_count(&self) -> u32 {
        self.original_count
    }

    /// Returns how many original items survive.
    pub fn kept_count(&self) -> u32 {
        self.original_count - self.len()
    }

    /// Iterates over the marked indices in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = OriginalIndex> + '_ {
        self.indices.iter().copied()
    }
}
