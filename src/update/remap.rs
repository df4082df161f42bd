//! Output-to-original index translation.

use super::DeletionSet;
use crate::{Error, OriginalIndex, OutputIndex, Result};

/// What an output index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    /// A kept item of the original archive.
    Kept(OriginalIndex),
    /// The new item at this position of the collection.
    New(usize),
}

/// Translates output indices for one run.
///
/// Output indices below the kept count map to surviving original items in
/// their original order; the ones after that map to new items. With no
/// deletions the kept region is the identity and no table is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRemapper {
    kept: Kept,
    new_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kept {
    Identity(u32),
    Table(Vec<OriginalIndex>),
}

impl IndexRemapper {
    /// Builds the remapper for a frozen deletion set and `new_count` new items.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooManyItems`] when the total does not fit in `u32`.
    pub fn new(deletions: &DeletionSet, new_count: usize) -> Result<Self> {
        let kept_count = deletions.kept_count();
        let total = u64::from(kept_count) + new_count as u64;
        let new_count = u32::try_from(new_count)
            .ok()
            .filter(|_| total <= u64::from(u32::MAX))
            .ok_or(Error::TooManyItems { count: total })?;

        let kept = if deletions.is_empty() {
            Kept::Identity(kept_count)
        } else {
            Kept::Table(build_table(deletions))
        };
        Ok(Self { kept, new_count })
    }

    /// Returns the number of kept original items.
    pub fn kept_count(&self) -> u32 {
        match &self.kept {
            Kept::Identity(count) => *count,
            Kept::Table(table) => table.len() as u32,
        }
    }

    /// Returns the total number of output items.
    pub fn total_count(&self) -> u32 {
        self.kept_count() + self.new_count
    }

    /// Returns `true` when no table was materialised.
    pub fn is_identity(&self) -> bool {
        matches!(self.kept, Kept::Identity(_))
    }

    /// Resolves an output index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] for indices at or beyond
    /// [`total_count`](Self::total_count).
    pub fn resolve(&self, index: OutputIndex) -> Result<Resolved> {
        let i = index.get();
        let kept_count = self.kept_count();
        if i < kept_count {
            let original = match &self.kept {
                Kept::Identity(_) => OriginalIndex::new(i),
                Kept::Table(table) => table[i as usize],
            };
            return Ok(Resolved::Kept(original));
        }
        if i - kept_count < self.new_count {
            return Ok(Resolved::New((i - kept_count) as usize));
        }
        Err(Error::IndexOutOfRange {
            index: i,
            count: self.total_count(),
        })
    }
}

/// Walks the original indices once, skipping deleted ones.
fn build_table(deletions: &DeletionSet) -> Vec<OriginalIndex> {
    let kept_count = deletions.kept_count();
    let mut table = Vec::with_capacity(kept_count as usize);
    let mut deleted = deletions.iter().map(OriginalIndex::get).peekable();
    let mut offset = 0;
    for i in 0..kept_count {
        while deleted.next_if_eq(&(i + offset)).is_some() {
            offset += 1;
        }
        table.push(OriginalIndex::new(i + offset));
    }
    log::debug!(
        "built index table: {} kept of {} original item(s)",
        table.len(),
        deletions.original_count()
    );
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deletions(count: u32, deleted: &[u32]) -> DeletionSet {
        let mut set = DeletionSet::new(count);
        for &i in deleted {
            set.insert(OriginalIndex::new(i)).unwrap();
        }
        set
    }

    fn resolve(remapper: &IndexRemapper, i: u32) -> Resolved {
        remapper.resolve(OutputIndex::new(i)).unwrap()
    }

    #[test]
    fn test_identity_without_deletions() {
        let remapper = IndexRemapper::new(&deletions(3, &[]), 1).unwrap();
        assert!(remapper.is_identity());
        assert_eq!(remapper.total_count(), 4);
        assert_eq!(resolve(&remapper, 2), Resolved::Kept(OriginalIndex::new(2)));
        assert_eq!(resolve(&remapper, 3), Resolved::New(0));
    }

    #[test]
    fn test_skips_deleted_indices() {
        let remapper = IndexRemapper::new(&deletions(5, &[1, 3]), 2).unwrap();
        assert!(!remapper.is_identity());
        assert_eq!(remapper.total_count(), 5);
        let expected = [
            Resolved::Kept(OriginalIndex::new(0)),
            Resolved::Kept(OriginalIndex::new(2)),
            Resolved::Kept(OriginalIndex::new(4)),
            Resolved::New(0),
            Resolved::New(1),
        ];
        for (i, want) in expected.iter().enumerate() {
            assert_eq!(resolve(&remapper, i as u32), *want);
        }
    }

    #[test]
    fn test_consecutive_deletions_at_edges() {
        let remapper = IndexRemapper::new(&deletions(6, &[0, 1, 4, 5]), 0).unwrap();
        assert_eq!(remapper.kept_count(), 2);
        assert_eq!(resolve(&remapper, 0), Resolved::Kept(OriginalIndex::new(2)));
        assert_eq!(resolve(&remapper, 1), Resolved::Kept(OriginalIndex::new(3)));
    }

    #[test]
    fn test_everything_deleted() {
        let remapper = IndexRemapper::new(&deletions(4, &[0, 1, 2, 3]), 1).unwrap();
        assert_eq!(remapper.kept_count(), 0);
        assert_eq!(resolve(&remapper, 0), Resolved::New(0));
    }

    #[test]
    fn test_out_of_range() {
        let remapper = IndexRemapper::new(&deletions(2, &[0]), 1).unwrap();
        let err = remapper.resolve(OutputIndex::new(2)).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfRange { index: 2, count: 2 }));
    }

    #[test]
    fn test_too_many_items() {
        let err = IndexRemapper::new(&deletions(u32::MAX, &[]), 1).unwrap_err();
        assert!(matches!(err, Error::TooManyItems { .. }));
    }
}
