//! High-level API for composing an update.

use super::protocol::{RunOutcome, UpdateEngine};
use super::{DeletionSet, FailureLog, UpdateBridge};
use crate::items::{NewItemCollection, ReadSeek};
use crate::options::{DeletePolicy, UpdateMode, UpdateOptions};
use crate::reader::{ArchiveReader, EmptyArchive};
use crate::{ArchivePath, Error, OriginalIndex, PropertyKind, Result};
use std::collections::HashSet;
use std::path::Path;

/// Result of an update run.
#[must_use = "update result should be checked for failed items"]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateResult {
    /// Original items carried over unchanged.
    pub items_kept: u32,
    /// Original items left out, including renamed and replaced ones.
    pub items_deleted: u32,
    /// New items, including renames and replacements.
    pub items_added: u32,
    /// Items the engine reported as written.
    pub items_succeeded: u32,
    /// Items the engine reported as failed.
    pub items_failed: u32,
    /// Bytes the engine read from item streams.
    pub bytes_streamed: u64,
    /// Items whose data could not be opened.
    pub failures: FailureLog,
}

impl UpdateResult {
    /// Returns the number of items in the written archive.
    pub fn total_items(&self) -> u32 {
        self.items_kept + self.items_added
    }

    /// Returns `true` if every item was opened and written.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.items_failed == 0
    }
}

/// Collects deletions, renames, replacements and new items, then runs them
/// through a compression engine.
///
/// Without an existing archive the updater composes a brand-new one.
///
/// # Example
///
/// ```rust
/// use arcweave::{ArchiveUpdater, MemoryArchive};
///
/// let archive = MemoryArchive::new()
///     .with_file("old.txt", b"old".to_vec())
///     .with_file("notes.txt", b"notes".to_vec());
///
/// let mut updater = ArchiveUpdater::from_archive(archive);
/// updater.rename_path("old.txt", "archive/old.txt")?;
/// updater.update_item_with_buffer(arcweave::OriginalIndex::new(1), b"new notes".to_vec())?;
///
/// // Both originals left the kept region and came back as new items.
/// assert_eq!(updater.deletions().len(), 2);
/// assert_eq!(updater.items().len(), 2);
/// assert_eq!(updater.total_item_count(), 2);
/// # Ok::<(), arcweave::Error>(())
/// ```
pub struct ArchiveUpdater<'a, A: ArchiveReader = EmptyArchive> {
    archive: A,
    items: NewItemCollection<'a>,
    deletions: DeletionSet,
    options: UpdateOptions,
    last_failures: FailureLog,
}

impl ArchiveUpdater<'_, EmptyArchive> {
    /// Creates an updater that writes a new archive.
    pub fn new() -> Self {
        Self::from_archive(EmptyArchive)
    }
}

impl Default for ArchiveUpdater<'_, EmptyArchive> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, A: ArchiveReader> ArchiveUpdater<'a, A> {
    /// Creates an updater for an existing archive.
    pub fn from_archive(archive: A) -> Self {
        let deletions = DeletionSet::new(archive.item_count());
        Self {
            archive,
            items: NewItemCollection::new(),
            deletions,
            options: UpdateOptions::default(),
            last_failures: FailureLog::new(),
        }
    }

    /// Sets the options used by indexing helpers and runs.
    pub fn with_options(mut self, options: UpdateOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the current options.
    pub fn options(&self) -> &UpdateOptions {
        &self.options
    }

    /// Returns the existing archive.
    pub fn archive(&self) -> &A {
        &self.archive
    }

    /// Consumes the updater and returns the existing archive.
    pub fn into_archive(self) -> A {
        self.archive
    }

    /// Returns the new items queued so far.
    pub fn items(&self) -> &NewItemCollection<'a> {
        &self.items
    }

    /// Returns the original items marked for removal.
    pub fn deletions(&self) -> &DeletionSet {
        &self.deletions
    }

    /// Adds a file; an empty `name` derives the in-archive path.
    pub fn add_file(&mut self, path: impl AsRef<Path>, name: &str) -> Result<()> {
        self.items.add_file(path, name, self.options.index)
    }

    /// Adds an in-memory buffer under `name`.
    pub fn add_buffer(&mut self, data: Vec<u8>, name: &str) -> Result<()> {
        self.items.add_buffer(data, name)
    }

    /// Adds a borrowed stream under `name`.
    pub fn add_stream(&mut self, stream: &'a mut dyn ReadSeek, name: &str) -> Result<()> {
        self.items.add_stream(stream, name)
    }

    /// Adds a directory and all of its contents.
    pub fn add_directory(&mut self, dir: impl AsRef<Path>) -> Result<()> {
        self.items.add_directory(dir, self.options.index)
    }

    /// Adds the contents of `dir` matching the wildcard `filter`.
    pub fn add_files(&mut self, dir: impl AsRef<Path>, filter: &str) -> Result<()> {
        self.items.add_files(dir, filter, self.options.index)
    }

    /// Adds several filesystem paths.
    pub fn add_paths<I, P>(&mut self, paths: I) -> Result<()>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.items.add_paths(paths, self.options.index)
    }

    /// Adds filesystem paths under the given aliases.
    pub fn add_paths_map<I, P, S>(&mut self, map: I) -> Result<()>
    where
        I: IntoIterator<Item = (P, S)>,
        P: AsRef<Path>,
        S: AsRef<str>,
    {
        self.items.add_paths_map(map, self.options.index)
    }

    /// Marks an original item for deletion.
    ///
    /// With [`DeletePolicy::RecurseDirs`], deleting a directory also deletes
    /// every original item whose path lies below it. Deleting an item twice
    /// is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if the archive has no such item.
    pub fn delete_item(&mut self, index: OriginalIndex, policy: DeletePolicy) -> Result<()> {
        self.deletions.insert(index)?;
        if policy == DeletePolicy::RecurseDirs
            && self.archive.property(index, PropertyKind::IsDir).as_bool() == Some(true)
        {
            let below = self.items_below(index);
            log::debug!("deleting {} item(s) below {}", below.len(), index);
            for child in below {
                self.deletions.insert(child)?;
            }
        }
        Ok(())
    }

    /// Marks the first original item with `path` for deletion.
    ///
    /// A trailing `/` on `path` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EntryNotFound`] if no original item has that path.
    pub fn delete_path(&mut self, path: &str, policy: DeletePolicy) -> Result<()> {
        let trimmed = path.trim_end_matches('/');
        let index = self.find(if trimmed.is_empty() { path } else { trimmed })?;
        self.delete_item(index, policy)
    }

    /// Moves an original item to `new_path`.
    ///
    /// The engine copies the item's data from the original archive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] for a missing item,
    /// [`Error::ItemRemoved`] if it was already deleted or replaced, and
    /// [`Error::InvalidArchivePath`] for an invalid `new_path`.
    pub fn rename_item(&mut self, index: OriginalIndex, new_path: &str) -> Result<()> {
        let path = ArchivePath::new(new_path)?;
        self.remove_original(index)?;
        self.items.add_renamed(index, path);
        Ok(())
    }

    /// Moves the first original item with path `old` to `new`.
    pub fn rename_path(&mut self, old: &str, new: &str) -> Result<()> {
        let index = self.find(old)?;
        self.rename_item(index, new)
    }

    /// Replaces the data of an original item with `data`.
    pub fn update_item_with_buffer(&mut self, index: OriginalIndex, data: Vec<u8>) -> Result<()> {
        let path = self.original_path(index)?;
        let mut staged = NewItemCollection::new();
        staged.add_buffer(data, path.as_str())?;
        self.replace(index, staged)
    }

    /// Replaces the data of an original item with the contents of a file.
    pub fn update_item_with_file(
        &mut self,
        index: OriginalIndex,
        file: impl AsRef<Path>,
    ) -> Result<()> {
        let path = self.original_path(index)?;
        let mut staged = NewItemCollection::new();
        staged.add_file(file, path.as_str(), self.options.index)?;
        self.replace(index, staged)
    }

    /// Replaces the data of an original item with a borrowed stream.
    pub fn update_item_with_stream(
        &mut self,
        index: OriginalIndex,
        stream: &'a mut dyn ReadSeek,
    ) -> Result<()> {
        let path = self.original_path(index)?;
        let mut staged = NewItemCollection::new();
        staged.add_stream(stream, path.as_str())?;
        self.replace(index, staged)
    }

    /// Returns the number of items the next run will write.
    ///
    /// Saturates at `u32::MAX`; a run over that many items fails with
    /// [`Error::TooManyItems`] instead.
    pub fn total_item_count(&self) -> u32 {
        let total = u64::from(self.run_deletions().kept_count()) + self.items.len() as u64;
        u32::try_from(total).unwrap_or(u32::MAX)
    }

    /// Returns the items that could not be opened during the last run.
    pub fn failed_items(&self) -> &FailureLog {
        &self.last_failures
    }

    /// Runs `engine` over the composed archive.
    ///
    /// Items whose data cannot be opened are skipped and listed in the
    /// result; they do not fail the run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] when the run was cancelled,
    /// [`Error::EngineFailure`] when the engine reports a fatal outcome, and
    /// any error the engine itself returns.
    pub fn compress_with<E: UpdateEngine + ?Sized>(
        &mut self,
        engine: &mut E,
    ) -> Result<UpdateResult> {
        let deletions = self.run_deletions();
        let Self {
            archive,
            items,
            options,
            last_failures,
            ..
        } = self;

        let mut bridge = UpdateBridge::new(archive, items, &deletions)?;
        if let Some(progress) = options.progress.as_deref_mut() {
            bridge = bridge.with_progress(progress);
        }
        let engine_result = engine.update_items(&mut bridge);
        let report = bridge.finish();
        *last_failures = report.failures.clone();
        engine_result?;

        match report.outcome {
            Some(RunOutcome::Failed(reason)) => return Err(Error::EngineFailure(reason)),
            Some(RunOutcome::Cancelled) => return Err(Error::Cancelled),
            None if report.cancelled => return Err(Error::Cancelled),
            Some(RunOutcome::Success) | None => {}
        }

        Ok(UpdateResult {
            items_kept: deletions.kept_count(),
            items_deleted: deletions.len(),
            items_added: items.len() as u32,
            items_succeeded: report.stats.items_succeeded,
            items_failed: report.stats.items_failed,
            bytes_streamed: report.stats.bytes_streamed,
            failures: report.failures,
        })
    }

    fn find(&self, path: &str) -> Result<OriginalIndex> {
        self.archive.find_item(path).ok_or_else(|| Error::EntryNotFound {
            path: path.to_string(),
        })
    }

    fn items_below(&self, dir: OriginalIndex) -> Vec<OriginalIndex> {
        let dir_path = self.archive.property(dir, PropertyKind::Path);
        let Some(dir_path) = dir_path.as_str() else {
            return Vec::new();
        };
        let prefix = format!("{}/", dir_path.trim_end_matches('/'));
        (0..self.archive.item_count())
            .map(OriginalIndex::new)
            .filter(|&i| {
                self.archive
                    .property(i, PropertyKind::Path)
                    .as_str()
                    .is_some_and(|p| p.starts_with(&prefix))
            })
            .collect()
    }

    fn original_path(&self, index: OriginalIndex) -> Result<ArchivePath> {
        let count = self.archive.item_count();
        if index.get() >= count {
            return Err(Error::IndexOutOfRange {
                index: index.get(),
                count,
            });
        }
        let path = self.archive.property(index, PropertyKind::Path);
        ArchivePath::new(path.as_str().unwrap_or_default())
    }

    fn remove_original(&mut self, index: OriginalIndex) -> Result<()> {
        if !self.deletions.insert(index)? {
            return Err(Error::ItemRemoved { index: index.get() });
        }
        Ok(())
    }

    fn replace(&mut self, index: OriginalIndex, staged: NewItemCollection<'a>) -> Result<()> {
        self.remove_original(index)?;
        for item in staged {
            self.items.push(item);
        }
        Ok(())
    }

    /// The deletion set for a run: in overwrite mode, originals shadowed by
    /// a new item's path are dropped as well.
    fn run_deletions(&self) -> DeletionSet {
        let mut deletions = self.deletions.clone();
        if self.options.mode == UpdateMode::Overwrite && !self.items.is_empty() {
            let new_paths: HashSet<&str> =
                self.items.iter().map(|i| i.path().as_str()).collect();
            for i in 0..self.archive.item_count() {
                let index = OriginalIndex::new(i);
                let path = self.archive.property(index, PropertyKind::Path);
                let shadowed = path.as_str().is_some_and(|p| new_paths.contains(p));
                if shadowed && matches!(deletions.insert(index), Ok(true)) {
                    log::debug!(
                        "{} overwritten by a new item",
                        path.as_str().unwrap_or_default()
                    );
                }
            }
        }
        deletions
    }
}

impl<A: ArchiveReader + std::fmt::Debug> std::fmt::Debug for ArchiveUpdater<'_, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveUpdater")
            .field("archive", &self.archive)
            .field("items", &self.items.len())
            .field("deletions", &self.deletions)
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::update::{ItemData, ItemOutcome, UpdateCallback};
    use crate::{MemoryArchive, OutputIndex, PropertyValue};
    use std::io::Read;

    /// Pulls every item in order and records `(path, data)`.
    #[derive(Default)]
    struct CopyEngine {
        written: Vec<(String, Option<Vec<u8>>)>,
        fail_run: Option<String>,
    }

    impl UpdateEngine for CopyEngine {
        fn update_items(&mut self, callback: &mut dyn UpdateCallback) -> Result<()> {
            let total = callback.total_item_count()?;
            for i in 0..total {
                let index = OutputIndex::new(i);
                let path = callback
                    .property(index, PropertyKind::Path)?
                    .as_str()
                    .unwrap_or_default()
                    .to_string();
                let data = match callback.data_stream(index)? {
                    ItemData::Stream(mut stream) => {
                        let mut buf = Vec::new();
                        stream.read_to_end(&mut buf)?;
                        Some(buf)
                    }
                    ItemData::NoData | ItemData::Unavailable => None,
                };
                callback.report_item_outcome(index, ItemOutcome::Success)?;
                self.written.push((path, data));
            }
            let outcome = match &self.fail_run {
                Some(reason) => RunOutcome::Failed(reason.clone()),
                None => RunOutcome::Success,
            };
            callback.report_run_outcome(outcome)
        }
    }

    fn archive() -> MemoryArchive {
        MemoryArchive::new()
            .with_file("a.txt", b"a".to_vec())
            .with_file("b.txt", b"b".to_vec())
            .with_file("c.txt", b"c".to_vec())
    }

    #[test]
    fn test_new_archive() {
        let mut updater = ArchiveUpdater::new();
        updater.add_buffer(b"hello".to_vec(), "hello.txt").unwrap();
        let mut engine = CopyEngine::default();
        let result = updater.compress_with(&mut engine).unwrap();
        assert_eq!(result.total_items(), 1);
        assert_eq!(result.items_kept, 0);
        assert_eq!(result.bytes_streamed, 5);
        assert!(result.is_complete());
        assert_eq!(engine.written, vec![(String::from("hello.txt"), Some(b"hello".to_vec()))]);
    }

    #[test]
    fn test_delete_and_rename() {
        let mut updater = ArchiveUpdater::from_archive(archive());
        updater.delete_path("a.txt", DeletePolicy::ItemOnly).unwrap();
        updater.rename_item(OriginalIndex::new(2), "moved/c.txt").unwrap();
        assert_eq!(updater.total_item_count(), 2);

        let mut engine = CopyEngine::default();
        let result = updater.compress_with(&mut engine).unwrap();
        assert_eq!(result.items_kept, 1);
        assert_eq!(result.items_deleted, 2);
        assert_eq!(result.items_added, 1);
        let paths: Vec<_> = engine.written.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(paths, vec!["b.txt", "moved/c.txt"]);
        assert_eq!(engine.written[1].1.as_deref(), Some(&b"c"[..]));
    }

    #[test]
    fn test_update_keeps_original_path() {
        let mut updater = ArchiveUpdater::from_archive(archive());
        updater
            .update_item_with_buffer(OriginalIndex::new(0), b"A!".to_vec())
            .unwrap();
        let mut engine = CopyEngine::default();
        let _ = updater.compress_with(&mut engine).unwrap();
        let (path, data) = engine.written.last().unwrap();
        assert_eq!(path, "a.txt");
        assert_eq!(data.as_deref(), Some(&b"A!"[..]));
        assert_eq!(engine.written.len(), 3);
    }

    #[test]
    fn test_recursive_delete() {
        let archive = MemoryArchive::new()
            .with_directory("docs")
            .with_file("docs/a.txt", b"a".to_vec())
            .with_directory("docs/old")
            .with_file("docs/old/b.txt", b"b".to_vec())
            .with_file("docsets.txt", b"c".to_vec());

        let mut flat = ArchiveUpdater::from_archive(archive.clone());
        flat.delete_path("docs", DeletePolicy::ItemOnly).unwrap();
        assert_eq!(flat.total_item_count(), 4);

        let mut updater = ArchiveUpdater::from_archive(archive);
        updater.delete_path("docs/", DeletePolicy::RecurseDirs).unwrap();
        assert_eq!(updater.total_item_count(), 1);
        assert!(!updater.deletions().contains(OriginalIndex::new(4)));

        // A file is unaffected by the recursive policy.
        updater
            .delete_item(OriginalIndex::new(4), DeletePolicy::RecurseDirs)
            .unwrap();
        assert_eq!(updater.total_item_count(), 0);
    }

    /// Claims to hold the largest possible number of items.
    #[derive(Debug)]
    struct HugeArchive;

    impl ArchiveReader for HugeArchive {
        fn item_count(&self) -> u32 {
            u32::MAX
        }

        fn property(&self, _index: OriginalIndex, _kind: PropertyKind) -> PropertyValue {
            PropertyValue::Empty
        }

        fn open_stream(&mut self, _index: OriginalIndex) -> std::io::Result<Box<dyn Read + '_>> {
            Ok(Box::new(std::io::empty()))
        }
    }

    #[test]
    fn test_item_count_saturates() {
        let mut updater = ArchiveUpdater::from_archive(HugeArchive);
        assert_eq!(updater.total_item_count(), u32::MAX);
        updater.add_buffer(b"one more".to_vec(), "extra.txt").unwrap();
        assert_eq!(updater.total_item_count(), u32::MAX);

        let mut engine = CopyEngine::default();
        let err = updater.compress_with(&mut engine).unwrap_err();
        assert!(matches!(err, Error::TooManyItems { count } if count == 1 << 32));
        assert!(engine.written.is_empty());
    }

    #[test]
    fn test_second_rename_is_rejected() {
        let mut updater = ArchiveUpdater::from_archive(archive());
        updater.rename_item(OriginalIndex::new(1), "x").unwrap();
        let err = updater.rename_item(OriginalIndex::new(1), "y").unwrap_err();
        assert!(matches!(err, Error::ItemRemoved { index: 1 }));
        assert_eq!(updater.items().len(), 1);
    }

    #[test]
    fn test_invalid_targets() {
        let mut updater = ArchiveUpdater::from_archive(archive());
        assert!(matches!(
            updater.delete_item(OriginalIndex::new(3), DeletePolicy::ItemOnly),
            Err(Error::IndexOutOfRange { index: 3, count: 3 })
        ));
        assert!(matches!(
            updater.rename_path("missing", "x"),
            Err(Error::EntryNotFound { .. })
        ));
        assert!(matches!(
            updater.rename_item(OriginalIndex::new(0), "../x"),
            Err(Error::InvalidArchivePath(_))
        ));
        assert!(updater.deletions().is_empty());
    }

    #[test]
    fn test_overwrite_mode_drops_shadowed_originals() {
        let mut updater = ArchiveUpdater::from_archive(archive())
            .with_options(UpdateOptions::new().mode(UpdateMode::Overwrite));
        updater.add_buffer(b"B".to_vec(), "b.txt").unwrap();
        assert_eq!(updater.total_item_count(), 3);
        assert!(updater.deletions().is_empty());

        let mut engine = CopyEngine::default();
        let result = updater.compress_with(&mut engine).unwrap();
        assert_eq!(result.items_deleted, 1);
        let paths: Vec<_> = engine.written.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(paths, vec!["a.txt", "c.txt", "b.txt"]);
    }

    #[test]
    fn test_append_mode_keeps_duplicates() {
        let mut updater = ArchiveUpdater::from_archive(archive());
        updater.add_buffer(b"B".to_vec(), "b.txt").unwrap();
        assert_eq!(updater.total_item_count(), 4);
    }

    #[test]
    fn test_engine_failure_is_reported() {
        let mut updater = ArchiveUpdater::from_archive(archive());
        let mut engine = CopyEngine {
            fail_run: Some("disk full".into()),
            ..Default::default()
        };
        let err = updater.compress_with(&mut engine).unwrap_err();
        assert!(matches!(err, Error::EngineFailure(ref reason) if reason == "disk full"));
        assert!(updater.failed_items().is_empty());
    }
}
