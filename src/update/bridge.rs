//! The callback handed to the engine for one run.

use super::protocol::{ItemData, ItemOutcome, RunOutcome, UpdateCallback};
use super::{DeletionSet, FailureLog, IndexRemapper, Resolved};
use crate::items::{NewItem, NewItemCollection};
use crate::progress::ProgressReporter;
use crate::reader::ArchiveReader;
use crate::{Error, OriginalIndex, OutputIndex, PropertyKind, PropertyValue, Result};
use std::cell::{Cell, OnceCell};
use std::io::{self, Read};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BridgeState {
    Uninitialized,
    Active,
    Finalizing,
}

impl BridgeState {
    fn name(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Active => "active",
            Self::Finalizing => "finalizing",
        }
    }
}

/// Counters collected while the engine runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Items the engine reported as written.
    pub items_succeeded: u32,
    /// Items the engine reported as failed.
    pub items_failed: u32,
    /// Bytes read by the engine from the streams handed out.
    pub bytes_streamed: u64,
}

/// What a finished bridge hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// The engine's terminal signal, if it sent one.
    pub outcome: Option<RunOutcome>,
    /// Counters for the run.
    pub stats: RunStats,
    /// Items whose data could not be opened.
    pub failures: FailureLog,
    /// Whether cancellation was requested during the run.
    pub cancelled: bool,
}

/// Routes engine queries to the original archive or to the new items.
///
/// A bridge serves exactly one run. It borrows the item collection and the
/// deletion set, so neither can change while the engine is working. The
/// index table is built on the first query that needs it.
pub struct UpdateBridge<'u, 'a, A: ArchiveReader + ?Sized> {
    archive: &'u mut A,
    items: &'u NewItemCollection<'a>,
    deletions: &'u DeletionSet,
    remapper: OnceCell<IndexRemapper>,
    state: BridgeState,
    outcome: Option<RunOutcome>,
    failures: FailureLog,
    stats: RunStats,
    bytes_streamed: Cell<u64>,
    total_bytes: u64,
    progress: Option<&'u mut dyn ProgressReporter>,
    cancelled: bool,
}

impl<'u, 'a, A: ArchiveReader + ?Sized> UpdateBridge<'u, 'a, A> {
    /// Creates a bridge for one run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if `deletions` was built for an archive
    /// with a different item count.
    pub fn new(
        archive: &'u mut A,
        items: &'u NewItemCollection<'a>,
        deletions: &'u DeletionSet,
    ) -> Result<Self> {
        if deletions.original_count() != archive.item_count() {
            return Err(Error::InvalidState {
                operation: "start an update",
                state: "configured for a different archive",
            });
        }
        Ok(Self {
            archive,
            items,
            deletions,
            remapper: OnceCell::new(),
            state: BridgeState::Uninitialized,
            outcome: None,
            failures: FailureLog::new(),
            stats: RunStats::default(),
            bytes_streamed: Cell::new(0),
            total_bytes: 0,
            progress: None,
            cancelled: false,
        })
    }

    /// Forwards progress and item events to `reporter`.
    pub fn with_progress(mut self, reporter: &'u mut dyn ProgressReporter) -> Self {
        self.progress = Some(reporter);
        self
    }

    /// Returns the failures recorded so far.
    pub fn failures(&self) -> &FailureLog {
        &self.failures
    }

    /// Returns `true` once the engine has signalled the end of the run.
    pub fn is_finished(&self) -> bool {
        self.state == BridgeState::Finalizing
    }

    /// Consumes the bridge and returns what the run produced.
    pub fn finish(self) -> RunReport {
        let mut stats = self.stats;
        stats.bytes_streamed = self.bytes_streamed.get();
        RunReport {
            outcome: self.outcome,
            stats,
            failures: self.failures,
            cancelled: self.cancelled,
        }
    }

    fn ensure_active(&self, operation: &'static str) -> Result<()> {
        match self.state {
            BridgeState::Active => Ok(()),
            state => Err(Error::InvalidState {
                operation,
                state: state.name(),
            }),
        }
    }

    fn remapper(&self) -> Result<&IndexRemapper> {
        if let Some(remapper) = self.remapper.get() {
            return Ok(remapper);
        }
        let built = IndexRemapper::new(self.deletions, self.items.len())?;
        Ok(self.remapper.get_or_init(|| built))
    }

    fn resolve(&self, index: OutputIndex, operation: &'static str) -> Result<Resolved> {
        self.ensure_active(operation)?;
        self.remapper()?.resolve(index)
    }

    fn new_item(&self, position: usize) -> Result<&'u NewItem<'a>> {
        let items = self.items;
        items.get(position).ok_or(Error::IndexOutOfRange {
            index: position as u32,
            count: items.len() as u32,
        })
    }

    fn item_path(&self, resolved: Resolved) -> Result<String> {
        Ok(match resolved {
            Resolved::Kept(original) => match self.archive.property(original, PropertyKind::Path) {
                PropertyValue::String(path) => path,
                _ => original.to_string(),
            },
            Resolved::New(position) => self.new_item(position)?.path().to_string(),
        })
    }

    fn item_size(&self, resolved: Resolved) -> Result<u64> {
        Ok(match resolved {
            Resolved::Kept(original) => self
                .archive
                .property(original, PropertyKind::Size)
                .as_u64()
                .unwrap_or(0),
            Resolved::New(position) => self.new_item(position)?.size(&*self.archive),
        })
    }

    fn cancel_requested(&self) -> bool {
        self.cancelled || self.progress.as_ref().is_some_and(|p| p.should_cancel())
    }
}

impl<A: ArchiveReader + ?Sized> UpdateCallback for UpdateBridge<'_, '_, A> {
    fn total_item_count(&mut self) -> Result<u32> {
        if self.state == BridgeState::Finalizing {
            return Err(Error::InvalidState {
                operation: "count items",
                state: self.state.name(),
            });
        }
        let total = u64::from(self.deletions.kept_count()) + self.items.len() as u64;
        let total = u32::try_from(total).map_err(|_| Error::TooManyItems { count: total })?;
        if self.state == BridgeState::Uninitialized {
            log::debug!(
                "update run started: {} kept, {} deleted, {} new ({} total)",
                self.deletions.kept_count(),
                self.deletions.len(),
                self.items.len(),
                total
            );
            self.state = BridgeState::Active;
        }
        Ok(total)
    }

    fn property(&self, index: OutputIndex, kind: PropertyKind) -> Result<PropertyValue> {
        Ok(match self.resolve(index, "query item properties")? {
            Resolved::Kept(_) if kind == PropertyKind::IsAnti => PropertyValue::Bool(false),
            Resolved::Kept(original) => self.archive.property(original, kind),
            Resolved::New(position) => self.new_item(position)?.property(kind, &*self.archive),
        })
    }

    fn data_stream(&mut self, index: OutputIndex) -> Result<ItemData<'_>> {
        let resolved = self.resolve(index, "open item data")?;
        if self.cancel_requested() {
            self.cancelled = true;
            return Err(Error::Cancelled);
        }
        if self.failures.get(index).is_some() {
            return Ok(ItemData::Unavailable);
        }
        let path = self.item_path(resolved)?;
        let size = self.item_size(resolved)?;
        let new_item = match resolved {
            Resolved::New(position) => Some(self.new_item(position)?),
            Resolved::Kept(_) => None,
        };

        let Self {
            archive,
            failures,
            progress,
            bytes_streamed,
            ..
        } = self;
        if let Some(progress) = progress.as_deref_mut() {
            progress.on_entry_start(&path, size);
        }

        let opened = match (resolved, new_item) {
            (_, Some(item)) => item.open(&mut **archive),
            (Resolved::Kept(original), None) => archive.open_stream(original).map(Some),
            (Resolved::New(_), None) => Ok(None),
        };
        match opened {
            Ok(Some(stream)) => Ok(ItemData::Stream(Box::new(CountingReader {
                inner: stream,
                counter: bytes_streamed,
            }))),
            Ok(None) => Ok(ItemData::NoData),
            Err(e) => {
                log::warn!("cannot open data of {} ({}): {}", path, index, e);
                let failed = failures.record(index, &path, &e);
                if let Some(progress) = progress.as_deref_mut() {
                    progress.on_warning(&failed.to_string());
                }
                Ok(ItemData::Unavailable)
            }
        }
    }

    fn has_new_data(&self, index: OutputIndex) -> Result<bool> {
        Ok(match self.resolve(index, "query item state")? {
            Resolved::Kept(_) => false,
            Resolved::New(position) => self.new_item(position)?.renamed_from().is_none(),
        })
    }

    fn has_new_properties(&self, index: OutputIndex) -> Result<bool> {
        Ok(matches!(
            self.resolve(index, "query item state")?,
            Resolved::New(_)
        ))
    }

    fn index_in_archive(&self, index: OutputIndex) -> Result<Option<OriginalIndex>> {
        Ok(match self.resolve(index, "query item state")? {
            Resolved::Kept(original) => Some(original),
            Resolved::New(position) => self.new_item(position)?.renamed_from(),
        })
    }

    fn report_item_outcome(&mut self, index: OutputIndex, outcome: ItemOutcome) -> Result<()> {
        let resolved = self.resolve(index, "report an item outcome")?;
        let path = self.item_path(resolved)?;
        match &outcome {
            ItemOutcome::Success => {
                self.stats.items_succeeded += 1;
                log::trace!("{} ({}) written", path, index);
            }
            ItemOutcome::Failed(reason) => {
                self.stats.items_failed += 1;
                log::trace!("{} ({}) failed in engine: {}", path, index, reason);
            }
        }
        if let Some(progress) = self.progress.as_deref_mut() {
            progress.on_entry_complete(&path, outcome.is_success());
        }
        Ok(())
    }

    fn report_run_outcome(&mut self, outcome: RunOutcome) -> Result<()> {
        if self.state == BridgeState::Finalizing {
            return Err(Error::InvalidState {
                operation: "end the run",
                state: self.state.name(),
            });
        }
        log::debug!(
            "update run finished: {:?}, {} item(s) unavailable",
            outcome,
            self.failures.len()
        );
        self.state = BridgeState::Finalizing;
        self.outcome = Some(outcome);
        Ok(())
    }

    fn set_total(&mut self, total_bytes: u64) {
        self.total_bytes = total_bytes;
        if let Some(progress) = self.progress.as_deref_mut() {
            progress.on_total(total_bytes);
        }
    }

    fn set_completed(&mut self, completed_bytes: u64) -> bool {
        if let Some(progress) = self.progress.as_deref_mut() {
            if !progress.on_progress(completed_bytes, self.total_bytes) || progress.should_cancel() {
                self.cancelled = true;
            }
        }
        !self.cancelled
    }

    fn set_ratio(&mut self, input_bytes: u64, output_bytes: u64) {
        if let Some(progress) = self.progress.as_deref_mut() {
            progress.on_ratio(input_bytes, output_bytes);
        }
    }
}

struct CountingReader<'s> {
    inner: Box<dyn Read + 's>,
    counter: &'s Cell<u64>,
}

impl Read for CountingReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.counter.set(self.counter.get() + n as u64);
        Ok(n)
    }
}
