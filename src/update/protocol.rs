//! The contract between a compression engine and the items of a run.
//!
//! An engine implements [`UpdateEngine`]. When a run starts it receives an
//! [`UpdateCallback`] and pulls everything it needs through it: first the
//! total item count, then properties and data for output indices in any
//! order, and finally the outcome of the run.

use crate::{OriginalIndex, OutputIndex, PropertyKind, PropertyValue, Result};
use std::fmt;
use std::io::Read;

/// Data handed to the engine for one item.
pub enum ItemData<'s> {
    /// The item's bytes.
    Stream(Box<dyn Read + 's>),
    /// The item has no data (directories).
    NoData,
    /// The data could not be opened. The failure has been logged and the
    /// engine should skip the item.
    Unavailable,
}

impl<'s> ItemData<'s> {
    /// Returns `true` for [`ItemData::Unavailable`].
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }

    /// Returns the stream, if any.
    pub fn into_stream(self) -> Option<Box<dyn Read + 's>> {
        match self {
            Self::Stream(stream) => Some(stream),
            _ => None,
        }
    }
}

impl fmt::Debug for ItemData<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stream(_) => f.write_str("Stream(..)"),
            Self::NoData => f.write_str("NoData"),
            Self::Unavailable => f.write_str("Unavailable"),
        }
    }
}

/// Outcome of a single item, as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// The item was written.
    Success,
    /// The engine failed to write the item.
    Failed(String),
}

impl ItemOutcome {
    /// Returns `true` for [`ItemOutcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Outcome of a whole run, as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The archive was written.
    Success,
    /// The engine hit a fatal error.
    Failed(String),
    /// The run was stopped on request.
    Cancelled,
}

/// Operations an engine may invoke during a run.
///
/// Item queries are only valid after [`total_item_count`] and before
/// [`report_run_outcome`]; outside that window they fail with
/// [`Error::InvalidState`](crate::Error::InvalidState). Output indices at or
/// beyond the total count fail with
/// [`Error::IndexOutOfRange`](crate::Error::IndexOutOfRange).
///
/// [`total_item_count`]: UpdateCallback::total_item_count
/// [`report_run_outcome`]: UpdateCallback::report_run_outcome
pub trait UpdateCallback {
    /// Returns the number of items in the archive being written.
    ///
    /// The value does not change for the rest of the run.
    fn total_item_count(&mut self) -> Result<u32>;

    /// Returns a property of an item. Queries have no side effects.
    fn property(&self, index: OutputIndex, kind: PropertyKind) -> Result<PropertyValue>;

    /// Opens the data of an item.
    ///
    /// A source that cannot be opened yields [`ItemData::Unavailable`] and is
    /// recorded once in the run's failure log; later requests for the same
    /// item yield [`ItemData::Unavailable`] again. The run goes on. Fails with
    /// [`Error::Cancelled`](crate::Error::Cancelled) once cancellation was
    /// requested.
    fn data_stream(&mut self, index: OutputIndex) -> Result<ItemData<'_>>;

    /// Returns `true` if the engine must write the item's data from
    /// [`data_stream`](UpdateCallback::data_stream) instead of copying it.
    fn has_new_data(&self, index: OutputIndex) -> Result<bool>;

    /// Returns `true` if the item's properties must be queried rather than
    /// copied from the original archive.
    fn has_new_properties(&self, index: OutputIndex) -> Result<bool>;

    /// Returns the item's index in the original archive, if it has one.
    fn index_in_archive(&self, index: OutputIndex) -> Result<Option<OriginalIndex>>;

    /// Records the engine's outcome for one item.
    fn report_item_outcome(&mut self, index: OutputIndex, outcome: ItemOutcome) -> Result<()>;

    /// Ends the run.
    fn report_run_outcome(&mut self, outcome: RunOutcome) -> Result<()>;

    /// Announces the number of bytes the engine will process.
    fn set_total(&mut self, total_bytes: u64);

    /// Reports processed bytes. Returns `false` when the run must stop.
    fn set_completed(&mut self, completed_bytes: u64) -> bool;

    /// Reports input and packed sizes.
    fn set_ratio(&mut self, input_bytes: u64, output_bytes: u64);
}

/// A compression engine able to write an archive from an [`UpdateCallback`].
pub trait UpdateEngine {
    /// Runs the engine to completion.
    ///
    /// Engines report their own fatal errors through
    /// [`UpdateCallback::report_run_outcome`]; an `Err` returned here is
    /// passed to the caller unchanged.
    fn update_items(&mut self, callback: &mut dyn UpdateCallback) -> Result<()>;
}

impl<E: UpdateEngine + ?Sized> UpdateEngine for &mut E {
    fn update_items(&mut self, callback: &mut dyn UpdateCallback) -> Result<()> {
        (**self).update_items(callback)
    }
}
