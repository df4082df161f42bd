//! Shared test utilities for integration tests.
//!
//! The [`ScriptedEngine`] stands in for a real compression engine: it drives
//! the update protocol the way an engine would and records what it saw for
//! every output index.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use arcweave::{
    ArchiveReader, ItemData, ItemOutcome, MemoryArchive, OriginalIndex, OutputIndex,
    PropertyKind, PropertyValue, Result, RunOutcome, UpdateCallback, UpdateEngine,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::BTreeMap;
use std::io::{self, Read};

/// Order in which the engine visits output indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// 0, 1, 2, ...
    Sequential,
    /// Highest index first.
    Reversed,
    /// A permutation drawn from the given seed.
    Shuffled(u64),
}

/// What the engine got for an item's data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Data {
    /// Bytes read from the stream.
    Bytes(Vec<u8>),
    /// The item has no data.
    NoData,
    /// The data could not be opened.
    Unavailable,
    /// The engine copied the data from the original archive.
    Copied(Option<OriginalIndex>),
}

/// Everything the engine observed for one output index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Written {
    pub path: String,
    pub is_dir: bool,
    pub size: u64,
    pub new_data: bool,
    pub new_properties: bool,
    pub original: Option<OriginalIndex>,
    pub data: Data,
}

/// A protocol driver with configurable behavior.
#[derive(Debug)]
pub struct ScriptedEngine {
    pub order: Order,
    /// Output indices the engine reports as failed.
    pub fail_items: Vec<u32>,
    /// Terminal signal sent at the end of a complete run.
    pub run_outcome: RunOutcome,
    /// Stop with a cancelled outcome once `set_completed` returns `false`.
    pub honor_cancel: bool,
    /// Item count the engine received.
    pub total: u32,
    /// Observations keyed by output index.
    pub written: BTreeMap<u32, Written>,
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self {
            order: Order::Sequential,
            fail_items: Vec::new(),
            run_outcome: RunOutcome::Success,
            honor_cancel: true,
            total: 0,
            written: BTreeMap::new(),
        }
    }
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_order(order: Order) -> Self {
        Self {
            order,
            ..Self::default()
        }
    }

    /// Paths in output order.
    pub fn paths(&self) -> Vec<String> {
        self.written.values().map(|w| w.path.clone()).collect()
    }

    /// The observation for output index `i`.
    pub fn item(&self, i: u32) -> &Written {
        &self.written[&i]
    }

    fn visit_order(&self, total: u32) -> Vec<u32> {
        let mut order: Vec<u32> = (0..total).collect();
        match self.order {
            Order::Sequential => {}
            Order::Reversed => order.reverse(),
            Order::Shuffled(seed) => order.shuffle(&mut StdRng::seed_from_u64(seed)),
        }
        order
    }
}

impl UpdateEngine for ScriptedEngine {
    fn update_items(&mut self, callback: &mut dyn UpdateCallback) -> Result<()> {
        let total = callback.total_item_count()?;
        self.total = total;

        let mut total_bytes = 0;
        for i in 0..total {
            total_bytes += callback
                .property(OutputIndex::new(i), PropertyKind::Size)?
                .as_u64()
                .unwrap_or(0);
        }
        callback.set_total(total_bytes);

        let mut completed = 0;
        for i in self.visit_order(total) {
            let index = OutputIndex::new(i);
            let path = callback
                .property(index, PropertyKind::Path)?
                .as_str()
                .unwrap_or_default()
                .to_string();
            let is_dir = callback
                .property(index, PropertyKind::IsDir)?
                .as_bool()
                .unwrap_or(false);
            let size = callback
                .property(index, PropertyKind::Size)?
                .as_u64()
                .unwrap_or(0);
            let new_data = callback.has_new_data(index)?;
            let new_properties = callback.has_new_properties(index)?;
            let original = callback.index_in_archive(index)?;

            let data = if new_data {
                match callback.data_stream(index)? {
                    ItemData::Stream(mut stream) => {
                        let mut bytes = Vec::new();
                        stream.read_to_end(&mut bytes)?;
                        Data::Bytes(bytes)
                    }
                    ItemData::NoData => Data::NoData,
                    ItemData::Unavailable => Data::Unavailable,
                }
            } else {
                Data::Copied(original)
            };

            let outcome = if self.fail_items.contains(&i) {
                ItemOutcome::Failed("scripted failure".into())
            } else {
                ItemOutcome::Success
            };
            callback.report_item_outcome(index, outcome)?;
            self.written.insert(
                i,
                Written {
                    path,
                    is_dir,
                    size,
                    new_data,
                    new_properties,
                    original,
                    data,
                },
            );

            completed += size;
            if !callback.set_completed(completed) && self.honor_cancel {
                return callback.report_run_outcome(RunOutcome::Cancelled);
            }
        }
        callback.set_ratio(completed, completed / 2);
        callback.report_run_outcome(self.run_outcome.clone())
    }
}

/// An archive with `count` files named `file0.txt`, `file1.txt`, ...
/// holding their own name as data.
pub fn numbered_archive(count: u32) -> MemoryArchive {
    (0..count).fold(MemoryArchive::new(), |archive, i| {
        let name = format!("file{}.txt", i);
        let data = name.clone().into_bytes();
        archive.with_file(name, data)
    })
}

/// An in-memory archive whose listed items cannot be decoded.
#[derive(Debug)]
pub struct CorruptArchive {
    pub inner: MemoryArchive,
    pub corrupt: Vec<u32>,
}

impl ArchiveReader for CorruptArchive {
    fn item_count(&self) -> u32 {
        self.inner.item_count()
    }

    fn property(&self, index: OriginalIndex, kind: PropertyKind) -> PropertyValue {
        self.inner.property(index, kind)
    }

    fn open_stream(&mut self, index: OriginalIndex) -> io::Result<Box<dyn Read + '_>> {
        if self.corrupt.contains(&index.get()) {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "corrupt item"));
        }
        self.inner.open_stream(index)
    }
}
