//! # arcweave
//!
//! Composition of archive updates for pull-based compression engines.
//!
//! A compression engine writing an archive addresses items by a flat,
//! 0-based index into "the final archive". When an existing archive is
//! updated, that archive is a mixture of original items that are kept and
//! new items added by the caller (files, directories, in-memory buffers,
//! streams, or renamed originals). This crate maintains the single output
//! index space over both, resolves each item's properties and data only when
//! the engine asks for them, and records items whose data cannot be opened
//! without aborting the run.
//!
//! ## Quick Start
//!
//! ### Composing an Update
//!
//! ```rust
//! use arcweave::{ArchiveUpdater, DeletePolicy, MemoryArchive, Result};
//!
//! fn main() -> Result<()> {
//!     let archive = MemoryArchive::new()
//!         .with_file("readme.txt", b"hello".to_vec())
//!         .with_file("obsolete.log", b"...".to_vec())
//!         .with_file("draft.txt", b"draft".to_vec());
//!
//!     let mut updater = ArchiveUpdater::from_archive(archive);
//!     updater.delete_path("obsolete.log", DeletePolicy::ItemOnly)?;
//!     updater.rename_path("draft.txt", "docs/final.txt")?;
//!     updater.add_buffer(b"v2".to_vec(), "version.txt")?;
//!
//!     // readme.txt, docs/final.txt and version.txt
//!     assert_eq!(updater.total_item_count(), 3);
//!     Ok(())
//! }
//! ```
//!
//! ### Driving a Run
//!
//! An engine implements [`UpdateEngine`] and pulls everything through the
//! [`UpdateCallback`] it is given:
//!
//! ```rust
//! use arcweave::{
//!     ArchiveUpdater, ItemData, ItemOutcome, OutputIndex, Result, RunOutcome, UpdateCallback,
//!     UpdateEngine,
//! };
//!
//! struct Counter(u64);
//!
//! impl UpdateEngine for Counter {
//!     fn update_items(&mut self, callback: &mut dyn UpdateCallback) -> Result<()> {
//!         for i in 0..callback.total_item_count()? {
//!             let index = OutputIndex::new(i);
//!             if let ItemData::Stream(mut stream) = callback.data_stream(index)? {
//!                 self.0 += std::io::copy(&mut stream, &mut std::io::sink())?;
//!             }
//!             callback.report_item_outcome(index, ItemOutcome::Success)?;
//!         }
//!         callback.report_run_outcome(RunOutcome::Success)
//!     }
//! }
//!
//! let mut updater = ArchiveUpdater::new();
//! updater.add_buffer(b"0123456789".to_vec(), "digits.txt")?;
//! let mut engine = Counter(0);
//! let result = updater.compress_with(&mut engine)?;
//! assert_eq!(engine.0, 10);
//! assert!(result.is_complete());
//! # Ok::<(), arcweave::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`. Items whose data cannot be opened during
//! a run are not errors: they show up in [`UpdateResult::failures`] and the
//! run continues.
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade. Enable `debug` to see run
//! boundaries and index table construction, `trace` for per-item outcomes.
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! This crate requires **Rust 1.85** or later.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod archive_path;
pub mod error;
pub mod index;
pub mod items;
pub mod options;
pub mod progress;
pub mod property;
pub mod reader;
pub mod timestamp;
pub mod update;

pub use archive_path::ArchivePath;
pub use error::{Error, Result};
pub use index::{OriginalIndex, OutputIndex};
pub use property::{PropertyKind, PropertyValue};
pub use timestamp::Timestamp;

// Re-export item API
pub use items::{ItemKind, ItemSource, NewItem, NewItemCollection, ReadSeek};

// Re-export configuration
pub use options::{
    DeletePolicy, FilterPolicy, IndexOptions, SymlinkPolicy, UpdateMode, UpdateOptions,
};

// Re-export archive readers
pub use reader::{ArchiveReader, EmptyArchive, MemoryArchive, MemoryEntry};

// Re-export update API
pub use update::{
    ArchiveUpdater, DeletionSet, FailedItem, FailureLog, IndexRemapper, ItemData, ItemOutcome,
    Resolved, RunOutcome, UpdateBridge, UpdateCallback, UpdateEngine, UpdateResult,
};

// Re-export progress API
pub use progress::{
    AtomicProgress, ClosureProgress, NoProgress, ProgressReporter, ProgressState,
    StatisticsProgress, progress_fn,
};
