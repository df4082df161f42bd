//! Composition of an update run.
//!
//! An update writes a new archive made of the items kept from an existing
//! archive followed by newly added items. The engine that writes it sees a
//! single contiguous range of output indices; this module keeps track of
//! which item each output index stands for.
//!
//! # Example
//!
//! ```rust
//! use arcweave::{ArchiveUpdater, DeletePolicy, MemoryArchive, OriginalIndex};
//!
//! let archive = MemoryArchive::new()
//!     .with_file("keep.txt", b"keep".to_vec())
//!     .with_file("drop.txt", b"drop".to_vec());
//!
//! let mut updater = ArchiveUpdater::from_archive(archive);
//! updater.delete_item(OriginalIndex::new(1), DeletePolicy::ItemOnly)?;
//! updater.add_buffer(b"fresh".to_vec(), "new.txt")?;
//! assert_eq!(updater.total_item_count(), 2);
//! # Ok::<(), arcweave::Error>(())
//! ```

mod bridge;
mod deletion;
mod failure;
mod protocol;
mod remap;
mod updater;

pub use bridge::{RunReport, RunStats, UpdateBridge};
pub use deletion::DeletionSet;
pub use failure::{FailedItem, FailureLog};
pub use protocol::{ItemData, ItemOutcome, RunOutcome, UpdateCallback, UpdateEngine};
pub use remap::{IndexRemapper, Resolved};
pub use updater::{ArchiveUpdater, UpdateResult};
