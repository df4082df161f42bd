//! Access to the archive being updated.
//!
//! The update machinery never parses archives itself; it reads the items it
//! keeps through an [`ArchiveReader`]. [`EmptyArchive`] stands in when a new
//! archive is created, [`MemoryArchive`] holds entries that are already
//! decoded.

use crate::property::attributes;
use crate::{OriginalIndex, PropertyKind, PropertyValue, Timestamp};
use std::io::{self, Cursor, Read};

/// Read-only view of an existing archive.
pub trait ArchiveReader {
    /// Returns the number of items in the archive.
    fn item_count(&self) -> u32;

    /// Returns a property of an item.
    ///
    /// Returns [`PropertyValue::Empty`] when the property does not apply or
    /// the index is not part of the archive.
    fn property(&self, index: OriginalIndex, kind: PropertyKind) -> PropertyValue;

    /// Opens the decoded data of an item.
    fn open_stream(&mut self, index: OriginalIndex) -> io::Result<Box<dyn Read + '_>>;

    /// Finds the first item with the given in-archive path.
    fn find_item(&self, path: &str) -> Option<OriginalIndex> {
        (0..self.item_count())
            .map(OriginalIndex::new)
            .find(|&index| self.property(index, PropertyKind::Path).as_str() == Some(path))
    }
}

impl<A: ArchiveReader + ?Sized> ArchiveReader for &mut A {
    fn item_count(&self) -> u32 {
        (**self).item_count()
    }

    fn property(&self, index: OriginalIndex, kind: PropertyKind) -> PropertyValue {
        (**self).property(index, kind)
    }

    fn open_stream(&mut self, index: OriginalIndex) -> io::Result<Box<dyn Read + '_>> {
        (**self).open_stream(index)
    }
}

/// An archive with no items.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyArchive;

impl ArchiveReader for EmptyArchive {
    fn item_count(&self) -> u32 {
        0
    }

    fn property(&self, _index: OriginalIndex, _kind: PropertyKind) -> PropertyValue {
        PropertyValue::Empty
    }

    fn open_stream(&mut self, index: OriginalIndex) -> io::Result<Box<dyn Read + '_>> {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} does not exist in an empty archive", index),
        ))
    }
}

/// An item held by a [`MemoryArchive`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryEntry {
    /// In-archive path.
    pub path: String,
    /// File contents; `None` for a directory.
    pub data: Option<Vec<u8>>,
    /// Modification time.
    pub modified: Timestamp,
    /// Attribute flags.
    pub attributes: u32,
}

/// An archive whose items live in memory.
///
/// # Example
///
/// ```rust
/// use arcweave::{ArchiveReader, MemoryArchive, OriginalIndex};
/// use std::io::Read;
///
/// let mut archive = MemoryArchive::new()
///     .with_directory("docs")
///     .with_file("docs/readme.txt", b"hello".to_vec());
///
/// assert_eq!(archive.item_count(), 2);
/// let index = archive.find_item("docs/readme.txt").unwrap();
/// let mut text = String::new();
/// archive.open_stream(index)?.read_to_string(&mut text)?;
/// assert_eq!(text, "hello");
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug, Default, Clone)]
pub struct MemoryArchive {
    entries: Vec<MemoryEntry>,
    streams_opened: usize,
}

impl MemoryArchive {
    /// Creates an empty in-memory archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a file entry.
    pub fn with_file(mut self, path: impl Into<String>, data: Vec<u8>) -> Self {
        self.entries.push(MemoryEntry {
            path: path.into(),
            data: Some(data),
            modified: Timestamp::now(),
            attributes: attributes::ARCHIVE,
        });
        self
    }

    /// Appends a directory entry.
    pub fn with_directory(mut self, path: impl Into<String>) -> Self {
        self.entries.push(MemoryEntry {
            path: path.into(),
            data: None,
            modified: Timestamp::now(),
            attributes: attributes::DIRECTORY,
        });
        self
    }

    /// Appends a prepared entry.
    pub fn with_entry(mut self, entry: MemoryEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Returns the entries in archive order.
    pub fn entries(&self) -> &[MemoryEntry] {
        &self.entries
    }

    /// Returns how many item streams have been opened so far.
    pub fn streams_opened(&self) -> usize {
        self.streams_opened
    }

    fn entry(&self, index: OriginalIndex) -> Option<&MemoryEntry> {
        self.entries.get(index.get() as usize)
    }
}

impl ArchiveReader for MemoryArchive {
    fn item_count(&self) -> u32 {
        u32::try_from(self.entries.len()).unwrap_or(u32::MAX)
    }

    fn property(&self, index: OriginalIndex, kind: PropertyKind) -> PropertyValue {
        let Some(entry) = self.entry(index) else {
            return PropertyValue::Empty;
        };
        match kind {
            PropertyKind::Path => PropertyValue::String(entry.path.clone()),
            PropertyKind::IsDir => PropertyValue::Bool(entry.data.is_none()),
            PropertyKind::Size => {
                PropertyValue::UInt64(entry.data.as_ref().map_or(0, |d| d.len() as u64))
            }
            PropertyKind::Attributes => PropertyValue::UInt32(entry.attributes),
            PropertyKind::ModificationTime => PropertyValue::FileTime(entry.modified),
            PropertyKind::IsAnti => PropertyValue::Bool(false),
            PropertyKind::CreationTime | PropertyKind::AccessTime | PropertyKind::Other(_) => {
                PropertyValue::Empty
            }
        }
    }

    fn open_stream(&mut self, index: OriginalIndex) -> io::Result<Box<dyn Read + '_>> {
        let count = self.entries.len();
        let entry = self.entries.get(index.get() as usize).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is out of range (archive has {} items)", index, count),
            )
        })?;
        self.streams_opened += 1;
        let data: &[u8] = entry.data.as_deref().unwrap_or_default();
        Ok(Box::new(Cursor::new(data)))
    }
}
