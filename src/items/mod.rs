//! Descriptors of the items added to an archive.
//!
//! A [`NewItem`] pairs an in-archive path with an [`ItemSource`]. The source
//! is one of a closed set of kinds, each answering the same questions (size,
//! timestamps, attributes, data) in its own way.

mod buffer_item;
mod collection;
mod fs_item;
mod indexer;
mod stream_item;

pub use buffer_item::BufferItem;
pub use collection::NewItemCollection;
pub use fs_item::FsItem;
pub use stream_item::StreamItem;

use crate::property::attributes;
use crate::reader::ArchiveReader;
use crate::{ArchivePath, OriginalIndex, PropertyKind, PropertyValue};
use std::io::{self, Read, Seek};

/// Combined trait for readable and seekable streams.
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek + ?Sized> ReadSeek for T {}

/// Kind of a new item's source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// A path on the local filesystem.
    FilesystemPath,
    /// An owned byte buffer.
    Buffer,
    /// A borrowed stream.
    Stream,
    /// An item of the original archive stored under a new path.
    RenameOfExisting,
}

/// Where a new item's metadata and data come from.
#[derive(Debug)]
pub enum ItemSource<'a> {
    /// A file, directory or link on disk.
    File(FsItem),
    /// An in-memory buffer.
    Buffer(BufferItem),
    /// A caller-owned stream.
    Stream(StreamItem<'a>),
    /// An original item, kept under a new path.
    Renamed(OriginalIndex),
}

/// A newly added item with its in-archive path.
#[derive(Debug)]
pub struct NewItem<'a> {
    path: ArchivePath,
    source: ItemSource<'a>,
}

impl<'a> NewItem<'a> {
    /// Creates a descriptor.
    pub fn new(path: ArchivePath, source: ItemSource<'a>) -> Self {
        Self { path, source }
    }

    /// Returns the in-archive path.
    pub fn path(&self) -> &ArchivePath {
        &self.path
    }

    /// Returns the source.
    pub fn source(&self) -> &ItemSource<'a> {
        &self.source
    }

    /// Returns the kind of the source.
    pub fn kind(&self) -> ItemKind {
        match self.source {
            ItemSource::File(_) => ItemKind::FilesystemPath,
            ItemSource::Buffer(_) => ItemKind::Buffer,
            ItemSource::Stream(_) => ItemKind::Stream,
            ItemSource::Renamed(_) => ItemKind::RenameOfExisting,
        }
    }

    /// Returns the original index for renamed items.
    pub fn renamed_from(&self) -> Option<OriginalIndex> {
        match self.source {
            ItemSource::Renamed(index) => Some(index),
            _ => None,
        }
    }

    /// Answers a property query.
    ///
    /// Renamed items take everything except their path from `archive`.
    pub fn property<A: ArchiveReader + ?Sized>(
        &self,
        kind: PropertyKind,
        archive: &A,
    ) -> PropertyValue {
        match (kind, &self.source) {
            (PropertyKind::Path, _) => PropertyValue::String(self.path.as_str().to_string()),
            (PropertyKind::IsAnti, _) => PropertyValue::Bool(false),
            (_, ItemSource::Renamed(index)) => archive.property(*index, kind),
            (PropertyKind::IsDir, ItemSource::File(item)) => item.is_dir().into(),
            (PropertyKind::IsDir, _) => false.into(),
            (PropertyKind::Size, ItemSource::File(item)) => item.size().into(),
            (PropertyKind::Size, ItemSource::Buffer(item)) => item.size().into(),
            (PropertyKind::Size, ItemSource::Stream(item)) => item.size().into(),
            (PropertyKind::Attributes, ItemSource::File(item)) => item.attributes().into(),
            (PropertyKind::Attributes, _) => attributes::NORMAL.into(),
            (PropertyKind::CreationTime, ItemSource::File(item)) => item.created().into(),
            (PropertyKind::AccessTime, ItemSource::File(item)) => item.accessed().into(),
            (PropertyKind::ModificationTime, ItemSource::File(item)) => item.modified().into(),
            (
                PropertyKind::CreationTime
                | PropertyKind::AccessTime
                | PropertyKind::ModificationTime,
                ItemSource::Buffer(item),
            ) => item.timestamp().into(),
            (
                PropertyKind::CreationTime
                | PropertyKind::AccessTime
                | PropertyKind::ModificationTime,
                ItemSource::Stream(item),
            ) => item.timestamp().into(),
            (PropertyKind::Other(_), _) => PropertyValue::Empty,
        }
    }

    /// Returns the size reported for this item.
    pub fn size<A: ArchiveReader + ?Sized>(&self, archive: &A) -> u64 {
        self.property(PropertyKind::Size, archive)
            .as_u64()
            .unwrap_or(0)
    }

    /// Opens the item's data.
    ///
    /// Returns `Ok(None)` for items without data, such as directories.
    pub fn open<'s, A: ArchiveReader + ?Sized>(
        &'s self,
        archive: &'s mut A,
    ) -> io::Result<Option<Box<dyn Read + 's>>> {
        match &self.source {
            ItemSource::File(item) => item.open(),
            ItemSource::Buffer(item) => Ok(Some(item.open())),
            ItemSource::Stream(item) => item.open().map(Some),
            ItemSource::Renamed(index) => archive.open_stream(*index).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{EmptyArchive, MemoryArchive};
    use std::io::Cursor;

    fn path(s: &str) -> ArchivePath {
        ArchivePath::new(s).unwrap()
    }

    #[test]
    fn test_buffer_properties() {
        let item = NewItem::new(path("a.bin"), ItemSource::Buffer(BufferItem::new(vec![0; 10])));
        let archive = EmptyArchive;
        assert_eq!(item.kind(), ItemKind::Buffer);
        assert_eq!(item.property(PropertyKind::Path, &archive).as_str(), Some("a.bin"));
        assert_eq!(item.property(PropertyKind::Size, &archive).as_u64(), Some(10));
        assert_eq!(item.property(PropertyKind::IsDir, &archive).as_bool(), Some(false));
        assert_eq!(
            item.property(PropertyKind::Attributes, &archive).as_u32(),
            Some(attributes::NORMAL)
        );
        assert_eq!(
            item.property(PropertyKind::CreationTime, &archive),
            item.property(PropertyKind::ModificationTime, &archive)
        );
        assert!(item.property(PropertyKind::Other(42), &archive).is_empty());
    }

    #[test]
    fn test_renamed_delegates_to_archive() {
        let mut archive = MemoryArchive::new().with_file("old.txt", b"payload".to_vec());
        let item = NewItem::new(path("new.txt"), ItemSource::Renamed(OriginalIndex::new(0)));

        assert_eq!(item.renamed_from(), Some(OriginalIndex::new(0)));
        assert_eq!(item.property(PropertyKind::Path, &archive).as_str(), Some("new.txt"));
        assert_eq!(item.size(&archive), 7);
        assert_eq!(item.property(PropertyKind::IsAnti, &archive).as_bool(), Some(false));

        let mut data = Vec::new();
        item.open(&mut archive)
            .unwrap()
            .unwrap()
            .read_to_end(&mut data)
            .unwrap();
        assert_eq!(data, b"payload");
    }

    #[test]
    fn test_stream_open() {
        let mut cursor = Cursor::new(b"stream".to_vec());
        let item = NewItem::new(
            path("s.txt"),
            ItemSource::Stream(StreamItem::new(&mut cursor).unwrap()),
        );
        let mut archive = EmptyArchive;
        assert_eq!(item.kind(), ItemKind::Stream);
        assert_eq!(item.size(&archive), 6);

        let mut data = String::new();
        item.open(&mut archive)
            .unwrap()
            .unwrap()
            .read_to_string(&mut data)
            .unwrap();
        assert_eq!(data, "stream");
    }
}
