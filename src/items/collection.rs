//! The ordered list of items added by the caller.

use super::indexer::{self, Indexed};
use super::{BufferItem, FsItem, ItemSource, NewItem, ReadSeek, StreamItem};
use crate::options::IndexOptions;
use crate::{ArchivePath, OriginalIndex, Result};
use std::path::Path;

/// The ordered list of items added by the caller.
///
/// Insertion order is the order in which new items appear in the archive,
/// after all kept original items. Every mutator either adds all of its items
/// or, on error, none of them. Duplicate in-archive paths are allowed.
///
/// # Example
///
/// ```rust
/// use arcweave::NewItemCollection;
///
/// let mut items = NewItemCollection::new();
/// items.add_buffer(b"hello".to_vec(), "greeting.txt")?;
/// items.add_buffer(Vec::new(), "empty.bin")?;
///
/// assert_eq!(items.len(), 2);
/// assert_eq!(items.get(1).unwrap().path().as_str(), "empty.bin");
/// # Ok::<(), arcweave::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct NewItemCollection<'a> {
    items: Vec<NewItem<'a>>,
}

impl<'a> NewItemCollection<'a> {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` when no item was added.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the item at `position`.
    pub fn get(&self, position: usize) -> Option<&NewItem<'a>> {
        self.items.get(position)
    }

    /// Iterates over the items in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, NewItem<'a>> {
        self.items.iter()
    }

    /// Appends a prepared descriptor.
    pub fn push(&mut self, item: NewItem<'a>) {
        self.items.push(item);
    }

    /// Adds a single file.
    ///
    /// An empty `name` derives the in-archive path from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAFile`](crate::Error::NotAFile) when `path` is a
    /// directory and [`Error::Io`](crate::Error::Io) when it cannot be read.
    pub fn add_file(
        &mut self,
        path: impl AsRef<Path>,
        name: &str,
        options: IndexOptions,
    ) -> Result<()> {
        let path = path.as_ref();
        let item = FsItem::file(path, options.symlink_policy)?;
        let archive_path = indexer::file_name_for(path, name)?;
        self.push(NewItem::new(archive_path, ItemSource::File(item)));
        Ok(())
    }

    /// Adds an in-memory buffer under `name`.
    pub fn add_buffer(&mut self, data: Vec<u8>, name: &str) -> Result<()> {
        let path = ArchivePath::new(name)?;
        self.push(NewItem::new(path, ItemSource::Buffer(BufferItem::new(data))));
        Ok(())
    }

    /// Adds a borrowed stream under `name`.
    ///
    /// The item's data is everything from the stream's current position to
    /// its end.
    pub fn add_stream(&mut self, stream: &'a mut dyn ReadSeek, name: &str) -> Result<()> {
        let path = ArchivePath::new(name)?;
        let item = StreamItem::new(stream)?;
        self.push(NewItem::new(path, ItemSource::Stream(item)));
        Ok(())
    }

    /// Adds a directory and everything below it.
    pub fn add_directory(&mut self, dir: impl AsRef<Path>, options: IndexOptions) -> Result<()> {
        let options = options.recursive(true);
        self.extend(indexer::index_directory(dir.as_ref(), "", options)?);
        Ok(())
    }

    /// Adds the contents of `dir` whose file names pass the wildcard `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotADirectory`](crate::Error::NotADirectory) when
    /// `dir` is not a directory and
    /// [`Error::InvalidPattern`](crate::Error::InvalidPattern) when `filter`
    /// does not parse.
    pub fn add_files(
        &mut self,
        dir: impl AsRef<Path>,
        filter: &str,
        options: IndexOptions,
    ) -> Result<()> {
        self.extend(indexer::index_directory(dir.as_ref(), filter, options)?);
        Ok(())
    }

    /// Adds each path; directories are expanded when indexing recursively.
    pub fn add_paths<I, P>(&mut self, paths: I, options: IndexOptions) -> Result<()>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut pending = Indexed::new();
        for path in paths {
            pending.extend(indexer::index_path(path.as_ref(), None, options)?);
        }
        self.extend(pending);
        Ok(())
    }

    /// Adds each path under its alias; an empty alias derives the path.
    pub fn add_paths_map<I, P, S>(&mut self, map: I, options: IndexOptions) -> Result<()>
    where
        I: IntoIterator<Item = (P, S)>,
        P: AsRef<Path>,
        S: AsRef<str>,
    {
        let mut pending = Indexed::new();
        for (path, alias) in map {
            let alias = match alias.as_ref() {
                "" => None,
                name => Some(ArchivePath::new(name)?),
            };
            pending.extend(indexer::index_path(path.as_ref(), alias, options)?);
        }
        self.extend(pending);
        Ok(())
    }

    pub(crate) fn add_renamed(&mut self, original: OriginalIndex, path: ArchivePath) {
        self.push(NewItem::new(path, ItemSource::Renamed(original)));
    }

    fn extend(&mut self, indexed: Indexed) {
        self.items.extend(
            indexed
                .into_iter()
                .map(|(path, item)| NewItem::new(path, ItemSource::File(item))),
        );
    }
}

impl<'a> IntoIterator for NewItemCollection<'a> {
    type Item = NewItem<'a>;
    type IntoIter = std::vec::IntoIter<NewItem<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'c, 'a> IntoIterator for &'c NewItemCollection<'a> {
    type Item = &'c NewItem<'a>;
    type IntoIter = std::slice::Iter<'c, NewItem<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
