//! Filesystem-backed items.

use crate::options::SymlinkPolicy;
use crate::property::attributes;
use crate::{Error, Result, Timestamp};
use filetime::FileTime;
use std::fs::{self, File, Metadata};
use std::io::{self, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};

/// A file, directory or symbolic link on disk.
///
/// Metadata is captured when the item is indexed; the file itself is only
/// opened when the engine asks for its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsItem {
    fs_path: PathBuf,
    is_dir: bool,
    link_target: Option<PathBuf>,
    size: u64,
    attributes: u32,
    created: Option<Timestamp>,
    accessed: Option<Timestamp>,
    modified: Option<Timestamp>,
}

impl FsItem {
    /// Reads the metadata of `path`.
    ///
    /// With [`SymlinkPolicy::DoNotFollow`] a symbolic link is indexed as a
    /// link whose data is its target path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the path does not exist or cannot be inspected.
    pub fn new(path: impl AsRef<Path>, policy: SymlinkPolicy) -> Result<Self> {
        let path = path.as_ref();
        let metadata = match policy {
            SymlinkPolicy::Follow => fs::metadata(path)?,
            SymlinkPolicy::DoNotFollow => fs::symlink_metadata(path)?,
        };
        Self::from_metadata(path, &metadata)
    }

    /// Builds an item from metadata that was already read.
    pub(crate) fn from_metadata(path: &Path, metadata: &Metadata) -> Result<Self> {
        let link_target = if metadata.file_type().is_symlink() {
            Some(fs::read_link(path)?)
        } else {
            None
        };
        let is_dir = metadata.is_dir();
        let size = match (&link_target, is_dir) {
            (Some(target), _) => target.as_os_str().len() as u64,
            (None, true) => 0,
            (None, false) => metadata.len(),
        };

        Ok(Self {
            fs_path: path.to_path_buf(),
            is_dir,
            link_target,
            size,
            attributes: attributes_of(metadata),
            created: FileTime::from_creation_time(metadata).and_then(Timestamp::from_file_time),
            accessed: Timestamp::from_file_time(FileTime::from_last_access_time(metadata)),
            modified: Timestamp::from_file_time(FileTime::from_last_modification_time(metadata)),
        })
    }

    /// Reads the metadata of `path`, requiring a non-directory.
    pub(crate) fn file(path: &Path, policy: SymlinkPolicy) -> Result<Self> {
        let item = Self::new(path, policy)?;
        if item.is_dir {
            return Err(Error::NotAFile {
                path: path.display().to_string(),
            });
        }
        Ok(item)
    }

    /// Returns the path on disk.
    pub fn fs_path(&self) -> &Path {
        &self.fs_path
    }

    /// Returns `true` for directories.
    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// Returns `true` for symbolic links that were not followed.
    pub fn is_symlink(&self) -> bool {
        self.link_target.is_some()
    }

    /// Returns the size in bytes captured at indexing time.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns the attribute flags.
    pub fn attributes(&self) -> u32 {
        self.attributes
    }

    /// Returns the creation time, when the platform records one.
    pub fn created(&self) -> Option<Timestamp> {
        self.created
    }

    /// Returns the last access time.
    pub fn accessed(&self) -> Option<Timestamp> {
        self.accessed
    }

    /// Returns the last modification time.
    pub fn modified(&self) -> Option<Timestamp> {
        self.modified
    }

    /// Opens the item's data. Directories have none.
    pub(crate) fn open(&self) -> io::Result<Option<Box<dyn Read + '_>>> {
        if self.is_dir {
            return Ok(None);
        }
        if let Some(target) = &self.link_target {
            let bytes = target.to_string_lossy().into_owned().into_bytes();
            return Ok(Some(Box::new(Cursor::new(bytes))));
        }
        let file = File::open(&self.fs_path)?;
        Ok(Some(Box::new(BufReader::new(file))))
    }
}

fn attributes_of(metadata: &Metadata) -> u32 {
    let mut attrs = if metadata.is_dir() {
        attributes::DIRECTORY
    } else {
        attributes::ARCHIVE
    };
    if metadata.permissions().readonly() {
        attrs |= attributes::READONLY;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        attrs |= attributes::UNIX_EXTENSION | (metadata.mode() << 16);
    }
    attrs
}
