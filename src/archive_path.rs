//! In-archive path type with validation, and derivation from filesystem paths.

use crate::{Error, Result};
use std::fmt;
use std::path::{Component, Path};

/// Maximum length for archive paths (in bytes).
const MAX_PATH_LENGTH: usize = 32768;

/// A validated path of an item inside the archive being written.
///
/// `ArchivePath` always uses forward slashes and guarantees that:
/// - No NUL bytes are present
/// - The path is not absolute (does not start with `/`)
/// - No empty segments exist (no `//` or trailing `/`)
/// - No `.` or `..` segments are present
///
/// # Examples
///
/// ```
/// use arcweave::ArchivePath;
///
/// let path = ArchivePath::new("dir/file.txt").unwrap();
/// assert_eq!(path.file_name(), "file.txt");
///
/// assert!(ArchivePath::new("../secret").is_err());
/// assert!(ArchivePath::new("/absolute/path").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArchivePath(String);

impl ArchivePath {
    /// Creates a new `ArchivePath` from a string, validating it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArchivePath`] if the path is empty, absolute,
    /// contains NUL bytes, or contains empty, `.` or `..` segments.
    pub fn new(s: &str) -> Result<Self> {
        Self::validate(s)?;
        Ok(Self(s.to_string()))
    }

    fn validate(s: &str) -> Result<()> {
        if s.contains('\0') {
            return Err(Error::InvalidArchivePath("contains NUL byte".into()));
        }
        if s.is_empty() {
            return Err(Error::InvalidArchivePath("empty path".into()));
        }
        if s.len() > MAX_PATH_LENGTH {
            return Err(Error::InvalidArchivePath(format!(
                "path exceeds maximum length of {} bytes",
                MAX_PATH_LENGTH
            )));
        }
        if s.starts_with('/') {
            return Err(Error::InvalidArchivePath(format!(
                "absolute path not allowed: {}",
                s
            )));
        }
        for segment in s.split('/') {
            match segment {
                "" => {
                    return Err(Error::InvalidArchivePath(format!(
                        "empty segment in '{}'",
                        s
                    )));
                }
                "." | ".." => {
                    return Err(Error::InvalidArchivePath(format!(
                        "'{}' segment not allowed in '{}'",
                        segment, s
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Derives the in-archive path of a filesystem item.
    ///
    /// `search_prefix` is the in-archive location of the directory the item
    /// was found in while indexing, if any.
    ///
    /// - Relative paths without `.`/`..` references keep their relative form,
    ///   unless the item was found while indexing (then it goes under the prefix).
    /// - Absolute paths and paths with dot references keep only their file
    ///   name, placed under `search_prefix` when present.
    ///
    /// Returns `Ok(None)` when the path has no usable name (e.g. `.` or `..`).
    ///
    /// # Examples
    ///
    /// ```
    /// use arcweave::ArchivePath;
    /// use std::path::Path;
    ///
    /// let derived = ArchivePath::from_fs_path(Path::new("foo/bar/test.txt"), None).unwrap();
    /// assert_eq!(derived.unwrap().as_str(), "foo/bar/test.txt");
    ///
    /// let derived = ArchivePath::from_fs_path(Path::new("../test.txt"), None).unwrap();
    /// assert_eq!(derived.unwrap().as_str(), "test.txt");
    /// ```
    pub fn from_fs_path(path: &Path, search_prefix: Option<&ArchivePath>) -> Result<Option<Self>> {
        let normal = lexically_normal(path);
        let file_name = match normal.last() {
            Some(Component::Normal(name)) => utf8(name, path)?,
            _ => return Ok(None),
        };

        let has_dot_references = path
            .components()
            .any(|c| matches!(c, Component::CurDir | Component::ParentDir));
        if path.has_root() || has_dot_references || search_prefix.is_some() {
            return match search_prefix {
                Some(prefix) => prefix.join(file_name).map(Some),
                None => Self::new(file_name).map(Some),
            };
        }

        let mut segments = Vec::with_capacity(normal.len());
        for component in &normal {
            match component {
                Component::Normal(name) => segments.push(utf8(name, path)?),
                // Drive prefixes without a root (e.g. `C:foo`) carry no archive meaning.
                _ => {}
            }
        }
        Self::new(&segments.join("/")).map(Some)
    }

    /// Builds a path from every normal component of `path`.
    ///
    /// Roots, drive prefixes and `.`/`..` references are dropped after lexical
    /// normalisation, so `/srv/data/./logs` becomes `srv/data/logs`. Returns
    /// `Ok(None)` when nothing is left.
    pub fn from_fs_components(path: &Path) -> Result<Option<Self>> {
        let mut segments = Vec::new();
        for component in lexically_normal(path) {
            if let Component::Normal(name) = component {
                segments.push(utf8(name, path)?);
            }
        }
        if segments.is_empty() {
            return Ok(None);
        }
        Self::new(&segments.join("/")).map(Some)
    }

    /// Returns the path as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Joins this path with another (possibly multi-segment) relative path.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting path would be invalid.
    pub fn join(&self, other: &str) -> Result<Self> {
        Self::new(&format!("{}/{}", self.0, other))
    }

    /// Returns the parent directory of this path, if any.
    pub fn parent(&self) -> Option<Self> {
        self.0.rfind('/').map(|idx| Self(self.0[..idx].to_string()))
    }

    /// Returns the file name (last segment) of this path.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Returns an iterator over the path segments.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }
}

/// Resolves `.` and `..` components without touching the filesystem.
fn lexically_normal(path: &Path) -> Vec<Component<'_>> {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out
}

fn utf8<'p>(name: &'p std::ffi::OsStr, path: &Path) -> Result<&'p str> {
    name.to_str().ok_or_else(|| {
        Error::InvalidArchivePath(format!("non UTF-8 path: {}", path.display()))
    })
}

impl AsRef<str> for ArchivePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArchivePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for ArchivePath {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for ArchivePath {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::validate(&s)?;
        Ok(Self(s))
    }
}
