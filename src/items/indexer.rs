//! Turns filesystem paths into item descriptors.

use super::FsItem;
use crate::options::{FilterPolicy, IndexOptions, SymlinkPolicy};
use crate::{ArchivePath, Error, Result};
use glob::Pattern;
use std::io;
use std::path::{Component, Path};
use walkdir::WalkDir;

pub(crate) type Indexed = Vec<(ArchivePath, FsItem)>;

/// Compiles a wildcard filter. An empty filter matches every name.
fn compile_filter(filter: &str) -> Result<Option<Pattern>> {
    if filter.is_empty() {
        return Ok(None);
    }
    Pattern::new(filter)
        .map(Some)
        .map_err(|e| Error::InvalidPattern {
            pattern: filter.to_string(),
            reason: e.to_string(),
        })
}

fn is_plain_relative(path: &Path) -> bool {
    !path.has_root() && path.components().all(|c| matches!(c, Component::Normal(_)))
}

fn name_required(path: &Path) -> Error {
    Error::InvalidArchivePath(format!("cannot derive an archive name from {}", path.display()))
}

/// Indexes the contents of `dir` whose file names pass `filter`.
pub(crate) fn index_directory(dir: &Path, filter: &str, options: IndexOptions) -> Result<Indexed> {
    let root = FsItem::new(dir, options.symlink_policy)?;
    if !root.is_dir() {
        return Err(Error::NotADirectory {
            path: dir.display().to_string(),
        });
    }
    let pattern = compile_filter(filter)?;

    let prefix = if options.retain_folder_structure {
        ArchivePath::from_fs_components(dir)?
    } else if pattern.is_none() || is_plain_relative(dir) {
        ArchivePath::from_fs_path(dir, None)?
    } else {
        None
    };

    let mut out = Indexed::new();
    if pattern.is_none() && !options.only_files {
        if let Some(prefix) = &prefix {
            out.push((prefix.clone(), root));
        }
    }
    walk(dir, prefix.as_ref(), pattern.as_ref(), options, &mut out)?;
    log::debug!(
        "indexed {} item(s) from {} (filter '{}')",
        out.len(),
        dir.display(),
        filter
    );
    Ok(out)
}

/// Indexes a single path, expanding directories when indexing recursively.
///
/// `alias` replaces the derived in-archive path of `path` itself.
pub(crate) fn index_path(
    path: &Path,
    alias: Option<ArchivePath>,
    options: IndexOptions,
) -> Result<Indexed> {
    let item = FsItem::new(path, options.symlink_policy)?;
    let archive_path = match alias {
        Some(alias) => Some(alias),
        None if options.retain_folder_structure => ArchivePath::from_fs_components(path)?,
        None => ArchivePath::from_fs_path(path, None)?,
    };

    let mut out = Indexed::new();
    if !item.is_dir() {
        let archive_path = archive_path.ok_or_else(|| name_required(path))?;
        out.push((archive_path, item));
    } else if options.recursive {
        if !options.only_files {
            if let Some(archive_path) = &archive_path {
                out.push((archive_path.clone(), item));
            }
        }
        let options = options.filter_policy(FilterPolicy::Include);
        walk(path, archive_path.as_ref(), None, options, &mut out)?;
    }
    Ok(out)
}

/// Derives the in-archive path of a single file added by the caller.
pub(crate) fn file_name_for(path: &Path, name: &str) -> Result<ArchivePath> {
    if name.is_empty() {
        ArchivePath::from_fs_path(path, None)?.ok_or_else(|| name_required(path))
    } else {
        ArchivePath::new(name)
    }
}

fn walk(
    dir: &Path,
    prefix: Option<&ArchivePath>,
    pattern: Option<&Pattern>,
    options: IndexOptions,
    out: &mut Indexed,
) -> Result<()> {
    let mut walker = WalkDir::new(dir)
        .min_depth(1)
        .follow_links(options.symlink_policy == SymlinkPolicy::Follow)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = entry.map_err(io::Error::from)?;
        let name = entry.file_name().to_str().ok_or_else(|| {
            Error::InvalidArchivePath(format!("non UTF-8 path: {}", entry.path().display()))
        })?;
        let matched = pattern.is_none_or(|p| p.matches(name));
        if !options.filter_policy.apply(matched) {
            // Without recursion only the selected children are descended into.
            if !options.recursive && entry.depth() == 1 && entry.file_type().is_dir() {
                walker.skip_current_dir();
            }
            continue;
        }

        let metadata = entry.metadata().map_err(io::Error::from)?;
        if options.only_files && metadata.is_dir() {
            continue;
        }

        let relative = entry.path().strip_prefix(dir).unwrap_or(entry.path());
        let Some(relative) = ArchivePath::from_fs_components(relative)? else {
            continue;
        };
        let archive_path = match prefix {
            Some(prefix) => prefix.join(relative.as_str())?,
            None => relative,
        };
        out.push((archive_path, FsItem::from_metadata(entry.path(), &metadata)?));
    }
    Ok(())
}
