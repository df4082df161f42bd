//! Indexing and update options.

use crate::progress::ProgressReporter;

/// Policy applied to the wildcard filter of a directory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterPolicy {
    /// Keep only the entries whose file name matches the filter.
    #[default]
    Include,
    /// Keep only the entries whose file name does not match the filter.
    Exclude,
}

impl FilterPolicy {
    /// Returns true if this is an include policy.
    pub fn is_include(&self) -> bool {
        matches!(self, Self::Include)
    }

    /// Applies the policy to a match result.
    ///
    /// For `Include`, returns `matched` as-is; for `Exclude`, its inverse.
    pub fn apply(&self, matched: bool) -> bool {
        match self {
            Self::Include => matched,
            Self::Exclude => !matched,
        }
    }
}

/// How symbolic links met while indexing are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SymlinkPolicy {
    /// Index the link target as if it were at the link's location.
    #[default]
    Follow,
    /// Index the link itself; its data is the target path.
    DoNotFollow,
}

/// Options controlling how filesystem paths become new items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOptions {
    /// Descend into every subdirectory.
    ///
    /// When `false`, only subdirectories that pass the filter are descended
    /// into, and their contents are still filtered.
    pub recursive: bool,
    /// Keep the path of the indexed directory in the archive when a filter is used.
    pub retain_folder_structure: bool,
    /// Add files only, never directory entries.
    pub only_files: bool,
    /// How the wildcard filter is applied.
    pub filter_policy: FilterPolicy,
    /// How symbolic links are treated.
    pub symlink_policy: SymlinkPolicy,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            retain_folder_structure: false,
            only_files: false,
            filter_policy: FilterPolicy::Include,
            symlink_policy: SymlinkPolicy::Follow,
        }
    }
}

impl IndexOptions {
    /// Creates indexing options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether subdirectories are indexed.
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Sets whether the indexed directory's path is kept when filtering.
    pub fn retain_folder_structure(mut self, retain: bool) -> Self {
        self.retain_folder_structure = retain;
        self
    }

    /// Sets whether directory entries are skipped.
    pub fn only_files(mut self, only_files: bool) -> Self {
        self.only_files = only_files;
        self
    }

    /// Sets the filter policy.
    pub fn filter_policy(mut self, policy: FilterPolicy) -> Self {
        self.filter_policy = policy;
        self
    }

    /// Sets the symbolic link policy.
    pub fn symlink_policy(mut self, policy: SymlinkPolicy) -> Self {
        self.symlink_policy = policy;
        self
    }
}

/// Which original items a deletion removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletePolicy {
    /// Only the named item.
    #[default]
    ItemOnly,
    /// A directory together with every item stored below it.
    RecurseDirs,
}

/// What happens to original items that share a path with a new item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMode {
    /// Keep both; the archive ends up with duplicate paths.
    #[default]
    Append,
    /// Drop the original item in favour of the new one.
    Overwrite,
}

/// Options for an update run.
#[derive(Default)]
pub struct UpdateOptions {
    /// Handling of path collisions between original and new items.
    pub mode: UpdateMode,
    /// Defaults applied by the updater's indexing helpers.
    pub index: IndexOptions,
    /// Progress reporter for the run (optional).
    pub progress: Option<Box<dyn ProgressReporter>>,
}

impl std::fmt::Debug for UpdateOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateOptions")
            .field("mode", &self.mode)
            .field("index", &self.index)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl UpdateOptions {
    /// Creates update options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the update mode.
    pub fn mode(mut self, mode: UpdateMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the default indexing options.
    pub fn index(mut self, index: IndexOptions) -> Self {
        self.index = index;
        self
    }

    /// Sets the progress reporter.
    pub fn progress(mut self, reporter: impl ProgressReporter + 'static) -> Self {
        self.progress = Some(Box::new(reporter));
        self
    }

    /// Clones all settings except the progress reporter.
    pub fn clone_settings(&self) -> Self {
        Self {
            mode: self.mode,
            index: self.index,
            progress: None,
        }
    }
}
