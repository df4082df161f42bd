//! Index spaces used during an update.
//!
//! The engine addresses every item of the archive being written through an
//! [`OutputIndex`]. Items of the archive being updated are addressed through
//! an [`OriginalIndex`]. The two are deliberately unrelated types: the only
//! way from one to the other is
//! [`IndexRemapper::resolve`](crate::update::IndexRemapper::resolve).

use std::fmt;

/// Position of an item in the archive being written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OutputIndex(u32);

impl OutputIndex {
    /// Creates an output index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index value.
    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for OutputIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Position of an item in the archive being updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OriginalIndex(u32);

impl OriginalIndex {
    /// Creates an original-archive index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index value.
    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for OriginalIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "original #{}", self.0)
    }
}
