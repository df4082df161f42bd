//! Item properties exchanged with the engine.

use crate::Timestamp;

/// File attribute flags in the Windows convention used by 7z archives.
pub mod attributes {
    /// Read-only file.
    pub const READONLY: u32 = 0x01;
    /// Directory.
    pub const DIRECTORY: u32 = 0x10;
    /// Archive bit, set on regular files.
    pub const ARCHIVE: u32 = 0x20;
    /// No other attributes set.
    pub const NORMAL: u32 = 0x80;
    /// The high 16 bits hold Unix mode bits.
    pub const UNIX_EXTENSION: u32 = 0x8000;
}

/// An item property the engine can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    /// In-archive path.
    Path,
    /// Whether the item is a directory.
    IsDir,
    /// Uncompressed size in bytes.
    Size,
    /// Attribute flags, see [`attributes`].
    Attributes,
    /// Creation time.
    CreationTime,
    /// Last access time.
    AccessTime,
    /// Last modification time.
    ModificationTime,
    /// Whether the item is an anti-item (a deletion marker).
    IsAnti,
    /// Any property this crate does not model, by numeric id.
    Other(u32),
}

impl PropertyKind {
    /// Maps a 7-Zip property id to a kind.
    ///
    /// # Example
    ///
    /// ```rust
    /// use arcweave::PropertyKind;
    ///
    /// assert_eq!(PropertyKind::from_id(3), PropertyKind::Path);
    /// assert_eq!(PropertyKind::from_id(21), PropertyKind::IsAnti);
    /// assert_eq!(PropertyKind::from_id(99), PropertyKind::Other(99));
    /// ```
    pub fn from_id(id: u32) -> Self {
        match id {
            3 => Self::Path,
            6 => Self::IsDir,
            7 => Self::Size,
            9 => Self::Attributes,
            10 => Self::CreationTime,
            11 => Self::AccessTime,
            12 => Self::ModificationTime,
            21 => Self::IsAnti,
            other => Self::Other(other),
        }
    }

    /// Returns the 7-Zip property id of this kind.
    pub fn id(self) -> u32 {
        match self {
            Self::Path => 3,
            Self::IsDir => 6,
            Self::Size => 7,
            Self::Attributes => 9,
            Self::CreationTime => 10,
            Self::AccessTime => 11,
            Self::ModificationTime => 12,
            Self::IsAnti => 21,
            Self::Other(id) => id,
        }
    }
}

/// The value of an item property.
///
/// `Empty` means the property does not apply to the item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PropertyValue {
    /// No value.
    #[default]
    Empty,
    /// Boolean flag.
    Bool(bool),
    /// 32-bit unsigned integer.
    UInt32(u32),
    /// 64-bit unsigned integer.
    UInt64(u64),
    /// Text.
    String(String),
    /// Timestamp.
    FileTime(Timestamp),
}

impl PropertyValue {
    /// Returns `true` for [`PropertyValue::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns the boolean value, if any.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer value widened to `u64`, if any.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::UInt32(v) => Some(u64::from(*v)),
            Self::UInt64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the 32-bit integer value, if any.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::UInt32(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the text value, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the timestamp value, if any.
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Self::FileTime(ts) => Some(*ts),
            _ => None,
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        Self::UInt32(value)
    }
}

impl From<u64> for PropertyValue {
    fn from(value: u64) -> Self {
        Self::UInt64(value)
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Timestamp> for PropertyValue {
    fn from(value: Timestamp) -> Self {
        Self::FileTime(value)
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_mapping_is_consistent() {
        for id in [3, 6, 7, 9, 10, 11, 12, 21, 0, 4, 100] {
            assert_eq!(PropertyKind::from_id(id).id(), id);
        }
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(PropertyValue::from(true).as_bool(), Some(true));
        assert_eq!(PropertyValue::from(5u32).as_u64(), Some(5));
        assert_eq!(PropertyValue::from(5u64).as_u32(), None);
        assert_eq!(PropertyValue::from("a".to_string()).as_str(), Some("a"));
        let ts = Timestamp::from_filetime(42);
        assert_eq!(PropertyValue::from(ts).as_timestamp(), Some(ts));
    }

    #[test]
    fn test_option_conversion() {
        assert!(PropertyValue::from(None::<u64>).is_empty());
        assert_eq!(PropertyValue::from(Some(1u64)), PropertyValue::UInt64(1));
    }
}
