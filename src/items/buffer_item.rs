//! In-memory items.

use crate::Timestamp;
use std::io::{Cursor, Read};

/// An item whose data is an owned in-memory buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferItem {
    data: Vec<u8>,
    created: Timestamp,
}

impl BufferItem {
    /// Wraps `data`, stamping the item with the current time.
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            created: Timestamp::now(),
        }
    }

    /// Returns the buffered bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the buffer length.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Returns the time the item was created; used for every timestamp.
    pub fn timestamp(&self) -> Timestamp {
        self.created
    }

    pub(crate) fn open(&self) -> Box<dyn Read + '_> {
        Box::new(Cursor::new(self.data.as_slice()))
    }
}
