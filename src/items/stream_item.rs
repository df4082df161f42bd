//! Items backed by a caller-owned stream.

use super::ReadSeek;
use crate::Timestamp;
use std::cell::{RefCell, RefMut};
use std::fmt;
use std::io::{self, Read, SeekFrom};

/// An item whose data comes from a caller-owned seekable stream.
///
/// The stream is borrowed for `'a`; the item records where the data starts
/// and how long it is, and rewinds to that position every time it is opened.
pub struct StreamItem<'a> {
    stream: RefCell<&'a mut dyn ReadSeek>,
    start: u64,
    size: u64,
    created: Timestamp,
}

impl<'a> StreamItem<'a> {
    /// Measures the stream from its current position to the end.
    ///
    /// The stream position is restored before returning.
    pub fn new(stream: &'a mut dyn ReadSeek) -> io::Result<Self> {
        let start = stream.stream_position()?;
        let end = stream.seek(SeekFrom::End(0))?;
        stream.seek(SeekFrom::Start(start))?;
        Ok(Self {
            stream: RefCell::new(stream),
            start,
            size: end.saturating_sub(start),
            created: Timestamp::now(),
        })
    }

    /// Returns the number of bytes the item provides.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns the time the item was created; used for every timestamp.
    pub fn timestamp(&self) -> Timestamp {
        self.created
    }

    /// Rewinds the stream and hands out a reader bounded to the item's size.
    ///
    /// Fails with [`io::ErrorKind::ResourceBusy`] while a previous reader of
    /// the same item is still alive.
    pub(crate) fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        let mut stream = self.stream.try_borrow_mut().map_err(|_| {
            io::Error::new(io::ErrorKind::ResourceBusy, "stream is already being read")
        })?;
        stream.seek(SeekFrom::Start(self.start))?;
        Ok(Box::new(BorrowedStream { stream }.take(self.size)))
    }
}

impl fmt::Debug for StreamItem<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamItem")
            .field("start", &self.start)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

struct BorrowedStream<'s, 'a> {
    stream: RefMut<'s, &'a mut dyn ReadSeek>,
}

impl Read for BorrowedStream<'_, '_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}
