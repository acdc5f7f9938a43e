//! Random-access byte sources.
//!
//! The block parser and the decode engine never assume the whole file is in
//! memory; they request byte ranges through [`ByteRangeReader`].

use crate::{Error, Result};
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

/// Trait for reading byte ranges from different sources (files, memory, ...).
pub trait ByteRangeReader {
    /// Read exactly `length` bytes starting at `offset`.
    ///
    /// Requests reaching past the end of the source fail with
    /// [`Error::TooShortBuffer`].
    fn read_range(&mut self, offset: u64, length: u64) -> Result<Vec<u8>>;

    /// Total size of the source in bytes.
    fn size(&self) -> u64;
}

fn check_range(offset: u64, length: u64, size: u64) -> Result<()> {
    match offset.checked_add(length) {
        Some(end) if end <= size => Ok(()),
        _ => Err(Error::TooShortBuffer {
            actual: size.saturating_sub(offset) as usize,
            expected: length as usize,
            file: file!(),
            line: line!(),
        }),
    }
}

/// Open a file read-only, mapping a missing file to [`Error::FileNotFound`].
pub(crate) fn open_read_only(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
        _ => Error::IOError(e),
    })
}

/// Local file reader implementation
pub struct FileRangeReader {
    file: File,
    size: u64,
}

impl FileRangeReader {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let file = open_read_only(path.as_ref())?;
        let size = file.metadata()?.len();
        Ok(Self { file, size })
    }
}

impl ByteRangeReader for FileRangeReader {
    fn read_range(&mut self, offset: u64, length: u64) -> Result<Vec<u8>> {
        check_range(offset, length, self.size)?;
        self.file.seek(SeekFrom::Start(offset))?;
        let mut buffer = vec![0u8; length as usize];
        self.file.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    fn size(&self) -> u64 {
        self.size
    }
}

/// Buffered file reader with read-ahead caching for better I/O performance.
///
/// Block walking issues many small reads close to each other; this reader
/// keeps a window of the file in memory to avoid a system call per block.
pub struct BufferedRangeReader {
    file: File,
    size: u64,
    buffer: Vec<u8>,
    buffer_start: u64,
    buffer_end: u64,
    buffer_capacity: usize,
}

impl BufferedRangeReader {
    /// Create a new buffered reader with the default buffer size (64 KB).
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_capacity(path, 64 * 1024)
    }

    /// Create a new buffered reader with a custom buffer size.
    pub fn with_capacity(path: impl AsRef<Path>, capacity: usize) -> Result<Self> {
        let file = open_read_only(path.as_ref())?;
        let size = file.metadata()?.len();
        Ok(Self {
            file,
            size,
            buffer: Vec::with_capacity(capacity),
            buffer_start: 0,
            buffer_end: 0,
            buffer_capacity: capacity.max(1),
        })
    }

    /// Fill the internal buffer starting at the given offset.
    fn fill_buffer(&mut self, offset: u64) -> Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        let available = (self.size - offset).min(self.buffer_capacity as u64) as usize;
        self.buffer.clear();
        self.buffer.resize(available, 0);
        self.file.read_exact(&mut self.buffer)?;
        self.buffer_start = offset;
        self.buffer_end = offset + available as u64;
        Ok(())
    }
}

impl ByteRangeReader for BufferedRangeReader {
    fn read_range(&mut self, offset: u64, length: u64) -> Result<Vec<u8>> {
        check_range(offset, length, self.size)?;
        let end = offset + length;

        if offset >= self.buffer_start && end <= self.buffer_end {
            let start_idx = (offset - self.buffer_start) as usize;
            return Ok(self.buffer[start_idx..start_idx + length as usize].to_vec());
        }

        // Larger than the window: read directly
        if length as usize > self.buffer_capacity {
            self.file.seek(SeekFrom::Start(offset))?;
            let mut buffer = vec![0u8; length as usize];
            self.file.read_exact(&mut buffer)?;
            return Ok(buffer);
        }

        self.fill_buffer(offset)?;
        Ok(self.buffer[..length as usize].to_vec())
    }

    fn size(&self) -> u64 {
        self.size
    }
}

/// In-memory byte source, mostly useful for tests and for inflated blocks.
pub struct MemoryRangeReader {
    data: Vec<u8>,
}

impl MemoryRangeReader {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl ByteRangeReader for MemoryRangeReader {
    fn read_range(&mut self, offset: u64, length: u64) -> Result<Vec<u8>> {
        check_range(offset, length, self.data.len() as u64)?;
        let start = offset as usize;
        Ok(self.data[start..start + length as usize].to_vec())
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }
}
