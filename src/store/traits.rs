//! Sinks the binary store appends to.

use crate::Result;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Append-only destination of relocated bytes.
pub trait StoreWrite {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()>;

    /// Number of bytes in the destination, including earlier sessions.
    fn position(&self) -> u64;

    fn flush(&mut self) -> Result<()>;

    /// Forget everything written after `len`.
    ///
    /// A file created by this sink is removed when `len` is zero.
    fn discard(&mut self, len: u64) -> Result<()>;
}

/// In-memory store, used by tests and by imports that only inspect layouts.
#[derive(Debug, Default)]
pub struct VecStore {
    buffer: Vec<u8>,
}

impl VecStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}

impl StoreWrite for VecStore {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    fn position(&self) -> u64 {
        self.buffer.len() as u64
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn discard(&mut self, len: u64) -> Result<()> {
        self.buffer.truncate(len as usize);
        Ok(())
    }
}

/// File opened in append mode behind a `BufWriter`.
pub struct FileStore {
    inner: BufWriter<File>,
    path: PathBuf,
    position: u64,
    created: bool,
}

impl FileStore {
    /// Open `path` for appending, creating it when missing. 1 MB buffer.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_capacity(path, 1_048_576)
    }

    pub fn with_capacity(path: impl AsRef<Path>, capacity: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let created = !path.exists();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let position = file.metadata()?.len();
        Ok(Self {
            inner: BufWriter::with_capacity(capacity, file),
            path,
            position,
            created,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StoreWrite for FileStore {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        self.position += bytes.len() as u64;
        Ok(())
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    fn discard(&mut self, len: u64) -> Result<()> {
        self.inner.flush()?;
        if len == 0 && self.created {
            fs::remove_file(&self.path)?;
        } else {
            self.inner.get_ref().set_len(len)?;
        }
        self.position = len;
        Ok(())
    }
}
