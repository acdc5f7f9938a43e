//! Append-only side file for raw records that cannot be addressed in place.
//!
//! Compressed data blocks, records of unsorted data groups and record runs
//! split across data-list fragments are copied here during import. External
//! components then point into the store instead of the source file.

mod traits;

pub use traits::{FileStore, StoreWrite, VecStore};

use crate::Result;
use std::path::Path;

/// Appended runs start on this boundary.
const ALIGNMENT: u64 = 8;

pub struct BinaryStore<W: StoreWrite = FileStore> {
    writer: W,
    /// Size of the destination before this store appended anything.
    start: u64,
}

impl BinaryStore<FileStore> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_writer(FileStore::open(path)?))
    }

    pub fn path(&self) -> &Path {
        self.writer.path()
    }
}

impl<W: StoreWrite> BinaryStore<W> {
    pub fn from_writer(writer: W) -> Self {
        let start = writer.position();
        Self { writer, start }
    }

    /// Append `bytes`, returning the offset they were written at.
    pub fn append(&mut self, bytes: &[u8]) -> Result<u64> {
        let padding = (ALIGNMENT - self.writer.position() % ALIGNMENT) % ALIGNMENT;
        if padding != 0 {
            self.writer.write_all(&[0u8; ALIGNMENT as usize][..padding as usize])?;
        }
        let offset = self.writer.position();
        self.writer.write_all(bytes)?;
        Ok(offset)
    }

    /// Bytes appended by this store.
    pub fn appended(&self) -> u64 {
        self.writer.position() - self.start
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()
    }

    /// Undo every append of this store.
    pub fn rollback(mut self) -> Result<()> {
        self.writer.discard(self.start)
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_are_aligned() {
        let mut store = BinaryStore::from_writer(VecStore::new());
        assert_eq!(store.append(&[1, 2, 3]).unwrap(), 0);
        assert_eq!(store.append(&[4]).unwrap(), 8);
        assert_eq!(store.appended(), 9);
        let bytes = store.into_inner().into_inner();
        assert_eq!(&bytes[..3], &[1, 2, 3]);
        assert_eq!(bytes[8], 4);
    }

    #[test]
    fn rollback_restores_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, [9u8; 5]).unwrap();

        let mut store = BinaryStore::open(&path).unwrap();
        assert_eq!(store.append(&[1, 2]).unwrap(), 8);
        store.flush().unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 10);
        store.rollback().unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![9u8; 5]);
    }

    #[test]
    fn rollback_removes_created_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.bin");
        let mut store = BinaryStore::open(&path).unwrap();
        store.append(&[1; 16]).unwrap();
        assert_eq!(store.path(), path.as_path());
        store.rollback().unwrap();
        assert!(!path.exists());
    }
}
