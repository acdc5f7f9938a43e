//! Locating the records of each channel group, relocating them into the
//! binary store when the source layout cannot be addressed in place.

use crate::{
    Result,
    options::{ImportOptions, UnsortedPolicy},
    parsing::{BlockReader, DataFragment, RawDataGroup, reader::ByteRangeReader},
    store::BinaryStore,
};
use log::{debug, warn};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The binary store of one import, opened on first use.
pub(super) struct StoreSlot {
    path: PathBuf,
    store: Option<BinaryStore>,
}

impl StoreSlot {
    pub fn new(path: PathBuf) -> Self {
        Self { path, store: None }
    }

    fn append(&mut self, bytes: &[u8]) -> Result<(PathBuf, u64)> {
        let store = match self.store.take() {
            Some(store) => store,
            None => BinaryStore::open(&self.path)?,
        };
        let store = self.store.insert(store);
        Ok((self.path.clone(), store.append(bytes)?))
    }

    /// Path of the store when anything was written to it.
    pub fn used(&self) -> Option<&Path> {
        self.store.as_ref().map(|_| self.path.as_path())
    }

    pub fn flush(&mut self) -> Result<()> {
        match &mut self.store {
            Some(store) => store.flush(),
            None => Ok(()),
        }
    }

    pub fn rollback(&mut self) -> Result<()> {
        match self.store.take() {
            Some(store) => store.rollback(),
            None => Ok(()),
        }
    }
}

/// Consecutive records of one channel group in one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct RecordRun {
    pub file: PathBuf,
    pub offset: u64,
    pub records: u64,
}

/// Where the records of a channel group can be read.
#[derive(Debug, Clone)]
pub(super) struct GroupRecords {
    pub runs: Vec<RecordRun>,
    pub record_size: u64,
    /// Bytes in front of the data bytes of every record.
    pub data_offset: u64,
    /// Record bytes still in memory after relocation.
    memory: Option<Vec<u8>>,
}

impl GroupRecords {
    pub fn available(&self) -> u64 {
        self.runs.iter().map(|r| r.records).sum()
    }

    /// Rows of a group declaring `cycle_count` records. Groups without
    /// record bytes (only virtual channels) take the declared count.
    pub fn rows(&self, cycle_count: u64) -> u64 {
        if self.record_size == 0 {
            cycle_count
        } else {
            cycle_count.min(self.available())
        }
    }

    #[cfg(test)]
    pub fn in_memory(record_size: u64, data_offset: u64, bytes: Vec<u8>) -> Self {
        Self {
            runs: Vec::new(),
            record_size,
            data_offset,
            memory: Some(bytes),
        }
    }

    /// All record bytes of the group, read from the source when they were
    /// left in place.
    pub fn load<R: ByteRangeReader + ?Sized>(&self, source: &mut R) -> Result<Cow<'_, [u8]>> {
        if let Some(memory) = &self.memory {
            return Ok(Cow::Borrowed(memory));
        }
        let mut bytes = Vec::with_capacity((self.available() * self.record_size) as usize);
        for run in &self.runs {
            bytes.extend_from_slice(&source.read_range(run.offset, run.records * self.record_size)?);
        }
        Ok(Cow::Owned(bytes))
    }
}

/// Record locations of every channel group of a data group.
#[derive(Debug, Default)]
pub(super) struct DataGroupRecords {
    /// Per channel group, `None` for VLSD groups.
    pub groups: Vec<Option<GroupRecords>>,
    /// Signal data streams of VLSD channel groups by block position.
    pub vlsd: BTreeMap<u64, Vec<u8>>,
}

/// Every fragment starts on a record boundary and is made of stored bytes.
fn addressable(fragments: &[DataFragment], record_size: u64) -> bool {
    let Some((_, init)) = fragments.split_last() else {
        return true;
    };
    fragments
        .iter()
        .all(|f| matches!(f, DataFragment::Stored { .. }))
        && init.iter().all(|f| f.len() % record_size == 0)
}

/// Find the records of every channel group of `dg`.
///
/// Returns `None` when the group is skipped.
pub(super) fn locate<R: ByteRangeReader + ?Sized>(
    reader: &mut BlockReader<'_, R>,
    dg: &RawDataGroup,
    source: &Path,
    store: &mut StoreSlot,
    options: &ImportOptions,
) -> Result<Option<DataGroupRecords>> {
    let mut located = DataGroupRecords::default();

    if dg.is_unsorted() {
        if options.unsorted == UnsortedPolicy::Skip {
            warn!(
                "skipping unsorted data group with {} channel groups",
                dg.channel_groups.len()
            );
            return Ok(None);
        }
        let data = dg.read_all(reader)?;
        let mut split = dg.split_records(&data)?;
        debug!(
            "sorting {} bytes of an unsorted data group into {} channel groups",
            data.len(),
            split.len()
        );
        for cg in &dg.channel_groups {
            let bytes = split.remove(&cg.record_id).unwrap_or_default();
            if cg.is_vlsd {
                located.vlsd.insert(cg.position, bytes);
                located.groups.push(None);
                continue;
            }
            let record_size = (cg.data_bytes + cg.invalidation_bytes) as u64;
            let (file, offset) = store.append(&bytes)?;
            located.groups.push(Some(GroupRecords {
                runs: vec![RecordRun {
                    file,
                    offset,
                    records: (bytes.len() as u64).checked_div(record_size).unwrap_or(0),
                }],
                record_size,
                data_offset: 0,
                memory: Some(bytes),
            }));
        }
        return Ok(Some(located));
    }

    let Some(cg) = dg.channel_groups.first() else {
        return Ok(Some(located));
    };
    let record_size = dg.record_size(cg);
    if cg.is_vlsd {
        located.groups.push(None);
        return Ok(Some(located));
    }
    if record_size == 0 {
        debug!("channel group {:?} stores no record bytes", cg.name);
        located.groups.push(Some(GroupRecords {
            runs: Vec::new(),
            record_size: 0,
            data_offset: dg.record_id_size as u64,
            memory: None,
        }));
        return Ok(Some(located));
    }

    let records = if addressable(&dg.fragments, record_size) {
        let runs = dg
            .fragments
            .iter()
            .filter_map(|fragment| match *fragment {
                DataFragment::Stored { offset, length } if length >= record_size => {
                    Some(RecordRun {
                        file: source.to_path_buf(),
                        offset,
                        records: length / record_size,
                    })
                }
                _ => None,
            })
            .collect();
        GroupRecords {
            runs,
            record_size,
            data_offset: dg.record_id_size as u64,
            memory: None,
        }
    } else {
        let data = dg.read_all(reader)?;
        debug!(
            "relocating {} bytes of channel group {:?} to the binary store",
            data.len(),
            cg.name
        );
        let (file, offset) = store.append(&data)?;
        GroupRecords {
            runs: vec![RecordRun {
                file,
                offset,
                records: data.len() as u64 / record_size,
            }],
            record_size,
            data_offset: dg.record_id_size as u64,
            memory: Some(data),
        }
    };
    located.groups.push(Some(records));
    Ok(Some(located))
}
