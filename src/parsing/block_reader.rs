//! Version-aware block access on top of a [`ByteRangeReader`].

use super::reader::ByteRangeReader;
use crate::{
    Error, Result,
    blocks::{BlockHeader, BlockParse, MetadataBlock, TextBlock, v3},
};

/// Major container version, decided from the identification block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MajorVersion {
    /// 3.x: 4-byte headers with 2-char ids and u32 links at fixed offsets.
    V3,
    /// 4.x: 24-byte headers with `##XX` ids and an explicit link section.
    V4,
}

/// One block as read from the file, before typed interpretation.
///
/// For 4.x blocks `links` holds the link section and `payload` the data
/// section that follows it. 3.x headers carry no link count, so `links` is
/// empty and `payload` holds the complete block (header included) for the
/// typed parsers to read at their fixed offsets.
#[derive(Debug, Clone)]
pub struct RawBlock {
    pub id: String,
    /// File position the block was read from.
    pub position: u64,
    pub length: u64,
    pub link_count: u64,
    pub links: Vec<u64>,
    pub payload: Vec<u8>,
}

/// Reads blocks from a byte source following one major version's layout.
pub struct BlockReader<'r, R: ByteRangeReader + ?Sized> {
    reader: &'r mut R,
    version: MajorVersion,
}

impl<'r, R: ByteRangeReader + ?Sized> BlockReader<'r, R> {
    pub fn new(reader: &'r mut R, version: MajorVersion) -> Self {
        Self { reader, version }
    }

    pub fn version(&self) -> MajorVersion {
        self.version
    }

    /// Underlying byte source, for reading record data.
    pub fn source(&mut self) -> &mut R {
        self.reader
    }

    fn check_position(&self, position: u64, minimum: u64) -> Result<()> {
        let size = self.reader.size();
        if position == 0 || position.saturating_add(minimum) > size {
            return Err(Error::corrupt(format!(
                "link {position:#x} points outside the file ({size} bytes)"
            )));
        }
        Ok(())
    }

    /// Read the block at `position`, validating its identifier tag.
    pub fn read_block(&mut self, position: u64) -> Result<RawBlock> {
        match self.version {
            MajorVersion::V4 => self.read_v4(position),
            MajorVersion::V3 => self.read_v3(position),
        }
    }

    /// Read and validate only the 24-byte header of a 4.x block, leaving bulk
    /// payloads (DT, SD, DZ) on disk.
    pub fn read_header(&mut self, position: u64) -> Result<BlockHeader> {
        self.check_position(position, BlockHeader::SIZE as u64)?;
        let head = self.reader.read_range(position, BlockHeader::SIZE as u64)?;
        let header = BlockHeader::from_bytes(&head)?;
        let tag_ok = header.id.starts_with("##")
            && header.id[2..].bytes().all(|b| b.is_ascii_uppercase());
        if !tag_ok {
            return Err(Error::BlockIDError {
                actual: header.id,
                expected: "##XX".to_string(),
                position,
            });
        }
        if header.length < BlockHeader::SIZE as u64 {
            return Err(Error::corrupt(format!(
                "{} block at {position:#x} declares length {}",
                header.id, header.length
            )));
        }
        self.check_position(position, header.length)?;
        Ok(header)
    }

    fn read_v4(&mut self, position: u64) -> Result<RawBlock> {
        let header = self.read_header(position)?;
        let link_bytes = header
            .link_count
            .checked_mul(8)
            .ok_or_else(|| Error::corrupt(format!("absurd link count at {position:#x}")))?;
        if header.length < BlockHeader::SIZE as u64 + link_bytes {
            return Err(Error::corrupt(format!(
                "{} block at {position:#x} is shorter than its link section",
                header.id
            )));
        }
        let body = self
            .reader
            .read_range(position + BlockHeader::SIZE as u64, header.length - BlockHeader::SIZE as u64)?;
        let (link_section, payload) = body.split_at(link_bytes as usize);
        let links = link_section
            .chunks_exact(8)
            .map(|c| u64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
            .collect();
        log::debug!("read {} at {position:#x} ({} bytes)", header.id, header.length);
        Ok(RawBlock {
            id: header.id,
            position,
            length: header.length,
            link_count: header.link_count,
            links,
            payload: payload.to_vec(),
        })
    }

    fn read_v3(&mut self, position: u64) -> Result<RawBlock> {
        self.check_position(position, 4)?;
        let head = self.reader.read_range(position, 4)?;
        if !head[..2].iter().all(|b| b.is_ascii_uppercase()) {
            return Err(Error::BlockIDError {
                actual: String::from_utf8_lossy(&head[..2]).into_owned(),
                expected: "XX".to_string(),
                position,
            });
        }
        let id = String::from_utf8_lossy(&head[..2]).into_owned();
        let length = u16::from_le_bytes([head[2], head[3]]) as u64;
        if length < 4 {
            return Err(Error::corrupt(format!(
                "{id} block at {position:#x} declares length {length}"
            )));
        }
        self.check_position(position, length)?;
        let payload = self.reader.read_range(position, length)?;
        log::debug!("read {id} at {position:#x} ({length} bytes)");
        Ok(RawBlock {
            id,
            position,
            length,
            link_count: 0,
            links: Vec::new(),
            payload,
        })
    }

    /// Read and interpret the block at `position` as `T`.
    pub fn read<T: BlockParse>(&mut self, position: u64) -> Result<T> {
        let raw = self.read_block(position)?;
        T::check_id(&raw)?;
        T::from_raw(&raw)
    }

    /// Resolve a text link: TX text, or the raw XML of an MD block.
    ///
    /// A zero link yields `None`. Links to other block types are skipped with
    /// a warning since they never carry structure.
    pub fn read_text(&mut self, position: u64) -> Result<Option<String>> {
        if position == 0 {
            return Ok(None);
        }
        let raw = self.read_block(position)?;
        match (self.version, raw.id.as_str()) {
            (MajorVersion::V4, "##TX") => Ok(Some(TextBlock::from_raw(&raw)?.text)),
            (MajorVersion::V4, "##MD") => Ok(Some(MetadataBlock::from_raw(&raw)?.xml)),
            (MajorVersion::V3, "TX") => Ok(Some(v3::TextBlock::from_raw(&raw)?.text)),
            (_, other) => {
                log::warn!("expected a text block at {position:#x}, found {other}; ignoring");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::reader::MemoryRangeReader;

    fn v4_block(id: &[u8; 4], links: &[u64], payload: &[u8]) -> Vec<u8> {
        let length = 24 + links.len() * 8 + payload.len();
        let mut out = Vec::new();
        out.extend_from_slice(id);
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(length as u64).to_le_bytes());
        out.extend_from_slice(&(links.len() as u64).to_le_bytes());
        for l in links {
            out.extend_from_slice(&l.to_le_bytes());
        }
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn splits_links_from_payload() -> Result<()> {
        let mut file = vec![0u8; 8];
        file.extend(v4_block(b"##DG", &[0, 0x40, 0, 0], &[1, 0, 0, 0, 0, 0, 0, 0]));
        let mut source = MemoryRangeReader::new(file);
        let mut reader = BlockReader::new(&mut source, MajorVersion::V4);
        let raw = reader.read_block(8)?;
        assert_eq!(raw.id, "##DG");
        assert_eq!(raw.links, vec![0, 0x40, 0, 0]);
        assert_eq!(raw.payload.len(), 8);
        Ok(())
    }

    #[test]
    fn bad_tag_is_corrupt() {
        let mut file = vec![0u8; 8];
        file.extend(v4_block(b"XXDG", &[], &[0; 8]));
        let mut source = MemoryRangeReader::new(file);
        let mut reader = BlockReader::new(&mut source, MajorVersion::V4);
        let err = reader.read_block(8).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::CorruptFile);
    }

    #[test]
    fn link_outside_file_is_corrupt() {
        let mut source = MemoryRangeReader::new(vec![0u8; 16]);
        let mut reader = BlockReader::new(&mut source, MajorVersion::V4);
        assert!(matches!(reader.read_block(8), Err(Error::CorruptFile(_))));
        assert!(matches!(reader.read_block(0), Err(Error::CorruptFile(_))));
    }

    #[test]
    fn v3_block_keeps_header_in_payload() -> Result<()> {
        let mut file = vec![0u8; 4];
        file.extend_from_slice(b"TX");
        file.extend_from_slice(&9u16.to_le_bytes());
        file.extend_from_slice(b"rpm\0\0");
        let mut source = MemoryRangeReader::new(file);
        let mut reader = BlockReader::new(&mut source, MajorVersion::V3);
        let raw = reader.read_block(4)?;
        assert_eq!(raw.payload.len(), 9);
        assert_eq!(reader.read_text(4)?.as_deref(), Some("rpm"));
        assert_eq!(reader.read_text(0)?, None);
        Ok(())
    }
}
