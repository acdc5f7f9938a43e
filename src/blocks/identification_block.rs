use crate::{
    Error, Result,
    blocks::common::{read_fixed_str, read_u16, validate_buffer_size},
    parsing::MajorVersion,
    types::ByteOrder,
};

/// Identification Block - file format identifier at the start of every MDF file.
///
/// Always 64 bytes at offset 0. The layout of the first 30 bytes is shared by
/// 3.x and 4.x, which is what makes version detection possible.
#[derive(Debug, Clone)]
pub struct IdentificationBlock {
    /// File identifier string ("MDF" or "UnFinMF").
    pub file_id: String,
    /// Format version string (e.g., "4.10").
    pub format_version: String,
    /// Program identifier string (tool that created the file).
    pub program_id: String,
    /// Numeric version (e.g., 410 for version 4.10).
    pub version_number: u16,
    /// 3.x default byte order for channel values (0 = Intel).
    pub byte_order: ByteOrder,
    /// Standard unfinalized flags (4.x only).
    pub unfinalized_flags: u16,
}

impl IdentificationBlock {
    pub const SIZE: usize = 64;

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        validate_buffer_size(bytes, Self::SIZE)?;
        let file_id = read_fixed_str(bytes, 0, 8)?;
        if file_id != "MDF" && file_id != "UnFinMF" {
            return Err(Error::FileIdentifierError(
                String::from_utf8_lossy(&bytes[0..8]).into_owned(),
            ));
        }
        let byte_order = match read_u16(bytes, 24)? {
            0 => ByteOrder::LittleEndian,
            _ => ByteOrder::BigEndian,
        };
        Ok(Self {
            file_id,
            format_version: read_fixed_str(bytes, 8, 8)?,
            program_id: read_fixed_str(bytes, 16, 8)?,
            version_number: read_u16(bytes, 28)?,
            byte_order,
            unfinalized_flags: read_u16(bytes, 60)?,
        })
    }

    /// Major version of the block layout used by the rest of the file.
    pub fn major_version(&self) -> Result<MajorVersion> {
        match self.version_number {
            300..=399 => Ok(MajorVersion::V3),
            400..=499 => Ok(MajorVersion::V4),
            other => Err(Error::UnsupportedVersion(format!(
                "MDF version {other} ({:?})",
                self.format_version
            ))),
        }
    }

    pub fn is_unfinalized(&self) -> bool {
        self.file_id == "UnFinMF"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_block(file_id: &[u8; 8], version: &[u8; 8], number: u16) -> Vec<u8> {
        let mut bytes = vec![0u8; 64];
        bytes[0..8].copy_from_slice(file_id);
        bytes[8..16].copy_from_slice(version);
        bytes[16..24].copy_from_slice(b"tests   ");
        bytes[28..30].copy_from_slice(&number.to_le_bytes());
        bytes
    }

    #[test]
    fn detects_major_version() {
        let v4 = IdentificationBlock::from_bytes(&id_block(b"MDF     ", b"4.10    ", 410)).unwrap();
        assert_eq!(v4.major_version().unwrap(), MajorVersion::V4);
        assert_eq!(v4.format_version, "4.10");

        let v3 = IdentificationBlock::from_bytes(&id_block(b"MDF     ", b"3.30    ", 330)).unwrap();
        assert_eq!(v3.major_version().unwrap(), MajorVersion::V3);
    }

    #[test]
    fn rejects_other_versions_and_ids() {
        let v2 = IdentificationBlock::from_bytes(&id_block(b"MDF     ", b"2.00    ", 200)).unwrap();
        assert_eq!(
            v2.major_version().unwrap_err().kind(),
            crate::ErrorKind::UnsupportedVersion
        );
        assert!(matches!(
            IdentificationBlock::from_bytes(&id_block(b"HDF5    ", b"4.10    ", 410)),
            Err(Error::FileIdentifierError(_))
        ));
    }

    #[test]
    fn unfinalized_marker() {
        let id = IdentificationBlock::from_bytes(&id_block(b"UnFinMF ", b"4.10    ", 410)).unwrap();
        assert!(id.is_unfinalized());
    }
}
