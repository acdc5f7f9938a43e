//! DZ Block - Compressed Data Block
//!
//! The DZ block contains zlib-compressed data that represents another block type
//! (typically DT or SD). Decompression requires the `compression` feature.

use crate::{
    Error, Result,
    blocks::common::{BlockParse, read_u8, read_u32, read_u64, validate_buffer_size},
    parsing::RawBlock,
};

/// Compression algorithm used in DZ block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DzCompressionType {
    /// Deflate only (zlib).
    Deflate,
    /// Transposition followed by deflate.
    TranspositionDeflate,
}

/// DZ Block - Zlib compressed data block.
///
/// Data section layout (after the 24-byte header, no links):
/// - 0..2: original block type (e.g. "DT")
/// - 2: compression type
/// - 4..8: zip parameter (column count for transposition)
/// - 8..16: original data length
/// - 16..24: compressed data length
/// - 24..: compressed data
#[derive(Debug, Clone)]
pub struct DzBlock {
    /// Original block type identifier without the `##` prefix ("DT", "SD", ...).
    pub original_block_type: [u8; 2],
    pub zip_type: DzCompressionType,
    /// For transposition: number of columns (the record size).
    pub zip_parameter: u32,
    /// Original uncompressed data size in bytes.
    pub original_data_length: u64,
    /// Compressed data bytes (zlib format).
    pub data: Vec<u8>,
}

impl BlockParse for DzBlock {
    const ID: &'static str = "##DZ";

    fn from_raw(raw: &RawBlock) -> Result<Self> {
        let bytes = &raw.payload;
        validate_buffer_size(bytes, 24)?;
        let zip_type = match read_u8(bytes, 2)? {
            0 => DzCompressionType::Deflate,
            1 => DzCompressionType::TranspositionDeflate,
            other => {
                return Err(Error::UnsupportedVersion(format!(
                    "DZ compression type {other} at {:#x}",
                    raw.position
                )));
            }
        };
        let compressed_len = read_u64(bytes, 16)? as usize;
        validate_buffer_size(bytes, 24 + compressed_len)?;
        Ok(Self {
            original_block_type: [bytes[0], bytes[1]],
            zip_type,
            zip_parameter: read_u32(bytes, 4)?,
            original_data_length: read_u64(bytes, 8)?,
            data: bytes[24..24 + compressed_len].to_vec(),
        })
    }
}

impl DzBlock {
    /// Decompress the block data.
    ///
    /// Returns the original uncompressed bytes. For transposition+deflate,
    /// this also applies the inverse transposition.
    #[cfg(feature = "compression")]
    pub fn decompress(&self) -> Result<Vec<u8>> {
        use miniz_oxide::inflate::decompress_to_vec_zlib;

        let inflated = decompress_to_vec_zlib(&self.data)
            .map_err(|e| Error::corrupt(format!("DZ decompression failed: {e:?}")))?;

        if inflated.len() as u64 != self.original_data_length {
            return Err(Error::corrupt(format!(
                "DZ decompressed size mismatch: expected {}, got {}",
                self.original_data_length,
                inflated.len()
            )));
        }

        match self.zip_type {
            DzCompressionType::Deflate => Ok(inflated),
            DzCompressionType::TranspositionDeflate => {
                inverse_transpose(inflated, self.zip_parameter as usize)
            }
        }
    }

    #[cfg(not(feature = "compression"))]
    pub fn decompress(&self) -> Result<Vec<u8>> {
        Err(Error::UnsupportedVersion(
            "DZ blocks need the `compression` feature".to_string(),
        ))
    }
}

/// Undo the column-major transposition of a DZ payload.
///
/// Only the leading `rows * columns` bytes are transposed; a trailing
/// remainder shorter than one row is stored as-is.
#[cfg_attr(not(feature = "compression"), allow(dead_code))]
fn inverse_transpose(data: Vec<u8>, columns: usize) -> Result<Vec<u8>> {
    if columns == 0 {
        return Err(Error::corrupt("DZ transposition with zero columns"));
    }
    let rows = data.len() / columns;
    let square = rows * columns;
    let mut result = vec![0u8; data.len()];
    for col in 0..columns {
        for row in 0..rows {
            result[row * columns + col] = data[col * rows + row];
        }
    }
    result[square..].copy_from_slice(&data[square..]);
    Ok(result)
}
