//! Typed views of MDF blocks.
//!
//! Every block is first read as a [`RawBlock`](crate::parsing::RawBlock) by
//! the [`BlockReader`](crate::parsing::BlockReader) and then interpreted through
//! [`BlockParse`]. The 4.x blocks live at this level, the 3.x ones in [`v3`].

mod channel_block;
mod channel_group_block;
mod common;
mod conversion_block;
mod data_group_block;
mod data_list_block;
mod dz_block;
mod header_block;
mod identification_block;
mod metadata_block;
mod text_block;
pub mod v3;

pub use common::{BlockHeader, BlockParse, DataType};
pub(crate) use common::read_u64;

pub use channel_block::{ChannelBlock, ChannelType};
pub use channel_group_block::ChannelGroupBlock;
pub use conversion_block::ConversionBlock;
pub use data_group_block::DataGroupBlock;
pub use data_list_block::{DataListBlock, HeaderListBlock};
pub use dz_block::{DzBlock, DzCompressionType};
pub use header_block::HeaderBlock;
pub use identification_block::IdentificationBlock;
pub use metadata_block::MetadataBlock;
pub use text_block::TextBlock;
