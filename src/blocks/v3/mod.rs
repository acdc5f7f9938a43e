//! MDF 3.x blocks.
//!
//! 3.x blocks start with a 2-character id and a u16 block size; links are
//! u32 file positions at fixed offsets. All offsets below are relative to the
//! block start, matching the [`RawBlock`](crate::parsing::RawBlock) payload.

mod channel;
mod channel_group;
mod conversion;
mod data_group;
mod header;
mod text;

pub use channel::{ChannelBlock, V3DataType};
pub use channel_group::ChannelGroupBlock;
pub use conversion::{ConversionBlock, ConversionParams, TextRangeEntry};
pub use data_group::DataGroupBlock;
pub use header::HeaderBlock;
pub use text::TextBlock;
