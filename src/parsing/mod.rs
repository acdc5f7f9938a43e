//! Walking the block graph of MDF 3.x and 4.x files.
//!
//! [`MdfFile::parse`] reads the identification block, picks the major
//! version and follows Header → DataGroup → ChannelGroup → Channel →
//! Conversion links through a [`BlockReader`]. The result is version-neutral:
//! channels carry a [`ChannelLayout`] and a resolved
//! [`ConversionRule`](crate::ConversionRule), data groups carry the
//! [`DataFragment`]s of their record stream.

mod block_reader;
pub(crate) mod conversion;
pub mod decoder;
mod mdf_file;
pub mod metadata;
mod raw_channel;
mod raw_channel_group;
mod raw_data_group;
pub mod reader;

pub use block_reader::{BlockReader, MajorVersion, RawBlock};
pub use mdf_file::{FileHeader, MdfFile, ParseStatus};
pub use raw_channel::{
    ChannelLayout, ChannelRole, ChannelValidity, InvalidationBit, RawChannel, TextEncoding,
    ValueKind,
};
pub use raw_channel_group::RawChannelGroup;
pub use raw_data_group::{DataFragment, RawDataGroup, discover_v4, read_fragments};
