#![forbid(unsafe_code)]

//! # mdf-ods
//!
//! Exposes ASAM MDF 3.x and 4.x measurement files through an ODS-style data
//! model: an application schema anchored to a fixed base vocabulary, typed
//! instances connected by cardinality-checked relations, and channel values
//! that stay in the source file, addressed through external component
//! descriptors and decoded on demand.
//!
//! ## Importing and decoding
//!
//! ```no_run
//! use mdf_ods::{ImportOptions, ModelQuery, Result, Session};
//!
//! fn main() -> Result<()> {
//!     let session = Session::open("recording.mf4", ImportOptions::default())?;
//!     let model = session.model();
//!
//!     let columns = model.element_by_name("LocalColumn")?;
//!     for column in model.find_instances(columns, "Engine*")? {
//!         let values = session.decode_column(column)?;
//!         println!("{}: {} rows", model.instance(column)?.name, values.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Records that cannot be addressed in place (compressed blocks, unsorted
//! data groups, data lists split inside records) are copied once into an
//! append-only binary store next to the source file, see
//! [`ImportOptions::store_dir`].
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`parsing`] | Block graph walk of MDF files, byte sources and the primitive decoder |
//! | [`blocks`] | Typed MDF 4.x blocks, 3.x blocks in [`blocks::v3`] |
//! | [`model`] | Base vocabulary, application schema and instance graph |
//! | [`conversion`] | Raw to physical value rules |
//! | [`external`] | Decoding columns from external component descriptors |
//! | [`import`] | Writing a parsed file into the model |
//! | [`store`] | Append-only binary store for relocated records |
//! | [`session`] | A model plus the files imported into it |
//! | [`error`] | Error types and [`Result`] alias |
//!
//! ## Features
//!
//! - `compression` (default): inflate `##DZ` blocks through `miniz_oxide`.
//! - `parallel`: decode the columns of a submatrix on the `rayon` pool.
//!
//! The crate logs through the `log` facade and installs no logger.

pub mod blocks;
pub mod conversion;
pub mod error;
pub mod external;
pub mod import;
pub mod model;
pub mod options;
pub mod parsing;
pub mod session;
pub mod store;
pub mod types;

pub use conversion::ConversionRule;
pub use error::{Error, ErrorKind, Result};
pub use external::ColumnValues;
pub use model::{Model, ModelQuery};
pub use options::{AbortHandle, ImportOptions, UnsortedPolicy};
pub use parsing::ParseStatus;
pub use parsing::reader::{BufferedRangeReader, ByteRangeReader, FileRangeReader, MemoryRangeReader};
pub use session::Session;
pub use types::{ByteOrder, RawValue, StringEncoding};
