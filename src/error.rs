//! Error types for parsing, modelling and decoding.
//!
//! This module defines the [`Error`] enum which represents all possible failures
//! that can occur when walking an MDF file, building the data model, or decoding
//! external component values. [`Error::kind`] groups the variants into the coarse
//! [`ErrorKind`] categories callers usually branch on.
//!
//! # Example
//!
//! ```no_run
//! use mdf_ods::{Error, ErrorKind, ImportOptions, Session, Result};
//!
//! fn open(path: &str) -> Result<Option<Session>> {
//!     match Session::open(path, ImportOptions::default()) {
//!         Ok(session) => Ok(Some(session)),
//!         Err(e) if e.kind() == ErrorKind::UnsupportedVersion => {
//!             eprintln!("skipping {path}: {e}");
//!             Ok(None)
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! ```

use std::fmt;
use std::path::PathBuf;

/// Errors that can occur while parsing, modelling or decoding.
#[derive(Debug)]
pub enum Error {
    /// Buffer provided for parsing was too small.
    ///
    /// A short read of the source file; classified as [`ErrorKind::CorruptFile`].
    TooShortBuffer {
        /// Actual number of bytes available
        actual: usize,
        /// Minimum number of bytes required
        expected: usize,
        /// Source file where the error was detected
        file: &'static str,
        /// Line number where the error was detected
        line: u32,
    },

    /// A block identifier did not match the expected value.
    BlockIDError {
        /// The identifier that was found
        actual: String,
        /// The identifier that was expected
        expected: String,
        /// File position of the offending block
        position: u64,
    },

    /// Structural corruption: bad link, index out of range, malformed block.
    CorruptFile(String),

    /// The container version or a feature it uses is not supported.
    UnsupportedVersion(String),

    /// The file identifier is neither `"MDF     "` nor `"UnFinMF "`.
    FileIdentifierError(String),

    /// No application or base element with this name exists.
    UnknownElement(String),

    /// The element has no attribute with this name.
    UnknownAttribute {
        /// Application element name
        element: String,
        /// Requested attribute name
        attribute: String,
    },

    /// The element has no relation with this name.
    UnknownRelation {
        /// Application element name
        element: String,
        /// Requested relation name
        relation: String,
    },

    /// No instance with this id exists in the element.
    UnknownInstance {
        /// Application element name
        element: String,
        /// Requested instance id
        id: u64,
    },

    /// An element, attribute or relation with this name already exists.
    DuplicateName(String),

    /// A value does not match the declared attribute datatype.
    TypeMismatch {
        /// Attribute the value was assigned to
        attribute: String,
        /// Declared datatype (or enumeration)
        expected: String,
        /// Datatype of the supplied value
        found: String,
    },

    /// Creating the edge would exceed the declared relation cardinality.
    CardinalityExceeded {
        /// Relation name as seen from the side that overflowed
        relation: String,
        /// Declared maximum
        max: u32,
    },

    /// A file referenced by an external component does not exist.
    FileNotFound(PathBuf),

    /// The raw value type code cannot be decoded.
    UnsupportedDataType(String),

    /// Too few bytes or out-of-range parameters for a primitive decode.
    MalformedValue(String),

    /// A conversion chain exceeded the maximum allowed depth.
    ConversionChainTooDeep {
        /// The maximum depth that was exceeded
        max_depth: usize,
    },

    /// A cycle was detected in a conversion chain.
    ConversionChainCycle {
        /// The address where the cycle was detected
        address: u64,
    },

    /// The embedded base model could not be loaded.
    BaseModel(String),

    /// An I/O error occurred while reading or writing a file.
    IOError(std::io::Error),

    /// JSON (de)serialization of options or conversion rules failed.
    Json(serde_json::Error),
}

/// Coarse classification of [`Error`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad tag, truncated read, out-of-range link or index.
    CorruptFile,
    /// Unrecognized major version or unimplemented feature.
    UnsupportedVersion,
    /// Unknown element, attribute, relation or instance; duplicate names.
    UnknownAttribute,
    /// Value type does not match the attribute definition.
    TypeMismatch,
    /// Relation cardinality would be exceeded.
    CardinalityExceeded,
    /// Referenced external file is missing.
    FileNotFound,
    /// Raw value type cannot be decoded.
    UnsupportedDataType,
    /// Not enough bytes or invalid decode parameters.
    MalformedValue,
    /// Any other I/O or serialization failure.
    Io,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::TooShortBuffer { .. }
            | Error::BlockIDError { .. }
            | Error::CorruptFile(_)
            | Error::FileIdentifierError(_)
            | Error::ConversionChainTooDeep { .. }
            | Error::ConversionChainCycle { .. } => ErrorKind::CorruptFile,
            Error::UnsupportedVersion(_) | Error::BaseModel(_) => ErrorKind::UnsupportedVersion,
            Error::UnknownElement(_)
            | Error::UnknownAttribute { .. }
            | Error::UnknownRelation { .. }
            | Error::UnknownInstance { .. }
            | Error::DuplicateName(_) => ErrorKind::UnknownAttribute,
            Error::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Error::CardinalityExceeded { .. } => ErrorKind::CardinalityExceeded,
            Error::FileNotFound(_) => ErrorKind::FileNotFound,
            Error::UnsupportedDataType(_) => ErrorKind::UnsupportedDataType,
            Error::MalformedValue(_) => ErrorKind::MalformedValue,
            Error::IOError(_) | Error::Json(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        Error::CorruptFile(msg.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TooShortBuffer {
                actual,
                expected,
                file,
                line,
            } => write!(
                f,
                "Buffer too small at {file}:{line}: need at least {expected} bytes, got {actual}"
            ),
            Error::BlockIDError {
                actual,
                expected,
                position,
            } => write!(
                f,
                "Invalid block identifier at {position:#x}: Expected {expected:?}, got {actual:?}"
            ),
            Error::CorruptFile(s) => write!(f, "Corrupt file: {s}"),
            Error::UnsupportedVersion(s) => write!(f, "Unsupported version: {s}"),
            Error::FileIdentifierError(id) => write!(
                f,
                r#"Invalid file identifier: Expected "MDF     ", found {id:?}"#
            ),
            Error::UnknownElement(name) => write!(f, "Unknown element {name:?}"),
            Error::UnknownAttribute { element, attribute } => {
                write!(f, "Element {element:?} has no attribute {attribute:?}")
            }
            Error::UnknownRelation { element, relation } => {
                write!(f, "Element {element:?} has no relation {relation:?}")
            }
            Error::UnknownInstance { element, id } => {
                write!(f, "Element {element:?} has no instance with id {id}")
            }
            Error::DuplicateName(name) => write!(f, "Name {name:?} is already in use"),
            Error::TypeMismatch {
                attribute,
                expected,
                found,
            } => write!(
                f,
                "Type mismatch for {attribute:?}: expected {expected}, found {found}"
            ),
            Error::CardinalityExceeded { relation, max } => write!(
                f,
                "Relation {relation:?} allows at most {max} related instance(s)"
            ),
            Error::FileNotFound(path) => write!(f, "File not found: {}", path.display()),
            Error::UnsupportedDataType(s) => write!(f, "Unsupported data type: {s}"),
            Error::MalformedValue(s) => write!(f, "Malformed value: {s}"),
            Error::ConversionChainTooDeep { max_depth } => write!(
                f,
                "Conversion chain too deep: maximum depth of {max_depth} exceeded"
            ),
            Error::ConversionChainCycle { address } => write!(
                f,
                "Conversion chain cycle detected at block address {address:#x}"
            ),
            Error::BaseModel(s) => write!(f, "Base model error: {s}"),
            Error::IOError(e) => write!(f, "I/O error: {e}"),
            Error::Json(e) => write!(f, "JSON error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IOError(e) => Some(e),
            Error::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IOError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

/// A specialized Result type for this crate.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_buffer_is_corrupt_file() {
        let err = Error::TooShortBuffer {
            actual: 3,
            expected: 24,
            file: file!(),
            line: line!(),
        };
        assert_eq!(err.kind(), ErrorKind::CorruptFile);
        assert!(err.to_string().contains("need at least 24 bytes"));
    }

    #[test]
    fn io_error_keeps_source() {
        use std::error::Error as _;
        let err: Error = std::io::Error::other("boom").into();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.source().is_some());
    }
}
