//! Error and warning types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent warpper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// Transparent warpper for [`std::string::FromUtf8Error`]
    #[error(transparent)]
    Utf8Error(#[from] std::string::FromUtf8Error),

    /// A recoverable condition that the caller asked to treat as fatal
    #[error("strict mode: {0}")]
    #[diagnostic(help("load without strict mode to continue past this condition"))]
    Strict(Warning),
}

/// Recoverable conditions raised while reading an asset file.
///
/// None of these stop a parse on their own. They are logged as they are raised and collected
/// on the stream so the caller can decide what to do with them afterwards.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
#[diagnostic(severity(Warning))]
pub enum Warning {
    /// boolean byte is neither 0 nor 1
    #[error("boolean at offset {position:#x} is not 0 or 1 (got {value})")]
    NonCanonicalBoolean { value: u8, position: u64 },

    /// the header declares a format version this library was not written for
    #[error("unsupported format version (got {found}, expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// type trees are present but are not parsed
    #[error("type trees are enabled but unsupported")]
    TypeTreeEnabled,

    /// a char array did not hold valid utf-8 and was replaced by an empty string
    #[error("char array at offset {position:#x} is not valid utf-8")]
    BadCharArray { position: u64 },
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
