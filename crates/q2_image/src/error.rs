//! Error types that can be emitted from this library
//!

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

    /// Invalid pcx file
    #[error("invalid pcx file: {0}")]
    InvalidPcx(String),

    /// Invalid wal file
    #[error("invalid wal file: {0}")]
    InvalidWal(String),

    /// Data ended early
    #[error("data is truncated: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    /// Pixel buffer does not match the image dimensions
    #[error("{len} pixels do not fill a {width}x{height} image")]
    InvalidDimensions { width: u32, height: u32, len: usize },
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
