//! This library handles reading **PAK** archives used by *Quake II* and merging them with loose
//! files into a single asset namespace.
//!
//! # PAK Archive Format Documentation
//!
//! A PAK file bundles many named files into a single container with a flat directory.
//! PAK files are typically identified with the `.pak` extension.
//!
//! ## File Structure
//!
//! A PAK file consists of a header, followed by the data blocks and a directory of records.
//! The directory is usually at the end of the file, but its position is given by the header.
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: 0x4B434150 ("PACK")                               |
//! | 0x0004         | Directory Offset       | 4 bytes: Offset to the directory from the start of file    |
//! | 0x0008         | Directory Length       | 4 bytes: Size of the directory in bytes                    |
//!
//! ### Directory
//!
//! The directory is an array of fixed size records. The number of records is the directory
//! length divided by the record size (64 bytes) and must lie in `1..=4096`.
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Name                   | 56 bytes: Path of the file, NUL padded                  |
//! | 0x0038         | File Offset            | 4 bytes: Offset of the data from the start of the file  |
//! | 0x003C         | File Length            | 4 bytes: Size of the data in bytes                      |
//!
//! - **Name**: A `/` separated path. The name is NUL padded but is not guaranteed to be NUL
//!   terminated when it fills all 56 bytes.
//! - **File Offset**: Absolute offset of the file's data within the container.
//! - **File Length**: Size of the file's data. Data is never compressed.
//!
//! ## Asset Catalog
//!
//! [`AssetCatalog`] merges loose files found in a directory tree with the contents of every
//! PAK found along the way. When the same name is registered more than once, the entry
//! registered first wins.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.pak`
//! - **Endianness**: Little-endian for all multi-byte integers
//!

pub mod catalog;
pub mod error;
pub mod read;
pub mod source;
pub mod types;

pub use catalog::{AssetCatalog, CatalogEntry, CatalogOptions, EntryKind};
pub use read::PakArchive;
pub use source::{ByteRange, Container};
