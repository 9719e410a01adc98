//! Base types for structure of PAK file.

use binrw::{BinRead, BinWrite};

/// Size in bytes of [`PakHeader`] on disk
pub const HEADER_SIZE: u64 = 12;

/// Size in bytes of a [`PakRecord`] on disk
pub const RECORD_SIZE: usize = 64;

/// Size of the fixed name field of a [`PakRecord`]
pub const RECORD_NAME_SIZE: usize = 56;

/// Upper bound on the number of records in a single PAK directory
pub const MAX_FILES_IN_PACK: usize = 4096;

/// PAK file header
///
/// Defines the header of the PAK file which always starts with "PACK".
/// All data is stored in little endian format
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
#[brw(magic = b"PACK", little)]
pub struct PakHeader {
    /// The offset from the beginning of the file where the directory starts
    pub dir_offset: i32,

    /// The size of the directory in bytes
    pub dir_length: i32,
}

impl PakHeader {
    /// Number of records described by the directory length.
    pub fn record_count(&self) -> usize {
        usize::try_from(self.dir_length).unwrap_or(0) / RECORD_SIZE
    }
}

/// PAK directory record
///
/// Defines an entry in the PAK file
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct PakRecord {
    /// NUL padded name, not terminated when all bytes are used
    pub name: [u8; RECORD_NAME_SIZE],

    /// The offset to the data for this record from the start of the file
    pub file_offset: i32,

    /// The size of this record's data
    pub file_length: i32,
}

impl Default for PakRecord {
    fn default() -> Self {
        Self {
            name: [0; RECORD_NAME_SIZE],
            file_offset: Default::default(),
            file_length: Default::default(),
        }
    }
}

impl PakRecord {
    /// Build a record, truncating `name` to the fixed field size.
    pub fn new(name: &str, file_offset: i32, file_length: i32) -> Self {
        let mut field = [0; RECORD_NAME_SIZE];
        let bytes = name.as_bytes();
        let len = bytes.len().min(RECORD_NAME_SIZE);
        field[..len].copy_from_slice(&bytes[..len]);

        Self {
            name: field,
            file_offset,
            file_length,
        }
    }

    /// The stored name up to the first NUL, or all of it if there is none.
    pub fn name_raw(&self) -> &[u8] {
        let end = self
            .name
            .iter()
            .position(|&b| b == b'\0')
            .unwrap_or(RECORD_NAME_SIZE);
        &self.name[..end]
    }
}
