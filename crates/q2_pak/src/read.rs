//! Types for reading PAK archives
//!

use binrw::BinRead;
use indexmap::IndexMap;
use std::{
    fmt::{self, Debug},
    io::{self, Read, Seek},
};
use tracing::debug;

use crate::{
    error::{Error, FileNotFoundError, Result},
    types::{PakHeader, PakRecord, MAX_FILES_IN_PACK},
};

/// A struct for reading an entry from a PAK file
pub struct PakFile<'a, R: Read + Seek> {
    data: &'a PakFileData,
    reader: io::Take<&'a mut R>,
}

impl<'a, R: Read + Seek> Debug for PakFile<'a, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PakFile({:#?})", self.data)
    }
}

/// Methods for retrieving information on PAK file entries
impl<'a, R: Read + Seek> PakFile<'a, R> {
    /// Get the name of the file
    ///
    /// # Warnings
    ///
    /// It is dangerous to use this name directly when extracting an archive.
    /// It may contain an absolute path (`/etc/shadow`), or break out of the
    /// current directory (`../runtime`). Carelessly writing to these paths
    /// allows an attacker to craft a PAK archive that will overwrite critical
    /// files.
    ///
    pub fn name(&self) -> &str {
        &self.data.file_name
    }

    /// Get the name of the file, in the raw (internal) byte representation.
    pub fn name_raw(&self) -> &[u8] {
        &self.data.file_name_raw
    }

    /// Get the size of the file, in bytes
    pub fn size(&self) -> u64 {
        self.data.size
    }

    /// Get the starting offset of the data of the file
    pub fn data_start(&self) -> u64 {
        self.data.data_start
    }
}

impl<R: Read + Seek> Read for PakFile<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }
}

/// Structure representing a PAK file entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PakFileData {
    /// Name of the file
    pub file_name: Box<str>,
    /// Raw file name. To be used when file_name was incorrectly decoded.
    pub file_name_raw: Box<[u8]>,
    /// Specifies where the data of the file starts
    pub data_start: u64,
    /// Size of the file in bytes
    pub size: u64,
}

/// PAK archive reader
///
/// ```no_run
/// use std::io::prelude::*;
///
/// fn list_pak_contents(reader: impl Read + Seek) -> q2_pak::error::Result<()> {
///     let mut pak = q2_pak::PakArchive::new(reader)?;
///
///     for i in 0..pak.len() {
///         let mut file = pak.by_index(i)?;
///         println!("Filename: {}", file.name());
///         std::io::copy(&mut file, &mut std::io::stdout())?;
///     }
///
///     Ok(())
/// }
/// ```
pub struct PakArchive<R> {
    reader: R,
    header: PakHeader,
    files: Vec<PakFileData>,
    names: IndexMap<Box<str>, usize>,
}

impl<R> PakArchive<R> {
    /// Total size of the files in the archive.
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    /// Every record of the directory, in stored order
    pub fn files(&self) -> &[PakFileData] {
        &self.files
    }

    /// Returns the header read from the archive
    pub fn header(&self) -> &PakHeader {
        &self.header
    }
}

impl<R: Read + Seek> PakArchive<R> {
    /// Read a PAK archive collecting the files it contains.
    pub fn new(mut reader: R) -> Result<PakArchive<R>> {
        let header = match PakHeader::read(&mut reader) {
            Ok(header) => header,
            Err(binrw::Error::BadMagic { .. }) => return Err(Error::InvalidArchive),
            Err(e) => return Err(e.into()),
        };

        let count = header.record_count();
        if count == 0 || count > MAX_FILES_IN_PACK {
            return Err(Error::InvalidFileCount(count));
        }

        let container_len = reader.seek(io::SeekFrom::End(0))?;
        let records = Self::get_records(&mut reader, &header, count)?;

        let mut files = Vec::with_capacity(count);
        let mut names = IndexMap::with_capacity(count);
        for record in records {
            let file = Self::get_file_data(&record, container_len)?;
            if names.contains_key(&file.file_name) {
                debug!("pak lists {} more than once", file.file_name);
            } else {
                names.insert(file.file_name.clone(), files.len());
            }
            files.push(file);
        }

        Ok(PakArchive {
            reader,
            header,
            files,
            names,
        })
    }

    /// Number of entries contained in this PAK.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether this PAK archive contains no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over all the file names in this archive.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.file_name.as_ref())
    }

    /// Get the index of the first file entry with this name, if it's present.
    #[inline(always)]
    pub fn index_for_name(&self, name: &str) -> Option<usize> {
        self.names.get(name).copied()
    }

    /// Get the name of a file entry, if it's present.
    #[inline(always)]
    pub fn name_for_index(&self, index: usize) -> Option<&str> {
        self.files.get(index).map(|f| f.file_name.as_ref())
    }

    /// Search for a file entry by name
    pub fn by_name(&mut self, name: &str) -> Result<PakFile<'_, R>> {
        let Some(index) = self.index_for_name(name) else {
            return Err(Error::FileNotFound(FileNotFoundError::Name(
                name.to_owned(),
            )));
        };
        self.by_index(index)
    }

    /// Get a contained file by index
    pub fn by_index(&mut self, file_number: usize) -> Result<PakFile<'_, R>> {
        let data = self
            .files
            .get(file_number)
            .ok_or(Error::FileNotFound(FileNotFoundError::Index(file_number)))?;

        self.reader.seek(io::SeekFrom::Start(data.data_start))?;

        Ok(PakFile {
            data,
            reader: self.reader.by_ref().take(data.size),
        })
    }

    /// Unwrap and return the inner reader object
    ///
    /// The position of the reader is undefined.
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn get_records(reader: &mut R, header: &PakHeader, count: usize) -> Result<Vec<PakRecord>> {
        let dir_offset = u64::try_from(header.dir_offset).map_err(|_| Error::InvalidArchive)?;
        reader.seek(io::SeekFrom::Start(dir_offset))?;

        (0..count)
            .map(|_| PakRecord::read(reader).map_err(Error::from))
            .collect()
    }

    fn get_file_data(record: &PakRecord, container_len: u64) -> Result<PakFileData> {
        let name_raw = record.name_raw();
        let file_name: Box<str> = String::from_utf8_lossy(name_raw).into();

        let invalid = |reason: String| Error::InvalidRecord {
            name: file_name.to_string(),
            reason,
        };

        let data_start = u64::try_from(record.file_offset)
            .map_err(|_| invalid(format!("negative offset {}", record.file_offset)))?;
        let size = u64::try_from(record.file_length)
            .map_err(|_| invalid(format!("negative length {}", record.file_length)))?;

        if data_start + size > container_len {
            return Err(invalid(format!(
                "range {}..{} exceeds archive size {}",
                data_start,
                data_start + size,
                container_len
            )));
        }

        Ok(PakFileData {
            file_name,
            file_name_raw: name_raw.into(),
            data_start,
            size,
        })
    }
}

#[cfg(test)]
mod test {
    use std::io::prelude::*;

    use pretty_assertions::assert_eq;

    use crate::{
        error::{Error, Result},
        read::PakArchive,
    };
    use std::io::Cursor;

    /// Header, 11 bytes of data, then a directory with a single record
    fn single_entry_pak() -> Vec<u8> {
        let mut input = vec![
            // Header (12)
            0x50, 0x41, 0x43, 0x4B, 0x17, 0x00, 0x00, 0x00, 0x40, 0x00, 0x00, 0x00,
            // Data (11)
            0x48, 0x65, 0x6C, 0x6C, 0x6F, 0x20, 0x57, 0x6F, 0x72, 0x6C, 0x64,
        ];
        // Directory (64)
        let mut name = b"hello.txt".to_vec();
        name.resize(56, 0);
        input.extend_from_slice(&name);
        input.extend_from_slice(&[0x0C, 0x00, 0x00, 0x00, 0x0B, 0x00, 0x00, 0x00]);
        input
    }

    #[test]
    fn read_invalid_magic() {
        #[rustfmt::skip]
        let input = [
            0x49, 0x42, 0x53, 0x50,
            0x0C, 0x00, 0x00, 0x00,
            0x40, 0x00, 0x00, 0x00,
        ];

        let archive = PakArchive::new(Cursor::new(input));
        assert!(matches!(archive, Err(Error::InvalidArchive)));
    }

    #[test]
    fn read_empty_directory() {
        #[rustfmt::skip]
        let input = [
            0x50, 0x41, 0x43, 0x4B,
            0x0C, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
        ];

        let archive = PakArchive::new(Cursor::new(input));
        assert!(matches!(archive, Err(Error::InvalidFileCount(0))));
    }

    #[test]
    fn read_oversized_directory() {
        // 4097 records worth of directory
        #[rustfmt::skip]
        let input = [
            0x50, 0x41, 0x43, 0x4B,
            0x0C, 0x00, 0x00, 0x00,
            0x40, 0x00, 0x04, 0x00,
        ];

        let archive = PakArchive::new(Cursor::new(input));
        assert!(matches!(archive, Err(Error::InvalidFileCount(4097))));
    }

    #[test]
    fn read_negative_directory_offset() {
        #[rustfmt::skip]
        let input = [
            0x50, 0x41, 0x43, 0x4B,
            0xF0, 0xFF, 0xFF, 0xFF,
            0x40, 0x00, 0x00, 0x00,
        ];

        let archive = PakArchive::new(Cursor::new(input));
        assert!(matches!(archive, Err(Error::InvalidArchive)));
    }

    #[test]
    fn read_truncated_directory() {
        let mut input = single_entry_pak();
        input.truncate(40);

        let archive = PakArchive::new(Cursor::new(input));
        assert!(matches!(archive, Err(Error::BinRWError(_))));
    }

    #[test]
    fn read_record_out_of_bounds() {
        let mut input = single_entry_pak();
        // file length 0xFF runs past the end of the archive
        let len_at = input.len() - 4;
        input[len_at] = 0xFF;

        let archive = PakArchive::new(Cursor::new(input));
        assert!(matches!(archive, Err(Error::InvalidRecord { .. })));
    }

    #[test]
    fn read_pak_with_entry() -> Result<()> {
        let mut archive = PakArchive::new(Cursor::new(single_entry_pak()))?;
        assert_eq!(archive.len(), 1);
        assert_eq!(archive.total_size(), 11);

        let mut buffer = Vec::new();

        let mut file = archive.by_index(0)?;
        assert_eq!(file.data_start(), 12);
        assert_eq!(file.name(), "hello.txt");

        file.read_to_end(&mut buffer)?;
        assert_eq!(
            buffer,
            vec![0x48, 0x65, 0x6C, 0x6C, 0x6F, 0x20, 0x57, 0x6F, 0x72, 0x6C, 0x64]
        );

        Ok(())
    }

    #[test]
    fn read_by_name() -> Result<()> {
        let mut archive = PakArchive::new(Cursor::new(single_entry_pak()))?;

        assert_eq!(archive.index_for_name("hello.txt"), Some(0));
        assert_eq!(archive.name_for_index(0), Some("hello.txt"));
        assert_eq!(archive.by_name("hello.txt")?.size(), 11);
        assert!(matches!(
            archive.by_name("world.txt"),
            Err(Error::FileNotFound(_))
        ));

        Ok(())
    }
}
