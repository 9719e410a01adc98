//! Byte sources backing catalog entries.

use std::{
    fmt,
    fs::File,
    io::{self, Cursor, Read, Seek},
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::instrument;

use crate::error::Result;

/// Storage holding the bytes of one or more catalog entries
#[derive(Clone)]
pub enum Container {
    /// A loose file on disk, opened each time it is read
    Path(Arc<Path>),

    /// An open file handle shared by every record of an archive
    File(Arc<File>),

    /// Bytes held in memory
    Memory(Arc<[u8]>),
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Container::Path(p) => write!(f, "Path({})", p.display()),
            Container::File(file) => write!(f, "File({file:?})"),
            Container::Memory(data) => write!(f, "Memory({} bytes)", data.len()),
        }
    }
}

impl From<PathBuf> for Container {
    fn from(value: PathBuf) -> Self {
        Container::Path(value.into())
    }
}

impl From<File> for Container {
    fn from(value: File) -> Self {
        Container::File(Arc::new(value))
    }
}

impl From<Vec<u8>> for Container {
    fn from(value: Vec<u8>) -> Self {
        Container::Memory(value.into())
    }
}

impl Container {
    /// Total size of the container in bytes
    pub fn len(&self) -> Result<u64> {
        Ok(match self {
            Container::Path(p) => std::fs::metadata(p)?.len(),
            Container::File(f) => f.metadata()?.len(),
            Container::Memory(data) => data.len() as u64,
        })
    }

    /// Whether the container holds no bytes
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Get a seekable reader positioned at the start of the container
    pub fn reader(&self) -> Result<ContainerReader<'_>> {
        Ok(match self {
            Container::Path(p) => ContainerReader::Owned(File::open(p)?),
            Container::File(f) => ContainerReader::Shared {
                file: f,
                position: 0,
            },
            Container::Memory(data) => ContainerReader::Memory(Cursor::new(&data[..])),
        })
    }
}

/// Reader over the bytes of a [`Container`]
pub enum ContainerReader<'a> {
    Owned(File),
    /// A handle other readers may move; `position` is where this reader left off
    Shared { file: &'a File, position: u64 },
    Memory(Cursor<&'a [u8]>),
}

/// Move a shared handle back to where this reader left off
fn resume(file: &File, position: u64) -> io::Result<&File> {
    let mut handle = file;
    handle.seek(io::SeekFrom::Start(position))?;
    Ok(handle)
}

impl Seek for ContainerReader<'_> {
    #[instrument(level = "trace", skip(self), err)]
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        match self {
            ContainerReader::Owned(r) => r.seek(pos),
            ContainerReader::Shared { file, position } => {
                *position = resume(file, *position)?.seek(pos)?;
                Ok(*position)
            }
            ContainerReader::Memory(r) => r.seek(pos),
        }
    }
}

impl Read for ContainerReader<'_> {
    #[instrument(level = "trace", skip_all, err)]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            ContainerReader::Owned(r) => r.read(buf),
            ContainerReader::Shared { file, position } => {
                let read = resume(file, *position)?.read(buf)?;
                *position += read as u64;
                Ok(read)
            }
            ContainerReader::Memory(r) => r.read(buf),
        }
    }

    #[instrument(level = "trace", skip_all, err)]
    fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        match self {
            ContainerReader::Owned(r) => r.read_exact(buf),
            ContainerReader::Shared { file, position } => {
                resume(file, *position)?.read_exact(buf)?;
                *position += buf.len() as u64;
                Ok(())
            }
            ContainerReader::Memory(r) => r.read_exact(buf),
        }
    }
}

/// A span of bytes inside a [`Container`]
#[derive(Debug, Clone)]
pub struct ByteRange {
    /// Where the bytes live
    pub container: Container,

    /// Absolute offset of the first byte within the container
    pub offset: u64,

    /// Number of bytes in the range
    pub length: u64,
}

impl ByteRange {
    pub fn new(container: Container, offset: u64, length: u64) -> Self {
        Self {
            container,
            offset,
            length,
        }
    }

    /// Get a reader limited to this range
    #[instrument(level = "trace", skip(self), fields(offset = self.offset, length = self.length))]
    pub fn open(&self) -> Result<io::Take<ContainerReader<'_>>> {
        let mut reader = self.container.reader()?;
        reader.seek(io::SeekFrom::Start(self.offset))?;
        Ok(reader.take(self.length))
    }

    /// Read the whole range into memory
    pub fn read_all(&self) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; self.length as usize];
        self.open()?.read_exact(&mut buffer)?;
        Ok(buffer)
    }
}
