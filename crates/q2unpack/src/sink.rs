//! Destinations for unpacked assets

use std::{
    collections::{hash_map::Entry, BTreeMap, HashMap},
    fs::File,
    io::{self, BufWriter, Read, Write},
    path::{Component, Path, PathBuf},
};

use png::{BitDepth, ColorType};
use q2_image::RgbaImage;
use tracing::info;

/// Receives every asset produced by an unpack run
pub trait AssetSink {
    /// Store a converted image under `name`
    fn write_image(&mut self, name: &str, image: &RgbaImage) -> io::Result<()>;

    /// Store the bytes of `data` unchanged under `name`, returning how many were written
    fn write_raw(&mut self, name: &str, data: &mut dyn Read) -> io::Result<u64>;
}

/// Writes assets below a directory, images as PNG
///
/// Names are lowercased and images take a `.png` extension, so distinct entries such as
/// `pics/A.pcx` and `pics/a.wal` can land on the same file. Such a collision within one run is
/// an error naming both entries, even when `overwrite` allows replacing files left by an
/// earlier run.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
    overwrite: bool,
    /// Output paths written so far, with the entry each came from
    written: HashMap<PathBuf, String>,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>, overwrite: bool) -> Self {
        Self {
            root: root.into(),
            overwrite,
            written: HashMap::new(),
        }
    }

    /// Output path of an asset: lowercased, and kept below the root
    pub fn path_for(&self, name: &str) -> io::Result<PathBuf> {
        let lower = name.to_lowercase();
        let relative = Path::new(&lower);

        let inside = relative.components().count() > 0
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !inside {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("refusing to write {name} outside of the output directory"),
            ));
        }

        Ok(self.root.join(relative))
    }

    /// Record that `name` is written to `path`, failing if another entry already was
    fn claim(&mut self, path: &Path, name: &str) -> io::Result<()> {
        match self.written.entry(path.to_path_buf()) {
            Entry::Occupied(earlier) => Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!(
                    "{name} and {} both unpack to {}",
                    earlier.get(),
                    path.display()
                ),
            )),
            Entry::Vacant(slot) => {
                slot.insert(name.to_owned());
                Ok(())
            }
        }
    }

    fn create(&self, path: &Path) -> io::Result<File> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        if self.overwrite {
            File::create(path)
        } else {
            File::create_new(path)
        }
    }
}

impl AssetSink for DirectorySink {
    fn write_image(&mut self, name: &str, image: &RgbaImage) -> io::Result<()> {
        let path = self.path_for(name)?.with_extension("png");
        self.claim(&path, name)?;
        info!("writing {}", path.display());

        let mut encoded = Vec::new();
        let mut encoder = png::Encoder::new(&mut encoded, image.width(), image.height());
        encoder.set_color(ColorType::Rgba);
        encoder.set_depth(BitDepth::Eight);

        let mut writer = encoder.write_header().map_err(io::Error::other)?;
        writer
            .write_image_data(image.as_bytes())
            .map_err(io::Error::other)?;
        writer.finish().map_err(io::Error::other)?;

        self.create(&path)?.write_all(&encoded)
    }

    fn write_raw(&mut self, name: &str, data: &mut dyn Read) -> io::Result<u64> {
        let path = self.path_for(name)?;
        self.claim(&path, name)?;
        info!("writing {}", path.display());

        let mut out = BufWriter::new(self.create(&path)?);
        let written = io::copy(data, &mut out)?;
        out.flush()?;
        Ok(written)
    }
}

/// Keeps every asset in memory, keyed by the name it was written under
#[derive(Debug, Default)]
pub struct MemorySink {
    pub images: BTreeMap<String, RgbaImage>,
    pub raw: BTreeMap<String, Vec<u8>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AssetSink for MemorySink {
    fn write_image(&mut self, name: &str, image: &RgbaImage) -> io::Result<()> {
        self.images.insert(name.to_owned(), image.clone());
        Ok(())
    }

    fn write_raw(&mut self, name: &str, data: &mut dyn Read) -> io::Result<u64> {
        let mut buffer = Vec::new();
        let written = data.read_to_end(&mut buffer)?;
        self.raw.insert(name.to_owned(), buffer);
        Ok(written as u64)
    }
}
