//! Merging loose files and PAK archives into one namespace
//!

use std::{
    fs::File,
    io,
    path::{Component, Path},
};

use bon::Builder;
use indexmap::{map::Entry, IndexMap};
use tracing::{debug, info, instrument};
use walkdir::WalkDir;

use crate::{
    error::{Error, FileNotFoundError, Result},
    read::PakArchive,
    source::{ByteRange, Container, ContainerReader},
};

/// Longest name accepted into a catalog, in bytes
pub const MAX_NAME_LENGTH: usize = 256;

/// Where a catalog entry came from
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntryKind {
    /// A plain file found while walking the directory tree
    Loose,

    /// A record of a PAK archive
    Archived,
}

/// Options for how a directory tree is turned into a catalog
#[derive(Debug, Clone, Builder)]
pub struct CatalogOptions {
    /// File name suffix identifying PAK archives
    #[builder(default = ".pak".to_owned())]
    pub archive_suffix: String,

    /// File name suffixes that are skipped entirely
    #[builder(default = vec![".dylib".to_owned(), ".so".to_owned(), ".dll".to_owned()])]
    pub ignored_suffixes: Vec<String>,

    /// Skip files and directories whose name starts with a dot
    #[builder(default = true)]
    pub skip_hidden: bool,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl CatalogOptions {
    fn is_archive(&self, file_name: &str) -> bool {
        file_name.len() > self.archive_suffix.len() && file_name.ends_with(&self.archive_suffix)
    }

    fn is_ignored(&self, file_name: &str) -> bool {
        self.ignored_suffixes
            .iter()
            .any(|suffix| file_name.ends_with(suffix.as_str()))
    }
}

/// A named span of bytes registered in an [`AssetCatalog`]
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    /// `/` separated, case sensitive name
    pub name: Box<str>,
    /// Location of the entry's bytes
    pub source: ByteRange,
    pub kind: EntryKind,
}

impl CatalogEntry {
    pub fn new(name: impl Into<Box<str>>, source: ByteRange, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            source,
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size of the entry in bytes
    pub fn len(&self) -> u64 {
        self.source.length
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get a reader over the entry's bytes
    pub fn open(&self) -> Result<io::Take<ContainerReader<'_>>> {
        self.source.open()
    }

    /// Read the entry's bytes into memory
    pub fn read_all(&self) -> Result<Vec<u8>> {
        self.source.read_all()
    }
}

/// Flat namespace of every asset in a data tree
///
/// Names registered first take precedence: inserting a name that is already present
/// leaves the existing entry in place and discards the new one.
///
/// ```no_run
/// use q2_pak::{AssetCatalog, CatalogOptions};
///
/// fn print_palette_size() -> q2_pak::error::Result<()> {
///     let catalog = AssetCatalog::from_directory("baseq2", &CatalogOptions::default())?;
///     let entry = catalog.find_entry("pics/colormap.pcx")?;
///     println!("{} is {} bytes", entry.name(), entry.len());
///     Ok(())
/// }
/// ```
#[derive(Debug, Default)]
pub struct AssetCatalog {
    entries: IndexMap<Box<str>, CatalogEntry>,
}

impl AssetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk `root` and register every loose file and every record of every archive found.
    ///
    /// Directory contents are visited in the order the filesystem returns them.
    #[instrument(skip_all, fields(root = %root.as_ref().display()))]
    pub fn from_directory(root: impl AsRef<Path>, options: &CatalogOptions) -> Result<Self> {
        let root = root.as_ref();
        let mut catalog = Self::new();
        let skip_hidden = options.skip_hidden;

        let walker = WalkDir::new(root).min_depth(1).into_iter().filter_entry(|e| {
            !(skip_hidden && e.depth() > 0 && e.file_name().to_string_lossy().starts_with('.'))
        });

        for entry in walker {
            let entry = entry.map_err(io::Error::from)?;
            let file_type = entry.file_type();
            if file_type.is_dir() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy();
            if !file_type.is_file() {
                debug!("skipping {}", entry.path().display());
            } else if options.is_archive(&file_name) {
                let container = Container::from(File::open(entry.path())?);
                let count = catalog.add_archive(container).map_err(|e| Error::Archive {
                    path: entry.path().to_path_buf(),
                    source: Box::new(e),
                })?;
                info!("added pak file {} ({} files)", entry.path().display(), count);
            } else if options.is_ignored(&file_name) {
                debug!("ignoring {}", entry.path().display());
            } else {
                let name = relative_name(root, entry.path())?;
                catalog.add_loose(name, entry.path())?;
            }
        }

        Ok(catalog)
    }

    /// Register an entry unless its name is already taken.
    ///
    /// Returns whether the entry was inserted.
    pub fn insert(&mut self, entry: CatalogEntry) -> Result<bool> {
        validate_name(&entry.name)?;

        match self.entries.entry(entry.name.clone()) {
            Entry::Occupied(existing) => {
                debug!(
                    "{} already registered as {:?}, discarding {:?}",
                    existing.key(),
                    existing.get().kind,
                    entry.kind
                );
                Ok(false)
            }
            Entry::Vacant(slot) => {
                slot.insert(entry);
                Ok(true)
            }
        }
    }

    /// Register a file on disk under `name`.
    pub fn add_loose(&mut self, name: impl Into<Box<str>>, path: impl AsRef<Path>) -> Result<bool> {
        let container = Container::from(path.as_ref().to_path_buf());
        let length = container.len()?;

        self.insert(CatalogEntry::new(
            name,
            ByteRange::new(container, 0, length),
            EntryKind::Loose,
        ))
    }

    /// Register every record of the PAK archive held by `container`.
    ///
    /// Returns the number of records in the archive's directory.
    pub fn add_archive(&mut self, container: Container) -> Result<usize> {
        let files = PakArchive::new(container.reader()?)?.files().to_vec();

        for file in &files {
            self.insert(CatalogEntry::new(
                file.file_name.clone(),
                ByteRange::new(container.clone(), file.data_start, file.size),
                EntryKind::Archived,
            ))?;
        }

        Ok(files.len())
    }

    /// Look up an entry by its exact name.
    pub fn find_entry(&self, name: &str) -> Result<&CatalogEntry> {
        self.entries
            .get(name)
            .ok_or_else(|| Error::FileNotFound(FileNotFoundError::Name(name.to_owned())))
    }

    /// Look up an entry by its exact name, if present.
    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.get(name)
    }

    /// Number of distinct names in the catalog
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries in the order their names were first registered
    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_ref())
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > MAX_NAME_LENGTH {
        return Err(Error::InvalidName(name.to_owned()));
    }
    Ok(())
}

fn relative_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .map_err(|e| Error::CustomError(format!("{}: {}", path.display(), e)))?;

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(
                part.to_str()
                    .ok_or_else(|| Error::InvalidName(part.to_string_lossy().into_owned()))?,
            ),
            _ => return Err(Error::InvalidName(relative.to_string_lossy().into_owned())),
        }
    }

    Ok(parts.join("/"))
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use crate::{
        catalog::{relative_name, AssetCatalog, CatalogEntry, CatalogOptions, EntryKind},
        error::{Error, Result},
        source::{ByteRange, Container},
    };

    fn memory_entry(name: &str, data: &[u8], kind: EntryKind) -> CatalogEntry {
        let container = Container::from(data.to_vec());
        CatalogEntry::new(name, ByteRange::new(container, 0, data.len() as u64), kind)
    }

    #[test]
    fn first_registration_wins() -> Result<()> {
        let mut catalog = AssetCatalog::new();

        assert!(catalog.insert(memory_entry("pics/a.pcx", b"loose", EntryKind::Loose))?);
        assert!(!catalog.insert(memory_entry("pics/a.pcx", b"packed", EntryKind::Archived))?);

        let entry = catalog.find_entry("pics/a.pcx")?;
        assert_eq!(entry.kind, EntryKind::Loose);
        assert_eq!(entry.read_all()?, b"loose");
        assert_eq!(catalog.len(), 1);

        Ok(())
    }

    #[test]
    fn lookup_is_case_sensitive() -> Result<()> {
        let mut catalog = AssetCatalog::new();
        catalog.insert(memory_entry("pics/A.pcx", b"x", EntryKind::Loose))?;

        assert!(catalog.get("pics/A.pcx").is_some());
        assert!(matches!(
            catalog.find_entry("pics/a.pcx"),
            Err(Error::FileNotFound(_))
        ));

        Ok(())
    }

    #[test]
    fn rejects_invalid_names() {
        let mut catalog = AssetCatalog::new();

        let empty = catalog.insert(memory_entry("", b"x", EntryKind::Loose));
        assert!(matches!(empty, Err(Error::InvalidName(_))));

        let long = "a".repeat(257);
        let long = catalog.insert(memory_entry(&long, b"x", EntryKind::Loose));
        assert!(matches!(long, Err(Error::InvalidName(_))));
    }

    #[test]
    fn iterates_in_registration_order() -> Result<()> {
        let mut catalog = AssetCatalog::new();
        for name in ["b", "a", "c", "a"] {
            catalog.insert(memory_entry(name, name.as_bytes(), EntryKind::Loose))?;
        }

        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["b", "a", "c"]);

        Ok(())
    }

    #[test]
    fn default_options() {
        let options = CatalogOptions::default();

        assert!(options.is_archive("pak0.pak"));
        assert!(!options.is_archive(".pak"));
        assert!(!options.is_archive("pak0.pak.bak"));
        assert!(options.is_ignored("gamex86.dylib"));
        assert!(options.is_ignored("game.so"));
        assert!(!options.is_ignored("pics/colormap.pcx"));
        assert!(options.skip_hidden);
    }

    #[test]
    fn relative_names_use_forward_slashes() -> Result<()> {
        let root = Path::new("baseq2");
        let path = root.join("models").join("x").join("skin.pcx");

        assert_eq!(relative_name(root, &path)?, "models/x/skin.pcx");

        Ok(())
    }
}
