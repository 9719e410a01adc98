//! Routing of catalog entries through the image decoders

use miette::{Context, IntoDiagnostic, Result};
use q2_image::{halo, pcx, wal, Palette, RgbaImage};
use q2_pak::{AssetCatalog, CatalogEntry};
use tracing::{debug, info, instrument};

use crate::sink::AssetSink;

/// Catalog entry holding the palette every image is colorized with
pub const PALETTE_SOURCE: &str = "pics/colormap.pcx";

/// Where the raw palette bytes are written
pub const PALETTE_OUTPUT: &str = "pics/colormap.bin";

const SKIN_PREFIXES: [&str; 2] = ["models/", "players/"];

/// How an entry is turned into output
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Conversion {
    /// Run-length PCX picture converted to an image
    Pcx,
    /// WAL texture converted to an image
    Wal,
    /// Bytes copied unchanged
    Copy,
}

impl Conversion {
    /// Pick a conversion from the extension of `name`, ignoring case
    pub fn for_name(name: &str) -> Self {
        let has_extension = |ext: &str| {
            name.len() > ext.len()
                && name
                    .get(name.len() - ext.len()..)
                    .is_some_and(|tail| tail.eq_ignore_ascii_case(ext))
        };

        if has_extension(".pcx") {
            Conversion::Pcx
        } else if has_extension(".wal") {
            Conversion::Wal
        } else {
            Conversion::Copy
        }
    }
}

/// Whether a PCX entry is a model skin and needs its background repaired
pub fn is_skin(name: &str) -> bool {
    SKIN_PREFIXES.iter().any(|prefix| {
        name.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}

/// Counts of what an unpack run produced
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct UnpackSummary {
    pub images: usize,
    pub copied: usize,
    pub repaired: usize,
}

/// Sends every entry of a catalog to a sink
pub struct Unpacker<'a> {
    catalog: &'a AssetCatalog,
    palette: Option<Palette>,
}

impl<'a> Unpacker<'a> {
    /// Unpacker that copies every entry unchanged
    pub fn raw(catalog: &'a AssetCatalog) -> Self {
        Self {
            catalog,
            palette: None,
        }
    }

    /// Unpacker that converts images with the palette from [`PALETTE_SOURCE`]
    pub fn converting(catalog: &'a AssetCatalog) -> Result<Self> {
        let data = catalog
            .find_entry(PALETTE_SOURCE)
            .and_then(|entry| entry.read_all())
            .context("loading palette")?;
        let palette = Palette::from_pcx(&data).context(PALETTE_SOURCE)?;

        Ok(Self {
            catalog,
            palette: Some(palette),
        })
    }

    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    /// Write every entry to `sink`, stopping at the first failure.
    pub fn run(&self, sink: &mut dyn AssetSink) -> Result<UnpackSummary> {
        let mut summary = UnpackSummary::default();

        let Some(palette) = &self.palette else {
            for entry in self.catalog.iter() {
                copy(entry, sink)?;
                summary.copied += 1;
            }
            return Ok(summary);
        };

        sink.write_raw(PALETTE_OUTPUT, &mut palette.rgb_bytes().as_slice())
            .into_diagnostic()
            .context(format!("writing {PALETTE_OUTPUT}"))?;

        for entry in self.catalog.iter() {
            if entry.name() == PALETTE_SOURCE {
                debug!("{} already written as {}", PALETTE_SOURCE, PALETTE_OUTPUT);
                continue;
            }

            match Conversion::for_name(entry.name()) {
                Conversion::Copy => {
                    copy(entry, sink)?;
                    summary.copied += 1;
                    continue;
                }
                Conversion::Pcx => {
                    let (image, repaired) = convert_pcx(entry, palette)?;
                    summary.repaired += usize::from(repaired);
                    write_image(entry, &image, sink)?;
                }
                Conversion::Wal => {
                    let image = convert_wal(entry, palette)?;
                    write_image(entry, &image, sink)?;
                }
            }
            summary.images += 1;
        }

        info!(
            "wrote {} images and copied {} files",
            summary.images, summary.copied
        );
        Ok(summary)
    }
}

/// Decode a PCX entry, repairing skin halos, and colorize it
#[instrument(skip_all, fields(name = entry.name()))]
pub fn convert_pcx(entry: &CatalogEntry, palette: &Palette) -> Result<(RgbaImage, bool)> {
    let data = entry.read_all().context(entry.name().to_owned())?;
    let mut image = pcx::decode(&data).context(entry.name().to_owned())?;

    let repaired = is_skin(entry.name()) && halo::repair(&mut image, palette);
    Ok((palette.colorize(&image), repaired))
}

/// Decode the base level of a WAL entry and colorize it
#[instrument(skip_all, fields(name = entry.name()))]
pub fn convert_wal(entry: &CatalogEntry, palette: &Palette) -> Result<RgbaImage> {
    let data = entry.read_all().context(entry.name().to_owned())?;
    let image = wal::decode(&data).context(entry.name().to_owned())?;

    Ok(palette.colorize(&image))
}

fn write_image(entry: &CatalogEntry, image: &RgbaImage, sink: &mut dyn AssetSink) -> Result<()> {
    sink.write_image(entry.name(), image)
        .into_diagnostic()
        .context(format!("writing {}", entry.name()))
}

fn copy(entry: &CatalogEntry, sink: &mut dyn AssetSink) -> Result<()> {
    let mut reader = entry.open().context(entry.name().to_owned())?;
    let written = sink
        .write_raw(entry.name(), &mut reader)
        .into_diagnostic()
        .context(format!("copying {}", entry.name()))?;

    if written != entry.len() {
        return Err(miette::miette!(
            "copied {} of {} bytes of {}",
            written,
            entry.len(),
            entry.name()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::pipeline::{is_skin, Conversion};

    #[test]
    fn conversion_from_extension() {
        assert_eq!(Conversion::for_name("pics/conback.pcx"), Conversion::Pcx);
        assert_eq!(Conversion::for_name("PICS/CONBACK.PCX"), Conversion::Pcx);
        assert_eq!(Conversion::for_name("textures/e1u1/floor.wal"), Conversion::Wal);
        assert_eq!(Conversion::for_name("env/sky.tga"), Conversion::Copy);
        assert_eq!(Conversion::for_name(".pcx"), Conversion::Copy);
        assert_eq!(Conversion::for_name("maps/base1.bsp"), Conversion::Copy);
    }

    #[test]
    fn skins_live_under_models_and_players() {
        assert!(is_skin("models/monsters/tank/skin.pcx"));
        assert!(is_skin("players/male/grunt.pcx"));
        assert!(is_skin("Players/female/athena.pcx"));
        assert!(!is_skin("pics/conback.pcx"));
        assert!(!is_skin("modelsx/a.pcx"));
    }
}
