//! Palette extraction and conversion of indexed pixels to RGBA

use binrw::BinRead;
use std::io::Cursor;
use tracing::debug;

use crate::{
    error::{Error, Result},
    image::{IndexedImage, RgbaImage},
    types::{PcxHeader, PCX_HEADER_SIZE},
};

/// Size in bytes of an RGB palette block
pub const PALETTE_SIZE: usize = 256 * 3;

/// Palette index reserved for transparent pixels
pub const TRANSPARENT_INDEX: u8 = 255;

const OPAQUE_BLACK: [u8; 4] = [0, 0, 0, 255];

/// 256 entry color lookup table
///
/// Every color is fully opaque except [`TRANSPARENT_INDEX`], which keeps its RGB channels
/// but has an alpha of zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: [[u8; 4]; 256],
}

impl Palette {
    /// Build a palette from 256 RGB triples
    pub fn from_rgb(rgb: &[u8]) -> Result<Self> {
        if rgb.len() < PALETTE_SIZE {
            return Err(Error::Truncated {
                needed: PALETTE_SIZE,
                available: rgb.len(),
            });
        }

        let mut colors = [[0u8; 4]; 256];
        for (color, triple) in colors.iter_mut().zip(rgb.chunks_exact(3)) {
            *color = [triple[0], triple[1], triple[2], 255];
        }
        colors[TRANSPARENT_INDEX as usize][3] = 0;

        Ok(Self { colors })
    }

    /// Build a palette from the trailing block of a PCX file.
    ///
    /// Only the header's fixed fields are validated; the image itself is not decoded.
    pub fn from_pcx(data: &[u8]) -> Result<Self> {
        let needed = PCX_HEADER_SIZE + PALETTE_SIZE;
        if data.len() < needed {
            return Err(Error::Truncated {
                needed,
                available: data.len(),
            });
        }

        PcxHeader::read(&mut Cursor::new(data))?.validate_format()?;

        let palette = Self::from_rgb(&data[data.len() - PALETTE_SIZE..])?;
        debug!(
            "palette built, opaque black at {:?}",
            palette.opaque_black_index()
        );
        Ok(palette)
    }

    /// RGBA color of a palette index
    pub fn color(&self, index: u8) -> [u8; 4] {
        self.colors[index as usize]
    }

    pub fn colors(&self) -> &[[u8; 4]; 256] {
        &self.colors
    }

    /// The 768 byte RGB block this palette was built from
    pub fn rgb_bytes(&self) -> Vec<u8> {
        self.colors
            .iter()
            .flat_map(|&[r, g, b, _]| [r, g, b])
            .collect()
    }

    /// First index holding fully opaque black
    pub fn opaque_black_index(&self) -> Option<u8> {
        self.colors
            .iter()
            .position(|&c| c == OPAQUE_BLACK)
            .map(|i| i as u8)
    }

    /// Map every pixel of `image` through the palette
    pub fn colorize(&self, image: &IndexedImage) -> RgbaImage {
        let data = image
            .pixels()
            .iter()
            .flat_map(|&index| self.color(index))
            .collect();

        RgbaImage::from_raw(image.width(), image.height(), data)
    }
}
