//! Header layouts of the PCX and WAL formats.

use binrw::{BinRead, BinWrite};
use byteorder::{LittleEndian, ReadBytesExt};
use std::{borrow::Cow, io::Read};

use crate::error::{Error, Result};

/// Size in bytes of [`PcxHeader`] on disk
pub const PCX_HEADER_SIZE: usize = 128;

/// Size in bytes of [`MipTexHeader`] on disk
pub const MIPTEX_HEADER_SIZE: usize = 100;

/// Number of mip levels stored in a WAL file
pub const MIP_LEVELS: usize = 4;

/// Both bounding box spans must be below this
pub const MAX_PCX_SPAN: u16 = 4096;

const PCX_MANUFACTURER: u8 = 0x0a;
const PCX_VERSION: u8 = 5;
const PCX_ENCODING: u8 = 1;
const PCX_BITS_PER_PIXEL: u8 = 8;

/// PCX file header
///
/// All data is stored in little endian format
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct PcxHeader {
    pub manufacturer: u8,
    pub version: u8,
    pub encoding: u8,
    pub bits_per_pixel: u8,

    /// Inclusive bounding box of the image
    pub xmin: u16,
    pub ymin: u16,
    pub xmax: u16,
    pub ymax: u16,

    pub hres: u16,
    pub vres: u16,

    /// 16 color EGA palette, unused for 8 bit images
    pub ega_palette: [u8; 48],
    pub reserved: u8,
    pub color_planes: u8,
    pub bytes_per_line: u16,
    pub palette_type: u16,
    pub filler: [u8; 58],
}

impl PcxHeader {
    /// Header for an 8 bit, single plane image of the given size
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            manufacturer: PCX_MANUFACTURER,
            version: PCX_VERSION,
            encoding: PCX_ENCODING,
            bits_per_pixel: PCX_BITS_PER_PIXEL,
            xmin: 0,
            ymin: 0,
            xmax: width.saturating_sub(1),
            ymax: height.saturating_sub(1),
            hres: 72,
            vres: 72,
            ega_palette: [0; 48],
            reserved: 0,
            color_planes: 1,
            bytes_per_line: width,
            palette_type: 1,
            filler: [0; 58],
        }
    }

    /// Check the fixed manufacturer, version, encoding and depth fields
    pub fn validate_format(&self) -> Result<()> {
        let expect = |field: &str, actual: u8, expected: u8| {
            if actual == expected {
                Ok(())
            } else {
                Err(Error::InvalidPcx(format!(
                    "{field} is {actual}, expected {expected}"
                )))
            }
        };

        expect("manufacturer", self.manufacturer, PCX_MANUFACTURER)?;
        expect("version", self.version, PCX_VERSION)?;
        expect("encoding", self.encoding, PCX_ENCODING)?;
        expect("bits per pixel", self.bits_per_pixel, PCX_BITS_PER_PIXEL)
    }

    /// Width and height described by the inclusive bounding box
    pub fn dimensions(&self) -> Result<(u32, u32)> {
        let span = |axis: &str, min: u16, max: u16| {
            let span = max.checked_sub(min).ok_or_else(|| {
                Error::InvalidPcx(format!("{axis} bounds {min}..={max} are reversed"))
            })?;
            if span >= MAX_PCX_SPAN {
                return Err(Error::InvalidPcx(format!(
                    "{axis} span {span} is not below {MAX_PCX_SPAN}"
                )));
            }
            Ok(u32::from(span) + 1)
        };

        Ok((
            span("x", self.xmin, self.xmax)?,
            span("y", self.ymin, self.ymax)?,
        ))
    }
}

/// WAL texture header
#[derive(Debug, Clone, PartialEq)]
pub struct MipTexHeader {
    pub name: [u8; 32],
    pub width: i32,
    pub height: i32,
    /// Offset of each mip level from the start of the file
    pub offsets: [i32; MIP_LEVELS],
    /// Name of the next texture in an animation
    pub anim_name: [u8; 32],
    pub flags: i32,
    pub contents: i32,
    pub value: i32,
}

impl MipTexHeader {
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut name = [0u8; 32];
        reader.read_exact(&mut name)?;
        let width = reader.read_i32::<LittleEndian>()?;
        let height = reader.read_i32::<LittleEndian>()?;

        let mut offsets = [0i32; MIP_LEVELS];
        reader.read_i32_into::<LittleEndian>(&mut offsets)?;

        let mut anim_name = [0u8; 32];
        reader.read_exact(&mut anim_name)?;

        Ok(Self {
            name,
            width,
            height,
            offsets,
            anim_name,
            flags: reader.read_i32::<LittleEndian>()?,
            contents: reader.read_i32::<LittleEndian>()?,
            value: reader.read_i32::<LittleEndian>()?,
        })
    }

    /// Texture name up to the first NUL
    pub fn name(&self) -> Cow<'_, str> {
        c_str(&self.name)
    }

    /// Animation successor name up to the first NUL
    pub fn anim_name(&self) -> Cow<'_, str> {
        c_str(&self.anim_name)
    }
}

fn c_str(field: &[u8]) -> Cow<'_, str> {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end])
}
