//! This library decodes the indexed images used by *Quake II* into RGBA pixels.
//!
//! Two formats are supported: **PCX** pictures (run-length compressed, used for menus, HUD
//! pictures and model skins) and **WAL** textures (raw mip levels, used for world surfaces).
//! Both store one palette index per pixel. The palette itself is taken from the trailing
//! block of `pics/colormap.pcx`.
//!
//! # PCX Format Documentation
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Manufacturer           | 1 byte: Always 0x0A                                        |
//! | 0x0001         | Version                | 1 byte: Always 5                                           |
//! | 0x0002         | Encoding               | 1 byte: 1 for run-length encoding                          |
//! | 0x0003         | Bits Per Pixel         | 1 byte: Always 8                                           |
//! | 0x0004         | Bounds                 | 8 bytes: xmin, ymin, xmax, ymax as u16, inclusive          |
//! | 0x000C         | Resolution             | 4 bytes: horizontal and vertical DPI                       |
//! | 0x0010         | EGA Palette            | 48 bytes: Unused                                           |
//! | 0x0040         | Reserved               | 1 byte                                                     |
//! | 0x0041         | Color Planes           | 1 byte                                                     |
//! | 0x0042         | Bytes Per Line         | 2 bytes                                                    |
//! | 0x0044         | Palette Type           | 2 bytes                                                    |
//! | 0x0046         | Filler                 | 58 bytes: Pads the header to 128 bytes                     |
//!
//! The image is `xmax - xmin + 1` pixels wide and `ymax - ymin + 1` pixels high, and neither
//! span may reach 4096. The header is followed by the run-length encoded pixels, row by row.
//! A byte with both high bits set (`0xC0`) is a run: its low six bits are the repeat count and
//! the next byte is the value. Any other byte is a single pixel. Runs never cross a row.
//!
//! The last 768 bytes of the file are the palette, 256 RGB triples.
//!
//! # WAL Format Documentation
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Name                   | 32 bytes: Texture name, NUL padded                      |
//! | 0x0020         | Width                  | 4 bytes: Width of the base level                        |
//! | 0x0024         | Height                 | 4 bytes: Height of the base level                       |
//! | 0x0028         | Offsets                | 16 bytes: Offset of each of the four mip levels         |
//! | 0x0038         | Animation Name         | 32 bytes: Next frame of an animated texture             |
//! | 0x0058         | Flags                  | 4 bytes: Surface flags                                  |
//! | 0x005C         | Contents               | 4 bytes: Content flags                                  |
//! | 0x0060         | Value                  | 4 bytes: Light value                                    |
//!
//! Each mip level is stored uncompressed, one byte per pixel. Only the base level is decoded.
//!
//! ## Additional Information
//!
//! - **File Extensions**: `.pcx`, `.wal`
//! - **Endianness**: Little-endian for all multi-byte integers
//! - **Transparency**: palette index 255 is transparent
//!

pub mod error;
pub mod halo;
pub mod image;
pub mod palette;
pub mod pcx;
pub mod types;
pub mod wal;

pub use image::{IndexedImage, RgbaImage};
pub use palette::Palette;
