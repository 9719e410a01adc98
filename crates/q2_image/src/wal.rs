//! Raw mip level WAL textures

use std::io::Cursor;
use tracing::trace;

use crate::{
    error::{Error, Result},
    image::IndexedImage,
    types::{MipTexHeader, MIPTEX_HEADER_SIZE},
};

/// Decode the base mip level of a WAL file into palette indices.
pub fn decode(data: &[u8]) -> Result<IndexedImage> {
    if data.len() < MIPTEX_HEADER_SIZE {
        return Err(Error::Truncated {
            needed: MIPTEX_HEADER_SIZE,
            available: data.len(),
        });
    }

    let header = MipTexHeader::read(&mut Cursor::new(data))?;
    let (offset, width, height) = validate(&header, data.len())?;
    trace!(name = %header.name(), width, height, next = %header.anim_name(), "decoding wal");

    let pixels = data
        .get(offset..offset + width * height)
        .ok_or(Error::Truncated {
            needed: offset + width * height,
            available: data.len(),
        })?
        .to_vec();

    IndexedImage::new(width as u32, height as u32, pixels)
}

/// Returns the base level offset, width and height once they are known to fit in `len` bytes
fn validate(header: &MipTexHeader, len: usize) -> Result<(usize, usize, usize)> {
    let invalid = |reason: String| Error::InvalidWal(format!("{}: {}", header.name(), reason));

    let offset = header.offsets[0];
    if offset <= 0 {
        return Err(invalid(format!("base level offset {offset} is not positive")));
    }
    if header.width <= 0 || header.height <= 0 {
        return Err(invalid(format!(
            "size {}x{} is not positive",
            header.width, header.height
        )));
    }

    let (offset, width, height) = (offset as usize, header.width as usize, header.height as usize);
    if offset > len || (len - offset) / height < width {
        return Err(invalid(format!(
            "{}x{} base level at {} does not fit in {} bytes",
            width, height, offset, len
        )));
    }

    Ok((offset, width, height))
}
