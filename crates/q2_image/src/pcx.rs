//! Run-length compressed PCX pictures

use binrw::{BinRead, BinWrite};
use std::io::Cursor;
use tracing::trace;

use crate::{
    error::{Error, Result},
    image::IndexedImage,
    palette::PALETTE_SIZE,
    types::{PcxHeader, PCX_HEADER_SIZE},
};

/// Both high bits set mark a run
const RUN_FLAG: u8 = 0xC0;

/// Longest run one control byte can describe
const MAX_RUN: usize = 0x3F;

/// Decode a PCX file into palette indices.
///
/// The trailing palette block is not consumed; decoding stops once every row is filled.
pub fn decode(data: &[u8]) -> Result<IndexedImage> {
    if data.len() < PCX_HEADER_SIZE {
        return Err(Error::Truncated {
            needed: PCX_HEADER_SIZE,
            available: data.len(),
        });
    }

    let header = PcxHeader::read(&mut Cursor::new(data))?;
    header.validate_format()?;
    let (width, height) = header.dimensions()?;
    trace!(width, height, "decoding pcx");

    decode_rle(&data[PCX_HEADER_SIZE..], width, height)
}

/// Expand a run-length encoded payload into a `width` x `height` image.
///
/// Every row starts where the previous one left off in `payload`. A run that would cross the
/// end of a row, or a payload that ends before the image is filled, is an error.
pub fn decode_rle(payload: &[u8], width: u32, height: u32) -> Result<IndexedImage> {
    let row_len = width as usize;
    let mut pixels = vec![0u8; row_len * height as usize];
    let mut src = payload.iter().copied();
    let mut consumed = 0usize;

    let mut next = || {
        let byte = src.next().ok_or(Error::Truncated {
            needed: consumed + 1,
            available: payload.len(),
        })?;
        consumed += 1;
        Ok::<u8, Error>(byte)
    };

    for (y, row) in pixels.chunks_exact_mut(row_len.max(1)).enumerate() {
        let mut x = 0;
        while x < row_len {
            let control = next()?;
            let (run, value) = if control & RUN_FLAG == RUN_FLAG {
                (usize::from(control & !RUN_FLAG), next()?)
            } else {
                (1, control)
            };

            if x + run > row_len {
                return Err(Error::InvalidPcx(format!(
                    "run of {run} at ({x}, {y}) overruns row of width {row_len}"
                )));
            }

            row[x..x + run].fill(value);
            x += run;
        }
    }

    IndexedImage::new(width, height, pixels)
}

/// Run-length encode an image and wrap it in a PCX file with the given RGB palette block.
pub fn encode(image: &IndexedImage, palette_rgb: &[u8]) -> Result<Vec<u8>> {
    if palette_rgb.len() != PALETTE_SIZE {
        return Err(Error::Truncated {
            needed: PALETTE_SIZE,
            available: palette_rgb.len(),
        });
    }

    let too_large = || {
        Error::InvalidPcx(format!(
            "{}x{} is too large",
            image.width(),
            image.height()
        ))
    };
    let width = u16::try_from(image.width()).map_err(|_| too_large())?;
    let height = u16::try_from(image.height()).map_err(|_| too_large())?;

    let capacity = PCX_HEADER_SIZE + image.pixels().len() + PALETTE_SIZE;
    let mut out = Cursor::new(Vec::with_capacity(capacity));
    PcxHeader::new(width, height).write(&mut out)?;

    let mut data = out.into_inner();
    for row in image.rows() {
        encode_row(row, &mut data);
    }
    data.extend_from_slice(palette_rgb);

    Ok(data)
}

fn encode_row(row: &[u8], out: &mut Vec<u8>) {
    let mut x = 0;
    while x < row.len() {
        let value = row[x];
        let run = row[x..]
            .iter()
            .take(MAX_RUN)
            .take_while(|&&v| v == value)
            .count();

        if run > 1 || value & RUN_FLAG == RUN_FLAG {
            out.push(RUN_FLAG | run as u8);
        }
        out.push(value);
        x += run;
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::error::{Error, Result};
    use crate::image::IndexedImage;
    use crate::pcx::{decode, decode_rle, encode, encode_row};

    #[test]
    fn decode_literals() -> Result<()> {
        #[rustfmt::skip]
        let payload = [
            0x01, 0x02, 0x03,
            0x04, 0x05, 0x06,
        ];

        let image = decode_rle(&payload, 3, 2)?;
        assert_eq!(image.pixels(), &[1, 2, 3, 4, 5, 6]);

        Ok(())
    }

    #[test]
    fn decode_runs() -> Result<()> {
        #[rustfmt::skip]
        let payload = [
            0xC3, 0x09,
            0xC2, 0xC5, 0x01,
        ];

        let image = decode_rle(&payload, 3, 2)?;
        assert_eq!(image.pixels(), &[9, 9, 9, 0xC5, 0xC5, 1]);

        Ok(())
    }

    #[test]
    fn decode_ignores_trailing_bytes() -> Result<()> {
        let payload = [0xC2, 0x07, 0xAA, 0xBB];

        let image = decode_rle(&payload, 2, 1)?;
        assert_eq!(image.pixels(), &[7, 7]);

        Ok(())
    }

    #[test]
    fn run_crossing_row_is_rejected() {
        let payload = [0xC4, 0x01];

        assert!(matches!(
            decode_rle(&payload, 2, 2),
            Err(Error::InvalidPcx(_))
        ));
    }

    #[test]
    fn exhausted_payload_is_rejected() {
        assert!(matches!(
            decode_rle(&[0x01, 0x02], 2, 2),
            Err(Error::Truncated { .. })
        ));
        // run control byte without its value
        assert!(matches!(
            decode_rle(&[0xC2], 2, 1),
            Err(Error::Truncated { .. })
        ));
    }

    #[test]
    fn encode_row_escapes_high_values() {
        let mut out = Vec::new();
        encode_row(&[0x05, 0xC0, 0x07, 0x07, 0x07], &mut out);

        assert_eq!(out, vec![0x05, 0xC1, 0xC0, 0xC3, 0x07]);
    }

    #[test]
    fn encode_row_splits_long_runs() {
        let mut out = Vec::new();
        encode_row(&[0x11; 70], &mut out);

        assert_eq!(out, vec![0xFF, 0x11, 0xC7, 0x11]);
    }

    #[test]
    fn decode_file() -> Result<()> {
        let image = IndexedImage::new(4, 2, vec![3, 3, 3, 200, 0, 1, 2, 3])?;
        let data = encode(&image, &[0; 768])?;

        assert_eq!(decode(&data)?, image);

        Ok(())
    }

    #[test]
    fn decode_rejects_short_header() {
        assert!(matches!(
            decode(&[0x0A, 0x05]),
            Err(Error::Truncated { needed: 128, .. })
        ));
    }
}
