use pretty_assertions::assert_eq;
use q2_image::{
    error::{Error, Result},
    halo, pcx, wal, IndexedImage, Palette,
};
use tracing::info;
use tracing_test::traced_test;

/// Deterministic pixel noise over `0..range`
fn noise(len: usize, range: u8, mut seed: u32) -> Vec<u8> {
    (0..len)
        .map(|_| {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            ((seed >> 24) % u32::from(range)) as u8
        })
        .collect()
}

fn grey_palette() -> Vec<u8> {
    (0..=255u8).flat_map(|i| [i, i, i]).collect()
}

#[traced_test]
#[test]
fn pcx_round_trip_literals() -> Result<()> {
    // strictly alternating values never form a run
    let pixels = (0..64u8).map(|i| i % 2 * 0x30 + i % 3).collect::<Vec<_>>();
    let image = IndexedImage::new(16, 4, pixels)?;

    let data = pcx::encode(&image, &grey_palette())?;
    let decoded = pcx::decode(&data)?;
    info!("encoded {} pixels into {} bytes", image.pixels().len(), data.len());

    assert_eq!(decoded, image);

    Ok(())
}

#[traced_test]
#[test]
fn pcx_round_trip_runs() -> Result<()> {
    #[rustfmt::skip]
    let pixels = [
        vec![0x01; 3], vec![0xC8; 5], vec![0x02; 92],
        vec![0xFE; 100],
        vec![0x00; 64], vec![0xC0], vec![0x05; 35],
    ]
    .concat();
    let image = IndexedImage::new(100, 3, pixels)?;

    let data = pcx::encode(&image, &grey_palette())?;
    assert_eq!(pcx::decode(&data)?, image);

    Ok(())
}

#[traced_test]
#[test]
fn pcx_round_trip_noise() -> Result<()> {
    let image = IndexedImage::new(37, 23, noise(37 * 23, 255, 7))?;

    let data = pcx::encode(&image, &grey_palette())?;
    assert_eq!(pcx::decode(&data)?, image);
    assert_eq!(Palette::from_pcx(&data)?, Palette::from_rgb(&grey_palette())?);

    Ok(())
}

#[traced_test]
#[test]
fn pcx_rejects_truncated_payload() -> Result<()> {
    let image = IndexedImage::new(8, 8, noise(64, 200, 3))?;
    let data = pcx::encode(&image, &grey_palette())?;

    // drop the palette and part of the last row
    let cut = &data[..data.len() - 768 - 2];
    assert!(matches!(pcx::decode(cut), Err(Error::Truncated { .. })));

    Ok(())
}

#[traced_test]
#[test]
fn palette_is_idempotent() -> Result<()> {
    let rgb = noise(768, 255, 11);
    let palette = Palette::from_rgb(&rgb)?;

    let rebuilt = Palette::from_rgb(&palette.rgb_bytes())?;
    assert_eq!(rebuilt, palette);
    assert_eq!(rebuilt.rgb_bytes(), rgb);
    assert_eq!(rebuilt.color(255)[3], 0);
    assert!(rebuilt.colors()[..255].iter().all(|c| c[3] == 255));

    Ok(())
}

/// Pixels reachable from the top left through 4-connected neighbors of the same value
fn connected_to_corner(pixels: &[u8], width: usize, height: usize) -> Vec<bool> {
    let mut seen = vec![false; pixels.len()];
    let mut pending = std::collections::VecDeque::from([0]);
    seen[0] = true;

    while let Some(at) = pending.pop_front() {
        let (x, y) = (at % width, at / width);
        let neighbors = [
            (x > 0).then(|| at - 1),
            (x + 1 < width).then(|| at + 1),
            (y > 0).then(|| at - width),
            (y + 1 < height).then(|| at + width),
        ];
        for next in neighbors.into_iter().flatten() {
            if !seen[next] && pixels[next] == pixels[0] {
                seen[next] = true;
                pending.push_back(next);
            }
        }
    }

    seen
}

#[traced_test]
#[test]
fn halo_leaves_no_marker_behind() -> Result<()> {
    let palette = Palette::from_rgb(&grey_palette())?;
    let (width, height) = (31, 17);

    // sparse foreground over a background of index 200
    let mut pixels = noise(width * height, 8, 5)
        .into_iter()
        .map(|v| if v < 6 { 200 } else { v * 10 })
        .collect::<Vec<_>>();
    pixels[0] = 200;
    let original = pixels.clone();

    let mut image = IndexedImage::new(width as u32, height as u32, pixels)?;
    assert!(halo::repair(&mut image, &palette));

    let border = connected_to_corner(&original, width, height);
    assert!(border.iter().filter(|&&b| b).count() > 1);

    for (at, (before, after)) in original.iter().zip(image.pixels()).enumerate() {
        assert_ne!(*after, 255, "pixel {at}");
        if border[at] {
            assert_ne!(*after, 200, "pixel {at} was left as background");
        } else {
            assert_eq!(before, after, "pixel {at}");
        }
    }

    Ok(())
}

#[traced_test]
#[test]
fn wal_reads_base_level_only() -> Result<()> {
    let mut data = vec![0u8; 100];
    data[..6].copy_from_slice(b"e1/sky");
    data[32..36].copy_from_slice(&4i32.to_le_bytes());
    data[36..40].copy_from_slice(&2i32.to_le_bytes());
    data[40..44].copy_from_slice(&100i32.to_le_bytes());
    data[44..48].copy_from_slice(&108i32.to_le_bytes());
    data.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
    // second mip level
    data.extend_from_slice(&[9, 9]);

    let image = wal::decode(&data)?;
    assert_eq!((image.width(), image.height()), (4, 2));
    assert_eq!(image.pixels(), &[1, 2, 3, 4, 5, 6, 7, 8]);

    data[40..44].copy_from_slice(&0i32.to_le_bytes());
    assert!(matches!(wal::decode(&data), Err(Error::InvalidWal(_))));

    Ok(())
}
