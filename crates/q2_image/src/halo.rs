//! Background halo repair for model skins
//!
//! Skins are drawn on a flat background color. When mipmapped, that color bleeds into the
//! edges of the painted regions. The background connected to the top left pixel is flood
//! filled, and every background pixel takes on the color of a painted neighbor, or the
//! palette's opaque black when it has none.

use tracing::{debug, trace};

use crate::{image::IndexedImage, palette::Palette, palette::TRANSPARENT_INDEX};

/// Marks a pixel that has been queued
const VISITED: u8 = TRANSPARENT_INDEX;

/// Fixed capacity ring of pixel indices
struct FloodQueue {
    slots: Vec<u32>,
    mask: usize,
    head: usize,
    tail: usize,
}

impl FloodQueue {
    /// Queue for flooding an image of `area` pixels.
    ///
    /// A ring of capacity `n` holds `n - 1` entries. Pixel 0 leaves the queue before any other
    /// pixel enters it, so at most `area - 1` entries are ever waiting.
    fn with_area(area: usize) -> Self {
        let capacity = area.next_power_of_two().max(2);
        Self {
            slots: vec![0; capacity],
            mask: capacity - 1,
            head: 0,
            tail: 0,
        }
    }

    fn push(&mut self, index: u32) {
        self.slots[self.tail] = index;
        self.tail = (self.tail + 1) & self.mask;
        // every pixel is pushed at most once, so the ring never wraps onto unread slots
        assert_ne!(self.tail, self.head, "flood queue overflow");
    }

    fn pop(&mut self) -> Option<u32> {
        if self.head == self.tail {
            return None;
        }
        let index = self.slots[self.head];
        self.head = (self.head + 1) & self.mask;
        Some(index)
    }
}

/// Flood fill the background of a skin in place.
///
/// Returns `false` without touching the image when the background is already the fill
/// color or is the transparent index.
pub fn repair(image: &mut IndexedImage, palette: &Palette) -> bool {
    let (width, height) = (image.width() as usize, image.height() as usize);
    let Some(&fill) = image.pixels().first() else {
        return false;
    };
    let filled = palette.opaque_black_index().unwrap_or(0);

    if fill == filled || fill == VISITED {
        debug!(fill, filled, "skipping halo repair");
        return false;
    }
    trace!(width, height, fill, filled, "repairing skin halo");

    let pixels = image.pixels_mut();
    let mut queue = FloodQueue::with_area(pixels.len());
    queue.push(0);

    while let Some(index) = queue.pop() {
        let at = index as usize;
        let (x, y) = (at % width, at / width);
        let mut color = filled;

        let mut visit = |neighbor: usize| match pixels[neighbor] {
            c if c == fill => {
                pixels[neighbor] = VISITED;
                queue.push(neighbor as u32);
            }
            VISITED => {}
            c => color = c,
        };

        if x > 0 {
            visit(at - 1);
        }
        if x + 1 < width {
            visit(at + 1);
        }
        if y > 0 {
            visit(at - width);
        }
        if y + 1 < height {
            visit(at + width);
        }

        pixels[at] = color;
    }

    true
}
