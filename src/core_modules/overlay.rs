// THEORY:
// The overlay marks the region of interest on the source image: a hollow square around
// every in-band block, drawn on an RGB copy of the source so the chemistry is read in
// context.
//
// Geometry: the outer edge of each square spans [x, x + block_size] inclusive on both
// axes, and the stroke grows inwards `stroke_width` pixels. Squares at the image border
// are clipped by the drawing primitive.

use crate::core_modules::block::block::BlockRecord;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use serde::{Deserialize, Serialize};

/// Stroke settings for highlighted blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    pub color: [u8; 3],
    pub stroke_width: u32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            // Named "green" in CSS/X11 colour tables.
            color: [0, 128, 0],
            stroke_width: 2,
        }
    }
}

/// Draws one hollow square per record onto `image`.
pub fn draw_highlights(
    image: &mut RgbImage,
    records: &[BlockRecord],
    block_size: u32,
    style: &OverlayStyle,
) {
    let color = Rgb(style.color);
    let outer = block_size + 1;

    for record in records {
        for inset in 0..style.stroke_width {
            let side = match outer.checked_sub(inset * 2) {
                Some(side) if side > 0 => side,
                _ => break,
            };
            let rect = Rect::at((record.x() + inset) as i32, (record.y() + inset) as i32)
                .of_size(side, side);
            draw_hollow_rect_mut(image, rect, color);
        }
    }
}

/// Returns an annotated copy of `source`.
pub fn annotate(
    source: &RgbImage,
    records: &[BlockRecord],
    block_size: u32,
    style: &OverlayStyle,
) -> RgbImage {
    let mut annotated = source.clone();
    draw_highlights(&mut annotated, records, block_size, style);
    annotated
}

#[cfg(test)]
mod tests {
    use super::*;

    const BACKGROUND: Rgb<u8> = Rgb([200, 200, 200]);
    const GREEN: Rgb<u8> = Rgb([0, 128, 0]);

    fn record(x: u32, y: u32) -> BlockRecord {
        BlockRecord::new(x, y, 150.0, 0.01).expect("record")
    }

    #[test]
    fn draws_two_pixel_inward_stroke() {
        let source = RgbImage::from_pixel(48, 48, BACKGROUND);
        let annotated = annotate(&source, &[record(16, 16)], 16, &OverlayStyle::default());

        // Outer ring.
        assert_eq!(*annotated.get_pixel(16, 16), GREEN);
        assert_eq!(*annotated.get_pixel(32, 32), GREEN);
        assert_eq!(*annotated.get_pixel(24, 16), GREEN);
        // Inner ring.
        assert_eq!(*annotated.get_pixel(17, 17), GREEN);
        assert_eq!(*annotated.get_pixel(31, 24), GREEN);
        // Interior and exterior untouched.
        assert_eq!(*annotated.get_pixel(24, 24), BACKGROUND);
        assert_eq!(*annotated.get_pixel(18, 18), BACKGROUND);
        assert_eq!(*annotated.get_pixel(15, 16), BACKGROUND);
        assert_eq!(*annotated.get_pixel(33, 33), BACKGROUND);
        // Source is not modified.
        assert_eq!(*source.get_pixel(16, 16), BACKGROUND);
    }

    #[test]
    fn clips_at_image_border() {
        let mut image = RgbImage::from_pixel(16, 16, BACKGROUND);
        draw_highlights(&mut image, &[record(0, 0)], 16, &OverlayStyle::default());
        assert_eq!(*image.get_pixel(0, 0), GREEN);
        assert_eq!(*image.get_pixel(15, 1), GREEN);
        assert_eq!(*image.get_pixel(8, 8), BACKGROUND);
    }

    #[test]
    fn custom_style() {
        let style = OverlayStyle {
            color: [255, 0, 0],
            stroke_width: 1,
        };
        let annotated = annotate(&RgbImage::from_pixel(32, 32, BACKGROUND), &[record(0, 0)], 16, &style);
        assert_eq!(*annotated.get_pixel(0, 0), Rgb([255, 0, 0]));
        assert_eq!(*annotated.get_pixel(1, 1), BACKGROUND);
    }
}
