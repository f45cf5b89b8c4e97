//! Synthetic seven-segment glyphs and frames shared across module tests.

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use crate::config::profiles::SourceProfile;

/// Glyph box dimensions of the synthetic font.
pub const GLYPH_W: u32 = 20;
pub const GLYPH_H: u32 = 36;
/// Stroke thickness.
const STROKE: u32 = 4;
/// Background margin around the glyph in a rendered template.
pub const MARGIN: u32 = 2;

/// Segment layout (x, y, w, h) within the glyph box:
/// a top, b top-right, c bottom-right, d bottom, e bottom-left,
/// f top-left, g middle.
const SEGMENTS: [(u32, u32, u32, u32); 7] = [
    (0, 0, GLYPH_W, STROKE),
    (GLYPH_W - STROKE, 0, STROKE, GLYPH_H / 2 + STROKE / 2),
    (GLYPH_W - STROKE, GLYPH_H / 2 - STROKE / 2, STROKE, GLYPH_H / 2 + STROKE / 2),
    (0, GLYPH_H - STROKE, GLYPH_W, STROKE),
    (0, GLYPH_H / 2 - STROKE / 2, STROKE, GLYPH_H / 2 + STROKE / 2),
    (0, 0, STROKE, GLYPH_H / 2 + STROKE / 2),
    (0, GLYPH_H / 2 - STROKE / 2, GLYPH_W, STROKE),
];

/// Active segments per digit, indices into [`SEGMENTS`].
const DIGIT_SEGMENTS: [&[usize]; 10] = [
    &[0, 1, 2, 3, 4, 5],
    &[1, 2],
    &[0, 1, 6, 4, 3],
    &[0, 1, 6, 2, 3],
    &[5, 6, 1, 2],
    &[0, 5, 6, 2, 3],
    &[0, 5, 6, 4, 3, 2],
    &[0, 1, 2],
    &[0, 1, 2, 3, 4, 5, 6],
    &[0, 1, 2, 3, 5, 6],
];

/// Render a digit as dark strokes on white: the glyph box plus
/// [`MARGIN`] background pixels on every side.
pub fn glyph(digit: u8) -> GrayImage {
    let mut img = GrayImage::from_pixel(GLYPH_W + 2 * MARGIN, GLYPH_H + 2 * MARGIN, Luma([255]));
    for &segment in DIGIT_SEGMENTS[digit as usize] {
        let (x, y, w, h) = SEGMENTS[segment];
        draw_filled_rect_mut(
            &mut img,
            Rect::at((MARGIN + x) as i32, (MARGIN + y) as i32).of_size(w, h),
            Luma([0]),
        );
    }
    img
}

/// The ten rendered templates, digit value = index.
pub fn digit_images() -> [GrayImage; 10] {
    std::array::from_fn(|digit| glyph(digit as u8))
}

/// Widen a grayscale image into the RGB cells the pipeline works on.
pub fn to_rgb(gray: &GrayImage) -> RgbImage {
    image::DynamicImage::ImageLuma8(gray.clone()).to_rgb8()
}

/// Render a white frame with `digits` burned in at the cell positions
/// prescribed by `profile`.
pub fn render_frame(
    width: u32,
    height: u32,
    digits: &[u8; 8],
    profile: &SourceProfile,
) -> RgbImage {
    let mut frame = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    let bounds = profile.region.to_pixel_bounds(width, height);
    let cells = crate::analysis::segment::cell_bounds(bounds.width(), &profile.cells);

    for (i, (cell_x, _)) in cells.iter().enumerate() {
        let ox = bounds.x_min + cell_x + 8;
        let oy = bounds.y_min + 10;
        for &segment in DIGIT_SEGMENTS[digits[i] as usize] {
            let (x, y, w, h) = SEGMENTS[segment];
            draw_filled_rect_mut(
                &mut frame,
                Rect::at((ox + x) as i32, (oy + y) as i32).of_size(w, h),
                Rgb([0, 0, 0]),
            );
        }
    }

    frame
}
