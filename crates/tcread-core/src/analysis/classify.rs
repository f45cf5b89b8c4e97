use image::{GrayImage, Luma, RgbImage};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use imageproc::point::Point;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::analysis::ssim::ssim;
use crate::analysis::CELL_COUNT;
use crate::digits::{DigitSet, DIGIT_COUNT};
use crate::error::Error;

/// Classifies glyph cells against a fixed reference digit set.
///
/// The digit set is built once at startup and only ever read here; a
/// classifier is freely shareable across threads.
pub struct Classifier {
    digits: DigitSet,
}

impl Classifier {
    pub fn new(digits: DigitSet) -> Self {
        Self { digits }
    }

    /// Classify one glyph cell, returning the best-matching digit.
    pub fn classify(&self, cell: &RgbImage) -> Result<u8, Error> {
        self.classify_with_score(cell)
            .map(|(digit, _)| digit)
            .ok_or(Error::ClassificationAmbiguous)
    }

    /// Classify one glyph cell, returning the best-matching digit and
    /// its similarity score. `None` when the cell yields no positive
    /// evidence for any digit — a blank or unrecognizable cell, which is
    /// not the same thing as reading a 0.
    pub fn classify_with_score(&self, cell: &RgbImage) -> Option<(u8, f64)> {
        let gray = image::imageops::grayscale(cell);
        let binary = binarize(&gray);

        // Stray noise blobs and glyphs split into several strokes each
        // get their own box; the per-digit maximum absorbs them.
        let mut best = [0.0f64; DIGIT_COUNT];
        for bbox in glyph_boxes(&binary) {
            let roi =
                image::imageops::crop_imm(&binary, bbox.x, bbox.y, bbox.w, bbox.h).to_image();

            let scores: Vec<(usize, f64)> = self
                .digits
                .templates()
                .par_iter()
                .enumerate()
                .map(|(digit, template)| (digit, score_against(&roi, template)))
                .collect();

            for (digit, score) in scores {
                if score > best[digit] {
                    best[digit] = score;
                }
            }
        }

        // First digit reaching the maximum wins, in stable 0..=9 order.
        let (digit, score) = best
            .iter()
            .copied()
            .enumerate()
            .fold((0, 0.0f64), |acc, (digit, score)| {
                if score > acc.1 {
                    (digit, score)
                } else {
                    acc
                }
            });

        if score > 0.0 {
            Some((digit as u8, score))
        } else {
            None
        }
    }

    /// Classify all eight cells of a segmented region.
    pub fn read_cells(&self, cells: &[RgbImage; CELL_COUNT]) -> Result<[u8; CELL_COUNT], Error> {
        let mut digits = [0u8; CELL_COUNT];
        for (i, cell) in cells.iter().enumerate() {
            let Some((digit, score)) = self.classify_with_score(cell) else {
                warn!(cell = i, "no similarity evidence for any digit");
                return Err(Error::ClassificationAmbiguous);
            };
            debug!(cell = i, digit, score, "cell classified");
            digits[i] = digit;
        }
        Ok(digits)
    }
}

/// Binarize with an automatic global threshold, inverted so the glyph
/// stroke becomes the high class.
pub(crate) fn binarize(gray: &GrayImage) -> GrayImage {
    let level = otsu_level(gray);
    threshold(gray, level, ThresholdType::BinaryInverted)
}

/// Pad an image with background pixels up to the given dimensions.
/// Padding splits as evenly as possible between opposing sides; an odd
/// remainder goes to the trailing side. Padding to the image's own
/// dimensions is a no-op.
pub(crate) fn pad_to_match(image: &GrayImage, width: u32, height: u32) -> GrayImage {
    assert!(
        image.width() <= width && image.height() <= height,
        "cannot pad {}x{} up to {}x{}",
        image.width(),
        image.height(),
        width,
        height
    );

    if image.dimensions() == (width, height) {
        return image.clone();
    }

    let left = (width - image.width()) / 2;
    let top = (height - image.height()) / 2;
    let mut canvas = GrayImage::from_pixel(width, height, Luma([0]));
    image::imageops::replace(&mut canvas, image, left as i64, top as i64);
    canvas
}

/// Similarity of a candidate blob against one reference template. A
/// blob larger than the template in either dimension cannot be padded
/// to match and scores 0.
fn score_against(roi: &GrayImage, template: &GrayImage) -> f64 {
    let (width, height) = template.dimensions();
    if roi.width() > width || roi.height() > height {
        return 0.0;
    }
    let padded = pad_to_match(roi, width, height);
    ssim(&padded, template)
}

/// Tight bounding box of one connected foreground region.
#[derive(Debug, Clone, Copy)]
struct GlyphBox {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

/// Bounding boxes of the outer boundaries of connected foreground
/// regions (holes and nested borders are ignored).
fn glyph_boxes(binary: &GrayImage) -> Vec<GlyphBox> {
    find_contours::<u32>(binary)
        .into_iter()
        .filter(|contour: &Contour<u32>| {
            contour.border_type == BorderType::Outer && contour.parent.is_none()
        })
        .filter_map(|contour| bounding_box(&contour.points))
        .collect()
}

fn bounding_box(points: &[Point<u32>]) -> Option<GlyphBox> {
    let first = points.first()?;
    let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
    for point in points {
        x0 = x0.min(point.x);
        y0 = y0.min(point.y);
        x1 = x1.max(point.x);
        y1 = y1.max(point.y);
    }
    Some(GlyphBox {
        x: x0,
        y: y0,
        w: x1 - x0 + 1,
        h: y1 - y0 + 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    use crate::testutil::{digit_images, glyph, to_rgb};

    fn classifier() -> Classifier {
        Classifier::new(DigitSet::from_images(digit_images()).unwrap())
    }

    #[test]
    fn binarize_makes_the_stroke_the_high_class() {
        // Dark square on a light background.
        let mut gray = GrayImage::from_pixel(12, 12, Luma([230]));
        for x in 4..8 {
            for y in 4..8 {
                gray.put_pixel(x, y, Luma([15]));
            }
        }
        let binary = binarize(&gray);
        assert_eq!(binary.get_pixel(5, 5), &Luma([255]));
        assert_eq!(binary.get_pixel(0, 0), &Luma([0]));
    }

    #[test]
    fn pad_is_a_no_op_at_matching_dimensions() {
        let img = GrayImage::from_pixel(7, 9, Luma([255]));
        let once = pad_to_match(&img, 7, 9);
        assert_eq!(once, img);
        let twice = pad_to_match(&once, 7, 9);
        assert_eq!(twice, once);
    }

    #[test]
    fn pad_centers_with_odd_remainder_trailing() {
        let img = GrayImage::from_pixel(3, 3, Luma([255]));
        let padded = pad_to_match(&img, 6, 6);
        // 3 spare pixels split 1 leading / 2 trailing on both axes.
        assert_eq!(padded.get_pixel(0, 0), &Luma([0]));
        assert_eq!(padded.get_pixel(1, 1), &Luma([255]));
        assert_eq!(padded.get_pixel(3, 3), &Luma([255]));
        assert_eq!(padded.get_pixel(4, 4), &Luma([0]));
        assert_eq!(padded.get_pixel(5, 5), &Luma([0]));
    }

    #[test]
    fn finds_one_outer_box_for_a_ringed_glyph() {
        // "0" has a hole; only the outer border must survive.
        let gray = glyph(0);
        let boxes = glyph_boxes(&binarize(&gray));
        assert_eq!(boxes.len(), 1);
        let b = boxes[0];
        assert_eq!((b.w, b.h), (20, 36));
    }

    #[test]
    fn classifies_every_reference_against_itself() {
        let classifier = classifier();
        for digit in 0u8..10 {
            let cell = to_rgb(&glyph(digit));
            let (read, score) = classifier.classify_with_score(&cell).unwrap();
            assert_eq!(read, digit, "digit {digit} misread as {read}");
            assert!(score > 0.999, "digit {digit} self-score {score}");
        }
    }

    #[test]
    fn blank_cell_is_ambiguous_not_zero() {
        let classifier = classifier();
        let blank = RgbImage::from_pixel(40, 62, Rgb([255, 255, 255]));
        let err = classifier.classify(&blank).unwrap_err();
        assert!(matches!(err, Error::ClassificationAmbiguous));
    }

    #[test]
    fn tolerates_a_stray_noise_blob() {
        let classifier = classifier();
        let mut gray = GrayImage::from_pixel(40, 62, Luma([255]));
        image::imageops::replace(&mut gray, &glyph(7), 6, 9);
        // A speck far from the glyph; its box matches nothing well.
        gray.put_pixel(2, 58, Luma([0]));
        let (read, _) = classifier.classify_with_score(&to_rgb(&gray)).unwrap();
        assert_eq!(read, 7);
    }
}
