use std::path::Path;

use anyhow::{Context, Result};
use image::GrayImage;
use tracing::{debug, info};

use crate::analysis::classify::binarize;

/// Number of reference digit templates.
pub const DIGIT_COUNT: usize = 10;

/// The ten canonical digit templates, keyed by digit value.
///
/// Loaded once at startup and shared read-only by every classification
/// call. Templates are stored binarized (glyph stroke high) and cropped
/// to the tight bounding box of their foreground — the same space
/// candidate blobs are compared in.
#[derive(Debug)]
pub struct DigitSet {
    templates: [GrayImage; DIGIT_COUNT],
}

impl DigitSet {
    /// Load `0.png` through `9.png` (or `.jpg`) from a directory as
    /// grayscale. Any missing or unreadable file is a fatal error.
    pub fn load(dir: &Path) -> Result<Self> {
        info!(?dir, "loading reference digit set");

        let mut templates = Vec::with_capacity(DIGIT_COUNT);
        for digit in 0..DIGIT_COUNT {
            let path = ["png", "jpg"]
                .iter()
                .map(|ext| dir.join(format!("{digit}.{ext}")))
                .find(|candidate| candidate.exists())
                .with_context(|| {
                    format!("no reference image for digit {digit} in {}", dir.display())
                })?;

            let gray = image::open(&path)
                .with_context(|| format!("failed to read {}", path.display()))?
                .to_luma8();
            let template = canonicalize(&gray).with_context(|| {
                format!("reference image {} has no foreground", path.display())
            })?;

            debug!(
                digit,
                width = template.width(),
                height = template.height(),
                "template ready"
            );
            templates.push(template);
        }

        Ok(Self {
            templates: into_array(templates),
        })
    }

    /// Build a set from in-memory grayscale images, digit value = index.
    pub fn from_images(images: [GrayImage; DIGIT_COUNT]) -> Result<Self> {
        let mut templates = Vec::with_capacity(DIGIT_COUNT);
        for (digit, image) in images.into_iter().enumerate() {
            let template = canonicalize(&image)
                .with_context(|| format!("image for digit {digit} has no foreground"))?;
            templates.push(template);
        }
        Ok(Self {
            templates: into_array(templates),
        })
    }

    pub fn template(&self, digit: u8) -> &GrayImage {
        &self.templates[digit as usize]
    }

    pub fn templates(&self) -> &[GrayImage; DIGIT_COUNT] {
        &self.templates
    }
}

fn into_array(templates: Vec<GrayImage>) -> [GrayImage; DIGIT_COUNT] {
    match templates.try_into() {
        Ok(templates) => templates,
        Err(_) => unreachable!("exactly {DIGIT_COUNT} templates are collected"),
    }
}

/// Binarize a raw template with the classifier's own thresholding and
/// crop it to the tight bounding box of its foreground. `None` for a
/// blank image.
fn canonicalize(gray: &GrayImage) -> Option<GrayImage> {
    let binary = binarize(gray);

    let mut x0 = u32::MAX;
    let mut y0 = u32::MAX;
    let mut x1 = 0;
    let mut y1 = 0;
    for (x, y, pixel) in binary.enumerate_pixels() {
        if pixel[0] > 0 {
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);
        }
    }

    if x0 == u32::MAX {
        return None;
    }

    Some(image::imageops::crop_imm(&binary, x0, y0, x1 - x0 + 1, y1 - y0 + 1).to_image())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    use crate::testutil::{digit_images, glyph, GLYPH_H, GLYPH_W};

    #[test]
    fn templates_are_tight_cropped() {
        let set = DigitSet::from_images(digit_images()).unwrap();
        // Full-box glyphs lose their margin entirely.
        assert_eq!(set.template(0).dimensions(), (GLYPH_W, GLYPH_H));
        assert_eq!(set.template(8).dimensions(), (GLYPH_W, GLYPH_H));
        // "1" is a narrow bar; the crop hugs it.
        assert!(set.template(1).width() < GLYPH_W);
        assert_eq!(set.template(1).height(), GLYPH_H);
    }

    #[test]
    fn templates_are_binarized_stroke_high() {
        let set = DigitSet::from_images(digit_images()).unwrap();
        let template = set.template(8);
        // The "8" glyph is inked in every corner of its box.
        assert_eq!(template.get_pixel(0, 0), &Luma([255]));
    }

    #[test]
    fn blank_template_is_rejected() {
        let mut images = digit_images();
        images[3] = GrayImage::from_pixel(10, 10, Luma([255]));
        let err = DigitSet::from_images(images).unwrap_err();
        assert!(err.to_string().contains("digit 3"));
    }

    #[test]
    fn canonicalize_strips_margins() {
        let template = canonicalize(&glyph(7)).unwrap();
        assert_eq!(template.dimensions(), (GLYPH_W, GLYPH_H));
    }
}
