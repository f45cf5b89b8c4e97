use image::RgbImage;
use tracing::debug;

use crate::rect::NormalizedBounds;

/// Crop the timecode overlay region out of a full frame.
///
/// The region is given as fractions of the frame dimensions and rounded
/// to the nearest pixel, rows before columns, top-left origin. The
/// source frame is not modified.
pub fn locate(frame: &RgbImage, region: &NormalizedBounds) -> RgbImage {
    let bounds = region.to_pixel_bounds(frame.width(), frame.height());
    assert!(
        bounds.x_max <= frame.width() && bounds.y_max <= frame.height(),
        "region {bounds:?} exceeds frame {}x{}",
        frame.width(),
        frame.height()
    );

    debug!(
        x_min = bounds.x_min,
        x_max = bounds.x_max,
        y_min = bounds.y_min,
        y_max = bounds.y_max,
        "timecode region located"
    );

    image::imageops::crop_imm(
        frame,
        bounds.x_min,
        bounds.y_min,
        bounds.width(),
        bounds.height(),
    )
    .to_image()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    use crate::config::profiles::NAT_GEO;

    #[test]
    fn crops_overlay_region_at_1080p() {
        let frame = RgbImage::from_pixel(1920, 1080, Rgb([10, 20, 30]));
        let region = locate(&frame, &NAT_GEO.region);
        assert_eq!(region.dimensions(), (421, 62));
    }

    #[test]
    fn crop_copies_the_right_pixels() {
        let mut frame = RgbImage::from_pixel(1920, 1080, Rgb([0, 0, 0]));
        // First pixel of the Nat Geo region at 1080p.
        frame.put_pixel(750, 872, Rgb([255, 0, 0]));
        let region = locate(&frame, &NAT_GEO.region);
        assert_eq!(region.get_pixel(0, 0), &Rgb([255, 0, 0]));
    }

    #[test]
    fn scales_with_frame_size() {
        let frame = RgbImage::from_pixel(1280, 720, Rgb([0, 0, 0]));
        let region = locate(&frame, &NAT_GEO.region);
        // round(1280 * 0.61) - round(1280 * 0.3905) = 781 - 500
        assert_eq!(region.width(), 281);
        // round(720 * 0.865) - round(720 * 0.807) = 623 - 581
        assert_eq!(region.height(), 42);
    }
}
