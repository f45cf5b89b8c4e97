//! Grayscale structural similarity.
//!
//! Scores lie in [-1, 1], higher meaning more similar; identical images
//! score 1. Used here purely as a nearest-template metric, not for any
//! perceptual-quality purpose.

use image::GrayImage;

/// Side length of the Gaussian comparison window.
const WINDOW_SIZE: u32 = 11;
/// Standard deviation of the Gaussian window weights.
const SIGMA: f64 = 1.5;
/// Stability constants for 8-bit dynamic range.
const K1: f64 = 0.01;
const K2: f64 = 0.03;
const L: f64 = 255.0;

/// Mean structural similarity between two images of equal dimensions.
///
/// The window shrinks to the smaller image dimension when the image is
/// under [`WINDOW_SIZE`] pixels on either axis.
pub fn ssim(a: &GrayImage, b: &GrayImage) -> f64 {
    assert!(
        a.dimensions() == b.dimensions(),
        "ssim requires equal dimensions: {:?} vs {:?}",
        a.dimensions(),
        b.dimensions()
    );

    let (width, height) = a.dimensions();
    assert!(width > 0 && height > 0, "ssim requires non-empty images");

    let win = WINDOW_SIZE.min(width).min(height) as usize;
    let window = gaussian_window(win, SIGMA);

    let c1 = (K1 * L).powi(2);
    let c2 = (K2 * L).powi(2);
    let c3 = c2 / 2.0;

    let mut total = 0.0;
    let mut count = 0u32;

    for y in 0..=(height as usize - win) {
        for x in 0..=(width as usize - win) {
            let stats = local_stats(a, b, x, y, win, &window);

            let luminance = (2.0 * stats.mu_a * stats.mu_b + c1)
                / (stats.mu_a * stats.mu_a + stats.mu_b * stats.mu_b + c1);
            let sigma_a = stats.var_a.sqrt();
            let sigma_b = stats.var_b.sqrt();
            let contrast = (2.0 * sigma_a * sigma_b + c2) / (stats.var_a + stats.var_b + c2);
            let structure = (stats.covar + c3) / (sigma_a * sigma_b + c3);

            total += luminance * contrast * structure;
            count += 1;
        }
    }

    total / count as f64
}

struct LocalStats {
    mu_a: f64,
    mu_b: f64,
    var_a: f64,
    var_b: f64,
    covar: f64,
}

/// Gaussian-weighted mean, variance and covariance over one window.
fn local_stats(
    a: &GrayImage,
    b: &GrayImage,
    x: usize,
    y: usize,
    win: usize,
    window: &[f64],
) -> LocalStats {
    let mut mu_a = 0.0;
    let mut mu_b = 0.0;
    for wy in 0..win {
        for wx in 0..win {
            let weight = window[wy * win + wx];
            mu_a += weight * a.get_pixel((x + wx) as u32, (y + wy) as u32)[0] as f64;
            mu_b += weight * b.get_pixel((x + wx) as u32, (y + wy) as u32)[0] as f64;
        }
    }

    let mut var_a = 0.0;
    let mut var_b = 0.0;
    let mut covar = 0.0;
    for wy in 0..win {
        for wx in 0..win {
            let weight = window[wy * win + wx];
            let da = a.get_pixel((x + wx) as u32, (y + wy) as u32)[0] as f64 - mu_a;
            let db = b.get_pixel((x + wx) as u32, (y + wy) as u32)[0] as f64 - mu_b;
            var_a += weight * da * da;
            var_b += weight * db * db;
            covar += weight * da * db;
        }
    }

    LocalStats {
        mu_a,
        mu_b,
        var_a,
        var_b,
        covar,
    }
}

/// Normalized Gaussian weights for a `size` x `size` window.
fn gaussian_window(size: usize, sigma: f64) -> Vec<f64> {
    let mut window = vec![0.0; size * size];
    let center = (size as f64 - 1.0) / 2.0;
    let mut sum = 0.0;

    for y in 0..size {
        for x in 0..size {
            let dx = x as f64 - center;
            let dy = y as f64 - center;
            let value = (-((dx * dx + dy * dy) / (2.0 * sigma * sigma))).exp();
            window[y * size + x] = value;
            sum += value;
        }
    }

    for value in &mut window {
        *value /= sum;
    }

    window
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn gradient(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| Luma([((x * 7 + y * 13) % 256) as u8]))
    }

    #[test]
    fn identical_images_score_one() {
        let img = gradient(32, 32);
        let score = ssim(&img, &img);
        assert!((score - 1.0).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn perturbed_image_scores_below_one() {
        let a = gradient(32, 32);
        let mut b = a.clone();
        for x in 10..20 {
            for y in 10..20 {
                b.put_pixel(x, y, Luma([255]));
            }
        }
        let score = ssim(&a, &b);
        assert!(score < 1.0, "got {score}");
    }

    #[test]
    fn dissimilar_beats_similar() {
        let a = gradient(32, 32);
        let mut slightly_off = a.clone();
        slightly_off.put_pixel(0, 0, Luma([255]));
        let very_off = GrayImage::from_pixel(32, 32, Luma([0]));

        assert!(ssim(&a, &slightly_off) > ssim(&a, &very_off));
    }

    #[test]
    fn window_shrinks_for_small_images() {
        let img = gradient(4, 30);
        let score = ssim(&img, &img);
        assert!((score - 1.0).abs() < 1e-9, "got {score}");
    }

    #[test]
    #[should_panic(expected = "equal dimensions")]
    fn mismatched_dimensions_panic() {
        let a = gradient(8, 8);
        let b = gradient(9, 8);
        ssim(&a, &b);
    }
}
