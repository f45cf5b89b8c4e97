use image::RgbImage;
use tracing::debug;

use crate::analysis::CELL_COUNT;
use crate::config::profiles::CellGeometry;

/// Horizontal pixel span `[x_min, x_max)` of each digit cell within a
/// region of the given width.
///
/// Every boundary is rounded independently from the accumulated
/// fractions; summing already-rounded increments would let the error
/// compound across the row.
pub fn cell_bounds(region_width: u32, geom: &CellGeometry) -> [(u32, u32); CELL_COUNT] {
    let width = region_width as f64;
    std::array::from_fn(|i| {
        let start: f64 = (0..i).map(|j| geom.cell_width + geom.gaps[j]).sum();
        let x_min = (width * start).round() as u32;
        let x_max = (width * (start + geom.cell_width)).round() as u32;
        assert!(
            x_min < x_max && x_max <= region_width,
            "cell {i} span {x_min}..{x_max} exceeds region width {region_width}"
        );
        (x_min, x_max)
    })
}

/// Split a timecode region into its eight ordered glyph cells
/// (H,H,M,M,S,S,F,F). Each cell spans the full region height.
pub fn segment(region: &RgbImage, geom: &CellGeometry) -> [RgbImage; CELL_COUNT] {
    let bounds = cell_bounds(region.width(), geom);
    debug!(?bounds, region_width = region.width(), "region segmented");
    bounds.map(|(x_min, x_max)| {
        image::imageops::crop_imm(region, x_min, 0, x_max - x_min, region.height()).to_image()
    })
}
