use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use tracing::{debug, info, warn};

use crate::analysis::segment::cell_bounds;
use crate::config::profiles::SourceProfile;
use crate::timecode::Timecode;
use crate::video::frame::Frame;

/// Candidate monospace fonts for the text overlay, tried in order.
const FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "C:\\Windows\\Fonts\\consola.ttf",
];

const TEXT_SCALE: f32 = 28.0;
const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
const TEXT_LINE_HEIGHT: i32 = 30;

const REGION_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const CELL_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Renders frames annotated with the overlay region, the cell
/// boundaries and the recognized timecode.
pub struct DebugRenderer {
    font: Option<FontVec>,
}

impl DebugRenderer {
    pub fn new() -> Self {
        Self { font: load_font() }
    }

    pub fn save_frame(
        &self,
        frame: &Frame,
        profile: &SourceProfile,
        timecode: Option<&Timecode>,
        dir: &Path,
    ) -> Result<()> {
        let mut img = frame.image.clone();

        let bounds = profile
            .region
            .to_pixel_bounds(img.width(), img.height());
        draw_hollow_rect_mut(
            &mut img,
            Rect::at(bounds.x_min as i32, bounds.y_min as i32)
                .of_size(bounds.width(), bounds.height()),
            REGION_COLOR,
        );

        for (x_min, x_max) in cell_bounds(bounds.width(), &profile.cells) {
            let rect = Rect::at((bounds.x_min + x_min) as i32, bounds.y_min as i32)
                .of_size(x_max - x_min, bounds.height());
            draw_hollow_rect_mut(&mut img, rect, CELL_COLOR);
        }

        self.draw_text_overlay(&mut img, frame, timecode);

        let path = dir.join(format!("frame_{:08}.png", frame.frame_number));
        img.save(&path)
            .with_context(|| format!("failed to save debug frame to {}", path.display()))?;

        debug!(?path, "saved debug frame");
        Ok(())
    }

    fn draw_text_overlay(&self, img: &mut RgbImage, frame: &Frame, timecode: Option<&Timecode>) {
        let Some(font) = &self.font else { return };
        let scale = PxScale::from(TEXT_SCALE);
        let x = 10;
        let mut y = 10;

        let header = format!("F:{}", frame.frame_number);
        draw_text_mut(img, TEXT_COLOR, x, y, scale, font, &header);
        y += TEXT_LINE_HEIGHT;

        let tc_text = match timecode {
            Some(tc) => format!("TC:{tc}"),
            None => "TC:none".to_owned(),
        };
        draw_text_mut(img, TEXT_COLOR, x, y, scale, font, &tc_text);
    }
}

impl Default for DebugRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn load_font() -> Option<FontVec> {
    for path in FONT_PATHS {
        let Ok(data) = std::fs::read(path) else {
            continue;
        };
        match FontVec::try_from_vec(data) {
            Ok(font) => {
                info!(path, "loaded debug font");
                return Some(font);
            }
            Err(e) => warn!(path, error = %e, "failed to parse font file"),
        }
    }
    warn!("no monospace font found, debug text overlay disabled");
    None
}
