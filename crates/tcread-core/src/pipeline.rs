use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::RgbImage;
use tracing::{debug, info, warn};

use crate::analysis::classify::Classifier;
use crate::analysis::locate::locate;
use crate::analysis::segment::segment;
use crate::batch::{self, BatchTable};
use crate::config::profiles::{ProfileRegistry, SourceProfile};
use crate::debug::DebugRenderer;
use crate::error::Error;
use crate::timecode::Timecode;
use crate::video::FrameSource;

/// Parameters for a batch extraction run.
#[derive(Default)]
pub struct BatchConfig {
    /// Directory to write annotated debug frames, or None to skip.
    pub debug_frames_dir: Option<PathBuf>,
}

/// Outcome of a batch run: the augmented table plus how many rows were
/// dropped.
pub struct BatchOutcome {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub skipped: usize,
}

/// Read the burned-in timecode from a single frame.
pub fn extract_timecode(
    frame: &RgbImage,
    profile: &SourceProfile,
    classifier: &Classifier,
) -> Result<Timecode, Error> {
    let region = locate(frame, &profile.region);
    let cells = segment(&region, &profile.cells);
    let digits = classifier.read_cells(&cells)?;
    let timecode = Timecode::from_digits(&digits);
    timecode.validate()?;
    debug!(%timecode, "timecode extracted");
    Ok(timecode)
}

/// Run batch extraction over an input table.
///
/// Every failure is per-row: the offending row is logged and skipped
/// while the rest of the batch continues. Output rows keep the input
/// columns and append `Source In` / `Source Out`.
pub fn run_batch(
    table: &BatchTable,
    source: &mut dyn FrameSource,
    classifier: &Classifier,
    profiles: &ProfileRegistry,
    config: &BatchConfig,
) -> Result<BatchOutcome> {
    let debug_renderer = match &config.debug_frames_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).with_context(|| {
                format!("failed to create debug frames directory {}", dir.display())
            })?;
            info!(?dir, "debug frames directory ready");
            Some(DebugRenderer::new())
        }
        None => None,
    };

    let mut headers = table.headers().to_vec();
    headers.push(batch::COL_SOURCE_IN.to_owned());
    headers.push(batch::COL_SOURCE_OUT.to_owned());

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut skipped = 0usize;

    for row in 0..table.row_count() {
        match extract_row(table, row, source, classifier, profiles, &debug_renderer, config) {
            Ok((source_in, source_out)) => {
                let mut out_row = table.row(row).to_vec();
                out_row.push(source_in);
                out_row.push(source_out);
                rows.push(out_row);
            }
            Err(e) => {
                warn!(row, error = format!("{e:#}"), "skipping row");
                skipped += 1;
            }
        }
    }

    info!(written = rows.len(), skipped, "batch extraction complete");
    Ok(BatchOutcome {
        headers,
        rows,
        skipped,
    })
}

fn extract_row(
    table: &BatchTable,
    row: usize,
    source: &mut dyn FrameSource,
    classifier: &Classifier,
    profiles: &ProfileRegistry,
    debug_renderer: &Option<DebugRenderer>,
    config: &BatchConfig,
) -> Result<(String, String)> {
    let video = PathBuf::from(table.require(row, batch::COL_SEQUENCE_NAME)?);
    let seq_in = Timecode::parse(table.require(row, batch::COL_SEQUENCE_IN)?)?;
    let seq_out = Timecode::parse(table.require(row, batch::COL_SEQUENCE_OUT)?)?;
    let reel = table.require(row, batch::COL_SOURCE_REEL)?;

    let profile = match profiles.get(reel) {
        Ok(profile) => profile,
        Err(e) => {
            warn!(
                row,
                reel,
                options = ?profiles.names().collect::<Vec<_>>(),
                "unrecognized source reel"
            );
            return Err(e.into());
        }
    };

    info!(row, video = %video.display(), %seq_in, %seq_out, reel, "extracting row");

    let source_in = extract_at(&video, seq_in, profile, source, classifier, debug_renderer, config)?;
    let source_out = extract_at(&video, seq_out, profile, source, classifier, debug_renderer, config)?;

    Ok((source_in.to_string(), source_out.to_string()))
}

fn extract_at(
    video: &Path,
    at: Timecode,
    profile: &SourceProfile,
    source: &mut dyn FrameSource,
    classifier: &Classifier,
    debug_renderer: &Option<DebugRenderer>,
    config: &BatchConfig,
) -> Result<Timecode> {
    let frame = source.frame_at_time(video, at.to_seconds())?;
    let timecode = extract_timecode(&frame.image, profile, classifier)?;
    info!(frame_number = frame.frame_number, %at, %timecode, "timecode read");

    if let (Some(renderer), Some(dir)) = (debug_renderer, &config.debug_frames_dir) {
        renderer
            .save_frame(&frame, profile, Some(&timecode), dir)
            .context("failed to save debug frame")?;
    }

    Ok(timecode)
}
