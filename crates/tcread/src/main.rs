mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use tcread_core::analysis::classify::Classifier;
use tcread_core::batch::{self, BatchTable};
use tcread_core::config::profiles::ProfileRegistry;
use tcread_core::debug::DebugRenderer;
use tcread_core::digits::DigitSet;
use tcread_core::pipeline::{self, BatchConfig};
use tcread_core::timecode::Timecode;
use tcread_core::video::{FfmpegFrameSource, FrameSource};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = cli::Cli::parse();

    match cli.command {
        cli::Command::Read {
            video,
            time,
            source,
            digits,
            debug_frames,
        } => {
            let digit_set =
                DigitSet::load(&digits).context("failed to load reference digit set")?;
            let classifier = Classifier::new(digit_set);
            let profiles = ProfileRegistry::builtin();
            let profile = *profiles.get(&source)?;
            let mut frames = FfmpegFrameSource;

            let renderer = match &debug_frames {
                Some(dir) => {
                    std::fs::create_dir_all(dir)
                        .context("failed to create debug frames directory")?;
                    Some(DebugRenderer::new())
                }
                None => None,
            };

            for requested in &time {
                let at = Timecode::parse(requested)?;
                info!(%at, video = %video.display(), "extracting timecode");

                let frame = frames.frame_at_time(&video, at.to_seconds())?;
                let timecode = pipeline::extract_timecode(&frame.image, &profile, &classifier)?;

                if let (Some(renderer), Some(dir)) = (&renderer, &debug_frames) {
                    renderer.save_frame(&frame, &profile, Some(&timecode), dir)?;
                }

                println!("{requested} -> {timecode}");
            }

            Ok(())
        }

        cli::Command::Batch {
            input,
            output,
            digits,
            debug_frames,
        } => {
            info!(?input, ?output, "starting batch extraction");

            let digit_set =
                DigitSet::load(&digits).context("failed to load reference digit set")?;
            let classifier = Classifier::new(digit_set);
            let profiles = ProfileRegistry::builtin();
            let table = BatchTable::read(&input)?;
            let mut frames = FfmpegFrameSource;

            let config = BatchConfig {
                debug_frames_dir: debug_frames,
            };
            let outcome = pipeline::run_batch(&table, &mut frames, &classifier, &profiles, &config)
                .context("batch extraction failed")?;

            if outcome.rows.is_empty() {
                warn!("no rows were successfully extracted");
            }

            batch::write_output(&output, &outcome.headers, &outcome.rows)?;

            info!(
                written = outcome.rows.len(),
                skipped = outcome.skipped,
                ?output,
                "batch complete"
            );

            Ok(())
        }
    }
}
