use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tcread", about = "Read burned-in timecodes from video frames")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Read the burned-in timecode at one or more positions in a video.
    Read {
        /// Path to the video file.
        #[arg(short, long)]
        video: PathBuf,

        /// Position(s) to sample, as HH:MM:SS:FF timecodes.
        #[arg(short, long, required = true, num_args = 1..)]
        time: Vec<String>,

        /// Source profile describing the overlay geometry.
        #[arg(short, long, default_value = "Nat Geo")]
        source: String,

        /// Directory holding the reference digit images (0-9).
        #[arg(short, long, default_value = "digits")]
        digits: PathBuf,

        /// Directory to save annotated debug frames.
        #[arg(long)]
        debug_frames: Option<PathBuf>,
    },

    /// Extract Source In/Out timecodes for every row of an EDL-style CSV.
    Batch {
        /// Path to the input CSV file.
        #[arg(short, long)]
        input: PathBuf,

        /// Path to write the augmented CSV file.
        #[arg(short, long)]
        output: PathBuf,

        /// Directory holding the reference digit images (0-9).
        #[arg(short, long, default_value = "digits")]
        digits: PathBuf,

        /// Directory to save annotated debug frames.
        #[arg(long)]
        debug_frames: Option<PathBuf>,
    },
}
