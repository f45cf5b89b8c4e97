pub mod decoder;
pub mod frame;

use std::path::Path;

use anyhow::Result;

use self::decoder::VideoDecoder;
use self::frame::Frame;
use crate::error::Error;

/// Supplies frames by wall-clock position. The production
/// implementation shells out to ffmpeg; tests substitute synthetic
/// frames.
pub trait FrameSource {
    /// Fetch the frame nearest to `seconds` into the video.
    fn frame_at_time(&mut self, video: &Path, seconds: f64) -> Result<Frame>;
}

/// [`FrameSource`] backed by the ffmpeg CLI decoder.
pub struct FfmpegFrameSource;

impl FrameSource for FfmpegFrameSource {
    fn frame_at_time(&mut self, video: &Path, seconds: f64) -> Result<Frame> {
        let mut decoder = VideoDecoder::open_at_time(video, seconds)?;
        match decoder.next_frame()? {
            Some(frame) => Ok(frame),
            None => Err(Error::FrameNotFound {
                path: video.to_owned(),
                seconds,
            }
            .into()),
        }
    }
}
