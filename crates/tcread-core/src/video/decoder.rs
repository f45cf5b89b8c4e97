use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};

use anyhow::{bail, Context, Result};
use image::RgbImage;
use tracing::{debug, error, info, warn};

use super::frame::Frame;

/// Upper bound on probed frame dimensions. Frame buffers and crops are
/// allocated from these numbers, so garbage metadata must not get past
/// the probe.
const MAX_DIMENSION: u32 = 8192;

/// Video metadata obtained by probing with ffprobe.
#[derive(Debug, Clone, Copy)]
struct ProbeResult {
    width: u32,
    height: u32,
    fps: f64,
}

fn probe(path: &Path) -> Result<ProbeResult> {
    info!(?path, "probing video metadata with ffprobe");

    let output = Command::new("ffprobe")
        .args([
            "-v", "error",
            "-select_streams", "v:0",
            "-show_entries", "stream=width,height,r_frame_rate",
            "-of", "csv=p=0",
        ])
        .arg(path)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .context("failed to run ffprobe — is ffmpeg installed?")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!(%stderr, ?path, "ffprobe failed");
        bail!("ffprobe failed: {stderr}");
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let info = parse_probe_output(&stdout)?;

    if info.fps <= 0.0 {
        warn!(fps = info.fps, ?path, "video has non-positive fps, seeking disabled");
    }

    info!(
        width = info.width,
        height = info.height,
        fps = info.fps,
        "probe completed"
    );
    Ok(info)
}

/// Parse ffprobe csv output of the form "width,height,num/den".
fn parse_probe_output(stdout: &str) -> Result<ProbeResult> {
    let parts: Vec<&str> = stdout.trim().split(',').collect();
    if parts.len() < 3 {
        bail!("unexpected ffprobe output: {stdout}");
    }

    let width: u32 = parts[0].parse().context("failed to parse width")?;
    let height: u32 = parts[1].parse().context("failed to parse height")?;

    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        bail!("implausible video dimensions: {width}x{height}");
    }

    let fps = if let Some((num, den)) = parts[2].split_once('/') {
        let num: f64 = num.parse().context("failed to parse fps numerator")?;
        let den: f64 = den.parse().context("failed to parse fps denominator")?;
        if den > 0.0 {
            num / den
        } else {
            0.0
        }
    } else {
        parts[2].parse().context("failed to parse fps")?
    };

    Ok(ProbeResult { width, height, fps })
}

/// Decodes video frames by piping raw RGB24 data from the ffmpeg CLI.
pub struct VideoDecoder {
    child: Child,
    width: u32,
    height: u32,
    fps: f64,
    start_frame: u32,
    frames_read: u32,
    frame_bytes: usize,
}

impl VideoDecoder {
    /// Open a video file and stream frames from the beginning.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("video file does not exist: {}", path.display());
        }
        let info = probe(path)?;
        Self::spawn(path, info, 0)
    }

    /// Open a video file positioned at the frame nearest to
    /// `target_seconds`.
    ///
    /// Seeking uses the video's measured frame rate
    /// (`target_frame = round(seconds * fps)`); the fixed rate assumed
    /// when decoding burned-in overlays plays no part here.
    pub fn open_at_time(path: &Path, target_seconds: f64) -> Result<Self> {
        if !path.exists() {
            bail!("video file does not exist: {}", path.display());
        }
        let info = probe(path)?;
        let start_frame = if info.fps > 0.0 {
            (target_seconds * info.fps).round() as u32
        } else {
            0
        };
        Self::spawn(path, info, start_frame)
    }

    fn spawn(path: &Path, info: ProbeResult, start_frame: u32) -> Result<Self> {
        info!(?path, start_frame, "spawning ffmpeg decoder process");

        let mut cmd = Command::new("ffmpeg");
        if start_frame > 0 && info.fps > 0.0 {
            // A seek before -i resolves to the requested frame after
            // keyframe decoding; expressed in seconds.
            cmd.args(["-ss", &format!("{:.6}", start_frame as f64 / info.fps)]);
        }
        let child = cmd
            .arg("-i")
            .arg(path)
            .args([
                "-f", "rawvideo",
                "-pix_fmt", "rgb24",
                "-v", "error",
                "pipe:1",
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .context("failed to spawn ffmpeg — is ffmpeg installed?")?;

        let frame_bytes = (info.width as usize) * (info.height as usize) * 3;

        info!(
            width = info.width,
            height = info.height,
            fps = info.fps,
            frame_bytes,
            "video decoder opened"
        );

        Ok(Self {
            child,
            width: info.width,
            height: info.height,
            fps: info.fps,
            start_frame,
            frames_read: 0,
            frame_bytes,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Read the next frame from the ffmpeg pipe, or `None` when the
    /// video is exhausted.
    pub fn next_frame(&mut self) -> Result<Option<Frame>> {
        let stdout = self
            .child
            .stdout
            .as_mut()
            .context("ffmpeg stdout not available")?;

        let mut buf = vec![0u8; self.frame_bytes];
        let mut read = 0;

        while read < self.frame_bytes {
            match stdout.read(&mut buf[read..]) {
                Ok(0) => {
                    if read == 0 {
                        info!(frames_read = self.frames_read, "video stream ended");
                        return Ok(None);
                    }
                    error!(
                        read_bytes = read,
                        expected_bytes = self.frame_bytes,
                        frame = self.frames_read,
                        "ffmpeg stream ended mid-frame"
                    );
                    bail!(
                        "ffmpeg stream ended mid-frame (read {read}/{} bytes)",
                        self.frame_bytes,
                    );
                }
                Ok(n) => read += n,
                Err(e) => {
                    error!(frame = self.frames_read, %e, "failed to read from ffmpeg pipe");
                    return Err(e).context("failed to read from ffmpeg pipe");
                }
            }
        }

        let image = RgbImage::from_raw(self.width, self.height, buf)
            .context("failed to create RgbImage from raw frame data")?;

        let frame_number = self.start_frame + self.frames_read;
        let timestamp_seconds = if self.fps > 0.0 {
            frame_number as f64 / self.fps
        } else {
            0.0
        };
        self.frames_read += 1;

        debug!(frame_number, timestamp_seconds, "decoded frame");

        Ok(Some(Frame {
            image,
            frame_number,
            timestamp_seconds,
        }))
    }
}

impl Drop for VideoDecoder {
    fn drop(&mut self) {
        info!(frames_read = self.frames_read, "closing video decoder");
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rational_frame_rate() {
        let info = parse_probe_output("1920,1080,30000/1001\n").unwrap();
        assert_eq!(info.width, 1920);
        assert_eq!(info.height, 1080);
        assert!((info.fps - 29.97).abs() < 0.01);
    }

    #[test]
    fn parses_plain_frame_rate() {
        let info = parse_probe_output("1280,720,25/1").unwrap();
        assert!((info.fps - 25.0).abs() < 1e-9);
    }

    #[test]
    fn zero_denominator_disables_timestamps() {
        let info = parse_probe_output("640,480,0/0").unwrap();
        assert_eq!(info.fps, 0.0);
    }

    #[test]
    fn rejects_garbage_output() {
        assert!(parse_probe_output("").is_err());
        assert!(parse_probe_output("not,a,number").is_err());
    }

    #[test]
    fn rejects_implausible_dimensions() {
        assert!(parse_probe_output("99999,1080,25/1").is_err());
        assert!(parse_probe_output("0,1080,25/1").is_err());
    }
}
