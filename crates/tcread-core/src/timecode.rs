use std::fmt;

use crate::error::Error;

/// Frame rate assumed when converting a burned-in timecode to seconds.
///
/// Deliberately a fixed constant rather than the video's measured rate:
/// seeking uses the measured rate, while the overlays this tool reads
/// are authored against 25 fps. The asymmetry is carried over from the
/// original archival workflow.
pub const TIMECODE_FPS: f64 = 25.0;

/// A four-field HH:MM:SS:FF timecode as burned into a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timecode {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub frames: u32,
}

impl Timecode {
    /// Parse an `HH:MM:SS:FF` string.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let malformed = || Error::MalformedTimecode(text.to_owned());

        let parts: Vec<&str> = text.trim().split(':').collect();
        if parts.len() != 4 {
            return Err(malformed());
        }

        let mut fields = [0u32; 4];
        for (slot, part) in fields.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| malformed())?;
        }

        Ok(Self {
            hours: fields[0],
            minutes: fields[1],
            seconds: fields[2],
            frames: fields[3],
        })
    }

    /// Build a timecode from eight classified digits in overlay order
    /// (H,H,M,M,S,S,F,F).
    pub fn from_digits(digits: &[u8; 8]) -> Self {
        let pair = |i: usize| (digits[i] as u32) * 10 + digits[i + 1] as u32;
        Self {
            hours: pair(0),
            minutes: pair(2),
            seconds: pair(4),
            frames: pair(6),
        }
    }

    /// Elapsed seconds, assuming the fixed overlay rate of
    /// [`TIMECODE_FPS`].
    pub fn to_seconds(&self) -> f64 {
        (self.hours * 3600 + self.minutes * 60 + self.seconds) as f64
            + self.frames as f64 / TIMECODE_FPS
    }

    /// Reject field values no real timecode can carry. Hours are left
    /// unconstrained: archival reels use hour offsets freely, and two
    /// digits already bound them.
    pub fn validate(&self) -> Result<(), Error> {
        if self.minutes > 59 || self.seconds > 59 || self.frames >= TIMECODE_FPS as u32 {
            return Err(Error::ImplausibleTimecode(self.to_string()));
        }
        Ok(())
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds, self.frames
        )
    }
}

/// Join eight classified digits into the canonical `HH:MM:SS:FF` string.
pub fn assemble(digits: &[u8; 8]) -> String {
    Timecode::from_digits(digits).to_string()
}
