use std::path::PathBuf;

use thiserror::Error;

/// Failures produced by the timecode extraction pipeline.
///
/// Batch processing treats every variant as a per-row failure: the row
/// is logged and skipped while the rest of the batch continues.
#[derive(Debug, Error)]
pub enum Error {
    /// The source name does not resolve to any registered overlay geometry.
    #[error("unknown source profile: {0:?}")]
    UnknownProfile(String),

    /// The requested position lies past the end of the video, or the
    /// decoder produced no frame.
    #[error("no frame at {seconds:.3}s in {path}")]
    FrameNotFound { path: PathBuf, seconds: f64 },

    /// A glyph cell produced no similarity evidence for any digit.
    /// Distinct from a genuine digit 0.
    #[error("no recognizable glyph in cell")]
    ClassificationAmbiguous,

    /// An assembled timecode carries a field outside its valid range.
    #[error("implausible timecode: {0}")]
    ImplausibleTimecode(String),

    /// A timecode string does not have the HH:MM:SS:FF shape.
    #[error("malformed timecode: {0:?}")]
    MalformedTimecode(String),

    /// A batch row is missing a required column.
    #[error("row {row}: missing required column {column:?}")]
    MalformedRow { row: usize, column: String },
}
