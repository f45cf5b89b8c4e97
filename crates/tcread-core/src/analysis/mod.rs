pub mod classify;
pub mod locate;
pub mod segment;
pub mod ssim;

/// Number of glyph cells in a timecode overlay (H,H,M,M,S,S,F,F).
pub const CELL_COUNT: usize = 8;
