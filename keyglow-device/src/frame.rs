//! Full-surface bitmap frames
//!
//! The bitmap covers the lighting surface as a `FRAME_WIDTH x FRAME_HEIGHT`
//! grid. Each position takes 4 bytes in B, G, R, A order, row-major:
//! `offset = (x + y * FRAME_WIDTH) * 4`. Alpha is always written as 255.

use crate::error::SinkError;

/// Bitmap width in positions
pub const FRAME_WIDTH: usize = 21;

/// Bitmap height in positions
pub const FRAME_HEIGHT: usize = 6;

/// Bitmap size in bytes
pub const FRAME_LEN: usize = FRAME_WIDTH * FRAME_HEIGHT * 4;

/// A full-surface bitmap in BGRA byte layout
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: [u8; FRAME_LEN],
}

impl Default for Frame {
    fn default() -> Self {
        let mut frame = Self {
            bytes: [0; FRAME_LEN],
        };
        for px in frame.bytes.chunks_exact_mut(4) {
            px[3] = 255;
        }
        frame
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &FRAME_WIDTH)
            .field("height", &FRAME_HEIGHT)
            .finish_non_exhaustive()
    }
}

impl Frame {
    /// All-black frame
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a raw BGRA buffer
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SinkError> {
        let bytes: [u8; FRAME_LEN] = bytes.try_into().map_err(|_| SinkError::FrameSize {
            expected: FRAME_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self { bytes })
    }

    fn offset(x: usize, y: usize) -> Option<usize> {
        (x < FRAME_WIDTH && y < FRAME_HEIGHT).then(|| (x + y * FRAME_WIDTH) * 4)
    }

    /// Set the 8-bit color at `(x, y)`. Out-of-range positions are ignored.
    pub fn set(&mut self, x: usize, y: usize, r: u8, g: u8, b: u8) {
        if let Some(off) = Self::offset(x, y) {
            self.bytes[off] = b;
            self.bytes[off + 1] = g;
            self.bytes[off + 2] = r;
            self.bytes[off + 3] = 255;
        }
    }

    /// 8-bit `(r, g, b)` at `(x, y)`
    pub fn get(&self, x: usize, y: usize) -> Option<(u8, u8, u8)> {
        Self::offset(x, y).map(|off| (self.bytes[off + 2], self.bytes[off + 1], self.bytes[off]))
    }

    /// Raw BGRA bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}
