//! Full-surface color snapshots

use keyglow_device::{Frame, FRAME_HEIGHT, FRAME_WIDTH};

use crate::color::Color;

/// One color per bitmap position, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorGrid {
    cells: [[Color; FRAME_WIDTH]; FRAME_HEIGHT],
}

impl Default for ColorGrid {
    fn default() -> Self {
        Self::filled(Color::BLACK)
    }
}

impl ColorGrid {
    pub const WIDTH: usize = FRAME_WIDTH;
    pub const HEIGHT: usize = FRAME_HEIGHT;

    pub fn filled(color: Color) -> Self {
        Self {
            cells: [[color; FRAME_WIDTH]; FRAME_HEIGHT],
        }
    }

    /// Build a grid by evaluating `f(x, y)` at every position
    pub fn from_fn(mut f: impl FnMut(usize, usize) -> Color) -> Self {
        let mut grid = Self::default();
        for (y, row) in grid.cells.iter_mut().enumerate() {
            for (x, cell) in row.iter_mut().enumerate() {
                *cell = f(x, y);
            }
        }
        grid
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Color> {
        self.cells.get(y).and_then(|row| row.get(x)).copied()
    }

    /// Out-of-range positions are ignored
    pub fn set(&mut self, x: usize, y: usize, color: Color) {
        if let Some(cell) = self.cells.get_mut(y).and_then(|row| row.get_mut(x)) {
            *cell = color;
        }
    }

    /// Encode as a BGRA bitmap with full 8-bit channels
    pub fn to_frame(&self) -> Frame {
        let mut frame = Frame::new();
        for (y, row) in self.cells.iter().enumerate() {
            for (x, c) in row.iter().enumerate() {
                frame.set(x, y, c.r, c.g, c.b);
            }
        }
        frame
    }
}
