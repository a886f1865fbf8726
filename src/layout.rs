//! Physical key layout
//!
//! [`KeyMatrix`] places keys on a coarse grid of unit cells. Wide keys span
//! several cells (Space takes seven), so a key maps to a set of positions.

use std::sync::LazyLock;

use keyglow_device::{KeyMap, LogicalKey, FRAME_HEIGHT, FRAME_WIDTH};

/// Reference matrix width in cells
pub const MATRIX_WIDTH: usize = 22;

/// Reference matrix height in cells
pub const MATRIX_HEIGHT: usize = 6;

type Row = [Option<LogicalKey>; MATRIX_WIDTH];

/// Grid of key cells, `(x, y)` with `y = 0` the function row
#[derive(Debug, Clone)]
pub struct KeyMatrix {
    cells: [Row; MATRIX_HEIGHT],
    positions: KeyMap<Vec<(usize, usize)>>,
}

macro_rules! row {
    (@cell _) => { None };
    (@cell $key:ident) => { Some(LogicalKey::$key) };
    ($($cell:tt),* $(,)?) => {
        [$(row!(@cell $cell)),*]
    };
}

static REFERENCE: LazyLock<KeyMatrix> = LazyLock::new(|| {
    KeyMatrix::from_rows([
        row![
            Esc, _, F1, F2, F3, F4, F5, F6, F7, F8, _, F9, F10, F11, F12, PrintScreen, ScrollLock,
            Pause, _, _, _, _
        ],
        row![
            Grave, Digit1, Digit2, Digit3, Digit4, Digit5, Digit6, Digit7, Digit8, Digit9, Digit0,
            Minus, Equals, Backspace, Backspace, Insert, Home, PageUp, NumLock, NumSlash,
            NumAsterisk, NumMinus
        ],
        row![
            Tab, Tab, Q, W, E, R, T, Y, U, I, O, P, LeftBracket, RightBracket, Enter, Delete, End,
            PageDown, Num7, Num8, Num9, NumPlus
        ],
        row![
            CapsLock, CapsLock, A, S, D, F, G, H, J, K, L, Semicolon, Apostrophe, IsoHash, Enter,
            _, _, _, Num4, Num5, Num6, NumPlus
        ],
        row![
            LeftShift, IsoBackslash, Z, X, C, V, B, N, M, Comma, Period, Slash, RightShift,
            RightShift, RightShift, _, Up, _, Num1, Num2, Num3, NumEnter
        ],
        row![
            LeftCtrl, LeftWin, LeftAlt, Space, Space, Space, Space, Space, Space, Space, RightAlt,
            RightWin, Menu, RightCtrl, RightCtrl, Left, Down, Right, Num0, Num0, NumPeriod,
            NumEnter
        ],
    ])
});

impl KeyMatrix {
    /// Reference ISO full-size layout
    pub fn reference() -> &'static KeyMatrix {
        &REFERENCE
    }

    pub fn from_rows(cells: [Row; MATRIX_HEIGHT]) -> Self {
        let mut positions: KeyMap<Vec<(usize, usize)>> = KeyMap::default();
        // column-major so each key's positions come out sorted by x, then y
        for x in 0..MATRIX_WIDTH {
            for (y, row) in cells.iter().enumerate() {
                if let Some(key) = row[x] {
                    positions[key].push((x, y));
                }
            }
        }
        Self { cells, positions }
    }

    pub const fn width(&self) -> usize {
        MATRIX_WIDTH
    }

    pub const fn height(&self) -> usize {
        MATRIX_HEIGHT
    }

    /// Key occupying `(x, y)`, `None` for gaps and out-of-range cells
    pub fn key_at(&self, x: usize, y: usize) -> Option<LogicalKey> {
        self.cells.get(y).and_then(|row| row.get(x)).copied().flatten()
    }

    /// Signed variant of [`key_at`](Self::key_at) for walking off the edges
    pub fn key_at_signed(&self, x: i32, y: i32) -> Option<LogicalKey> {
        if x < 0 || y < 0 {
            return None;
        }
        self.key_at(x as usize, y as usize)
    }

    /// Cells covered by `key`, sorted by x then y. Empty if absent.
    pub fn positions(&self, key: LogicalKey) -> &[(usize, usize)] {
        &self.positions[key]
    }

    /// Distinct rows `key` spans, ascending
    pub fn rows(&self, key: LogicalKey) -> Vec<usize> {
        let mut rows: Vec<usize> = self.positions(key).iter().map(|&(_, y)| y).collect();
        rows.sort_unstable();
        rows.dedup();
        rows
    }

    /// Bitmap position used to sample a frame for `key`: the key's leftmost
    /// cell scaled from matrix to bitmap width.
    pub fn frame_position(&self, key: LogicalKey) -> Option<(usize, usize)> {
        self.positions(key).first().map(|&(x, y)| {
            (
                (x * FRAME_WIDTH / MATRIX_WIDTH).min(FRAME_WIDTH - 1),
                y.min(FRAME_HEIGHT - 1),
            )
        })
    }
}
