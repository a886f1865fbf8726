//! Logical key set
//!
//! A [`LogicalKey`] names a physical key position on an ISO full-size board,
//! independent of scan codes or OS virtual-key codes. The set is closed and
//! shared by every component; [`KeyMap`] is a dense table over it.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

macro_rules! logical_keys {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// One physical key position
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        pub enum LogicalKey {
            $($variant),+
        }

        impl LogicalKey {
            /// Every key, in declaration order (`ALL[k.index()] == k`)
            pub const ALL: &'static [LogicalKey] = &[$(LogicalKey::$variant),+];

            /// Canonical display name
            pub const fn name(self) -> &'static str {
                match self {
                    $(LogicalKey::$variant => $name),+
                }
            }
        }
    };
}

logical_keys! {
    // Function row
    Esc => "Esc",
    F1 => "F1",
    F2 => "F2",
    F3 => "F3",
    F4 => "F4",
    F5 => "F5",
    F6 => "F6",
    F7 => "F7",
    F8 => "F8",
    F9 => "F9",
    F10 => "F10",
    F11 => "F11",
    F12 => "F12",
    PrintScreen => "PrtSc",
    ScrollLock => "ScrLk",
    Pause => "Pause",
    // Number row
    Grave => "`",
    Digit1 => "1",
    Digit2 => "2",
    Digit3 => "3",
    Digit4 => "4",
    Digit5 => "5",
    Digit6 => "6",
    Digit7 => "7",
    Digit8 => "8",
    Digit9 => "9",
    Digit0 => "0",
    Minus => "-",
    Equals => "=",
    Backspace => "Bksp",
    Insert => "Ins",
    Home => "Home",
    PageUp => "PgUp",
    NumLock => "NumLk",
    NumSlash => "Num/",
    NumAsterisk => "Num*",
    NumMinus => "Num-",
    // Top letter row
    Tab => "Tab",
    Q => "Q",
    W => "W",
    E => "E",
    R => "R",
    T => "T",
    Y => "Y",
    U => "U",
    I => "I",
    O => "O",
    P => "P",
    LeftBracket => "[",
    RightBracket => "]",
    Delete => "Del",
    End => "End",
    PageDown => "PgDn",
    Num7 => "Num7",
    Num8 => "Num8",
    Num9 => "Num9",
    NumPlus => "Num+",
    // Home row
    CapsLock => "Caps",
    A => "A",
    S => "S",
    D => "D",
    F => "F",
    G => "G",
    H => "H",
    J => "J",
    K => "K",
    L => "L",
    Semicolon => ";",
    Apostrophe => "'",
    IsoHash => "#",
    Enter => "Enter",
    Num4 => "Num4",
    Num5 => "Num5",
    Num6 => "Num6",
    // Bottom letter row
    LeftShift => "LShift",
    IsoBackslash => "\\",
    Z => "Z",
    X => "X",
    C => "C",
    V => "V",
    B => "B",
    N => "N",
    M => "M",
    Comma => ",",
    Period => ".",
    Slash => "/",
    RightShift => "RShift",
    Up => "Up",
    Num1 => "Num1",
    Num2 => "Num2",
    Num3 => "Num3",
    NumEnter => "NumEnter",
    // Modifier row
    LeftCtrl => "LCtrl",
    LeftWin => "LWin",
    LeftAlt => "LAlt",
    Space => "Space",
    RightAlt => "RAlt",
    RightWin => "RWin",
    Menu => "Menu",
    RightCtrl => "RCtrl",
    Left => "Left",
    Down => "Down",
    Right => "Right",
    Num0 => "Num0",
    NumPeriod => "Num.",
}

impl LogicalKey {
    /// Number of logical keys
    pub const COUNT: usize = Self::ALL.len();

    /// Dense index in `0..COUNT`
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Key at a dense index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for LogicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown key name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown key name: {0}")]
pub struct ParseKeyError(pub String);

impl FromStr for LogicalKey {
    type Err = ParseKeyError;

    /// Parse a key name, case-insensitively. Accepts the canonical names
    /// plus common aliases.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let canonical = match name.to_ascii_lowercase().as_str() {
            "escape" => "Esc",
            "printscreen" | "print" | "prtscr" => "PrtSc",
            "scrolllock" | "scroll" => "ScrLk",
            "break" | "pausebreak" => "Pause",
            "grave" | "backtick" | "tilde" => "`",
            "minus" => "-",
            "equal" | "equals" => "=",
            "backspace" | "bs" => "Bksp",
            "insert" => "Ins",
            "pageup" | "page_up" => "PgUp",
            "pagedown" | "page_down" | "pgdown" => "PgDn",
            "numlock" => "NumLk",
            "leftbracket" | "lbracket" => "[",
            "rightbracket" | "rbracket" => "]",
            "delete" => "Del",
            "capslock" | "capslk" => "Caps",
            "semicolon" => ";",
            "apostrophe" | "quote" => "'",
            "hash" | "nonushash" => "#",
            "return" | "ret" => "Enter",
            "lshift" | "leftshift" | "left_shift" => "LShift",
            "rshift" | "rightshift" | "right_shift" => "RShift",
            "backslash" | "nonusbackslash" | "lessgreater" => "\\",
            "comma" => ",",
            "period" | "dot" => ".",
            "slash" => "/",
            "up" | "uparrow" => "Up",
            "down" | "downarrow" => "Down",
            "left" | "leftarrow" => "Left",
            "right" | "rightarrow" => "Right",
            "lctrl" | "leftctrl" | "left_ctrl" => "LCtrl",
            "rctrl" | "rightctrl" | "right_ctrl" => "RCtrl",
            "lalt" | "leftalt" | "left_alt" => "LAlt",
            "ralt" | "rightalt" | "right_alt" | "altgr" => "RAlt",
            "lwin" | "leftwin" | "super" | "lsuper" | "meta" => "LWin",
            "rwin" | "rightwin" | "rsuper" => "RWin",
            "menu" | "app" | "apps" | "context" => "Menu",
            "spacebar" | "spc" => "Space",
            "kpenter" | "numpadenter" => "NumEnter",
            _ => "",
        };

        let search = if canonical.is_empty() {
            name
        } else {
            canonical
        };

        Self::ALL
            .iter()
            .copied()
            .find(|key| key.name().eq_ignore_ascii_case(search))
            .ok_or_else(|| ParseKeyError(name.to_string()))
    }
}

impl Serialize for LogicalKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for LogicalKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}

/// Dense per-key table; every key always has a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap<T>([T; LogicalKey::COUNT]);

impl<T> KeyMap<T> {
    /// Build a map by evaluating `f` for every key
    pub fn from_fn(mut f: impl FnMut(LogicalKey) -> T) -> Self {
        Self(std::array::from_fn(|i| f(LogicalKey::ALL[i])))
    }

    /// Iterate `(key, value)` pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (LogicalKey, &T)> {
        LogicalKey::ALL.iter().copied().zip(self.0.iter())
    }

    /// Iterate values mutably in key order
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.0.iter_mut()
    }
}

impl<T: Clone> KeyMap<T> {
    /// Map with every key set to `value`
    pub fn filled(value: T) -> Self {
        Self::from_fn(|_| value.clone())
    }
}

impl<T: Default> Default for KeyMap<T> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<T> Index<LogicalKey> for KeyMap<T> {
    type Output = T;

    fn index(&self, key: LogicalKey) -> &T {
        &self.0[key.index()]
    }
}

impl<T> IndexMut<LogicalKey> for KeyMap<T> {
    fn index_mut(&mut self, key: LogicalKey) -> &mut T {
        &mut self.0[key.index()]
    }
}
