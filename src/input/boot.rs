//! USB HID boot-protocol keyboard reports
//!
//! Report layout: `[modifiers, reserved, key1..key6]`. Modifier bits are
//! LCtrl, LShift, LAlt, LGui, RCtrl, RShift, RAlt, RGui from bit 0 up. Key
//! bytes are usage IDs from the keyboard page; usages name US positions,
//! which is also how [`LogicalKey`] names keys.

use keyglow_device::LogicalKey;

/// Boot report length in bytes
pub const BOOT_REPORT_LEN: usize = 8;

const MODIFIERS: [LogicalKey; 8] = [
    LogicalKey::LeftCtrl,
    LogicalKey::LeftShift,
    LogicalKey::LeftAlt,
    LogicalKey::LeftWin,
    LogicalKey::RightCtrl,
    LogicalKey::RightShift,
    LogicalKey::RightAlt,
    LogicalKey::RightWin,
];

/// Logical key for a keyboard-page usage ID
pub fn usage_to_key(usage: u8) -> Option<LogicalKey> {
    use LogicalKey::*;
    const LETTERS: [LogicalKey; 26] = [
        A, B, C, D, E, F, G, H, I, J, K, L, M, N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    ];
    const DIGITS: [LogicalKey; 10] = [
        Digit1, Digit2, Digit3, Digit4, Digit5, Digit6, Digit7, Digit8, Digit9, Digit0,
    ];
    const FKEYS: [LogicalKey; 12] = [F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12];
    const NUMPAD: [LogicalKey; 10] = [Num1, Num2, Num3, Num4, Num5, Num6, Num7, Num8, Num9, Num0];

    let key = match usage {
        0x04..=0x1D => LETTERS[(usage - 0x04) as usize],
        0x1E..=0x27 => DIGITS[(usage - 0x1E) as usize],
        0x28 => Enter,
        0x29 => Esc,
        0x2A => Backspace,
        0x2B => Tab,
        0x2C => Space,
        0x2D => Minus,
        0x2E => Equals,
        0x2F => LeftBracket,
        0x30 => RightBracket,
        // ANSI backslash sits where ISO boards put the hash key
        0x31 | 0x32 => IsoHash,
        0x33 => Semicolon,
        0x34 => Apostrophe,
        0x35 => Grave,
        0x36 => Comma,
        0x37 => Period,
        0x38 => Slash,
        0x39 => CapsLock,
        0x3A..=0x45 => FKEYS[(usage - 0x3A) as usize],
        0x46 => PrintScreen,
        0x47 => ScrollLock,
        0x48 => Pause,
        0x49 => Insert,
        0x4A => Home,
        0x4B => PageUp,
        0x4C => Delete,
        0x4D => End,
        0x4E => PageDown,
        0x4F => Right,
        0x50 => Left,
        0x51 => Down,
        0x52 => Up,
        0x53 => NumLock,
        0x54 => NumSlash,
        0x55 => NumAsterisk,
        0x56 => NumMinus,
        0x57 => NumPlus,
        0x58 => NumEnter,
        0x59..=0x62 => NUMPAD[(usage - 0x59) as usize],
        0x63 => NumPeriod,
        0x64 => IsoBackslash,
        0x65 => Menu,
        _ => return None,
    };
    Some(key)
}

/// Keys held according to a boot report. Short reports yield nothing;
/// rollover error reports (usage 0x01 in every slot) are ignored.
pub fn boot_report_keys(report: &[u8]) -> Vec<LogicalKey> {
    if report.len() < BOOT_REPORT_LEN {
        return Vec::new();
    }
    let slots = &report[2..BOOT_REPORT_LEN];
    if slots.iter().all(|&u| u == 0x01) {
        return Vec::new();
    }
    let mut keys: Vec<LogicalKey> = MODIFIERS
        .iter()
        .enumerate()
        .filter(|(bit, _)| report[0] & (1 << bit) != 0)
        .map(|(_, &k)| k)
        .collect();
    keys.extend(slots.iter().filter_map(|&u| usage_to_key(u)));
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_table_edges() {
        assert_eq!(usage_to_key(0x04), Some(LogicalKey::A));
        assert_eq!(usage_to_key(0x1D), Some(LogicalKey::Z));
        assert_eq!(usage_to_key(0x27), Some(LogicalKey::Digit0));
        assert_eq!(usage_to_key(0x45), Some(LogicalKey::F12));
        assert_eq!(usage_to_key(0x62), Some(LogicalKey::Num0));
        assert_eq!(usage_to_key(0x00), None);
        assert_eq!(usage_to_key(0xE0), None);
    }

    #[test]
    fn test_boot_report() {
        // RAlt + 'q' + '1'
        let report = [0b0100_0000, 0, 0x14, 0x1E, 0, 0, 0, 0];
        assert_eq!(
            boot_report_keys(&report),
            vec![LogicalKey::RightAlt, LogicalKey::Q, LogicalKey::Digit1]
        );
    }

    #[test]
    fn test_rollover_and_short_reports() {
        assert!(boot_report_keys(&[0x02, 0, 1, 1, 1, 1, 1, 1]).is_empty());
        assert!(boot_report_keys(&[0x02, 0, 0x04]).is_empty());
    }
}
