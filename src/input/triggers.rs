//! Raw code to logical key mapping
//!
//! A key may need several raw codes held at once (AltGr reports Ctrl + Alt
//! codes), and one code may belong to several keys. Two rules resolve the
//! overlap when polling:
//!
//! - A key whose codes are a strict subset of another satisfied key's codes
//!   is shadowed by it (RightAlt hides LeftCtrl).
//! - A key registered as indistinguishable from another with the same codes
//!   is never reported (NumEnter behind Enter).

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, LazyLock};

use keyglow_device::LogicalKey;

use crate::error::{Error, Result};

/// Immutable bidirectional key/code table
#[derive(Debug, Clone)]
pub struct TriggerTable {
    triggers: BTreeMap<LogicalKey, BTreeSet<u8>>,
    by_code: BTreeMap<u8, Vec<LogicalKey>>,
    /// key -> keys whose trigger set strictly contains it
    shadowed_by: BTreeMap<LogicalKey, Vec<LogicalKey>>,
    /// suppressed key -> key reported instead
    suppressed: BTreeMap<LogicalKey, LogicalKey>,
}

#[derive(Debug, Default, Clone)]
pub struct TriggerTableBuilder {
    triggers: BTreeMap<LogicalKey, BTreeSet<u8>>,
    suppressed: BTreeMap<LogicalKey, LogicalKey>,
}

impl TriggerTableBuilder {
    /// Register `key` as triggered by all of `codes`. Re-registering
    /// replaces the previous set.
    pub fn key(mut self, key: LogicalKey, codes: &[u8]) -> Self {
        self.triggers.insert(key, codes.iter().copied().collect());
        self
    }

    /// Mark `key` as indistinguishable from `preferred`: whenever both match,
    /// only `preferred` is reported.
    pub fn indistinguishable(mut self, key: LogicalKey, preferred: LogicalKey) -> Self {
        self.suppressed.insert(key, preferred);
        self
    }

    /// Validate and build the table
    pub fn build(self) -> Result<TriggerTable> {
        for (&key, codes) in &self.triggers {
            if codes.is_empty() {
                return Err(Error::EmptyTrigger(key));
            }
        }
        let keys: Vec<_> = self.triggers.iter().collect();
        for (i, (&a, codes_a)) in keys.iter().enumerate() {
            for (&b, codes_b) in &keys[i + 1..] {
                let resolved = self.suppressed.get(&a) == Some(&b) || self.suppressed.get(&b) == Some(&a);
                if codes_a == codes_b && !resolved {
                    return Err(Error::AmbiguousTrigger { first: a, second: b });
                }
            }
        }
        Ok(self.build_unchecked())
    }

    fn build_unchecked(self) -> TriggerTable {
        let mut by_code: BTreeMap<u8, Vec<LogicalKey>> = BTreeMap::new();
        for (&key, codes) in &self.triggers {
            for &code in codes {
                by_code.entry(code).or_default().push(key);
            }
        }

        let mut shadowed_by: BTreeMap<LogicalKey, Vec<LogicalKey>> = BTreeMap::new();
        for (&short, short_codes) in &self.triggers {
            for (&long, long_codes) in &self.triggers {
                if short_codes.len() < long_codes.len() && short_codes.is_subset(long_codes) {
                    shadowed_by.entry(short).or_default().push(long);
                }
            }
        }

        TriggerTable {
            triggers: self.triggers,
            by_code,
            shadowed_by,
            suppressed: self.suppressed,
        }
    }
}

// Windows virtual-key codes as reported on a French AZERTY ISO layout.
// Keys are named by physical position, so `Q` carries the 'A' code.
const REFERENCE: &[(LogicalKey, &[u8])] = {
    use LogicalKey::*;
    &[
        (Esc, &[27]),
        (F1, &[112]),
        (F2, &[113]),
        (F3, &[114]),
        (F4, &[115]),
        (F5, &[116]),
        (F6, &[117]),
        (F7, &[118]),
        (F8, &[119]),
        (F9, &[120]),
        (F10, &[121]),
        (F11, &[122]),
        (F12, &[123]),
        (PrintScreen, &[44]),
        (ScrollLock, &[145]),
        (Pause, &[19]),
        (Grave, &[222]),
        (Digit1, &[49]),
        (Digit2, &[50]),
        (Digit3, &[51]),
        (Digit4, &[52]),
        (Digit5, &[53]),
        (Digit6, &[54]),
        (Digit7, &[55]),
        (Digit8, &[56]),
        (Digit9, &[57]),
        (Digit0, &[48]),
        (Minus, &[219]),
        (Equals, &[187]),
        (Backspace, &[8]),
        (Insert, &[45]),
        (Home, &[36]),
        (PageUp, &[33]),
        (NumLock, &[144]),
        (NumSlash, &[111]),
        (NumAsterisk, &[106]),
        (NumMinus, &[109]),
        (Tab, &[9]),
        (Q, &[65]),
        (W, &[90]),
        (E, &[69]),
        (R, &[82]),
        (T, &[84]),
        (Y, &[89]),
        (U, &[85]),
        (I, &[73]),
        (O, &[79]),
        (P, &[80]),
        (LeftBracket, &[221]),
        (RightBracket, &[186]),
        (Delete, &[46]),
        (End, &[35]),
        (PageDown, &[34]),
        (Num7, &[103]),
        (Num8, &[104]),
        (Num9, &[105]),
        (NumPlus, &[107]),
        (CapsLock, &[20]),
        (A, &[81]),
        (S, &[83]),
        (D, &[68]),
        (F, &[70]),
        (G, &[71]),
        (H, &[72]),
        (J, &[74]),
        (K, &[75]),
        (L, &[76]),
        (Semicolon, &[77]),
        (Apostrophe, &[192]),
        (IsoHash, &[220]),
        (Enter, &[13]),
        (Num4, &[100]),
        (Num5, &[101]),
        (Num6, &[102]),
        (LeftShift, &[16, 160]),
        (IsoBackslash, &[226]),
        (Z, &[87]),
        (X, &[88]),
        (C, &[67]),
        (V, &[86]),
        (B, &[66]),
        (N, &[78]),
        (M, &[188]),
        (Comma, &[190]),
        (Period, &[191]),
        (Slash, &[223]),
        (RightShift, &[16, 161]),
        (Up, &[38]),
        (Num1, &[97]),
        (Num2, &[98]),
        (Num3, &[99]),
        (NumEnter, &[13]),
        (LeftCtrl, &[17, 162]),
        (LeftWin, &[91]),
        (LeftAlt, &[18, 164]),
        (Space, &[32]),
        (RightAlt, &[17, 18, 162, 165]),
        (RightWin, &[92]),
        (Menu, &[93]),
        (RightCtrl, &[17, 163]),
        (Left, &[37]),
        (Down, &[40]),
        (Right, &[39]),
        (Num0, &[96]),
        (NumPeriod, &[110]),
    ]
};

fn reference_builder() -> TriggerTableBuilder {
    REFERENCE
        .iter()
        .fold(TriggerTable::builder(), |b, &(key, codes)| b.key(key, codes))
        .indistinguishable(LogicalKey::NumEnter, LogicalKey::Enter)
}

static REFERENCE_TABLE: LazyLock<Arc<TriggerTable>> =
    LazyLock::new(|| Arc::new(reference_builder().build_unchecked()));

impl TriggerTable {
    pub fn builder() -> TriggerTableBuilder {
        TriggerTableBuilder::default()
    }

    /// Shared table for the reference layout
    pub fn reference() -> Arc<TriggerTable> {
        Arc::clone(&REFERENCE_TABLE)
    }

    /// Codes that must all be down for `key`
    pub fn codes(&self, key: LogicalKey) -> Option<&BTreeSet<u8>> {
        self.triggers.get(&key)
    }

    /// Keys whose trigger set contains `code`
    pub fn keys_for_code(&self, code: u8) -> &[LogicalKey] {
        self.by_code.get(&code).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every code used by some key, ascending
    pub fn codes_in_use(&self) -> impl Iterator<Item = u8> + '_ {
        self.by_code.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LogicalKey, &BTreeSet<u8>)> {
        self.triggers.iter().map(|(&k, c)| (k, c))
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// Key reported instead of `key`, if it is marked indistinguishable
    pub fn suppressed_by(&self, key: LogicalKey) -> Option<LogicalKey> {
        self.suppressed.get(&key).copied()
    }

    /// Logical keys pressed given the set of down codes, after shadowing and
    /// suppression.
    pub fn resolve(&self, down: &BTreeSet<u8>) -> BTreeSet<LogicalKey> {
        let satisfied: BTreeSet<LogicalKey> = self
            .triggers
            .iter()
            .filter(|(_, codes)| codes.is_subset(down))
            .map(|(&k, _)| k)
            .collect();

        satisfied
            .iter()
            .copied()
            .filter(|key| {
                let shadowed = self
                    .shadowed_by
                    .get(key)
                    .is_some_and(|longer| longer.iter().any(|l| satisfied.contains(l)));
                let suppressed = self
                    .suppressed
                    .get(key)
                    .is_some_and(|preferred| satisfied.contains(preferred));
                !shadowed && !suppressed
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(codes: &[u8]) -> BTreeSet<u8> {
        codes.iter().copied().collect()
    }

    #[test]
    fn test_reference_is_valid_and_complete() {
        let table = reference_builder().build().unwrap();
        assert_eq!(table.len(), LogicalKey::COUNT);
        for &key in LogicalKey::ALL {
            assert!(table.codes(key).is_some(), "{key} has no trigger");
        }
    }

    #[test]
    fn test_right_alt_shadows_left_ctrl() {
        let table = TriggerTable::reference();
        let pressed = table.resolve(&down(&[17, 18, 162, 165]));
        assert!(pressed.contains(&LogicalKey::RightAlt));
        assert!(!pressed.contains(&LogicalKey::LeftCtrl));
    }

    #[test]
    fn test_left_ctrl_alone() {
        let table = TriggerTable::reference();
        let pressed = table.resolve(&down(&[17, 162]));
        assert_eq!(pressed.into_iter().collect::<Vec<_>>(), vec![LogicalKey::LeftCtrl]);
    }

    #[test]
    fn test_num_enter_suppressed() {
        let table = TriggerTable::reference();
        let pressed = table.resolve(&down(&[13]));
        assert_eq!(pressed.into_iter().collect::<Vec<_>>(), vec![LogicalKey::Enter]);
        assert_eq!(table.suppressed_by(LogicalKey::NumEnter), Some(LogicalKey::Enter));
    }

    #[test]
    fn test_partial_chord_not_pressed() {
        let table = TriggerTable::reference();
        // generic shift code alone matches neither shift key
        assert!(table.resolve(&down(&[16])).is_empty());
        let both = table.resolve(&down(&[16, 160, 161]));
        assert!(both.contains(&LogicalKey::LeftShift));
        assert!(both.contains(&LogicalKey::RightShift));
    }

    #[test]
    fn test_reverse_lookup() {
        let table = TriggerTable::reference();
        let ctrl_users = table.keys_for_code(17);
        assert!(ctrl_users.contains(&LogicalKey::LeftCtrl));
        assert!(ctrl_users.contains(&LogicalKey::RightCtrl));
        assert!(ctrl_users.contains(&LogicalKey::RightAlt));
        assert!(table.keys_for_code(0).is_empty());
    }

    #[test]
    fn test_ambiguous_rejected() {
        let err = TriggerTable::builder()
            .key(LogicalKey::A, &[1])
            .key(LogicalKey::B, &[1])
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::AmbiguousTrigger {
                first: LogicalKey::A,
                second: LogicalKey::B
            }
        ));
    }

    #[test]
    fn test_empty_rejected() {
        let err = TriggerTable::builder().key(LogicalKey::A, &[]).build().unwrap_err();
        assert!(matches!(err, Error::EmptyTrigger(LogicalKey::A)));
    }
}
