//! Random typing for demos without a keyboard

use keyglow_device::LogicalKey;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::triggers::TriggerTable;
use super::KeyStateSource;

/// [`KeyStateSource`] that presses random keys from a trigger table.
///
/// On every poll sweep a new key goes down with probability `press_chance`
/// and stays down for `hold_polls` sweeps.
pub struct SimulatedTypist {
    keys: Vec<(LogicalKey, Vec<u8>)>,
    rng: StdRng,
    press_chance: f64,
    hold_polls: u32,
    held: Vec<(usize, u32)>,
    down: [bool; 256],
}

impl SimulatedTypist {
    pub fn new(table: &TriggerTable, press_chance: f64, hold_polls: u32) -> Self {
        Self::with_rng(table, press_chance, hold_polls, StdRng::from_entropy())
    }

    /// Reproducible typing sequence
    pub fn seeded(table: &TriggerTable, press_chance: f64, hold_polls: u32, seed: u64) -> Self {
        Self::with_rng(table, press_chance, hold_polls, StdRng::seed_from_u64(seed))
    }

    fn with_rng(table: &TriggerTable, press_chance: f64, hold_polls: u32, rng: StdRng) -> Self {
        let keys = table
            .iter()
            .filter(|(k, _)| table.suppressed_by(*k).is_none())
            .map(|(k, codes)| (k, codes.iter().copied().collect()))
            .collect();
        Self {
            keys,
            rng,
            press_chance: press_chance.clamp(0.0, 1.0),
            hold_polls: hold_polls.max(1),
            held: Vec::new(),
            down: [false; 256],
        }
    }

    /// Keys currently held down
    pub fn held(&self) -> Vec<LogicalKey> {
        self.held.iter().map(|&(i, _)| self.keys[i].0).collect()
    }

    /// Convenience for the reference layout
    pub fn reference(press_chance: f64, hold_polls: u32) -> Self {
        Self::new(&TriggerTable::reference(), press_chance, hold_polls)
    }
}

impl KeyStateSource for SimulatedTypist {
    fn begin_poll(&mut self) {
        for entry in &mut self.held {
            entry.1 -= 1;
        }
        self.held.retain(|&(_, left)| left > 0);

        if !self.keys.is_empty() && self.rng.gen_bool(self.press_chance) {
            let i = self.rng.gen_range(0..self.keys.len());
            if !self.held.iter().any(|&(h, _)| h == i) {
                self.held.push((i, self.hold_polls));
            }
        }

        self.down = [false; 256];
        for &(i, _) in &self.held {
            for &code in &self.keys[i].1 {
                self.down[code as usize] = true;
            }
        }
    }

    fn is_down(&mut self, code: u8) -> bool {
        self.down[code as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_always_typing_holds_key() {
        let table = TriggerTable::reference();
        let mut typist = SimulatedTypist::seeded(&table, 1.0, 3, 7);
        typist.begin_poll();
        let held = typist.held();
        assert_eq!(held.len(), 1);
        let codes = table.codes(held[0]).unwrap();
        for &c in codes {
            assert!(typist.is_down(c));
        }
        assert_ne!(held[0], LogicalKey::NumEnter);
    }

    #[test]
    fn test_never_typing() {
        let mut typist = SimulatedTypist::seeded(&TriggerTable::reference(), 0.0, 3, 7);
        for _ in 0..10 {
            typist.begin_poll();
        }
        assert!(typist.held().is_empty());
        assert!((0..=255u8).all(|c| !typist.is_down(c)));
    }

    #[test]
    fn test_keys_release_after_hold() {
        let table = TriggerTable::reference();
        let mut typist = SimulatedTypist::seeded(&table, 1.0, 2, 1);
        typist.begin_poll();
        let first = typist.held()[0];
        let mut typist_quiet = typist;
        typist_quiet.press_chance = 0.0;
        typist_quiet.begin_poll();
        assert_eq!(typist_quiet.held(), vec![first]);
        typist_quiet.begin_poll();
        assert!(typist_quiet.held().is_empty());
    }
}
