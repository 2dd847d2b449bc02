//! Physical keyboard layout model.
//!
//! A [`KeyboardLayout`] answers three questions about any character:
//!
//! - Which physical key produces it? ([`KeyboardLayout::base_key`])
//! - Which keys sit right next to that key? ([`KeyboardLayout::adjacent_keys`])
//! - Does typing it need the shift modifier? ([`KeyboardLayout::is_shift_required`])
//!
//! It also records which finger strikes each key, which the timing pipeline
//! uses to slow down same-finger sequences and speed up hand alternation.
//!
//! # Sharing (for beginners)
//!
//! The layout is built once and never mutated afterwards, so it is safe to
//! hand the same instance to several models on several threads.  Wrap it in an
//! `Arc<KeyboardLayout>` and clone the `Arc` (a cheap reference-count bump)
//! rather than the table itself.
//!
//! Characters outside the layout (accented letters, emoji, ...) yield
//! [`LayoutError::LookupMiss`].  Callers are expected to fall back to "no
//! neighbours, no shift" rather than abort.

mod qwerty;

use std::collections::HashMap;
use thiserror::Error;

/// Errors returned by layout lookups.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    /// The character has no key on this layout.
    #[error("character {0:?} is not on the keyboard layout")]
    LookupMiss(char),
}

/// Which hand strikes a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hand {
    Left,
    Right,
}

/// Touch-typing finger assignment for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    LeftPinky,
    LeftRing,
    LeftMiddle,
    LeftIndex,
    /// Either thumb; used for the space bar.
    Thumb,
    RightIndex,
    RightMiddle,
    RightRing,
    RightPinky,
}

impl Finger {
    /// Returns the hand this finger belongs to, or `None` for the thumbs
    /// (the space bar can be struck by either hand).
    pub fn hand(self) -> Option<Hand> {
        match self {
            Finger::LeftPinky | Finger::LeftRing | Finger::LeftMiddle | Finger::LeftIndex => {
                Some(Hand::Left)
            }
            Finger::RightIndex | Finger::RightMiddle | Finger::RightRing | Finger::RightPinky => {
                Some(Hand::Right)
            }
            Finger::Thumb => None,
        }
    }
}

/// Immutable adjacency, shift and finger data for one physical layout.
#[derive(Debug, Clone)]
pub struct KeyboardLayout {
    name: &'static str,
    /// Unshifted key → neighbours, in table order.
    adjacency: HashMap<char, &'static [char]>,
    /// Shifted character → the key that produces it.
    shifted_to_base: HashMap<char, char>,
    /// Key → character produced with shift held.
    base_to_shifted: HashMap<char, char>,
    /// Unshifted key → finger.
    fingers: HashMap<char, Finger>,
}

impl KeyboardLayout {
    /// Builds the US QWERTY layout.
    pub fn us_qwerty() -> Self {
        let adjacency = qwerty::ADJACENT_KEYS.iter().copied().collect();

        let mut shifted_to_base = HashMap::new();
        let mut base_to_shifted = HashMap::new();
        for &(shifted, base) in qwerty::SHIFT_PAIRS {
            shifted_to_base.insert(shifted, base);
            base_to_shifted.insert(base, shifted);
        }
        for base in 'a'..='z' {
            let shifted = base.to_ascii_uppercase();
            shifted_to_base.insert(shifted, base);
            base_to_shifted.insert(base, shifted);
        }

        let mut fingers = HashMap::new();
        for (row, row_fingers) in qwerty::FINGER_ROWS {
            for (key, finger) in row.chars().zip(row_fingers.iter()) {
                fingers.insert(key, *finger);
            }
        }
        for &(key, finger) in qwerty::WHITESPACE_KEYS {
            fingers.insert(key, finger);
        }

        Self {
            name: "us-qwerty",
            adjacency,
            shifted_to_base,
            base_to_shifted,
            fingers,
        }
    }

    /// Short identifier of the layout, e.g. `"us-qwerty"`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns `true` if `c` can be produced on this layout (with or without shift).
    pub fn contains(&self, c: char) -> bool {
        self.base_key(c).is_ok()
    }

    /// Returns the physical key that produces `c`.
    ///
    /// Unshifted characters map to themselves; `'E'` maps to `'e'`, `'!'` to `'1'`.
    pub fn base_key(&self, c: char) -> Result<char, LayoutError> {
        if self.fingers.contains_key(&c) {
            return Ok(c);
        }
        self.shifted_to_base
            .get(&c)
            .copied()
            .ok_or(LayoutError::LookupMiss(c))
    }

    /// Returns `true` when `c` needs the shift modifier.
    pub fn is_shift_required(&self, c: char) -> Result<bool, LayoutError> {
        self.base_key(c)?;
        Ok(self.shifted_to_base.contains_key(&c))
    }

    /// Returns the character produced by `base` with shift held, if any.
    pub fn shifted(&self, base: char) -> Option<char> {
        self.base_to_shifted.get(&base).copied()
    }

    /// Returns the keys physically adjacent to the key producing `c`.
    ///
    /// For a shifted character the neighbours are returned in their shifted
    /// form, so a slip while holding shift stays shifted: `'E'` yields
    /// `['#', '$', 'W', 'R', 'S', 'D']`.  Whitespace keys have no neighbours.
    pub fn adjacent_keys(&self, c: char) -> Result<Vec<char>, LayoutError> {
        let base = self.base_key(c)?;
        let neighbours = self.adjacency.get(&base).copied().unwrap_or(&[]);

        if self.shifted_to_base.contains_key(&c) {
            Ok(neighbours
                .iter()
                .map(|&n| self.shifted(n).unwrap_or(n))
                .collect())
        } else {
            Ok(neighbours.to_vec())
        }
    }

    /// Returns the finger that strikes the key producing `c`.
    pub fn finger(&self, c: char) -> Result<Finger, LayoutError> {
        let base = self.base_key(c)?;
        self.fingers
            .get(&base)
            .copied()
            .ok_or(LayoutError::LookupMiss(c))
    }
}

impl Default for KeyboardLayout {
    fn default() -> Self {
        Self::us_qwerty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> KeyboardLayout {
        KeyboardLayout::us_qwerty()
    }

    // ── base_key / shift ──────────────────────────────────────────────────────

    #[test]
    fn test_us_qwerty_is_named() {
        assert_eq!(KeyboardLayout::us_qwerty().name(), "us-qwerty");
    }

    #[test]
    fn test_base_key_of_lowercase_letter_is_itself() {
        assert_eq!(layout().base_key('g'), Ok('g'));
    }

    #[test]
    fn test_base_key_of_uppercase_letter_is_lowercase() {
        assert_eq!(layout().base_key('G'), Ok('g'));
    }

    #[test]
    fn test_base_key_of_shifted_symbols() {
        let l = layout();
        assert_eq!(l.base_key('!'), Ok('1'));
        assert_eq!(l.base_key('"'), Ok('\''));
        assert_eq!(l.base_key('?'), Ok('/'));
        assert_eq!(l.base_key('|'), Ok('\\'));
    }

    #[test]
    fn test_is_shift_required_for_uppercase_and_symbols() {
        let l = layout();
        assert_eq!(l.is_shift_required('A'), Ok(true));
        assert_eq!(l.is_shift_required('@'), Ok(true));
        assert_eq!(l.is_shift_required('a'), Ok(false));
        assert_eq!(l.is_shift_required('2'), Ok(false));
        assert_eq!(l.is_shift_required(' '), Ok(false));
    }

    #[test]
    fn test_unknown_character_is_lookup_miss() {
        let l = layout();
        assert_eq!(l.base_key('é'), Err(LayoutError::LookupMiss('é')));
        assert_eq!(l.is_shift_required('é'), Err(LayoutError::LookupMiss('é')));
        assert_eq!(l.adjacent_keys('é'), Err(LayoutError::LookupMiss('é')));
        assert!(!l.contains('é'));
    }

    #[test]
    fn test_callers_can_fall_back_to_no_shift() {
        // Arrange / Act
        let shift = layout().is_shift_required('ß').unwrap_or(false);

        // Assert
        assert!(!shift);
    }

    // ── adjacent_keys ─────────────────────────────────────────────────────────

    #[test]
    fn test_adjacent_keys_of_home_row_letter() {
        assert_eq!(
            layout().adjacent_keys('a'),
            Ok(vec!['q', 'w', 's', 'z'])
        );
    }

    #[test]
    fn test_adjacent_keys_of_shifted_letter_are_shifted() {
        assert_eq!(
            layout().adjacent_keys('E'),
            Ok(vec!['#', '$', 'W', 'R', 'S', 'D'])
        );
    }

    #[test]
    fn test_adjacent_keys_of_shifted_symbol_are_shifted() {
        // '!' sits on '1', whose neighbours are '`', '2', 'q'.
        assert_eq!(layout().adjacent_keys('!'), Ok(vec!['~', '@', 'Q']));
    }

    #[test]
    fn test_whitespace_has_no_neighbours() {
        let l = layout();
        for c in [' ', '\t', '\n'] {
            assert_eq!(l.adjacent_keys(c), Ok(vec![]), "{c:?}");
        }
    }

    #[test]
    fn test_every_printable_ascii_character_is_on_layout() {
        let l = layout();
        for c in (0x20u8..0x7f).map(char::from) {
            assert!(l.contains(c), "{c:?} should be on the US QWERTY layout");
        }
    }

    // ── fingers ───────────────────────────────────────────────────────────────

    #[test]
    fn test_finger_assignment_examples() {
        let l = layout();
        assert_eq!(l.finger('f'), Ok(Finger::LeftIndex));
        assert_eq!(l.finger('J'), Ok(Finger::RightIndex));
        assert_eq!(l.finger(' '), Ok(Finger::Thumb));
        assert_eq!(l.finger('?'), Ok(Finger::RightPinky));
    }

    #[test]
    fn test_thumb_has_no_hand() {
        assert_eq!(Finger::Thumb.hand(), None);
        assert_eq!(Finger::LeftRing.hand(), Some(Hand::Left));
        assert_eq!(Finger::RightMiddle.hand(), Some(Hand::Right));
    }
}
