//! US QWERTY physical layout tables.
//!
//! Three tables describe the layout:
//!
//! - [`ADJACENT_KEYS`] – for every unshifted key, the keys physically touching
//!   it.  The order of each neighbour list is significant: typo selection draws
//!   from it with a seeded generator, so a stable order keeps runs reproducible.
//! - [`SHIFT_PAIRS`] – `(shifted, base)` pairs for the symbol keys.  Letters are
//!   handled separately because `A`–`Z` map to `a`–`z` by ASCII case.
//! - [`FINGER_ROWS`] – each keyboard row as a string plus the touch-typing
//!   finger that strikes every key in it.
//!
//! # Why keep tables instead of computing adjacency? (for beginners)
//!
//! Rows on a physical keyboard are staggered, so "the key above" is not a
//! simple column offset.  An explicit table is easier to audit against a real
//! keyboard than a geometric formula.

use super::Finger::{self, *};

/// Physical neighbours of each unshifted key.
pub(crate) const ADJACENT_KEYS: &[(char, &[char])] = &[
    // Number row
    ('`', &['1']),
    ('1', &['`', '2', 'q']),
    ('2', &['1', '3', 'q', 'w']),
    ('3', &['2', '4', 'w', 'e']),
    ('4', &['3', '5', 'e', 'r']),
    ('5', &['4', '6', 'r', 't']),
    ('6', &['5', '7', 't', 'y']),
    ('7', &['6', '8', 'y', 'u']),
    ('8', &['7', '9', 'u', 'i']),
    ('9', &['8', '0', 'i', 'o']),
    ('0', &['9', '-', 'o', 'p']),
    ('-', &['0', '=', 'p', '[']),
    ('=', &['-', '[', ']']),
    // Top row
    ('q', &['1', '2', 'w', 'a']),
    ('w', &['2', '3', 'q', 'e', 'a', 's']),
    ('e', &['3', '4', 'w', 'r', 's', 'd']),
    ('r', &['4', '5', 'e', 't', 'd', 'f']),
    ('t', &['5', '6', 'r', 'y', 'f', 'g']),
    ('y', &['6', '7', 't', 'u', 'g', 'h']),
    ('u', &['7', '8', 'y', 'i', 'h', 'j']),
    ('i', &['8', '9', 'u', 'o', 'j', 'k']),
    ('o', &['9', '0', 'i', 'p', 'k', 'l']),
    ('p', &['0', '-', 'o', '[', 'l', ';']),
    ('[', &['-', '=', 'p', ']', ';', '\'']),
    (']', &['=', '[', '\\', '\'']),
    ('\\', &['=', ']']),
    // Home row
    ('a', &['q', 'w', 's', 'z']),
    ('s', &['q', 'w', 'e', 'a', 'd', 'z', 'x']),
    ('d', &['w', 'e', 'r', 's', 'f', 'x', 'c']),
    ('f', &['e', 'r', 't', 'd', 'g', 'c', 'v']),
    ('g', &['r', 't', 'y', 'f', 'h', 'v', 'b']),
    ('h', &['t', 'y', 'u', 'g', 'j', 'b', 'n']),
    ('j', &['y', 'u', 'i', 'h', 'k', 'n', 'm']),
    ('k', &['u', 'i', 'o', 'j', 'l', 'm', ',']),
    ('l', &['i', 'o', 'p', 'k', ';', ',', '.']),
    (';', &['o', 'p', '[', 'l', '\'', '.']),
    ('\'', &['p', '[', ']', ';']),
    // Bottom row
    ('z', &['a', 's', 'x']),
    ('x', &['a', 's', 'd', 'z', 'c']),
    ('c', &['s', 'd', 'f', 'x', 'v']),
    ('v', &['d', 'f', 'g', 'c', 'b']),
    ('b', &['f', 'g', 'h', 'v', 'n']),
    ('n', &['g', 'h', 'j', 'b', 'm']),
    ('m', &['h', 'j', 'k', 'n', ',']),
    (',', &['j', 'k', 'l', 'm', '.']),
    ('.', &['k', 'l', ';', ',', '/']),
    ('/', &['l', ';', '.']),
];

/// `(shifted, base)` pairs for the non-letter keys.
pub(crate) const SHIFT_PAIRS: &[(char, char)] = &[
    ('~', '`'),
    ('!', '1'),
    ('@', '2'),
    ('#', '3'),
    ('$', '4'),
    ('%', '5'),
    ('^', '6'),
    ('&', '7'),
    ('*', '8'),
    ('(', '9'),
    (')', '0'),
    ('_', '-'),
    ('+', '='),
    ('{', '['),
    ('}', ']'),
    ('|', '\\'),
    (':', ';'),
    ('"', '\''),
    ('<', ','),
    ('>', '.'),
    ('?', '/'),
];

/// Each row of the main key block with the finger assigned to every key.
pub(crate) const FINGER_ROWS: &[(&str, &[Finger])] = &[
    (
        "`1234567890-=",
        &[
            LeftPinky, LeftPinky, LeftRing, LeftMiddle, LeftIndex, LeftIndex, RightIndex,
            RightIndex, RightMiddle, RightRing, RightPinky, RightPinky, RightPinky,
        ],
    ),
    (
        "qwertyuiop[]\\",
        &[
            LeftPinky, LeftRing, LeftMiddle, LeftIndex, LeftIndex, RightIndex, RightIndex,
            RightMiddle, RightRing, RightPinky, RightPinky, RightPinky, RightPinky,
        ],
    ),
    (
        "asdfghjkl;'",
        &[
            LeftPinky, LeftRing, LeftMiddle, LeftIndex, LeftIndex, RightIndex, RightIndex,
            RightMiddle, RightRing, RightPinky, RightPinky,
        ],
    ),
    (
        "zxcvbnm,./",
        &[
            LeftPinky, LeftRing, LeftMiddle, LeftIndex, LeftIndex, RightIndex, RightIndex,
            RightMiddle, RightRing, RightPinky,
        ],
    ),
];

/// Whitespace keys: on the layout, but with no neighbours worth mistyping.
pub(crate) const WHITESPACE_KEYS: &[(char, Finger)] =
    &[(' ', Thumb), ('\t', LeftPinky), ('\n', RightPinky)];

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_finger_row_has_one_finger_per_key() {
        for (row, fingers) in FINGER_ROWS {
            assert_eq!(
                row.chars().count(),
                fingers.len(),
                "row {row:?} must assign exactly one finger per key"
            );
        }
    }

    #[test]
    fn test_every_adjacent_entry_is_on_a_finger_row() {
        for (key, neighbours) in ADJACENT_KEYS {
            for c in std::iter::once(key).chain(neighbours.iter()) {
                let on_row = FINGER_ROWS.iter().any(|(row, _)| row.contains(*c));
                assert!(on_row, "{c:?} is referenced by the adjacency table but has no finger");
            }
        }
    }

    #[test]
    fn test_neighbours_are_layout_keys_and_never_the_key_itself() {
        for (key, neighbours) in ADJACENT_KEYS {
            assert!(!neighbours.contains(key), "{key:?} lists itself as a neighbour");
            for n in *neighbours {
                let on_layout = FINGER_ROWS.iter().any(|(row, _)| row.contains(*n));
                assert!(on_layout, "{key:?} lists {n:?}, which is not a key on the layout");
            }
        }
    }

    #[test]
    fn test_shift_pairs_have_unique_bases() {
        for (i, (_, base)) in SHIFT_PAIRS.iter().enumerate() {
            let dupes = SHIFT_PAIRS[i + 1..].iter().filter(|(_, b)| b == base).count();
            assert_eq!(dupes, 0, "base key {base:?} is shifted by more than one symbol");
        }
    }
}
