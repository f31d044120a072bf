//! The candidate alphabet.
//!
//! Digit `i` of a [Position](crate::Position) maps to the character
//! `CHARS[i]` when the position is materialized into a
//! [Block](crate::Block).

/// The ordered candidate alphabet.
pub const CHARS: &[u8; 65] =
    b"0123456789abcdefghijklmnopqrstuvwxyz!@#$%^&*()_+|[];',./{}:\"<>?`~";

/// The alphabet size, the radix of a position.
pub const CHARS_LEN: usize = CHARS.len();

const NOT_IN_ALPHABET: u8 = u8::MAX;

static INDEX: [u8; 256] = {
    let mut out = [NOT_IN_ALPHABET; 256];
    let mut i = 0;
    while i < CHARS_LEN {
        out[CHARS[i] as usize] = i as u8;
        i += 1;
    }
    out
};

/// Map a digit to its character.
///
/// Returns `None` if `digit >= CHARS_LEN`.
#[inline]
pub fn char_of(digit: u8) -> Option<u8> {
    CHARS.get(digit as usize).copied()
}

/// Map a character back to its digit.
///
/// Returns `None` if the character is not in the alphabet.
#[inline]
pub fn digit_of(c: u8) -> Option<u8> {
    match INDEX[c as usize] {
        NOT_IN_ALPHABET => None,
        d => Some(d),
    }
}
