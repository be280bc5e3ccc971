//! VigenereCodec: keyed polyalphabetic shift with a positional modifier.
//!
//! The shift for the symbol at keyword-cursor position `p` is
//! `keyword[p mod len] + modifier(p)`, reduced modulo the alphabet size.
//! The cursor only advances on alphabet symbols, identically on both sides,
//! so foreign characters never desynchronise encode and decode.

use crate::key::VigenereKey;

/// Encodes `message`, adding the positional shift to every alphabet symbol.
pub fn encode(message: &str, key: &VigenereKey) -> String {
    apply(message, key, |symbol, shift, n| (symbol + shift) % n)
}

/// Decodes `ciphertext`, subtracting the positional shift.
pub fn decode(ciphertext: &str, key: &VigenereKey) -> String {
    apply(ciphertext, key, |symbol, shift, n| (symbol + n - shift) % n)
}

fn apply(text: &str, key: &VigenereKey, step: impl Fn(usize, usize, usize) -> usize) -> String {
    let alphabet = key.alphabet();
    let n = alphabet.len();
    let mut cursor = 0;
    text.chars()
        .map(|c| match alphabet.index_of(c) {
            Some(index) => {
                let shifted = step(index, key.shift_at(cursor), n);
                cursor += 1;
                alphabet.symbol(shifted)
            }
            None => c,
        })
        .collect()
}
