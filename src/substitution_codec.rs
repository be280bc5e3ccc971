//! SubstitutionCodec: fixed monoalphabetic mapping.
//!
//! Every alphabet symbol is replaced through the key's forward table on
//! encode and through its precomputed inverse table on decode. Characters
//! outside the alphabet pass through unchanged.

use crate::key::SubstitutionKey;

/// Encodes `message` with the forward mapping.
///
/// # Examples
///
/// ```
/// use mlcc::{substitution_codec, Alphabet, SubstitutionKey};
///
/// let key = SubstitutionKey::caesar(Alphabet::latin(), 3);
/// assert_eq!(substitution_codec::encode("abc xyz!", &key), "def abc!");
/// ```
pub fn encode(message: &str, key: &SubstitutionKey) -> String {
    map_symbols(message, key, SubstitutionKey::forward)
}

/// Decodes `ciphertext` with the inverse mapping.
pub fn decode(ciphertext: &str, key: &SubstitutionKey) -> String {
    map_symbols(ciphertext, key, SubstitutionKey::inverse)
}

fn map_symbols(
    text: &str,
    key: &SubstitutionKey,
    table: fn(&SubstitutionKey, usize) -> usize,
) -> String {
    let alphabet = key.alphabet();
    text.chars()
        .map(|c| match alphabet.index_of(c) {
            Some(index) => alphabet.symbol(table(key, index)),
            None => c,
        })
        .collect()
}
