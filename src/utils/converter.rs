//! Letter-to-index conversion utilities.
//!
//! Provides conversion between text and `0..26` letter indices for the
//! English-targeted analysis toolkit. Layer ciphertext is read the way the
//! cipher's default alphabet reads it: only `a..z` are letters, and
//! capitals pass through like any other foreign symbol. Natural-language
//! scoring folds case instead (see [`folded_letter_indices`]).

/// Number of letters in the English alphabet.
pub const LETTERS: usize = 26;

/// Converts a symbol of the default alphabet to its index.
///
/// # Parameters
/// - `c`: Any character.
///
/// # Returns
/// `Some(0..26)` for `a..z`, `None` otherwise (capitals included).
pub fn letter_index(c: char) -> Option<usize> {
    if c.is_ascii_lowercase() {
        Some((c as u8 - b'a') as usize)
    } else {
        None
    }
}

/// Converts an index in `0..26` to its lowercase letter.
///
/// # Parameters
/// - `index`: Letter index, reduced modulo 26.
pub fn index_letter(index: usize) -> char {
    (b'a' + (index % LETTERS) as u8) as char
}

/// Extracts the letter indices of `text`, dropping every other symbol.
///
/// # Parameters
/// - `text`: Arbitrary text.
///
/// # Returns
/// A `Vec<usize>` with one index per `a..z` letter, in order.
pub fn letter_indices(text: &str) -> Vec<usize> {
    text.chars().filter_map(letter_index).collect()
}

/// Converts an ASCII letter of either case to its index.
pub fn folded_letter_index(c: char) -> Option<usize> {
    letter_index(c.to_ascii_lowercase())
}

/// Extracts the letter indices of `text`, folding ASCII case.
///
/// Used to score candidate plaintexts and the reference corpus, where a
/// capital is still an English letter.
pub fn folded_letter_indices(text: &str) -> Vec<usize> {
    text.chars().filter_map(folded_letter_index).collect()
}

/// Converts letter indices back to a lowercase string.
pub fn letters_to_string(indices: &[usize]) -> String {
    indices.iter().map(|&i| index_letter(i)).collect()
}

/// Rewrites every letter of `text` through `f`, keeping everything else.
///
/// `f` receives the letter position (number of letters before this one) and
/// the letter index, and returns the new index. Capitals are not letters
/// here: they keep their place and do not advance the position.
///
/// # Parameters
/// - `text`: Text to rewrite.
/// - `f`: Mapping `(position, index) -> index`.
pub fn map_letters(text: &str, mut f: impl FnMut(usize, usize) -> usize) -> String {
    let mut position = 0;
    text.chars()
        .map(|c| match letter_index(c) {
            Some(index) => {
                let mapped = index_letter(f(position, index));
                position += 1;
                mapped
            }
            None => c,
        })
        .collect()
}
