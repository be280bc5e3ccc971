//! Alphabet: the ordered symbol set every cipher layer operates over.
//!
//! Symbols are looked up in O(1): ASCII symbols through a flat table,
//! anything else through a hash map.

use std::collections::HashMap;
use std::fmt;

use crate::error::{MlccError, Result};

/// The 26 lowercase Latin letters, the default alphabet.
const LATIN: &str = "abcdefghijklmnopqrstuvwxyz";

/// Reserved as the field separator of the serialized key format.
pub const RESERVED_SYMBOL: char = ';';

/// Ordered, duplicate-free set of symbols.
///
/// Characters outside the alphabet pass through the substitution and
/// Vigenere layers untouched.
#[derive(Clone)]
pub struct Alphabet {
    symbols: Vec<char>,
    ascii: [Option<usize>; 128],
    extended: HashMap<char, usize>,
}

impl Alphabet {
    /// Returns the lowercase Latin alphabet `a..z`.
    pub fn latin() -> Self {
        Self::build(LATIN.chars().collect())
    }

    /// Creates an alphabet from an ordered symbol string.
    ///
    /// # Errors
    /// Returns [`MlccError::InvalidParameter`] if fewer than two symbols are
    /// given, a symbol repeats, or a symbol is whitespace, a control
    /// character or the reserved `;`.
    pub fn new(symbols: &str) -> Result<Self> {
        let symbols: Vec<char> = symbols.chars().collect();
        if symbols.len() < 2 {
            return Err(MlccError::InvalidParameter(format!(
                "alphabet needs at least 2 symbols, got {}",
                symbols.len()
            )));
        }
        if let Some(&bad) = symbols
            .iter()
            .find(|c| c.is_whitespace() || c.is_control() || **c == RESERVED_SYMBOL)
        {
            return Err(MlccError::InvalidParameter(format!(
                "alphabet symbol {:?} is not allowed",
                bad
            )));
        }
        let alphabet = Self::build(symbols);
        if alphabet.extended.len() + alphabet.ascii.iter().flatten().count()
            != alphabet.symbols.len()
        {
            return Err(MlccError::InvalidParameter(
                "alphabet symbols must be distinct".into(),
            ));
        }
        Ok(alphabet)
    }

    /// Returns a new alphabet made of the first `size` symbols of this one.
    ///
    /// # Errors
    /// Returns [`MlccError::InvalidParameter`] if `size < 2` or `size`
    /// exceeds the length of this alphabet.
    pub fn prefix(&self, size: usize) -> Result<Self> {
        if size < 2 || size > self.symbols.len() {
            return Err(MlccError::InvalidParameter(format!(
                "alphabet size must be between 2 and {}, got {}",
                self.symbols.len(),
                size
            )));
        }
        Ok(Self::build(self.symbols[..size].to_vec()))
    }

    fn build(symbols: Vec<char>) -> Self {
        let mut ascii = [None; 128];
        let mut extended = HashMap::new();
        for (index, &symbol) in symbols.iter().enumerate() {
            if symbol.is_ascii() {
                ascii[symbol as usize].get_or_insert(index);
            } else {
                extended.entry(symbol).or_insert(index);
            }
        }
        Alphabet {
            symbols,
            ascii,
            extended,
        }
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always `false` for a constructed alphabet; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Position of `symbol`, or `None` if it is not part of the alphabet.
    pub fn index_of(&self, symbol: char) -> Option<usize> {
        if symbol.is_ascii() {
            self.ascii[symbol as usize]
        } else {
            self.extended.get(&symbol).copied()
        }
    }

    /// Returns `true` if `symbol` belongs to the alphabet.
    pub fn contains(&self, symbol: char) -> bool {
        self.index_of(symbol).is_some()
    }

    /// Symbol at `index`.
    ///
    /// # Panics
    /// Panics if `index >= self.len()`.
    pub fn symbol(&self, index: usize) -> char {
        self.symbols[index]
    }

    /// All symbols in order.
    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    /// Number of characters of `text` that belong to the alphabet.
    pub fn count_symbols(&self, text: &str) -> usize {
        text.chars().filter(|&c| self.contains(c)).count()
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::latin()
    }
}

impl PartialEq for Alphabet {
    fn eq(&self, other: &Self) -> bool {
        self.symbols == other.symbols
    }
}

impl Eq for Alphabet {}

impl fmt::Debug for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Alphabet").field(&self.to_string()).finish()
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.symbols.iter().try_for_each(|c| write!(f, "{}", c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin_lookup() {
        let alphabet = Alphabet::latin();
        assert_eq!(alphabet.len(), 26);
        assert_eq!(alphabet.index_of('a'), Some(0));
        assert_eq!(alphabet.index_of('z'), Some(25));
        assert_eq!(alphabet.index_of('A'), None);
        assert_eq!(alphabet.index_of(' '), None);
        assert_eq!(alphabet.symbol(7), 'h');
    }

    #[test]
    fn test_custom_alphabet_with_non_ascii() {
        let alphabet = Alphabet::new("abcñ0").unwrap();
        assert_eq!(alphabet.len(), 5);
        assert_eq!(alphabet.index_of('ñ'), Some(3));
        assert_eq!(alphabet.index_of('0'), Some(4));
        assert_eq!(alphabet.to_string(), "abcñ0");
    }

    #[test]
    fn test_rejects_duplicates() {
        assert!(matches!(
            Alphabet::new("abca"),
            Err(MlccError::InvalidParameter(_))
        ));
        assert!(matches!(
            Alphabet::new("aññ"),
            Err(MlccError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_rejects_reserved_and_whitespace() {
        assert!(Alphabet::new("ab;").is_err());
        assert!(Alphabet::new("a b").is_err());
        assert!(Alphabet::new("a").is_err());
        assert!(Alphabet::new("").is_err());
    }

    #[test]
    fn test_prefix() {
        let alphabet = Alphabet::latin().prefix(5).unwrap();
        assert_eq!(alphabet.to_string(), "abcde");
        assert!(!alphabet.contains('f'));
        assert!(Alphabet::latin().prefix(27).is_err());
        assert!(Alphabet::latin().prefix(1).is_err());
    }

    #[test]
    fn test_count_symbols() {
        let alphabet = Alphabet::latin();
        assert_eq!(alphabet.count_symbols("Hello, world!"), 9);
    }
}
