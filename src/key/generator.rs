//! Random key generation.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{
    CompositeKey, Direction, PositionalModifier, SubstitutionKey, TranspositionKey, VigenereKey,
};
use crate::alphabet::Alphabet;
use crate::error::{MlccError, Result};

/// Size parameters for [`generate_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyParams {
    /// Number of leading Latin letters the key operates over (2..=26).
    pub alphabet_size: usize,
    /// Keyword length of the Vigenere layer.
    pub vigenere_length: usize,
    /// Transposition block width.
    pub block_width: usize,
    /// Number of chained transposition directions.
    pub direction_count: usize,
}

impl Default for KeyParams {
    fn default() -> Self {
        KeyParams {
            alphabet_size: 26,
            vigenere_length: 12,
            block_width: 5,
            direction_count: 2,
        }
    }
}

impl KeyParams {
    /// # Errors
    /// Returns [`MlccError::InvalidParameter`] if any size is zero or the
    /// alphabet size is outside `2..=26`.
    pub fn validate(&self) -> Result<()> {
        let sizes = [
            ("alphabet size", self.alphabet_size),
            ("Vigenere keyword length", self.vigenere_length),
            ("block width", self.block_width),
            ("direction count", self.direction_count),
        ];
        if let Some((name, _)) = sizes.iter().find(|(_, value)| *value == 0) {
            return Err(MlccError::InvalidParameter(format!(
                "{} must be at least 1",
                name
            )));
        }
        let latin = Alphabet::latin().len();
        if self.alphabet_size < 2 || self.alphabet_size > latin {
            return Err(MlccError::InvalidParameter(format!(
                "alphabet size must be between 2 and {}, got {}",
                latin, self.alphabet_size
            )));
        }
        Ok(())
    }
}

/// Generates a random key with the thread-local RNG.
///
/// # Errors
/// See [`KeyParams::validate`].
///
/// # Examples
///
/// ```
/// use mlcc::{generate_key, KeyParams};
///
/// let key = generate_key(&KeyParams::default()).unwrap();
/// assert_eq!(key.vigenere().keyword().len(), 12);
/// ```
pub fn generate_key(params: &KeyParams) -> Result<CompositeKey> {
    generate_key_with_rng(params, &mut rand::thread_rng())
}

/// Generates a random key from an explicit RNG, for reproducible keys.
///
/// Draws a uniform substitution permutation, a keyword of uniformly chosen
/// symbols, a modifier from the [`PositionalModifier::random`] family, a
/// chain of uniformly chosen directions and a shuffled column order.
///
/// # Errors
/// See [`KeyParams::validate`].
pub fn generate_key_with_rng<R: Rng + ?Sized>(
    params: &KeyParams,
    rng: &mut R,
) -> Result<CompositeKey> {
    params.validate()?;
    let alphabet = Alphabet::latin().prefix(params.alphabet_size)?;
    let n = alphabet.len();

    let substitution = SubstitutionKey::random(alphabet.clone(), rng);

    let keyword: String = (0..params.vigenere_length)
        .map(|_| alphabet.symbol(rng.gen_range(0..n)))
        .collect();
    let modifier = PositionalModifier::random(rng);
    let vigenere = VigenereKey::new(alphabet, &keyword, modifier)?;

    let directions = (0..params.direction_count)
        .map(|_| Direction::ALL[rng.gen_range(0..Direction::ALL.len())])
        .collect();
    let mut columns: Vec<usize> = (0..params.block_width).collect();
    columns.shuffle(rng);
    let transposition =
        TranspositionKey::new(params.block_width, directions)?.with_column_order(columns)?;

    CompositeKey::new(substitution, vigenere, transposition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generate_respects_params() {
        let params = KeyParams {
            alphabet_size: 10,
            vigenere_length: 4,
            block_width: 7,
            direction_count: 3,
        };
        let mut rng = StdRng::seed_from_u64(1);
        let key = generate_key_with_rng(&params, &mut rng).unwrap();
        assert_eq!(key.alphabet().to_string(), "abcdefghij");
        assert_eq!(key.vigenere().keyword().chars().count(), 4);
        assert!(key.vigenere().keyword().chars().all(|c| key.alphabet().contains(c)));
        assert_eq!(key.transposition().width(), 7);
        assert_eq!(key.transposition().directions().len(), 3);
        let mut columns = key.transposition().column_order().to_vec();
        columns.sort_unstable();
        assert_eq!(columns, (0..7).collect::<Vec<_>>());
        assert_ne!(key.vigenere().modifier(), PositionalModifier::Zero);
    }

    #[test]
    fn test_generate_is_reproducible_with_seed() {
        let params = KeyParams::default();
        let a = generate_key_with_rng(&params, &mut StdRng::seed_from_u64(99)).unwrap();
        let b = generate_key_with_rng(&params, &mut StdRng::seed_from_u64(99)).unwrap();
        let c = generate_key_with_rng(&params, &mut StdRng::seed_from_u64(100)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_generate_rejects_zero_sizes() {
        let zeroed = |field: fn(&mut KeyParams) -> &mut usize| {
            let mut params = KeyParams::default();
            *field(&mut params) = 0;
            params
        };
        let cases = [
            zeroed(|p| &mut p.alphabet_size),
            zeroed(|p| &mut p.vigenere_length),
            zeroed(|p| &mut p.block_width),
            zeroed(|p| &mut p.direction_count),
        ];
        for params in cases {
            assert!(matches!(
                generate_key(&params),
                Err(MlccError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn test_generate_rejects_oversized_alphabet() {
        let params = KeyParams {
            alphabet_size: 27,
            ..KeyParams::default()
        };
        assert!(matches!(
            generate_key(&params),
            Err(MlccError::InvalidParameter(_))
        ));
        let params = KeyParams {
            alphabet_size: 1,
            ..KeyParams::default()
        };
        assert!(generate_key(&params).is_err());
    }

    #[test]
    fn test_generated_key_roundtrips_through_text() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            let key = generate_key_with_rng(&KeyParams::default(), &mut rng).unwrap();
            assert_eq!(CompositeKey::parse(&key.serialize()).unwrap(), key);
        }
    }
}
