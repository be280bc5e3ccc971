//! Key model: the three layer keys and the composite key that owns them.
//!
//! Every key validates its invariants at construction and is immutable
//! afterwards. A [`CompositeKey`] is either generated at random
//! ([`generate_key`]) or parsed from its textual form ([`CompositeKey::parse`]).

mod direction;
mod format;
mod generator;
mod modifier;

use rand::seq::SliceRandom;
use rand::Rng;

pub use direction::Direction;
pub use format::KEY_FORMAT_VERSION;
pub use generator::{generate_key, generate_key_with_rng, KeyParams};
pub use modifier::PositionalModifier;

use crate::alphabet::Alphabet;
use crate::error::{MlccError, Result};

/// The cipher layers, in encryption order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Substitution,
    Vigenere,
    Transposition,
}

/// Encryption order of the layers. Decryption walks it backwards.
const LAYER_ORDER: [Layer; 3] = [Layer::Substitution, Layer::Vigenere, Layer::Transposition];

/// Bijective monoalphabetic mapping over an [`Alphabet`].
///
/// Both directions are precomputed at construction, so encoding and decoding
/// are table lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionKey {
    alphabet: Alphabet,
    forward: Vec<usize>,
    inverse: Vec<usize>,
}

impl SubstitutionKey {
    /// Builds a key from its image: the symbol that each alphabet symbol, in
    /// order, maps to.
    ///
    /// # Errors
    /// Returns [`MlccError::MalformedKey`] if `image` is not a permutation of
    /// the alphabet.
    pub fn new(alphabet: Alphabet, image: &str) -> Result<Self> {
        let forward = image
            .chars()
            .map(|c| {
                alphabet.index_of(c).ok_or_else(|| {
                    MlccError::MalformedKey(format!(
                        "substitution symbol {:?} is not in the alphabet",
                        c
                    ))
                })
            })
            .collect::<Result<Vec<usize>>>()?;
        Self::from_permutation(alphabet, forward)
    }

    /// Builds a key from a permutation of symbol indices.
    ///
    /// # Errors
    /// Returns [`MlccError::MalformedKey`] if `forward` is not a total
    /// bijection on `0..alphabet.len()`.
    pub fn from_permutation(alphabet: Alphabet, forward: Vec<usize>) -> Result<Self> {
        let n = alphabet.len();
        if forward.len() != n {
            return Err(MlccError::MalformedKey(format!(
                "substitution maps {} symbols, alphabet has {}",
                forward.len(),
                n
            )));
        }
        let mut inverse = vec![usize::MAX; n];
        for (source, &target) in forward.iter().enumerate() {
            if target >= n || inverse[target] != usize::MAX {
                return Err(MlccError::MalformedKey(
                    "substitution is not a bijection".into(),
                ));
            }
            inverse[target] = source;
        }
        Ok(SubstitutionKey {
            alphabet,
            forward,
            inverse,
        })
    }

    /// The identity mapping.
    pub fn identity(alphabet: Alphabet) -> Self {
        let forward: Vec<usize> = (0..alphabet.len()).collect();
        SubstitutionKey {
            alphabet,
            inverse: forward.clone(),
            forward,
        }
    }

    /// The Caesar mapping `s -> s + shift`.
    pub fn caesar(alphabet: Alphabet, shift: usize) -> Self {
        let n = alphabet.len();
        let forward: Vec<usize> = (0..n).map(|i| (i + shift) % n).collect();
        let inverse: Vec<usize> = (0..n).map(|i| (i + n - shift % n) % n).collect();
        SubstitutionKey {
            alphabet,
            forward,
            inverse,
        }
    }

    /// A uniformly random permutation.
    pub fn random<R: Rng + ?Sized>(alphabet: Alphabet, rng: &mut R) -> Self {
        let mut forward: Vec<usize> = (0..alphabet.len()).collect();
        forward.shuffle(rng);
        let mut inverse = vec![0; forward.len()];
        for (source, &target) in forward.iter().enumerate() {
            inverse[target] = source;
        }
        SubstitutionKey {
            alphabet,
            forward,
            inverse,
        }
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Index that symbol index `index` encodes to.
    pub fn forward(&self, index: usize) -> usize {
        self.forward[index]
    }

    /// Index that symbol index `index` decodes to.
    pub fn inverse(&self, index: usize) -> usize {
        self.inverse[index]
    }

    /// The image string, as accepted by [`SubstitutionKey::new`].
    pub fn image(&self) -> String {
        self.forward
            .iter()
            .map(|&i| self.alphabet.symbol(i))
            .collect()
    }
}

/// Keyword plus positional modifier of the Vigenere layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VigenereKey {
    alphabet: Alphabet,
    keyword: String,
    shifts: Vec<usize>,
    modifier: PositionalModifier,
}

impl VigenereKey {
    /// Creates a key from a keyword over `alphabet`.
    ///
    /// # Errors
    /// Returns [`MlccError::MalformedKey`] if the keyword is empty, contains
    /// a symbol outside the alphabet, or the modifier has a zero period.
    pub fn new(alphabet: Alphabet, keyword: &str, modifier: PositionalModifier) -> Result<Self> {
        if keyword.is_empty() {
            return Err(MlccError::MalformedKey("Vigenere keyword is empty".into()));
        }
        modifier.validate()?;
        let shifts = keyword
            .chars()
            .map(|c| {
                alphabet.index_of(c).ok_or_else(|| {
                    MlccError::MalformedKey(format!(
                        "keyword symbol {:?} is not in the alphabet",
                        c
                    ))
                })
            })
            .collect::<Result<Vec<usize>>>()?;
        Ok(VigenereKey {
            alphabet,
            keyword: keyword.to_string(),
            shifts,
            modifier,
        })
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn modifier(&self) -> PositionalModifier {
        self.modifier
    }

    /// Effective shift at keyword-cursor `position`:
    /// `(keyword[position mod len] + modifier(position)) mod N`.
    pub fn shift_at(&self, position: usize) -> usize {
        let n = self.alphabet.len();
        let base = self.shifts[position % self.shifts.len()];
        (base + self.modifier.offset(position, n)) % n
    }
}

/// Block width, column order and direction chain of the transposition
/// layer.
///
/// The column order is the sequence in which the column traversals (`TB`
/// and `BT`) visit the grid's columns; it defaults to left to right. A
/// shuffled order turns `TB` into a keyed columnar transposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranspositionKey {
    width: usize,
    columns: Vec<usize>,
    directions: Vec<Direction>,
}

impl TranspositionKey {
    /// Builds a key with the natural column order.
    ///
    /// # Errors
    /// Returns [`MlccError::InvalidGridDimensions`] for a zero width and
    /// [`MlccError::MalformedKey`] for an empty direction chain.
    pub fn new(width: usize, directions: Vec<Direction>) -> Result<Self> {
        if width == 0 {
            return Err(MlccError::InvalidGridDimensions { width, len: 0 });
        }
        if directions.is_empty() {
            return Err(MlccError::MalformedKey(
                "transposition needs at least one direction".into(),
            ));
        }
        Ok(TranspositionKey {
            width,
            columns: (0..width).collect(),
            directions,
        })
    }

    /// Replaces the column order. `order[k]` is the column read `k`-th.
    ///
    /// # Errors
    /// Returns [`MlccError::MalformedKey`] unless `order` is a permutation
    /// of `0..width`.
    pub fn with_column_order(mut self, order: Vec<usize>) -> Result<Self> {
        let mut seen = vec![false; self.width];
        for &column in &order {
            match seen.get_mut(column) {
                Some(slot) if !*slot => *slot = true,
                _ => {
                    return Err(MlccError::MalformedKey(format!(
                        "column order {:?} is not a permutation of 0..{}",
                        order, self.width
                    )))
                }
            }
        }
        if order.len() != self.width {
            return Err(MlccError::MalformedKey(format!(
                "column order has {} entries for width {}",
                order.len(),
                self.width
            )));
        }
        self.columns = order;
        Ok(self)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn column_order(&self) -> &[usize] {
        &self.columns
    }

    /// Whether the column order differs from left to right.
    pub fn is_keyed(&self) -> bool {
        self.columns.iter().enumerate().any(|(k, &column)| k != column)
    }

    pub fn directions(&self) -> &[Direction] {
        &self.directions
    }
}

/// Full parameter set of the cipher: one key per layer over a shared
/// alphabet, applied in the fixed order substitution, Vigenere,
/// transposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeKey {
    substitution: SubstitutionKey,
    vigenere: VigenereKey,
    transposition: TranspositionKey,
}

impl CompositeKey {
    /// # Errors
    /// Returns [`MlccError::MalformedKey`] if the substitution and Vigenere
    /// keys are defined over different alphabets.
    pub fn new(
        substitution: SubstitutionKey,
        vigenere: VigenereKey,
        transposition: TranspositionKey,
    ) -> Result<Self> {
        if substitution.alphabet() != vigenere.alphabet() {
            return Err(MlccError::MalformedKey(
                "substitution and Vigenere keys use different alphabets".into(),
            ));
        }
        Ok(CompositeKey {
            substitution,
            vigenere,
            transposition,
        })
    }

    pub fn alphabet(&self) -> &Alphabet {
        self.substitution.alphabet()
    }

    pub fn substitution(&self) -> &SubstitutionKey {
        &self.substitution
    }

    pub fn vigenere(&self) -> &VigenereKey {
        &self.vigenere
    }

    pub fn transposition(&self) -> &TranspositionKey {
        &self.transposition
    }

    /// Layers in encryption order.
    pub fn layer_order(&self) -> [Layer; 3] {
        LAYER_ORDER
    }
}
