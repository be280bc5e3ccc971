//! VigenereCracker: keyword length estimation and per-column key recovery.
//!
//! Key lengths are ranked by the average index of coincidence of their
//! columns, nudged by the share of Kasiski distances they divide. The best
//! lengths then get a full recovery: every column is solved independently as
//! a Caesar shift by chi-squared against English, and the resulting
//! plaintexts are ranked by trigram fitness.
//!
//! A positional modifier breaks the column structure. Each modifier
//! hypothesis in [`VigenereConfig::modifiers`] is stripped from the
//! ciphertext before the length analysis, so an unknown modifier is searched
//! as one more dimension.

use std::collections::HashMap;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, debug_span, trace};

use super::config::VigenereConfig;
use super::frequency::{index_of_coincidence, letter_counts, rank_shifts};
use super::reference::ENGLISH;
use super::search::{keep_best, run_with_workers, Deadline};
use crate::alphabet::Alphabet;
use crate::error::{MlccError, Result};
use crate::key::{PositionalModifier, VigenereKey};
use crate::utils::converter::{letter_indices, letters_to_string, map_letters, LETTERS};

/// Weight of the Kasiski share in a key length score.
const KASISKI_WEIGHT: f64 = 0.01;

/// Score of one keyword length hypothesis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyLengthScore {
    pub length: usize,
    /// Average index of coincidence of the columns.
    pub index_of_coincidence: f64,
    /// Share of repeated-trigram distances divisible by the length.
    pub kasiski_share: f64,
    pub score: f64,
}

/// One recovered Vigenere hypothesis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VigenereCandidate {
    pub keyword: String,
    pub modifier: PositionalModifier,
    pub key_length: usize,
    pub plaintext: String,
    pub fitness: f64,
    pub confidence: f64,
}

impl VigenereCandidate {
    /// The key this candidate stands for, over `a..z`.
    ///
    /// # Errors
    /// Never fails for a candidate returned by [`crack_vigenere`].
    pub fn vigenere_key(&self) -> Result<VigenereKey> {
        VigenereKey::new(Alphabet::latin(), &self.keyword, self.modifier)
    }
}

/// A keyword consistent with a known plaintext / ciphertext pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecoveredKey {
    pub keyword: String,
    pub modifier: PositionalModifier,
    pub key_length: usize,
}

/// Ranks keyword lengths in `min_length..=max_length` for `ciphertext`,
/// most probable first.
///
/// Lengths longer than the number of letters are skipped.
pub fn estimate_key_lengths(
    ciphertext: &str,
    min_length: usize,
    max_length: usize,
) -> Vec<KeyLengthScore> {
    rank_key_lengths(&letter_indices(ciphertext), min_length, max_length)
}

fn rank_key_lengths(
    letters: &[usize],
    min_length: usize,
    max_length: usize,
) -> Vec<KeyLengthScore> {
    let distances = kasiski_distances(letters);
    let mut scores: Vec<KeyLengthScore> = (min_length.max(1)..=max_length.min(letters.len()))
        .map(|length| {
            let ioc = (0..length)
                .map(|column| column_letters(letters, column, length))
                .map(|column| index_of_coincidence(&letter_counts(&column)))
                .sum::<f64>()
                / length as f64;
            let kasiski_share = if distances.is_empty() {
                0.0
            } else {
                let aligned = distances.iter().filter(|&&d| d % length == 0).count();
                aligned as f64 / distances.len() as f64
            };
            KeyLengthScore {
                length,
                index_of_coincidence: ioc,
                kasiski_share,
                score: ioc + KASISKI_WEIGHT * kasiski_share,
            }
        })
        .collect();
    scores.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.length.cmp(&b.length)));
    scores
}

/// Distances between consecutive occurrences of every repeated trigram.
fn kasiski_distances(letters: &[usize]) -> Vec<usize> {
    let mut last_seen: HashMap<&[usize], usize> = HashMap::new();
    let mut distances = Vec::new();
    for (position, trigram) in letters.windows(3).enumerate() {
        if let Some(previous) = last_seen.insert(trigram, position) {
            distances.push(position - previous);
        }
    }
    distances
}

fn column_letters(letters: &[usize], column: usize, length: usize) -> Vec<usize> {
    letters.iter().skip(column).step_by(length).copied().collect()
}

/// Recovers ranked Vigenere candidates for `ciphertext`, trying keyword
/// lengths from `config.min_key_length` to `max_key_length`.
///
/// Only `a..z` are analysed and only they advance the keyword position,
/// exactly as the Vigenere layer over the default alphabet does; capitals
/// and every other symbol are copied through. Returns an empty list when the
/// ciphertext holds no letters or the length range is empty.
pub fn crack_vigenere(
    ciphertext: &str,
    max_key_length: usize,
    config: &VigenereConfig,
) -> Vec<VigenereCandidate> {
    let letters = letter_indices(ciphertext);
    if letters.is_empty() {
        return Vec::new();
    }
    let span = debug_span!("crack_vigenere", letters = letters.len(), max_key_length);
    let _enter = span.enter();

    let deadline = Deadline::from_millis(config.deadline_ms);
    let modifiers = if config.modifiers.is_empty() {
        vec![PositionalModifier::Zero]
    } else {
        config.modifiers.clone()
    };

    let mut candidates: Vec<VigenereCandidate> = run_with_workers(config.workers, || {
        modifiers
            .par_iter()
            .flat_map_iter(|&modifier| {
                crack_with_modifier(
                    ciphertext,
                    &letters,
                    modifier,
                    max_key_length,
                    config,
                    deadline,
                )
            })
            .collect()
    });
    candidates.sort_by(|a, b| {
        b.fitness
            .total_cmp(&a.fitness)
            .then(a.key_length.cmp(&b.key_length))
    });
    keep_best(candidates, config.top_k.max(1), |c| c.plaintext.clone())
}

fn crack_with_modifier(
    ciphertext: &str,
    letters: &[usize],
    modifier: PositionalModifier,
    max_key_length: usize,
    config: &VigenereConfig,
    deadline: Deadline,
) -> Vec<VigenereCandidate> {
    let stripped: Vec<usize> = letters
        .iter()
        .enumerate()
        .map(|(p, &c)| (c + LETTERS - modifier.offset(p, LETTERS)) % LETTERS)
        .collect();

    let mut candidates = Vec::new();
    for scored in rank_key_lengths(&stripped, config.min_key_length, max_key_length)
        .into_iter()
        .take(config.lengths_to_try.max(1))
    {
        if deadline.expired() {
            debug!(%modifier, "vigenere search hit the deadline");
            break;
        }
        let length = scored.length;
        let shifts: Vec<usize> = (0..length)
            .map(|column| {
                rank_shifts(&letter_counts(&column_letters(&stripped, column, length)))
                    .first()
                    .map_or(0, |best| best.shift)
            })
            .collect();
        let plain: Vec<usize> = stripped
            .iter()
            .enumerate()
            .map(|(p, &c)| (c + LETTERS - shifts[p % length]) % LETTERS)
            .collect();
        let fitness = ENGLISH.fitness(&plain);
        let ioc = scored.index_of_coincidence;
        trace!(%modifier, length, ioc, fitness, "key length evaluated");

        candidates.push(VigenereCandidate {
            keyword: letters_to_string(&shifts),
            modifier,
            key_length: length,
            plaintext: map_letters(ciphertext, |p, c| {
                (c + 2 * LETTERS - shifts[p % length] - modifier.offset(p, LETTERS)) % LETTERS
            }),
            fitness,
            confidence: ENGLISH.confidence(fitness),
        });
    }
    debug!(%modifier, candidates = candidates.len(), "modifier hypothesis done");
    candidates
}

/// Recovers every keyword consistent with a known pair of aligned texts:
/// `plaintext` before the Vigenere layer and `ciphertext` after it, under
/// the given `modifier`.
///
/// Only `a..z` letters are compared, so both texts must hold the same
/// number of them. Each length in `min_length..=max_length` (up to the number of
/// letters) whose keyword repeats consistently over the whole text yields
/// one result, shortest first.
///
/// # Errors
/// Returns [`MlccError::InvalidParameter`] if the letter counts differ,
/// `min_length` is zero or `min_length > max_length`.
pub fn recover_vigenere_key(
    plaintext: &str,
    ciphertext: &str,
    modifier: PositionalModifier,
    min_length: usize,
    max_length: usize,
) -> Result<Vec<RecoveredKey>> {
    if min_length == 0 || min_length > max_length {
        return Err(MlccError::InvalidParameter(format!(
            "invalid key length range {}..={}",
            min_length, max_length
        )));
    }
    let (plain, cipher) = (letter_indices(plaintext), letter_indices(ciphertext));
    if plain.len() != cipher.len() {
        return Err(MlccError::InvalidParameter(format!(
            "texts are not aligned: {} plaintext letters, {} ciphertext letters",
            plain.len(),
            cipher.len()
        )));
    }
    let shifts: Vec<usize> = plain
        .iter()
        .zip(&cipher)
        .enumerate()
        .map(|(p, (&m, &c))| (c + 2 * LETTERS - m - modifier.offset(p, LETTERS)) % LETTERS)
        .collect();

    Ok((min_length..=max_length.min(shifts.len()))
        .filter(|&length| (length..shifts.len()).all(|p| shifts[p] == shifts[p % length]))
        .map(|length| RecoveredKey {
            keyword: letters_to_string(&shifts[..length]),
            modifier,
            key_length: length,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vigenere_codec;

    const PASSAGE: &str = "Every morning the harbour master walked the length of the pier before \
        the fishing boats went out. He counted the ropes, looked at the sky and listened to the \
        water against the stones. The older sailors said that he could smell a storm two days \
        before it arrived, and nobody in the village ever argued with him about the weather. When \
        he raised the red flag the boats stayed home, and when he lowered it the whole harbour \
        woke up at once with shouting, engines and the cry of the gulls.";

    fn encrypt(text: &str, keyword: &str, modifier: PositionalModifier) -> String {
        let key = VigenereKey::new(Alphabet::latin(), keyword, modifier).unwrap();
        vigenere_codec::encode(&text.to_ascii_lowercase(), &key)
    }

    #[test]
    fn test_kasiski_distances() {
        // "abc" repeats at distance 5, "bca" does not repeat
        let letters = letter_indices("abcxyabc");
        assert_eq!(kasiski_distances(&letters), vec![5]);
    }

    #[test]
    fn test_key_length_estimate() {
        let ciphertext = encrypt(PASSAGE, "cargo", PositionalModifier::Zero);
        let lengths = estimate_key_lengths(&ciphertext, 1, 12);
        assert_eq!(lengths.len(), 12);
        assert!(lengths.iter().take(2).any(|s| s.length == 5), "{:?}", &lengths[..3]);
    }

    #[test]
    fn test_crack_plain_vigenere() {
        let ciphertext = encrypt(PASSAGE, "cargo", PositionalModifier::Zero);
        let candidates = crack_vigenere(&ciphertext, 12, &VigenereConfig::default());
        let best = &candidates[0];
        assert_eq!(best.keyword, "cargo");
        assert_eq!(best.plaintext, PASSAGE.to_ascii_lowercase());
        assert!(best.confidence > 0.85);
        let key = best.vigenere_key().unwrap();
        assert_eq!(vigenere_codec::encode(&best.plaintext, &key), ciphertext);
    }

    #[test]
    fn test_crack_keeps_alignment_across_capitals() {
        let key = VigenereKey::new(Alphabet::latin(), "cargo", PositionalModifier::Zero).unwrap();
        let ciphertext = vigenere_codec::encode(PASSAGE, &key);
        let best = &crack_vigenere(&ciphertext, 12, &VigenereConfig::default())[0];
        assert_eq!(best.keyword, "cargo");
        assert_eq!(best.plaintext, PASSAGE);
    }

    #[test]
    fn test_crack_with_modifier_hypothesis() {
        let ciphertext = encrypt(PASSAGE, "cargo", PositionalModifier::Cyclic(3));
        let config = VigenereConfig {
            modifiers: vec![PositionalModifier::Zero, PositionalModifier::Cyclic(3)],
            ..VigenereConfig::default()
        };
        let best = &crack_vigenere(&ciphertext, 8, &config)[0];
        assert_eq!(best.modifier, PositionalModifier::Cyclic(3));
        assert_eq!(best.keyword, "cargo");
    }

    #[test]
    fn test_crack_empty_or_empty_range() {
        assert!(crack_vigenere("", 10, &VigenereConfig::default()).is_empty());
        assert!(crack_vigenere("... 42", 10, &VigenereConfig::default()).is_empty());
        assert!(crack_vigenere("abcdef", 0, &VigenereConfig::default()).is_empty());
    }

    #[test]
    fn test_recover_known_plaintext() {
        let recovered =
            recover_vigenere_key("attackatdawn", "lxfopvefrnhr", PositionalModifier::Zero, 1, 12)
                .unwrap();
        assert_eq!(recovered[0].keyword, "lemon");
        assert_eq!(recovered[0].key_length, 5);
        assert!(recovered.iter().all(|r| r.key_length >= 5));
    }

    #[test]
    fn test_recover_with_modifier_and_foreign_symbols() {
        let message = "meet at the gate, 9pm";
        let stepped = PositionalModifier::Stepped(2);
        let ciphertext = encrypt(message, "key", stepped);
        let recovered = recover_vigenere_key(message, &ciphertext, stepped, 1, 4).unwrap();
        assert_eq!(recovered[0].keyword, "key");
        let none =
            recover_vigenere_key(message, &ciphertext, PositionalModifier::Zero, 1, 4).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_recover_rejects_bad_input() {
        assert!(matches!(
            recover_vigenere_key("abc", "ab", PositionalModifier::Zero, 1, 3),
            Err(MlccError::InvalidParameter(_))
        ));
        assert!(recover_vigenere_key("abc", "abc", PositionalModifier::Zero, 0, 3).is_err());
        assert!(recover_vigenere_key("abc", "abc", PositionalModifier::Zero, 4, 3).is_err());
        assert!(recover_vigenere_key("", "", PositionalModifier::Zero, 1, 3).unwrap().is_empty());
    }
}
