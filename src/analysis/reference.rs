//! English reference statistics shared by every cracker.
//!
//! The trigram model is built once, on first use, from an embedded corpus
//! and is read-only afterwards, so parallel search trials read it without
//! any locking.

use lazy_static::lazy_static;

use crate::utils::converter::{folded_letter_indices, LETTERS};

const CORPUS: &str = include_str!("../../data/english_reference.txt");

const TRIGRAMS: usize = LETTERS * LETTERS * LETTERS;

/// Relative letter frequencies of English, in percent, indexed `a..z`.
pub const ENGLISH_FREQUENCIES: [f64; LETTERS] = [
    8.167, 1.492, 2.782, 4.253, 12.702, 2.228, 2.015, 6.094, 6.966, 0.153, 0.772, 4.025, 2.406,
    6.749, 7.507, 1.929, 0.095, 5.987, 6.327, 9.056, 2.758, 0.978, 2.360, 0.150, 1.974, 0.074,
];

/// English letters from most to least frequent.
pub const ENGLISH_FREQUENCY_ORDER: &str = "etaoinshrdlcumwfgypbvkjxqz";

lazy_static! {
    pub(crate) static ref ENGLISH: ReferenceModel = ReferenceModel::from_corpus(CORPUS);
}

/// Trigram log-probability model of a language.
pub(crate) struct ReferenceModel {
    log_probs: Vec<f64>,
    floor: f64,
    self_fitness: f64,
}

impl ReferenceModel {
    fn from_corpus(corpus: &str) -> Self {
        let letters = folded_letter_indices(corpus);
        let mut counts = vec![0u32; TRIGRAMS];
        for window in letters.windows(3) {
            counts[trigram_code(window[0], window[1], window[2])] += 1;
        }
        let total = letters.len().saturating_sub(2).max(1) as f64;
        let floor = (0.01 / total).log10();
        let log_probs = counts
            .iter()
            .map(|&count| {
                if count == 0 {
                    floor
                } else {
                    (count as f64 / total).log10()
                }
            })
            .collect();
        let mut model = ReferenceModel {
            log_probs,
            floor,
            self_fitness: 0.0,
        };
        model.self_fitness = model.fitness(&letters);
        model
    }

    /// Score assigned to a trigram never seen in the corpus.
    pub(crate) fn floor(&self) -> f64 {
        self.floor
    }

    pub(crate) fn log_prob(&self, code: usize) -> f64 {
        self.log_probs[code]
    }

    /// Average trigram log10-probability of a letter sequence. Higher is
    /// more English-like; sequences shorter than a trigram score the floor.
    pub(crate) fn fitness(&self, letters: &[usize]) -> f64 {
        if letters.len() < 3 {
            return self.floor;
        }
        let sum: f64 = letters
            .windows(3)
            .map(|w| self.log_probs[trigram_code(w[0], w[1], w[2])])
            .sum();
        sum / (letters.len() - 2) as f64
    }

    /// Maps a fitness onto `[0, 1]`: 0 at the floor, 1 at the corpus's own
    /// fitness.
    pub(crate) fn confidence(&self, fitness: f64) -> f64 {
        let span = self.self_fitness - self.floor;
        if span <= 0.0 {
            return 0.0;
        }
        ((fitness - self.floor) / span).clamp(0.0, 1.0)
    }
}

pub(crate) fn trigram_code(a: usize, b: usize, c: usize) -> usize {
    (a * LETTERS + b) * LETTERS + c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_table_sums_to_hundred() {
        let sum: f64 = ENGLISH_FREQUENCIES.iter().sum();
        assert!((sum - 100.0).abs() < 0.05, "sum {}", sum);
    }

    #[test]
    fn test_frequency_order_matches_table() {
        let mut order: Vec<usize> = (0..LETTERS).collect();
        order.sort_by(|&a, &b| ENGLISH_FREQUENCIES[b].total_cmp(&ENGLISH_FREQUENCIES[a]));
        let expected: String = order.iter().map(|&i| (b'a' + i as u8) as char).collect();
        assert_eq!(expected, ENGLISH_FREQUENCY_ORDER);
    }

    #[test]
    fn test_english_outscores_gibberish() {
        let english = folded_letter_indices(
            "the castle stood above the river and nobody remembered who built it",
        );
        let gibberish = folded_letter_indices(
            "qxzvkjwqpzxvbnqkzjxwvqpkzxjvbqwzkxjqvpzkxwjqzvbkxqjwzpvkqxzjwbvq",
        );
        assert!(ENGLISH.fitness(&english) > ENGLISH.fitness(&gibberish));
        assert!(ENGLISH.confidence(ENGLISH.fitness(&english)) > 0.6);
        assert!(ENGLISH.confidence(ENGLISH.fitness(&gibberish)) < 0.2);
    }

    #[test]
    fn test_short_input_scores_floor() {
        assert_eq!(ENGLISH.fitness(&[0, 1]), ENGLISH.floor());
        assert_eq!(ENGLISH.confidence(ENGLISH.floor()), 0.0);
    }

    #[test]
    fn test_confidence_is_clamped() {
        assert_eq!(ENGLISH.confidence(0.0), 1.0);
        assert_eq!(ENGLISH.confidence(f64::NEG_INFINITY), 0.0);
    }
}
