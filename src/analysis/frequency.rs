//! FrequencyAnalyzer: letter distribution, chi-squared distance to English,
//! index of coincidence and ranked shift / mapping suggestions.
//!
//! Building block for the crackers; on its own it does not break anything.

use serde::Serialize;

use super::reference::{ENGLISH_FREQUENCIES, ENGLISH_FREQUENCY_ORDER};
use crate::utils::converter::{index_letter, letter_index, letter_indices, map_letters, LETTERS};

/// Letter counts indexed `a..z`.
pub type LetterCounts = [usize; LETTERS];

/// One letter of a [`FrequencyReport`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolFrequency {
    pub symbol: char,
    pub count: usize,
    /// Share of all counted letters, in percent.
    pub percent: f64,
}

/// A single-shift hypothesis (Caesar shift of the whole text).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShiftCandidate {
    pub shift: usize,
    /// Key letter of this shift (`a` = 0).
    pub key_letter: char,
    pub chi_squared: f64,
}

/// Result of [`analyze_frequency`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyReport {
    /// Number of `a..z` letters counted; every other symbol is ignored.
    pub total: usize,
    /// Letters seen at least once, most frequent first.
    pub distribution: Vec<SymbolFrequency>,
    /// Chi-squared distance of the distribution to English.
    pub chi_squared: f64,
    pub index_of_coincidence: f64,
    /// All 26 shifts, most English-like first.
    pub ranked_shifts: Vec<ShiftCandidate>,
    /// Cipher letter to plain letter guess, indexed `a..z`, from rank order.
    pub suggested_mapping: String,
}

/// Computes the frequency report of `text`.
///
/// Only `a..z` are counted, the symbols the cipher's default alphabet
/// enciphers; capitals and everything else are ignored. An empty text yields
/// a report with zero counts.
///
/// # Examples
///
/// ```
/// use mlcc::analyze_frequency;
///
/// let report = analyze_frequency("Hello, hello!");
/// assert_eq!(report.total, 9);
/// assert_eq!(report.distribution[0].symbol, 'l');
/// assert_eq!(report.distribution[0].count, 4);
/// ```
pub fn analyze_frequency(text: &str) -> FrequencyReport {
    let counts = letter_counts(&letter_indices(text));
    let total: usize = counts.iter().sum();

    let mut distribution: Vec<SymbolFrequency> = (0..LETTERS)
        .filter(|&i| counts[i] > 0)
        .map(|i| SymbolFrequency {
            symbol: index_letter(i),
            count: counts[i],
            percent: 100.0 * counts[i] as f64 / total as f64,
        })
        .collect();
    distribution.sort_by(|a, b| b.count.cmp(&a.count).then(a.symbol.cmp(&b.symbol)));

    FrequencyReport {
        total,
        distribution,
        chi_squared: chi_squared(&counts),
        index_of_coincidence: index_of_coincidence(&counts),
        ranked_shifts: rank_shifts(&counts),
        suggested_mapping: suggest_mapping(&counts).iter().map(|&i| index_letter(i)).collect(),
    }
}

/// Counts letter indices.
pub fn letter_counts(indices: &[usize]) -> LetterCounts {
    let mut counts = [0; LETTERS];
    for &i in indices {
        counts[i % LETTERS] += 1;
    }
    counts
}

/// Chi-squared distance of `counts` to English. Zero for an empty sample.
pub fn chi_squared(counts: &LetterCounts) -> f64 {
    shifted_chi_squared(counts, 0)
}

/// Chi-squared distance to English after undoing a Caesar `shift`: the
/// observed count of letter `(i + shift) mod 26` is compared with the
/// expected count of plain letter `i`.
pub fn shifted_chi_squared(counts: &LetterCounts, shift: usize) -> f64 {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    (0..LETTERS)
        .map(|i| {
            let expected = total as f64 * ENGLISH_FREQUENCIES[i] / 100.0;
            let observed = counts[(i + shift) % LETTERS] as f64;
            (observed - expected).powi(2) / expected
        })
        .sum()
}

/// Ranks all 26 Caesar shifts, lowest chi-squared first.
pub fn rank_shifts(counts: &LetterCounts) -> Vec<ShiftCandidate> {
    let mut shifts: Vec<ShiftCandidate> = (0..LETTERS)
        .map(|shift| ShiftCandidate {
            shift,
            key_letter: index_letter(shift),
            chi_squared: shifted_chi_squared(counts, shift),
        })
        .collect();
    shifts.sort_by(|a, b| a.chi_squared.total_cmp(&b.chi_squared).then(a.shift.cmp(&b.shift)));
    shifts
}

/// Index of coincidence of a sample: the probability that two letters drawn
/// without replacement are equal. Zero for fewer than two letters.
pub fn index_of_coincidence(counts: &LetterCounts) -> f64 {
    let total: usize = counts.iter().sum();
    if total < 2 {
        return 0.0;
    }
    let pairs: usize = counts.iter().map(|&c| c * c.saturating_sub(1)).sum();
    pairs as f64 / (total * (total - 1)) as f64
}

/// Guesses a cipher-to-plain mapping by matching frequency ranks: the most
/// frequent cipher letter maps to `e`, the next to `t`, and so on. Ties
/// are broken alphabetically. The result is always a permutation.
pub fn suggest_mapping(counts: &LetterCounts) -> [usize; LETTERS] {
    let mut by_rank: Vec<usize> = (0..LETTERS).collect();
    by_rank.sort_by(|&a, &b| counts[b].cmp(&counts[a]).then(a.cmp(&b)));
    let mut mapping = [0; LETTERS];
    for (cipher, plain) in by_rank.into_iter().zip(ENGLISH_FREQUENCY_ORDER.chars()) {
        mapping[cipher] = letter_index(plain).unwrap_or(0);
    }
    mapping
}

/// Rewrites the `a..z` letters of `text` through a cipher-to-plain
/// `mapping`, keeping every other symbol in place.
pub fn apply_mapping(text: &str, mapping: &[usize; LETTERS]) -> String {
    map_letters(text, |_, i| mapping[i])
}
