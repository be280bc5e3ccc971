//! Ciphertext-only analysis of the individual layers.
//!
//! Four independent tools, each targeting English text over `a..z` (ASCII
//! case folded, non-letters ignored):
//!
//! - [`analyze_frequency`]: letter distribution, chi-squared, index of
//!   coincidence and ranked shift / mapping guesses.
//! - [`crack_substitution`]: simulated annealing over substitution keys.
//! - [`crack_vigenere`]: key length estimation plus per-column recovery, with
//!   optional positional modifier hypotheses.
//! - [`brute_force_transposition`]: bounded search over widths and
//!   direction chains.
//!
//! All of them are read-only over their input, keep no state between calls
//! and return ranked candidates with scores, never a single answer. They are
//! meant for single-layer ciphertext; the stacked cipher is out of their
//! reach.

mod config;
mod frequency;
mod reference;
mod search;
mod substitution_cracker;
mod transposition_bruteforce;
mod vigenere_cracker;

pub use config::{AnalysisConfig, SubstitutionConfig, TranspositionConfig, VigenereConfig};
pub use frequency::{
    analyze_frequency, apply_mapping, chi_squared, index_of_coincidence, letter_counts,
    rank_shifts, shifted_chi_squared, suggest_mapping, FrequencyReport, LetterCounts,
    ShiftCandidate, SymbolFrequency,
};
pub use reference::{ENGLISH_FREQUENCIES, ENGLISH_FREQUENCY_ORDER};
pub use substitution_cracker::{crack_substitution, SubstitutionCandidate};
pub use transposition_bruteforce::{
    brute_force_transposition, direction_chains, TranspositionCandidate,
};
pub use vigenere_cracker::{
    crack_vigenere, estimate_key_lengths, recover_vigenere_key, KeyLengthScore, RecoveredKey,
    VigenereCandidate,
};
