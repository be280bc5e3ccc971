//! Search budgets of the crackers.
//!
//! Every struct has sensible defaults and deserializes with missing fields
//! filled from them, so a partial JSON file is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::error::{MlccError, Result};
use crate::key::PositionalModifier;

/// Budget of [`crack_substitution`](super::crack_substitution).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubstitutionConfig {
    /// Annealing iterations per restart.
    pub iterations: usize,
    /// Independent restarts, run in parallel.
    pub restarts: usize,
    /// A restart stops after this many iterations without a new best.
    pub patience: usize,
    /// Initial annealing temperature, decreasing linearly to zero.
    pub temperature: f64,
    /// Worker threads; `0` uses one per core.
    pub workers: usize,
    /// Base seed; restart `r` uses `seed + r`. `None` draws a random seed.
    pub seed: Option<u64>,
    pub deadline_ms: Option<u64>,
    pub top_k: usize,
}

impl Default for SubstitutionConfig {
    fn default() -> Self {
        SubstitutionConfig {
            iterations: 4000,
            restarts: 8,
            patience: 1500,
            temperature: 0.01,
            workers: 0,
            seed: None,
            deadline_ms: None,
            top_k: 5,
        }
    }
}

/// Budget of [`crack_vigenere`](super::crack_vigenere).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VigenereConfig {
    pub min_key_length: usize,
    /// Number of best-scoring key lengths that get a full keyword recovery.
    pub lengths_to_try: usize,
    /// Positional modifier hypotheses, each stripped before the length
    /// analysis.
    pub modifiers: Vec<PositionalModifier>,
    /// Worker threads for the modifier hypotheses; `0` uses one per core.
    pub workers: usize,
    pub deadline_ms: Option<u64>,
    pub top_k: usize,
}

impl Default for VigenereConfig {
    fn default() -> Self {
        VigenereConfig {
            min_key_length: 1,
            lengths_to_try: 6,
            modifiers: vec![PositionalModifier::Zero],
            workers: 0,
            deadline_ms: None,
            top_k: 5,
        }
    }
}

/// Budget of [`brute_force_transposition`](super::brute_force_transposition).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranspositionConfig {
    pub min_width: usize,
    /// Longest direction chain tried.
    pub max_chain: usize,
    /// Total number of reconstructions scored; each column-order restart
    /// counts as one.
    pub max_candidates: usize,
    /// Stop after the first width whose best candidate reaches this
    /// confidence. `None` searches the whole range.
    pub stop_confidence: Option<f64>,
    /// Column-order restarts per keyed traversal (`TB`, `BT`) and width;
    /// `0` only tries the natural column order.
    pub column_restarts: usize,
    /// Annealing moves per column-order restart.
    pub column_iterations: usize,
    /// Initial annealing temperature of the column search, decreasing
    /// linearly to zero.
    pub column_temperature: f64,
    /// Worker threads; `0` uses one per core.
    pub workers: usize,
    /// Base seed of the column search. `None` draws a random seed.
    pub seed: Option<u64>,
    pub deadline_ms: Option<u64>,
    pub top_k: usize,
}

impl Default for TranspositionConfig {
    fn default() -> Self {
        TranspositionConfig {
            min_width: 1,
            max_chain: 2,
            max_candidates: 10_000,
            stop_confidence: Some(0.85),
            column_restarts: 4,
            column_iterations: 1500,
            column_temperature: 0.05,
            workers: 0,
            seed: None,
            deadline_ms: None,
            top_k: 5,
        }
    }
}

/// All cracker budgets, as loaded from a configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub substitution: SubstitutionConfig,
    pub vigenere: VigenereConfig,
    pub transposition: TranspositionConfig,
}

impl AnalysisConfig {
    /// Parses a JSON configuration; absent fields keep their defaults.
    ///
    /// # Errors
    /// Returns [`MlccError::InvalidParameter`] if the JSON is malformed or a
    /// field has the wrong type.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|err| MlccError::InvalidParameter(format!("analysis config: {}", err)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AnalysisConfig::from_json(
            r#"{"substitution": {"restarts": 3, "seed": 7},
                "vigenere": {"modifiers": ["zero", "stepped:5"]}}"#,
        )
        .unwrap();
        assert_eq!(config.substitution.restarts, 3);
        assert_eq!(config.substitution.seed, Some(7));
        assert_eq!(config.substitution.iterations, 4000);
        assert_eq!(
            config.vigenere.modifiers,
            vec![PositionalModifier::Zero, PositionalModifier::Stepped(5)]
        );
        assert_eq!(config.transposition, TranspositionConfig::default());
    }

    #[test]
    fn test_transposition_column_search_fields() {
        let config = AnalysisConfig::from_json(
            r#"{"transposition": {"column_restarts": 0, "seed": 11}}"#,
        )
        .unwrap();
        assert_eq!(config.transposition.column_restarts, 0);
        assert_eq!(config.transposition.seed, Some(11));
        assert_eq!(config.transposition.column_iterations, 1500);
    }

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(AnalysisConfig::from_json("{}").unwrap(), AnalysisConfig::default());
    }

    #[test]
    fn test_rejects_bad_json() {
        assert!(matches!(
            AnalysisConfig::from_json("{\"substitution\": {\"restarts\": \"many\"}}"),
            Err(MlccError::InvalidParameter(_))
        ));
        let bad_modifier = "{\"vigenere\": {\"modifiers\": [\"cyclic:0\"]}}";
        assert!(AnalysisConfig::from_json(bad_modifier).is_err());
    }
}
