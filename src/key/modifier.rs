//! Positional modifier: the per-position shift offset of the Vigenere layer.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{MlccError, Result};

/// Smallest parameter drawn by [`PositionalModifier::random`].
const MIN_RANDOM_PARAM: usize = 2;

/// Largest parameter drawn by [`PositionalModifier::random`].
const MAX_RANDOM_PARAM: usize = 7;

/// Deterministic, stateless offset added to the keyword shift.
///
/// The position is the keyword cursor: the number of alphabet symbols that
/// precede the current one. Characters outside the alphabet never advance it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PositionalModifier {
    /// Always 0: a plain Vigenere cipher.
    #[default]
    Zero,
    /// `position mod k`.
    Cyclic(usize),
    /// `a * position`.
    Linear(usize),
    /// `position / s`: the keyword shift rotates every `s` symbols.
    Stepped(usize),
}

impl PositionalModifier {
    /// Offset for `position`, reduced modulo `modulus` (the alphabet size).
    pub fn offset(&self, position: usize, modulus: usize) -> usize {
        let raw = match *self {
            PositionalModifier::Zero => 0,
            PositionalModifier::Cyclic(k) => position.checked_rem(k).unwrap_or(0),
            PositionalModifier::Linear(a) => (position % modulus) * (a % modulus),
            PositionalModifier::Stepped(s) => position.checked_div(s).unwrap_or(0),
        };
        raw % modulus
    }

    /// Checks that the parameter is usable (`Cyclic` and `Stepped` need a
    /// period of at least 1).
    ///
    /// # Errors
    /// Returns [`MlccError::MalformedKey`] for a zero period.
    pub fn validate(&self) -> Result<()> {
        match *self {
            PositionalModifier::Cyclic(0) | PositionalModifier::Stepped(0) => Err(
                MlccError::MalformedKey(format!("modifier {} has a zero period", self)),
            ),
            _ => Ok(()),
        }
    }

    /// Draws a modifier from the generation family: `Cyclic`, `Linear` or
    /// `Stepped` with a parameter in `2..=7`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let param = rng.gen_range(MIN_RANDOM_PARAM..=MAX_RANDOM_PARAM);
        match rng.gen_range(0..3) {
            0 => PositionalModifier::Cyclic(param),
            1 => PositionalModifier::Linear(param),
            _ => PositionalModifier::Stepped(param),
        }
    }

    /// Every modifier of the generation family with a parameter up to
    /// `max_param`, preceded by `Zero`. Used as the hypothesis set when the
    /// modifier is unknown to the Vigenere cracker.
    pub fn family(max_param: usize) -> Vec<Self> {
        let mut family = vec![PositionalModifier::Zero];
        for param in MIN_RANDOM_PARAM..=max_param {
            family.push(PositionalModifier::Cyclic(param));
            family.push(PositionalModifier::Linear(param));
            family.push(PositionalModifier::Stepped(param));
        }
        family
    }
}

impl fmt::Display for PositionalModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionalModifier::Zero => write!(f, "zero"),
            PositionalModifier::Cyclic(k) => write!(f, "cyclic:{}", k),
            PositionalModifier::Linear(a) => write!(f, "linear:{}", a),
            PositionalModifier::Stepped(s) => write!(f, "stepped:{}", s),
        }
    }
}

impl FromStr for PositionalModifier {
    type Err = MlccError;

    fn from_str(s: &str) -> Result<Self> {
        let token = s.trim().to_ascii_lowercase();
        if token == "zero" {
            return Ok(PositionalModifier::Zero);
        }
        let (name, param) = token
            .split_once(':')
            .ok_or_else(|| MlccError::MalformedKey(format!("unknown modifier {:?}", s)))?;
        let param: usize = param
            .parse()
            .map_err(|_| MlccError::MalformedKey(format!("bad modifier parameter in {:?}", s)))?;
        let modifier = match name {
            "cyclic" => PositionalModifier::Cyclic(param),
            "linear" => PositionalModifier::Linear(param),
            "stepped" => PositionalModifier::Stepped(param),
            _ => return Err(MlccError::MalformedKey(format!("unknown modifier {:?}", s))),
        };
        modifier.validate()?;
        Ok(modifier)
    }
}

impl From<PositionalModifier> for String {
    fn from(modifier: PositionalModifier) -> Self {
        modifier.to_string()
    }
}

impl TryFrom<String> for PositionalModifier {
    type Error = MlccError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}
