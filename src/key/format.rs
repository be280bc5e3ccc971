//! Textual encoding of a [`CompositeKey`].
//!
//! One line of `;`-separated fields, always written in this order:
//!
//! ```text
//! mlcc1;alphabet=<symbols>;sub=<image>;vig=<keyword>;mod=<modifier>;
//!     width=<w>[;order=<c1,c2,...>];dirs=<D1,D2,...>
//! ```
//!
//! `<modifier>` is `zero`, `cyclic:<k>`, `linear:<a>` or `stepped:<s>` and the
//! direction tokens are `LR`, `RL`, `TB`, `BT` and `ZZ`. `order` lists the
//! 0-based columns in the order the column traversals read them; it is only
//! written for a keyed order and defaults to `0,1,...,w-1`. On parse the
//! fields may come in any order, but each must appear at most once and all
//! but `order` are required.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{
    CompositeKey, Direction, PositionalModifier, SubstitutionKey, TranspositionKey, VigenereKey,
};
use crate::alphabet::{Alphabet, RESERVED_SYMBOL};
use crate::error::{MlccError, Result};

/// Leading token of every serialized key.
pub const KEY_FORMAT_VERSION: &str = "mlcc1";

const FIELD_NAMES: [&str; 7] = ["alphabet", "sub", "vig", "mod", "width", "dirs", "order"];

/// Slot of the only optional field.
const ORDER_FIELD: usize = 6;

impl CompositeKey {
    /// Encodes the key in the version 1 text format.
    pub fn serialize(&self) -> String {
        let directions: Vec<&str> = self
            .transposition
            .directions()
            .iter()
            .map(Direction::token)
            .collect();
        let order = if self.transposition.is_keyed() {
            let columns: Vec<String> = self
                .transposition
                .column_order()
                .iter()
                .map(usize::to_string)
                .collect();
            format!("{}order={}", RESERVED_SYMBOL, columns.join(","))
        } else {
            String::new()
        };
        format!(
            "{version}{sep}alphabet={alphabet}{sep}sub={sub}{sep}vig={vig}{sep}mod={modifier}\
             {sep}width={width}{order}{sep}dirs={dirs}",
            version = KEY_FORMAT_VERSION,
            sep = RESERVED_SYMBOL,
            alphabet = self.alphabet(),
            sub = self.substitution.image(),
            vig = self.vigenere.keyword(),
            modifier = self.vigenere.modifier(),
            width = self.transposition.width(),
            order = order,
            dirs = directions.join(","),
        )
    }

    /// Decodes a key written by [`CompositeKey::serialize`].
    ///
    /// # Errors
    /// Returns [`MlccError::MalformedKey`] for an unknown version, a missing,
    /// duplicated or unknown field, or any value that fails validation
    /// (including a column order that is not a permutation of the width).
    pub fn parse(text: &str) -> Result<Self> {
        let mut parts = text.trim().split(RESERVED_SYMBOL);
        match parts.next() {
            Some(KEY_FORMAT_VERSION) => {}
            other => {
                return Err(MlccError::MalformedKey(format!(
                    "expected key version {:?}, found {:?}",
                    KEY_FORMAT_VERSION,
                    other.unwrap_or_default()
                )))
            }
        }

        let mut values: [Option<&str>; 7] = [None; 7];
        for part in parts {
            let (name, value) = part
                .split_once('=')
                .ok_or_else(|| MlccError::MalformedKey(format!("field {:?} has no value", part)))?;
            let slot = FIELD_NAMES
                .iter()
                .position(|&known| known == name)
                .ok_or_else(|| MlccError::MalformedKey(format!("unknown field {:?}", name)))?;
            if values[slot].replace(value).is_some() {
                return Err(MlccError::MalformedKey(format!("duplicate field {:?}", name)));
            }
        }
        let field = |slot: usize| {
            values[slot].ok_or_else(|| {
                MlccError::MalformedKey(format!("missing field {:?}", FIELD_NAMES[slot]))
            })
        };

        let alphabet = Alphabet::new(field(0)?).map_err(into_malformed)?;
        let substitution = SubstitutionKey::new(alphabet.clone(), field(1)?)?;
        let modifier: PositionalModifier = field(3)?.parse()?;
        let vigenere = VigenereKey::new(alphabet, field(2)?, modifier)?;
        let width_text = field(4)?;
        let width: usize = width_text
            .parse()
            .map_err(|_| MlccError::MalformedKey(format!("bad width {:?}", width_text)))?;
        let directions = field(5)?
            .split(',')
            .filter(|token| !token.trim().is_empty())
            .map(str::parse::<Direction>)
            .collect::<Result<Vec<_>>>()?;
        let mut transposition = TranspositionKey::new(width, directions).map_err(into_malformed)?;
        if let Some(order_text) = values[ORDER_FIELD] {
            let order = order_text
                .split(',')
                .map(|token| {
                    token.trim().parse::<usize>().map_err(|_| {
                        MlccError::MalformedKey(format!("bad column {:?} in order", token))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            transposition = transposition.with_column_order(order)?;
        }

        CompositeKey::new(substitution, vigenere, transposition)
    }
}

/// Re-labels a validation failure as a malformed key.
fn into_malformed(err: MlccError) -> MlccError {
    match err {
        MlccError::MalformedKey(_) => err,
        other => MlccError::MalformedKey(other.to_string()),
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

impl FromStr for CompositeKey {
    type Err = MlccError;

    fn from_str(s: &str) -> Result<Self> {
        CompositeKey::parse(s)
    }
}

impl Serialize for CompositeKey {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&CompositeKey::serialize(self))
    }
}

impl<'de> Deserialize<'de> for CompositeKey {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        CompositeKey::parse(&text).map_err(serde::de::Error::custom)
    }
}
