//! Grid traversal directions of the transposition layer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MlccError, Result};

/// Order in which the cells of a transposition grid are read out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Direction {
    /// Rows top to bottom, each left to right (`LR`).
    LeftRight,
    /// Rows top to bottom, each right to left (`RL`).
    RightLeft,
    /// Columns left to right, each top to bottom (`TB`).
    TopBottom,
    /// Columns left to right, each bottom to top (`BT`).
    BottomTop,
    /// Rows top to bottom, alternating left-right and right-left (`ZZ`).
    ZigZag,
}

impl Direction {
    /// Every direction, in token order.
    pub const ALL: [Direction; 5] = [
        Direction::LeftRight,
        Direction::RightLeft,
        Direction::TopBottom,
        Direction::BottomTop,
        Direction::ZigZag,
    ];

    /// Short token used by the key format.
    pub fn token(&self) -> &'static str {
        match self {
            Direction::LeftRight => "LR",
            Direction::RightLeft => "RL",
            Direction::TopBottom => "TB",
            Direction::BottomTop => "BT",
            Direction::ZigZag => "ZZ",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Direction {
    type Err = MlccError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LR" => Ok(Direction::LeftRight),
            "RL" => Ok(Direction::RightLeft),
            "TB" => Ok(Direction::TopBottom),
            "BT" => Ok(Direction::BottomTop),
            "ZZ" | "ZIGZAG" => Ok(Direction::ZigZag),
            _ => Err(MlccError::MalformedKey(format!(
                "unknown direction token {:?}",
                s
            ))),
        }
    }
}

impl From<Direction> for String {
    fn from(direction: Direction) -> Self {
        direction.token().to_string()
    }
}

impl TryFrom<String> for Direction {
    type Error = MlccError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}
