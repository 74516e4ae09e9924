//! Domain models for the trainer: activities, directional input, verdicts, and the challenge itself.

use serde::{Deserialize, Serialize};

use crate::board::{is_dark, Coordinate};

/// Which drill the user is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Activity {
  /// Highlighted cell on a greyscale grid; judge its colour.
  Grid,
  /// Coordinate shown as text; judge its colour.
  Text,
  /// Two coordinates; judge whether they share a colour.
  Pair,
}

/// LEFT means "dark" for single squares and "same colour" for pairs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
  Left,
  Right,
}

impl Direction {
  /// Keyboard mapping; anything but the two arrow keys is ignored.
  pub fn from_key(key: &str) -> Option<Direction> {
    match key {
      "ArrowLeft" => Some(Direction::Left),
      "ArrowRight" => Some(Direction::Right),
      _ => None,
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
  Correct,
  Wrong,
}

/// The prompt currently awaiting an answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Challenge {
  Single { coordinate: Coordinate },
  Pair { c1: Coordinate, c2: Coordinate },
}

impl Challenge {
  pub fn expected(&self) -> Direction {
    let left = match *self {
      Challenge::Single { coordinate } => is_dark(coordinate),
      Challenge::Pair { c1, c2 } => is_dark(c1) == is_dark(c2),
    };
    if left { Direction::Left } else { Direction::Right }
  }

  pub fn judge(&self, input: Direction) -> Verdict {
    if input == self.expected() { Verdict::Correct } else { Verdict::Wrong }
  }
}
