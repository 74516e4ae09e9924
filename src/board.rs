//! Board geometry: coordinates on the 8x8 board, quadrants, and square colour.
//!
//! Files run a..h (index 0..7), ranks 1..8 (index 0..7). A square is "dark"
//! when `file_index + rank_index` is even, so a1 and h8 are dark and b1 is light.
//! That is the trainer's own convention and deliberately not the chess one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const BOARD_SIZE: u8 = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoordinateError {
  #[error("coordinate must be a file a-h followed by a rank 1-8, got {0:?}")]
  Malformed(String),
}

/// One cell of the board, stored as 0-based indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Coordinate {
  file: u8,
  rank: u8,
}

impl Coordinate {
  /// Build from 0-based indices. Panics outside the board; callers inside the crate
  /// only ever iterate `0..BOARD_SIZE`.
  pub fn new(file_index: u8, rank_index: u8) -> Self {
    assert!(file_index < BOARD_SIZE && rank_index < BOARD_SIZE, "coordinate index out of range");
    Self { file: file_index, rank: rank_index }
  }

  pub fn file_index(self) -> u8 { self.file }
  pub fn rank_index(self) -> u8 { self.rank }

  pub fn file_char(self) -> char { (b'a' + self.file) as char }
  pub fn rank_number(self) -> u8 { self.rank + 1 }
}

impl fmt::Display for Coordinate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}{}", self.file_char(), self.rank_number())
  }
}

impl FromStr for Coordinate {
  type Err = CoordinateError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let bytes = s.as_bytes();
    if bytes.len() != 2 {
      return Err(CoordinateError::Malformed(s.to_string()));
    }
    let file = bytes[0].to_ascii_lowercase();
    let rank = bytes[1];
    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
      return Err(CoordinateError::Malformed(s.to_string()));
    }
    Ok(Self { file: file - b'a', rank: rank - b'1' })
  }
}

impl From<Coordinate> for String {
  fn from(c: Coordinate) -> String { c.to_string() }
}

impl TryFrom<String> for Coordinate {
  type Error = CoordinateError;
  fn try_from(s: String) -> Result<Self, Self::Error> { s.parse() }
}

/// A 4x4 corner of the board, or the whole board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quadrant {
  #[serde(rename = "TL")]
  TopLeft,
  #[serde(rename = "TR")]
  TopRight,
  #[serde(rename = "BL")]
  BottomLeft,
  #[serde(rename = "BR")]
  BottomRight,
  #[serde(rename = "ALL")]
  All,
}

impl Quadrant {
  pub const CORNERS: [Quadrant; 4] = [
    Quadrant::TopLeft,
    Quadrant::TopRight,
    Quadrant::BottomLeft,
    Quadrant::BottomRight,
  ];

  /// Inclusive (files, ranks) index ranges covered by this quadrant.
  pub fn ranges(self) -> ((u8, u8), (u8, u8)) {
    match self {
      Quadrant::BottomLeft => ((0, 3), (0, 3)),
      Quadrant::BottomRight => ((4, 7), (0, 3)),
      Quadrant::TopLeft => ((0, 3), (4, 7)),
      Quadrant::TopRight => ((4, 7), (4, 7)),
      Quadrant::All => ((0, 7), (0, 7)),
    }
  }
}

/// Coordinates of a quadrant, rank ascending then file ascending.
pub fn coordinates_for(quadrant: Quadrant) -> Vec<Coordinate> {
  let ((f_lo, f_hi), (r_lo, r_hi)) = quadrant.ranges();
  (r_lo..=r_hi)
    .flat_map(|r| (f_lo..=f_hi).map(move |f| Coordinate::new(f, r)))
    .collect()
}

pub fn is_dark(c: Coordinate) -> bool {
  (c.file_index() + c.rank_index()) % 2 == 0
}

pub fn is_in_quadrant(c: Coordinate, quadrant: Quadrant) -> bool {
  if quadrant == Quadrant::All {
    return true;
  }
  coordinates_for(quadrant).contains(&c)
}

/// The corner quadrant that contains `c`.
pub fn quadrant_of(c: Coordinate) -> Quadrant {
  Quadrant::CORNERS
    .into_iter()
    .find(|q| is_in_quadrant(c, *q))
    .unwrap_or(Quadrant::All)
}

/// The full board as displayed: rank 8 on top, files a..h left to right.
pub fn grid_rows() -> Vec<Vec<Coordinate>> {
  (0..BOARD_SIZE)
    .rev()
    .map(|r| (0..BOARD_SIZE).map(|f| Coordinate::new(f, r)).collect())
    .collect()
}
