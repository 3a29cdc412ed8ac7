//! The eight compass sectors and per-sector pixel counts.
//!
//! [`DIRECTIONS`] is the single ordered table of (direction, row-delta,
//! col-delta) shared by the aggregator and the chart renderer. Its order
//! N, NE, E, SE, S, SW, W, NW is also the order of every count vector and
//! percentage distribution.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// A compass sector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

/// One row of the direction table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionStep {
    pub direction: Direction,
    /// Roll applied along the row axis
    pub row_delta: isize,
    /// Roll applied along the column axis
    pub col_delta: isize,
}

const fn step(direction: Direction, row_delta: isize, col_delta: isize) -> DirectionStep {
    DirectionStep { direction, row_delta, col_delta }
}

/// Ordered direction table.
///
/// The deltas are roll offsets of the directional count (`N = (0, -1)`,
/// `E = (1, 0)`, ...), not geographic unit vectors.
pub const DIRECTIONS: [DirectionStep; 8] = [
    step(Direction::N, 0, -1),
    step(Direction::NE, 1, -1),
    step(Direction::E, 1, 0),
    step(Direction::SE, 1, 1),
    step(Direction::S, 0, 1),
    step(Direction::SW, -1, 1),
    step(Direction::W, -1, 0),
    step(Direction::NW, -1, -1),
];

impl Direction {
    /// All directions in table order
    pub const ALL: [Direction; 8] = [
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
    ];

    /// Position in the direction table
    pub fn index(self) -> usize {
        self as usize
    }

    /// Short compass label
    pub fn name(self) -> &'static str {
        match self {
            Direction::N => "N",
            Direction::NE => "NE",
            Direction::E => "E",
            Direction::SE => "SE",
            Direction::S => "S",
            Direction::SW => "SW",
            Direction::W => "W",
            Direction::NW => "NW",
        }
    }

    /// Compass bearing in radians: 0 at North, increasing clockwise,
    /// evenly spaced over a full turn in table order.
    pub fn bearing(self) -> f64 {
        self.index() as f64 * std::f64::consts::TAU / DIRECTIONS.len() as f64
    }

    /// Roll offsets of this direction
    pub fn step(self) -> DirectionStep {
        DIRECTIONS[self.index()]
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Matching-pixel count per direction, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DirectionCounts([u64; 8]);

impl DirectionCounts {
    pub fn new(counts: [u64; 8]) -> Self {
        Self(counts)
    }

    /// Count for one direction
    pub fn get(&self, direction: Direction) -> u64 {
        self.0[direction.index()]
    }

    /// Sum over all eight directions
    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }

    pub fn as_array(&self) -> &[u64; 8] {
        &self.0
    }

    /// (direction, count) pairs in table order
    pub fn iter(&self) -> impl Iterator<Item = (Direction, u64)> + '_ {
        Direction::ALL.iter().copied().zip(self.0.iter().copied())
    }
}

impl Index<Direction> for DirectionCounts {
    type Output = u64;

    fn index(&self, direction: Direction) -> &u64 {
        &self.0[direction.index()]
    }
}

impl From<[u64; 8]> for DirectionCounts {
    fn from(counts: [u64; 8]) -> Self {
        Self(counts)
    }
}
