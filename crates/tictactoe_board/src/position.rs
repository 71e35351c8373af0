//! Validated coordinates of the nine board fields.

use crate::InvalidArgument;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A field on the 3x3 board.
///
/// `x` is the column and `y` the row, both starting at the top-left corner.
/// The linear index used on the wire is `3 * y + x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldCoordinate {
    x: usize,
    y: usize,
}

impl FieldCoordinate {
    /// All nine fields in row-major order.
    pub const ALL: [FieldCoordinate; 9] = [
        FieldCoordinate { x: 0, y: 0 },
        FieldCoordinate { x: 1, y: 0 },
        FieldCoordinate { x: 2, y: 0 },
        FieldCoordinate { x: 0, y: 1 },
        FieldCoordinate { x: 1, y: 1 },
        FieldCoordinate { x: 2, y: 1 },
        FieldCoordinate { x: 0, y: 2 },
        FieldCoordinate { x: 1, y: 2 },
        FieldCoordinate { x: 2, y: 2 },
    ];

    /// Creates a coordinate from column `x` and row `y`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`] unless both values are in `0..=2`.
    #[track_caller]
    #[instrument]
    pub fn new(x: usize, y: usize) -> Result<Self, InvalidArgument> {
        if x > 2 || y > 2 {
            return Err(InvalidArgument::new(format!(
                "Coordinate ({}, {}) is outside the board",
                x, y
            )));
        }
        Ok(Self { x, y })
    }

    /// Creates a coordinate from a linear index (`0..=8`, row-major).
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument`] if the index is above 8.
    #[track_caller]
    #[instrument]
    pub fn from_index(index: usize) -> Result<Self, InvalidArgument> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or_else(|| InvalidArgument::new(format!("Field index {} is outside 0..=8", index)))
    }

    /// Column, from the left.
    pub fn x(self) -> usize {
        self.x
    }

    /// Row, from the top.
    pub fn y(self) -> usize {
        self.y
    }

    /// Linear row-major index.
    pub fn to_index(self) -> usize {
        3 * self.y + self.x
    }
}

impl TryFrom<usize> for FieldCoordinate {
    type Error = InvalidArgument;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Self::from_index(index)
    }
}

impl std::fmt::Display for FieldCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
