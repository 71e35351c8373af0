//! Win detection for tic-tac-toe.

use crate::{FieldCoordinate, Symbol};
use tracing::instrument;

/// Every line that wins, in evaluation order.
///
/// Rows top to bottom, then columns left to right, then the diagonal from
/// the top-left and the one from the top-right. When two lines complete at
/// once, the earlier one in this list is reported.
pub const LINES: [[usize; 3]; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// Returns the first complete line of three equal symbols, if any.
#[instrument]
pub fn winning_line(cells: &[Option<Symbol>; 9]) -> Option<[FieldCoordinate; 3]> {
    LINES.iter().find_map(|&[a, b, c]| match cells[a] {
        Some(symbol) if cells[b] == Some(symbol) && cells[c] == Some(symbol) => Some([
            FieldCoordinate::ALL[a],
            FieldCoordinate::ALL[b],
            FieldCoordinate::ALL[c],
        ]),
        _ => None,
    })
}
