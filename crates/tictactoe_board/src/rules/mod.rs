//! Rules evaluated over a board's cells.

mod win;

pub use win::{LINES, winning_line};
