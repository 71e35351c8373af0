//! The client's mirror of one match.

use crate::rules::winning_line;
use crate::{FieldCoordinate, GameCode, MoveError, Symbol};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Board, turn and activity flags of the match this client takes part in.
///
/// Local moves are predictions: they are applied immediately and later
/// overwritten by the server's snapshot through [`GameState::update_board`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Cells in row-major order.
    cells: [Option<Symbol>; 9],
    /// Whether the local player may move next.
    on_turn: bool,
    /// The local player's symbol, unknown until the server assigns one.
    symbol: Option<Symbol>,
    /// Whether moves are permitted.
    game_active: bool,
    /// Whether an opponent is connected to the match.
    has_opponent: bool,
    /// Code of the match, once the server has assigned one.
    game_code: Option<GameCode>,
}

impl GameState {
    /// Creates an empty, inactive game with no code and no opponent.
    #[instrument]
    pub fn new() -> Self {
        debug!("Creating fresh game state");
        Self {
            cells: [None; 9],
            on_turn: true,
            symbol: None,
            game_active: false,
            has_opponent: false,
            game_code: None,
        }
    }

    /// Returns all cells in row-major order.
    pub fn cells(&self) -> &[Option<Symbol>; 9] {
        &self.cells
    }

    /// Returns the symbol at a field.
    pub fn symbol_at(&self, coord: FieldCoordinate) -> Option<Symbol> {
        self.cells[coord.to_index()]
    }

    /// Whether the local player may move next.
    pub fn on_turn(&self) -> bool {
        self.on_turn
    }

    /// Sets whose turn it is.
    pub fn set_on_turn(&mut self, on_turn: bool) {
        self.on_turn = on_turn;
    }

    /// The local player's symbol.
    pub fn symbol(&self) -> Option<Symbol> {
        self.symbol
    }

    /// Assigns the local player's symbol without touching activity.
    pub fn set_symbol(&mut self, symbol: Symbol) {
        self.symbol = Some(symbol);
    }

    /// Whether moves are permitted.
    pub fn game_active(&self) -> bool {
        self.game_active
    }

    /// Activates the game and assigns the local player's symbol.
    #[instrument(skip(self))]
    pub fn set_game_active(&mut self, symbol: Symbol) {
        self.game_active = true;
        self.symbol = Some(symbol);
    }

    /// Forbids further moves.
    pub fn deactivate_game(&mut self) {
        self.game_active = false;
    }

    /// Whether an opponent is connected to the match.
    pub fn has_opponent(&self) -> bool {
        self.has_opponent
    }

    /// Records whether an opponent is present.
    ///
    /// Losing the opponent also deactivates the game.
    #[instrument(skip(self))]
    pub fn set_has_opponent(&mut self, has_opponent: bool) {
        self.has_opponent = has_opponent;
        if !has_opponent {
            self.deactivate_game();
        }
    }

    /// Code of the match, if assigned.
    pub fn game_code(&self) -> Option<&GameCode> {
        self.game_code.as_ref()
    }

    /// Replaces the match code.
    pub fn set_game_code(&mut self, game_code: Option<GameCode>) {
        self.game_code = game_code;
    }

    /// Places a symbol on the board.
    ///
    /// Local moves place the local symbol and are rejected out of turn.
    /// Opponent moves come from the server, place the other symbol and are
    /// applied regardless of the local turn flag. Unless the move wins, the
    /// turn passes to the side that did not move; a winning move deactivates
    /// the game and leaves the turn flag as it was.
    ///
    /// # Errors
    ///
    /// - [`MoveError::GameNotActive`] if the game is inactive
    /// - [`MoveError::NotOnTurn`] for a local move while not on turn
    /// - [`MoveError::FieldAlreadyOccupied`] if the field holds a symbol
    #[instrument(skip(self))]
    pub fn make_move(&mut self, coord: FieldCoordinate, by_opponent: bool) -> Result<(), MoveError> {
        let symbol = match self.symbol {
            Some(symbol) if self.game_active => symbol,
            _ => return Err(MoveError::GameNotActive),
        };
        if !by_opponent && !self.on_turn {
            return Err(MoveError::NotOnTurn);
        }
        if self.symbol_at(coord).is_some() {
            return Err(MoveError::FieldAlreadyOccupied(coord));
        }

        let placed = if by_opponent { symbol.other() } else { symbol };
        self.cells[coord.to_index()] = Some(placed);

        if let Some(line) = self.winner() {
            info!(?line, winner = %placed, "Move completed a line");
            self.deactivate_game();
        } else {
            self.on_turn = by_opponent;
        }
        Ok(())
    }

    /// Returns the first complete line, if any.
    ///
    /// Rows are checked top to bottom, then columns left to right, then the
    /// two diagonals.
    pub fn winner(&self) -> Option<[FieldCoordinate; 3]> {
        winning_line(&self.cells)
    }

    /// Whether every cell holds a symbol.
    pub fn board_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Whether the board is full without a winner.
    pub fn is_draw(&self) -> bool {
        self.board_full() && self.winner().is_none()
    }

    /// Replaces every cell with the server's snapshot.
    ///
    /// Does not evaluate wins or turns.
    #[instrument(skip(self))]
    pub fn update_board(&mut self, cells: [Option<Symbol>; 9]) {
        self.cells = cells;
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
