//! Tests for move legality and win detection on the client board.

use strum::IntoEnumIterator;
use tictactoe_board::{FieldCoordinate, GameState, MoveError, Symbol};

fn at(x: usize, y: usize) -> FieldCoordinate {
    FieldCoordinate::new(x, y).unwrap()
}

#[test]
fn test_move_on_inactive_game_fails() {
    for coord in FieldCoordinate::ALL {
        for by_opponent in [false, true] {
            let mut game = GameState::new();
            assert_eq!(game.make_move(coord, by_opponent), Err(MoveError::GameNotActive));
        }
    }
}

#[test]
fn test_inactive_after_opponent_left() {
    for symbol in Symbol::iter() {
        let mut game = GameState::new();
        game.set_has_opponent(true);
        game.set_game_active(symbol);
        game.set_has_opponent(false);
        assert_eq!(game.make_move(at(1, 1), false), Err(MoveError::GameNotActive));
    }
}

#[test]
fn test_local_move_places_own_symbol() {
    let mut game = GameState::new();
    game.set_game_active(Symbol::O);

    game.make_move(at(0, 0), false).unwrap();

    assert_eq!(game.symbol_at(at(0, 0)), Some(Symbol::O));
    assert!(!game.on_turn());
}

#[test]
fn test_opponent_move_places_other_symbol() {
    let mut game = GameState::new();
    game.set_game_active(Symbol::X);
    game.set_on_turn(false);

    game.make_move(at(1, 1), true).unwrap();

    assert_eq!(game.symbol_at(at(1, 1)), Some(Symbol::O));
    assert!(game.on_turn());
}

#[test]
fn test_local_move_out_of_turn_rejected() {
    let mut game = GameState::new();
    game.set_game_active(Symbol::X);
    game.set_on_turn(false);

    assert_eq!(game.make_move(at(2, 2), false), Err(MoveError::NotOnTurn));
    assert_eq!(game.symbol_at(at(2, 2)), None);
}

#[test]
fn test_opponent_move_ignores_turn_flag() {
    for on_turn in [false, true] {
        let mut game = GameState::new();
        game.set_game_active(Symbol::X);
        game.set_on_turn(on_turn);
        assert!(game.make_move(at(2, 2), true).is_ok());
    }
}

#[test]
fn test_occupied_field_rejected() {
    let mut game = GameState::new();
    game.set_game_active(Symbol::X);
    game.make_move(at(0, 1), false).unwrap();

    let result = game.make_move(at(0, 1), true);

    assert_eq!(result, Err(MoveError::FieldAlreadyOccupied(at(0, 1))));
    assert_eq!(game.symbol_at(at(0, 1)), Some(Symbol::X));
}

#[test]
fn test_update_board_replaces_all_cells() {
    let mut game = GameState::new();
    game.update_board([
        None,
        None,
        Some(Symbol::X),
        None,
        None,
        None,
        Some(Symbol::O),
        None,
        None,
    ]);

    assert_eq!(game.symbol_at(at(2, 1)), None);
    assert_eq!(game.symbol_at(at(2, 0)), Some(Symbol::X));
    assert_eq!(game.symbol_at(at(0, 2)), Some(Symbol::O));
    assert_eq!(game.winner(), None);
}

#[test]
fn test_top_row_reported_first() {
    use Symbol::{O, X};
    let mut game = GameState::new();
    game.update_board([Some(O), Some(O), Some(O), None, Some(X), Some(X), Some(X), None, None]);

    assert_eq!(game.winner(), Some([at(0, 0), at(1, 0), at(2, 0)]));
}

#[test]
fn test_winner_requires_equal_symbols() {
    use Symbol::{O, X};
    // Every line on this board mixes symbols or has a gap.
    let mut game = GameState::new();
    game.update_board([Some(X), Some(O), Some(X), Some(X), Some(O), Some(O), Some(O), Some(X), None]);

    assert_eq!(game.winner(), None);
    assert!(!game.board_full());
}
